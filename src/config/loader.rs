use std::{env, time::Duration};

use super::env::{
    AkismetSettings, AppConfig, ConfigError, DirectoryConfig, FormSettings, LoggingConfig,
    SiteSettings,
};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let form = FormSettings {
            default_from_email: var("CONTACT_FORM_DEFAULT_FROM_EMAIL")
                .unwrap_or_else(|| "webmaster@localhost".to_string()),
            managers: var("CONTACT_FORM_MANAGERS")
                .map(|value| {
                    value
                        .split(',')
                        .map(|part| part.trim().to_string())
                        .filter(|part| !part.is_empty())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default(),
            template_dir: var("CONTACT_FORM_TEMPLATE_DIR"),
        };

        let site = match (var("CONTACT_FORM_SITE_NAME"), var("CONTACT_FORM_SITE_DOMAIN")) {
            (Some(name), Some(domain)) => Some(SiteSettings { name, domain }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("CONTACT_FORM_SITE_DOMAIN")),
            (None, Some(_)) => return Err(ConfigError::Missing("CONTACT_FORM_SITE_NAME")),
        };

        let akismet = AkismetSettings {
            enabled: parse_bool(var("CONTACT_FORM_SPAM_CHECK"), "CONTACT_FORM_SPAM_CHECK")?,
            api_key: var("CONTACT_FORM_AKISMET_API_KEY"),
            blog_url: var("CONTACT_FORM_AKISMET_BLOG_URL"),
            timeout: Duration::from_millis(
                var("AKISMET_TIMEOUT_MS")
                    .map(|v| {
                        v.parse::<u64>().map_err(|err| ConfigError::Invalid {
                            key: "AKISMET_TIMEOUT_MS",
                            reason: err.to_string(),
                        })
                    })
                    .transpose()?
                    .unwrap_or(5_000),
            ),
        };

        let directories = DirectoryConfig {
            logs_dir: var("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
        };

        let logging = LoggingConfig {
            level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        Ok(Self {
            form,
            site,
            akismet,
            directories,
            logging,
        })
    }
}

fn parse_bool(value: Option<String>, key: &'static str) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::trim) {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}

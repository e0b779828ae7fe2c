use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub form: FormSettings,
    pub site: Option<SiteSettings>,
    pub akismet: AkismetSettings,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct FormSettings {
    pub default_from_email: String,
    pub managers: Vec<String>,
    pub template_dir: Option<String>,
}

/// Present only when a site registry is configured; otherwise site details
/// are derived from the originating request.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub name: String,
    pub domain: String,
}

#[derive(Debug, Clone)]
pub struct AkismetSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub blog_url: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

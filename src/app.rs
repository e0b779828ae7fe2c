use std::sync::Arc;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    akismet::{ConfigResolver, SpamClientCache},
    config::AppConfig,
    domain::{FormData, MessageParts, RequestMeta},
    form::{
        request_processor, timestamp_processor, ConfiguredSite, ContactForm, FormClass,
        FormErrors, TemplateRenderer,
    },
    mail::{LogMailer, Mailer},
};

/// One submission as received by the binary.
#[derive(Debug, Deserialize)]
pub struct IncomingSubmission {
    #[serde(default)]
    pub request: Option<RequestMeta>,
    #[serde(default)]
    pub data: FormData,
    #[serde(default)]
    pub recipient_list: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Sent { message: MessageParts },
    Invalid { errors: FormErrors },
}

pub struct ContactApp {
    class: Arc<FormClass>,
    mailer: Arc<dyn Mailer>,
}

impl ContactApp {
    /// Builds the app with the logging mailer.
    ///
    /// With spam checking enabled the form uses the process-wide
    /// [`SpamClientCache`], so only the first initialization decides its
    /// credentials and timeout; later calls with other Akismet settings
    /// share that cache.
    pub fn initialize(config: &AppConfig) -> Result<Self> {
        Self::with_mailer(config, Arc::new(LogMailer))
    }

    pub fn with_mailer(config: &AppConfig, mailer: Arc<dyn Mailer>) -> Result<Self> {
        let templates = Arc::new(TemplateRenderer::from_settings(&config.form));
        let mut class = FormClass::contact(&config.form, templates)
            .with_context_processor(request_processor())
            .with_context_processor(timestamp_processor());

        if let Some(site) = &config.site {
            class = class.with_site_registry(Arc::new(ConfiguredSite::from(site)));
        }

        if config.akismet.enabled {
            let http = Client::builder()
                .user_agent(format!("contact-form/{}", env!("CARGO_PKG_VERSION")))
                .timeout(config.akismet.timeout)
                .build()?;
            let settings = config.akismet.clone();
            let cache = SpamClientCache::global(move || ConfigResolver::standard(&settings, http));
            class = class.with_spam_filter(cache);
        }

        tracing::info!(
            target: "app",
            spam_check = class.has_spam_filter(),
            managers = config.form.managers.len(),
            "contact form initialized"
        );

        Ok(Self {
            class: Arc::new(class),
            mailer,
        })
    }

    pub fn form_class(&self) -> Arc<FormClass> {
        self.class.clone()
    }

    /// Validates the submission and, if it is valid, sends the message.
    pub async fn submit(&self, incoming: IncomingSubmission) -> Result<Outcome> {
        let mut builder = ContactForm::builder(self.class.clone()).data(incoming.data);
        if let Some(request) = incoming.request {
            builder = builder.request(request);
        }
        if let Some(recipients) = incoming.recipient_list {
            builder = builder.recipient_list(recipients);
        }
        let mut form = builder.build()?;

        if !form.is_valid().await? {
            return Ok(Outcome::Invalid {
                errors: form.errors().clone(),
            });
        }

        let message = form.save(self.mailer.as_ref(), false).await?;
        tracing::info!(
            target: "app",
            recipients = message.recipient_list.len(),
            "contact message sent"
        );
        Ok(Outcome::Sent { message })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        config::{
            env::{DirectoryConfig, LoggingConfig},
            AkismetSettings, FormSettings,
        },
        error::ContactFormError,
        form::Field,
        mail::MemoryMailer,
    };

    fn config() -> AppConfig {
        AppConfig {
            form: FormSettings {
                default_from_email: "noreply@example.com".into(),
                managers: vec!["manager@example.com".into()],
                template_dir: None,
            },
            site: None,
            akismet: AkismetSettings {
                enabled: false,
                api_key: None,
                blog_url: None,
                timeout: Duration::from_secs(5),
            },
            directories: DirectoryConfig {
                logs_dir: "logs".into(),
            },
            logging: LoggingConfig {
                level: "info".into(),
            },
        }
    }

    fn incoming(json: &str) -> IncomingSubmission {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn valid_submission_is_sent() {
        let mailer = Arc::new(MemoryMailer::new());
        let app = ContactApp::with_mailer(&config(), mailer.clone()).unwrap();
        let outcome = app
            .submit(incoming(
                r#"{"request": {"host": "example.org"},
                    "data": {"name": "Ada", "email": "ada@example.com", "body": "Hi"}}"#,
            ))
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Sent { .. }));
        let outbox = mailer.outbox();
        assert_eq!(outbox.len(), 1);
        assert!(outbox[0].subject.starts_with("[example.org]"));
    }

    #[tokio::test]
    async fn invalid_submission_reports_errors() {
        let mailer = Arc::new(MemoryMailer::new());
        let app = ContactApp::with_mailer(&config(), mailer.clone()).unwrap();
        let outcome = app
            .submit(incoming(
                r#"{"request": {"host": "example.org"},
                    "data": {"name": "Ada", "email": "not-an-address"}}"#,
            ))
            .await
            .unwrap();

        let Outcome::Invalid { errors } = &outcome else {
            panic!("expected invalid outcome");
        };
        assert!(errors.contains(Field::Email));
        assert!(errors.contains(Field::Body));
        assert!(mailer.outbox().is_empty());

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "invalid");
    }

    #[tokio::test]
    async fn submission_without_request_is_refused() {
        let app = ContactApp::with_mailer(&config(), Arc::new(MemoryMailer::new())).unwrap();
        let err = app
            .submit(incoming(r#"{"data": {"name": "Ada"}}"#))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ContactFormError>(),
            Some(ContactFormError::Construction(_))
        ));
    }

    #[tokio::test]
    async fn configured_site_is_used() {
        let mut config = config();
        config.site = Some(crate::config::SiteSettings {
            name: "Example".into(),
            domain: "example.com".into(),
        });
        let mailer = Arc::new(MemoryMailer::new());
        let app = ContactApp::with_mailer(&config, mailer.clone()).unwrap();
        app.submit(incoming(
            r#"{"request": {"host": "example.org"},
                "data": {"name": "Ada", "email": "ada@example.com", "body": "Hi"}}"#,
        ))
        .await
        .unwrap();
        assert!(mailer.outbox()[0].subject.starts_with("[Example]"));
        assert!(mailer.outbox()[0].message.contains("(example.com)"));
    }
}

use std::{env, sync::Arc};

use reqwest::Client;

use crate::{
    config::AkismetSettings,
    error::{ConfigurationError, ContactFormError, SourceRejection},
};

use super::{
    test_client::{TEST_API_KEY, TEST_BLOG_URL},
    AkismetClient, AkismetConfig, SpamClassifier, TestClient,
};

/// Application settings, loaded with the rest of [`crate::config::AppConfig`].
/// These play the role of a framework's `AKISMET_API_KEY` / `AKISMET_BLOG_URL`
/// settings, namespaced like every other contact form setting.
pub const SETTINGS_API_KEY: &str = "CONTACT_FORM_AKISMET_API_KEY";
pub const SETTINGS_BLOG_URL: &str = "CONTACT_FORM_AKISMET_BLOG_URL";
/// The classifier client's own variables, read from the process environment
/// at resolution time. They stand in for a client library's
/// `PYTHON_AKISMET_API_KEY` / `PYTHON_AKISMET_BLOG_URL` convention.
pub const ENV_API_KEY: &str = "AKISMET_API_KEY";
pub const ENV_BLOG_URL: &str = "AKISMET_BLOG_URL";

/// A place classifier credentials may come from.
pub trait ConfigSource: Send + Sync {
    fn describe(&self) -> String;

    /// Returns the candidate config, or why this source has none.
    fn load(&self) -> Result<AkismetConfig, String>;
}

/// Builds a classifier client from candidate credentials.
pub type ClientFactory = Arc<dyn Fn(AkismetConfig) -> Arc<dyn SpamClassifier> + Send + Sync>;

pub struct SettingsSource {
    api_key: Option<String>,
    blog_url: Option<String>,
}

impl SettingsSource {
    pub fn new(api_key: Option<String>, blog_url: Option<String>) -> Self {
        Self { api_key, blog_url }
    }

    pub fn from_settings(settings: &AkismetSettings) -> Self {
        Self::new(settings.api_key.clone(), settings.blog_url.clone())
    }
}

impl ConfigSource for SettingsSource {
    fn describe(&self) -> String {
        format!("settings ({SETTINGS_API_KEY}, {SETTINGS_BLOG_URL})")
    }

    fn load(&self) -> Result<AkismetConfig, String> {
        load_pair(
            self.api_key.clone(),
            self.blog_url.clone(),
            SETTINGS_API_KEY,
            SETTINGS_BLOG_URL,
        )
    }
}

pub struct EnvironmentSource {
    lookup: Arc<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl EnvironmentSource {
    /// Reads the process environment at resolution time.
    pub fn process() -> Self {
        Self::with_lookup(|key| env::var(key).ok())
    }

    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Arc::new(lookup),
        }
    }
}

impl ConfigSource for EnvironmentSource {
    fn describe(&self) -> String {
        format!("environment ({ENV_API_KEY}, {ENV_BLOG_URL})")
    }

    fn load(&self) -> Result<AkismetConfig, String> {
        load_pair(
            (self.lookup)(ENV_API_KEY),
            (self.lookup)(ENV_BLOG_URL),
            ENV_API_KEY,
            ENV_BLOG_URL,
        )
    }
}

fn load_pair(
    key: Option<String>,
    url: Option<String>,
    key_name: &str,
    url_name: &str,
) -> Result<AkismetConfig, String> {
    let key = key.filter(|v| !v.trim().is_empty());
    let url = url.filter(|v| !v.trim().is_empty());
    match (key, url) {
        (Some(key), Some(url)) => AkismetConfig::new(key, url),
        (None, None) => Err("not set".to_string()),
        (None, Some(_)) => Err(format!("{key_name} is not set")),
        (Some(_), None) => Err(format!("{url_name} is not set")),
    }
}

/// Uses the in-process [`TestClient`] for the designated test credentials and
/// the HTTP client for everything else.
pub fn default_factory(http: Client) -> ClientFactory {
    Arc::new(move |config: AkismetConfig| {
        if config.key == TEST_API_KEY && config.url == TEST_BLOG_URL {
            Arc::new(TestClient::new(config)) as Arc<dyn SpamClassifier>
        } else {
            Arc::new(AkismetClient::new(http.clone(), config)) as Arc<dyn SpamClassifier>
        }
    })
}

/// Tries each source in order; the first whose key the service accepts wins.
pub struct ConfigResolver {
    sources: Vec<Box<dyn ConfigSource>>,
    factory: ClientFactory,
}

impl ConfigResolver {
    pub fn new(factory: ClientFactory) -> Self {
        Self {
            sources: Vec::new(),
            factory,
        }
    }

    /// Settings first, then the process environment.
    pub fn standard(settings: &AkismetSettings, http: Client) -> Self {
        Self::new(default_factory(http))
            .with_source(SettingsSource::from_settings(settings))
            .with_source(EnvironmentSource::process())
    }

    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub async fn resolve(&self) -> Result<Arc<dyn SpamClassifier>, ContactFormError> {
        let mut attempts = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let name = source.describe();
            let config = match source.load() {
                Ok(config) => config,
                Err(reason) => {
                    tracing::debug!(target: "akismet", source = %name, %reason, "config source unavailable");
                    attempts.push(SourceRejection {
                        source: name,
                        reason,
                    });
                    continue;
                }
            };

            let client = (self.factory)(config);
            if client.verify_key().await? {
                tracing::info!(
                    target: "akismet",
                    source = %name,
                    blog = %client.config().url,
                    "akismet credentials verified"
                );
                return Ok(client);
            }

            tracing::warn!(target: "akismet", source = %name, "akismet rejected the configured key");
            attempts.push(SourceRejection {
                source: name,
                reason: "key rejected by the classifier".to_string(),
            });
        }
        Err(ConfigurationError { attempts }.into())
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    const KEY: &str = "test-key";
    const URL: &str = "http://example.com";

    fn recording_factory(accept: bool) -> (ClientFactory, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let factory: ClientFactory = Arc::new(move |config: AkismetConfig| {
            recorder.lock().push(config.key.clone());
            Arc::new(TestClient::new(config).with_verify_key(accept)) as Arc<dyn SpamClassifier>
        });
        (factory, seen)
    }

    fn settings(key: Option<&str>, url: Option<&str>) -> SettingsSource {
        SettingsSource::new(key.map(str::to_string), url.map(str::to_string))
    }

    fn environment(key: Option<&'static str>, url: Option<&'static str>) -> EnvironmentSource {
        EnvironmentSource::with_lookup(move |name| match name {
            ENV_API_KEY => key.map(str::to_string),
            ENV_BLOG_URL => url.map(str::to_string),
            _ => None,
        })
    }

    #[tokio::test]
    async fn valid_settings_produce_a_client() {
        let (factory, _) = recording_factory(true);
        let resolver = ConfigResolver::new(factory).with_source(settings(Some(KEY), Some(URL)));
        let client = resolver.resolve().await.unwrap();
        assert_eq!(client.config().key, KEY);
    }

    #[tokio::test]
    async fn invalid_settings_are_a_configuration_error() {
        let (factory, _) = recording_factory(false);
        let resolver = ConfigResolver::new(factory).with_source(settings(Some(KEY), Some(URL)));
        let err = resolver.resolve().await.err().unwrap();
        assert!(matches!(err, ContactFormError::Configuration(_)));
    }

    #[tokio::test]
    async fn valid_environment_produces_a_client() {
        let (factory, _) = recording_factory(true);
        let resolver = ConfigResolver::new(factory)
            .with_source(settings(None, None))
            .with_source(environment(Some(KEY), Some(URL)));
        assert!(resolver.resolve().await.is_ok());
    }

    #[tokio::test]
    async fn invalid_environment_is_a_configuration_error() {
        let (factory, _) = recording_factory(false);
        let resolver = ConfigResolver::new(factory).with_source(environment(Some(KEY), Some(URL)));
        assert!(matches!(
            resolver.resolve().await,
            Err(ContactFormError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn missing_everywhere_names_both_sources() {
        let (factory, seen) = recording_factory(true);
        let resolver = ConfigResolver::new(factory)
            .with_source(settings(None, None))
            .with_source(environment(None, None));
        let err = resolver.resolve().await.err().unwrap();
        let message = err.to_string();
        assert!(message.contains(SETTINGS_API_KEY), "{message}");
        assert!(message.contains(ENV_API_KEY), "{message}");
        assert!(seen.lock().is_empty());
    }

    #[tokio::test]
    async fn settings_take_precedence_over_environment() {
        let (factory, seen) = recording_factory(true);
        let resolver = ConfigResolver::new(factory)
            .with_source(settings(Some("from-settings"), Some(URL)))
            .with_source(environment(Some("from-env"), Some(URL)));
        let client = resolver.resolve().await.unwrap();
        assert_eq!(client.config().key, "from-settings");
        assert_eq!(*seen.lock(), vec!["from-settings".to_string()]);
    }

    #[tokio::test]
    async fn rejected_settings_fall_through_to_environment() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let factory: ClientFactory = Arc::new(move |config: AkismetConfig| {
            recorder.lock().push(config.key.clone());
            let accepted = config.key == "from-env";
            Arc::new(TestClient::new(config).with_verify_key(accepted)) as Arc<dyn SpamClassifier>
        });
        let resolver = ConfigResolver::new(factory)
            .with_source(settings(Some("stale"), Some(URL)))
            .with_source(environment(Some("from-env"), Some(URL)));
        let client = resolver.resolve().await.unwrap();
        assert_eq!(client.config().key, "from-env");
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn partial_pairs_explain_what_is_missing() {
        assert_eq!(
            settings(Some(KEY), None).load().unwrap_err(),
            format!("{SETTINGS_BLOG_URL} is not set")
        );
        assert_eq!(
            environment(None, Some(URL)).load().unwrap_err(),
            format!("{ENV_API_KEY} is not set")
        );
    }

    #[test]
    fn sources_name_the_variables_they_read() {
        assert_eq!(
            settings(None, None).describe(),
            "settings (CONTACT_FORM_AKISMET_API_KEY, CONTACT_FORM_AKISMET_BLOG_URL)"
        );
        assert_eq!(
            environment(None, None).describe(),
            "environment (AKISMET_API_KEY, AKISMET_BLOG_URL)"
        );
    }

    #[test]
    fn designated_test_credentials_build_the_test_client() {
        let factory = default_factory(Client::new());
        let client = factory(AkismetConfig::new(TEST_API_KEY, TEST_BLOG_URL).unwrap());
        assert_eq!(client.config().url, TEST_BLOG_URL);
    }
}

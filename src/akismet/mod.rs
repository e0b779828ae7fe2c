//! Akismet-compatible spam classification.
//!
//! Credentials are resolved from an ordered list of sources, verified against
//! the service once, and the resulting client is shared through
//! [`SpamClientCache`].

mod cache;
mod client;
mod protocol;
mod resolver;
mod test_client;

use std::fmt;

use async_trait::async_trait;
use url::Url;

use crate::{
    domain::{ClassificationRequest, Verdict},
    error::TransportError,
};

pub use cache::SpamClientCache;
pub use client::AkismetClient;
pub use protocol::AKISMET_API_BASE;
pub use resolver::{
    default_factory, ClientFactory, ConfigResolver, ConfigSource, EnvironmentSource,
    SettingsSource, ENV_API_KEY, ENV_BLOG_URL, SETTINGS_API_KEY, SETTINGS_BLOG_URL,
};
pub use test_client::{TestClient, TEST_API_KEY, TEST_BLOG_URL, TEST_SPAM_MARKER};

#[async_trait]
pub trait SpamClassifier: Send + Sync {
    fn config(&self) -> &AkismetConfig;

    /// Whether the service accepts this client's key for its blog URL.
    async fn verify_key(&self) -> Result<bool, TransportError>;

    async fn comment_check(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Verdict, TransportError>;
}

#[derive(Clone, PartialEq, Eq)]
pub struct AkismetConfig {
    pub key: String,
    pub url: String,
}

impl AkismetConfig {
    /// Both values must be present; the URL must be absolute http(s).
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Result<Self, String> {
        let key = key.into().trim().to_string();
        let url = url.into().trim().to_string();
        if key.is_empty() {
            return Err("API key is empty".to_string());
        }
        if url.is_empty() {
            return Err("blog URL is empty".to_string());
        }
        match Url::parse(&url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(format!("blog URL has unsupported scheme {:?}", parsed.scheme()))
            }
            Err(err) => return Err(format!("blog URL is invalid: {err}")),
        }
        Ok(Self { key, url })
    }
}

impl fmt::Debug for AkismetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AkismetConfig")
            .field("key", &"<redacted>")
            .field("url", &self.url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_requires_key_and_url() {
        assert_eq!(
            AkismetConfig::new("", "https://example.com").unwrap_err(),
            "API key is empty"
        );
        assert_eq!(AkismetConfig::new("key", "  ").unwrap_err(), "blog URL is empty");
        assert!(AkismetConfig::new("key", "example.com")
            .unwrap_err()
            .starts_with("blog URL is invalid"));
        assert!(AkismetConfig::new("key", "ftp://example.com").is_err());
        assert!(AkismetConfig::new("key", "https://example.com/").is_ok());
    }

    #[test]
    fn debug_output_hides_the_key() {
        let config = AkismetConfig::new("secret-key", "https://example.com/").unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("https://example.com/"));
    }
}

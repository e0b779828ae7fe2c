use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{
    domain::{ClassificationRequest, Verdict},
    error::TransportError,
};

use super::{AkismetConfig, SpamClassifier};

/// Credentials that make [`super::default_factory`] build a [`TestClient`].
pub const TEST_API_KEY: &str = "akismet-test-key";
pub const TEST_BLOG_URL: &str = "http://testserver/";

/// Content containing this marker is always classified as spam.
pub const TEST_SPAM_MARKER: &str = "viagra-test-123";

/// In-process classifier with deterministic answers and no network access.
pub struct TestClient {
    config: AkismetConfig,
    verify_key_response: bool,
    comment_check_response: Option<Verdict>,
    verify_calls: AtomicUsize,
    check_calls: AtomicUsize,
}

impl TestClient {
    pub fn new(config: AkismetConfig) -> Self {
        Self {
            config,
            verify_key_response: true,
            comment_check_response: None,
            verify_calls: AtomicUsize::new(0),
            check_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_verify_key(mut self, accepted: bool) -> Self {
        self.verify_key_response = accepted;
        self
    }

    /// Answer every comment-check with `verdict` instead of looking for the marker.
    pub fn always(mut self, verdict: Verdict) -> Self {
        self.comment_check_response = Some(verdict);
        self
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpamClassifier for TestClient {
    fn config(&self) -> &AkismetConfig {
        &self.config
    }

    async fn verify_key(&self) -> Result<bool, TransportError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.verify_key_response)
    }

    async fn comment_check(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Verdict, TransportError> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(verdict) = self.comment_check_response {
            return Ok(verdict);
        }
        let marked = [&request.body, &request.author, &request.author_email]
            .iter()
            .any(|field| field.contains(TEST_SPAM_MARKER));
        Ok(if marked { Verdict::Spam } else { Verdict::Ham })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RequestMeta;

    fn client() -> TestClient {
        TestClient::new(AkismetConfig::new(TEST_API_KEY, TEST_BLOG_URL).unwrap())
    }

    #[tokio::test]
    async fn marker_in_author_is_spam() {
        let request = ClassificationRequest::new(
            "This is spam.",
            TEST_SPAM_MARKER,
            "test@example.com",
            &RequestMeta::new("testserver"),
        );
        assert_eq!(client().comment_check(&request).await.unwrap(), Verdict::Spam);
    }

    #[tokio::test]
    async fn ordinary_text_is_ham() {
        let request = ClassificationRequest::new(
            "Test message.",
            "Test Name",
            "test@example.com",
            &RequestMeta::new("testserver"),
        );
        let client = client();
        assert_eq!(client.comment_check(&request).await.unwrap(), Verdict::Ham);
        assert_eq!(client.check_calls(), 1);
    }

    #[tokio::test]
    async fn fixed_responses_override_the_marker() {
        let client = client().with_verify_key(false).always(Verdict::Discard);
        assert!(!client.verify_key().await.unwrap());
        let request =
            ClassificationRequest::new("hello", "Ann", "", &RequestMeta::new("testserver"));
        assert_eq!(client.comment_check(&request).await.unwrap(), Verdict::Discard);
    }
}

use std::sync::Arc;

use crate::{
    akismet::SpamClientCache,
    domain::{ClassificationRequest, RequestMeta},
    error::ContactFormError,
};

use super::validation::CleanedFields;

pub const SPAM_MESSAGE: &str = "Your message was classified as spam.";

/// Folds a classifier verdict on the message body into field validation.
#[derive(Clone)]
pub struct SpamCheckValidator {
    cache: Arc<SpamClientCache>,
}

impl SpamCheckValidator {
    pub fn new(cache: Arc<SpamClientCache>) -> Self {
        Self { cache }
    }

    /// Returns the body error to record, if the classifier rejects the body.
    ///
    /// Skipped without contacting the classifier when the body did not survive
    /// ordinary cleaning. Configuration and transport failures are returned as
    /// errors rather than treated as ham.
    pub(crate) async fn validate(
        &self,
        cleaned: &CleanedFields,
        request: &RequestMeta,
    ) -> Result<Option<&'static str>, ContactFormError> {
        let Some(body) = cleaned.body.as_deref().filter(|body| !body.is_empty()) else {
            return Ok(None);
        };

        let client = self.cache.get().await?;
        let classification = ClassificationRequest::new(
            body,
            cleaned.name.clone().unwrap_or_default(),
            cleaned.email.clone().unwrap_or_default(),
            request,
        );
        let verdict = client.comment_check(&classification).await?;
        if verdict.is_rejected() {
            tracing::info!(
                target: "form",
                ?verdict,
                client_ip = %classification.client_ip,
                "submission rejected as spam"
            );
            return Ok(Some(SPAM_MESSAGE));
        }
        Ok(None)
    }
}

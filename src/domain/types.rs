use std::collections::HashMap;

use serde::Serialize;

use super::RequestMeta;

/// Raw, uncleaned form input keyed by field name.
pub type FormData = HashMap<String, String>;

/// Cleaned field values of a submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Ham,
    Spam,
    /// Blatant spam the classifier suggests dropping without review.
    Discard,
}

impl Verdict {
    pub fn is_rejected(self) -> bool {
        matches!(self, Verdict::Spam | Verdict::Discard)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationRequest {
    pub content_type: &'static str,
    pub referrer: String,
    pub client_ip: String,
    pub user_agent: String,
    pub author: String,
    pub author_email: String,
    pub body: String,
}

impl ClassificationRequest {
    pub const CONTENT_TYPE: &'static str = "comment";

    pub fn new(
        body: impl Into<String>,
        author: impl Into<String>,
        author_email: impl Into<String>,
        request: &RequestMeta,
    ) -> Self {
        Self {
            content_type: Self::CONTENT_TYPE,
            referrer: request.referrer.clone().unwrap_or_default(),
            client_ip: request.remote_addr.clone().unwrap_or_default(),
            user_agent: request.user_agent.clone().unwrap_or_default(),
            author: author.into(),
            author_email: author_email.into(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discard_is_rejected_like_spam() {
        assert!(Verdict::Spam.is_rejected());
        assert!(Verdict::Discard.is_rejected());
        assert!(!Verdict::Ham.is_rejected());
    }

    #[test]
    fn missing_request_metadata_defaults_to_empty() {
        let request = ClassificationRequest::new("hi", "Ann", "", &RequestMeta::new("example.com"));
        assert_eq!(request.content_type, "comment");
        assert_eq!(request.referrer, "");
        assert_eq!(request.client_ip, "");
        assert_eq!(request.user_agent, "");
    }
}

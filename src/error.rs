use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContactFormError {
    /// A required collaborator was not supplied when the form was built.
    #[error("contact form cannot be constructed: {0}")]
    Construction(&'static str),
    /// Message parts or context were requested before validation succeeded.
    #[error("{0}")]
    InvalidState(&'static str),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("message part `{0}` is not defined")]
    UndefinedPart(&'static str),
    #[error("message has no recipients")]
    EmptyRecipients,
    #[error("mail dispatch failed: {0}")]
    Dispatch(String),
}

/// One config source that did not yield usable classifier credentials.
#[derive(Debug, Clone)]
pub struct SourceRejection {
    pub source: String,
    pub reason: String,
}

/// No config source yielded credentials the classifier accepted.
#[derive(Debug, Clone, Error)]
#[error("spam filter is not configured; tried {}", describe(.attempts))]
pub struct ConfigurationError {
    pub attempts: Vec<SourceRejection>,
}

fn describe(attempts: &[SourceRejection]) -> String {
    if attempts.is_empty() {
        return "no sources".to_string();
    }
    attempts
        .iter()
        .map(|attempt| format!("{}: {}", attempt.source, attempt.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Cloneable so one failed attempt can be handed to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("akismet {operation} timed out")]
    Timeout { operation: &'static str },
    #[error("akismet {operation} request failed: {source}")]
    Http {
        operation: &'static str,
        #[source]
        source: Arc<reqwest::Error>,
    },
    #[error("akismet {operation} returned an unexpected response: {detail}")]
    UnexpectedResponse {
        operation: &'static str,
        detail: String,
    },
}

impl TransportError {
    pub fn from_reqwest(operation: &'static str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            TransportError::Timeout { operation }
        } else {
            TransportError::Http {
                operation,
                source: Arc::new(source),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_names_every_source() {
        let err = ConfigurationError {
            attempts: vec![
                SourceRejection {
                    source: "settings".into(),
                    reason: "not set".into(),
                },
                SourceRejection {
                    source: "environment".into(),
                    reason: "key rejected".into(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "spam filter is not configured; tried settings: not set; environment: key rejected"
        );
    }

    #[test]
    fn configuration_error_without_sources() {
        let err = ConfigurationError { attempts: vec![] };
        assert_eq!(err.to_string(), "spam filter is not configured; tried no sources");
    }
}

use serde::Serialize;

/// Fully resolved outgoing message, ready for a mail dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageParts {
    pub from_email: String,
    pub subject: String,
    pub recipient_list: Vec<String>,
    pub message: String,
}

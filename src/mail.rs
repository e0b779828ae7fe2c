use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{domain::MessageParts, error::ContactFormError};

/// Delivers a composed message. Transport is up to the implementation.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// With `fail_silently`, delivery problems are logged instead of returned.
    async fn send_mail(
        &self,
        message: &MessageParts,
        fail_silently: bool,
    ) -> Result<(), ContactFormError>;
}

/// Records messages in the log without delivering them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_mail(
        &self,
        message: &MessageParts,
        _fail_silently: bool,
    ) -> Result<(), ContactFormError> {
        tracing::info!(
            target: "mail",
            from = %message.from_email,
            recipients = ?message.recipient_list,
            subject = %message.subject,
            bytes = message.message.len(),
            "contact message dispatched"
        );
        Ok(())
    }
}

/// Keeps sent messages in memory; useful as a test outbox.
#[derive(Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<MessageParts>>,
    failure: Option<String>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every delivery fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outbox: Mutex::new(Vec::new()),
            failure: Some(reason.into()),
        }
    }

    pub fn outbox(&self) -> Vec<MessageParts> {
        self.outbox.lock().clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send_mail(
        &self,
        message: &MessageParts,
        fail_silently: bool,
    ) -> Result<(), ContactFormError> {
        match &self.failure {
            None => {
                self.outbox.lock().push(message.clone());
                Ok(())
            }
            Some(reason) if fail_silently => {
                tracing::warn!(target: "mail", %reason, "mail dispatch failed silently");
                Ok(())
            }
            Some(reason) => Err(ContactFormError::Dispatch(reason.clone())),
        }
    }
}

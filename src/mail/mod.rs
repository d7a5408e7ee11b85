//! Mail dispatch collaborator.

pub mod smtp;

use async_trait::async_trait;

use crate::utils::error::AppError;

pub use smtp::SmtpMailer;

/// A named mail attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Abstraction over the mail transport.
///
/// Transport faults surface as [`AppError::DeliveryFailed`], distinct from
/// rendering faults, so callers can retry delivery without re-rendering.
#[async_trait]
pub trait MailDispatcher: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
        attachment: Attachment,
    ) -> Result<(), AppError>;
}

//! SMTP mail dispatch via lettre's async transport.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MessagePart, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::utils::error::AppError;

use super::{Attachment, MailDispatcher};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| AppError::DeliveryFailed(format!("SMTP relay setup: {e}")))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: format!("{} <{}>", config.from_name, config.from_address),
        })
    }
}

#[async_trait]
impl MailDispatcher for SmtpMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
        attachment: Attachment,
    ) -> Result<(), AppError> {
        let delivery = |e: &dyn std::fmt::Display| AppError::DeliveryFailed(e.to_string());

        let content_type =
            ContentType::parse(&attachment.content_type).map_err(|e| delivery(&e))?;
        let attachment_part =
            MessagePart::new(attachment.filename).body(attachment.bytes, content_type);

        let body = match html_body {
            Some(html) => MultiPart::alternative_plain_html(
                text_body.to_string(),
                html.to_string(),
            ),
            None => MultiPart::mixed().singlepart(SinglePart::plain(text_body.to_string())),
        };

        let message = Message::builder()
            .from(self.from.parse().map_err(|e| delivery(&e))?)
            .to(to.parse().map_err(|e| delivery(&e))?)
            .subject(subject)
            .multipart(
                MultiPart::mixed()
                    .multipart(body)
                    .singlepart(attachment_part),
            )
            .map_err(|e| delivery(&e))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| delivery(&e))?;

        tracing::info!(to = %to, "Ticket mail dispatched");
        Ok(())
    }
}

//! Email dispatch over SMTP.
//!
//! Uses `lettre` for SMTP transport.

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use relay_shared::{SmtpConfig, SmtpSecurity};

use super::error::DispatchError;
use super::types::{ComposedMessage, MailAttachment};

/// Submits composed messages to an outbound transport.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message and wait for the transport to accept or reject it.
    async fn dispatch(&self, message: &ComposedMessage) -> Result<(), DispatchError>;
}

/// SMTP mailer.
///
/// The transport is built once and shared by every request.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Creates a new SMTP mailer.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS parameters for the host cannot be built.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, DispatchError> {
        Ok(Self {
            transport: Self::create_transport(config)?,
        })
    }

    /// Creates an SMTP transport.
    fn create_transport(
        config: &SmtpConfig,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, DispatchError> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let builder = match config.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| DispatchError::transport(e.to_string()))?,
            SmtpSecurity::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                    .map_err(|e| DispatchError::transport(e.to_string()))?
            }
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
        };

        Ok(builder
            .port(config.port)
            .credentials(creds)
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn dispatch(&self, message: &ComposedMessage) -> Result<(), DispatchError> {
        let email = build_message(message).await?;
        self.transport
            .send(email)
            .await
            .map_err(|e| DispatchError::transport(e.to_string()))?;
        Ok(())
    }
}

/// Builds the MIME message, reading attachment content from disk.
///
/// # Errors
///
/// Returns an error if an address does not parse, an attachment cannot be
/// read, or the message cannot be assembled.
pub async fn build_message(message: &ComposedMessage) -> Result<Message, DispatchError> {
    let from = parse_mailbox(&message.from)?;
    let to = parse_mailbox(&message.to)?;

    let body = MultiPart::alternative_plain_html(
        message.text_body.clone(),
        message.html_body.clone(),
    );

    let builder = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone());

    let email = if message.attachments.is_empty() {
        builder.multipart(body)
    } else {
        let mut mixed = MultiPart::mixed().multipart(body);
        for attachment in &message.attachments {
            mixed = mixed.singlepart(attachment_part(attachment).await?);
        }
        builder.multipart(mixed)
    };

    email.map_err(|e| DispatchError::Build(e.to_string()))
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DispatchError> {
    address
        .parse()
        .map_err(|e| DispatchError::InvalidAddress(format!("{address} ({e})")))
}

async fn attachment_part(attachment: &MailAttachment) -> Result<SinglePart, DispatchError> {
    let content = tokio::fs::read(&attachment.path)
        .await
        .map_err(|e| DispatchError::Attachment(format!("{}: {e}", attachment.filename)))?;

    let mime = mime_guess::from_path(&attachment.filename).first_or_octet_stream();
    let content_type =
        ContentType::parse(mime.essence_str()).map_err(|e| DispatchError::Build(e.to_string()))?;

    Ok(Attachment::new(attachment.filename.clone()).body(content, content_type))
}

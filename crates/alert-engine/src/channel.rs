//! Delivery channel trait and the email / WhatsApp implementations.

use async_trait::async_trait;
use smtp_mailer::{Email, SmtpClient};
use tracing::debug;
use whatsapp_client::WhatsAppClient;

use crate::error::ChannelError;
use crate::models::ChannelKind;

/// A message ready to hand to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Subject line; channels without subjects ignore it.
    pub subject: String,
    pub body: String,
}

impl OutboundMessage {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Provider acknowledgement for a delivered message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Provider message id, when the provider returns one.
    pub provider_id: Option<String>,
}

/// Trait for delivering one message to one recipient.
///
/// Abstracted so the dispatcher works the same for email, WhatsApp and tests.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Which channel this is.
    fn kind(&self) -> ChannelKind;

    /// Deliver a message. Called at most once per recipient per dispatch.
    async fn deliver(
        &self,
        message: &OutboundMessage,
        recipient: &str,
    ) -> Result<DeliveryReceipt, ChannelError>;
}

/// Email delivery over SMTP.
pub struct EmailChannel {
    client: SmtpClient,
}

impl EmailChannel {
    pub fn new(client: SmtpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DeliveryChannel for EmailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn deliver(
        &self,
        message: &OutboundMessage,
        recipient: &str,
    ) -> Result<DeliveryReceipt, ChannelError> {
        let email = Email::new(recipient, &message.subject, &message.body);
        self.client.send(&email).await?;
        Ok(DeliveryReceipt::default())
    }
}

/// WhatsApp delivery through the messaging API.
pub struct WhatsAppChannel {
    client: WhatsAppClient,
}

impl WhatsAppChannel {
    pub fn new(client: WhatsAppClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DeliveryChannel for WhatsAppChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::WhatsApp
    }

    async fn deliver(
        &self,
        message: &OutboundMessage,
        recipient: &str,
    ) -> Result<DeliveryReceipt, ChannelError> {
        let sent = self.client.send_text(recipient, &message.body).await?;
        debug!(sid = %sent.sid, status = ?sent.status, "WhatsApp message accepted");
        Ok(DeliveryReceipt {
            provider_id: Some(sent.sid),
        })
    }
}

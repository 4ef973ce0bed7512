//! Error types for the alert engine.

use smtp_mailer::SmtpError;
use thiserror::Error;
use whatsapp_client::WhatsAppError;

/// Errors returned to callers of the engine.
///
/// Bad record data, missing credentials and transport failures never show up
/// here; they are absorbed into records and delivery outcomes.
#[derive(Debug, Error)]
pub enum AlertError {
    /// A digest was requested without a state.
    #[error("digest requires a location with a state")]
    MissingLocation,

    /// A digest was requested without any recipient.
    #[error("digest requires at least one recipient")]
    NoRecipients,

    /// The record source could not be read.
    #[error("record source error: {0}")]
    Source(String),
}

/// Errors a delivery channel reports for one attempt.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The recipient address was rejected before sending.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    /// The provider rejected or failed the send.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<SmtpError> for ChannelError {
    fn from(err: SmtpError) -> Self {
        match err {
            SmtpError::InvalidAddress(addr) => ChannelError::InvalidRecipient(addr),
            other => ChannelError::Transport(other.to_string()),
        }
    }
}

impl From<WhatsAppError> for ChannelError {
    fn from(err: WhatsAppError) -> Self {
        ChannelError::Transport(err.to_string())
    }
}

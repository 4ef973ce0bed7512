//! Request and response bodies for the Messages API.

use serde::{Deserialize, Serialize};

/// Prefix the API uses to route a number over WhatsApp.
pub const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Normalize a phone number into the `whatsapp:+<number>` address form.
///
/// Whitespace is stripped and the prefix is added when missing.
pub fn whatsapp_address(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.starts_with(WHATSAPP_PREFIX) {
        compact
    } else {
        format!("{}{}", WHATSAPP_PREFIX, compact)
    }
}

/// Form parameters for creating a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendParams {
    /// Recipient address.
    pub to: String,
    /// Sender address.
    pub from: String,
    /// Message text.
    pub body: String,
}

impl SendParams {
    /// Create send params, normalizing both addresses.
    pub fn text(to: &str, from: &str, body: impl Into<String>) -> Self {
        Self {
            to: whatsapp_address(to),
            from: whatsapp_address(from),
            body: body.into(),
        }
    }
}

/// A message resource returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResource {
    /// Message SID.
    pub sid: String,

    /// Delivery status (queued, sent, failed, ...).
    #[serde(default)]
    pub status: Option<String>,

    /// Error code if the message failed.
    #[serde(default)]
    pub error_code: Option<i64>,

    /// Error message if the message failed.
    #[serde(default)]
    pub error_message: Option<String>,
}

impl MessageResource {
    /// Whether the API already marked this message as undeliverable.
    pub fn is_failed(&self) -> bool {
        matches!(self.status.as_deref(), Some("failed") | Some("undelivered"))
            || self.error_code.is_some()
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// API-specific error code.
    #[serde(default)]
    pub code: Option<i64>,

    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

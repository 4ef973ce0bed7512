//! Messages API HTTP client.

use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::TwilioConfig;
use crate::error::WhatsAppError;
use crate::types::{ApiErrorBody, MessageResource, SendParams};

/// Client for sending WhatsApp messages.
#[derive(Clone)]
pub struct WhatsAppClient {
    http: Client,
    config: TwilioConfig,
}

impl WhatsAppClient {
    /// Create a client. No request is made until the first send.
    pub fn new(config: TwilioConfig) -> Result<Self, WhatsAppError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(WhatsAppError::Http)?;

        info!(
            account = %config.account_sid,
            from = %config.from,
            "Created WhatsApp client"
        );

        Ok(Self { http, config })
    }

    /// Send a text message to a recipient.
    pub async fn send_text(&self, recipient: &str, body: &str) -> Result<MessageResource, WhatsAppError> {
        let params = SendParams::text(recipient, &self.config.from, body);
        self.send(params).await
    }

    /// Send a message using the full SendParams structure.
    #[instrument(skip(self, params), fields(to = %params.to))]
    pub async fn send(&self, params: SendParams) -> Result<MessageResource, WhatsAppError> {
        let url = self.config.messages_url();
        debug!("POST {}", url);

        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(self.config.auth_token()))
            .form(&params)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let err = decode_api_error(status.as_u16(), &text);
            warn!(status = status.as_u16(), error = %err, "Message rejected");
            return Err(err);
        }

        let message: MessageResource = serde_json::from_str(&text)?;
        if message.is_failed() {
            let detail = message
                .error_message
                .clone()
                .unwrap_or_else(|| format!("status {:?}", message.status));
            return Err(WhatsAppError::SendFailed(detail));
        }

        info!(sid = %message.sid, "Message queued");
        Ok(message)
    }
}

/// Turn a non-2xx response body into an error, keeping the raw text when it is not JSON.
fn decode_api_error(status: u16, body: &str) -> WhatsAppError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.message.is_empty() => WhatsAppError::Api {
            status,
            code: parsed.code,
            message: parsed.message,
        },
        _ => WhatsAppError::Api {
            status,
            code: None,
            message: body.trim().to_string(),
        },
    }
}

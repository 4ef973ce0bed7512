//! Configuration types for whatsapp-client.

use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::WhatsAppError;
use crate::types::whatsapp_address;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.twilio.com";

/// Twilio sandbox sender number.
pub const DEFAULT_WHATSAPP_FROM: &str = "whatsapp:+14155238886";

/// Configuration for the Twilio Messages API.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Base URL of the API (e.g., "https://api.twilio.com").
    pub api_url: String,
    /// Account SID, also the basic-auth user name.
    pub account_sid: String,
    /// Sender address in `whatsapp:+<number>` form.
    pub from: String,
    /// Request timeout.
    pub timeout: Duration,
    auth_token: SecretString,
}

impl TwilioConfig {
    /// Create a new configuration against the default API URL.
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            account_sid: account_sid.into(),
            from: DEFAULT_WHATSAPP_FROM.to_string(),
            timeout: Duration::from_secs(30),
            auth_token: SecretString::from(auth_token.into()),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `TWILIO_ACCOUNT_SID` | Account SID | (required) |
    /// | `TWILIO_AUTH_TOKEN` | Auth token | (required) |
    /// | `TWILIO_WHATSAPP_FROM` | Sender number | `whatsapp:+14155238886` |
    /// | `TWILIO_API_URL` | API base URL | `https://api.twilio.com` |
    pub fn from_env() -> Result<Self, WhatsAppError> {
        let account_sid = required_var("TWILIO_ACCOUNT_SID")?;
        let auth_token = required_var("TWILIO_AUTH_TOKEN")?;

        let mut config = Self::new(account_sid, auth_token);

        if let Ok(from) = env::var("TWILIO_WHATSAPP_FROM") {
            if !from.trim().is_empty() {
                config.from = whatsapp_address(&from);
            }
        }
        if let Ok(url) = env::var("TWILIO_API_URL") {
            if !url.trim().is_empty() {
                config.api_url = url.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Set the sender number.
    pub fn with_from(mut self, from: impl AsRef<str>) -> Self {
        self.from = whatsapp_address(from.as_ref());
        self
    }

    /// Set the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the Messages resource URL for this account.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_url.trim_end_matches('/'),
            self.account_sid
        )
    }

    pub(crate) fn auth_token(&self) -> &str {
        self.auth_token.expose_secret()
    }
}

fn required_var(name: &str) -> Result<String, WhatsAppError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(WhatsAppError::MissingEnvVar(name.to_string())),
    }
}

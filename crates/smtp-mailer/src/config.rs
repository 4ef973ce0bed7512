use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::time::Duration;

use crate::SmtpError;

/// Default SMTP relay host.
pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";

/// Default SMTP submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Default socket timeout for SMTP commands.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for connecting to an SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP host (default: smtp.gmail.com)
    pub host: String,
    /// SMTP port (default: 587)
    pub port: u16,
    /// Login user name
    pub username: String,
    /// Address placed in the From header (default: the login user name)
    pub from_address: String,
    /// Socket timeout for SMTP commands
    pub timeout: Duration,
    /// Login password
    password: SecretString,
}

impl SmtpConfig {
    /// Create a new configuration with explicit values.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let username = username.into();
        Self {
            host: host.into(),
            port,
            from_address: username.clone(),
            username,
            timeout: DEFAULT_TIMEOUT,
            password: SecretString::from(password.into()),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `EMAIL_USER` - SMTP login
    /// - `EMAIL_PASSWORD` - SMTP password or app password
    ///
    /// Optional (with defaults):
    /// - `SMTP_SERVER` - Default: smtp.gmail.com
    /// - `SMTP_PORT` - Default: 587
    /// - `EMAIL_FROM` - Default: value of `EMAIL_USER`
    pub fn from_env() -> Result<Self, SmtpError> {
        let host = env::var("SMTP_SERVER").unwrap_or_else(|_| DEFAULT_SMTP_SERVER.to_string());

        let port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| DEFAULT_SMTP_PORT.to_string())
            .parse::<u16>()
            .map_err(|e| SmtpError::Config(format!("Invalid SMTP_PORT: {}", e)))?;

        let username = non_empty_var("EMAIL_USER")?;
        let password = non_empty_var("EMAIL_PASSWORD")?;

        let mut config = Self::new(host, port, username, password);
        if let Ok(from) = env::var("EMAIL_FROM") {
            if !from.trim().is_empty() {
                config.from_address = from.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Get the password (exposes the secret).
    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Builder method to set the From address.
    pub fn with_from_address(mut self, from: impl Into<String>) -> Self {
        self.from_address = from.into();
        self
    }

    /// Builder method to set the SMTP command timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Empty values count as unset so a blank `.env` entry does not enable the channel.
fn non_empty_var(name: &str) -> Result<String, SmtpError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(SmtpError::MissingEnvVar(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults_from_address_to_username() {
        let config = SmtpConfig::new("smtp.example.org", 2525, "alerts@example.org", "hunter2");
        assert_eq!(config.from_address, "alerts@example.org");
        assert_eq!(config.port, 2525);
        assert_eq!(config.password(), "hunter2");
    }

    #[test]
    fn test_builders() {
        let config = SmtpConfig::new("smtp.example.org", 587, "user", "pw")
            .with_from_address("noreply@example.org")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.from_address, "noreply@example.org");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = SmtpConfig::new("smtp.example.org", 587, "user", "hunter2");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
    }
}

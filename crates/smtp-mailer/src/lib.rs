//! # smtp-mailer
//!
//! STARTTLS SMTP client used to deliver health alert email.
//!
//! ## Sending Email
//!
//! ```no_run
//! use smtp_mailer::{Email, SmtpClient, SmtpConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), smtp_mailer::SmtpError> {
//!     let config = SmtpConfig::from_env()?;
//!     let client = SmtpClient::new(config)?;
//!
//!     let email = Email::new("resident@example.org", "Health Alert", "Dengue cases reported nearby.");
//!     client.send(&email).await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::SmtpClient;
pub use config::SmtpConfig;
pub use error::SmtpError;
pub use types::Email;

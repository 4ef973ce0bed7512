//! WhatsApp messaging client library.
//!
//! This crate sends WhatsApp text messages through the Twilio Messages REST
//! API. It supports:
//!
//! - Loading account credentials from the environment
//! - Sending a text body to a single WhatsApp number
//! - Decoding API error bodies into typed errors
//!
//! # Example
//!
//! ```no_run
//! use whatsapp_client::{TwilioConfig, WhatsAppClient};
//!
//! # async fn example() -> Result<(), whatsapp_client::WhatsAppError> {
//! let config = TwilioConfig::from_env()?;
//! let client = WhatsAppClient::new(config)?;
//!
//! let message = client.send_text("+919876543210", "Dengue cases reported nearby.").await?;
//! println!("Queued message {}", message.sid);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::WhatsAppClient;
pub use config::TwilioConfig;
pub use error::WhatsAppError;
pub use types::*;

//! Outbreak and vaccination alert engine.
//!
//! This crate selects, prioritizes and composes public-health alerts for a
//! location and delivers them over pluggable channels (email, WhatsApp).
//!
//! # Features
//!
//! - Location matching that ignores case and whitespace
//! - Recency and upcoming windows against an injected reference date
//! - Serious/other outbreak ranking with a stable newest-first order
//! - Digest composition with per-section caps and overflow lines
//! - Dispatch with dry-run, missing-credential skips, per-attempt timeouts
//!   and per-recipient failure isolation
//!
//! # Architecture
//!
//! ```text
//! Record store (RecordSource)
//!          │
//!          ├── digest ──> AlertSelector ──> MessageComposer ──┐
//!          │                                                   ↓
//!          └── record written ──> render_notice ──────────> Dispatcher
//!                                                              │
//!                                          EmailChannel / WhatsAppChannel
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use alert_engine::{AlertConfig, AlertService, ChannelKind, InMemorySource, Location};
//! use chrono::NaiveDate;
//!
//! # async fn example() -> Result<(), alert_engine::AlertError> {
//! let config = AlertConfig::from_env();
//! let source = Arc::new(InMemorySource::default());
//! let service = AlertService::from_config(config, source);
//!
//! let location = Location::new("Delhi", "New Delhi");
//! let today = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
//! let run = service
//!     .run_digest(&location, today, ChannelKind::WhatsApp, &["+919876543210".to_string()])
//!     .await?;
//!
//! println!("{}", run.message.body);
//! println!("sent: {}, failed: {}", run.report.sent(), run.report.failed());
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod composer;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod lenient;
pub mod location;
pub mod models;
pub mod notice;
pub mod selector;
pub mod service;
pub mod severity;
pub mod source;
pub mod temporal;

pub use channel::{DeliveryChannel, DeliveryReceipt, EmailChannel, OutboundMessage, WhatsAppChannel};
pub use composer::{ComposedMessage, MessageComposer, SectionCounts};
pub use config::AlertConfig;
pub use dispatch::{
    DeliveryOutcome, DeliveryRequest, DeliveryStatus, DispatchReport, DispatchSettings, Dispatcher,
};
pub use error::{AlertError, ChannelError};
pub use lenient::parse_count;
pub use location::{normalize, same_place, Location};
pub use models::{ChannelKind, HealthEvent, OutbreakEvent, Subscriber, VaccinationEvent};
pub use notice::render_notice;
pub use selector::{AlertBuckets, AlertSelector, BucketLabel};
pub use service::{AlertService, DigestRun};
pub use severity::{Priority, Severity, SeverityRanker};
pub use source::{InMemorySource, RecordSource};
pub use temporal::{parse_date, CampaignPhase, TemporalClassifier};

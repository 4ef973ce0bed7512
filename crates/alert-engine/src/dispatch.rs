//! Channel-agnostic dispatch with per-recipient isolation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use smtp_mailer::SmtpClient;
use tokio::time::timeout;
use tracing::{info, warn};
use whatsapp_client::WhatsAppClient;

use crate::channel::{DeliveryChannel, EmailChannel, OutboundMessage, WhatsAppChannel};
use crate::config::AlertConfig;
use crate::models::ChannelKind;

/// Final state of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryStatus {
    Sent,
    DryRun,
    CredentialsMissing,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::DryRun => "dry_run",
            DeliveryStatus::CredentialsMissing => "credentials_missing",
            DeliveryStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one attempt to reach one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub channel: ChannelKind,
    pub recipient: String,
    pub status: DeliveryStatus,
    /// Failure detail for `Failed`, skip reason for `CredentialsMissing`.
    pub detail: Option<String>,
    /// Provider message id for `Sent`, when available.
    pub provider_id: Option<String>,
}

impl DeliveryOutcome {
    fn new(channel: ChannelKind, recipient: &str, status: DeliveryStatus) -> Self {
        Self {
            channel,
            recipient: recipient.to_string(),
            status,
            detail: None,
            provider_id: None,
        }
    }

    /// A failure recorded without contacting any channel.
    pub fn failed(channel: ChannelKind, recipient: &str, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::new(channel, recipient, DeliveryStatus::Failed)
        }
    }
}

/// Outcomes of a dispatch, one per recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DispatchReport {
    pub fn count(&self, status: DeliveryStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn sent(&self) -> usize {
        self.count(DeliveryStatus::Sent)
    }

    pub fn failed(&self) -> usize {
        self.count(DeliveryStatus::Failed)
    }

    pub fn dry_run(&self) -> usize {
        self.count(DeliveryStatus::DryRun)
    }

    /// Deliveries skipped for missing credentials.
    pub fn skipped(&self) -> usize {
        self.count(DeliveryStatus::CredentialsMissing)
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn merge(&mut self, other: DispatchReport) {
        self.outcomes.extend(other.outcomes);
    }
}

/// One message for one recipient over one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub channel: ChannelKind,
    pub recipient: String,
    pub message: OutboundMessage,
}

/// Dispatch knobs copied out of [`AlertConfig`].
#[derive(Debug, Clone, Copy)]
pub struct DispatchSettings {
    pub dry_run: bool,
    pub attempt_timeout: Duration,
    pub max_concurrency: usize,
}

impl From<&AlertConfig> for DispatchSettings {
    fn from(config: &AlertConfig) -> Self {
        Self {
            dry_run: config.dry_run,
            attempt_timeout: config.dispatch_timeout,
            max_concurrency: config.dispatch_concurrency.max(1),
        }
    }
}

/// Delivers messages through whichever channels have credentials.
///
/// Each request ends in exactly one terminal [`DeliveryStatus`]. Nothing is
/// retried, and one recipient's failure or timeout never stops the others.
#[derive(Clone)]
pub struct Dispatcher {
    channels: HashMap<ChannelKind, Arc<dyn DeliveryChannel>>,
    settings: DispatchSettings,
}

impl Dispatcher {
    /// A dispatcher with no channels registered.
    pub fn new(config: &AlertConfig) -> Self {
        Self {
            channels: HashMap::new(),
            settings: DispatchSettings::from(config),
        }
    }

    /// Build email and WhatsApp channels for whichever credentials are configured.
    pub fn from_config(config: &AlertConfig) -> Self {
        let mut dispatcher = Self::new(config);

        if let Some(smtp) = &config.smtp {
            match SmtpClient::new(smtp.clone()) {
                Ok(client) => dispatcher.register(Arc::new(EmailChannel::new(client))),
                Err(e) => warn!(error = %e, "Email channel unavailable"),
            }
        }

        if let Some(whatsapp) = &config.whatsapp {
            match WhatsAppClient::new(whatsapp.clone()) {
                Ok(client) => dispatcher.register(Arc::new(WhatsAppChannel::new(client))),
                Err(e) => warn!(error = %e, "WhatsApp channel unavailable"),
            }
        }

        dispatcher
    }

    /// Register a channel, replacing any previous one of the same kind.
    pub fn register(&mut self, channel: Arc<dyn DeliveryChannel>) {
        self.channels.insert(channel.kind(), channel);
    }

    pub fn with_channel(mut self, channel: Arc<dyn DeliveryChannel>) -> Self {
        self.register(channel);
        self
    }

    pub fn has_channel(&self, kind: ChannelKind) -> bool {
        self.channels.contains_key(&kind)
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Deliver every request, up to `max_concurrency` at a time.
    ///
    /// Outcomes are reported in request order.
    pub async fn dispatch(&self, requests: Vec<DeliveryRequest>) -> DispatchReport {
        let outcomes: Vec<DeliveryOutcome> = stream::iter(requests)
            .map(|request| self.deliver_one(request))
            .buffered(self.settings.max_concurrency)
            .collect()
            .await;

        let report = DispatchReport { outcomes };
        info!(
            sent = report.sent(),
            failed = report.failed(),
            dry_run = report.dry_run(),
            skipped = report.skipped(),
            "Dispatch complete"
        );
        report
    }

    /// Run a single attempt to its terminal state.
    pub async fn deliver_one(&self, request: DeliveryRequest) -> DeliveryOutcome {
        let DeliveryRequest {
            channel: kind,
            recipient,
            message,
        } = request;

        if self.settings.dry_run {
            info!(
                channel = %kind,
                recipient = %recipient,
                subject = %message.subject,
                body = %message.body,
                "[DRY RUN] Not sending message"
            );
            return DeliveryOutcome::new(kind, &recipient, DeliveryStatus::DryRun);
        }

        if recipient.trim().is_empty() {
            warn!(channel = %kind, "Empty recipient address");
            return DeliveryOutcome::failed(kind, &recipient, "empty recipient address");
        }

        let Some(channel) = self.channels.get(&kind) else {
            warn!(channel = %kind, recipient = %recipient, "Channel credentials missing, skipping delivery");
            return DeliveryOutcome {
                detail: Some(format!("{} credentials are not configured", kind)),
                ..DeliveryOutcome::new(kind, &recipient, DeliveryStatus::CredentialsMissing)
            };
        };

        match timeout(self.settings.attempt_timeout, channel.deliver(&message, &recipient)).await {
            Ok(Ok(receipt)) => {
                info!(channel = %kind, recipient = %recipient, "Message delivered");
                DeliveryOutcome {
                    provider_id: receipt.provider_id,
                    ..DeliveryOutcome::new(kind, &recipient, DeliveryStatus::Sent)
                }
            }
            Ok(Err(err)) => {
                warn!(channel = %kind, recipient = %recipient, error = %err, "Delivery failed");
                DeliveryOutcome::failed(kind, &recipient, err.to_string())
            }
            Err(_) => {
                warn!(
                    channel = %kind,
                    recipient = %recipient,
                    timeout = ?self.settings.attempt_timeout,
                    "Delivery timed out"
                );
                DeliveryOutcome::failed(
                    kind,
                    &recipient,
                    format!("timed out after {:?}", self.settings.attempt_timeout),
                )
            }
        }
    }
}

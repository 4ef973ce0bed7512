//! Digest and real-time entry points.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::channel::OutboundMessage;
use crate::composer::{ComposedMessage, MessageComposer};
use crate::config::AlertConfig;
use crate::dispatch::{DeliveryOutcome, DeliveryRequest, DispatchReport, Dispatcher};
use crate::error::AlertError;
use crate::location::Location;
use crate::models::{ChannelKind, HealthEvent, OutbreakEvent, VaccinationEvent};
use crate::notice::render_notice;
use crate::selector::AlertSelector;
use crate::source::RecordSource;

/// A composed digest and what happened when it was sent.
#[derive(Debug, Clone)]
pub struct DigestRun {
    pub message: ComposedMessage,
    pub report: DispatchReport,
}

/// Ties a record source, the configuration and a dispatcher together.
pub struct AlertService {
    config: Arc<AlertConfig>,
    source: Arc<dyn RecordSource>,
    dispatcher: Dispatcher,
}

impl AlertService {
    pub fn new(config: AlertConfig, source: Arc<dyn RecordSource>, dispatcher: Dispatcher) -> Self {
        Self {
            config: Arc::new(config),
            source,
            dispatcher,
        }
    }

    /// Build with channels created from the configured credentials.
    pub fn from_config(config: AlertConfig, source: Arc<dyn RecordSource>) -> Self {
        let dispatcher = Dispatcher::from_config(&config);
        Self::new(config, source, dispatcher)
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Select and compose the digest for a location without sending it.
    #[instrument(skip(self, location), fields(location = %location))]
    pub async fn compose_digest(
        &self,
        location: &Location,
        reference_date: NaiveDate,
    ) -> Result<ComposedMessage, AlertError> {
        if location.is_empty() {
            return Err(AlertError::MissingLocation);
        }

        let outbreaks = self.source.list_outbreaks().await?;
        let vaccinations = self.source.list_vaccinations().await?;

        let buckets = AlertSelector::new(&self.config).select(&outbreaks, &vaccinations, location, reference_date);
        let message = MessageComposer::new(&self.config).compose(&buckets, location, reference_date);

        info!(
            vaccinations = message.vaccinations.matched,
            outbreaks = message.outbreaks.matched,
            "Digest composed"
        );
        Ok(message)
    }

    /// Compose the digest for a location and deliver it to each recipient.
    ///
    /// Returns an error only for caller mistakes or an unreadable record
    /// source. Delivery problems are reported per recipient in the report.
    pub async fn run_digest(
        &self,
        location: &Location,
        reference_date: NaiveDate,
        channel: ChannelKind,
        recipients: &[String],
    ) -> Result<DigestRun, AlertError> {
        if location.is_empty() {
            return Err(AlertError::MissingLocation);
        }
        if recipients.is_empty() {
            return Err(AlertError::NoRecipients);
        }

        let message = self.compose_digest(location, reference_date).await?;
        let outbound = OutboundMessage::new(message.subject.clone(), message.body.clone());

        let requests = recipients
            .iter()
            .map(|recipient| DeliveryRequest {
                channel,
                recipient: recipient.clone(),
                message: outbound.clone(),
            })
            .collect();

        let report = self.dispatcher.dispatch(requests).await;
        Ok(DigestRun { message, report })
    }

    /// Send the real-time notice for a written record to matching subscribers.
    ///
    /// Each subscriber is reached over their preferred channel. A subscriber
    /// without an address for it gets a failed outcome and no attempt.
    #[instrument(skip(self, event), fields(kind = event.kind(), id = event.id()))]
    pub async fn notify_event(&self, event: &HealthEvent) -> Result<DispatchReport, AlertError> {
        let location = event.location();
        if location.is_empty() {
            warn!("Event has no state, no subscribers to notify");
            return Ok(DispatchReport::default());
        }

        let subscribers = self.source.list_subscribers(location).await?;
        let mut requests = Vec::with_capacity(subscribers.len());
        let mut unreachable = DispatchReport::default();

        for subscriber in subscribers.iter().filter(|s| s.notifications_enabled) {
            let channel = subscriber.preferred_channel;
            match subscriber.address_for(channel) {
                Some(address) => requests.push(DeliveryRequest {
                    channel,
                    recipient: address.to_string(),
                    message: render_notice(subscriber, event),
                }),
                None => {
                    warn!(subscriber = %subscriber.id, channel = %channel, "Subscriber has no address for preferred channel");
                    unreachable.outcomes.push(DeliveryOutcome::failed(
                        channel,
                        &subscriber.id,
                        format!("subscriber has no {} address", channel),
                    ));
                }
            }
        }

        info!(recipients = requests.len(), "Sending real-time notices");
        let mut report = self.dispatcher.dispatch(requests).await;
        report.merge(unreachable);
        Ok(report)
    }

    /// Hook for the record-write path after an outbreak commit.
    ///
    /// Runs in the background so the caller's transaction is never held up.
    pub fn on_outbreak_written(self: &Arc<Self>, event: OutbreakEvent) -> JoinHandle<DispatchReport> {
        self.spawn_notify(HealthEvent::Outbreak(event))
    }

    /// Hook for the record-write path after a vaccination commit.
    pub fn on_vaccination_written(self: &Arc<Self>, event: VaccinationEvent) -> JoinHandle<DispatchReport> {
        self.spawn_notify(HealthEvent::Vaccination(event))
    }

    fn spawn_notify(self: &Arc<Self>, event: HealthEvent) -> JoinHandle<DispatchReport> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            match service.notify_event(&event).await {
                Ok(report) => report,
                Err(e) => {
                    warn!(error = %e, kind = event.kind(), id = event.id(), "Real-time notification failed");
                    DispatchReport::default()
                }
            }
        })
    }
}

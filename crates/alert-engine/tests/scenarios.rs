//! End-to-end scenarios for digest and real-time dispatch.
//!
//! All tests run against an in-memory record source and fake channels; no
//! network is touched.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alert_engine::{
    AlertConfig, AlertError, AlertService, ChannelError, ChannelKind, DeliveryChannel,
    DeliveryReceipt, DeliveryStatus, Dispatcher, HealthEvent, InMemorySource, Location,
    OutboundMessage, OutbreakEvent, Severity, Subscriber, VaccinationEvent,
};
use async_trait::async_trait;
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Fake channel that records calls and optionally fails one recipient.
struct FakeChannel {
    kind: ChannelKind,
    calls: AtomicUsize,
    messages: Mutex<Vec<(String, OutboundMessage)>>,
    fail_recipient: Option<String>,
}

impl FakeChannel {
    fn new(kind: ChannelKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            calls: AtomicUsize::new(0),
            messages: Mutex::new(Vec::new()),
            fail_recipient: None,
        })
    }

    fn failing_for(kind: ChannelKind, recipient: &str) -> Arc<Self> {
        Arc::new(Self {
            kind,
            calls: AtomicUsize::new(0),
            messages: Mutex::new(Vec::new()),
            fail_recipient: Some(recipient.to_string()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryChannel for FakeChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn deliver(
        &self,
        message: &OutboundMessage,
        recipient: &str,
    ) -> Result<DeliveryReceipt, ChannelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_recipient.as_deref() == Some(recipient) {
            return Err(ChannelError::Transport("connection reset".to_string()));
        }
        self.messages
            .lock()
            .unwrap()
            .push((recipient.to_string(), message.clone()));
        Ok(DeliveryReceipt::default())
    }
}

fn dengue() -> OutbreakEvent {
    OutbreakEvent {
        id: "OUT001".to_string(),
        disease: "Dengue".to_string(),
        report_date: Some(date(2024, 1, 15)),
        location: Location::new("Delhi", "New Delhi"),
        cases_reported: 45,
        deaths: 2,
        severity: Severity::parse("moderate"),
        confirmed: true,
        notes: "Monsoon-related outbreak".to_string(),
    }
}

fn booster() -> VaccinationEvent {
    VaccinationEvent {
        id: "VAC001".to_string(),
        location: Location::new("Delhi", "New Delhi"),
        start_date: Some(date(2024, 1, 10)),
        end_date: Some(date(2024, 12, 31)),
        vaccine_name: "COVID-19 Booster".to_string(),
        target_population: "Adults 18+".to_string(),
        doses_allocated: 10000,
        doses_administered: 7500,
        partner_org: "WHO".to_string(),
    }
}

fn subscriber(id: &str, district: &str, channel: ChannelKind, enabled: bool) -> Subscriber {
    Subscriber {
        id: id.to_string(),
        name: format!("User {id}"),
        email: Some(format!("{id}@example.org")),
        whatsapp: Some(format!("+9100000{id}")),
        preferred_channel: channel,
        location: Location::new("Delhi", district),
        notifications_enabled: enabled,
    }
}

fn recipients(list: &[&str]) -> Vec<String> {
    list.iter().map(|r| r.to_string()).collect()
}

#[tokio::test]
async fn delhi_digest_places_records_in_priority_buckets() {
    let config = AlertConfig::default();
    let source = Arc::new(InMemorySource::default().with_outbreak(dengue()).with_vaccination(booster()));
    let channel = FakeChannel::new(ChannelKind::WhatsApp);
    let dispatcher = Dispatcher::new(&config).with_channel(channel.clone());
    let service = AlertService::new(config, source, dispatcher);

    let run = service
        .run_digest(
            &Location::new("Delhi", "New Delhi"),
            date(2024, 1, 20),
            ChannelKind::WhatsApp,
            &recipients(&["+919876543210"]),
        )
        .await
        .unwrap();

    let body = &run.message.body;
    assert!(body.starts_with("Health Alerts for Delhi, New Delhi - 2024-01-20"));
    assert!(body.contains("- ONGOING: COVID-19 Booster for Adults 18+ in New Delhi."));
    assert!(body.contains("- Dengue (MODERATE): 45 cases in New Delhi on 2024-01-15. Confirmed: yes."));
    assert!(!body.contains("...and"));
    assert_eq!(run.message.vaccinations.included, 1);
    assert_eq!(run.message.outbreaks.included, 1);

    assert_eq!(run.report.sent(), 1);
    assert_eq!(channel.calls(), 1);
    let delivered = channel.messages.lock().unwrap();
    assert_eq!(delivered[0].0, "+919876543210");
    assert_eq!(&delivered[0].1.body, body);
}

#[tokio::test]
async fn digest_buckets_match_selector_for_scenario() {
    let config = AlertConfig::default();
    let buckets = alert_engine::AlertSelector::new(&config).select(
        &[dengue()],
        &[booster()],
        &Location::new("Delhi", "New Delhi"),
        date(2024, 1, 20),
    );
    assert_eq!(buckets.serious_outbreaks, vec![dengue()]);
    assert!(buckets.other_outbreaks.is_empty());
    assert_eq!(buckets.ongoing_vaccinations, vec![booster()]);
    assert!(buckets.upcoming_vaccinations.is_empty());
}

#[tokio::test]
async fn missing_credentials_skip_every_recipient() {
    let config = AlertConfig::default();
    let source = Arc::new(InMemorySource::default().with_outbreak(dengue()));
    let service = AlertService::from_config(config, source);

    let run = service
        .run_digest(
            &Location::state_wide("Delhi"),
            date(2024, 1, 20),
            ChannelKind::Email,
            &recipients(&["a@example.org", "b@example.org", "c@example.org"]),
        )
        .await
        .unwrap();

    assert_eq!(run.report.outcomes.len(), 3);
    assert!(run
        .report
        .outcomes
        .iter()
        .all(|o| o.status == DeliveryStatus::CredentialsMissing));
}

#[tokio::test]
async fn dry_run_never_calls_the_channel() {
    let config = AlertConfig::default().with_dry_run(true);
    let source = Arc::new(InMemorySource::default().with_vaccination(booster()));
    let channel = FakeChannel::new(ChannelKind::Email);
    let dispatcher = Dispatcher::new(&config).with_channel(channel.clone());
    let service = AlertService::new(config, source, dispatcher);

    let run = service
        .run_digest(
            &Location::state_wide("Delhi"),
            date(2024, 1, 20),
            ChannelKind::Email,
            &recipients(&["a@example.org", "b@example.org"]),
        )
        .await
        .unwrap();

    assert_eq!(run.report.dry_run(), 2);
    assert_eq!(channel.calls(), 0);
    assert!(run.message.body.contains("COVID-19 Booster"));
}

#[tokio::test]
async fn one_failing_recipient_does_not_stop_the_digest() {
    let config = AlertConfig::default();
    let source = Arc::new(InMemorySource::default().with_outbreak(dengue()));
    let channel = FakeChannel::failing_for(ChannelKind::WhatsApp, "+2");
    let dispatcher = Dispatcher::new(&config).with_channel(channel.clone());
    let service = AlertService::new(config, source, dispatcher);

    let run = service
        .run_digest(
            &Location::state_wide("Delhi"),
            date(2024, 1, 20),
            ChannelKind::WhatsApp,
            &recipients(&["+1", "+2", "+3"]),
        )
        .await
        .unwrap();

    assert_eq!(channel.calls(), 3);
    assert_eq!(run.report.sent(), 2);
    assert_eq!(run.report.failed(), 1);
    let failed = run
        .report
        .outcomes
        .iter()
        .find(|o| o.status == DeliveryStatus::Failed)
        .unwrap();
    assert_eq!(failed.recipient, "+2");
    assert!(failed.detail.as_deref().unwrap().contains("connection reset"));
}

#[tokio::test]
async fn digest_without_location_is_caller_error() {
    let config = AlertConfig::default();
    let service = AlertService::from_config(config, Arc::new(InMemorySource::default()));

    let result = service
        .run_digest(
            &Location::new("  ", "New Delhi"),
            date(2024, 1, 20),
            ChannelKind::Email,
            &recipients(&["a@example.org"]),
        )
        .await;
    assert!(matches!(result, Err(AlertError::MissingLocation)));

    let result = service
        .run_digest(&Location::state_wide("Delhi"), date(2024, 1, 20), ChannelKind::Email, &[])
        .await;
    assert!(matches!(result, Err(AlertError::NoRecipients)));
}

#[tokio::test]
async fn digest_caps_vaccinations_at_five() {
    let config = AlertConfig::default();
    let mut source = InMemorySource::default();
    for day in 0..3 {
        source = source.with_vaccination(VaccinationEvent {
            id: format!("ongoing-{day}"),
            vaccine_name: format!("Ongoing{day}"),
            start_date: Some(date(2024, 1, 10 + day)),
            ..booster()
        });
    }
    for day in 0..5 {
        source = source.with_vaccination(VaccinationEvent {
            id: format!("upcoming-{day}"),
            vaccine_name: format!("Upcoming{day}"),
            start_date: Some(date(2024, 2, 1 + day)),
            end_date: Some(date(2024, 3, 1)),
            ..booster()
        });
    }
    let service = AlertService::from_config(config, Arc::new(source));

    let message = service
        .compose_digest(&Location::new("Delhi", "New Delhi"), date(2024, 1, 20))
        .await
        .unwrap();

    assert_eq!(message.body.matches("- ONGOING:").count(), 3);
    assert_eq!(message.body.matches("- UPCOMING:").count(), 2);
    assert!(message.body.contains("...and 3 more vaccination events"));
}

#[tokio::test]
async fn realtime_outbreak_reaches_matching_opted_in_subscribers() {
    let config = AlertConfig::default();
    let source = Arc::new(
        InMemorySource::default()
            .with_subscriber(subscriber("1", "New Delhi", ChannelKind::Email, true))
            .with_subscriber(subscriber("2", "New Delhi", ChannelKind::WhatsApp, true))
            .with_subscriber(subscriber("3", "New Delhi", ChannelKind::Email, false))
            .with_subscriber(subscriber("4", "North Delhi", ChannelKind::Email, true)),
    );
    let email = FakeChannel::new(ChannelKind::Email);
    let whatsapp = FakeChannel::new(ChannelKind::WhatsApp);
    let dispatcher = Dispatcher::new(&config)
        .with_channel(email.clone())
        .with_channel(whatsapp.clone());
    let service = Arc::new(AlertService::new(config, source, dispatcher));

    let report = service.on_outbreak_written(dengue()).await.unwrap();

    assert_eq!(report.sent(), 2);
    assert_eq!(email.calls(), 1);
    assert_eq!(whatsapp.calls(), 1);

    let emails = email.messages.lock().unwrap();
    assert_eq!(emails[0].0, "1@example.org");
    assert_eq!(emails[0].1.subject, "Health Alert: New Outbreak in New Delhi, Delhi");
    assert!(emails[0].1.body.starts_with("Dear User 1,"));
    assert!(emails[0].1.body.contains("Disease: Dengue"));

    let texts = whatsapp.messages.lock().unwrap();
    assert_eq!(texts[0].0, "+91000002");
}

#[tokio::test]
async fn realtime_vaccination_reports_unreachable_subscriber() {
    let config = AlertConfig::default();
    let mut no_phone = subscriber("5", "New Delhi", ChannelKind::WhatsApp, true);
    no_phone.whatsapp = None;
    let source = Arc::new(
        InMemorySource::default()
            .with_subscriber(no_phone)
            .with_subscriber(subscriber("6", "", ChannelKind::Email, true)),
    );
    let email = FakeChannel::new(ChannelKind::Email);
    let dispatcher = Dispatcher::new(&config).with_channel(email.clone());
    let service = Arc::new(AlertService::new(config, source, dispatcher));

    let report = service.on_vaccination_written(booster()).await.unwrap();

    assert_eq!(report.sent(), 1);
    assert_eq!(report.failed(), 1);
    let failed = report
        .outcomes
        .iter()
        .find(|o| o.status == DeliveryStatus::Failed)
        .unwrap();
    assert_eq!(failed.recipient, "5");
    assert_eq!(failed.channel, ChannelKind::WhatsApp);

    let emails = email.messages.lock().unwrap();
    assert!(emails[0].1.subject.ends_with("New Campaign in Delhi"));
}

#[tokio::test]
async fn realtime_without_credentials_never_raises() {
    let config = AlertConfig::default();
    let source = Arc::new(
        InMemorySource::default().with_subscriber(subscriber("1", "New Delhi", ChannelKind::Email, true)),
    );
    let service = AlertService::from_config(config, source);

    let report = service
        .notify_event(&HealthEvent::Outbreak(dengue()))
        .await
        .unwrap();
    assert_eq!(report.skipped(), 1);
}

//! Real-time notice templates.

use crate::channel::OutboundMessage;
use crate::composer::fmt_date;
use crate::models::{HealthEvent, OutbreakEvent, Subscriber, VaccinationEvent};

const SIGN_OFF: &str = "Stay safe and healthy!\n\nHealth Monitoring System";

/// Render the single-event notice for one subscriber.
pub fn render_notice(subscriber: &Subscriber, event: &HealthEvent) -> OutboundMessage {
    match event {
        HealthEvent::Outbreak(outbreak) => outbreak_notice(subscriber, outbreak),
        HealthEvent::Vaccination(campaign) => vaccination_notice(subscriber, campaign),
    }
}

fn outbreak_notice(subscriber: &Subscriber, outbreak: &OutbreakEvent) -> OutboundMessage {
    let subject = format!("Health Alert: New Outbreak in {}", area(subscriber));
    let body = format!(
        "Dear {},\n\n\
         A new outbreak has been reported in your area:\n\n\
         Disease: {}\n\
         Location: {}\n\
         Cases: {}\n\
         Severity: {}\n\
         Reported: {}\n\n\
         {}",
        greeting_name(subscriber),
        outbreak.disease,
        outbreak.location,
        outbreak.cases_reported,
        outbreak.severity,
        fmt_date(outbreak.report_date),
        SIGN_OFF
    );
    OutboundMessage::new(subject, body)
}

fn vaccination_notice(subscriber: &Subscriber, campaign: &VaccinationEvent) -> OutboundMessage {
    let subject = format!("Vaccination Update: New Campaign in {}", area(subscriber));
    let body = format!(
        "Dear {},\n\n\
         A new vaccination campaign is available in your area:\n\n\
         Vaccine: {}\n\
         Location: {}\n\
         Target: {}\n\
         Start Date: {}\n\
         End Date: {}\n\n\
         {}",
        greeting_name(subscriber),
        campaign.vaccine_name,
        campaign.location,
        campaign.target_population,
        fmt_date(campaign.start_date),
        fmt_date(campaign.end_date),
        SIGN_OFF
    );
    OutboundMessage::new(subject, body)
}

/// Subscriber area as "District, State", or just the state.
fn area(subscriber: &Subscriber) -> String {
    let location = &subscriber.location;
    if location.has_district() {
        format!("{}, {}", location.district, location.state)
    } else {
        location.state.clone()
    }
}

fn greeting_name(subscriber: &Subscriber) -> &str {
    let name = subscriber.name.trim();
    if name.is_empty() {
        "Subscriber"
    } else {
        name
    }
}

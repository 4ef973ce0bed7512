//! Record types read from the record store.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::location::Location;
use crate::severity::Severity;

/// A delivery channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    Email,
    WhatsApp,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Email => "email",
            ChannelKind::WhatsApp => "whatsapp",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "email" | "mail" => Ok(ChannelKind::Email),
            "whatsapp" | "wa" => Ok(ChannelKind::WhatsApp),
            other => Err(format!("unknown channel: {}", other)),
        }
    }
}

/// A user who may receive notices for their home location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub preferred_channel: ChannelKind,
    pub location: Location,
    /// Opt-in for real-time notices.
    #[serde(default)]
    pub notifications_enabled: bool,
}

impl Subscriber {
    /// Address for a channel, if the subscriber has a non-blank one.
    pub fn address_for(&self, channel: ChannelKind) -> Option<&str> {
        let address = match channel {
            ChannelKind::Email => self.email.as_deref(),
            ChannelKind::WhatsApp => self.whatsapp.as_deref(),
        };
        address.map(str::trim).filter(|a| !a.is_empty())
    }
}

/// A disease outbreak report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutbreakEvent {
    pub id: String,
    pub disease: String,
    #[serde(default, deserialize_with = "lenient::date")]
    pub report_date: Option<NaiveDate>,
    pub location: Location,
    #[serde(default, deserialize_with = "lenient::count_u32")]
    pub cases_reported: u32,
    #[serde(default, deserialize_with = "lenient::count_u32")]
    pub deaths: u32,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub confirmed: bool,
    #[serde(default)]
    pub notes: String,
}

/// A vaccination campaign.
///
/// `end_date >= start_date` and `doses_administered <= doses_allocated` are
/// not checked here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinationEvent {
    pub id: String,
    pub location: Location,
    #[serde(default, deserialize_with = "lenient::date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub end_date: Option<NaiveDate>,
    pub vaccine_name: String,
    #[serde(default)]
    pub target_population: String,
    #[serde(default, deserialize_with = "lenient::count_u64")]
    pub doses_allocated: u64,
    #[serde(default, deserialize_with = "lenient::count_u64")]
    pub doses_administered: u64,
    #[serde(default)]
    pub partner_org: String,
}

/// A newly written record that may trigger real-time notices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HealthEvent {
    Outbreak(OutbreakEvent),
    Vaccination(VaccinationEvent),
}

impl HealthEvent {
    pub fn location(&self) -> &Location {
        match self {
            HealthEvent::Outbreak(o) => &o.location,
            HealthEvent::Vaccination(v) => &v.location,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            HealthEvent::Outbreak(o) => &o.id,
            HealthEvent::Vaccination(v) => &v.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HealthEvent::Outbreak(_) => "outbreak",
            HealthEvent::Vaccination(_) => "vaccination",
        }
    }
}

impl From<OutbreakEvent> for HealthEvent {
    fn from(event: OutbreakEvent) -> Self {
        HealthEvent::Outbreak(event)
    }
}

impl From<VaccinationEvent> for HealthEvent {
    fn from(event: VaccinationEvent) -> Self {
        HealthEvent::Vaccination(event)
    }
}

//! Date parsing and time-window classification.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

use crate::config::AlertConfig;

/// Timestamp layouts tried before plain dates.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Month-first and unambiguous layouts.
const MONTH_FIRST_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%m/%d/%y",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Day-first layouts, tried only after every month-first layout failed.
const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y"];

/// Parse a textual date, month-first with a day-first fallback.
///
/// Returns `None` for empty or unrecognized input; callers treat that as a
/// record without the date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(ts.date());
        }
    }

    MONTH_FIRST_FORMATS
        .iter()
        .chain(DAY_FIRST_FORMATS)
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Which vaccination bucket a campaign belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignPhase {
    Ongoing,
    Upcoming,
}

/// Classifies records against a fixed reference day.
#[derive(Debug, Clone, Copy)]
pub struct TemporalClassifier {
    today: NaiveDate,
    recency_cutoff: NaiveDate,
    upcoming_cutoff: NaiveDate,
}

impl TemporalClassifier {
    pub fn new(today: NaiveDate, config: &AlertConfig) -> Self {
        Self::with_windows(today, config.recency_window_days, config.upcoming_window_days)
    }

    pub fn with_windows(today: NaiveDate, recency_days: u32, upcoming_days: u32) -> Self {
        let recency_cutoff = today
            .checked_sub_days(Days::new(recency_days.into()))
            .unwrap_or(NaiveDate::MIN);
        let upcoming_cutoff = today
            .checked_add_days(Days::new(upcoming_days.into()))
            .unwrap_or(NaiveDate::MAX);
        Self {
            today,
            recency_cutoff,
            upcoming_cutoff,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Ongoing when `start <= today <= end`, upcoming when the start falls in
    /// `(today, today + window]`, otherwise neither.
    pub fn classify_campaign(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Option<CampaignPhase> {
        let start = start?;
        if let Some(end) = end {
            if start <= self.today && self.today <= end {
                return Some(CampaignPhase::Ongoing);
            }
        }
        if start > self.today && start <= self.upcoming_cutoff {
            return Some(CampaignPhase::Upcoming);
        }
        None
    }

    /// Whether a report date falls on or after `today - window`.
    ///
    /// Dates after today still count.
    pub fn is_recent(&self, report_date: Option<NaiveDate>) -> bool {
        report_date.is_some_and(|date| date >= self.recency_cutoff)
    }
}

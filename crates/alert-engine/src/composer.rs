//! Digest message composition.

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::AlertConfig;
use crate::location::Location;
use crate::models::{OutbreakEvent, VaccinationEvent};
use crate::selector::AlertBuckets;

/// Footer appended to every digest.
pub const DIGEST_FOOTER: &str =
    "Note: Confirm details with your local health department before acting on this alert.";

/// Items shown versus matched for one digest section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionCounts {
    pub included: usize,
    pub matched: usize,
}

impl SectionCounts {
    /// Items left out by the section cap.
    pub fn overflow(&self) -> usize {
        self.matched.saturating_sub(self.included)
    }
}

/// A rendered digest ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    /// Subject line for channels that carry one.
    pub subject: String,
    pub body: String,
    pub location: Location,
    pub reference_date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub vaccinations: SectionCounts,
    pub outbreaks: SectionCounts,
}

/// Renders selected buckets into a single bounded message.
pub struct MessageComposer<'a> {
    config: &'a AlertConfig,
}

impl<'a> MessageComposer<'a> {
    pub fn new(config: &'a AlertConfig) -> Self {
        Self { config }
    }

    /// Compose the digest body.
    ///
    /// Sections appear in a fixed order (header, vaccinations, outbreaks,
    /// footer). Each section is capped at `max_alert_items` on its own, with
    /// higher-priority buckets filling the budget first.
    pub fn compose(
        &self,
        buckets: &AlertBuckets,
        location: &Location,
        reference_date: NaiveDate,
    ) -> ComposedMessage {
        let cap = self.config.max_alert_items;
        let mut lines = Vec::new();

        lines.push(format!("Health Alerts for {} - {}", location, reference_date));
        lines.push(String::new());

        let vaccinations = self.vaccination_section(buckets, cap, &mut lines);
        lines.push(String::new());

        let outbreaks = self.outbreak_section(buckets, cap, &mut lines);
        lines.push(String::new());

        lines.push(DIGEST_FOOTER.to_string());

        ComposedMessage {
            subject: format!("Health Alerts for {}", location),
            body: lines.join("\n"),
            location: location.clone(),
            reference_date,
            generated_at: Utc::now(),
            vaccinations,
            outbreaks,
        }
    }

    fn vaccination_section(&self, buckets: &AlertBuckets, cap: usize, lines: &mut Vec<String>) -> SectionCounts {
        let matched = buckets.vaccination_count();
        if matched == 0 {
            lines.push(format!(
                "Vaccination updates: No ongoing or upcoming campaigns in the next {} days.",
                self.config.upcoming_window_days
            ));
            return SectionCounts::default();
        }

        lines.push("Vaccination updates:".to_string());
        let ongoing: Vec<_> = buckets.ongoing_vaccinations.iter().take(cap).collect();
        let upcoming: Vec<_> = buckets
            .upcoming_vaccinations
            .iter()
            .take(cap - ongoing.len())
            .collect();

        lines.extend(ongoing.iter().map(|v| ongoing_line(v)));
        lines.extend(upcoming.iter().map(|v| upcoming_line(v)));

        let counts = SectionCounts {
            included: ongoing.len() + upcoming.len(),
            matched,
        };
        if counts.overflow() > 0 {
            lines.push(format!("...and {} more vaccination events.", counts.overflow()));
        }
        counts
    }

    fn outbreak_section(&self, buckets: &AlertBuckets, cap: usize, lines: &mut Vec<String>) -> SectionCounts {
        let window = self.config.recency_window_days;
        let matched = buckets.outbreak_count();
        if matched == 0 {
            lines.push(format!("No outbreaks reported in the last {} days.", window));
            return SectionCounts::default();
        }

        lines.push(format!(
            "Outbreak reports (last {} days): {} (priority shown first)",
            window, matched
        ));
        let serious: Vec<_> = buckets.serious_outbreaks.iter().take(cap).collect();
        let other: Vec<_> = buckets
            .other_outbreaks
            .iter()
            .take(cap - serious.len())
            .collect();

        lines.extend(serious.iter().map(|o| serious_line(o)));
        lines.extend(other.iter().map(|o| other_line(o)));

        let counts = SectionCounts {
            included: serious.len() + other.len(),
            matched,
        };
        if counts.overflow() > 0 {
            lines.push(format!("...and {} more recent reports.", counts.overflow()));
        }
        counts
    }
}

fn ongoing_line(v: &VaccinationEvent) -> String {
    format!(
        "- ONGOING: {} for {} in {}. ({} to {}), doses administered: {}",
        v.vaccine_name,
        population(v),
        v.location.most_specific(),
        fmt_date(v.start_date),
        fmt_date(v.end_date),
        v.doses_administered
    )
}

fn upcoming_line(v: &VaccinationEvent) -> String {
    format!(
        "- UPCOMING: {} for {} in {}. Starts: {}. Allocated: {}",
        v.vaccine_name,
        population(v),
        v.location.most_specific(),
        fmt_date(v.start_date),
        v.doses_allocated
    )
}

fn serious_line(o: &OutbreakEvent) -> String {
    format!(
        "- {} ({}): {} cases in {} on {}. Confirmed: {}.",
        o.disease,
        o.severity.as_str().to_uppercase(),
        o.cases_reported,
        o.location.most_specific(),
        fmt_date(o.report_date),
        if o.confirmed { "yes" } else { "no" }
    )
}

fn other_line(o: &OutbreakEvent) -> String {
    format!(
        "- {} ({}): {} cases in {} on {}.",
        o.disease,
        o.severity,
        o.cases_reported,
        o.location.most_specific(),
        fmt_date(o.report_date)
    )
}

fn population(v: &VaccinationEvent) -> &str {
    if v.target_population.trim().is_empty() {
        "all residents"
    } else {
        &v.target_population
    }
}

pub(crate) fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "unknown date".to_string())
}

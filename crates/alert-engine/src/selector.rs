//! Alert selection: location filter, time windows and priority buckets.

use std::fmt;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::AlertConfig;
use crate::location::Location;
use crate::models::{OutbreakEvent, VaccinationEvent};
use crate::severity::{sort_for_display, Priority, SeverityRanker};
use crate::temporal::{CampaignPhase, TemporalClassifier};

/// Label of an alert bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketLabel {
    Ongoing,
    Upcoming,
    Serious,
    Other,
}

impl BucketLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketLabel::Ongoing => "ongoing",
            BucketLabel::Upcoming => "upcoming",
            BucketLabel::Serious => "serious",
            BucketLabel::Other => "other",
        }
    }
}

impl fmt::Display for BucketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four ordered buckets selected for one location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertBuckets {
    pub ongoing_vaccinations: Vec<VaccinationEvent>,
    pub upcoming_vaccinations: Vec<VaccinationEvent>,
    pub serious_outbreaks: Vec<OutbreakEvent>,
    pub other_outbreaks: Vec<OutbreakEvent>,
}

impl AlertBuckets {
    pub fn vaccination_count(&self) -> usize {
        self.ongoing_vaccinations.len() + self.upcoming_vaccinations.len()
    }

    pub fn outbreak_count(&self) -> usize {
        self.serious_outbreaks.len() + self.other_outbreaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vaccination_count() == 0 && self.outbreak_count() == 0
    }

    /// Bucket sizes, in display order.
    pub fn counts(&self) -> [(BucketLabel, usize); 4] {
        [
            (BucketLabel::Ongoing, self.ongoing_vaccinations.len()),
            (BucketLabel::Upcoming, self.upcoming_vaccinations.len()),
            (BucketLabel::Serious, self.serious_outbreaks.len()),
            (BucketLabel::Other, self.other_outbreaks.len()),
        ]
    }
}

/// Filters the full record set down to one location's buckets.
pub struct AlertSelector<'a> {
    config: &'a AlertConfig,
}

impl<'a> AlertSelector<'a> {
    pub fn new(config: &'a AlertConfig) -> Self {
        Self { config }
    }

    /// Select and order the records relevant to `location` on `today`.
    ///
    /// Each record lands in at most one bucket of its type. Vaccinations are
    /// ordered by start date; outbreaks newest first, then by case count.
    pub fn select(
        &self,
        outbreaks: &[OutbreakEvent],
        vaccinations: &[VaccinationEvent],
        location: &Location,
        today: NaiveDate,
    ) -> AlertBuckets {
        let classifier = TemporalClassifier::new(today, self.config);
        let ranker = SeverityRanker::new(self.config);
        let mut buckets = AlertBuckets::default();

        for campaign in vaccinations.iter().filter(|v| location.matches(&v.location)) {
            match classifier.classify_campaign(campaign.start_date, campaign.end_date) {
                Some(CampaignPhase::Ongoing) => buckets.ongoing_vaccinations.push(campaign.clone()),
                Some(CampaignPhase::Upcoming) => buckets.upcoming_vaccinations.push(campaign.clone()),
                None => {}
            }
        }

        for report in outbreaks.iter().filter(|o| location.matches(&o.location)) {
            if !classifier.is_recent(report.report_date) {
                continue;
            }
            match ranker.classify(report) {
                Priority::Serious => buckets.serious_outbreaks.push(report.clone()),
                Priority::Other => buckets.other_outbreaks.push(report.clone()),
            }
        }

        buckets.ongoing_vaccinations.sort_by_key(|v| v.start_date);
        buckets.upcoming_vaccinations.sort_by_key(|v| v.start_date);
        sort_for_display(&mut buckets.serious_outbreaks);
        sort_for_display(&mut buckets.other_outbreaks);

        debug!(
            location = %location,
            today = %today,
            counts = ?buckets.counts(),
            "Selected alert buckets"
        );

        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn outbreak(id: &str, district: &str, day: u32, cases: u32, severity: &str) -> OutbreakEvent {
        OutbreakEvent {
            id: id.to_string(),
            disease: "Dengue".to_string(),
            report_date: Some(date(2024, 1, day)),
            location: Location::new("Delhi", district),
            cases_reported: cases,
            severity: Severity::parse(severity),
            ..Default::default()
        }
    }

    fn campaign(id: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> VaccinationEvent {
        VaccinationEvent {
            id: id.to_string(),
            location: Location::new("Delhi", "New Delhi"),
            start_date: start,
            end_date: end,
            vaccine_name: "Polio".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_yields_empty_buckets() {
        let config = AlertConfig::default();
        let buckets = AlertSelector::new(&config).select(
            &[],
            &[],
            &Location::state_wide("Delhi"),
            date(2024, 1, 20),
        );
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_location_filter() {
        let config = AlertConfig::default();
        let mut elsewhere = outbreak("goa", "North Goa", 18, 10, "high");
        elsewhere.location = Location::new("Goa", "North Goa");
        let outbreaks = vec![
            outbreak("nd", "new delhi", 18, 10, "high"),
            outbreak("north", "North Delhi", 18, 10, "high"),
            elsewhere,
        ];

        let selector = AlertSelector::new(&config);
        let district = selector.select(&outbreaks, &[], &Location::new(" delhi ", "NEW DELHI"), date(2024, 1, 20));
        assert_eq!(district.serious_outbreaks.len(), 1);
        assert_eq!(district.serious_outbreaks[0].id, "nd");

        let state = selector.select(&outbreaks, &[], &Location::state_wide("DELHI"), date(2024, 1, 20));
        assert_eq!(state.serious_outbreaks.len(), 2);
    }

    #[test]
    fn test_serious_and_other_partition_recent_reports() {
        let config = AlertConfig::default();
        let outbreaks = vec![
            outbreak("a", "New Delhi", 19, 5, "low"),
            outbreak("b", "New Delhi", 18, 60, "low"),
            outbreak("c", "New Delhi", 17, 5, "high"),
            outbreak("d", "New Delhi", 2, 500, "high"),
            OutbreakEvent {
                report_date: None,
                ..outbreak("e", "New Delhi", 1, 500, "high")
            },
            outbreak("f", "New Delhi", 6, 1, "unknown"),
        ];

        let buckets = AlertSelector::new(&config).select(
            &outbreaks,
            &[],
            &Location::new("Delhi", "New Delhi"),
            date(2024, 1, 20),
        );

        let serious: HashSet<_> = buckets.serious_outbreaks.iter().map(|o| o.id.as_str()).collect();
        let other: HashSet<_> = buckets.other_outbreaks.iter().map(|o| o.id.as_str()).collect();
        assert!(serious.is_disjoint(&other));
        let union: HashSet<_> = serious.union(&other).copied().collect();
        assert_eq!(union, HashSet::from(["a", "b", "c", "f"]));
        assert_eq!(
            buckets.serious_outbreaks.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec!["b", "c"]
        );
        assert_eq!(
            buckets.other_outbreaks.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "f"]
        );
    }

    #[test]
    fn test_future_reports_are_included() {
        let config = AlertConfig::default();
        let mut future = outbreak("future", "New Delhi", 1, 1, "low");
        future.report_date = Some(date(2024, 3, 1));
        let buckets = AlertSelector::new(&config).select(
            &[future],
            &[],
            &Location::state_wide("Delhi"),
            date(2024, 1, 20),
        );
        assert_eq!(buckets.other_outbreaks.len(), 1);
    }

    #[test]
    fn test_vaccination_buckets_are_exclusive_and_ordered() {
        let config = AlertConfig::default();
        let vaccinations = vec![
            campaign("later", Some(date(2024, 2, 10)), Some(date(2024, 3, 1))),
            campaign("soon", Some(date(2024, 1, 25)), None),
            campaign("running", Some(date(2024, 1, 10)), Some(date(2024, 12, 31))),
            campaign("started-first", Some(date(2024, 1, 1)), Some(date(2024, 2, 1))),
            campaign("ended", Some(date(2023, 12, 1)), Some(date(2024, 1, 1))),
            campaign("far", Some(date(2024, 6, 1)), Some(date(2024, 7, 1))),
            campaign("undated", None, None),
        ];

        let buckets = AlertSelector::new(&config).select(
            &[],
            &vaccinations,
            &Location::new("Delhi", "New Delhi"),
            date(2024, 1, 20),
        );

        let ongoing: Vec<_> = buckets.ongoing_vaccinations.iter().map(|v| v.id.as_str()).collect();
        let upcoming: Vec<_> = buckets.upcoming_vaccinations.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ongoing, vec!["started-first", "running"]);
        assert_eq!(upcoming, vec!["soon", "later"]);
    }

    #[test]
    fn test_selection_is_repeatable() {
        let config = AlertConfig::default();
        let outbreaks: Vec<_> = (0..6)
            .map(|i| outbreak(&format!("tie-{i}"), "New Delhi", 15, 10, "high"))
            .collect();
        let selector = AlertSelector::new(&config);
        let location = Location::state_wide("Delhi");
        let first = selector.select(&outbreaks, &[], &location, date(2024, 1, 20));
        let second = selector.select(&outbreaks, &[], &location, date(2024, 1, 20));
        assert_eq!(first, second);
        let ids: Vec<_> = first.serious_outbreaks.iter().map(|o| o.id.clone()).collect();
        assert_eq!(ids, vec!["tie-0", "tie-1", "tie-2", "tie-3", "tie-4", "tie-5"]);
    }
}

//! Outbreak severity tags, priority classification and display order.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::AlertConfig;
use crate::models::OutbreakEvent;

/// Severity tag attached to an outbreak report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Low,
    Moderate,
    High,
    /// Any other tag, stored trimmed and lower-cased.
    Unknown(String),
}

impl Severity {
    /// Parse a tag case-insensitively.
    pub fn parse(raw: &str) -> Self {
        let tag = raw.trim().to_lowercase();
        match tag.as_str() {
            "low" => Severity::Low,
            "moderate" => Severity::Moderate,
            "high" => Severity::High,
            _ => Severity::Unknown(tag),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Unknown(tag) => tag,
        }
    }

    /// High and moderate tags are always serious.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Severity::High | Severity::Moderate)
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Unknown(String::new())
    }
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        Severity::parse(&raw)
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbreak bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Serious,
    Other,
}

/// Decides which outbreaks are serious.
#[derive(Debug, Clone, Copy)]
pub struct SeverityRanker {
    cases_threshold: u32,
}

impl SeverityRanker {
    pub fn new(config: &AlertConfig) -> Self {
        Self::with_threshold(config.cases_threshold)
    }

    pub fn with_threshold(cases_threshold: u32) -> Self {
        Self { cases_threshold }
    }

    /// Serious when tagged high or moderate, or when cases reach the threshold.
    pub fn classify(&self, outbreak: &OutbreakEvent) -> Priority {
        if outbreak.severity.is_elevated() || outbreak.cases_reported >= self.cases_threshold {
            Priority::Serious
        } else {
            Priority::Other
        }
    }
}

/// Display order: newest report first, then most cases. Undated reports sort last.
pub fn display_order(a: &OutbreakEvent, b: &OutbreakEvent) -> Ordering {
    b.report_date
        .cmp(&a.report_date)
        .then_with(|| b.cases_reported.cmp(&a.cases_reported))
}

/// Stable sort into display order; equal keys keep their input order.
pub fn sort_for_display(outbreaks: &mut [OutbreakEvent]) {
    outbreaks.sort_by(display_order);
}

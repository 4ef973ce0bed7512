//! Engine configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use smtp_mailer::SmtpConfig;
use tracing::warn;
use whatsapp_client::TwilioConfig;

/// Default outbreak recency window in days.
pub const DEFAULT_RECENCY_WINDOW_DAYS: u32 = 14;
/// Default upcoming vaccination window in days.
pub const DEFAULT_UPCOMING_WINDOW_DAYS: u32 = 30;
/// Default case count at which an outbreak is serious regardless of its tag.
pub const DEFAULT_CASES_THRESHOLD: u32 = 50;
/// Default item cap per digest section.
pub const DEFAULT_MAX_ALERT_ITEMS: usize = 5;
/// Default bound on a single delivery attempt.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(20);
/// Default number of recipients delivered to at once.
pub const DEFAULT_DISPATCH_CONCURRENCY: usize = 4;

/// Configuration shared by the selector, composer and dispatcher.
///
/// Built once at startup and passed down; nothing reads the environment after that.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Trailing days within which an outbreak report counts as recent.
    pub recency_window_days: u32,
    /// Forward days within which a campaign start counts as upcoming.
    pub upcoming_window_days: u32,
    /// Case count that makes an outbreak serious.
    pub cases_threshold: u32,
    /// Items listed per digest section before the overflow line.
    pub max_alert_items: usize,
    /// Log messages instead of sending them.
    pub dry_run: bool,
    /// Upper bound on one delivery attempt.
    pub dispatch_timeout: Duration,
    /// Maximum concurrent deliveries.
    pub dispatch_concurrency: usize,
    /// Email channel credentials, if configured.
    pub smtp: Option<SmtpConfig>,
    /// WhatsApp channel credentials, if configured.
    pub whatsapp: Option<TwilioConfig>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            recency_window_days: DEFAULT_RECENCY_WINDOW_DAYS,
            upcoming_window_days: DEFAULT_UPCOMING_WINDOW_DAYS,
            cases_threshold: DEFAULT_CASES_THRESHOLD,
            max_alert_items: DEFAULT_MAX_ALERT_ITEMS,
            dry_run: false,
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
            dispatch_concurrency: DEFAULT_DISPATCH_CONCURRENCY,
            smtp: None,
            whatsapp: None,
        }
    }
}

impl AlertConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `RECENCY_WINDOW` - Outbreak recency window in days (default: 14)
    /// - `UPCOMING_WINDOW` - Upcoming campaign window in days (default: 30)
    /// - `CASES_THRESHOLD` - Cases that make an outbreak serious (default: 50)
    /// - `MAX_ALERT_ITEMS` - Items per digest section (default: 5)
    /// - `ALERT_DRY_RUN` - Log instead of sending (default: false)
    /// - `DISPATCH_TIMEOUT_SECS` - Per-attempt delivery timeout (default: 20)
    /// - `DISPATCH_CONCURRENCY` - Concurrent deliveries (default: 4)
    ///
    /// Channel credentials come from the `SMTP_*`/`EMAIL_*` and `TWILIO_*`
    /// variables. A channel whose credentials are missing stays unconfigured and
    /// its deliveries are skipped.
    pub fn from_env() -> Self {
        let smtp = match SmtpConfig::from_env() {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(error = %e, "Email channel not configured");
                None
            }
        };

        let whatsapp = match TwilioConfig::from_env() {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(error = %e, "WhatsApp channel not configured");
                None
            }
        };

        let dispatch_timeout = Duration::from_secs(parse_var(
            "DISPATCH_TIMEOUT_SECS",
            DEFAULT_DISPATCH_TIMEOUT.as_secs(),
        ));

        Self {
            recency_window_days: parse_var("RECENCY_WINDOW", DEFAULT_RECENCY_WINDOW_DAYS),
            upcoming_window_days: parse_var("UPCOMING_WINDOW", DEFAULT_UPCOMING_WINDOW_DAYS),
            cases_threshold: parse_var("CASES_THRESHOLD", DEFAULT_CASES_THRESHOLD),
            max_alert_items: parse_var("MAX_ALERT_ITEMS", DEFAULT_MAX_ALERT_ITEMS),
            dry_run: env::var("ALERT_DRY_RUN").map(|v| parse_flag(&v)).unwrap_or(false),
            dispatch_timeout,
            dispatch_concurrency: parse_var("DISPATCH_CONCURRENCY", DEFAULT_DISPATCH_CONCURRENCY)
                .max(1),
            smtp,
            whatsapp,
        }
    }

    pub fn with_recency_window(mut self, days: u32) -> Self {
        self.recency_window_days = days;
        self
    }

    pub fn with_upcoming_window(mut self, days: u32) -> Self {
        self.upcoming_window_days = days;
        self
    }

    pub fn with_cases_threshold(mut self, cases: u32) -> Self {
        self.cases_threshold = cases;
        self
    }

    pub fn with_max_alert_items(mut self, items: usize) -> Self {
        self.max_alert_items = items;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    /// Set the concurrency limit (at least 1).
    pub fn with_dispatch_concurrency(mut self, limit: usize) -> Self {
        self.dispatch_concurrency = limit.max(1);
        self
    }

    pub fn with_smtp(mut self, smtp: SmtpConfig) -> Self {
        self.smtp = Some(smtp);
        self
    }

    pub fn with_whatsapp(mut self, whatsapp: TwilioConfig) -> Self {
        self.whatsapp = Some(whatsapp);
        self
    }
}

/// Read and parse a variable, falling back to the default when unset or invalid.
fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(variable = name, value = %raw, default = %default, "Invalid value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AlertConfig::default();
        assert_eq!(config.recency_window_days, 14);
        assert_eq!(config.upcoming_window_days, 30);
        assert_eq!(config.cases_threshold, 50);
        assert_eq!(config.max_alert_items, 5);
        assert!(!config.dry_run);
        assert!(config.smtp.is_none());
        assert!(config.whatsapp.is_none());
    }

    #[test]
    fn test_builders() {
        let config = AlertConfig::default()
            .with_recency_window(7)
            .with_upcoming_window(10)
            .with_cases_threshold(100)
            .with_max_alert_items(3)
            .with_dry_run(true)
            .with_dispatch_concurrency(0);
        assert_eq!(config.recency_window_days, 7);
        assert_eq!(config.upcoming_window_days, 10);
        assert_eq!(config.cases_threshold, 100);
        assert_eq!(config.max_alert_items, 3);
        assert!(config.dry_run);
        assert_eq!(config.dispatch_concurrency, 1);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("YES"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_parse_var_falls_back_when_unset() {
        assert_eq!(parse_var("ALERT_ENGINE_TEST_UNSET_VARIABLE", 42u32), 42);
    }
}

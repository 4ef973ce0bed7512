//! Lenient field parsing for records arriving from outside.
//!
//! A malformed date reads as absent and a malformed count reads as 0, so one
//! bad field never rejects the whole record.

use chrono::NaiveDate;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use crate::temporal::parse_date;

/// Parse a non-negative count. Decimal text is truncated; anything else is 0.
pub fn parse_count(raw: &str) -> u64 {
    let value = raw.trim();
    if let Ok(n) = value.parse::<u64>() {
        return n;
    }
    match value.parse::<f64>() {
        Ok(f) => float_count(f),
        Err(_) => 0,
    }
}

fn float_count(f: f64) -> u64 {
    if f.is_finite() && f >= 0.0 {
        f.trunc().min(u64::MAX as f64) as u64
    } else {
        0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl RawCount {
    fn value(self) -> u64 {
        match self {
            RawCount::Unsigned(n) => n,
            RawCount::Signed(_) | RawCount::Other(_) => 0,
            RawCount::Float(f) => float_count(f),
            RawCount::Text(s) => parse_count(&s),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Number(i64),
    Text(String),
    Other(IgnoredAny),
}

pub(crate) fn count_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(Option::<RawCount>::deserialize(deserializer)?.map_or(0, RawCount::value))
}

pub(crate) fn count_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(u32::try_from(count_u64(deserializer)?).unwrap_or(u32::MAX))
}

pub(crate) fn date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    Ok(match Option::<RawDate>::deserialize(deserializer)? {
        Some(RawDate::Text(s)) => parse_date(&s),
        _ => None,
    })
}

pub(crate) fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<RawFlag>::deserialize(deserializer)? {
        Some(RawFlag::Bool(b)) => b,
        Some(RawFlag::Number(n)) => n != 0,
        Some(RawFlag::Text(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "y" | "1" | "t"
        ),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("45"), 45);
        assert_eq!(parse_count(" 12 "), 12);
        assert_eq!(parse_count("7.9"), 7);
        assert_eq!(parse_count("n/a"), 0);
        assert_eq!(parse_count("-3"), 0);
        assert_eq!(parse_count(""), 0);
    }
}

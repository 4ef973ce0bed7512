//! Lenient field coercion for imported records.
//!
//! Bad values never reject a record: counts fall back to zero and flags to
//! false.

/// Parse a non-negative count. Decimal text is truncated; anything else is 0.
pub fn count(raw: &str) -> u64 {
    alert_engine::parse_count(raw)
}

/// Narrow a count to `u32`, saturating.
pub fn count_u32(raw: &str) -> u32 {
    u32::try_from(count(raw)).unwrap_or(u32::MAX)
}

/// Convert a stored integer column, treating negatives as 0.
pub fn column_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

pub fn column_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Parse a yes/no style flag.
pub fn flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "t"
    )
}

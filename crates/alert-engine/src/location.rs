//! Location normalization and matching.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonicalize a state or district name.
///
/// Trims, collapses inner whitespace and title-cases each word, so
/// `"  new   DELHI "` becomes `"New Delhi"`.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        let mut prev_alpha = false;
        for c in word.chars() {
            if c.is_alphabetic() {
                if prev_alpha {
                    out.extend(c.to_lowercase());
                } else {
                    out.extend(c.to_uppercase());
                }
                prev_alpha = true;
            } else {
                out.push(c);
                prev_alpha = false;
            }
        }
    }
    out
}

/// Case- and whitespace-insensitive equality of two raw names.
pub fn same_place(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// A normalized (state, district) pair.
///
/// An empty district means the whole state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawLocation")]
pub struct Location {
    pub state: String,
    pub district: String,
}

#[derive(Deserialize)]
struct RawLocation {
    #[serde(default)]
    state: String,
    #[serde(default)]
    district: Option<String>,
}

impl From<RawLocation> for Location {
    fn from(raw: RawLocation) -> Self {
        Location::new(raw.state, raw.district.unwrap_or_default())
    }
}

impl Location {
    /// Build a location, normalizing both parts.
    pub fn new(state: impl AsRef<str>, district: impl AsRef<str>) -> Self {
        Self {
            state: normalize(state.as_ref()),
            district: normalize(district.as_ref()),
        }
    }

    /// A state-wide location with no district filter.
    pub fn state_wide(state: impl AsRef<str>) -> Self {
        Self::new(state, "")
    }

    /// Whether the state part is missing.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn has_district(&self) -> bool {
        !self.district.is_empty()
    }

    /// District if known, otherwise the state.
    pub fn most_specific(&self) -> &str {
        if self.has_district() {
            &self.district
        } else {
            &self.state
        }
    }

    /// Whether two locations refer to overlapping areas.
    ///
    /// States must be equal and non-empty. An empty district on either side
    /// matches every district of the state.
    pub fn matches(&self, other: &Location) -> bool {
        if self.state.is_empty() || self.state != other.state {
            return false;
        }
        !self.has_district() || !other.has_district() || self.district == other.district
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_district() {
            write!(f, "{}, {}", self.state, self.district)
        } else {
            write!(f, "{}", self.state)
        }
    }
}

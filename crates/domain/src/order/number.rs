//! Human-readable order number generation.

use chrono::{Datelike, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Receipt-style order number: `ORD` + two-digit year, month, day + a
/// four-digit zero-padded random suffix.
///
/// The 10,000-value suffix is not collision-free across a day's order
/// volume. Uniqueness is enforced by the storage layer's constraint;
/// the order service redraws on collision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Draws a fresh number for today's date. Re-invoked on every call,
    /// never cached.
    pub fn generate() -> Self {
        let suffix = rand::rng().random_range(0..10_000u16);
        Self::from_parts(Utc::now().date_naive(), suffix)
    }

    /// Builds the number for a specific date and suffix.
    pub fn from_parts(date: NaiveDate, suffix: u16) -> Self {
        Self(format!(
            "ORD{:02}{:02}{:02}{:04}",
            date.year().rem_euclid(100),
            date.month(),
            date.day(),
            suffix % 10_000
        ))
    }

    /// True when the value has the `ORD` + 10 digits shape.
    pub fn is_well_formed(value: &str) -> bool {
        value.len() == 13
            && value.starts_with("ORD")
            && value.as_bytes()[3..].iter().all(u8::is_ascii_digit)
    }

    /// Returns the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-point monetary amount in minor units (paise, cents, ...).
///
/// Trip prices and booking totals are integer arithmetic end to end; nothing
/// in the core ever touches floating point for money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount_minor: i64,
    pub currency: String,
}

impl Money {
    pub fn new(amount_minor: i64, currency: impl Into<String>) -> Self {
        Self {
            amount_minor,
            currency: currency.into(),
        }
    }

    /// Build from major units (e.g. whole rupees).
    pub fn from_major(amount_major: i64, currency: impl Into<String>) -> Self {
        Self::new(amount_major.saturating_mul(100), currency)
    }

    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(0, currency)
    }

    /// Per-seat price scaled to a seat count. Saturates instead of wrapping;
    /// a trip priced anywhere near i64::MAX minor units is already nonsense.
    pub fn for_seats(&self, seats: u32) -> Money {
        Money::new(
            self.amount_minor.saturating_mul(i64::from(seats)),
            self.currency.clone(),
        )
    }

    /// Sum two amounts of the same currency; a currency mismatch keeps the
    /// left-hand currency and is reported by the caller, never panicked on.
    pub fn plus(&self, other: &Money) -> Money {
        Money::new(
            self.amount_minor.saturating_add(other.amount_minor),
            self.currency.clone(),
        )
    }

    pub fn is_positive(&self) -> bool {
        self.amount_minor > 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let major = self.amount_minor / 100;
        let cents = (self.amount_minor % 100).abs();
        write!(f, "{}.{:02} {}", major, cents, self.currency)
    }
}

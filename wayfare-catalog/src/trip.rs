use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wayfare_core::{Error, Result};
use wayfare_shared::Money;

/// A sellable trip with a finite seat inventory.
///
/// `available_seats` is the counter the seat ledger owns; it is unsigned, so
/// the never-negative invariant holds by construction. Only the ledger and
/// catalog edits mutate it, always inside the store's atomic unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelOption {
    pub id: Uuid,
    pub mode_id: Uuid,
    pub source: String,
    pub destination: String,
    pub travel_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub price: Money,
    pub total_capacity: u32,
    pub available_seats: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TravelOption {
    pub fn new(
        mode_id: Uuid,
        source: impl Into<String>,
        destination: impl Into<String>,
        travel_date: DateTime<Utc>,
        return_date: DateTime<Utc>,
        price: Money,
        capacity: u32,
    ) -> Result<Self> {
        if return_date < travel_date {
            return Err(Error::Validation(
                "return date must not precede travel date".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            mode_id,
            source: source.into(),
            destination: destination.into(),
            travel_date,
            return_date,
            price,
            total_capacity: capacity,
            available_seats: capacity,
            created_at: now,
            updated_at: now,
        })
    }

    /// Trip length, recomputed from the stored timestamps on every read.
    pub fn duration(&self) -> Duration {
        self.return_date - self.travel_date
    }

    pub fn days(&self) -> i64 {
        self.duration().num_days()
    }

    pub fn nights(&self) -> i64 {
        self.days() - 1
    }

    pub fn has_capacity_for(&self, seats: u32) -> bool {
        seats <= self.available_seats
    }
}

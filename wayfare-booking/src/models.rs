use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use wayfare_core::{PaymentCorrelation, UserId};
use wayfare_shared::{BookingReference, Money};

/// Booking lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// Payment resolution for a booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "SUCCESS" => Ok(PaymentStatus::Success),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// Passenger details as submitted with a booking request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPassenger {
    pub name: String,
    pub age: u32,
    pub id_number: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Identity snapshot captured at booking time. Immutable once created.
///
/// `id_number` is the national-id string; it is not globally unique across
/// the store, but the online path rejects collisions at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub id: Uuid,
    pub name: String,
    pub age: u32,
    pub id_number: String,
    pub email: String,
    pub phone: Option<String>,
}

impl Passenger {
    pub fn from_new(details: NewPassenger) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: details.name,
            age: details.age,
            id_number: details.id_number,
            email: details.email,
            phone: details.phone,
        }
    }
}

/// The central transactional record: a user's reservation against a trip.
///
/// `status`, `payment_status` and the trip's seat counter are the only state
/// mutated after creation, and only through lifecycle transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub reference: BookingReference,
    pub user: UserId,
    pub trip_id: Uuid,
    pub passengers: Vec<Passenger>,
    pub seat_labels: Vec<String>,
    pub seats: u32,
    pub total_price: Money,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment: Option<PaymentCorrelation>,
    pub booked_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Success
    }

    /// Pending and Confirmed bookings hold seats; Cancelled ones do not.
    pub fn is_active(&self) -> bool {
        matches!(self.status, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

use async_trait::async_trait;
use uuid::Uuid;
use wayfare_core::{Result, UserId};

use crate::models::Booking;

/// Everything needed to commit one reservation as a single atomic unit.
///
/// The orchestrator runs its admission checks first, then hands the fully
/// formed booking here; the store re-runs the capacity and uniqueness
/// checks under the trip's exclusive lock before writing anything.
#[derive(Debug, Clone)]
pub struct ReservationDraft {
    pub booking: Booking,
    /// Online bookings reject passengers whose national id already exists
    /// anywhere in storage; offline bookings do not.
    pub require_unique_identity: bool,
}

/// Repository trait for booking data access.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>>;

    /// All bookings for a user, newest first.
    async fn bookings_for_user(&self, user: UserId) -> Result<Vec<Booking>>;

    /// Whether the user already holds a Pending or Confirmed booking for
    /// the trip.
    async fn has_active_booking(&self, user: UserId, trip_id: Uuid) -> Result<bool>;

    async fn passenger_id_exists(&self, id_number: &str) -> Result<bool>;

    async fn order_id_exists(&self, order_id: &str) -> Result<bool>;

    /// Atomically: lock the trip, re-check capacity and seat labels through
    /// the ledger, re-check identity/order uniqueness, persist passengers
    /// and the booking, deduct seats. All of it commits or none of it does.
    async fn commit_reservation(&self, draft: ReservationDraft) -> Result<Booking>;

    /// Atomically: apply the Cancelled transition and release the booking's
    /// seats back to the trip.
    async fn commit_cancellation(&self, booking_id: Uuid) -> Result<Booking>;
}

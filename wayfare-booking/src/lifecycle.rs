use chrono::Utc;
use thiserror::Error;
use wayfare_core::Error as CoreError;

use crate::models::{Booking, BookingStatus, PaymentStatus};

/// Guarded transitions of the booking state machine.
///
/// A booking enters the store already in `Pending` (offline) or `Confirmed`
/// (online, after payment verification); `entry_state` decides which.
/// `Cancelled` is terminal. Every successful `cancel` is paired with a
/// ledger release by the store's atomic unit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("invalid booking transition from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("booking with {payment} payment cannot be cancelled")]
    PaymentNotSettled { payment: PaymentStatus },
}

impl From<LifecycleError> for CoreError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::InvalidTransition { from, to } => CoreError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            },
            LifecycleError::PaymentNotSettled { payment } => {
                CoreError::NotCancellable(payment.to_string())
            }
        }
    }
}

/// Payment mode chosen at booking time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    /// Pay-at-counter: booking waits in `Pending`.
    Offline,
    /// Gateway-verified payment: booking lands directly in `Confirmed`.
    Online,
}

/// Created -> Pending (offline) or Created -> Confirmed (online).
pub fn entry_state(mode: PaymentMode) -> (BookingStatus, PaymentStatus) {
    match mode {
        PaymentMode::Offline => (BookingStatus::Pending, PaymentStatus::Pending),
        PaymentMode::Online => (BookingStatus::Confirmed, PaymentStatus::Success),
    }
}

/// Pending -> Cancelled, Confirmed -> Cancelled.
///
/// Only bookings whose payment resolved to `pending` or `success` can be
/// cancelled; a `failed` payment blocks this path entirely. The documented
/// source behaviour allowed cancelling already-successful bookings and is
/// preserved here.
pub fn cancel(booking: &mut Booking) -> Result<(), LifecycleError> {
    if !matches!(
        booking.payment_status,
        PaymentStatus::Pending | PaymentStatus::Success
    ) {
        return Err(LifecycleError::PaymentNotSettled {
            payment: booking.payment_status,
        });
    }

    match booking.status {
        BookingStatus::Pending | BookingStatus::Confirmed => {
            booking.status = BookingStatus::Cancelled;
            booking.updated_at = Utc::now();
            Ok(())
        }
        BookingStatus::Cancelled => Err(LifecycleError::InvalidTransition {
            from: BookingStatus::Cancelled,
            to: BookingStatus::Cancelled,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use wayfare_core::UserId;
    use wayfare_shared::{BookingReference, Money};

    fn booking(status: BookingStatus, payment: PaymentStatus) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            reference: BookingReference::generate(),
            user: UserId::new(),
            trip_id: Uuid::new_v4(),
            passengers: Vec::new(),
            seat_labels: Vec::new(),
            seats: 1,
            total_price: Money::from_major(1000, "INR"),
            status,
            payment_status: payment,
            payment: None,
            booked_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_entry_states_per_payment_mode() {
        assert_eq!(
            entry_state(PaymentMode::Offline),
            (BookingStatus::Pending, PaymentStatus::Pending)
        );
        assert_eq!(
            entry_state(PaymentMode::Online),
            (BookingStatus::Confirmed, PaymentStatus::Success)
        );
    }

    #[test]
    fn test_pending_and_confirmed_are_cancellable() {
        let mut pending = booking(BookingStatus::Pending, PaymentStatus::Pending);
        cancel(&mut pending).unwrap();
        assert_eq!(pending.status, BookingStatus::Cancelled);

        let mut confirmed = booking(BookingStatus::Confirmed, PaymentStatus::Success);
        cancel(&mut confirmed).unwrap();
        assert_eq!(confirmed.status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_failed_payment_blocks_cancellation() {
        let mut b = booking(BookingStatus::Confirmed, PaymentStatus::Failed);
        let err = cancel(&mut b).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::PaymentNotSettled {
                payment: PaymentStatus::Failed
            }
        );
        assert_eq!(b.status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_cancelled_is_terminal() {
        let mut b = booking(BookingStatus::Cancelled, PaymentStatus::Success);
        assert!(cancel(&mut b).is_err());
        assert_eq!(b.status, BookingStatus::Cancelled);
    }
}

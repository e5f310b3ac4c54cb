use std::collections::HashSet;
use thiserror::Error;
use wayfare_catalog::TravelOption;
use wayfare_core::Error as CoreError;

/// Seat-inventory arithmetic for one trip.
///
/// Both storage backends funnel their check-then-deduct sequence through
/// these functions while holding the trip's exclusive lock, so the capacity
/// decision exists in exactly one place. `reserve` fails without mutating
/// anything; `release` is called only from a cancellation paired 1:1 with a
/// prior successful reserve, a pairing the lifecycle enforces.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("not enough seats: requested {requested}, available {available}")]
    InsufficientSeats { requested: u32, available: u32 },

    #[error("seat {0} is already taken on this trip")]
    SeatTaken(String),
}

impl From<LedgerError> for CoreError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientSeats {
                requested,
                available,
            } => CoreError::InsufficientCapacity {
                requested,
                available,
            },
            LedgerError::SeatTaken(label) => CoreError::SeatTaken(label),
        }
    }
}

/// Deduct `labels.len()` seats from the trip. `occupied` carries the seat
/// labels already allocated to non-cancelled bookings of the same trip.
pub fn reserve(
    trip: &mut TravelOption,
    occupied: &HashSet<String>,
    labels: &[String],
) -> Result<(), LedgerError> {
    let requested = labels.len() as u32;
    if requested > trip.available_seats {
        return Err(LedgerError::InsufficientSeats {
            requested,
            available: trip.available_seats,
        });
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(labels.len());
    for label in labels {
        if occupied.contains(label) || !seen.insert(label) {
            return Err(LedgerError::SeatTaken(label.clone()));
        }
    }

    trip.available_seats -= requested;
    Ok(())
}

/// Re-credit seats released by a cancellation, clamped to the trip's
/// original capacity.
pub fn release(trip: &mut TravelOption, seats: u32) {
    trip.available_seats = trip
        .available_seats
        .saturating_add(seats)
        .min(trip.total_capacity);
}

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use uuid::Uuid;
use wayfare_booking::ledger;
use wayfare_booking::lifecycle;
use wayfare_booking::models::{Booking, Passenger};
use wayfare_booking::repository::{BookingStore, ReservationDraft};
use wayfare_catalog::{TravelMode, TravelOption, TripFilter, TripStore};
use wayfare_core::{Error, Result, UserId};
use wayfare_shared::BookingReference;

#[derive(Default)]
struct Tables {
    modes: HashMap<Uuid, TravelMode>,
    trips: HashMap<Uuid, TravelOption>,
    passengers: HashMap<Uuid, Passenger>,
    bookings: HashMap<Uuid, Booking>,
}

/// In-memory storage backend for tests and local development.
///
/// One mutex guards all tables: the critical section of `commit_reservation`
/// is exactly the check-then-deduct sequence the Postgres backend runs under
/// its trip row lock, so concurrent reservations serialize here the same way.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TripStore for MemoryStore {
    async fn insert_mode(&self, mode: TravelMode) -> Result<()> {
        self.inner.lock().await.modes.insert(mode.id, mode);
        Ok(())
    }

    async fn modes(&self) -> Result<Vec<TravelMode>> {
        let tables = self.inner.lock().await;
        let mut modes: Vec<TravelMode> = tables.modes.values().cloned().collect();
        modes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(modes)
    }

    async fn insert_trip(&self, trip: TravelOption) -> Result<()> {
        self.inner.lock().await.trips.insert(trip.id, trip);
        Ok(())
    }

    async fn get_trip(&self, id: Uuid) -> Result<Option<TravelOption>> {
        Ok(self.inner.lock().await.trips.get(&id).cloned())
    }

    async fn list_trips(&self, filter: &TripFilter) -> Result<Vec<TravelOption>> {
        let tables = self.inner.lock().await;
        let mut trips: Vec<TravelOption> = tables
            .trips
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        trips.sort_by(|a, b| b.travel_date.cmp(&a.travel_date));
        Ok(trips)
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>> {
        Ok(self.inner.lock().await.bookings.get(&id).cloned())
    }

    async fn bookings_for_user(&self, user: UserId) -> Result<Vec<Booking>> {
        let tables = self.inner.lock().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| b.user == user)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        Ok(bookings)
    }

    async fn has_active_booking(&self, user: UserId, trip_id: Uuid) -> Result<bool> {
        let tables = self.inner.lock().await;
        Ok(tables
            .bookings
            .values()
            .any(|b| b.user == user && b.trip_id == trip_id && b.is_active()))
    }

    async fn passenger_id_exists(&self, id_number: &str) -> Result<bool> {
        let tables = self.inner.lock().await;
        Ok(tables
            .passengers
            .values()
            .any(|p| p.id_number == id_number))
    }

    async fn order_id_exists(&self, order_id: &str) -> Result<bool> {
        let tables = self.inner.lock().await;
        Ok(tables.bookings.values().any(|b| {
            b.payment
                .as_ref()
                .is_some_and(|c| c.order_id == order_id)
        }))
    }

    async fn commit_reservation(&self, draft: ReservationDraft) -> Result<Booking> {
        let mut tables = self.inner.lock().await;
        let mut booking = draft.booking;

        let mut trip = tables
            .trips
            .get(&booking.trip_id)
            .cloned()
            .ok_or(Error::NotFound("trip"))?;

        if draft.require_unique_identity {
            for passenger in &booking.passengers {
                if tables
                    .passengers
                    .values()
                    .any(|p| p.id_number == passenger.id_number)
                {
                    return Err(Error::DuplicateIdentity(passenger.id_number.clone()));
                }
            }
        }

        if let Some(correlation) = &booking.payment {
            let collides = tables.bookings.values().any(|b| {
                b.payment
                    .as_ref()
                    .is_some_and(|c| c.order_id == correlation.order_id)
            });
            if collides {
                return Err(Error::DuplicateOrder(correlation.order_id.clone()));
            }
        }

        let occupied: HashSet<String> = tables
            .bookings
            .values()
            .filter(|b| b.trip_id == trip.id && b.is_active())
            .flat_map(|b| b.seat_labels.iter().cloned())
            .collect();

        ledger::reserve(&mut trip, &occupied, &booking.seat_labels)?;

        let mut attempts = 0;
        while tables
            .bookings
            .values()
            .any(|b| b.reference == booking.reference)
        {
            attempts += 1;
            if attempts > 5 {
                return Err(Error::Storage(
                    "could not generate a unique booking reference".to_string(),
                ));
            }
            booking.reference = BookingReference::generate();
        }

        for passenger in &booking.passengers {
            tables.passengers.insert(passenger.id, passenger.clone());
        }
        tables.trips.insert(trip.id, trip);
        tables.bookings.insert(booking.id, booking.clone());

        Ok(booking)
    }

    async fn commit_cancellation(&self, booking_id: Uuid) -> Result<Booking> {
        let mut tables = self.inner.lock().await;

        let mut booking = tables
            .bookings
            .get(&booking_id)
            .cloned()
            .ok_or(Error::NotFound("booking"))?;

        lifecycle::cancel(&mut booking)?;

        if let Some(trip) = tables.trips.get_mut(&booking.trip_id) {
            ledger::release(trip, booking.seats);
        }
        tables.bookings.insert(booking.id, booking.clone());

        Ok(booking)
    }
}

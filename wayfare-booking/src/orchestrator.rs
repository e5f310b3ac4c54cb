use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use wayfare_catalog::{TravelOption, TripStore};
use wayfare_core::{
    Error, GatewayOrder, PaymentCorrelation, PaymentError, PaymentGateway, Result, UserId,
};
use wayfare_shared::{BookingReference, Money};

use crate::lifecycle::{self, PaymentMode};
use crate::models::{Booking, NewPassenger, Passenger};
use crate::reporting::{BookingOverview, TravelerStats};
use crate::repository::{BookingStore, ReservationDraft};

/// Price quote returned by the pre-booking admission check.
#[derive(Debug, Clone)]
pub struct AdmissionQuote {
    pub trip_id: Uuid,
    pub travelers: u32,
    pub total_price: Money,
}

/// The transactional use-case layer. Each operation validates its request
/// up front and then commits or aborts as one unit through the stores.
///
/// Collaborators are injected once at construction; there are no ambient
/// clients.
#[derive(Clone)]
pub struct ReservationService {
    trips: Arc<dyn TripStore>,
    bookings: Arc<dyn BookingStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl ReservationService {
    pub fn new(
        trips: Arc<dyn TripStore>,
        bookings: Arc<dyn BookingStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            trips,
            bookings,
            gateway,
        }
    }

    /// Page-level admission check, run before any booking is constructed.
    ///
    /// Rejects a traveler count outside `1..=available_seats` and a second
    /// concurrent booking for the same (user, trip) pair.
    pub async fn check_admission(
        &self,
        trip_id: Uuid,
        user: UserId,
        travelers: u32,
    ) -> Result<AdmissionQuote> {
        let trip = self.load_trip(trip_id).await?;

        if self.bookings.has_active_booking(user, trip_id).await? {
            return Err(Error::AlreadyBooked);
        }
        if travelers == 0 || travelers > trip.available_seats {
            return Err(Error::InsufficientCapacity {
                requested: travelers,
                available: trip.available_seats,
            });
        }

        Ok(AdmissionQuote {
            trip_id,
            travelers,
            total_price: trip.price.for_seats(travelers),
        })
    }

    /// Quote the total and register a gateway order ahead of an online
    /// payment. No local writes.
    pub async fn start_payment(&self, trip_id: Uuid, travelers: u32) -> Result<GatewayOrder> {
        if travelers == 0 {
            return Err(Error::MissingData("travelers"));
        }
        let trip = self.load_trip(trip_id).await?;
        let total = trip.price.for_seats(travelers);
        let order = self.gateway.create_order(&total).await?;
        Ok(order)
    }

    /// Pay-at-counter path: the booking lands in `Pending` with payment
    /// still outstanding.
    pub async fn create_offline_booking(
        &self,
        trip_id: Uuid,
        user: UserId,
        passengers: Vec<NewPassenger>,
        seat_labels: Vec<String>,
    ) -> Result<Booking> {
        let count = validate_manifest(&passengers, &seat_labels)?;
        let trip = self.load_trip(trip_id).await?;

        if count > trip.available_seats {
            return Err(Error::InsufficientCapacity {
                requested: count,
                available: trip.available_seats,
            });
        }

        let records = passenger_records(passengers)?;
        let booking = draft(&trip, user, records, seat_labels, PaymentMode::Offline, None);
        let booking = self
            .bookings
            .commit_reservation(ReservationDraft {
                booking,
                require_unique_identity: false,
            })
            .await?;

        info!(
            booking = %booking.reference,
            trip = %trip_id,
            seats = booking.seats,
            "offline booking recorded, payment due at counter"
        );
        Ok(booking)
    }

    /// Gateway-verified path: the correlation triple is verified before any
    /// state is touched; the booking lands in `Confirmed`.
    pub async fn create_online_booking(
        &self,
        trip_id: Uuid,
        user: UserId,
        correlation: PaymentCorrelation,
        passengers: Vec<NewPassenger>,
        seat_labels: Vec<String>,
    ) -> Result<Booking> {
        if !correlation.is_complete() {
            return Err(Error::MissingData("payment correlation"));
        }
        let count = validate_manifest(&passengers, &seat_labels)?;

        self.gateway.verify(&correlation).await?;

        let trip = self.load_trip(trip_id).await?;

        let mut submitted: HashSet<&str> = HashSet::with_capacity(passengers.len());
        for passenger in &passengers {
            if !submitted.insert(passenger.id_number.as_str())
                || self
                    .bookings
                    .passenger_id_exists(&passenger.id_number)
                    .await?
            {
                return Err(Error::DuplicateIdentity(passenger.id_number.clone()));
            }
        }

        if count > trip.available_seats {
            return Err(Error::InsufficientCapacity {
                requested: count,
                available: trip.available_seats,
            });
        }
        if self.bookings.order_id_exists(&correlation.order_id).await? {
            return Err(Error::DuplicateOrder(correlation.order_id));
        }

        let records = passenger_records(passengers)?;
        let booking = draft(
            &trip,
            user,
            records,
            seat_labels,
            PaymentMode::Online,
            Some(correlation),
        );
        let booking = self
            .bookings
            .commit_reservation(ReservationDraft {
                booking,
                require_unique_identity: true,
            })
            .await?;

        info!(
            booking = %booking.reference,
            trip = %trip_id,
            seats = booking.seats,
            "online booking confirmed"
        );
        Ok(booking)
    }

    /// User-initiated cancellation. Only the owner may cancel; the release
    /// of seats and the status flip commit together.
    pub async fn cancel_booking(&self, booking_id: Uuid, user: UserId) -> Result<Booking> {
        let booking = self
            .bookings
            .get_booking(booking_id)
            .await?
            .ok_or(Error::NotFound("booking"))?;

        if booking.user != user {
            return Err(Error::Forbidden);
        }

        let cancelled = self.bookings.commit_cancellation(booking_id).await?;
        info!(
            booking = %cancelled.reference,
            seats = cancelled.seats,
            "booking cancelled, seats released"
        );
        Ok(cancelled)
    }

    /// A user's bookings bucketed for display, with spend totals.
    pub async fn booking_overview(&self, user: UserId, today: NaiveDate) -> Result<BookingOverview> {
        let bookings = self.bookings.bookings_for_user(user).await?;
        let trips = self.trips_for(&bookings).await?;
        Ok(BookingOverview::build(bookings, &trips, today))
    }

    /// Aggregate figures for a user's profile page.
    pub async fn traveler_stats(&self, user: UserId) -> Result<TravelerStats> {
        let bookings = self.bookings.bookings_for_user(user).await?;
        let trips = self.trips_for(&bookings).await?;
        Ok(TravelerStats::build(&bookings, &trips))
    }

    async fn load_trip(&self, trip_id: Uuid) -> Result<TravelOption> {
        self.trips
            .get_trip(trip_id)
            .await?
            .ok_or(Error::NotFound("trip"))
    }

    async fn trips_for(&self, bookings: &[Booking]) -> Result<HashMap<Uuid, TravelOption>> {
        let mut trips = HashMap::new();
        for booking in bookings {
            if !trips.contains_key(&booking.trip_id) {
                if let Some(trip) = self.trips.get_trip(booking.trip_id).await? {
                    trips.insert(booking.trip_id, trip);
                }
            }
        }
        Ok(trips)
    }
}

fn validate_manifest(passengers: &[NewPassenger], seat_labels: &[String]) -> Result<u32> {
    if passengers.is_empty() {
        return Err(Error::MissingData("passengers"));
    }
    if seat_labels.is_empty() {
        return Err(Error::MissingData("seat selection"));
    }
    if passengers.len() != seat_labels.len() {
        return Err(Error::Validation(
            "seat selection must match passenger count".to_string(),
        ));
    }
    Ok(passengers.len() as u32)
}

fn passenger_records(passengers: Vec<NewPassenger>) -> Result<Vec<Passenger>> {
    passengers
        .into_iter()
        .map(|p| {
            if p.name.trim().is_empty() {
                return Err(Error::MissingData("passenger name"));
            }
            if p.id_number.trim().is_empty() {
                return Err(Error::MissingData("passenger identity number"));
            }
            Ok(Passenger::from_new(p))
        })
        .collect()
}

fn draft(
    trip: &TravelOption,
    user: UserId,
    passengers: Vec<Passenger>,
    seat_labels: Vec<String>,
    mode: PaymentMode,
    correlation: Option<PaymentCorrelation>,
) -> Booking {
    let (status, payment_status) = lifecycle::entry_state(mode);
    let seats = passengers.len() as u32;
    let now = Utc::now();
    Booking {
        id: Uuid::new_v4(),
        reference: BookingReference::generate(),
        user,
        trip_id: trip.id,
        passengers,
        seat_labels,
        seats,
        total_price: trip.price.for_seats(seats),
        status,
        payment_status,
        payment: correlation,
        booked_at: now,
        updated_at: now,
    }
}

/// Deterministic stand-in for the real gateway, used by tests and local
/// runs. Signatures are valid when produced by [`MockGateway::sign`].
pub struct MockGateway;

impl MockGateway {
    pub fn sign(order_id: &str, payment_id: &str) -> String {
        format!("mock-sig:{order_id}:{payment_id}")
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(&self, amount: &Money) -> std::result::Result<GatewayOrder, PaymentError> {
        Ok(GatewayOrder {
            order_id: format!("order_{}", Uuid::new_v4().simple()),
            amount: amount.clone(),
        })
    }

    async fn verify(
        &self,
        correlation: &PaymentCorrelation,
    ) -> std::result::Result<(), PaymentError> {
        if correlation.signature == Self::sign(&correlation.order_id, &correlation.payment_id) {
            Ok(())
        } else {
            Err(PaymentError::InvalidSignature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_gateway_accepts_its_own_signature() {
        let order = MockGateway
            .create_order(&Money::from_major(5000, "INR"))
            .await
            .unwrap();
        let correlation = PaymentCorrelation {
            payment_id: "pay_1".to_string(),
            signature: MockGateway::sign(&order.order_id, "pay_1"),
            order_id: order.order_id,
        };
        assert!(MockGateway.verify(&correlation).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_gateway_rejects_forged_signature() {
        let correlation = PaymentCorrelation {
            order_id: "order_x".to_string(),
            payment_id: "pay_x".to_string(),
            signature: "forged".to_string(),
        };
        assert!(matches!(
            MockGateway.verify(&correlation).await,
            Err(PaymentError::InvalidSignature)
        ));
    }

    #[test]
    fn test_manifest_validation() {
        let passenger = NewPassenger {
            name: "Asha Rao".to_string(),
            age: 34,
            id_number: "123412341234".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
        };
        assert!(matches!(
            validate_manifest(&[], &["A1".to_string()]),
            Err(Error::MissingData("passengers"))
        ));
        assert!(matches!(
            validate_manifest(std::slice::from_ref(&passenger), &[]),
            Err(Error::MissingData("seat selection"))
        ));
        assert!(matches!(
            validate_manifest(
                std::slice::from_ref(&passenger),
                &["A1".to_string(), "A2".to_string()]
            ),
            Err(Error::Validation(_))
        ));
        assert_eq!(
            validate_manifest(std::slice::from_ref(&passenger), &["A1".to_string()]).unwrap(),
            1
        );
    }
}

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use wayfare_catalog::TravelOption;
use wayfare_shared::Money;

use crate::models::{Booking, BookingStatus, PaymentStatus};

/// A user's bookings bucketed for display.
///
/// Upcoming: trip departs today or later, confirmed or awaiting payment.
/// Past: trip departed, confirmed and settled. Cancelled: regardless of
/// date. Pure read-model; nothing here mutates state.
#[derive(Debug)]
pub struct BookingOverview {
    pub upcoming: Vec<Booking>,
    pub past: Vec<Booking>,
    pub cancelled: Vec<Booking>,
    pub total_bookings: usize,
    pub successful_bookings: usize,
    pub pending_bookings: usize,
    pub total_spent: Money,
}

impl BookingOverview {
    pub fn build(
        bookings: Vec<Booking>,
        trips: &HashMap<Uuid, TravelOption>,
        today: NaiveDate,
    ) -> Self {
        let total_bookings = bookings.len();
        let successful_bookings = bookings
            .iter()
            .filter(|b| b.is_paid() && b.status == BookingStatus::Confirmed)
            .count();
        let pending_bookings = bookings
            .iter()
            .filter(|b| {
                b.payment_status == PaymentStatus::Pending && b.status == BookingStatus::Pending
            })
            .count();

        let currency = bookings
            .first()
            .map(|b| b.total_price.currency.clone())
            .unwrap_or_else(|| "INR".to_string());
        let total_spent = bookings
            .iter()
            .filter(|b| b.is_paid() && b.status == BookingStatus::Confirmed)
            .fold(Money::zero(currency), |acc, b| acc.plus(&b.total_price));

        let mut upcoming = Vec::new();
        let mut past = Vec::new();
        let mut cancelled = Vec::new();

        for booking in bookings {
            if booking.status == BookingStatus::Cancelled {
                cancelled.push(booking);
                continue;
            }
            let Some(trip) = trips.get(&booking.trip_id) else {
                continue;
            };
            let departs = trip.travel_date.date_naive();
            if departs >= today {
                if booking.status == BookingStatus::Confirmed
                    || booking.payment_status == PaymentStatus::Pending
                {
                    upcoming.push(booking);
                }
            } else if booking.status == BookingStatus::Confirmed
                && booking.payment_status != PaymentStatus::Pending
            {
                past.push(booking);
            }
        }

        Self {
            upcoming,
            past,
            cancelled,
            total_bookings,
            successful_bookings,
            pending_bookings,
            total_spent,
        }
    }
}

/// Aggregate figures for a traveler's profile.
#[derive(Debug, PartialEq, Eq)]
pub struct TravelerStats {
    pub total_bookings: usize,
    /// Distinct destinations with a successfully paid booking.
    pub destinations_visited: usize,
}

impl TravelerStats {
    pub fn build(bookings: &[Booking], trips: &HashMap<Uuid, TravelOption>) -> Self {
        let destinations: HashSet<&str> = bookings
            .iter()
            .filter(|b| b.is_paid())
            .filter_map(|b| trips.get(&b.trip_id))
            .map(|t| t.destination.as_str())
            .collect();

        Self {
            total_bookings: bookings.len(),
            destinations_visited: destinations.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use wayfare_core::UserId;
    use wayfare_shared::BookingReference;

    fn trip_departing(days_from_today: i64, destination: &str) -> TravelOption {
        let today = Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap();
        let depart = today + Duration::days(days_from_today);
        TravelOption::new(
            Uuid::new_v4(),
            "Pune",
            destination,
            depart,
            depart + Duration::days(2),
            Money::from_major(2000, "INR"),
            15,
        )
        .unwrap()
    }

    fn booking_for(
        trip: &TravelOption,
        status: BookingStatus,
        payment: PaymentStatus,
        total_major: i64,
    ) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            reference: BookingReference::generate(),
            user: UserId::new(),
            trip_id: trip.id,
            passengers: Vec::new(),
            seat_labels: Vec::new(),
            seats: 1,
            total_price: Money::from_major(total_major, "INR"),
            status,
            payment_status: payment,
            payment: None,
            booked_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_overview_buckets_and_totals() {
        let today = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let future = trip_departing(5, "Goa");
        let departed = trip_departing(-5, "Leh");

        let upcoming = booking_for(&future, BookingStatus::Confirmed, PaymentStatus::Success, 2000);
        let awaiting = booking_for(&future, BookingStatus::Pending, PaymentStatus::Pending, 2000);
        let past = booking_for(&departed, BookingStatus::Confirmed, PaymentStatus::Success, 3500);
        let cancelled =
            booking_for(&departed, BookingStatus::Cancelled, PaymentStatus::Success, 1000);

        let trips: HashMap<Uuid, TravelOption> =
            [(future.id, future.clone()), (departed.id, departed.clone())]
                .into_iter()
                .collect();

        let overview = BookingOverview::build(
            vec![upcoming, awaiting, past, cancelled],
            &trips,
            today,
        );

        assert_eq!(overview.upcoming.len(), 2);
        assert_eq!(overview.past.len(), 1);
        assert_eq!(overview.cancelled.len(), 1);
        assert_eq!(overview.total_bookings, 4);
        assert_eq!(overview.successful_bookings, 2);
        assert_eq!(overview.pending_bookings, 1);
        assert_eq!(overview.total_spent, Money::from_major(5500, "INR"));
    }

    #[test]
    fn test_stats_count_distinct_paid_destinations() {
        let goa_a = trip_departing(3, "Goa");
        let goa_b = trip_departing(9, "Goa");
        let leh = trip_departing(12, "Leh");

        let bookings = vec![
            booking_for(&goa_a, BookingStatus::Confirmed, PaymentStatus::Success, 2000),
            booking_for(&goa_b, BookingStatus::Confirmed, PaymentStatus::Success, 2000),
            booking_for(&leh, BookingStatus::Pending, PaymentStatus::Pending, 2000),
        ];
        let trips: HashMap<Uuid, TravelOption> = [
            (goa_a.id, goa_a.clone()),
            (goa_b.id, goa_b.clone()),
            (leh.id, leh.clone()),
        ]
        .into_iter()
        .collect();

        let stats = TravelerStats::build(&bookings, &trips);
        assert_eq!(stats.total_bookings, 3);
        assert_eq!(stats.destinations_visited, 1);
    }
}

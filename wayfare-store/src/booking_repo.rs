use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashSet;
use uuid::Uuid;
use wayfare_booking::ledger;
use wayfare_booking::lifecycle;
use wayfare_booking::models::{Booking, Passenger};
use wayfare_booking::repository::{BookingStore, ReservationDraft};
use wayfare_core::{Error, PaymentCorrelation, Result, UserId};
use wayfare_shared::{BookingReference, Money};

use crate::trip_repo::{TripRow, TRIP_COLUMNS};

/// Postgres booking repository.
///
/// `commit_reservation` and `commit_cancellation` take a `FOR UPDATE` lock
/// on the trip row, so the check-then-deduct sequence of the seat ledger
/// runs with the row held exclusively for the whole transaction.
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    reference: String,
    user_id: Uuid,
    trip_id: Uuid,
    seats: i32,
    seat_labels: serde_json::Value,
    total_minor: i64,
    currency: String,
    status: String,
    payment_status: String,
    payment_order_id: Option<String>,
    payment_id: Option<String>,
    payment_signature: Option<String>,
    booked_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const BOOKING_COLUMNS: &str = "id, reference, user_id, trip_id, seats, seat_labels, \
     total_minor, currency, status, payment_status, payment_order_id, payment_id, \
     payment_signature, booked_at, updated_at";

#[derive(sqlx::FromRow)]
struct PassengerRow {
    id: Uuid,
    name: String,
    age: i32,
    id_number: String,
    email: String,
    phone: Option<String>,
}

impl BookingRow {
    fn into_domain(self, passengers: Vec<Passenger>) -> Result<Booking> {
        let seat_labels: Vec<String> =
            serde_json::from_value(self.seat_labels).map_err(Error::storage)?;
        let payment = match (self.payment_order_id, self.payment_id, self.payment_signature) {
            (Some(order_id), Some(payment_id), Some(signature)) => Some(PaymentCorrelation {
                order_id,
                payment_id,
                signature,
            }),
            _ => None,
        };

        Ok(Booking {
            id: self.id,
            reference: BookingReference::from(self.reference),
            user: UserId(self.user_id),
            trip_id: self.trip_id,
            passengers,
            seat_labels,
            seats: u32::try_from(self.seats).unwrap_or(0),
            total_price: Money::new(self.total_minor, self.currency),
            status: self.status.parse().map_err(Error::Storage)?,
            payment_status: self.payment_status.parse().map_err(Error::Storage)?,
            payment,
            booked_at: self.booked_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<PassengerRow> for Passenger {
    fn from(row: PassengerRow) -> Self {
        Passenger {
            id: row.id,
            name: row.name,
            age: u32::try_from(row.age).unwrap_or(0),
            id_number: row.id_number,
            email: row.email,
            phone: row.phone,
        }
    }
}

impl PgBookingStore {
    async fn passengers_of(&self, booking_id: Uuid) -> Result<Vec<Passenger>> {
        let rows: Vec<PassengerRow> = sqlx::query_as(
            "SELECT p.id, p.name, p.age, p.id_number, p.email, p.phone \
             FROM passengers p \
             JOIN booking_passengers bp ON bp.passenger_id = p.id \
             WHERE bp.booking_id = $1",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::storage)?;

        Ok(rows.into_iter().map(Passenger::from).collect())
    }
}

async fn occupied_labels(
    tx: &mut Transaction<'_, Postgres>,
    trip_id: Uuid,
) -> Result<HashSet<String>> {
    let rows: Vec<(serde_json::Value,)> = sqlx::query_as(
        "SELECT seat_labels FROM bookings WHERE trip_id = $1 AND status <> 'CANCELLED'",
    )
    .bind(trip_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(Error::storage)?;

    let mut occupied = HashSet::new();
    for (value,) in rows {
        let labels: Vec<String> = serde_json::from_value(value).map_err(Error::storage)?;
        occupied.extend(labels);
    }
    Ok(occupied)
}

async fn lock_trip(
    tx: &mut Transaction<'_, Postgres>,
    trip_id: Uuid,
) -> Result<Option<TripRow>> {
    sqlx::query_as(&format!(
        "SELECT {TRIP_COLUMNS} FROM travel_options WHERE id = $1 FOR UPDATE"
    ))
    .bind(trip_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(Error::storage)
}

async fn write_seat_counter(
    tx: &mut Transaction<'_, Postgres>,
    trip_id: Uuid,
    available_seats: u32,
) -> Result<()> {
    sqlx::query("UPDATE travel_options SET available_seats = $1, updated_at = NOW() WHERE id = $2")
        .bind(available_seats as i32)
        .bind(trip_id)
        .execute(&mut **tx)
        .await
        .map_err(Error::storage)?;
    Ok(())
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::storage)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let passengers = self.passengers_of(row.id).await?;
                Ok(Some(row.into_domain(passengers)?))
            }
        }
    }

    async fn bookings_for_user(&self, user: UserId) -> Result<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY booked_at DESC"
        ))
        .bind(user.0)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::storage)?;

        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            let passengers = self.passengers_of(row.id).await?;
            bookings.push(row.into_domain(passengers)?);
        }
        Ok(bookings)
    }

    async fn has_active_booking(&self, user: UserId, trip_id: Uuid) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM bookings \
             WHERE user_id = $1 AND trip_id = $2 AND status IN ('PENDING', 'CONFIRMED'))",
        )
        .bind(user.0)
        .bind(trip_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::storage)?;
        Ok(exists)
    }

    async fn passenger_id_exists(&self, id_number: &str) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM passengers WHERE id_number = $1)")
                .bind(id_number)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::storage)?;
        Ok(exists)
    }

    async fn order_id_exists(&self, order_id: &str) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM bookings WHERE payment_order_id = $1)")
                .bind(order_id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::storage)?;
        Ok(exists)
    }

    async fn commit_reservation(&self, draft: ReservationDraft) -> Result<Booking> {
        let mut booking = draft.booking;
        let mut tx = self.pool.begin().await.map_err(Error::storage)?;

        let mut trip = lock_trip(&mut tx, booking.trip_id)
            .await?
            .ok_or(Error::NotFound("trip"))?
            .into_domain();

        if draft.require_unique_identity {
            for passenger in &booking.passengers {
                let (exists,): (bool,) =
                    sqlx::query_as("SELECT EXISTS(SELECT 1 FROM passengers WHERE id_number = $1)")
                        .bind(&passenger.id_number)
                        .fetch_one(&mut *tx)
                        .await
                        .map_err(Error::storage)?;
                if exists {
                    return Err(Error::DuplicateIdentity(passenger.id_number.clone()));
                }
            }
        }

        if let Some(correlation) = &booking.payment {
            let (collides,): (bool,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM bookings WHERE payment_order_id = $1)")
                    .bind(&correlation.order_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(Error::storage)?;
            if collides {
                return Err(Error::DuplicateOrder(correlation.order_id.clone()));
            }
        }

        let occupied = occupied_labels(&mut tx, trip.id).await?;
        ledger::reserve(&mut trip, &occupied, &booking.seat_labels)?;
        write_seat_counter(&mut tx, trip.id, trip.available_seats).await?;

        let mut attempts = 0;
        loop {
            let (taken,): (bool,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM bookings WHERE reference = $1)")
                    .bind(booking.reference.as_str())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(Error::storage)?;
            if !taken {
                break;
            }
            attempts += 1;
            if attempts > 5 {
                return Err(Error::Storage(
                    "could not generate a unique booking reference".to_string(),
                ));
            }
            booking.reference = BookingReference::generate();
        }

        for passenger in &booking.passengers {
            sqlx::query(
                "INSERT INTO passengers (id, name, age, id_number, email, phone) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(passenger.id)
            .bind(&passenger.name)
            .bind(passenger.age as i32)
            .bind(&passenger.id_number)
            .bind(&passenger.email)
            .bind(&passenger.phone)
            .execute(&mut *tx)
            .await
            .map_err(Error::storage)?;
        }

        sqlx::query(
            "INSERT INTO bookings \
             (id, reference, user_id, trip_id, seats, seat_labels, total_minor, currency, \
              status, payment_status, payment_order_id, payment_id, payment_signature, \
              booked_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(booking.id)
        .bind(booking.reference.as_str())
        .bind(booking.user.0)
        .bind(booking.trip_id)
        .bind(booking.seats as i32)
        .bind(serde_json::json!(booking.seat_labels))
        .bind(booking.total_price.amount_minor)
        .bind(&booking.total_price.currency)
        .bind(booking.status.to_string())
        .bind(booking.payment_status.to_string())
        .bind(booking.payment.as_ref().map(|c| c.order_id.clone()))
        .bind(booking.payment.as_ref().map(|c| c.payment_id.clone()))
        .bind(booking.payment.as_ref().map(|c| c.signature.clone()))
        .bind(booking.booked_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(Error::storage)?;

        for passenger in &booking.passengers {
            sqlx::query(
                "INSERT INTO booking_passengers (booking_id, passenger_id) VALUES ($1, $2)",
            )
            .bind(booking.id)
            .bind(passenger.id)
            .execute(&mut *tx)
            .await
            .map_err(Error::storage)?;
        }

        tx.commit().await.map_err(Error::storage)?;
        Ok(booking)
    }

    async fn commit_cancellation(&self, booking_id: Uuid) -> Result<Booking> {
        let passengers = self.passengers_of(booking_id).await?;
        let mut tx = self.pool.begin().await.map_err(Error::storage)?;

        // Peek at the booking to learn its trip, then lock rows in the same
        // order as commit_reservation: trip first, booking second.
        let peek: Option<(Uuid,)> = sqlx::query_as("SELECT trip_id FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::storage)?;
        let (trip_id,) = peek.ok_or(Error::NotFound("booking"))?;

        let trip_row = lock_trip(&mut tx, trip_id).await?;

        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
        ))
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::storage)?;
        let mut booking = row
            .ok_or(Error::NotFound("booking"))?
            .into_domain(passengers)?;

        lifecycle::cancel(&mut booking)?;

        // The trip may have been removed from the catalog; the cancellation
        // still goes through, there are just no seats to credit back.
        if let Some(trip_row) = trip_row {
            let mut trip = trip_row.into_domain();
            ledger::release(&mut trip, booking.seats);
            write_seat_counter(&mut tx, trip.id, trip.available_seats).await?;
        }

        sqlx::query("UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(booking.status.to_string())
            .bind(booking.id)
            .execute(&mut *tx)
            .await
            .map_err(Error::storage)?;

        tx.commit().await.map_err(Error::storage)?;
        Ok(booking)
    }
}

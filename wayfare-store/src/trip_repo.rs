use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use wayfare_catalog::{TravelMode, TravelOption, TripFilter, TripStore};
use wayfare_core::{Error, Result};
use wayfare_shared::Money;

pub struct PgTripStore {
    pool: PgPool,
}

impl PgTripStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
pub(crate) struct TripRow {
    pub id: Uuid,
    pub mode_id: Uuid,
    pub source: String,
    pub destination: String,
    pub travel_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub price_minor: i64,
    pub currency: String,
    pub total_capacity: i32,
    pub available_seats: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) const TRIP_COLUMNS: &str = "id, mode_id, source, destination, travel_date, \
     return_date, price_minor, currency, total_capacity, available_seats, created_at, updated_at";

impl TripRow {
    pub(crate) fn into_domain(self) -> TravelOption {
        TravelOption {
            id: self.id,
            mode_id: self.mode_id,
            source: self.source,
            destination: self.destination,
            travel_date: self.travel_date,
            return_date: self.return_date,
            price: Money::new(self.price_minor, self.currency),
            total_capacity: u32::try_from(self.total_capacity).unwrap_or(0),
            available_seats: u32::try_from(self.available_seats).unwrap_or(0),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[async_trait]
impl TripStore for PgTripStore {
    async fn insert_mode(&self, mode: TravelMode) -> Result<()> {
        sqlx::query("INSERT INTO travel_modes (id, name) VALUES ($1, $2)")
            .bind(mode.id)
            .bind(&mode.name)
            .execute(&self.pool)
            .await
            .map_err(Error::storage)?;
        Ok(())
    }

    async fn modes(&self) -> Result<Vec<TravelMode>> {
        let rows: Vec<(Uuid, String)> =
            sqlx::query_as("SELECT id, name FROM travel_modes ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(Error::storage)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| TravelMode { id, name })
            .collect())
    }

    async fn insert_trip(&self, trip: TravelOption) -> Result<()> {
        sqlx::query(
            "INSERT INTO travel_options \
             (id, mode_id, source, destination, travel_date, return_date, \
              price_minor, currency, total_capacity, available_seats, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(trip.id)
        .bind(trip.mode_id)
        .bind(&trip.source)
        .bind(&trip.destination)
        .bind(trip.travel_date)
        .bind(trip.return_date)
        .bind(trip.price.amount_minor)
        .bind(&trip.price.currency)
        .bind(trip.total_capacity as i32)
        .bind(trip.available_seats as i32)
        .bind(trip.created_at)
        .bind(trip.updated_at)
        .execute(&self.pool)
        .await
        .map_err(Error::storage)?;
        Ok(())
    }

    async fn get_trip(&self, id: Uuid) -> Result<Option<TravelOption>> {
        let row: Option<TripRow> = sqlx::query_as(&format!(
            "SELECT {TRIP_COLUMNS} FROM travel_options WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::storage)?;

        Ok(row.map(TripRow::into_domain))
    }

    async fn list_trips(&self, filter: &TripFilter) -> Result<Vec<TravelOption>> {
        let rows: Vec<TripRow> = sqlx::query_as(&format!(
            "SELECT {TRIP_COLUMNS} FROM travel_options \
             WHERE ($1::text IS NULL OR destination ILIKE '%' || $1 || '%') \
               AND ($2::uuid IS NULL OR mode_id = $2) \
               AND ($3::date IS NULL OR travel_date::date >= $3) \
               AND ($4::date IS NULL OR return_date::date <= $4) \
               AND price_minor >= $5 \
               AND ($6::bigint IS NULL OR price_minor <= $6) \
             ORDER BY travel_date DESC"
        ))
        .bind(filter.destination.as_deref())
        .bind(filter.mode_id)
        .bind(filter.departs_on_or_after)
        .bind(filter.returns_on_or_before)
        .bind(filter.min_price_minor)
        .bind(filter.max_price_minor)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::storage)?;

        Ok(rows.into_iter().map(TripRow::into_domain).collect())
    }
}

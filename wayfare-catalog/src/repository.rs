use async_trait::async_trait;
use uuid::Uuid;
use wayfare_core::Result;

use crate::filter::TripFilter;
use crate::mode::TravelMode;
use crate::trip::TravelOption;

/// Repository trait for catalog data access.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn insert_mode(&self, mode: TravelMode) -> Result<()>;

    async fn modes(&self) -> Result<Vec<TravelMode>>;

    async fn insert_trip(&self, trip: TravelOption) -> Result<()>;

    async fn get_trip(&self, id: Uuid) -> Result<Option<TravelOption>>;

    /// Trips matching `filter`, newest travel date first.
    async fn list_trips(&self, filter: &TripFilter) -> Result<Vec<TravelOption>>;
}

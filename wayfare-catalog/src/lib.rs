pub mod filter;
pub mod mode;
pub mod repository;
pub mod trip;

pub use filter::{RawTripQuery, TripFilter};
pub use mode::TravelMode;
pub use repository::TripStore;
pub use trip::TravelOption;

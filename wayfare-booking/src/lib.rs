pub mod ledger;
pub mod lifecycle;
pub mod models;
pub mod orchestrator;
pub mod reporting;
pub mod repository;

pub use models::{Booking, BookingStatus, NewPassenger, Passenger, PaymentStatus};
pub use orchestrator::{MockGateway, ReservationService};
pub use repository::{BookingStore, ReservationDraft};

pub mod error;
pub mod identity;
pub mod payment;

pub use error::{Error, Result};
pub use identity::UserId;
pub use payment::{GatewayOrder, PaymentCorrelation, PaymentError, PaymentGateway};

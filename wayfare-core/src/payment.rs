use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wayfare_shared::Money;

/// Correlation triple returned by the gateway after an online payment.
/// The core passes these three strings through; it never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCorrelation {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

impl PaymentCorrelation {
    pub fn is_complete(&self) -> bool {
        !self.order_id.is_empty() && !self.payment_id.is_empty() && !self.signature.is_empty()
    }
}

/// Order registered with the gateway before the user is charged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub order_id: String,
    pub amount: Money,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("gateway rejected the payment signature")]
    InvalidSignature,

    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

impl From<PaymentError> for crate::Error {
    fn from(err: PaymentError) -> Self {
        crate::Error::PaymentVerificationFailed(err.to_string())
    }
}

/// The two gateway operations the core consumes. Constructed once at process
/// start and injected; there is no ambient client.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Register an order for `amount` with the gateway, ahead of payment.
    async fn create_order(&self, amount: &Money) -> Result<GatewayOrder, PaymentError>;

    /// Verify that the correlation triple describes an authentic payment.
    /// Bounded call; a timeout or transport error is a verification failure.
    async fn verify(&self, correlation: &PaymentCorrelation) -> Result<(), PaymentError>;
}

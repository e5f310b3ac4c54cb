use thiserror::Error;

/// The error vocabulary every layer of the reservation core speaks.
///
/// Capacity and duplicate checks surface here before any write; storage
/// backends map their own failures into `Storage` rather than swallowing
/// them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("missing required data: {0}")]
    MissingData(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not enough seats: requested {requested}, available {available}")]
    InsufficientCapacity { requested: u32, available: u32 },

    #[error("seat {0} is already taken on this trip")]
    SeatTaken(String),

    #[error("a passenger with identity number {0} already exists")]
    DuplicateIdentity(String),

    #[error("payment order {0} is already attached to a booking")]
    DuplicateOrder(String),

    #[error("payment verification failed: {0}")]
    PaymentVerificationFailed(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("an active booking for this trip already exists")]
    AlreadyBooked,

    #[error("booking does not belong to the requesting user")]
    Forbidden,

    #[error("invalid booking transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("booking with {0} payment cannot be cancelled")]
    NotCancellable(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand used by storage backends when wrapping driver errors.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Error::Storage(err.to_string())
    }
}

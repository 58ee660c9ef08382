use super::status::BookingStatus;
use super::time::FormatError;
use crate::store::StoreError;

/// Failures a booking flow can surface to its caller
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The slot or range was taken after the caller's snapshot
    #[error("{0}")]
    Conflict(String),

    #[error("Please sign in to book")]
    Unauthenticated,

    /// The selection is incomplete or not bookable as-is
    #[error("{0}")]
    Validation(String),

    #[error("Cannot move a booking from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => BookingError::Conflict(msg),
            other => BookingError::Store(other),
        }
    }
}

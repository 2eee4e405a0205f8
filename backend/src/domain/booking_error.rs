//! Failures raised by the capacity engine and booking state machine.

use super::ports::BookingStoreError;
use super::{BookingId, BookingStatus, BookingValidationError, Error, FacilityId};

/// Booking-specific failure taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    /// Facility does not exist.
    #[error("facility {0} not found")]
    FacilityNotFound(FacilityId),
    /// Booking does not exist.
    #[error("booking {0} not found")]
    BookingNotFound(BookingId),
    /// Not enough sacks remained at the moment of reservation.
    #[error("insufficient capacity: {available} sacks available, {requested} requested")]
    CapacityExceeded {
        /// Sacks free when the reservation was attempted.
        available: i32,
        /// Sacks requested.
        requested: i32,
    },
    /// Booking is already cancelled.
    #[error("booking {booking_id} is already {status}")]
    AlreadyCancelled {
        /// Booking concerned.
        booking_id: BookingId,
        /// Its current status.
        status: BookingStatus,
    },
    /// Facility no longer accepts reservations.
    #[error("facility {0} is not accepting bookings")]
    FacilityInactive(FacilityId),
    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] BookingValidationError),
    /// Store reported an inconsistency the engine cannot recover from.
    #[error("booking store inconsistency: {0}")]
    Inconsistent(String),
    /// Store failure.
    #[error(transparent)]
    Store(#[from] BookingStoreError),
}

impl From<BookingError> for Error {
    fn from(value: BookingError) -> Self {
        match value {
            BookingError::FacilityNotFound(_) | BookingError::BookingNotFound(_) => {
                Self::not_found(value.to_string())
            }
            BookingError::CapacityExceeded {
                available,
                requested,
            } => Self::capacity_exceeded(available, requested),
            BookingError::AlreadyCancelled { .. } | BookingError::FacilityInactive(_) => {
                Self::invalid_state(value.to_string())
            }
            BookingError::Validation(ref err) => Self::invalid_request(err.to_string())
                .with_details(serde_json::json!({
                    "field": err.field(),
                    "code": "validation_failed",
                })),
            BookingError::Inconsistent(message) => Self::internal(message),
            BookingError::Store(BookingStoreError::Connection { message }) => {
                Self::service_unavailable(format!("booking store unavailable: {message}"))
            }
            BookingError::Store(BookingStoreError::Query { message }) => {
                Self::internal(format!("booking store error: {message}"))
            }
        }
    }
}

//! Driving port for booking mutations.

use async_trait::async_trait;

use crate::domain::{Booking, BookingDraft, BookingId, Error, UserId};

/// Request to create and confirm a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBookingRequest {
    /// Unvalidated booking fields.
    pub draft: BookingDraft,
    /// User performing the action.
    pub actor: Option<UserId>,
}

/// Result of a successful booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBookingResponse {
    /// The confirmed booking.
    pub booking: Booking,
    /// Facility sacks left after the reservation.
    pub available_after_booking: i32,
}

/// Request to cancel a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelBookingRequest {
    /// Booking to cancel.
    pub booking_id: BookingId,
    /// User performing the action.
    pub actor: Option<UserId>,
}

/// Result of a cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelBookingResponse {
    /// The booking in its cancelled state.
    pub booking: Booking,
    /// Facility sacks available after any release; `None` when nothing was
    /// released.
    pub available_after_release: Option<i32>,
}

/// Booking state machine entry points.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingCommand: Send + Sync {
    /// Validate, reserve capacity, and record a confirmed booking.
    async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<CreateBookingResponse, Error>;

    /// Cancel a booking, releasing capacity when it was confirmed.
    async fn cancel_booking(
        &self,
        request: CancelBookingRequest,
    ) -> Result<CancelBookingResponse, Error>;
}

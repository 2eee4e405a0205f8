//! Driving port for booking and capacity reads.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{
    Booking, BookingHistoryEntry, BookingId, Error, FacilityId, FarmerId,
};

/// Advisory availability check input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckAvailabilityRequest {
    /// Facility to inspect.
    pub facility_id: FacilityId,
    /// Sacks the caller would like to book.
    pub quantity: i32,
}

/// Advisory availability answer. A later booking may still be rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityReport {
    /// Whether the quantity fits right now.
    pub available: bool,
    /// Sacks free right now.
    pub current_available: i32,
    /// Hint for the caller when the quantity does not fit.
    pub message: Option<String>,
}

/// Facility capacity snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityCapacityView {
    /// Facility identifier.
    pub facility_id: FacilityId,
    /// Display name.
    pub name: String,
    /// Total sacks.
    pub total: i32,
    /// Free sacks.
    pub available: i32,
    /// Current price per sack.
    pub price_per_sack: Option<Decimal>,
    /// Whether new bookings are accepted.
    pub active: bool,
}

/// Read-side booking use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingQuery: Send + Sync {
    /// Report whether `quantity` sacks currently fit.
    async fn check_availability(
        &self,
        request: CheckAvailabilityRequest,
    ) -> Result<AvailabilityReport, Error>;

    /// Fetch a single booking.
    async fn get_booking(&self, booking_id: &BookingId) -> Result<Booking, Error>;

    /// Bookings owned by a farmer.
    async fn list_bookings_for_farmer(&self, farmer_id: &FarmerId) -> Result<Vec<Booking>, Error>;

    /// Audit trail of a booking, oldest first.
    async fn booking_history(
        &self,
        booking_id: &BookingId,
    ) -> Result<Vec<BookingHistoryEntry>, Error>;

    /// Capacity and price of a facility.
    async fn facility_capacity(
        &self,
        facility_id: &FacilityId,
    ) -> Result<FacilityCapacityView, Error>;
}

//! Driven port for booking persistence.
//!
//! Reads go straight through [`BookingStore`]. Writes happen inside a
//! [`BookingTransaction`] obtained from [`BookingStore::begin`]: every change
//! made through the transaction becomes visible together on
//! [`BookingTransaction::commit`], or not at all.
//!
//! Capacity is only ever changed through
//! [`BookingTransaction::try_reserve_capacity`] and
//! [`BookingTransaction::release_capacity`]. Adapters must apply each as one
//! atomic conditional update so concurrent transactions cannot both succeed
//! against the same remaining sacks.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{
    Booking, BookingHistoryEntry, BookingId, Facility, FacilityId, FarmerId,
};

define_port_error! {
    /// Errors raised by booking store adapters.
    pub enum BookingStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "booking store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "booking store query failed: {message}",
    }
}

/// Outcome of a conditional capacity update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacityChange {
    /// The update was applied; carries the facility as updated.
    Applied(Facility),
    /// Not enough sacks remained; carries the count at the time of the check.
    Rejected {
        /// Sacks available when the update was attempted.
        available: i32,
    },
    /// The facility does not exist.
    FacilityMissing,
    /// The facility is deactivated and takes no new reservations.
    FacilityInactive,
    /// A release was applied but hit the facility total, so fewer sacks
    /// came back than were asked for.
    Clamped {
        /// The facility as updated.
        facility: Facility,
        /// Sacks actually restored.
        restored: i32,
    },
}

impl CapacityChange {
    /// Classify a release that moved `facility` up from `previous_available`.
    #[must_use]
    pub fn released(facility: Facility, previous_available: i32, quantity: i32) -> Self {
        let restored = facility.capacity.available() - previous_available;
        if restored < quantity {
            Self::Clamped { facility, restored }
        } else {
            Self::Applied(facility)
        }
    }
}

/// Read side of the booking store plus the transaction factory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Open a unit of work.
    async fn begin(&self) -> Result<Box<dyn BookingTransaction>, BookingStoreError>;

    /// Read a facility without locking it.
    async fn find_facility(
        &self,
        facility_id: &FacilityId,
    ) -> Result<Option<Facility>, BookingStoreError>;

    /// Read a booking without locking it.
    async fn find_booking(
        &self,
        booking_id: &BookingId,
    ) -> Result<Option<Booking>, BookingStoreError>;

    /// Bookings owned by a farmer, newest first.
    async fn list_bookings_for_farmer(
        &self,
        farmer_id: &FarmerId,
    ) -> Result<Vec<Booking>, BookingStoreError>;

    /// Audit entries for a booking ordered by `(changed_at, id)`.
    async fn list_history(
        &self,
        booking_id: &BookingId,
    ) -> Result<Vec<BookingHistoryEntry>, BookingStoreError>;
}

/// One atomic unit of work against the booking store.
///
/// Dropping a transaction without committing discards its changes; callers
/// should still call [`Self::rollback`] so adapters can release resources
/// promptly and report failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingTransaction: Send {
    /// Atomically deduct `quantity` sacks if at least that many remain.
    async fn try_reserve_capacity(
        &mut self,
        facility_id: &FacilityId,
        quantity: i32,
    ) -> Result<CapacityChange, BookingStoreError>;

    /// Atomically return `quantity` sacks, never exceeding the total.
    async fn release_capacity(
        &mut self,
        facility_id: &FacilityId,
        quantity: i32,
    ) -> Result<CapacityChange, BookingStoreError>;

    /// Insert a new booking row.
    async fn insert_booking(&mut self, booking: &Booking) -> Result<(), BookingStoreError>;

    /// Read a booking and hold an exclusive lock on it until the
    /// transaction ends.
    async fn lock_booking(
        &mut self,
        booking_id: &BookingId,
    ) -> Result<Option<Booking>, BookingStoreError>;

    /// Persist status and audit columns of an existing booking.
    async fn update_booking(&mut self, booking: &Booking) -> Result<(), BookingStoreError>;

    /// Append an audit entry.
    async fn append_history(
        &mut self,
        entry: &BookingHistoryEntry,
    ) -> Result<(), BookingStoreError>;

    /// Make every change visible.
    async fn commit(self: Box<Self>) -> Result<(), BookingStoreError>;

    /// Discard every change.
    async fn rollback(self: Box<Self>) -> Result<(), BookingStoreError>;
}

//! Capacity reservation engine.
//!
//! Owns the `0 <= available <= total` rule for every facility. Reserve and
//! release are delegated to the store's atomic conditional update inside the
//! caller's transaction; the engine turns the outcome into domain results.
//! Reservations against different facilities never contend.

use tracing::{debug, warn};

use super::ports::{
    AvailabilityReport, BookingStore, BookingTransaction, CapacityChange,
};
use super::{BookingError, BookingValidationError, Facility, FacilityCapacity, FacilityId};

/// Stateless engine; all state lives in the store.
#[derive(Debug, Default, Clone, Copy)]
pub struct CapacityEngine;

impl CapacityEngine {
    /// Advisory, lock-free availability check.
    ///
    /// # Errors
    /// [`BookingError::Validation`] for non-positive quantities,
    /// [`BookingError::FacilityNotFound`], or store failures.
    pub async fn check_availability<S>(
        &self,
        store: &S,
        facility_id: &FacilityId,
        quantity: i32,
    ) -> Result<AvailabilityReport, BookingError>
    where
        S: BookingStore + ?Sized,
    {
        if quantity <= 0 {
            return Err(BookingValidationError::NonPositiveQuantity.into());
        }
        let facility = store
            .find_facility(facility_id)
            .await?
            .ok_or(BookingError::FacilityNotFound(*facility_id))?;
        let current_available = facility.capacity.available();
        let available = facility.active && facility.capacity.can_hold(quantity);
        let message = if !facility.active {
            Some("Selected facility is not accepting bookings.".to_owned())
        } else if available {
            None
        } else {
            Some(format!(
                "Only {current_available} sacks are available at selected facility."
            ))
        };
        Ok(AvailabilityReport {
            available,
            current_available,
            message,
        })
    }

    /// Deduct `quantity` sacks inside `tx`. First committer wins.
    ///
    /// Returns the facility as updated, so callers can snapshot its price.
    ///
    /// # Errors
    /// [`BookingError::CapacityExceeded`] carrying the count seen by the
    /// conditional update, [`BookingError::FacilityNotFound`],
    /// [`BookingError::FacilityInactive`], or store failures.
    pub async fn reserve(
        &self,
        tx: &mut dyn BookingTransaction,
        facility_id: &FacilityId,
        quantity: i32,
    ) -> Result<Facility, BookingError> {
        if quantity <= 0 {
            return Err(BookingValidationError::NonPositiveQuantity.into());
        }
        match tx.try_reserve_capacity(facility_id, quantity).await? {
            CapacityChange::Applied(facility) => {
                debug!(
                    %facility_id,
                    quantity,
                    available = facility.capacity.available(),
                    "capacity reserved"
                );
                Ok(facility)
            }
            CapacityChange::Rejected { available } => {
                debug!(%facility_id, quantity, available, "capacity reservation rejected");
                Err(BookingError::CapacityExceeded {
                    available,
                    requested: quantity,
                })
            }
            CapacityChange::FacilityMissing => Err(BookingError::FacilityNotFound(*facility_id)),
            CapacityChange::FacilityInactive => Err(BookingError::FacilityInactive(*facility_id)),
            CapacityChange::Clamped { .. } => Err(BookingError::Inconsistent(format!(
                "reservation of {quantity} sacks at facility {facility_id} reported a release"
            ))),
        }
    }

    /// Return `quantity` sacks inside `tx`, clamped at the facility total.
    ///
    /// A clamped release still succeeds but is logged as a warning, since it
    /// means the facility held fewer reserved sacks than the booking.
    ///
    /// # Errors
    /// [`BookingError::Inconsistent`] when the facility has vanished, or
    /// store failures.
    pub async fn release(
        &self,
        tx: &mut dyn BookingTransaction,
        facility_id: &FacilityId,
        quantity: i32,
    ) -> Result<FacilityCapacity, BookingError> {
        if quantity <= 0 {
            return Err(BookingValidationError::NonPositiveQuantity.into());
        }
        match tx.release_capacity(facility_id, quantity).await? {
            CapacityChange::Applied(facility) => {
                debug!(
                    %facility_id,
                    quantity,
                    available = facility.capacity.available(),
                    "capacity released"
                );
                Ok(facility.capacity)
            }
            CapacityChange::Clamped { facility, restored } => {
                warn!(
                    %facility_id,
                    quantity,
                    restored,
                    total = facility.capacity.total(),
                    "capacity release clamped at facility total"
                );
                Ok(facility.capacity)
            }
            other => {
                warn!(%facility_id, quantity, outcome = ?other, "capacity release not applied");
                Err(BookingError::Inconsistent(format!(
                    "release of {quantity} sacks at facility {facility_id} was not applied"
                )))
            }
        }
    }
}

//! Storage facility capacity model.
//!
//! A facility tracks `total` and `available` sack counts. The pair always
//! satisfies `0 <= available <= total`; [`FacilityCapacity`] cannot be built
//! otherwise, and its mutators return new values rather than editing in place.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FacilityId;

/// Violations of the facility capacity invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CapacityError {
    /// Total capacity was negative.
    #[error("total capacity must not be negative (got {total})")]
    NegativeTotal {
        /// Supplied total.
        total: i32,
    },
    /// Available capacity fell outside `0..=total`.
    #[error("available capacity {available} must be between 0 and {total}")]
    AvailableOutOfRange {
        /// Supplied total.
        total: i32,
        /// Supplied available count.
        available: i32,
    },
    /// A reservation asked for more than remains.
    #[error("requested {requested} sacks but only {available} available")]
    Insufficient {
        /// Remaining sacks.
        available: i32,
        /// Requested sacks.
        requested: i32,
    },
    /// Quantities must be strictly positive.
    #[error("quantity must be positive (got {quantity})")]
    NonPositiveQuantity {
        /// Supplied quantity.
        quantity: i32,
    },
}

/// Total and available sack counts for a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityCapacity {
    total: i32,
    available: i32,
}

impl FacilityCapacity {
    /// Validate and build a capacity pair.
    ///
    /// # Errors
    /// Returns [`CapacityError`] when `total` is negative or `available` is
    /// outside `0..=total`.
    ///
    /// # Examples
    /// ```
    /// use storage_booking::domain::FacilityCapacity;
    ///
    /// let capacity = FacilityCapacity::new(100, 70).expect("valid");
    /// assert_eq!(capacity.reserved(), 30);
    /// assert!(FacilityCapacity::new(10, 11).is_err());
    /// ```
    pub const fn new(total: i32, available: i32) -> Result<Self, CapacityError> {
        if total < 0 {
            return Err(CapacityError::NegativeTotal { total });
        }
        if available < 0 || available > total {
            return Err(CapacityError::AvailableOutOfRange { total, available });
        }
        Ok(Self { total, available })
    }

    /// Fully available facility of the given size.
    ///
    /// # Errors
    /// Returns [`CapacityError::NegativeTotal`] for a negative size.
    pub const fn empty(total: i32) -> Result<Self, CapacityError> {
        Self::new(total, total)
    }

    /// Total sacks the facility can hold.
    #[must_use]
    pub const fn total(&self) -> i32 {
        self.total
    }

    /// Sacks still free.
    #[must_use]
    pub const fn available(&self) -> i32 {
        self.available
    }

    /// Sacks currently held by confirmed bookings.
    #[must_use]
    pub const fn reserved(&self) -> i32 {
        self.total - self.available
    }

    /// Whether `quantity` sacks would fit right now.
    #[must_use]
    pub const fn can_hold(&self, quantity: i32) -> bool {
        quantity > 0 && quantity <= self.available
    }

    /// Capacity after reserving `quantity` sacks.
    ///
    /// # Errors
    /// Returns [`CapacityError::NonPositiveQuantity`] or
    /// [`CapacityError::Insufficient`].
    pub const fn reserve(self, quantity: i32) -> Result<Self, CapacityError> {
        if quantity <= 0 {
            return Err(CapacityError::NonPositiveQuantity { quantity });
        }
        if quantity > self.available {
            return Err(CapacityError::Insufficient {
                available: self.available,
                requested: quantity,
            });
        }
        Ok(Self {
            total: self.total,
            available: self.available - quantity,
        })
    }

    /// Capacity after releasing `quantity` sacks, clamped at `total`.
    ///
    /// # Errors
    /// Returns [`CapacityError::NonPositiveQuantity`] for zero or negative
    /// quantities.
    pub const fn release(self, quantity: i32) -> Result<Self, CapacityError> {
        if quantity <= 0 {
            return Err(CapacityError::NonPositiveQuantity { quantity });
        }
        let headroom = self.total - self.available;
        let restored = if quantity > headroom { headroom } else { quantity };
        Ok(Self {
            total: self.total,
            available: self.available + restored,
        })
    }
}

/// Facility record as seen by the booking engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    /// Facility identifier.
    pub id: FacilityId,
    /// Display name.
    pub name: String,
    /// Capacity counts.
    pub capacity: FacilityCapacity,
    /// Price per sack, if the facility charges.
    pub price_per_sack: Option<Decimal>,
    /// Inactive facilities accept releases but not new reservations.
    pub active: bool,
}

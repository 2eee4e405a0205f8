//! Booking aggregate and its validated creation input.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BookingStatus;
use crate::domain::{BookingId, FacilityId, FarmerId, UserId};

const MAX_CROP_TYPE_LEN: usize = 100;
const MAX_NOTES_LEN: usize = 2000;

/// Reasons a booking request is rejected before touching the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingValidationError {
    /// Quantity was zero or negative.
    #[error("quantity must be a positive number of sacks")]
    NonPositiveQuantity,
    /// Crop type was blank.
    #[error("crop type must not be empty")]
    EmptyCropType,
    /// Crop type exceeded the stored column width.
    #[error("crop type must be at most {max} characters")]
    CropTypeTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Notes exceeded the accepted length.
    #[error("notes must be at most {max} characters")]
    NotesTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// End date preceded the start date.
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },
}

impl BookingValidationError {
    /// Request field the failure relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NonPositiveQuantity => "quantity",
            Self::EmptyCropType | Self::CropTypeTooLong { .. } => "cropType",
            Self::NotesTooLong { .. } => "notes",
            Self::EndBeforeStart { .. } => "endDate",
        }
    }
}

/// Unvalidated input for a new booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    /// Farmer the booking is for.
    pub farmer_id: FarmerId,
    /// Facility to reserve at.
    pub facility_id: FacilityId,
    /// Crop being stored.
    pub crop_type: String,
    /// Number of sacks.
    pub quantity: i32,
    /// First storage day.
    pub start_date: NaiveDate,
    /// Last storage day, if known.
    pub end_date: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Booking input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking(BookingDraft);

impl NewBooking {
    /// Validate a draft.
    ///
    /// Crop type and notes are trimmed; blank notes become `None`.
    ///
    /// # Errors
    /// Returns the first [`BookingValidationError`] encountered.
    pub fn new(mut draft: BookingDraft) -> Result<Self, BookingValidationError> {
        if draft.quantity <= 0 {
            return Err(BookingValidationError::NonPositiveQuantity);
        }
        draft.crop_type = draft.crop_type.trim().to_owned();
        if draft.crop_type.is_empty() {
            return Err(BookingValidationError::EmptyCropType);
        }
        if draft.crop_type.chars().count() > MAX_CROP_TYPE_LEN {
            return Err(BookingValidationError::CropTypeTooLong {
                max: MAX_CROP_TYPE_LEN,
            });
        }
        draft.notes = draft
            .notes
            .map(|notes| notes.trim().to_owned())
            .filter(|notes| !notes.is_empty());
        if draft
            .notes
            .as_ref()
            .is_some_and(|notes| notes.chars().count() > MAX_NOTES_LEN)
        {
            return Err(BookingValidationError::NotesTooLong { max: MAX_NOTES_LEN });
        }
        match draft.end_date {
            Some(end) if end < draft.start_date => {
                return Err(BookingValidationError::EndBeforeStart {
                    start: draft.start_date,
                    end,
                });
            }
            _ => {}
        }
        Ok(Self(draft))
    }

    /// Validated fields.
    #[must_use]
    pub const fn draft(&self) -> &BookingDraft {
        &self.0
    }
}

/// Persisted booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Booking identifier.
    pub id: BookingId,
    /// Owning farmer.
    pub farmer_id: FarmerId,
    /// Facility holding the sacks.
    pub facility_id: FacilityId,
    /// Crop being stored.
    pub crop_type: String,
    /// Number of sacks.
    pub quantity: i32,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Price per sack captured at creation.
    pub price_per_sack: Option<Decimal>,
    /// Total price captured at creation.
    pub total_price: Option<Decimal>,
    /// First storage day.
    pub start_date: NaiveDate,
    /// Last storage day, if known.
    pub end_date: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Creating user.
    pub created_by: Option<UserId>,
    /// Last modifying user.
    pub updated_by: Option<UserId>,
}

/// Everything needed to materialise a confirmed booking.
#[derive(Debug, Clone)]
pub struct ConfirmedBookingParts {
    /// Identifier for the new booking.
    pub id: BookingId,
    /// Validated request.
    pub request: NewBooking,
    /// Facility price at the time of booking.
    pub price_per_sack: Option<Decimal>,
    /// Creation time.
    pub now: DateTime<Utc>,
    /// Acting user.
    pub actor: Option<UserId>,
}

impl Booking {
    /// Build a confirmed booking, snapshotting price and total.
    #[must_use]
    pub fn confirmed(parts: ConfirmedBookingParts) -> Self {
        let ConfirmedBookingParts {
            id,
            request,
            price_per_sack,
            now,
            actor,
        } = parts;
        let NewBooking(draft) = request;
        let total_price = price_per_sack.map(|price| price * Decimal::from(draft.quantity));
        Self {
            id,
            farmer_id: draft.farmer_id,
            facility_id: draft.facility_id,
            crop_type: draft.crop_type,
            quantity: draft.quantity,
            status: BookingStatus::Confirmed,
            price_per_sack,
            total_price,
            start_date: draft.start_date,
            end_date: draft.end_date,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
            created_by: actor,
            updated_by: actor,
        }
    }

    /// Move to `Cancelled`, returning the prior status.
    ///
    /// # Errors
    /// Returns the current status when the booking is already cancelled.
    pub fn cancel(
        &mut self,
        now: DateTime<Utc>,
        actor: Option<UserId>,
    ) -> Result<BookingStatus, BookingStatus> {
        if !self.status.can_cancel() {
            return Err(self.status);
        }
        let previous = self.status;
        self.status = BookingStatus::Cancelled;
        self.updated_at = now;
        self.updated_by = actor;
        Ok(previous)
    }
}

//! Domain primitives, aggregates, and services.
//!
//! Purpose: model storage facilities, bookings against their capacity, and
//! the audit trail of booking transitions. Types here know nothing about
//! HTTP or SQL; adapters reach the domain only through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic failure payload.
//! - [`CapacityEngine`]: check, reserve, and release facility capacity.
//! - [`BookingService`]: booking state machine and read use cases.

pub mod actor;
pub mod booking;
pub mod booking_error;
pub mod booking_service;
pub mod capacity_engine;
pub mod closed_enum;
pub mod error;
pub mod facility;
pub mod ids;
pub mod ports;
pub mod trace_id;

pub use self::actor::{Actor, Role};
pub use self::booking::{
    Booking, BookingDraft, BookingHistoryEntry, BookingStatus, BookingValidationError,
    ChangedFields, ConfirmedBookingParts, HistoryAction, NewBooking, sort_history,
};
pub use self::booking_error::BookingError;
pub use self::booking_service::BookingService;
pub use self::capacity_engine::CapacityEngine;
pub use self::closed_enum::ParseClosedEnumError;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::facility::{CapacityError, Facility, FacilityCapacity};
pub use self::ids::{BookingId, FacilityId, FarmerId, HistoryEntryId, IdParseError, UserId};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use storage_booking::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<u32> {
///     Err(Error::not_found("no such facility"))
/// }
/// # assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;

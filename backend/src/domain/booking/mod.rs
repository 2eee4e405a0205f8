//! Booking aggregate: status machine, entity, and audit history.

mod entity;
mod history;
mod status;

pub use entity::{
    Booking, BookingDraft, BookingValidationError, ConfirmedBookingParts, NewBooking,
};
pub use history::{BookingHistoryEntry, ChangedFields, HistoryAction, sort_history};
pub use status::BookingStatus;

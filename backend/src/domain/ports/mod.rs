//! Domain ports.
//!
//! Driving ports (`BookingCommand`, `BookingQuery`) are implemented by domain
//! services and called by inbound adapters. Driven ports (`BookingStore`,
//! `ActorDirectory`) are implemented by outbound adapters.

mod actor_directory;
mod booking_command;
mod booking_query;
mod booking_store;
mod macros;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use actor_directory::MockActorDirectory;
pub use actor_directory::{ActorDirectory, ActorDirectoryError};
#[cfg(test)]
pub use booking_command::MockBookingCommand;
pub use booking_command::{
    BookingCommand, CancelBookingRequest, CancelBookingResponse, CreateBookingRequest,
    CreateBookingResponse,
};
#[cfg(test)]
pub use booking_query::MockBookingQuery;
pub use booking_query::{
    AvailabilityReport, BookingQuery, CheckAvailabilityRequest, FacilityCapacityView,
};
#[cfg(test)]
pub use booking_store::{MockBookingStore, MockBookingTransaction};
pub use booking_store::{BookingStore, BookingStoreError, BookingTransaction, CapacityChange};

//! HTTP inbound adapter exposing the booking REST endpoints.

pub(crate) mod actor;
pub mod bookings;
pub mod error;
pub mod facilities;
pub mod health;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub(crate) mod validation;

pub use error::ApiResult;

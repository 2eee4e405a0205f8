//! PostgreSQL adapters for the booking ports.
//!
//! Row structs and table definitions stay private to this module; adapters
//! translate them into validated domain types and map every database failure
//! into the port's error type.
//!
//! ```no_run
//! use storage_booking::outbound::persistence::{DbPool, DieselBookingStore, PoolConfig};
//!
//! # async fn connect() -> Result<(), storage_booking::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/storage")).await?;
//! let store = DieselBookingStore::new(pool);
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

mod diesel_actor_directory;
mod diesel_basic_error_mapping;
mod diesel_booking_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_actor_directory::DieselActorDirectory;
pub use diesel_booking_store::{DieselBookingStore, DieselTransaction};
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

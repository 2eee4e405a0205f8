//! In-process adapters for local runs without PostgreSQL and for tests.

mod actor_directory;
mod booking_store;

pub use actor_directory::InMemoryActorDirectory;
pub use booking_store::{InMemoryBookingStore, InMemoryTransaction};

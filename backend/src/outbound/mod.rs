//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL via Diesel, used in deployments.
//! - **memory**: process-local tables for database-free runs and tests.
//!
//! Adapters translate between domain types and storage representations and
//! hold no booking rules of their own.

pub mod memory;
pub mod persistence;

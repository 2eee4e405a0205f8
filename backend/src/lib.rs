//! Storage facility booking backend.
//!
//! Farmers reserve sacks of storage at facilities with finite capacity. The
//! [`domain`] module owns the capacity invariant and the booking state
//! machine; [`inbound`] and [`outbound`] adapt it to HTTP and storage.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;

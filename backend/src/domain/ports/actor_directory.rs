//! Driven port resolving authenticated users to booking actors.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Actor, UserId};

define_port_error! {
    /// Errors raised by actor directory adapters.
    pub enum ActorDirectoryError {
        /// Directory connection could not be established.
        Connection { message: String } =>
            "actor directory connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "actor directory query failed: {message}",
    }
}

/// Resolve a session's user into a role and optional farmer profile.
///
/// Unknown and deactivated users resolve to `None`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActorDirectory: Send + Sync {
    /// Look up the actor for `user_id`.
    async fn resolve(&self, user_id: &UserId) -> Result<Option<Actor>, ActorDirectoryError>;
}

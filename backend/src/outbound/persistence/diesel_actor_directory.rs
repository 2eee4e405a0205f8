//! PostgreSQL-backed `ActorDirectory`.
//!
//! Resolves an active user and, when present, the farmer profile linked to
//! it in one left join.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ActorDirectory, ActorDirectoryError};
use crate::domain::{Actor, Role, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::ActorRow;
use super::pool::{DbPool, PoolError};
use super::schema::{farmers, users};

/// Diesel implementation of the actor directory port.
#[derive(Clone)]
pub struct DieselActorDirectory {
    pool: DbPool,
}

impl DieselActorDirectory {
    /// Create a directory over `pool`.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ActorDirectoryError {
    map_basic_pool_error(error, ActorDirectoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ActorDirectoryError {
    map_basic_diesel_error(
        error,
        ActorDirectoryError::query,
        ActorDirectoryError::connection,
    )
}

fn row_to_actor(row: ActorRow) -> Result<Actor, ActorDirectoryError> {
    let role = row
        .role
        .parse::<Role>()
        .map_err(|err| ActorDirectoryError::query(format!("user {}: {err}", row.user_id)))?;
    Ok(Actor {
        user_id: row.user_id.into(),
        role,
        farmer_id: row.farmer_id.map(Into::into),
    })
}

#[async_trait]
impl ActorDirectory for DieselActorDirectory {
    async fn resolve(&self, user_id: &UserId) -> Result<Option<Actor>, ActorDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .left_join(farmers::table)
            .filter(users::id.eq(user_id.as_uuid()))
            .filter(users::is_active.eq(true))
            .select((users::id, users::role, farmers::id.nullable()))
            .first::<ActorRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_actor)
            .transpose()
    }
}

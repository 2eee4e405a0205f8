//! In-memory actor directory.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::ports::{ActorDirectory, ActorDirectoryError};
use crate::domain::{Actor, UserId};

/// Actor directory backed by a map. Unknown users resolve to `None`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActorDirectory {
    actors: Arc<RwLock<HashMap<UserId, Actor>>>,
}

impl InMemoryActorDirectory {
    /// Builder-style [`Self::put`].
    #[must_use]
    pub fn with_actor(self, actor: Actor) -> Self {
        self.put(actor);
        self
    }

    /// Register or replace an actor.
    pub fn put(&self, actor: Actor) {
        self.actors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(actor.user_id, actor);
    }
}

#[async_trait]
impl ActorDirectory for InMemoryActorDirectory {
    async fn resolve(&self, user_id: &UserId) -> Result<Option<Actor>, ActorDirectoryError> {
        Ok(self
            .actors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .cloned())
    }
}

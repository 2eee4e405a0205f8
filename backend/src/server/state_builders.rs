//! Chooses booking adapters for the HTTP state.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::warn;

use storage_booking::domain::BookingService;
use storage_booking::domain::ports::{ActorDirectory, BookingStore};
use storage_booking::inbound::http::state::HttpState;
use storage_booking::outbound::memory::{InMemoryActorDirectory, InMemoryBookingStore};
use storage_booking::outbound::persistence::{DieselActorDirectory, DieselBookingStore};

use super::ServerConfig;

/// Diesel adapters when a pool is configured, otherwise in-memory ones.
pub fn build_http_state(config: &ServerConfig) -> HttpState {
    let (store, actors): (Arc<dyn BookingStore>, Arc<dyn ActorDirectory>) = match &config.db_pool
    {
        Some(pool) => (
            Arc::new(DieselBookingStore::new(pool.clone())),
            Arc::new(DieselActorDirectory::new(pool.clone())),
        ),
        None => {
            warn!("no database configured; bookings are kept in memory and lost on restart");
            (
                Arc::new(InMemoryBookingStore::default()),
                Arc::new(InMemoryActorDirectory::default()),
            )
        }
    };

    let service = Arc::new(BookingService::new(store, Arc::new(DefaultClock)));
    HttpState::new(service.clone(), service, actors)
}

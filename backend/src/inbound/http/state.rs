//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle through `actix_web::web::Data` and only see
//! domain ports, so they can be exercised against mocks or the in-memory
//! store without a database.

use std::sync::Arc;

use crate::domain::ports::{ActorDirectory, BookingCommand, BookingQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Booking mutations.
    pub bookings: Arc<dyn BookingCommand>,
    /// Booking and capacity reads.
    pub bookings_query: Arc<dyn BookingQuery>,
    /// Session user to actor resolution.
    pub actors: Arc<dyn ActorDirectory>,
}

impl HttpState {
    /// Construct state from port implementations.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use storage_booking::domain::BookingService;
    /// use storage_booking::inbound::http::state::HttpState;
    /// use storage_booking::outbound::memory::{InMemoryActorDirectory, InMemoryBookingStore};
    ///
    /// let service = Arc::new(BookingService::new(
    ///     Arc::new(InMemoryBookingStore::default()),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(
    ///     service.clone(),
    ///     service,
    ///     Arc::new(InMemoryActorDirectory::default()),
    /// );
    /// let _bookings = state.bookings.clone();
    /// ```
    pub fn new(
        bookings: Arc<dyn BookingCommand>,
        bookings_query: Arc<dyn BookingQuery>,
        actors: Arc<dyn ActorDirectory>,
    ) -> Self {
        Self {
            bookings,
            bookings_query,
            actors,
        }
    }
}

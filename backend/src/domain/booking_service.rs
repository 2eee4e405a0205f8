//! Booking state machine and read use cases.
//!
//! Every mutation runs in one store transaction: the capacity change, the
//! booking write, and the audit entry commit together. Any failure rolls the
//! whole unit back before the error is returned.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, instrument, warn};

use super::ports::{
    AvailabilityReport, BookingCommand, BookingQuery, BookingStore, BookingTransaction,
    CancelBookingRequest, CancelBookingResponse, CheckAvailabilityRequest, CreateBookingRequest,
    CreateBookingResponse, FacilityCapacityView,
};
use super::{
    Booking, BookingError, BookingHistoryEntry, BookingId, CapacityEngine, ConfirmedBookingParts,
    Error, FacilityId, FarmerId, NewBooking, UserId, sort_history,
};

/// Booking service implementing both driving ports.
pub struct BookingService<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    engine: CapacityEngine,
}

impl<S: ?Sized> Clone for BookingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            engine: self.engine,
        }
    }
}

impl<S: ?Sized> BookingService<S> {
    /// Create a service over `store`, stamping times from `clock`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use storage_booking::domain::BookingService;
    /// use storage_booking::outbound::memory::InMemoryBookingStore;
    ///
    /// let service = BookingService::new(
    ///     Arc::new(InMemoryBookingStore::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            engine: CapacityEngine,
        }
    }
}

async fn rollback(tx: Box<dyn BookingTransaction>, cause: &BookingError) {
    if let Err(error) = tx.rollback().await {
        warn!(%error, %cause, "booking transaction rollback failed");
    }
}

impl<S> BookingService<S>
where
    S: BookingStore + ?Sized,
{
    async fn create_in(
        &self,
        tx: &mut dyn BookingTransaction,
        request: NewBooking,
        actor: Option<UserId>,
    ) -> Result<CreateBookingResponse, BookingError> {
        let facility_id = request.draft().facility_id;
        let quantity = request.draft().quantity;

        let facility = self.engine.reserve(tx, &facility_id, quantity).await?;
        let now = self.clock.utc();
        let booking = Booking::confirmed(ConfirmedBookingParts {
            id: BookingId::random(),
            request,
            price_per_sack: facility.price_per_sack,
            now,
            actor,
        });
        tx.insert_booking(&booking).await?;
        tx.append_history(&BookingHistoryEntry::created(
            booking.id,
            booking.status,
            now,
            actor,
        ))
        .await?;

        Ok(CreateBookingResponse {
            booking,
            available_after_booking: facility.capacity.available(),
        })
    }

    async fn cancel_in(
        &self,
        tx: &mut dyn BookingTransaction,
        booking_id: BookingId,
        actor: Option<UserId>,
    ) -> Result<CancelBookingResponse, BookingError> {
        let mut booking = tx
            .lock_booking(&booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;
        let now = self.clock.utc();
        let previous = booking
            .cancel(now, actor)
            .map_err(|status| BookingError::AlreadyCancelled { booking_id, status })?;
        tx.update_booking(&booking).await?;

        let available_after_release = if previous.holds_capacity() {
            let capacity = self
                .engine
                .release(tx, &booking.facility_id, booking.quantity)
                .await?;
            Some(capacity.available())
        } else {
            None
        };

        tx.append_history(&BookingHistoryEntry::status_changed(
            booking.id,
            previous,
            booking.status,
            now,
            actor,
        ))
        .await?;

        Ok(CancelBookingResponse {
            booking,
            available_after_release,
        })
    }
}

#[async_trait]
impl<S> BookingCommand for BookingService<S>
where
    S: BookingStore + ?Sized,
{
    #[instrument(
        skip_all,
        fields(
            facility_id = %request.draft.facility_id,
            farmer_id = %request.draft.farmer_id,
            quantity = request.draft.quantity,
        )
    )]
    async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<CreateBookingResponse, Error> {
        let CreateBookingRequest { draft, actor } = request;
        let new_booking = NewBooking::new(draft).map_err(BookingError::from)?;

        let mut tx = self.store.begin().await.map_err(BookingError::from)?;
        match self.create_in(tx.as_mut(), new_booking, actor).await {
            Ok(response) => {
                tx.commit().await.map_err(BookingError::from)?;
                info!(
                    booking_id = %response.booking.id,
                    available = response.available_after_booking,
                    "booking confirmed"
                );
                Ok(response)
            }
            Err(error) => {
                rollback(tx, &error).await;
                info!(%error, "booking rejected");
                Err(error.into())
            }
        }
    }

    #[instrument(skip_all, fields(booking_id = %request.booking_id))]
    async fn cancel_booking(
        &self,
        request: CancelBookingRequest,
    ) -> Result<CancelBookingResponse, Error> {
        let CancelBookingRequest { booking_id, actor } = request;

        let mut tx = self.store.begin().await.map_err(BookingError::from)?;
        match self.cancel_in(tx.as_mut(), booking_id, actor).await {
            Ok(response) => {
                tx.commit().await.map_err(BookingError::from)?;
                info!(
                    released = response.available_after_release.is_some(),
                    "booking cancelled"
                );
                Ok(response)
            }
            Err(error) => {
                rollback(tx, &error).await;
                info!(%error, "booking cancellation rejected");
                Err(error.into())
            }
        }
    }
}

#[async_trait]
impl<S> BookingQuery for BookingService<S>
where
    S: BookingStore + ?Sized,
{
    async fn check_availability(
        &self,
        request: CheckAvailabilityRequest,
    ) -> Result<AvailabilityReport, Error> {
        self.engine
            .check_availability(self.store.as_ref(), &request.facility_id, request.quantity)
            .await
            .map_err(Error::from)
    }

    async fn get_booking(&self, booking_id: &BookingId) -> Result<Booking, Error> {
        self.store
            .find_booking(booking_id)
            .await
            .map_err(BookingError::from)?
            .ok_or_else(|| BookingError::BookingNotFound(*booking_id).into())
    }

    async fn list_bookings_for_farmer(&self, farmer_id: &FarmerId) -> Result<Vec<Booking>, Error> {
        self.store
            .list_bookings_for_farmer(farmer_id)
            .await
            .map_err(|error| BookingError::from(error).into())
    }

    async fn booking_history(
        &self,
        booking_id: &BookingId,
    ) -> Result<Vec<BookingHistoryEntry>, Error> {
        let mut entries = self
            .store
            .list_history(booking_id)
            .await
            .map_err(BookingError::from)?;
        sort_history(&mut entries);
        Ok(entries)
    }

    async fn facility_capacity(
        &self,
        facility_id: &FacilityId,
    ) -> Result<FacilityCapacityView, Error> {
        let facility = self
            .store
            .find_facility(facility_id)
            .await
            .map_err(BookingError::from)?
            .ok_or(BookingError::FacilityNotFound(*facility_id))?;
        Ok(FacilityCapacityView {
            facility_id: facility.id,
            name: facility.name,
            total: facility.capacity.total(),
            available: facility.capacity.available(),
            price_per_sack: facility.price_per_sack,
            active: facility.active,
        })
    }
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;

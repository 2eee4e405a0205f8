//! PostgreSQL-backed `BookingStore` using Diesel.
//!
//! Each [`DieselTransaction`] owns a pooled connection with an open database
//! transaction. Reservations are a single conditional `UPDATE ... RETURNING`
//! so two transactions racing for the last sacks cannot both succeed; the
//! loser's update matches no row and is classified with a follow-up read.
//!
//! A transaction dropped without commit or rollback returns its connection
//! with the transaction still open. The pool discards such connections
//! instead of reusing them, so PostgreSQL rolls the work back.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use tracing::debug;

use crate::domain::ports::{BookingStore, BookingStoreError, BookingTransaction, CapacityChange};
use crate::domain::{
    Booking, BookingHistoryEntry, BookingId, Facility, FacilityId, FarmerId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{BookingRow, BookingStatusUpdate, FacilityRow, HistoryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{bookings, bookings_history, facilities};

/// Diesel implementation of the booking store port.
#[derive(Clone)]
pub struct DieselBookingStore {
    pool: DbPool,
}

impl DieselBookingStore {
    /// Create a store over `pool`.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookingStoreError {
    map_basic_pool_error(error, BookingStoreError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> BookingStoreError {
    map_basic_diesel_error(
        error,
        BookingStoreError::query,
        BookingStoreError::connection,
    )
}

fn row_to_facility(row: FacilityRow) -> Result<Facility, BookingStoreError> {
    Facility::try_from(row).map_err(BookingStoreError::query)
}

fn row_to_booking(row: BookingRow) -> Result<Booking, BookingStoreError> {
    Booking::try_from(row).map_err(BookingStoreError::query)
}

async fn load_facility(
    conn: &mut AsyncPgConnection,
    facility_id: &FacilityId,
) -> Result<Option<Facility>, BookingStoreError> {
    facilities::table
        .find(facility_id.as_uuid())
        .select(FacilityRow::as_select())
        .first::<FacilityRow>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .map(row_to_facility)
        .transpose()
}

#[async_trait]
impl BookingStore for DieselBookingStore {
    async fn begin(&self) -> Result<Box<dyn BookingTransaction>, BookingStoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Box::new(DieselTransaction { conn }))
    }

    async fn find_facility(
        &self,
        facility_id: &FacilityId,
    ) -> Result<Option<Facility>, BookingStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_facility(&mut conn, facility_id).await
    }

    async fn find_booking(
        &self,
        booking_id: &BookingId,
    ) -> Result<Option<Booking>, BookingStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        bookings::table
            .find(booking_id.as_uuid())
            .select(BookingRow::as_select())
            .first::<BookingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_booking)
            .transpose()
    }

    async fn list_bookings_for_farmer(
        &self,
        farmer_id: &FarmerId,
    ) -> Result<Vec<Booking>, BookingStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BookingRow> = bookings::table
            .filter(bookings::farmer_id.eq(farmer_id.as_uuid()))
            .order((bookings::created_at.desc(), bookings::id.desc()))
            .select(BookingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_booking).collect()
    }

    async fn list_history(
        &self,
        booking_id: &BookingId,
    ) -> Result<Vec<BookingHistoryEntry>, BookingStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<HistoryRow> = bookings_history::table
            .filter(bookings_history::booking_id.eq(booking_id.as_uuid()))
            .order((bookings_history::changed_at.asc(), bookings_history::id.asc()))
            .select(HistoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| BookingHistoryEntry::try_from(row).map_err(BookingStoreError::query))
            .collect()
    }
}

/// Open database transaction on an owned pooled connection.
pub struct DieselTransaction {
    conn: PooledConnection<'static, AsyncPgConnection>,
}

impl DieselTransaction {
    /// Tell apart a missing facility, an inactive one, and a shortfall after
    /// the conditional update matched nothing.
    async fn classify_rejection(
        &mut self,
        facility_id: &FacilityId,
    ) -> Result<CapacityChange, BookingStoreError> {
        let outcome = match load_facility(&mut self.conn, facility_id).await? {
            None => CapacityChange::FacilityMissing,
            Some(facility) if !facility.active => CapacityChange::FacilityInactive,
            Some(facility) => CapacityChange::Rejected {
                available: facility.capacity.available(),
            },
        };
        Ok(outcome)
    }
}

#[async_trait]
impl BookingTransaction for DieselTransaction {
    async fn try_reserve_capacity(
        &mut self,
        facility_id: &FacilityId,
        quantity: i32,
    ) -> Result<CapacityChange, BookingStoreError> {
        let updated = diesel::update(
            facilities::table
                .filter(facilities::id.eq(facility_id.as_uuid()))
                .filter(facilities::is_active.eq(true))
                .filter(facilities::available_capacity_sacks.ge(quantity)),
        )
        .set((
            facilities::available_capacity_sacks
                .eq(facilities::available_capacity_sacks - quantity),
            facilities::updated_at.eq(diesel::dsl::now),
        ))
        .returning(FacilityRow::as_returning())
        .get_result::<FacilityRow>(&mut *self.conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        match updated {
            Some(row) => Ok(CapacityChange::Applied(row_to_facility(row)?)),
            None => {
                let outcome = self.classify_rejection(facility_id).await?;
                debug!(%facility_id, quantity, ?outcome, "conditional reservation matched no row");
                Ok(outcome)
            }
        }
    }

    async fn release_capacity(
        &mut self,
        facility_id: &FacilityId,
        quantity: i32,
    ) -> Result<CapacityChange, BookingStoreError> {
        let locked = facilities::table
            .find(facility_id.as_uuid())
            .select(FacilityRow::as_select())
            .for_update()
            .first::<FacilityRow>(&mut *self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = locked else {
            return Ok(CapacityChange::FacilityMissing);
        };
        let mut facility = row_to_facility(row)?;
        let previous_available = facility.capacity.available();
        facility.capacity = facility
            .capacity
            .release(quantity)
            .map_err(|err| BookingStoreError::query(err.to_string()))?;

        diesel::update(facilities::table.find(facility_id.as_uuid()))
            .set((
                facilities::available_capacity_sacks.eq(facility.capacity.available()),
                facilities::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(CapacityChange::released(facility, previous_available, quantity))
    }

    async fn insert_booking(&mut self, booking: &Booking) -> Result<(), BookingStoreError> {
        diesel::insert_into(bookings::table)
            .values(&BookingRow::from(booking))
            .execute(&mut *self.conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn lock_booking(
        &mut self,
        booking_id: &BookingId,
    ) -> Result<Option<Booking>, BookingStoreError> {
        bookings::table
            .find(booking_id.as_uuid())
            .select(BookingRow::as_select())
            .for_update()
            .first::<BookingRow>(&mut *self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_booking)
            .transpose()
    }

    async fn update_booking(&mut self, booking: &Booking) -> Result<(), BookingStoreError> {
        let changes = BookingStatusUpdate {
            status: booking.status.as_str(),
            updated_at: booking.updated_at,
            updated_by: booking.updated_by.map(Into::into),
        };
        let affected = diesel::update(bookings::table.find(booking.id.as_uuid()))
            .set(&changes)
            .execute(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        if affected == 1 {
            Ok(())
        } else {
            Err(BookingStoreError::query(format!(
                "booking {} was not updated",
                booking.id
            )))
        }
    }

    async fn append_history(
        &mut self,
        entry: &BookingHistoryEntry,
    ) -> Result<(), BookingStoreError> {
        let row = HistoryRow::try_from(entry).map_err(BookingStoreError::query)?;
        diesel::insert_into(bookings_history::table)
            .values(&row)
            .execute(&mut *self.conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn commit(mut self: Box<Self>) -> Result<(), BookingStoreError> {
        AnsiTransactionManager::commit_transaction(&mut *self.conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), BookingStoreError> {
        AnsiTransactionManager::rollback_transaction(&mut *self.conn)
            .await
            .map_err(map_diesel_error)
    }
}

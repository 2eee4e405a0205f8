//! In-memory booking store with per-row locking.
//!
//! Each facility and booking row has an async mutex. A transaction takes the
//! row's lock the first time it touches it and keeps it until commit or
//! rollback, mirroring PostgreSQL row locks taken by `UPDATE` and
//! `SELECT ... FOR UPDATE`. Writes are staged inside the transaction and
//! applied to the shared tables in one step on commit; dropping the
//! transaction discards them.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::{Mutex as RowLock, OwnedMutexGuard};
use tracing::debug;

use crate::domain::ports::{BookingStore, BookingStoreError, BookingTransaction, CapacityChange};
use crate::domain::{
    Booking, BookingHistoryEntry, BookingId, Facility, FacilityId, FarmerId, sort_history,
};

#[derive(Debug, Default)]
struct Tables {
    facilities: HashMap<FacilityId, Facility>,
    bookings: HashMap<BookingId, Booking>,
    history: Vec<BookingHistoryEntry>,
}

type RowTable<K> = Arc<Mutex<HashMap<K, Arc<RowLock<()>>>>>;

/// Per-row async locks. Entries live only while some transaction holds or
/// waits for the row.
#[derive(Debug)]
struct RowLocks<K> {
    rows: RowTable<K>,
}

impl<K> Default for RowLocks<K> {
    fn default() -> Self {
        Self {
            rows: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K: Eq + Hash + Copy> RowLocks<K> {
    async fn acquire(&self, key: K) -> RowGuard<K> {
        let lock = {
            let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(rows.entry(key).or_default())
        };
        let guard = Arc::clone(&lock).lock_owned().await;
        RowGuard {
            key,
            rows: Arc::clone(&self.rows),
            lock,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Held row lock; drops its table entry once nobody else references it.
struct RowGuard<K: Eq + Hash> {
    key: K,
    rows: RowTable<K>,
    lock: Arc<RowLock<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K: Eq + Hash> Drop for RowGuard<K> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        // The table and this guard are the last two owners.
        if Arc::strong_count(&self.lock) == 2 {
            rows.remove(&self.key);
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    tables: Mutex<Tables>,
    facility_locks: RowLocks<FacilityId>,
    booking_locks: RowLocks<BookingId>,
}

impl Shared {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Booking store kept in process memory.
///
/// Cloning yields another handle to the same tables.
///
/// # Examples
/// ```
/// use storage_booking::domain::{Facility, FacilityCapacity, FacilityId};
/// use storage_booking::outbound::memory::InMemoryBookingStore;
///
/// let facility = Facility {
///     id: FacilityId::random(),
///     name: "Erode Cold Storage".to_owned(),
///     capacity: FacilityCapacity::empty(100).expect("valid total"),
///     price_per_sack: None,
///     active: true,
/// };
/// let id = facility.id;
/// let store = InMemoryBookingStore::default().with_facility(facility);
/// assert_eq!(store.facility(&id).map(|f| f.capacity.available()), Some(100));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookingStore {
    shared: Arc<Shared>,
}

impl InMemoryBookingStore {
    /// Builder-style [`Self::put_facility`].
    #[must_use]
    pub fn with_facility(self, facility: Facility) -> Self {
        self.put_facility(facility);
        self
    }

    /// Insert or replace a facility row.
    pub fn put_facility(&self, facility: Facility) {
        self.shared.tables().facilities.insert(facility.id, facility);
    }

    /// Insert or replace a booking row without touching capacity.
    pub fn put_booking(&self, booking: Booking) {
        self.shared.tables().bookings.insert(booking.id, booking);
    }

    /// Committed state of a facility.
    #[must_use]
    pub fn facility(&self, facility_id: &FacilityId) -> Option<Facility> {
        self.shared.tables().facilities.get(facility_id).cloned()
    }

    /// Number of committed audit entries across all bookings.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.shared.tables().history.len()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn begin(&self) -> Result<Box<dyn BookingTransaction>, BookingStoreError> {
        Ok(Box::new(InMemoryTransaction::new(Arc::clone(&self.shared))))
    }

    async fn find_facility(
        &self,
        facility_id: &FacilityId,
    ) -> Result<Option<Facility>, BookingStoreError> {
        Ok(self.facility(facility_id))
    }

    async fn find_booking(
        &self,
        booking_id: &BookingId,
    ) -> Result<Option<Booking>, BookingStoreError> {
        Ok(self.shared.tables().bookings.get(booking_id).cloned())
    }

    async fn list_bookings_for_farmer(
        &self,
        farmer_id: &FarmerId,
    ) -> Result<Vec<Booking>, BookingStoreError> {
        let mut bookings: Vec<Booking> = self
            .shared
            .tables()
            .bookings
            .values()
            .filter(|booking| booking.farmer_id == *farmer_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(bookings)
    }

    async fn list_history(
        &self,
        booking_id: &BookingId,
    ) -> Result<Vec<BookingHistoryEntry>, BookingStoreError> {
        let mut entries: Vec<BookingHistoryEntry> = self
            .shared
            .tables()
            .history
            .iter()
            .filter(|entry| entry.booking_id == *booking_id)
            .cloned()
            .collect();
        sort_history(&mut entries);
        Ok(entries)
    }
}

/// Unit of work over an [`InMemoryBookingStore`].
pub struct InMemoryTransaction {
    shared: Arc<Shared>,
    facility_guards: HashMap<FacilityId, RowGuard<FacilityId>>,
    booking_guards: HashMap<BookingId, RowGuard<BookingId>>,
    facilities: HashMap<FacilityId, Facility>,
    bookings: HashMap<BookingId, Booking>,
    history: Vec<BookingHistoryEntry>,
}

impl InMemoryTransaction {
    fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            facility_guards: HashMap::new(),
            booking_guards: HashMap::new(),
            facilities: HashMap::new(),
            bookings: HashMap::new(),
            history: Vec::new(),
        }
    }

    async fn lock_facility(&mut self, facility_id: FacilityId) -> Option<Facility> {
        if let Entry::Vacant(slot) = self.facility_guards.entry(facility_id) {
            slot.insert(self.shared.facility_locks.acquire(facility_id).await);
        }
        self.facilities
            .get(&facility_id)
            .cloned()
            .or_else(|| self.shared.tables().facilities.get(&facility_id).cloned())
    }

    async fn lock_booking_row(&mut self, booking_id: BookingId) -> Option<Booking> {
        if let Entry::Vacant(slot) = self.booking_guards.entry(booking_id) {
            slot.insert(self.shared.booking_locks.acquire(booking_id).await);
        }
        self.bookings
            .get(&booking_id)
            .cloned()
            .or_else(|| self.shared.tables().bookings.get(&booking_id).cloned())
    }

    fn booking_exists(&self, booking_id: &BookingId) -> bool {
        self.bookings.contains_key(booking_id)
            || self.shared.tables().bookings.contains_key(booking_id)
    }
}

#[async_trait]
impl BookingTransaction for InMemoryTransaction {
    async fn try_reserve_capacity(
        &mut self,
        facility_id: &FacilityId,
        quantity: i32,
    ) -> Result<CapacityChange, BookingStoreError> {
        let Some(mut facility) = self.lock_facility(*facility_id).await else {
            return Ok(CapacityChange::FacilityMissing);
        };
        if !facility.active {
            return Ok(CapacityChange::FacilityInactive);
        }
        let Ok(capacity) = facility.capacity.reserve(quantity) else {
            return Ok(CapacityChange::Rejected {
                available: facility.capacity.available(),
            });
        };
        facility.capacity = capacity;
        self.facilities.insert(facility.id, facility.clone());
        Ok(CapacityChange::Applied(facility))
    }

    async fn release_capacity(
        &mut self,
        facility_id: &FacilityId,
        quantity: i32,
    ) -> Result<CapacityChange, BookingStoreError> {
        let Some(mut facility) = self.lock_facility(*facility_id).await else {
            return Ok(CapacityChange::FacilityMissing);
        };
        let previous_available = facility.capacity.available();
        facility.capacity = facility
            .capacity
            .release(quantity)
            .map_err(|error| BookingStoreError::query(error.to_string()))?;
        self.facilities.insert(facility.id, facility.clone());
        Ok(CapacityChange::released(facility, previous_available, quantity))
    }

    async fn insert_booking(&mut self, booking: &Booking) -> Result<(), BookingStoreError> {
        if self.booking_exists(&booking.id) {
            return Err(BookingStoreError::query(format!(
                "booking {} already exists",
                booking.id
            )));
        }
        self.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn lock_booking(
        &mut self,
        booking_id: &BookingId,
    ) -> Result<Option<Booking>, BookingStoreError> {
        Ok(self.lock_booking_row(*booking_id).await)
    }

    async fn update_booking(&mut self, booking: &Booking) -> Result<(), BookingStoreError> {
        if !self.booking_exists(&booking.id) {
            return Err(BookingStoreError::query(format!(
                "booking {} does not exist",
                booking.id
            )));
        }
        self.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn append_history(
        &mut self,
        entry: &BookingHistoryEntry,
    ) -> Result<(), BookingStoreError> {
        self.history.push(entry.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), BookingStoreError> {
        let this = *self;
        {
            let mut tables = this.shared.tables();
            tables.facilities.extend(this.facilities);
            tables.bookings.extend(this.bookings);
            tables.history.extend(this.history);
        }
        debug!(
            facilities = this.facility_guards.len(),
            bookings = this.booking_guards.len(),
            "in-memory transaction committed"
        );
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), BookingStoreError> {
        debug!("in-memory transaction rolled back");
        Ok(())
    }
}

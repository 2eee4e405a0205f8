//! Concurrency properties of capacity reservation.
//!
//! `n` simultaneous bookings of `q` sacks against `C` free sacks must yield
//! exactly `min(n, floor(C / q))` confirmations, every other request must be
//! rejected for capacity, and the facility must end with
//! `C - q * confirmations` sacks available.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::DefaultClock;
use rstest::rstest;
use storage_booking::domain::ports::{
    BookingCommand, BookingQuery, CancelBookingRequest, CreateBookingRequest,
};
use storage_booking::domain::{
    BookingDraft, BookingService, ErrorCode, Facility, FacilityCapacity, FacilityId, FarmerId,
};
use storage_booking::outbound::memory::InMemoryBookingStore;

fn facility(total: i32) -> Facility {
    Facility {
        id: FacilityId::random(),
        name: "Hillside Store".to_owned(),
        capacity: FacilityCapacity::empty(total).expect("valid capacity"),
        price_per_sack: None,
        active: true,
    }
}

fn request(facility_id: FacilityId, quantity: i32) -> CreateBookingRequest {
    CreateBookingRequest {
        draft: BookingDraft {
            farmer_id: FarmerId::random(),
            facility_id,
            crop_type: "Onion".to_owned(),
            quantity,
            start_date: NaiveDate::from_ymd_opt(2026, 6, 1).expect("date"),
            end_date: None,
            notes: None,
        },
        actor: None,
    }
}

#[rstest]
#[case(100, 60, 2)]
#[case(100, 10, 25)]
#[case(100, 7, 20)]
#[case(50, 50, 8)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reservations_never_oversell(
    #[case] total: i32,
    #[case] quantity: i32,
    #[case] requests: usize,
) {
    let facility = facility(total);
    let facility_id = facility.id;
    let store = InMemoryBookingStore::default().with_facility(facility);
    let service = Arc::new(BookingService::new(
        Arc::new(store.clone()),
        Arc::new(DefaultClock),
    ));

    let handles: Vec<_> = (0..requests)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.create_booking(request(facility_id, quantity)).await })
        })
        .collect();
    let mut confirmed = 0_i32;
    let mut rejected = 0_usize;
    for handle in handles {
        match handle.await.expect("task joins") {
            Ok(_) => confirmed += 1,
            Err(error) => {
                assert_eq!(error.code(), ErrorCode::CapacityExceeded, "{error}");
                rejected += 1;
            }
        }
    }

    let fit = usize::try_from(total / quantity).expect("non-negative");
    let expected = i32::try_from(requests.min(fit)).expect("small count");
    assert_eq!(confirmed, expected);
    assert_eq!(rejected, requests - requests.min(fit));

    let after = store.facility(&facility_id).expect("facility").capacity;
    assert_eq!(after.available(), total - quantity * confirmed);
    assert_eq!(store.history_len(), usize::try_from(confirmed).expect("count"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_cancellations_release_once() {
    let facility = facility(100);
    let facility_id = facility.id;
    let store = InMemoryBookingStore::default().with_facility(facility);
    let service = Arc::new(BookingService::new(
        Arc::new(store.clone()),
        Arc::new(DefaultClock),
    ));
    let booking_id = service
        .create_booking(request(facility_id, 40))
        .await
        .expect("booking confirmed")
        .booking
        .id;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .cancel_booking(CancelBookingRequest {
                        booking_id,
                        actor: None,
                    })
                    .await
            })
        })
        .collect();
    let mut successes = 0;
    for handle in handles {
        match handle.await.expect("task joins") {
            Ok(_) => successes += 1,
            Err(error) => assert_eq!(error.code(), ErrorCode::InvalidState),
        }
    }

    assert_eq!(successes, 1);
    let view = service
        .facility_capacity(&facility_id)
        .await
        .expect("facility view");
    assert_eq!(view.available, 100);
    assert_eq!(store.history_len(), 2);
}

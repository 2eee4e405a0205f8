//! Tests for booking HTTP handlers.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, test as actix_test, web};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::{
    Actor, BookingService, Facility, FacilityCapacity, FacilityId, FarmerId, Role, UserId,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
use crate::outbound::memory::{InMemoryActorDirectory, InMemoryBookingStore};

struct Harness {
    store: InMemoryBookingStore,
    state: HttpState,
    facility_id: FacilityId,
    farmer: Actor,
    other_farmer: Actor,
    admin: Actor,
}

fn actor(role: Role, farmer_id: Option<FarmerId>) -> Actor {
    Actor {
        user_id: UserId::random(),
        role,
        farmer_id,
    }
}

#[fixture]
fn harness() -> Harness {
    let facility = Facility {
        id: FacilityId::random(),
        name: "Erode Cold Storage".to_owned(),
        capacity: FacilityCapacity::empty(100).expect("valid"),
        price_per_sack: Some(rust_decimal::Decimal::new(1500, 2)),
        active: true,
    };
    let facility_id = facility.id;
    let store = InMemoryBookingStore::default().with_facility(facility);
    let farmer = actor(Role::Farmer, Some(FarmerId::random()));
    let other_farmer = actor(Role::Farmer, Some(FarmerId::random()));
    let admin = actor(Role::Admin, None);
    let actors = InMemoryActorDirectory::default()
        .with_actor(farmer.clone())
        .with_actor(other_farmer.clone())
        .with_actor(admin.clone());
    let service = Arc::new(BookingService::new(
        Arc::new(store.clone()),
        Arc::new(DefaultClock),
    ));
    Harness {
        store,
        state: HttpState::new(service.clone(), service, Arc::new(actors)),
        facility_id,
        farmer,
        other_farmer,
        admin,
    }
}

async fn test_login(
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id: UserId = path.parse().map_err(|_| Error::invalid_request("bad id"))?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .route("/test/login/{user_id}", web::post().to(test_login))
        .service(
            web::scope("/api/v1")
                .service(check_availability)
                .service(create_booking)
                .service(list_bookings)
                .service(get_booking)
                .service(booking_history)
                .service(cancel_booking),
        )
}

async fn login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    actor: &Actor,
) -> Cookie<'static> {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/test/login/{}", actor.user_id))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success());
    session_cookie(&res)
}

fn booking_payload(facility_id: FacilityId, quantity: i32) -> Value {
    json!({
        "facilityId": facility_id.to_string(),
        "cropType": "Turmeric",
        "quantity": quantity,
        "startDate": "2026-03-02",
        "endDate": "2026-06-30",
    })
}

async fn create(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &Cookie<'static>,
    payload: Value,
) -> (StatusCode, Value) {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/bookings")
            .cookie(cookie.clone())
            .set_json(payload)
            .to_request(),
    )
    .await;
    let status = res.status();
    (status, actix_test::read_body_json(res).await)
}

#[rstest]
#[actix_web::test]
async fn create_returns_created_booking_and_remaining_capacity(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login(&app, &harness.farmer).await;

    let (status, body) = create(&app, &cookie, booking_payload(harness.facility_id, 30)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], json!("CONFIRMED"));
    assert_eq!(body["availableAfterBooking"], json!(70));
    assert!(body["bookingId"].as_str().is_some());
}

#[rstest]
#[actix_web::test]
async fn create_reports_capacity_conflict_with_available_count(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login(&app, &harness.farmer).await;

    let (status, body) = create(&app, &cookie, booking_payload(harness.facility_id, 101)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!("capacity_exceeded"));
    assert_eq!(body["details"], json!({"available": 100, "requested": 101}));
    assert_eq!(
        harness
            .store
            .facility(&harness.facility_id)
            .map(|f| f.capacity.available()),
        Some(100)
    );
}

#[rstest]
#[case(json!({"facilityId": "nope", "cropType": "Rice", "quantity": 1, "startDate": "2026-03-02"}), "facilityId")]
#[case(json!({"facilityId": FacilityId::random().to_string(), "cropType": "Rice", "quantity": 1, "startDate": "03/02/2026"}), "startDate")]
#[case(json!({"facilityId": FacilityId::random().to_string(), "cropType": "Rice", "quantity": 0, "startDate": "2026-03-02"}), "quantity")]
#[case(json!({"facilityId": FacilityId::random().to_string(), "cropType": " ", "quantity": 1, "startDate": "2026-03-02"}), "cropType")]
#[actix_web::test]
async fn create_rejects_invalid_fields(
    harness: Harness,
    #[case] payload: Value,
    #[case] field: &str,
) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login(&app, &harness.farmer).await;

    let (status, body) = create(&app, &cookie, payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], json!(field));
}

#[rstest]
#[actix_web::test]
async fn create_requires_session(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/bookings")
            .set_json(booking_payload(harness.facility_id, 1))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn create_requires_farmer_profile(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login(&app, &harness.admin).await;

    let (status, body) = create(&app, &cookie, booking_payload(harness.facility_id, 1)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], json!("farmer profile not found"));
}

#[rstest]
#[actix_web::test]
async fn check_availability_needs_no_session(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/bookings/check")
            .set_json(json!({"facilityId": harness.facility_id.to_string(), "quantity": 120}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["available"], json!(false));
    assert_eq!(body["currentAvailable"], json!(100));
    assert_eq!(
        body["message"],
        json!("Only 100 sacks are available at selected facility.")
    );
}

#[rstest]
#[actix_web::test]
async fn cancel_releases_capacity_and_second_cancel_conflicts(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login(&app, &harness.farmer).await;
    let (_, created) = create(&app, &cookie, booking_payload(harness.facility_id, 30)).await;
    let booking_id = created["bookingId"].as_str().expect("id").to_owned();
    let cancel_uri = format!("/api/v1/bookings/{booking_id}/cancel");

    let first = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&cancel_uri)
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(first).await;
    assert_eq!(body["booking"]["status"], json!("CANCELLED"));
    assert_eq!(body["availableAfterRelease"], json!(100));

    let second = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&cancel_uri)
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(second).await;
    assert_eq!(body["code"], json!("invalid_state"));
    assert_eq!(
        harness
            .store
            .facility(&harness.facility_id)
            .map(|f| f.capacity.available()),
        Some(100)
    );
}

#[rstest]
#[actix_web::test]
async fn other_farmers_cannot_read_or_cancel(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let owner_cookie = login(&app, &harness.farmer).await;
    let (_, created) = create(&app, &owner_cookie, booking_payload(harness.facility_id, 5)).await;
    let booking_id = created["bookingId"].as_str().expect("id").to_owned();
    let intruder = login(&app, &harness.other_farmer).await;

    for request in [
        actix_test::TestRequest::get().uri(&format!("/api/v1/bookings/{booking_id}")),
        actix_test::TestRequest::get().uri(&format!("/api/v1/bookings/{booking_id}/history")),
        actix_test::TestRequest::post().uri(&format!("/api/v1/bookings/{booking_id}/cancel")),
    ] {
        let res =
            actix_test::call_service(&app, request.cookie(intruder.clone()).to_request()).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}

#[rstest]
#[actix_web::test]
async fn admin_reads_history_in_order(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let owner_cookie = login(&app, &harness.farmer).await;
    let (_, created) = create(&app, &owner_cookie, booking_payload(harness.facility_id, 5)).await;
    let booking_id = created["bookingId"].as_str().expect("id").to_owned();
    let cancel = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/bookings/{booking_id}/cancel"))
            .cookie(owner_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(cancel.status(), StatusCode::OK);

    let admin_cookie = login(&app, &harness.admin).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/bookings/{booking_id}/history"))
            .cookie(admin_cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let entries: Vec<Value> = actix_test::read_body_json(res).await;
    let actions: Vec<&str> = entries
        .iter()
        .filter_map(|entry| entry["action"].as_str())
        .collect();
    assert_eq!(actions, ["CREATED", "STATUS_CHANGED"]);
    assert_eq!(entries[1]["oldStatus"], json!("CONFIRMED"));
    assert_eq!(entries[1]["newStatus"], json!("CANCELLED"));
}

#[rstest]
#[actix_web::test]
async fn listing_other_farmers_requires_admin(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let owner_cookie = login(&app, &harness.farmer).await;
    create(&app, &owner_cookie, booking_payload(harness.facility_id, 5)).await;
    let owner_farmer = harness.farmer.farmer_id.expect("farmer profile");
    let uri = format!("/api/v1/bookings?farmerId={owner_farmer}");

    let intruder = login(&app, &harness.other_farmer).await;
    let denied = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&uri)
            .cookie(intruder)
            .to_request(),
    )
    .await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let admin_cookie = login(&app, &harness.admin).await;
    let allowed = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&uri)
            .cookie(admin_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(allowed.status(), StatusCode::OK);
    let bookings: Vec<Value> = actix_test::read_body_json(allowed).await;
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["totalPrice"], json!("75.00"));
}

#[rstest]
#[actix_web::test]
async fn own_listing_defaults_to_session_farmer(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login(&app, &harness.farmer).await;
    create(&app, &cookie, booking_payload(harness.facility_id, 5)).await;
    create(&app, &cookie, booking_payload(harness.facility_id, 7)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/bookings")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let bookings: Vec<Value> = actix_test::read_body_json(res).await;
    assert_eq!(bookings.len(), 2);
}

#[rstest]
#[actix_web::test]
async fn unknown_booking_is_not_found(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = login(&app, &harness.admin).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/bookings/{}", BookingId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

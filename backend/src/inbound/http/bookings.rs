//! Booking HTTP handlers.
//!
//! ```text
//! POST /api/v1/bookings/check
//! POST /api/v1/bookings
//! GET  /api/v1/bookings?farmerId=
//! GET  /api/v1/bookings/{id}
//! GET  /api/v1/bookings/{id}/history
//! POST /api/v1/bookings/{id}/cancel
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    AvailabilityReport, CancelBookingRequest, CancelBookingResponse, CheckAvailabilityRequest,
    CreateBookingRequest, CreateBookingResponse,
};
use crate::domain::{
    Actor, Booking, BookingDraft, BookingHistoryEntry, BookingId, BookingStatus, Error, FacilityId,
    FarmerId, HistoryAction,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::{ensure_may_act_for, require_actor, require_farmer};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_id, parse_iso_date, parse_optional_iso_date,
};

/// Availability check payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityBody {
    #[schema(format = "uuid")]
    pub facility_id: String,
    pub quantity: i32,
}

/// Availability check answer. Advisory: a later booking may still conflict.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityBody {
    pub available: bool,
    pub current_available: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<AvailabilityReport> for AvailabilityBody {
    fn from(value: AvailabilityReport) -> Self {
        Self {
            available: value.available,
            current_available: value.current_available,
            message: value.message,
        }
    }
}

/// Booking creation payload. The farmer comes from the session.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingBody {
    #[schema(format = "uuid")]
    pub facility_id: String,
    #[schema(example = "Turmeric")]
    pub crop_type: String,
    pub quantity: i32,
    #[schema(format = "date", example = "2026-03-02")]
    pub start_date: String,
    #[schema(format = "date")]
    pub end_date: Option<String>,
    pub notes: Option<String>,
}

/// Booking creation answer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBookingBody {
    #[schema(format = "uuid")]
    pub booking_id: String,
    pub status: BookingStatus,
    pub available_after_booking: i32,
}

impl From<CreateBookingResponse> for CreatedBookingBody {
    fn from(value: CreateBookingResponse) -> Self {
        Self {
            booking_id: value.booking.id.to_string(),
            status: value.booking.status,
            available_after_booking: value.available_after_booking,
        }
    }
}

/// Booking representation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub farmer_id: String,
    #[schema(format = "uuid")]
    pub facility_id: String,
    pub crop_type: String,
    pub quantity: i32,
    pub status: BookingStatus,
    pub price_per_sack: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingBody {
    fn from(value: Booking) -> Self {
        Self {
            id: value.id.to_string(),
            farmer_id: value.farmer_id.to_string(),
            facility_id: value.facility_id.to_string(),
            crop_type: value.crop_type,
            quantity: value.quantity,
            status: value.status,
            price_per_sack: value.price_per_sack,
            total_price: value.total_price,
            start_date: value.start_date,
            end_date: value.end_date,
            notes: value.notes,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Cancellation answer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelledBookingBody {
    pub booking: BookingBody,
    /// Facility sacks free after the release; absent when nothing was held.
    pub available_after_release: Option<i32>,
}

impl From<CancelBookingResponse> for CancelledBookingBody {
    fn from(value: CancelBookingResponse) -> Self {
        Self {
            booking: value.booking.into(),
            available_after_release: value.available_after_release,
        }
    }
}

/// Audit entry representation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub action: HistoryAction,
    pub old_status: Option<BookingStatus>,
    pub new_status: Option<BookingStatus>,
    #[schema(value_type = Option<Object>)]
    pub changed_fields: Option<serde_json::Value>,
    pub changed_at: DateTime<Utc>,
    #[schema(format = "uuid")]
    pub changed_by: Option<String>,
}

impl From<BookingHistoryEntry> for HistoryEntryBody {
    fn from(value: BookingHistoryEntry) -> Self {
        Self {
            id: value.id.to_string(),
            action: value.action,
            old_status: value.old_status,
            new_status: value.new_status,
            changed_fields: value
                .changed_fields
                .map(|fields| serde_json::Value::Object(fields.into_iter().collect())),
            changed_at: value.changed_at,
            changed_by: value.changed_by.map(|id| id.to_string()),
        }
    }
}

/// Query string for listing bookings.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListBookingsQuery {
    /// Farmer whose bookings to list; defaults to the caller. Admin only
    /// when it names another farmer.
    pub farmer_id: Option<String>,
}

fn booking_id_from_path(raw: &str) -> Result<BookingId, Error> {
    parse_id(raw, FieldName::new("bookingId"))
}

async fn owned_booking(
    state: &HttpState,
    session: &SessionContext,
    raw_id: &str,
) -> Result<(Actor, Booking), Error> {
    let booking_id = booking_id_from_path(raw_id)?;
    let actor = require_actor(state, session).await?;
    let booking = state.bookings_query.get_booking(&booking_id).await?;
    ensure_may_act_for(&actor, booking.farmer_id)?;
    Ok((actor, booking))
}

/// Advisory capacity check.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/check",
    request_body = CheckAvailabilityBody,
    responses(
        (status = 200, description = "Availability report", body = AvailabilityBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Facility not found", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "checkAvailability",
    security([])
)]
#[post("/bookings/check")]
pub async fn check_availability(
    state: web::Data<HttpState>,
    payload: web::Json<CheckAvailabilityBody>,
) -> ApiResult<web::Json<AvailabilityBody>> {
    let body = payload.into_inner();
    let facility_id: FacilityId = parse_id(&body.facility_id, FieldName::new("facilityId"))?;
    let report = state
        .bookings_query
        .check_availability(CheckAvailabilityRequest {
            facility_id,
            quantity: body.quantity,
        })
        .await?;
    Ok(web::Json(report.into()))
}

/// Book storage for the session's farmer.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = CreateBookingBody,
    responses(
        (status = 201, description = "Booking confirmed", body = CreatedBookingBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "No farmer profile", body = ErrorSchema),
        (status = 404, description = "Facility not found", body = ErrorSchema),
        (status = 409, description = "Capacity exceeded or facility inactive", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "createBooking",
    security(("SessionCookie" = []))
)]
#[post("/bookings")]
pub async fn create_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateBookingBody>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&state, &session).await?;
    let farmer_id = require_farmer(&actor)?;
    let body = payload.into_inner();
    let draft = BookingDraft {
        farmer_id,
        facility_id: parse_id(&body.facility_id, FieldName::new("facilityId"))?,
        crop_type: body.crop_type,
        quantity: body.quantity,
        start_date: parse_iso_date(&body.start_date, FieldName::new("startDate"))?,
        end_date: parse_optional_iso_date(body.end_date.as_deref(), FieldName::new("endDate"))?,
        notes: body.notes,
    };

    let response = state
        .bookings
        .create_booking(CreateBookingRequest {
            draft,
            actor: Some(actor.user_id),
        })
        .await?;

    Ok(HttpResponse::Created().json(CreatedBookingBody::from(response)))
}

/// List bookings for a farmer.
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    params(ListBookingsQuery),
    responses(
        (status = 200, description = "Bookings, newest first", body = [BookingBody]),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "listBookings",
    security(("SessionCookie" = []))
)]
#[get("/bookings")]
pub async fn list_bookings(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListBookingsQuery>,
) -> ApiResult<web::Json<Vec<BookingBody>>> {
    let actor = require_actor(&state, &session).await?;
    let farmer_id: FarmerId = match query.into_inner().farmer_id {
        Some(raw) => {
            let farmer_id = parse_id(&raw, FieldName::new("farmerId"))?;
            ensure_may_act_for(&actor, farmer_id)?;
            farmer_id
        }
        None => require_farmer(&actor)?,
    };
    let bookings = state
        .bookings_query
        .list_bookings_for_farmer(&farmer_id)
        .await?;
    Ok(web::Json(bookings.into_iter().map(BookingBody::from).collect()))
}

/// Fetch one booking.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    params(("id" = String, Path, description = "Booking identifier")),
    responses(
        (status = 200, description = "Booking", body = BookingBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Booking not found", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "getBooking",
    security(("SessionCookie" = []))
)]
#[get("/bookings/{id}")]
pub async fn get_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookingBody>> {
    let (_, booking) = owned_booking(&state, &session, &path).await?;
    Ok(web::Json(booking.into()))
}

/// Audit trail of one booking, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}/history",
    params(("id" = String, Path, description = "Booking identifier")),
    responses(
        (status = 200, description = "History entries", body = [HistoryEntryBody]),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Booking not found", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "getBookingHistory",
    security(("SessionCookie" = []))
)]
#[get("/bookings/{id}/history")]
pub async fn booking_history(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<HistoryEntryBody>>> {
    let (_, booking) = owned_booking(&state, &session, &path).await?;
    let entries = state.bookings_query.booking_history(&booking.id).await?;
    Ok(web::Json(
        entries.into_iter().map(HistoryEntryBody::from).collect(),
    ))
}

/// Cancel a booking, releasing its sacks when it was confirmed.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/cancel",
    params(("id" = String, Path, description = "Booking identifier")),
    responses(
        (status = 200, description = "Booking cancelled", body = CancelledBookingBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Booking not found", body = ErrorSchema),
        (status = 409, description = "Booking already cancelled", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "cancelBooking",
    security(("SessionCookie" = []))
)]
#[post("/bookings/{id}/cancel")]
pub async fn cancel_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CancelledBookingBody>> {
    let (actor, booking) = owned_booking(&state, &session, &path).await?;
    let response = state
        .bookings
        .cancel_booking(CancelBookingRequest {
            booking_id: booking.id,
            actor: Some(actor.user_id),
        })
        .await?;
    Ok(web::Json(response.into()))
}

#[cfg(test)]
#[path = "bookings_tests.rs"]
mod tests;

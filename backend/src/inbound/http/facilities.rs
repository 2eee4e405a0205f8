//! Facility capacity HTTP handler.
//!
//! ```text
//! GET /api/v1/facilities/{id}/capacity
//! ```

use actix_web::{get, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::FacilityId;
use crate::domain::ports::FacilityCapacityView;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Facility capacity and price.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacilityCapacityBody {
    #[schema(format = "uuid")]
    pub facility_id: String,
    pub name: String,
    pub total_capacity: i32,
    pub available_capacity: i32,
    pub price_per_sack: Option<Decimal>,
    pub active: bool,
}

impl From<FacilityCapacityView> for FacilityCapacityBody {
    fn from(value: FacilityCapacityView) -> Self {
        Self {
            facility_id: value.facility_id.to_string(),
            name: value.name,
            total_capacity: value.total,
            available_capacity: value.available,
            price_per_sack: value.price_per_sack,
            active: value.active,
        }
    }
}

/// Current capacity of a facility.
#[utoipa::path(
    get,
    path = "/api/v1/facilities/{id}/capacity",
    params(("id" = String, Path, description = "Facility identifier")),
    responses(
        (status = 200, description = "Capacity snapshot", body = FacilityCapacityBody),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 404, description = "Facility not found", body = ErrorSchema)
    ),
    tags = ["facilities"],
    operation_id = "getFacilityCapacity",
    security([])
)]
#[get("/facilities/{id}/capacity")]
pub async fn facility_capacity(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<FacilityCapacityBody>> {
    let facility_id: FacilityId = parse_id(&path, FieldName::new("facilityId"))?;
    let view = state.bookings_query.facility_capacity(&facility_id).await?;
    Ok(web::Json(view.into()))
}

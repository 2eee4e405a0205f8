//! OpenAPI document for the booking API.
//!
//! Served by Swagger UI at `/docs` in debug builds and printed by the
//! `openapi-dump` binary for client generation.

use crate::inbound::http::bookings::{
    AvailabilityBody, BookingBody, CancelledBookingBody, CheckAvailabilityBody, CreateBookingBody,
    CreatedBookingBody, HistoryEntryBody,
};
use crate::inbound::http::facilities::FacilityCapacityBody;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Signed session cookie carrying the authenticated user id. \
                 Issued by the identity service in front of this API.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Storage booking API",
        description = "Capacity-checked booking of cold-storage sacks with an audit trail.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::bookings::check_availability,
        crate::inbound::http::bookings::create_booking,
        crate::inbound::http::bookings::list_bookings,
        crate::inbound::http::bookings::get_booking,
        crate::inbound::http::bookings::booking_history,
        crate::inbound::http::bookings::cancel_booking,
        crate::inbound::http::facilities::facility_capacity,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CheckAvailabilityBody,
        AvailabilityBody,
        CreateBookingBody,
        CreatedBookingBody,
        BookingBody,
        CancelledBookingBody,
        HistoryEntryBody,
        FacilityCapacityBody,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "bookings", description = "Create, inspect, and cancel storage bookings"),
        (name = "facilities", description = "Facility capacity"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn object_fields(schema: &RefOr<Schema>) -> Vec<String> {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_uses_wire_field_names() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let fields = object_fields(schemas.get(ERROR_SCHEMA_NAME).expect("Error schema"));

        for field in ["code", "message", "traceId", "details"] {
            assert!(fields.iter().any(|f| f == field), "missing {field}");
        }
    }

    #[rstest]
    #[case("/api/v1/bookings")]
    #[case("/api/v1/bookings/check")]
    #[case("/api/v1/bookings/{id}")]
    #[case("/api/v1/bookings/{id}/history")]
    #[case("/api/v1/bookings/{id}/cancel")]
    #[case("/api/v1/facilities/{id}/capacity")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}

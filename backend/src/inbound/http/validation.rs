//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies carry identifiers and dates as strings so malformed values
//! produce a field-specific `400` rather than a generic deserialisation
//! failure.

use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidDate,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

/// Parse a typed identifier, reporting the offending field on failure.
pub(crate) fn parse_id<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    value.trim().parse().map_err(|_| {
        field_error(
            field,
            ErrorCode::InvalidUuid,
            format!("{} must be a valid UUID", field.as_str()),
            value,
        )
    })
}

/// Parse an ISO-8601 calendar date (`YYYY-MM-DD`).
pub(crate) fn parse_iso_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        field_error(
            field,
            ErrorCode::InvalidDate,
            format!("{} must be an ISO-8601 date", field.as_str()),
            value,
        )
    })
}

pub(crate) fn parse_optional_iso_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value.map(|raw| parse_iso_date(raw, field)).transpose()
}

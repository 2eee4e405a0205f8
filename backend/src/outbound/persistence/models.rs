//! Diesel row types for the booking tables.
//!
//! Rows are internal to the persistence adapter; conversions into domain
//! types validate closed enums and the capacity invariant so a corrupted
//! row surfaces as a query error rather than a panic.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{bookings, bookings_history, facilities};
use crate::domain::{
    Booking, BookingHistoryEntry, BookingStatus, ChangedFields, Facility, FacilityCapacity,
    HistoryAction,
};

/// Facility row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = facilities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FacilityRow {
    pub id: Uuid,
    pub name: String,
    pub total_capacity_sacks: i32,
    pub available_capacity_sacks: i32,
    pub price_per_sack: Option<Decimal>,
    pub is_active: bool,
}

impl TryFrom<FacilityRow> for Facility {
    type Error = String;

    fn try_from(row: FacilityRow) -> Result<Self, Self::Error> {
        let capacity =
            FacilityCapacity::new(row.total_capacity_sacks, row.available_capacity_sacks)
                .map_err(|err| format!("facility {}: {err}", row.id))?;
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            capacity,
            price_per_sack: row.price_per_sack,
            active: row.is_active,
        })
    }
}

/// Booking row, also used for inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub facility_id: Uuid,
    pub crop_type: String,
    pub quantity_sacks: i32,
    pub status: String,
    pub price_per_sack: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
}

impl From<&Booking> for BookingRow {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id.into(),
            farmer_id: booking.farmer_id.into(),
            facility_id: booking.facility_id.into(),
            crop_type: booking.crop_type.clone(),
            quantity_sacks: booking.quantity,
            status: booking.status.as_str().to_owned(),
            price_per_sack: booking.price_per_sack,
            total_price: booking.total_price,
            start_date: booking.start_date,
            end_date: booking.end_date,
            notes: booking.notes.clone(),
            created_at: booking.created_at,
            updated_at: booking.updated_at,
            created_by: booking.created_by.map(Uuid::from),
            updated_by: booking.updated_by.map(Uuid::from),
        }
    }
}

impl TryFrom<BookingRow> for Booking {
    type Error = String;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<BookingStatus>()
            .map_err(|err| format!("booking {}: {err}", row.id))?;
        Ok(Self {
            id: row.id.into(),
            farmer_id: row.farmer_id.into(),
            facility_id: row.facility_id.into(),
            crop_type: row.crop_type,
            quantity: row.quantity_sacks,
            status,
            price_per_sack: row.price_per_sack,
            total_price: row.total_price,
            start_date: row.start_date,
            end_date: row.end_date,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            created_by: row.created_by.map(Into::into),
            updated_by: row.updated_by.map(Into::into),
        })
    }
}

/// Changeset written when a booking transitions.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = bookings)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct BookingStatusUpdate<'a> {
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

/// History row, also used for inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = bookings_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HistoryRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub action: String,
    pub old_status: Option<String>,
    pub new_status: Option<String>,
    pub changed_fields: Option<serde_json::Value>,
    pub changed_at: DateTime<Utc>,
    pub changed_by: Option<Uuid>,
}

impl TryFrom<&BookingHistoryEntry> for HistoryRow {
    type Error = String;

    fn try_from(entry: &BookingHistoryEntry) -> Result<Self, Self::Error> {
        let changed_fields = entry
            .changed_fields
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|err| format!("serialise changed fields: {err}"))?;
        Ok(Self {
            id: entry.id.into(),
            booking_id: entry.booking_id.into(),
            action: entry.action.as_str().to_owned(),
            old_status: entry.old_status.map(|s| s.as_str().to_owned()),
            new_status: entry.new_status.map(|s| s.as_str().to_owned()),
            changed_fields,
            changed_at: entry.changed_at,
            changed_by: entry.changed_by.map(Uuid::from),
        })
    }
}

fn parse_status(raw: Option<String>) -> Result<Option<BookingStatus>, String> {
    raw.map(|value| value.parse::<BookingStatus>().map_err(|err| err.to_string()))
        .transpose()
}

impl TryFrom<HistoryRow> for BookingHistoryEntry {
    type Error = String;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let action = row
            .action
            .parse::<HistoryAction>()
            .map_err(|err| format!("history entry {}: {err}", row.id))?;
        let changed_fields = row
            .changed_fields
            .map(serde_json::from_value::<ChangedFields>)
            .transpose()
            .map_err(|err| format!("history entry {}: changed fields: {err}", row.id))?;
        Ok(Self {
            id: row.id.into(),
            booking_id: row.booking_id.into(),
            action,
            old_status: parse_status(row.old_status)?,
            new_status: parse_status(row.new_status)?,
            changed_fields,
            changed_at: row.changed_at,
            changed_by: row.changed_by.map(Into::into),
        })
    }
}

/// Actor lookup projection over `users` left-joined to `farmers`.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct ActorRow {
    pub user_id: Uuid,
    pub role: String,
    pub farmer_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingId, UserId};
    use chrono::TimeZone;
    use rstest::rstest;

    fn booking_row(status: &str) -> BookingRow {
        let at = Utc
            .with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp");
        BookingRow {
            id: Uuid::new_v4(),
            farmer_id: Uuid::new_v4(),
            facility_id: Uuid::new_v4(),
            crop_type: "Maize".to_owned(),
            quantity_sacks: 12,
            status: status.to_owned(),
            price_per_sack: Some(Decimal::new(1000, 2)),
            total_price: Some(Decimal::new(12000, 2)),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 3).expect("date"),
            end_date: None,
            notes: None,
            created_at: at,
            updated_at: at,
            created_by: None,
            updated_by: None,
        }
    }

    #[rstest]
    fn booking_row_maps_to_domain() {
        let row = booking_row("CONFIRMED");
        let booking = Booking::try_from(row.clone()).expect("valid row");
        assert_eq!(booking.status, BookingStatus::Confirmed);
        let back = BookingRow::from(&booking);
        assert_eq!(back.status, row.status);
        assert_eq!(back.total_price, row.total_price);
    }

    #[rstest]
    fn unknown_status_is_rejected() {
        let err = Booking::try_from(booking_row("ON_HOLD")).expect_err("invalid status");
        assert!(err.contains("ON_HOLD"));
    }

    #[rstest]
    fn facility_row_enforces_capacity_invariant() {
        let row = FacilityRow {
            id: Uuid::new_v4(),
            name: "Broken".to_owned(),
            total_capacity_sacks: 10,
            available_capacity_sacks: 11,
            price_per_sack: None,
            is_active: true,
        };
        assert!(Facility::try_from(row).is_err());
    }

    #[rstest]
    fn history_entry_keeps_changed_fields() {
        let entry = BookingHistoryEntry::status_changed(
            BookingId::random(),
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            Utc::now(),
            Some(UserId::random()),
        );
        let row = HistoryRow::try_from(&entry).expect("serialise");
        assert_eq!(row.action, "STATUS_CHANGED");
        assert_eq!(BookingHistoryEntry::try_from(row).expect("decode"), entry);
    }
}

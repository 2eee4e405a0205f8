//! Append-only booking audit entries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::BookingStatus;
use crate::domain::closed_enum::closed_enum;
use crate::domain::{BookingId, HistoryEntryId, UserId};

closed_enum! {
    /// Kind of change recorded in the audit log.
    pub enum HistoryAction("history action") {
        /// Booking was created.
        Created => "CREATED",
        /// Booking fields were edited. No operation here writes it; it is
        /// accepted so rows written by other tools still load.
        Updated => "UPDATED",
        /// Booking moved between statuses.
        StatusChanged => "STATUS_CHANGED",
        /// Booking was cancelled outside the normal status flow. Cancels made
        /// here record `STATUS_CHANGED`; this tag is only read back from
        /// stored rows.
        Cancelled => "CANCELLED",
    }
}

/// Structured before/after values keyed by field name, stored as JSONB.
pub type ChangedFields = BTreeMap<String, Value>;

/// One audit log row.
///
/// Ordering within a booking is by `changed_at`, ties broken by `id`
/// (a UUIDv7, so insertion order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingHistoryEntry {
    /// Entry identifier.
    pub id: HistoryEntryId,
    /// Booking the entry belongs to.
    pub booking_id: BookingId,
    /// What happened.
    pub action: HistoryAction,
    /// Status before the change, absent on creation.
    pub old_status: Option<BookingStatus>,
    /// Status after the change.
    pub new_status: Option<BookingStatus>,
    /// Field-level changes, if any were recorded.
    pub changed_fields: Option<ChangedFields>,
    /// When the change happened.
    pub changed_at: DateTime<Utc>,
    /// Who made the change.
    pub changed_by: Option<UserId>,
}

impl BookingHistoryEntry {
    /// Entry for a newly created booking.
    #[must_use]
    pub fn created(
        booking_id: BookingId,
        status: BookingStatus,
        changed_at: DateTime<Utc>,
        changed_by: Option<UserId>,
    ) -> Self {
        Self {
            id: HistoryEntryId::now_v7(),
            booking_id,
            action: HistoryAction::Created,
            old_status: None,
            new_status: Some(status),
            changed_fields: None,
            changed_at,
            changed_by,
        }
    }

    /// Entry for a status transition, recording the status diff.
    #[must_use]
    pub fn status_changed(
        booking_id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
        changed_at: DateTime<Utc>,
        changed_by: Option<UserId>,
    ) -> Self {
        let mut fields = ChangedFields::new();
        fields.insert(
            "status".to_owned(),
            serde_json::json!({ "from": from.as_str(), "to": to.as_str() }),
        );
        Self {
            id: HistoryEntryId::now_v7(),
            booking_id,
            action: HistoryAction::StatusChanged,
            old_status: Some(from),
            new_status: Some(to),
            changed_fields: Some(fields),
            changed_at,
            changed_by,
        }
    }
}

/// Sort entries into audit order.
pub fn sort_history(entries: &mut [BookingHistoryEntry]) {
    entries.sort_by(|a, b| a.changed_at.cmp(&b.changed_at).then(a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_767_225_600 + seconds, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    fn created_entry_has_no_old_status() {
        let entry =
            BookingHistoryEntry::created(BookingId::random(), BookingStatus::Confirmed, at(0), None);
        assert_eq!(entry.action, HistoryAction::Created);
        assert_eq!(entry.old_status, None);
        assert_eq!(entry.new_status, Some(BookingStatus::Confirmed));
        assert!(entry.changed_fields.is_none());
    }

    #[rstest]
    fn status_change_records_diff() {
        let entry = BookingHistoryEntry::status_changed(
            BookingId::random(),
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            at(0),
            Some(UserId::random()),
        );
        let fields = entry.changed_fields.expect("fields");
        assert_eq!(
            fields.get("status"),
            Some(&serde_json::json!({ "from": "CONFIRMED", "to": "CANCELLED" }))
        );
    }

    #[rstest]
    #[case("UPDATED", HistoryAction::Updated)]
    #[case("CANCELLED", HistoryAction::Cancelled)]
    fn stored_only_actions_still_parse(#[case] wire: &str, #[case] expected: HistoryAction) {
        assert_eq!(wire.parse::<HistoryAction>(), Ok(expected));
        assert_eq!(expected.as_str(), wire);
    }

    #[rstest]
    fn sort_orders_by_time_then_id() {
        let booking_id = BookingId::random();
        let later = BookingHistoryEntry::created(booking_id, BookingStatus::Confirmed, at(5), None);
        let first_tie =
            BookingHistoryEntry::created(booking_id, BookingStatus::Confirmed, at(1), None);
        let second_tie =
            BookingHistoryEntry::created(booking_id, BookingStatus::Confirmed, at(1), None);
        let mut entries = vec![later.clone(), second_tie.clone(), first_tie.clone()];

        sort_history(&mut entries);

        assert_eq!(entries, vec![first_tie, second_tie, later]);
    }
}

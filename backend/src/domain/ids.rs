//! Strongly typed identifiers for booking aggregates.
//!
//! Each identifier wraps a UUID so a facility id cannot be passed where a
//! booking id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raised when an identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a valid UUID")]
pub struct IdParseError {
    kind: &'static str,
}

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| IdParseError { kind: $kind })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_identifier!(
    /// Storage facility identifier.
    FacilityId,
    "facility id"
);
uuid_identifier!(
    /// Booking identifier.
    BookingId,
    "booking id"
);
uuid_identifier!(
    /// Farmer profile identifier.
    FarmerId,
    "farmer id"
);
uuid_identifier!(
    /// Authenticated user identifier.
    UserId,
    "user id"
);

uuid_identifier!(
    /// Booking history entry identifier. Generated as UUIDv7 so ordering by
    /// id follows insertion time.
    HistoryEntryId,
    "history entry id"
);

impl HistoryEntryId {
    /// Generate a time-ordered identifier.
    #[must_use]
    pub fn now_v7() -> Self {
        Self(Uuid::now_v7())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_and_displays_round_trip() {
        let raw = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let id: FacilityId = raw.parse().expect("valid uuid");
        assert_eq!(id.to_string(), raw);
    }

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    fn rejects_malformed_input(#[case] raw: &str) {
        let err = raw.parse::<BookingId>().expect_err("malformed");
        assert_eq!(err.to_string(), "booking id must be a valid UUID");
    }

    #[rstest]
    fn history_ids_sort_by_creation() {
        let first = HistoryEntryId::now_v7();
        let second = HistoryEntryId::now_v7();
        assert!(first < second);
    }
}

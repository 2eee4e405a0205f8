//! Helper macro for closed enumerations with a fixed wire spelling.
//!
//! Status, history action, and role values are stored as upper-case text.
//! Parsing rejects anything outside the declared set.

use std::fmt;

/// Raised when text does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseClosedEnumError {
    /// Enumeration name, for messages.
    pub kind: &'static str,
    /// Rejected input.
    pub input: String,
    /// Accepted spellings.
    pub expected: &'static [&'static str],
}

impl fmt::Display for ParseClosedEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} '{}'; expected one of: {}",
            self.kind,
            self.input,
            self.expected.join(", ")
        )
    }
}

impl std::error::Error for ParseClosedEnumError {}

macro_rules! closed_enum {
    (
        $(#[$outer:meta])*
        pub enum $name:ident ($kind:literal) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::utoipa::ToSchema,
        )]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            const WIRE: &'static [&'static str] = &[$($wire),+];

            /// Stored and serialised spelling.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::closed_enum::ParseClosedEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err($crate::domain::closed_enum::ParseClosedEnumError {
                        kind: $kind,
                        input: other.to_owned(),
                        expected: Self::WIRE,
                    }),
                }
            }
        }
    };
}

pub(crate) use closed_enum;

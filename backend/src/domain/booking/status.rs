//! Booking lifecycle status.

use crate::domain::closed_enum::closed_enum;

closed_enum! {
    /// Lifecycle position of a booking.
    ///
    /// Bookings are written directly as `Confirmed` once capacity has been
    /// reserved. `Completed` exists for stored data but nothing transitions
    /// into it.
    ///
    /// ```
    /// use storage_booking::domain::BookingStatus;
    ///
    /// assert_eq!("CONFIRMED".parse::<BookingStatus>(), Ok(BookingStatus::Confirmed));
    /// assert!("confirmed".parse::<BookingStatus>().is_err());
    /// ```
    pub enum BookingStatus("booking status") {
        /// Awaiting confirmation.
        Pending => "PENDING",
        /// Capacity is held for this booking.
        Confirmed => "CONFIRMED",
        /// Cancelled; any held capacity has been released.
        Cancelled => "CANCELLED",
        /// Storage period finished.
        Completed => "COMPLETED",
    }
}

impl BookingStatus {
    /// Whether a booking in this status currently holds facility capacity.
    #[must_use]
    pub const fn holds_capacity(self) -> bool {
        matches!(self, Self::Confirmed)
    }

    /// Whether a cancel request is legal from this status.
    #[must_use]
    pub const fn can_cancel(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn wire_spellings_round_trip() {
        for status in BookingStatus::ALL {
            assert_eq!(status.as_str().parse::<BookingStatus>(), Ok(*status));
        }
    }

    #[rstest]
    fn unknown_values_are_rejected() {
        let err = "ARCHIVED".parse::<BookingStatus>().expect_err("unknown");
        assert_eq!(
            err.to_string(),
            "invalid booking status 'ARCHIVED'; expected one of: PENDING, CONFIRMED, CANCELLED, COMPLETED"
        );
    }

    #[rstest]
    #[case(BookingStatus::Pending, false, true)]
    #[case(BookingStatus::Confirmed, true, true)]
    #[case(BookingStatus::Cancelled, false, false)]
    #[case(BookingStatus::Completed, false, true)]
    fn transition_flags(
        #[case] status: BookingStatus,
        #[case] holds: bool,
        #[case] cancellable: bool,
    ) {
        assert_eq!(status.holds_capacity(), holds);
        assert_eq!(status.can_cancel(), cancellable);
    }

    #[rstest]
    fn serialises_upper_case() {
        let value = serde_json::to_value(BookingStatus::Cancelled).expect("serialise");
        assert_eq!(value, serde_json::json!("CANCELLED"));
    }
}

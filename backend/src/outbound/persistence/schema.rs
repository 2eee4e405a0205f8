//! Diesel table definitions for the booking schema.
//!
//! These must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts allowed to act on bookings.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        /// `FARMER`, `ADMIN`, or `AGRI_DEPT`.
        role -> Varchar,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Farmer profiles linked one-to-one with user accounts.
    farmers (id) {
        id -> Uuid,
        user_id -> Uuid,
        full_name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Storage facilities and their sack counts.
    ///
    /// A check constraint keeps `available_capacity_sacks` within
    /// `0..=total_capacity_sacks`.
    facilities (id) {
        id -> Uuid,
        name -> Varchar,
        total_capacity_sacks -> Int4,
        available_capacity_sacks -> Int4,
        price_per_sack -> Nullable<Numeric>,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bookings of facility capacity.
    bookings (id) {
        id -> Uuid,
        farmer_id -> Uuid,
        facility_id -> Uuid,
        crop_type -> Varchar,
        quantity_sacks -> Int4,
        status -> Varchar,
        price_per_sack -> Nullable<Numeric>,
        total_price -> Nullable<Numeric>,
        start_date -> Date,
        end_date -> Nullable<Date>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        created_by -> Nullable<Uuid>,
        updated_by -> Nullable<Uuid>,
    }
}

diesel::table! {
    /// Append-only audit log of booking transitions.
    bookings_history (id) {
        id -> Uuid,
        booking_id -> Uuid,
        action -> Varchar,
        old_status -> Nullable<Varchar>,
        new_status -> Nullable<Varchar>,
        changed_fields -> Nullable<Jsonb>,
        changed_at -> Timestamptz,
        changed_by -> Nullable<Uuid>,
    }
}

diesel::joinable!(farmers -> users (user_id));
diesel::joinable!(bookings -> farmers (farmer_id));
diesel::joinable!(bookings -> facilities (facility_id));
diesel::joinable!(bookings_history -> bookings (booking_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    farmers,
    facilities,
    bookings,
    bookings_history,
);

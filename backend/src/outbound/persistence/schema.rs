//! Diesel table definitions.
//!
//! Must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Identities mirrored from the auth integration.
    users (id) {
        id -> Text,
        email -> Nullable<Text>,
        first_name -> Nullable<Text>,
        last_name -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    habits (id) {
        id -> Int4,
        user_id -> Text,
        name -> Text,
        description -> Nullable<Text>,
        /// `#RGB` or `#RRGGBB`.
        color -> Text,
        /// Always positive (CHECK constraint).
        target_days -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per `(habit_id, date)`; see `habit_logs_habit_id_date_key`.
    habit_logs (id) {
        id -> Int4,
        habit_id -> Int4,
        date -> Date,
        completed -> Bool,
        notes -> Nullable<Text>,
    }
}

diesel::joinable!(habits -> users (user_id));
diesel::joinable!(habit_logs -> habits (habit_id));

diesel::allow_tables_to_appear_in_same_query!(users, habits, habit_logs);

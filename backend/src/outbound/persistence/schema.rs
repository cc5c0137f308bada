//! Diesel table definitions.
//!
//! Kept in step with `backend/migrations` by hand.

diesel::table! {
    /// Registered accounts. `username` carries a unique index.
    users (id) {
        id -> Int8,
        username -> Text,
        credential -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

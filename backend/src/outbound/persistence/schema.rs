//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate them with `diesel print-schema`
//! or update them by hand.

diesel::table! {
    /// Registered users. `LOWER(name)` carries a unique index.
    users (id) {
        id -> Int8,
        name -> Text,
        email -> Nullable<Text>,
        /// Opaque bearer token, unique across users.
        api_key -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Todo lists, deleted with their owner.
    lists (id) {
        id -> Int8,
        user_id -> Int8,
        name -> Text,
        completed -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Todo items, deleted with their list or owner.
    items (id) {
        id -> Int8,
        /// Copied from the parent list's owner at insert time.
        user_id -> Int8,
        list_id -> Int8,
        name -> Text,
        completed -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Server-side session records keyed by the SHA-256 of their token.
    sessions (token_hash) {
        token_hash -> Text,
        data -> Jsonb,
        deadline -> Timestamptz,
        expiry -> Timestamptz,
    }
}

diesel::joinable!(lists -> users (user_id));
diesel::joinable!(items -> lists (list_id));

diesel::allow_tables_to_appear_in_same_query!(users, lists, items, sessions);

//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Member profiles.
    ///
    /// `email`, `member_code` and `referral_code` each carry a unique
    /// constraint; `sponsor_id` points at the referring profile.
    profiles (id) {
        id -> Uuid,
        /// Lower-cased login email.
        email -> Varchar,
        full_name -> Varchar,
        /// `TPC` followed by six digits.
        member_code -> Varchar,
        /// Eight upper-case alphanumerics.
        referral_code -> Varchar,
        sponsor_id -> Nullable<Uuid>,
        /// `member` or `admin`.
        role -> Varchar,
        /// `en` or `id`.
        language -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Token purchase invoices.
    invoices (id) {
        id -> Uuid,
        /// `TPC-YYYYMMDD-XXXXXX`, unique.
        number -> Varchar,
        member_id -> Uuid,
        /// `USDC` or `IDR`.
        currency -> Varchar,
        amount_input -> Int8,
        tpc_amount -> Int8,
        /// One of `UNPAID`, `PENDING_REVIEW`, `PAID`, `CANCELLED`, `EXPIRED`.
        status -> Varchar,
        proof_url -> Nullable<Text>,
        created_at -> Timestamptz,
        expires_at -> Timestamptz,
        paid_at -> Nullable<Timestamptz>,
        reviewed_by -> Nullable<Uuid>,
    }
}

diesel::table! {
    /// Requests to send TPC to an external wallet.
    withdrawals (id) {
        id -> Uuid,
        member_id -> Uuid,
        tpc_amount -> Int8,
        wallet_address -> Varchar,
        /// One of `PENDING`, `APPROVED`, `REJECTED`.
        status -> Varchar,
        note -> Nullable<Text>,
        created_at -> Timestamptz,
        reviewed_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(invoices -> profiles (member_id));
diesel::joinable!(withdrawals -> profiles (member_id));

diesel::allow_tables_to_appear_in_same_query!(profiles, invoices, withdrawals);

//! PostgreSQL-backed `ProfileRepository` implementation using Diesel ORM.
//!
//! Unique violations on `profiles_email_key` surface as
//! [`ProfileRepositoryError::DuplicateEmail`]; collisions on the member or
//! referral code constraints surface as
//! [`ProfileRepositoryError::DuplicateCode`] so the service can draw again.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::{
    EmailAddress, FullName, Language, MemberCode, MemberId, MemberRole, Profile, ReferralCode,
    ReferralSummary,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation_constraint,
};
use super::models::{NewProfileRow, ProfileRow, ReferralRow};
use super::pool::{DbPool, PoolError};
use super::schema::profiles;

const EMAIL_CONSTRAINT: &str = "profiles_email_key";

/// Diesel-backed implementation of the `ProfileRepository` port.
#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProfileRepositoryError {
    map_basic_pool_error(error, ProfileRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProfileRepositoryError {
    match unique_violation_constraint(&error) {
        Some(EMAIL_CONSTRAINT) => ProfileRepositoryError::duplicate_email(),
        Some(_) => ProfileRepositoryError::duplicate_code(),
        None => map_basic_diesel_error(
            error,
            ProfileRepositoryError::query,
            ProfileRepositoryError::connection,
        ),
    }
}

fn corrupt(column: &str, id: uuid::Uuid, error: impl std::fmt::Display) -> ProfileRepositoryError {
    ProfileRepositoryError::query(format!("profile {id} has invalid {column}: {error}"))
}

/// Convert a database row to a domain profile.
fn row_to_profile(row: ProfileRow) -> Result<Profile, ProfileRepositoryError> {
    let id = row.id;
    Ok(Profile {
        id: MemberId::from_uuid(id),
        email: EmailAddress::new(&row.email).map_err(|err| corrupt("email", id, err))?,
        full_name: FullName::new(&row.full_name).map_err(|err| corrupt("full_name", id, err))?,
        member_code: MemberCode::new(&row.member_code)
            .map_err(|err| corrupt("member_code", id, err))?,
        referral_code: ReferralCode::new(&row.referral_code)
            .map_err(|err| corrupt("referral_code", id, err))?,
        sponsor_id: row.sponsor_id.map(MemberId::from_uuid),
        role: row
            .role
            .parse::<MemberRole>()
            .map_err(|err| corrupt("role", id, err))?,
        language: row
            .language
            .parse::<Language>()
            .map_err(|err| corrupt("language", id, err))?,
        password_hash: row.password_hash,
        created_at: row.created_at,
    })
}

fn row_to_referral(row: ReferralRow) -> ReferralSummary {
    ReferralSummary {
        member_id: MemberId::from_uuid(row.id),
        full_name: row.full_name,
        member_code: row.member_code,
        joined_at: row.created_at,
    }
}

/// Run a single-profile lookup and convert the row.
macro_rules! find_profile {
    ($pool:expr, $filter:expr) => {{
        let mut conn = $pool.get().await.map_err(map_pool_error)?;
        let row: Option<ProfileRow> = profiles::table
            .filter($filter)
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_profile).transpose()
    }};
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn insert(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewProfileRow {
            id: *profile.id.as_uuid(),
            email: profile.email.as_ref(),
            full_name: profile.full_name.as_ref(),
            member_code: profile.member_code.as_ref(),
            referral_code: profile.referral_code.as_ref(),
            sponsor_id: profile.sponsor_id.map(|sponsor| *sponsor.as_uuid()),
            role: profile.role.as_str(),
            language: profile.language.code(),
            password_hash: &profile.password_hash,
            created_at: profile.created_at,
        };
        diesel::insert_into(profiles::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Profile>, ProfileRepositoryError> {
        find_profile!(self.pool, profiles::id.eq(id.as_uuid()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        let email: &str = email.as_ref();
        find_profile!(self.pool, profiles::email.eq(email))
    }

    async fn find_by_referral_code(
        &self,
        code: &ReferralCode,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        let code: &str = code.as_ref();
        find_profile!(self.pool, profiles::referral_code.eq(code))
    }

    async fn list_referrals(
        &self,
        sponsor: &MemberId,
    ) -> Result<Vec<ReferralSummary>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ReferralRow> = profiles::table
            .filter(profiles::sponsor_id.eq(sponsor.as_uuid()))
            .order((profiles::created_at.desc(), profiles::id.desc()))
            .select(ReferralRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_referral).collect())
    }

    async fn count_referrals(&self, sponsor: &MemberId) -> Result<u64, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = profiles::table
            .filter(profiles::sponsor_id.eq(sponsor.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(count)
            .map_err(|_| ProfileRepositoryError::query("referral count was negative"))
    }

    async fn update_language(
        &self,
        id: &MemberId,
        language: Language,
    ) -> Result<bool, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(profiles::table.filter(profiles::id.eq(id.as_uuid())))
            .set(profiles::language.eq(language.code()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage; query behaviour needs a live database.

    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    #[fixture]
    fn row() -> ProfileRow {
        ProfileRow {
            id: Uuid::nil(),
            email: "sari@example.com".to_owned(),
            full_name: "Sari Wulandari".to_owned(),
            member_code: "TPC000042".to_owned(),
            referral_code: "SARI2026".to_owned(),
            sponsor_id: None,
            role: "admin".to_owned(),
            language: "id".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            created_at: Utc
                .with_ymd_and_hms(2026, 1, 5, 8, 0, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    #[rstest]
    fn converts_a_stored_profile(row: ProfileRow) {
        let profile = row_to_profile(row).expect("valid row");
        assert_eq!(profile.role, MemberRole::Admin);
        assert_eq!(profile.language, Language::Id);
        assert_eq!(profile.member_code.as_ref(), "TPC000042");
        assert!(profile.sponsor_id.is_none());
    }

    #[rstest]
    fn unknown_role_is_reported_with_the_column(mut row: ProfileRow) {
        row.role = "owner".to_owned();
        let err = row_to_profile(row).expect_err("unknown role");
        assert!(err.to_string().contains("invalid role"), "{err}");
    }

    #[rstest]
    fn unknown_language_is_reported(mut row: ProfileRow) {
        row.language = "fr".to_owned();
        let err = row_to_profile(row).expect_err("unknown language");
        assert!(matches!(err, ProfileRepositoryError::Query { .. }));
    }
}

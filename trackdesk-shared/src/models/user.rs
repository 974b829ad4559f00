/// User model and database operations
///
/// Users author projects, issues, and comments, and gain access to a
/// project's resources through contributor rows (see `models::contributor`).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username VARCHAR(150) NOT NULL UNIQUE,
///     email VARCHAR(254) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     birthdate DATE NOT NULL,
///     can_be_contacted BOOLEAN NOT NULL DEFAULT TRUE,
///     can_be_shared BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Consent floor
///
/// Users under [`MIN_AGE_YEARS`] cannot opt in to being contacted or having
/// their data shared. The override is an explicit pre-save transformation
/// ([`enforce_consent_floor`]) applied by the caller before `create` and
/// before every `update` that could affect the flags. It is never run
/// implicitly inside the persistence calls. Flags are NOT restored when a
/// birthdate edit moves a user past the threshold; re-opt-in is explicit.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Minimum age (whole years) below which consent flags are forced off and
/// registration is rejected.
pub const MIN_AGE_YEARS: u32 = 15;

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Unique username
    pub username: String,

    /// Unique email address
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Date of birth, required for the age-based consent rules
    pub birthdate: NaiveDate,

    /// Whether the user consents to being contacted
    pub can_be_contacted: bool,

    /// Whether the user consents to their data being shared
    pub can_be_shared: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Unique username
    pub username: String,

    /// Unique email address
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Date of birth
    pub birthdate: NaiveDate,

    /// Consent to being contacted
    pub can_be_contacted: bool,

    /// Consent to data sharing
    pub can_be_shared: bool,
}

/// Input for updating an existing user
///
/// All fields are optional; only non-None fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New email address
    pub email: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,

    /// New date of birth
    pub birthdate: Option<NaiveDate>,

    /// New contact consent value
    pub can_be_contacted: Option<bool>,

    /// New sharing consent value
    pub can_be_shared: Option<bool>,
}

/// Computes age in whole years at `today`
///
/// Returns `None` if `birthdate` is in the future.
pub fn age_in_years(birthdate: NaiveDate, today: NaiveDate) -> Option<u32> {
    today.years_since(birthdate)
}

/// Pre-save consent transformation: forces both consent flags to `false`
/// when the user is under [`MIN_AGE_YEARS`] at `today`
///
/// Returns `true` if the floor was applied. Callers invoke this exactly once
/// per save, before handing the values to the persistence layer.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use trackdesk_shared::models::user::enforce_consent_floor;
///
/// let birthdate = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
/// let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
///
/// let mut contacted = true;
/// let mut shared = true;
/// assert!(enforce_consent_floor(birthdate, today, &mut contacted, &mut shared));
/// assert!(!contacted && !shared);
/// ```
pub fn enforce_consent_floor(
    birthdate: NaiveDate,
    today: NaiveDate,
    can_be_contacted: &mut bool,
    can_be_shared: &mut bool,
) -> bool {
    let under_age = match age_in_years(birthdate, today) {
        Some(age) => age < MIN_AGE_YEARS,
        // Future birthdate: data error, treat as under age
        None => true,
    };

    if under_age {
        *can_be_contacted = false;
        *can_be_shared = false;
    }

    under_age
}

impl User {
    /// Creates a new user
    ///
    /// Consent flags are persisted as given; the caller is responsible for
    /// running [`enforce_consent_floor`] on `data` first.
    ///
    /// # Errors
    ///
    /// Returns an error if the username or email already exists (unique
    /// constraint violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, birthdate,
                               can_be_contacted, can_be_shared)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, email, password_hash, birthdate,
                      can_be_contacted, can_be_shared, created_at, updated_at
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.birthdate)
        .bind(data.can_be_contacted)
        .bind(data.can_be_shared)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, birthdate,
                   can_be_contacted, can_be_shared, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, birthdate,
                   can_be_contacted, can_be_shared, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists all users, most recently created first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, birthdate,
                   can_be_contacted, can_be_shared, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Updates a user, writing only the fields set in `data`
    ///
    /// Returns the updated user, or `None` if no user has this ID. As with
    /// `create`, the caller applies [`enforce_consent_floor`] first.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                birthdate = COALESCE($4, birthdate),
                can_be_contacted = COALESCE($5, can_be_contacted),
                can_be_shared = COALESCE($6, can_be_shared),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, password_hash, birthdate,
                      can_be_contacted, can_be_shared, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.birthdate)
        .bind(data.can_be_contacted)
        .bind(data.can_be_shared)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deletes a user
    ///
    /// Contributor rows, authored projects, issues, and comments are removed
    /// by foreign-key cascade.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_in_years_whole_years() {
        let birthdate = date(2000, 6, 15);
        // Day before the birthday: still 25
        assert_eq!(age_in_years(birthdate, date(2026, 6, 14)), Some(25));
        // On the birthday: 26
        assert_eq!(age_in_years(birthdate, date(2026, 6, 15)), Some(26));
    }

    #[test]
    fn test_age_in_years_future_birthdate() {
        assert_eq!(age_in_years(date(2030, 1, 1), date(2026, 1, 1)), None);
    }

    #[test]
    fn test_consent_floor_under_age() {
        let mut contacted = true;
        let mut shared = true;
        let applied =
            enforce_consent_floor(date(2015, 1, 1), date(2026, 8, 30), &mut contacted, &mut shared);

        assert!(applied);
        assert!(!contacted);
        assert!(!shared);
    }

    #[test]
    fn test_consent_floor_exactly_fifteen() {
        let mut contacted = true;
        let mut shared = true;
        let applied =
            enforce_consent_floor(date(2011, 8, 30), date(2026, 8, 30), &mut contacted, &mut shared);

        assert!(!applied);
        assert!(contacted);
        assert!(shared);
    }

    #[test]
    fn test_consent_floor_leaves_opted_out_flags_alone() {
        // An adult who opted out stays opted out; the floor never re-enables.
        let mut contacted = false;
        let mut shared = true;
        let applied =
            enforce_consent_floor(date(1990, 1, 1), date(2026, 8, 30), &mut contacted, &mut shared);

        assert!(!applied);
        assert!(!contacted);
        assert!(shared);
    }

    #[test]
    fn test_consent_floor_future_birthdate_is_floored() {
        let mut contacted = true;
        let mut shared = true;
        let applied =
            enforce_consent_floor(date(2030, 1, 1), date(2026, 8, 30), &mut contacted, &mut shared);

        assert!(applied);
        assert!(!contacted);
        assert!(!shared);
    }

    // Integration tests for database operations are in tests/
}

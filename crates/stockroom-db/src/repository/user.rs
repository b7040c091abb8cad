//! # User Repository
//!
//! Accounts and credentials. Password hashes never leave this module except
//! through [`UserCredentials`], which only the login path asks for.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{ProfileInput, User};

/// A user row together with its stored password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, date_of_birth, gender,
                   created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user and their password hash by (normalized) email.
    pub async fn get_credentials(&self, email: &str) -> DbResult<Option<UserCredentials>> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT id, first_name, last_name, email, date_of_birth, gender,
                   created_at, updated_at, password_hash
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credentials)
    }

    /// Returns true if the email is registered to someone other than `except_id`.
    pub async fn email_taken(&self, email: &str, except_id: Option<i64>) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(matches!(found, Some(id) if Some(id) != except_id))
    }

    /// Inserts a new user.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - The email is already registered
    pub async fn insert(&self, input: &ProfileInput, password_hash: &str) -> DbResult<User> {
        debug!(email = %input.email, "Inserting user");

        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                first_name, last_name, email, password_hash, date_of_birth, gender,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING id, first_name, last_name, email, date_of_birth, gender,
                      created_at, updated_at
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(password_hash)
        .bind(input.date_of_birth)
        .bind(input.gender)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Replaces a user's profile and password hash.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No user with this id
    /// * `DbError::UniqueViolation` - The new email belongs to another user
    pub async fn update(
        &self,
        id: i64,
        input: &ProfileInput,
        password_hash: &str,
    ) -> DbResult<User> {
        debug!(id, "Updating user");

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET first_name = ?2, last_name = ?3, email = ?4, password_hash = ?5,
                date_of_birth = ?6, gender = ?7, updated_at = ?8
            WHERE id = ?1
            RETURNING id, first_name, last_name, email, date_of_birth, gender,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(password_hash)
        .bind(input.date_of_birth)
        .bind(input.gender)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| DbError::not_found("User", id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::NaiveDate;
    use stockroom_core::Gender;

    fn profile(email: &str) -> ProfileInput {
        ProfileInput {
            first_name: "Budi".to_string(),
            last_name: "Santoso".to_string(),
            email: email.to_string(),
            password: "irrelevant-here".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
            gender: Gender::Male,
        }
    }

    #[tokio::test]
    async fn test_insert_and_credentials() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        let user = repo.insert(&profile("budi@example.com"), "hash-1").await.unwrap();
        assert_eq!(user.gender, Gender::Male);
        assert_eq!(repo.get_by_id(user.id).await.unwrap().unwrap(), user);

        let creds = repo.get_credentials("budi@example.com").await.unwrap().unwrap();
        assert_eq!(creds.user.id, user.id);
        assert_eq!(creds.password_hash, "hash-1");

        assert!(repo.get_credentials("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        let user = repo.insert(&profile("dup@example.com"), "h").await.unwrap();
        assert!(repo.email_taken("dup@example.com", None).await.unwrap());
        assert!(!repo.email_taken("dup@example.com", Some(user.id)).await.unwrap());

        let result = repo.insert(&profile("dup@example.com"), "h").await;
        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_update() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        let user = repo.insert(&profile("old@example.com"), "old").await.unwrap();

        let mut changed = profile("new@example.com");
        changed.gender = Gender::Female;
        let updated = repo.update(user.id, &changed, "new").await.unwrap();
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.gender, Gender::Female);

        let creds = repo.get_credentials("new@example.com").await.unwrap().unwrap();
        assert_eq!(creds.password_hash, "new");

        assert!(matches!(
            repo.update(user.id + 1, &changed, "x").await,
            Err(DbError::NotFound { .. })
        ));
    }
}

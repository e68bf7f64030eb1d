//! Users repository
//!
//! Identity rows, role flags and the single session token slot.

use anyhow::Result;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use super::sqlite_helpers::{bool_to_int, new_id, now_iso8601};

const USER_COLUMNS: &str = "id, email, username, first_name, last_name, password_hash, \
     is_active, is_admin, is_patron, is_author, token, last_login_at, created_at, updated_at";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_patron: bool,
    pub is_author: bool,
    #[serde(skip)]
    pub token: Option<String>,
    pub last_login_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_patron: bool,
    pub is_author: bool,
}

pub struct UsersRepository {
    pool: SqlitePool,
}

impl UsersRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // User CRUD
    // ========================================================================

    /// Create a new active user
    pub async fn create(&self, user: CreateUser) -> Result<UserRecord> {
        let id = new_id();
        let now = now_iso8601();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, username, first_name, last_name, password_hash,
                               is_active, is_admin, is_patron, is_author, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(bool_to_int(user.is_admin))
        .bind(bool_to_int(user.is_patron))
        .bind(bool_to_int(user.is_author))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to create user"))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Get user by email (case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let sql = format!("SELECT {} FROM users WHERE email = ? COLLATE NOCASE", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Get user by username (case-insensitive)
    pub async fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let sql = format!(
            "SELECT {} FROM users WHERE username = ? COLLATE NOCASE",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Find the user currently holding `token`
    pub async fn get_by_token(&self, token: &str) -> Result<Option<UserRecord>> {
        let sql = format!("SELECT {} FROM users WHERE token = ?", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_all(&self) -> Result<Vec<UserRecord>> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at", USER_COLUMNS);
        let rows = sqlx::query_as::<_, UserRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Grant every role flag to an existing user
    pub async fn promote_to_superuser(&self, id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE users SET is_active = 1, is_admin = 1, is_patron = 1, is_author = 1, updated_at = ? WHERE id = ?",
        )
        .bind(now_iso8601())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ========================================================================
    // Session Token Slot
    // ========================================================================

    /// Compare-and-swap the token slot.
    ///
    /// Writes `new_token` only while the slot still holds `expected` (`None`
    /// meaning empty). Returns false when another writer got there first.
    pub async fn swap_token(
        &self,
        id: &str,
        expected: Option<&str>,
        new_token: &str,
    ) -> Result<bool> {
        let result =
            sqlx::query("UPDATE users SET token = ?, updated_at = ? WHERE id = ? AND token IS ?")
                .bind(new_token)
                .bind(now_iso8601())
                .bind(id)
                .bind(expected)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Clear the token slot if it still holds `token`
    pub async fn clear_token_if(&self, id: &str, token: &str) -> Result<bool> {
        let result =
            sqlx::query("UPDATE users SET token = NULL, updated_at = ? WHERE id = ? AND token = ?")
                .bind(now_iso8601())
                .bind(id)
                .bind(token)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn update_last_login(&self, id: &str) -> Result<()> {
        let now = now_iso8601();
        sqlx::query("UPDATE users SET last_login_at = ?, updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_active(&self, id: &str, active: bool) -> Result<()> {
        sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(bool_to_int(active))
            .bind(now_iso8601())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

//! Patron and author profiles
//!
//! Each profile is one-to-one with a user. Creating a profile also raises the
//! matching role flag on the user row, in the same transaction.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use super::sqlite_helpers::{new_id, now_iso8601};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PatronRecord {
    pub patron_id: String,
    pub user_id: String,
    pub address: String,
    pub phone_number: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuthorRecord {
    pub author_id: String,
    pub user_id: String,
    pub birthdate: NaiveDate,
    pub nationality: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct CreatePatron {
    pub address: String,
    pub phone_number: String,
}

#[derive(Debug, Clone)]
pub struct CreateAuthor {
    pub birthdate: NaiveDate,
    pub nationality: String,
}

pub struct ProfilesRepository {
    pool: SqlitePool,
}

impl ProfilesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Patrons
    // ========================================================================

    /// Insert the patron profile and set `users.is_patron`
    pub async fn create_patron(&self, user_id: &str, input: CreatePatron) -> Result<PatronRecord> {
        let patron_id = new_id();
        let now = now_iso8601();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO patrons (patron_id, user_id, address, phone_number, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&patron_id)
        .bind(user_id)
        .bind(&input.address)
        .bind(&input.phone_number)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET is_patron = 1, updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.get_patron(&patron_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to create patron"))
    }

    pub async fn get_patron(&self, patron_id: &str) -> Result<Option<PatronRecord>> {
        let row = sqlx::query_as::<_, PatronRecord>("SELECT * FROM patrons WHERE patron_id = ?")
            .bind(patron_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_patron_by_user(&self, user_id: &str) -> Result<Option<PatronRecord>> {
        let row = sqlx::query_as::<_, PatronRecord>("SELECT * FROM patrons WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    // ========================================================================
    // Authors
    // ========================================================================

    /// Insert the author profile and set `users.is_author`
    pub async fn create_author(&self, user_id: &str, input: CreateAuthor) -> Result<AuthorRecord> {
        let author_id = new_id();
        let now = now_iso8601();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO authors (author_id, user_id, birthdate, nationality, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&author_id)
        .bind(user_id)
        .bind(input.birthdate)
        .bind(&input.nationality)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET is_author = 1, updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.get_author(&author_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to create author"))
    }

    pub async fn get_author(&self, author_id: &str) -> Result<Option<AuthorRecord>> {
        let row = sqlx::query_as::<_, AuthorRecord>("SELECT * FROM authors WHERE author_id = ?")
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_author_by_user(&self, user_id: &str) -> Result<Option<AuthorRecord>> {
        let row = sqlx::query_as::<_, AuthorRecord>("SELECT * FROM authors WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_authors(&self) -> Result<Vec<AuthorRecord>> {
        let rows = sqlx::query_as::<_, AuthorRecord>("SELECT * FROM authors ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

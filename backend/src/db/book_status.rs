//! Reading status repository (a user's personal library)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::sqlite_helpers::{new_id, now_iso8601};

/// Reading progress of a book in a user's library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, async_graphql::Enum)]
#[serde(rename_all = "snake_case")]
pub enum ReadingState {
    Read,
    Incomplete,
    Unread,
}

impl ReadingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingState::Read => "read",
            ReadingState::Incomplete => "incomplete",
            ReadingState::Unread => "unread",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "read" => Some(ReadingState::Read),
            "incomplete" => Some(ReadingState::Incomplete),
            "unread" => Some(ReadingState::Unread),
            _ => None,
        }
    }
}

impl TryFrom<String> for ReadingState {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_str(&value).ok_or_else(|| anyhow::anyhow!("Unknown reading state '{}'", value))
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BookStatusRecord {
    pub book_status_id: String,
    pub book_id: String,
    pub user_id: String,
    pub total_pages: i64,
    pub present_page: i64,
    #[sqlx(try_from = "String")]
    pub status: ReadingState,
    pub created_at: String,
    pub updated_at: String,
}

pub struct BookStatusRepository {
    pool: SqlitePool,
}

impl BookStatusRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a book to the user's library as unread. A second add for the
    /// same (book, user) leaves the existing row untouched.
    pub async fn add(
        &self,
        book_id: &str,
        user_id: &str,
        total_pages: i64,
    ) -> Result<BookStatusRecord> {
        let now = now_iso8601();
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO book_status
                (book_status_id, book_id, user_id, total_pages, present_page, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, ?, ?, ?)
            "#,
        )
        .bind(new_id())
        .bind(book_id)
        .bind(user_id)
        .bind(total_pages)
        .bind(ReadingState::Unread.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get(book_id, user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to add book to library"))
    }

    pub async fn get(&self, book_id: &str, user_id: &str) -> Result<Option<BookStatusRecord>> {
        let row = sqlx::query_as::<_, BookStatusRecord>(
            "SELECT * FROM book_status WHERE book_id = ? AND user_id = ?",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn remove(&self, book_id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM book_status WHERE book_id = ? AND user_id = ?")
            .bind(book_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the state and, when given, the current page and page count
    pub async fn update_progress(
        &self,
        book_id: &str,
        user_id: &str,
        present_page: Option<i64>,
        total_pages: Option<i64>,
        status: ReadingState,
    ) -> Result<Option<BookStatusRecord>> {
        let result = sqlx::query(
            r#"
            UPDATE book_status SET
                present_page = COALESCE(?, present_page),
                total_pages = COALESCE(?, total_pages),
                status = ?,
                updated_at = ?
            WHERE book_id = ? AND user_id = ?
            "#,
        )
        .bind(present_page)
        .bind(total_pages)
        .bind(status.as_str())
        .bind(now_iso8601())
        .bind(book_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(book_id, user_id).await
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<BookStatusRecord>> {
        let rows = sqlx::query_as::<_, BookStatusRecord>(
            "SELECT * FROM book_status WHERE user_id = ? ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

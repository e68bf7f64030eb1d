//! Loans repository
//!
//! Checkout and close both touch `books.available_copies`; each runs in a
//! single transaction so the copy count never drifts from the loan rows.

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::sqlite_helpers::{new_id, now_iso8601};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, async_graphql::Enum)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    CheckedOut,
    Returned,
    Lost,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::CheckedOut => "checked_out",
            TransactionStatus::Returned => "returned",
            TransactionStatus::Lost => "lost",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "checked_out" => Some(TransactionStatus::CheckedOut),
            "returned" => Some(TransactionStatus::Returned),
            "lost" => Some(TransactionStatus::Lost),
            _ => None,
        }
    }
}

impl TryFrom<String> for TransactionStatus {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_str(&value)
            .ok_or_else(|| anyhow::anyhow!("Unknown transaction status '{}'", value))
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub book_id: String,
    pub patron_id: String,
    pub checkout_date: NaiveDate,
    /// Due date
    pub return_date: NaiveDate,
    pub returned_at: Option<String>,
    pub fine_amount: i64,
    pub fine_paid: bool,
    #[sqlx(try_from = "String")]
    pub status: TransactionStatus,
    pub created_at: String,
    pub updated_at: String,
}

pub struct TransactionsRepository {
    pool: SqlitePool,
}

impl TransactionsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Take one copy of the book and open a loan.
    ///
    /// Returns `None` (and writes nothing) when no copies are available.
    pub async fn checkout(
        &self,
        book_id: &str,
        patron_id: &str,
        checkout_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Result<Option<TransactionRecord>> {
        let transaction_id = new_id();
        let now = now_iso8601();

        let mut tx = self.pool.begin().await?;
        let taken = sqlx::query(
            r#"
            UPDATE books SET available_copies = available_copies - 1, updated_at = ?
            WHERE book_id = ? AND available_copies > 0
            "#,
        )
        .bind(&now)
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if taken.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query(
            r#"
            INSERT INTO transactions (transaction_id, book_id, patron_id, checkout_date, return_date,
                                      fine_amount, fine_paid, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 0, 0, ?, ?, ?)
            "#,
        )
        .bind(&transaction_id)
        .bind(book_id)
        .bind(patron_id)
        .bind(checkout_date)
        .bind(return_date)
        .bind(TransactionStatus::CheckedOut.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.get(&transaction_id).await
    }

    /// Move a checked-out loan to `status`, recording the fine and, when
    /// `restore_copy` is set, putting the copy back on the shelf.
    ///
    /// Returns `None` when the loan is not currently checked out.
    pub async fn close(
        &self,
        transaction_id: &str,
        status: TransactionStatus,
        returned_at: Option<&str>,
        fine_amount: i64,
        restore_copy: bool,
    ) -> Result<Option<TransactionRecord>> {
        let now = now_iso8601();

        let mut tx = self.pool.begin().await?;
        let closed = sqlx::query(
            r#"
            UPDATE transactions SET status = ?, returned_at = ?, fine_amount = ?, updated_at = ?
            WHERE transaction_id = ? AND status = ?
            "#,
        )
        .bind(status.as_str())
        .bind(returned_at)
        .bind(fine_amount)
        .bind(&now)
        .bind(transaction_id)
        .bind(TransactionStatus::CheckedOut.as_str())
        .execute(&mut *tx)
        .await?;

        if closed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        if restore_copy {
            sqlx::query(
                r#"
                UPDATE books SET available_copies = available_copies + 1, updated_at = ?
                WHERE book_id = (SELECT book_id FROM transactions WHERE transaction_id = ?)
                "#,
            )
            .bind(&now)
            .bind(transaction_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        self.get(transaction_id).await
    }

    pub async fn pay_fine(&self, transaction_id: &str) -> Result<Option<TransactionRecord>> {
        let result = sqlx::query(
            "UPDATE transactions SET fine_paid = 1, updated_at = ? WHERE transaction_id = ?",
        )
        .bind(now_iso8601())
        .bind(transaction_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(transaction_id).await
    }

    pub async fn get(&self, transaction_id: &str) -> Result<Option<TransactionRecord>> {
        let row = sqlx::query_as::<_, TransactionRecord>(
            "SELECT * FROM transactions WHERE transaction_id = ?",
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_for_patron(&self, patron_id: &str) -> Result<Vec<TransactionRecord>> {
        let rows = sqlx::query_as::<_, TransactionRecord>(
            "SELECT * FROM transactions WHERE patron_id = ? ORDER BY checkout_date DESC, created_at DESC",
        )
        .bind(patron_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

//! Reviews repository
//!
//! Writing or deleting a review recomputes the book's aggregate rating in the
//! same transaction: `rating` is the mean over all reviews (0 with none) and
//! `no_of_reviews` counts reviews rated above zero.

use anyhow::Result;
use serde::Serialize;
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};

use super::sqlite_helpers::{new_id, now_iso8601};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewRecord {
    pub review_id: String,
    pub book_id: String,
    pub patron_id: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateReview {
    pub book_id: String,
    pub patron_id: String,
    pub rating: i64,
    pub comment: String,
}

pub struct ReviewsRepository {
    pool: SqlitePool,
}

impl ReviewsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, review: &CreateReview) -> Result<ReviewRecord> {
        let review_id = new_id();
        let now = now_iso8601();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO reviews (review_id, book_id, patron_id, rating, comment, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&review_id)
        .bind(&review.book_id)
        .bind(&review.patron_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        recompute_book_rating(&mut tx, &review.book_id).await?;
        tx.commit().await?;

        self.get(&review_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to create review"))
    }

    pub async fn delete(&self, review_id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let book_id: Option<(String,)> =
            sqlx::query_as("DELETE FROM reviews WHERE review_id = ? RETURNING book_id")
                .bind(review_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((book_id,)) = book_id else {
            tx.rollback().await?;
            return Ok(false);
        };

        recompute_book_rating(&mut tx, &book_id).await?;
        tx.commit().await?;
        Ok(true)
    }

    pub async fn get(&self, review_id: &str) -> Result<Option<ReviewRecord>> {
        let row = sqlx::query_as::<_, ReviewRecord>("SELECT * FROM reviews WHERE review_id = ?")
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_for_book(&self, book_id: &str) -> Result<Vec<ReviewRecord>> {
        let rows = sqlx::query_as::<_, ReviewRecord>(
            "SELECT * FROM reviews WHERE book_id = ? ORDER BY created_at DESC",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

async fn recompute_book_rating(tx: &mut Transaction<'_, Sqlite>, book_id: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE books SET
            rating = (SELECT COALESCE(AVG(rating), 0.0) FROM reviews WHERE book_id = ?1),
            no_of_reviews = (SELECT COUNT(*) FROM reviews WHERE book_id = ?1 AND rating > 0),
            updated_at = ?2
        WHERE book_id = ?1
        "#,
    )
    .bind(book_id)
    .bind(now_iso8601())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

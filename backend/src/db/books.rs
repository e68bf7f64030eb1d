//! Books repository
//!
//! Books plus their author and genre relations. Relation writes are
//! idempotent: adding a present pair or removing an absent one changes
//! nothing and reports `false`.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::profiles::AuthorRecord;
use super::genres::GenreRecord;
use super::sqlite_helpers::{TextMatch, new_id, now_iso8601, push_text_filter};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BookRecord {
    pub book_id: String,
    pub title: String,
    pub isbn: String,
    pub description: String,
    pub rating: f64,
    pub publish_year: NaiveDate,
    pub available_copies: i64,
    pub no_of_reviews: i64,
    pub book_pages: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateBook {
    pub title: String,
    pub isbn: String,
    pub description: String,
    pub rating: f64,
    pub publish_year: NaiveDate,
    pub available_copies: i64,
    pub book_pages: i64,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub publish_year: Option<NaiveDate>,
    pub available_copies: Option<i64>,
    pub book_pages: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Exact ISBN
    pub isbn: Option<String>,
    pub title: Vec<(TextMatch, String)>,
    pub description: Vec<(TextMatch, String)>,
}

pub struct BooksRepository {
    pool: SqlitePool,
}

impl BooksRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Book CRUD
    // ========================================================================

    /// Insert the book with its first author and genres in one transaction
    pub async fn create(
        &self,
        book: &CreateBook,
        author_id: &str,
        genre_ids: &[String],
    ) -> Result<BookRecord> {
        let book_id = new_id();
        let now = now_iso8601();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO books (book_id, title, isbn, description, rating, publish_year,
                               available_copies, no_of_reviews, book_pages, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)
            "#,
        )
        .bind(&book_id)
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(book.rating)
        .bind(book.publish_year)
        .bind(book.available_copies)
        .bind(book.book_pages)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO book_authors (book_id, author_id) VALUES (?, ?)")
            .bind(&book_id)
            .bind(author_id)
            .execute(&mut *tx)
            .await?;

        for genre_id in genre_ids {
            sqlx::query("INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES (?, ?)")
                .bind(&book_id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.get(&book_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to create book"))
    }

    pub async fn get(&self, book_id: &str) -> Result<Option<BookRecord>> {
        let row = sqlx::query_as::<_, BookRecord>("SELECT * FROM books WHERE book_id = ?")
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Returns `None` when the book does not exist
    pub async fn update(&self, book_id: &str, update: &UpdateBook) -> Result<Option<BookRecord>> {
        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = COALESCE(?, title),
                isbn = COALESCE(?, isbn),
                description = COALESCE(?, description),
                publish_year = COALESCE(?, publish_year),
                available_copies = COALESCE(?, available_copies),
                book_pages = COALESCE(?, book_pages),
                updated_at = ?
            WHERE book_id = ?
            "#,
        )
        .bind(&update.title)
        .bind(&update.isbn)
        .bind(&update.description)
        .bind(update.publish_year)
        .bind(update.available_copies)
        .bind(update.book_pages)
        .bind(now_iso8601())
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(book_id).await
    }

    pub async fn delete(&self, book_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = ?")
            .bind(book_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self, filter: &BookFilter) -> Result<Vec<BookRecord>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM books WHERE 1 = 1");
        if let Some(isbn) = &filter.isbn {
            qb.push(" AND isbn = ").push_bind(isbn.clone());
        }
        for (mode, value) in &filter.title {
            push_text_filter(&mut qb, "title", *mode, value);
        }
        for (mode, value) in &filter.description {
            push_text_filter(&mut qb, "description", *mode, value);
        }
        qb.push(" ORDER BY title");

        let rows = qb
            .build_query_as::<BookRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Books the author is associated with
    pub async fn list_by_author(&self, author_id: &str) -> Result<Vec<BookRecord>> {
        let rows = sqlx::query_as::<_, BookRecord>(
            r#"
            SELECT b.* FROM books b
            INNER JOIN book_authors ba ON ba.book_id = b.book_id
            WHERE ba.author_id = ?
            ORDER BY b.title
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Books in the user's personal library
    pub async fn list_in_library(&self, user_id: &str) -> Result<Vec<BookRecord>> {
        let rows = sqlx::query_as::<_, BookRecord>(
            r#"
            SELECT b.* FROM books b
            INNER JOIN book_status bs ON bs.book_id = b.book_id
            WHERE bs.user_id = ?
            ORDER BY bs.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ========================================================================
    // Relations
    // ========================================================================

    pub async fn authors_of(&self, book_id: &str) -> Result<Vec<AuthorRecord>> {
        let rows = sqlx::query_as::<_, AuthorRecord>(
            r#"
            SELECT a.* FROM authors a
            INNER JOIN book_authors ba ON ba.author_id = a.author_id
            WHERE ba.book_id = ?
            ORDER BY a.created_at
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn genres_of(&self, book_id: &str) -> Result<Vec<GenreRecord>> {
        let rows = sqlx::query_as::<_, GenreRecord>(
            r#"
            SELECT g.* FROM genres g
            INNER JOIN book_genres bg ON bg.genre_id = g.genre_id
            WHERE bg.book_id = ?
            ORDER BY g.name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Whether `author_id` is among the book's authors
    pub async fn has_author(&self, book_id: &str, author_id: &str) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM book_authors WHERE book_id = ? AND author_id = ?")
                .bind(book_id)
                .bind(author_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    pub async fn add_author(&self, book_id: &str, author_id: &str) -> Result<bool> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO book_authors (book_id, author_id) VALUES (?, ?)")
                .bind(book_id)
                .bind(author_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_author(&self, book_id: &str, author_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM book_authors WHERE book_id = ? AND author_id = ?")
            .bind(book_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn add_genre(&self, book_id: &str, genre_id: &str) -> Result<bool> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES (?, ?)")
                .bind(book_id)
                .bind(genre_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_genre(&self, book_id: &str, genre_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM book_genres WHERE book_id = ? AND genre_id = ?")
            .bind(book_id)
            .bind(genre_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

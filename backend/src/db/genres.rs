//! Genres repository

use anyhow::Result;
use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::sqlite_helpers::{TextMatch, new_id, push_text_filter};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GenreRecord {
    pub genre_id: String,
    pub name: String,
    pub description: String,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UpdateGenre {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Text filters over genres; unset fields do not constrain
#[derive(Debug, Clone, Default)]
pub struct GenreFilter {
    pub name: Vec<(TextMatch, String)>,
    pub description: Vec<(TextMatch, String)>,
}

pub struct GenresRepository {
    pool: SqlitePool,
}

impl GenresRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str, description: &str) -> Result<GenreRecord> {
        let genre_id = new_id();
        sqlx::query("INSERT INTO genres (genre_id, name, description) VALUES (?, ?, ?)")
            .bind(&genre_id)
            .bind(name)
            .bind(description)
            .execute(&self.pool)
            .await?;

        self.get(&genre_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to create genre"))
    }

    pub async fn get(&self, genre_id: &str) -> Result<Option<GenreRecord>> {
        let row = sqlx::query_as::<_, GenreRecord>("SELECT * FROM genres WHERE genre_id = ?")
            .bind(genre_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<GenreRecord>> {
        let row = sqlx::query_as::<_, GenreRecord>(
            "SELECT * FROM genres WHERE name = ? COLLATE NOCASE",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Returns `None` when the genre does not exist
    pub async fn update(&self, genre_id: &str, update: UpdateGenre) -> Result<Option<GenreRecord>> {
        let result = sqlx::query(
            r#"
            UPDATE genres SET
                name = COALESCE(?, name),
                description = COALESCE(?, description)
            WHERE genre_id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(genre_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(genre_id).await
    }

    pub async fn delete(&self, genre_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM genres WHERE genre_id = ?")
            .bind(genre_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self, filter: &GenreFilter) -> Result<Vec<GenreRecord>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM genres WHERE 1 = 1");
        for (mode, value) in &filter.name {
            push_text_filter(&mut qb, "name", *mode, value);
        }
        for (mode, value) in &filter.description {
            push_text_filter(&mut qb, "description", *mode, value);
        }
        qb.push(" ORDER BY name");

        let rows = qb
            .build_query_as::<GenreRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

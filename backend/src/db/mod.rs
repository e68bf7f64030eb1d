//! Database connection and repositories

pub mod book_status;
pub mod books;
pub mod genres;
pub mod profiles;
pub mod reviews;
pub mod sqlite_helpers;
pub mod transactions;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub use book_status::{BookStatusRecord, BookStatusRepository, ReadingState};
pub use books::{BookFilter, BookRecord, BooksRepository, CreateBook, UpdateBook};
pub use genres::{GenreFilter, GenreRecord, GenresRepository, UpdateGenre};
pub use profiles::{AuthorRecord, CreateAuthor, CreatePatron, PatronRecord, ProfilesRepository};
pub use reviews::{CreateReview, ReviewRecord, ReviewsRepository};
pub use transactions::{TransactionRecord, TransactionStatus, TransactionsRepository};
pub use users::{CreateUser, UserRecord, UsersRepository};

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database wrapper from an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the SQLite database at `url`
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database URL: {}", url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get a users repository
    pub fn users(&self) -> UsersRepository {
        UsersRepository::new(self.pool.clone())
    }

    /// Get a patron/author profiles repository
    pub fn profiles(&self) -> ProfilesRepository {
        ProfilesRepository::new(self.pool.clone())
    }

    /// Get a genres repository
    pub fn genres(&self) -> GenresRepository {
        GenresRepository::new(self.pool.clone())
    }

    /// Get a books repository
    pub fn books(&self) -> BooksRepository {
        BooksRepository::new(self.pool.clone())
    }

    /// Get a reading status repository
    pub fn book_status(&self) -> BookStatusRepository {
        BookStatusRepository::new(self.pool.clone())
    }

    /// Get a loans repository
    pub fn transactions(&self) -> TransactionsRepository {
        TransactionsRepository::new(self.pool.clone())
    }

    /// Get a reviews repository
    pub fn reviews(&self) -> ReviewsRepository {
        ReviewsRepository::new(self.pool.clone())
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

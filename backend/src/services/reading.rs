//! Personal library and reading progress

use crate::db::{BookRecord, BookStatusRecord, Database, ReadingState, UserRecord};
use crate::error::{Error, Result};

/// State after closing the book at `page_no`
pub fn state_after_closing(page_no: i64, total_pages: i64) -> Result<ReadingState> {
    if page_no < 0 || page_no > total_pages {
        return Err(Error::validation(format!(
            "Page number must be between 0 and {}",
            total_pages
        )));
    }
    Ok(if page_no == total_pages {
        ReadingState::Read
    } else {
        ReadingState::Incomplete
    })
}

#[derive(Clone)]
pub struct ReadingService {
    db: Database,
}

impl ReadingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Add the book as unread; adding it again keeps the existing progress
    pub async fn add_to_library(
        &self,
        user: &UserRecord,
        book_id: &str,
    ) -> Result<BookStatusRecord> {
        let book = self
            .db
            .books()
            .get(book_id)
            .await?
            .ok_or(Error::NotFound("Book"))?;

        let status = self
            .db
            .book_status()
            .add(&book.book_id, &user.id, book.book_pages)
            .await?;
        tracing::debug!(user_id = %user.id, book_id = %book.book_id, "Book in library");
        Ok(status)
    }

    pub async fn remove_from_library(&self, user: &UserRecord, book_id: &str) -> Result<()> {
        if !self.db.book_status().remove(book_id, &user.id).await? {
            return Err(Error::NotFound("Book in library"));
        }
        tracing::debug!(user_id = %user.id, book_id = %book_id, "Book removed from library");
        Ok(())
    }

    /// Mark the book as being read
    pub async fn read_book(&self, user: &UserRecord, book_id: &str) -> Result<BookStatusRecord> {
        self.db
            .book_status()
            .update_progress(book_id, &user.id, None, None, ReadingState::Incomplete)
            .await?
            .ok_or(Error::NotFound("Book in library"))
    }

    /// Record where the reader stopped.
    ///
    /// Bounds and completion use the book's current `book_pages`, which is
    /// also written back to `total_pages`.
    pub async fn close_book(
        &self,
        user: &UserRecord,
        book_id: &str,
        page_no: i64,
    ) -> Result<BookStatusRecord> {
        let statuses = self.db.book_status();
        statuses
            .get(book_id, &user.id)
            .await?
            .ok_or(Error::NotFound("Book in library"))?;
        let book = self
            .db
            .books()
            .get(book_id)
            .await?
            .ok_or(Error::NotFound("Book"))?;

        let state = state_after_closing(page_no, book.book_pages)?;
        statuses
            .update_progress(book_id, &user.id, Some(page_no), Some(book.book_pages), state)
            .await?
            .ok_or(Error::NotFound("Book in library"))
    }

    pub async fn library(&self, user: &UserRecord) -> Result<Vec<BookRecord>> {
        Ok(self.db.books().list_in_library(&user.id).await?)
    }

    pub async fn statuses(&self, user: &UserRecord) -> Result<Vec<BookStatusRecord>> {
        Ok(self.db.book_status().list_for_user(&user.id).await?)
    }
}

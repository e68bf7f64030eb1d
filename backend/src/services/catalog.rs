//! Catalog service: genres and books
//!
//! Genre writes only need a signed-in caller. Book writes need the author
//! role, and everything past creation also needs the caller to be one of the
//! book's authors.

use crate::db::sqlite_helpers::is_unique_violation;
use crate::db::{
    BookFilter, BookRecord, CreateBook, Database, GenreFilter, GenreRecord, UpdateBook,
    UpdateGenre, UserRecord,
};
use crate::error::{Error, Result};
use crate::services::authorization::Authorizer;

/// Fields accepted by `create_book`; `genre` is the raw comma-separated list
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub isbn: String,
    pub description: String,
    pub genre: String,
    pub rating: Option<f64>,
    pub publish_year: chrono::NaiveDate,
    pub available_copies: i64,
    pub book_pages: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    db: Database,
    guard: Authorizer,
}

impl CatalogService {
    pub fn new(db: Database) -> Self {
        let guard = Authorizer::new(db.clone());
        Self { db, guard }
    }

    // ========================================================================
    // Genres
    // ========================================================================

    pub async fn create_genre(&self, name: &str, description: &str) -> Result<GenreRecord> {
        let name = non_empty(name, "Genre name")?;
        let genre = self
            .db
            .genres()
            .create(name, description.trim())
            .await
            .map_err(|e| duplicate_genre(name, e))?;

        tracing::info!(genre_id = %genre.genre_id, name = %genre.name, "Genre created");
        Ok(genre)
    }

    pub async fn edit_genre(&self, genre_id: &str, mut update: UpdateGenre) -> Result<GenreRecord> {
        if let Some(name) = update.name.take() {
            update.name = Some(non_empty(&name, "Genre name")?.to_string());
        }
        let new_name = update.name.clone().unwrap_or_default();

        self.db
            .genres()
            .update(genre_id, update)
            .await
            .map_err(|e| duplicate_genre(&new_name, e))?
            .ok_or(Error::NotFound("Genre"))
    }

    pub async fn delete_genre(&self, genre_id: &str) -> Result<()> {
        if !self.db.genres().delete(genre_id).await? {
            return Err(Error::NotFound("Genre"));
        }
        tracing::info!(genre_id = %genre_id, "Genre deleted");
        Ok(())
    }

    pub async fn genre(&self, genre_id: &str) -> Result<GenreRecord> {
        self.db
            .genres()
            .get(genre_id)
            .await?
            .ok_or(Error::NotFound("Genre"))
    }

    pub async fn genres(&self, filter: &GenreFilter) -> Result<Vec<GenreRecord>> {
        Ok(self.db.genres().list(filter).await?)
    }

    // ========================================================================
    // Books
    // ========================================================================

    /// Create a book authored by the caller
    pub async fn create_book(&self, user: &UserRecord, input: NewBook) -> Result<BookRecord> {
        let author = self.guard.author(user).await?;

        let title = non_empty(&input.title, "Title")?;
        let rating = input.rating.unwrap_or(0.0);
        if !(0.0..=5.0).contains(&rating) {
            return Err(Error::validation("Rating should be within 0 and 5"));
        }
        non_negative(input.available_copies, "Available copies")?;
        non_negative(input.book_pages, "Book pages")?;

        let mut genre_ids = Vec::new();
        for name in parse_genre_names(&input.genre) {
            let genre = self
                .db
                .genres()
                .get_by_name(name)
                .await?
                .ok_or_else(|| Error::validation(format!("Genre '{}' does not exist", name)))?;
            genre_ids.push(genre.genre_id);
        }

        let book = self
            .db
            .books()
            .create(
                &CreateBook {
                    title: title.to_string(),
                    isbn: input.isbn.trim().to_string(),
                    description: input.description,
                    rating,
                    publish_year: input.publish_year,
                    available_copies: input.available_copies,
                    book_pages: input.book_pages,
                },
                &author.author_id,
                &genre_ids,
            )
            .await?;

        tracing::info!(
            book_id = %book.book_id,
            author_id = %author.author_id,
            genres = genre_ids.len(),
            "Book created"
        );
        Ok(book)
    }

    pub async fn edit_book(
        &self,
        user: &UserRecord,
        book_id: &str,
        update: UpdateBook,
    ) -> Result<BookRecord> {
        let (_, book) = self.guard.book_author(user, book_id).await?;

        if let Some(title) = &update.title {
            non_empty(title, "Title")?;
        }
        if let Some(copies) = update.available_copies {
            non_negative(copies, "Available copies")?;
        }
        if let Some(pages) = update.book_pages {
            non_negative(pages, "Book pages")?;
        }

        self.db
            .books()
            .update(&book.book_id, &update)
            .await?
            .ok_or(Error::NotFound("Book"))
    }

    pub async fn delete_book(&self, user: &UserRecord, book_id: &str) -> Result<()> {
        let (author, book) = self.guard.book_author(user, book_id).await?;
        if !self.db.books().delete(&book.book_id).await? {
            return Err(Error::NotFound("Book"));
        }
        tracing::info!(book_id = %book.book_id, author_id = %author.author_id, "Book deleted");
        Ok(())
    }

    pub async fn add_author_to_book(
        &self,
        user: &UserRecord,
        book_id: &str,
        author_id: &str,
    ) -> Result<BookRecord> {
        let (_, book) = self.guard.book_author(user, book_id).await?;
        let added_author = self
            .db
            .profiles()
            .get_author(author_id)
            .await?
            .ok_or(Error::NotFound("Author"))?;

        if self.db.books().add_author(&book.book_id, &added_author.author_id).await? {
            tracing::info!(
                book_id = %book.book_id,
                author_id = %added_author.author_id,
                "Author added to book"
            );
        }
        Ok(book)
    }

    /// Removing an author who is not on the book is a no-op
    pub async fn remove_author_from_book(
        &self,
        user: &UserRecord,
        book_id: &str,
        author_id: &str,
    ) -> Result<BookRecord> {
        let (_, book) = self.guard.book_author(user, book_id).await?;
        if self.db.books().remove_author(&book.book_id, author_id).await? {
            tracing::info!(
                book_id = %book.book_id,
                author_id = %author_id,
                "Author removed from book"
            );
        }
        Ok(book)
    }

    pub async fn add_genre_to_book(
        &self,
        user: &UserRecord,
        book_id: &str,
        genre_id: &str,
    ) -> Result<BookRecord> {
        let (_, book) = self.guard.book_author(user, book_id).await?;
        let genre = self.genre(genre_id).await?;

        if self.db.books().add_genre(&book.book_id, &genre.genre_id).await? {
            tracing::info!(
                book_id = %book.book_id,
                genre_id = %genre.genre_id,
                "Genre added to book"
            );
        }
        Ok(book)
    }

    pub async fn remove_genre_from_book(
        &self,
        user: &UserRecord,
        book_id: &str,
        genre_id: &str,
    ) -> Result<BookRecord> {
        let (_, book) = self.guard.book_author(user, book_id).await?;
        if self.db.books().remove_genre(&book.book_id, genre_id).await? {
            tracing::info!(
                book_id = %book.book_id,
                genre_id = %genre_id,
                "Genre removed from book"
            );
        }
        Ok(book)
    }

    pub async fn book(&self, book_id: &str) -> Result<BookRecord> {
        self.db
            .books()
            .get(book_id)
            .await?
            .ok_or(Error::NotFound("Book"))
    }

    pub async fn books(&self, filter: &BookFilter) -> Result<Vec<BookRecord>> {
        Ok(self.db.books().list(filter).await?)
    }

    /// Books written by the caller
    pub async fn author_books(&self, user: &UserRecord) -> Result<Vec<BookRecord>> {
        let author = self.guard.author(user).await?;
        Ok(self.db.books().list_by_author(&author.author_id).await?)
    }
}

/// Split a comma-separated genre list, dropping blanks
pub fn parse_genre_names(raw: &str) -> Vec<&str> {
    let mut names: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    names.dedup();
    names
}

fn non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{} cannot be empty", field)));
    }
    Ok(value)
}

fn non_negative(value: i64, field: &str) -> Result<()> {
    if value < 0 {
        return Err(Error::validation(format!("{} cannot be negative", field)));
    }
    Ok(())
}

fn duplicate_genre(name: &str, err: anyhow::Error) -> Error {
    if is_unique_violation(&err) {
        Error::validation(format!("Genre '{}' already exists", name))
    } else {
        Error::Internal(err)
    }
}

//! Book mutations
//!
//! All require the author role; edits, deletes and relation changes also
//! require the caller to be one of the book's authors.

use async_graphql::InputObject;
use chrono::NaiveDate;

use super::prelude::*;
use crate::db::UpdateBook;
use crate::services::NewBook;

/// Fields to change on a book; omitted fields are kept
#[derive(Debug, Default, InputObject)]
pub struct EditBookInput {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub publish_year: Option<NaiveDate>,
    pub available_copies: Option<i64>,
    pub book_pages: Option<i64>,
}

impl From<EditBookInput> for UpdateBook {
    fn from(input: EditBookInput) -> Self {
        Self {
            title: input.title,
            isbn: input.isbn,
            description: input.description,
            publish_year: input.publish_year,
            available_copies: input.available_copies,
            book_pages: input.book_pages,
        }
    }
}

#[derive(Default)]
pub struct BookMutations;

#[Object]
impl BookMutations {
    /// Create a book authored by the caller. `genre` is a comma-separated
    /// list of existing genre names and may be blank.
    #[allow(clippy::too_many_arguments)]
    async fn create_book(
        &self,
        ctx: &Context<'_>,
        title: String,
        isbn: String,
        description: String,
        genre: String,
        rating: Option<f64>,
        publish_year: NaiveDate,
        available_copies: i64,
        book_pages: i64,
    ) -> Result<Book> {
        let user = verify_header(ctx).await?;
        let book = ctx
            .services()
            .catalog
            .create_book(
                &user,
                NewBook {
                    title,
                    isbn,
                    description,
                    genre,
                    rating,
                    publish_year,
                    available_copies,
                    book_pages,
                },
            )
            .await
            .extend()?;
        Ok(Book::from(book))
    }

    async fn edit_book(
        &self,
        ctx: &Context<'_>,
        book_id: String,
        input: EditBookInput,
    ) -> Result<Book> {
        let user = verify_header(ctx).await?;
        let book = ctx
            .services()
            .catalog
            .edit_book(&user, &book_id, input.into())
            .await
            .extend()?;
        Ok(Book::from(book))
    }

    async fn delete_book(&self, ctx: &Context<'_>, book_id: String) -> Result<bool> {
        let user = verify_header(ctx).await?;
        ctx.services()
            .catalog
            .delete_book(&user, &book_id)
            .await
            .extend()?;
        Ok(true)
    }

    async fn add_author_to_book(
        &self,
        ctx: &Context<'_>,
        book_id: String,
        author_id: String,
    ) -> Result<Book> {
        let user = verify_header(ctx).await?;
        let book = ctx
            .services()
            .catalog
            .add_author_to_book(&user, &book_id, &author_id)
            .await
            .extend()?;
        Ok(Book::from(book))
    }

    async fn remove_author_from_book(
        &self,
        ctx: &Context<'_>,
        book_id: String,
        author_id: String,
    ) -> Result<Book> {
        let user = verify_header(ctx).await?;
        let book = ctx
            .services()
            .catalog
            .remove_author_from_book(&user, &book_id, &author_id)
            .await
            .extend()?;
        Ok(Book::from(book))
    }

    async fn add_genre_to_book(
        &self,
        ctx: &Context<'_>,
        book_id: String,
        genre_id: String,
    ) -> Result<Book> {
        let user = verify_header(ctx).await?;
        let book = ctx
            .services()
            .catalog
            .add_genre_to_book(&user, &book_id, &genre_id)
            .await
            .extend()?;
        Ok(Book::from(book))
    }

    async fn remove_genre_from_book(
        &self,
        ctx: &Context<'_>,
        book_id: String,
        genre_id: String,
    ) -> Result<Book> {
        let user = verify_header(ctx).await?;
        let book = ctx
            .services()
            .catalog
            .remove_genre_from_book(&user, &book_id, &genre_id)
            .await
            .extend()?;
        Ok(Book::from(book))
    }
}

use super::prelude::*;
use crate::db::BookFilter;
use crate::graphql::filters::BookFilterInput;

#[derive(Default)]
pub struct BookQueries;

#[Object]
impl BookQueries {
    async fn all_book(&self, ctx: &Context<'_>) -> Result<Vec<Book>> {
        let books = ctx
            .services()
            .catalog
            .books(&BookFilter::default())
            .await
            .extend()?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    /// Books matching ISBN/title/description filters
    async fn books(&self, ctx: &Context<'_>, filter: Option<BookFilterInput>) -> Result<Vec<Book>> {
        let filter: BookFilter = filter.unwrap_or_default().into();
        let books = ctx.services().catalog.books(&filter).await.extend()?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    async fn single_book(&self, ctx: &Context<'_>, book_id: String) -> Result<Book> {
        let book = ctx.services().catalog.book(&book_id).await.extend()?;
        Ok(Book::from(book))
    }

    /// Books written by the signed-in author
    async fn author_book(&self, ctx: &Context<'_>) -> Result<Vec<Book>> {
        let user = verify_header(ctx).await?;
        let books = ctx.services().catalog.author_books(&user).await.extend()?;
        Ok(books.into_iter().map(Book::from).collect())
    }
}

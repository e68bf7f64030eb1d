use super::prelude::*;

#[derive(Default)]
pub struct LibraryQueries;

#[Object]
impl LibraryQueries {
    /// Books in the signed-in user's library
    async fn display_library(&self, ctx: &Context<'_>) -> Result<Vec<Book>> {
        let user = verify_header(ctx).await?;
        let books = ctx.services().reading.library(&user).await.extend()?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    /// Reading progress for every book in the signed-in user's library
    async fn library_status(&self, ctx: &Context<'_>) -> Result<Vec<ReadingStatus>> {
        let user = verify_header(ctx).await?;
        let statuses = ctx.services().reading.statuses(&user).await.extend()?;
        Ok(statuses.into_iter().map(ReadingStatus::from).collect())
    }
}

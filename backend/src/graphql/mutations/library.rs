use super::prelude::*;

#[derive(Default)]
pub struct LibraryMutations;

#[Object]
impl LibraryMutations {
    async fn add_book_to_library(
        &self,
        ctx: &Context<'_>,
        book_id: String,
    ) -> Result<ReadingStatus> {
        let user = verify_header(ctx).await?;
        let status = ctx
            .services()
            .reading
            .add_to_library(&user, &book_id)
            .await
            .extend()?;
        Ok(ReadingStatus::from(status))
    }

    async fn remove_book_from_library(&self, ctx: &Context<'_>, book_id: String) -> Result<bool> {
        let user = verify_header(ctx).await?;
        ctx.services()
            .reading
            .remove_from_library(&user, &book_id)
            .await
            .extend()?;
        Ok(true)
    }

    /// Mark a library book as being read
    async fn read_book(&self, ctx: &Context<'_>, book_id: String) -> Result<ReadingStatus> {
        let user = verify_header(ctx).await?;
        let status = ctx
            .services()
            .reading
            .read_book(&user, &book_id)
            .await
            .extend()?;
        Ok(ReadingStatus::from(status))
    }

    /// Stop reading at `page_no`; reaching the last page marks the book read
    async fn close_book(
        &self,
        ctx: &Context<'_>,
        book_id: String,
        page_no: i64,
    ) -> Result<ReadingStatus> {
        let user = verify_header(ctx).await?;
        let status = ctx
            .services()
            .reading
            .close_book(&user, &book_id, page_no)
            .await
            .extend()?;
        Ok(ReadingStatus::from(status))
    }
}

use super::prelude::*;

#[derive(Default)]
pub struct ReviewMutations;

#[Object]
impl ReviewMutations {
    /// Review a book; `rating` must be within 0 and 5
    async fn create_review(
        &self,
        ctx: &Context<'_>,
        book_id: String,
        rating: i64,
        comment: String,
    ) -> Result<Review> {
        let user = verify_header(ctx).await?;
        let review = ctx
            .services()
            .reviews
            .create_review(&user, &book_id, rating, &comment)
            .await
            .extend()?;
        Ok(Review::from(review))
    }

    async fn delete_review(&self, ctx: &Context<'_>, review_id: String) -> Result<bool> {
        let user = verify_header(ctx).await?;
        ctx.services()
            .reviews
            .delete_review(&user, &review_id)
            .await
            .extend()?;
        Ok(true)
    }
}

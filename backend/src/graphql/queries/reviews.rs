use super::prelude::*;

#[derive(Default)]
pub struct ReviewQueries;

#[Object]
impl ReviewQueries {
    async fn reviews(&self, ctx: &Context<'_>, book_id: String) -> Result<Vec<Review>> {
        let reviews = ctx
            .services()
            .reviews
            .reviews_for_book(&book_id)
            .await
            .extend()?;
        Ok(reviews.into_iter().map(Review::from).collect())
    }
}

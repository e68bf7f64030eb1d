use super::prelude::*;
use crate::db::GenreFilter;
use crate::graphql::filters::GenreFilterInput;

#[derive(Default)]
pub struct GenreQueries;

#[Object]
impl GenreQueries {
    async fn single_genre(&self, ctx: &Context<'_>, genre_id: String) -> Result<Genre> {
        let genre = ctx.services().catalog.genre(&genre_id).await.extend()?;
        Ok(Genre::from(genre))
    }

    async fn all_genre(&self, ctx: &Context<'_>) -> Result<Vec<Genre>> {
        let genres = ctx
            .services()
            .catalog
            .genres(&GenreFilter::default())
            .await
            .extend()?;
        Ok(genres.into_iter().map(Genre::from).collect())
    }

    /// Genres matching name/description filters
    async fn genres(
        &self,
        ctx: &Context<'_>,
        filter: Option<GenreFilterInput>,
    ) -> Result<Vec<Genre>> {
        let filter: GenreFilter = filter.unwrap_or_default().into();
        let genres = ctx.services().catalog.genres(&filter).await.extend()?;
        Ok(genres.into_iter().map(Genre::from).collect())
    }
}

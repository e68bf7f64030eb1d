use super::prelude::*;
use crate::db::UpdateGenre;

#[derive(Default)]
pub struct GenreMutations;

#[Object]
impl GenreMutations {
    async fn create_genre(
        &self,
        ctx: &Context<'_>,
        name: String,
        description: String,
    ) -> Result<Genre> {
        verify_header(ctx).await?;
        let genre = ctx
            .services()
            .catalog
            .create_genre(&name, &description)
            .await
            .extend()?;
        Ok(Genre::from(genre))
    }

    /// Omitted fields keep their current value
    async fn edit_genre(
        &self,
        ctx: &Context<'_>,
        genre_id: String,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Genre> {
        verify_header(ctx).await?;
        let genre = ctx
            .services()
            .catalog
            .edit_genre(&genre_id, UpdateGenre { name, description })
            .await
            .extend()?;
        Ok(Genre::from(genre))
    }

    async fn delete_genre(&self, ctx: &Context<'_>, genre_id: String) -> Result<bool> {
        verify_header(ctx).await?;
        ctx.services().catalog.delete_genre(&genre_id).await.extend()?;
        Ok(true)
    }
}

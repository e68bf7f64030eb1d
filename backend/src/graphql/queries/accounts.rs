use super::prelude::*;
use crate::db::Database;
use crate::error::Error;
use crate::services::{Role, require_role};

#[derive(Default)]
pub struct AccountQueries;

#[Object]
impl AccountQueries {
    /// The signed-in user
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let user = verify_header(ctx).await?;
        Ok(User::from(user))
    }

    /// All users (admin only)
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let user = verify_header(ctx).await?;
        require_role(&user, Role::Admin).extend()?;

        let users = ctx
            .data_unchecked::<Database>()
            .users()
            .list_all()
            .await
            .map_err(Error::from)
            .extend()?;
        Ok(users.into_iter().map(User::from).collect())
    }

    /// Every author profile
    async fn all_author(&self, ctx: &Context<'_>) -> Result<Vec<Author>> {
        let authors = ctx
            .data_unchecked::<Database>()
            .profiles()
            .list_authors()
            .await
            .map_err(Error::from)
            .extend()?;
        Ok(authors.into_iter().map(Author::from).collect())
    }
}

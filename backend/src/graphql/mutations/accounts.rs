//! Account mutations
//!
//! `signup` and `login` are open; everything else needs a valid session.

use chrono::NaiveDate;

use super::prelude::*;
use crate::services::SignupInput;

#[derive(Default)]
pub struct AccountMutations;

#[Object]
impl AccountMutations {
    /// Register a new user
    #[allow(clippy::too_many_arguments)]
    async fn signup(
        &self,
        ctx: &Context<'_>,
        email: String,
        username: String,
        first_name: String,
        last_name: String,
        password: String,
        confirm_password: String,
    ) -> Result<User> {
        let user = ctx
            .services()
            .auth
            .signup(SignupInput {
                email,
                username,
                first_name,
                last_name,
                password,
                confirm_password,
            })
            .await
            .extend()?;
        Ok(User::from(user))
    }

    /// Exchange credentials for the session token
    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> Result<LoginPayload> {
        let result = ctx.services().auth.login(&email, &password).await.extend()?;
        Ok(LoginPayload {
            user: User::from(result.user),
            token: result.token,
        })
    }

    async fn logout(&self, ctx: &Context<'_>) -> Result<bool> {
        let user = verify_header(ctx).await?;
        ctx.services().auth.logout(&user).await.extend()?;
        Ok(true)
    }

    async fn become_patron(
        &self,
        ctx: &Context<'_>,
        address: String,
        phone_number: String,
    ) -> Result<Patron> {
        let user = verify_header(ctx).await?;
        let patron = ctx
            .services()
            .auth
            .become_patron(&user, &address, &phone_number)
            .await
            .extend()?;
        Ok(Patron::from(patron))
    }

    /// `birthdate` is `YYYY-MM-DD`
    async fn become_author(
        &self,
        ctx: &Context<'_>,
        birthdate: NaiveDate,
        nationality: String,
    ) -> Result<Author> {
        let user = verify_header(ctx).await?;
        let author = ctx
            .services()
            .auth
            .become_author(&user, birthdate, &nationality)
            .await
            .extend()?;
        Ok(Author::from(author))
    }
}

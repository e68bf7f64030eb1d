//! GraphQL authentication context
//!
//! The HTTP handler attaches the raw `Authorization` value to each request as
//! [`AuthToken`]. Resolvers call [`verify_header`] before touching any state;
//! role and ownership checks happen inside the services.

use async_graphql::{Context, Result, ResultExt};

use crate::db::UserRecord;
use crate::services::Services;

/// Raw authorization value carried by the request, if any
#[derive(Debug, Clone, Default)]
pub struct AuthToken(pub Option<String>);

impl AuthToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Extension trait for pulling shared state out of the GraphQL context
pub trait AuthExt {
    fn services(&self) -> &Services;

    /// The authorization value the request carried
    fn auth_token(&self) -> Option<&str>;
}

impl<'a> AuthExt for Context<'a> {
    fn services(&self) -> &Services {
        self.data_unchecked::<Services>()
    }

    fn auth_token(&self) -> Option<&str> {
        self.data_opt::<AuthToken>().and_then(AuthToken::as_deref)
    }
}

/// Resolve the calling user from the request's token, or fail with
/// `UNAUTHENTICATED`, `INVALID_TOKEN` or `TOKEN_EXPIRED`
pub async fn verify_header(ctx: &Context<'_>) -> Result<UserRecord> {
    ctx.services()
        .auth
        .verify_header(ctx.auth_token())
        .await
        .extend()
}

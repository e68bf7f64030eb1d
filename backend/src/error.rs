//! Domain error taxonomy
//!
//! Service code returns [`Result`]; resolvers turn an [`Error`] into a GraphQL
//! error with a `code` extension through [`ErrorExtensions`].

use async_graphql::ErrorExtensions;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("User has not Login")]
    Unauthenticated,

    #[error("Authorization Token is Invalid")]
    InvalidToken,

    #[error("Token has Expired")]
    TokenExpired,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid credentials. Please try again.")]
    InvalidCredentials,

    /// Storage or other infrastructure failure. The detail is logged, never
    /// sent to the client.
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl Error {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// Machine-readable code placed in `extensions.code`
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl ErrorExtensions for Error {
    fn extend(&self) -> async_graphql::Error {
        if let Self::Internal(source) = self {
            tracing::error!(error = ?source, "Internal error while resolving request");
        }
        let code = self.code();
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(Error::Unauthenticated.to_string(), "User has not Login");
        assert_eq!(Error::InvalidToken.to_string(), "Authorization Token is Invalid");
        assert_eq!(Error::TokenExpired.to_string(), "Token has Expired");
        assert_eq!(Error::NotFound("Book").to_string(), "Book not found");
        assert_eq!(
            Error::forbidden("User is not an author").to_string(),
            "User is not an author"
        );
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = Error::from(anyhow::anyhow!("disk I/O error at page 42"));
        assert_eq!(err.to_string(), "Internal server error");
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_extension_code() {
        let gql = Error::TokenExpired.extend();
        assert_eq!(gql.message, "Token has Expired");
        let code = gql
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(async_graphql::Value::from("TOKEN_EXPIRED")));
    }
}

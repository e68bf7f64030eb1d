//! Authentication service
//!
//! Provides:
//! - Signup and login (bcrypt password hashes)
//! - Session token issuance with a compare-and-swap on the user's token slot
//! - `verify_header`, the gate every restricted operation passes first
//! - Patron/author profile creation and superuser bootstrap

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{AdminAccount, Config};
use crate::db::sqlite_helpers::{is_unique_violation, today};
use crate::db::{
    AuthorRecord, CreateAuthor, CreatePatron, CreateUser, Database, PatronRecord, UserRecord,
};
use crate::error::{Error, Result};
use crate::services::session_token::SessionTokens;

/// Attempts at assigning a token before giving up on a contended slot
const TOKEN_ASSIGN_ATTEMPTS: usize = 3;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)+$")
        .expect("valid email pattern")
});

// ============================================================================
// Auth Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
}

/// Successful login: the refreshed user row and the token now stored on it
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: UserRecord,
    pub token: String,
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub session_token_ttl_secs: i64,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secret_key: config.secret_key.clone(),
            session_token_ttl_secs: config.session_token_ttl_secs,
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

// ============================================================================
// Auth Service
// ============================================================================

#[derive(Clone)]
pub struct AuthService {
    db: Database,
    tokens: Arc<SessionTokens>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(db: Database, config: AuthConfig) -> anyhow::Result<Self> {
        let tokens = SessionTokens::new(&config.secret_key, config.session_token_ttl_secs)?;
        Ok(Self {
            db,
            tokens: Arc::new(tokens),
            bcrypt_cost: config.bcrypt_cost,
        })
    }

    pub fn tokens(&self) -> &SessionTokens {
        &self.tokens
    }

    // ========================================================================
    // Signup
    // ========================================================================

    pub async fn signup(&self, input: SignupInput) -> Result<UserRecord> {
        if input.password != input.confirm_password {
            return Err(Error::validation("Password does not match"));
        }
        if input.password.is_empty() {
            return Err(Error::validation("Password cannot be empty"));
        }

        let email = normalize_email(&input.email)?;
        let username = input.username.trim().to_string();
        if username.is_empty() {
            return Err(Error::validation("Username cannot be empty"));
        }

        let users = self.db.users();
        if users.get_by_email(&email).await?.is_some() {
            return Err(Error::validation("User with this email already exists"));
        }
        if users.get_by_username(&username).await?.is_some() {
            return Err(Error::validation("User with this username already exists"));
        }

        let password_hash = self.hash_password(&input.password)?;
        let user = users
            .create(CreateUser {
                email,
                username,
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                password_hash,
                is_admin: false,
                is_patron: false,
                is_author: false,
            })
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::validation("User with this email or username already exists")
                } else {
                    Error::Internal(e)
                }
            })?;

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    // ========================================================================
    // Login / Logout
    // ========================================================================

    /// Check credentials and hand out the user's session token.
    ///
    /// A still-valid stored token is returned as is. Otherwise a fresh token
    /// is written only if the slot still holds what was read; when another
    /// login wins the race its token is adopted on the next pass.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult> {
        let users = self.db.users();
        let email = email.trim();

        let Some(mut user) = users.get_by_email(email).await? else {
            tracing::debug!("Login failed: unknown email");
            return Err(Error::InvalidCredentials);
        };
        if !self.verify_password(password, &user.password_hash)? || !user.is_active {
            tracing::debug!(user_id = %user.id, "Login failed: bad password or inactive");
            return Err(Error::InvalidCredentials);
        }

        for _ in 0..TOKEN_ASSIGN_ATTEMPTS {
            if let Some(current) = user.token.as_deref()
                && self.tokens.check_token(&user, current)
            {
                let token = current.to_string();
                return self.finish_login(user, token).await;
            }

            let token = self.tokens.make_token(&user);
            if users.swap_token(&user.id, user.token.as_deref(), &token).await? {
                return self.finish_login(user, token).await;
            }

            tracing::debug!(user_id = %user.id, "Token slot changed during login, re-reading");
            user = users
                .get_by_id(&user.id)
                .await?
                .ok_or(Error::InvalidCredentials)?;
        }

        Err(Error::Internal(anyhow::anyhow!(
            "could not assign session token for user {} after {} attempts",
            user.id,
            TOKEN_ASSIGN_ATTEMPTS
        )))
    }

    async fn finish_login(&self, user: UserRecord, token: String) -> Result<LoginResult> {
        let users = self.db.users();
        users.update_last_login(&user.id).await?;
        let user = users.get_by_id(&user.id).await?.unwrap_or(user);
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginResult { user, token })
    }

    /// Drop the session `user` was resolved with
    pub async fn logout(&self, user: &UserRecord) -> Result<()> {
        if let Some(token) = user.token.as_deref() {
            self.db.users().clear_token_if(&user.id, token).await?;
        }
        tracing::info!(user_id = %user.id, "User logged out");
        Ok(())
    }

    // ========================================================================
    // Session Gate
    // ========================================================================

    /// Resolve the caller from the raw authorization value.
    ///
    /// Missing value -> `Unauthenticated`; no user holds it -> `InvalidToken`;
    /// held but no longer valid -> the slot is cleared and `TokenExpired`.
    pub async fn verify_header(&self, authorization: Option<&str>) -> Result<UserRecord> {
        let token = authorization
            .map(str::trim)
            .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).trim())
            .filter(|v| !v.is_empty())
            .ok_or(Error::Unauthenticated)?;

        let users = self.db.users();
        let user = users.get_by_token(token).await?.ok_or(Error::InvalidToken)?;

        if self.tokens.check_token(&user, token) {
            return Ok(user);
        }

        users.clear_token_if(&user.id, token).await?;
        tracing::info!(user_id = %user.id, "Session token expired, cleared");
        Err(Error::TokenExpired)
    }

    // ========================================================================
    // Profiles
    // ========================================================================

    pub async fn become_patron(
        &self,
        user: &UserRecord,
        address: &str,
        phone_number: &str,
    ) -> Result<PatronRecord> {
        let profiles = self.db.profiles();
        if user.is_patron || profiles.get_patron_by_user(&user.id).await?.is_some() {
            return Err(Error::validation("User is already a patron"));
        }

        let patron = profiles
            .create_patron(
                &user.id,
                CreatePatron {
                    address: address.trim().to_string(),
                    phone_number: phone_number.trim().to_string(),
                },
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::validation("User is already a patron")
                } else {
                    Error::Internal(e)
                }
            })?;

        tracing::info!(user_id = %user.id, patron_id = %patron.patron_id, "User became a patron");
        Ok(patron)
    }

    pub async fn become_author(
        &self,
        user: &UserRecord,
        birthdate: NaiveDate,
        nationality: &str,
    ) -> Result<AuthorRecord> {
        if birthdate > today() {
            return Err(Error::validation("Birthdate cannot be in the future"));
        }

        let profiles = self.db.profiles();
        if user.is_author || profiles.get_author_by_user(&user.id).await?.is_some() {
            return Err(Error::validation("User is already an author"));
        }

        let author = profiles
            .create_author(
                &user.id,
                CreateAuthor {
                    birthdate,
                    nationality: nationality.trim().to_string(),
                },
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::validation("User is already an author")
                } else {
                    Error::Internal(e)
                }
            })?;

        tracing::info!(user_id = %user.id, author_id = %author.author_id, "User became an author");
        Ok(author)
    }

    // ========================================================================
    // Superuser Bootstrap
    // ========================================================================

    /// Create the configured superuser, or grant the flags if it exists
    pub async fn ensure_superuser(&self, admin: &AdminAccount) -> Result<UserRecord> {
        let users = self.db.users();
        let email = normalize_email(&admin.email)?;

        if let Some(existing) = users.get_by_email(&email).await? {
            if !existing.is_admin {
                users.promote_to_superuser(&existing.id).await?;
                tracing::info!(user_id = %existing.id, "Promoted existing user to superuser");
            }
            return users
                .get_by_id(&existing.id)
                .await?
                .ok_or(Error::NotFound("User"));
        }

        let password_hash = self.hash_password(&admin.password)?;
        let user = users
            .create(CreateUser {
                email,
                username: admin.username.clone(),
                first_name: String::new(),
                last_name: String::new(),
                password_hash,
                is_admin: true,
                is_patron: true,
                is_author: true,
            })
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::validation(format!(
                        "Username '{}' belongs to another user; set ADMIN_USERNAME to a free name",
                        admin.username
                    ))
                } else {
                    Error::Internal(e)
                }
            })?;

        tracing::info!(user_id = %user.id, "Created superuser");
        Ok(user)
    }

    // ========================================================================
    // Password Helpers
    // ========================================================================

    fn hash_password(&self, password: &str) -> Result<String> {
        hash(password, self.bcrypt_cost)
            .map_err(|e| Error::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        verify(password, hash)
            .map_err(|e| Error::Internal(anyhow::anyhow!("Failed to verify password: {}", e)))
    }
}

/// Validate an email address and lowercase its domain part
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim();
    if !EMAIL_RE.is_match(email) {
        return Err(Error::validation("Enter a valid email address"));
    }
    match email.rsplit_once('@') {
        Some((local, domain)) => Ok(format!("{}@{}", local, domain.to_lowercase())),
        None => Err(Error::validation("Enter a valid email address")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email(" Ada@Example.COM ").unwrap(), "Ada@example.com");
    }

    #[test]
    fn test_normalize_email_rejects_garbage() {
        for bad in ["", "plain", "a@", "@x.com", "a@x", "a b@x.com"] {
            assert_matches!(normalize_email(bad), Err(Error::Validation(_)), "{:?}", bad);
        }
    }
}

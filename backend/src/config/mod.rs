//! Application configuration management

use std::env;

use anyhow::{Context, Result};
use base64::Engine;

/// Default lifetime of a session token (one day)
pub const DEFAULT_SESSION_TOKEN_TTL_SECS: i64 = 86_400;

/// Default fine charged for an overdue or lost loan
pub const DEFAULT_OVERDUE_FINE_AMOUNT: i64 = 400;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind host
    pub host: String,

    /// Server port
    pub port: u16,

    /// SQLite URL, e.g. `sqlite:./data/libris.db`
    pub database_url: String,

    pub database_max_connections: u32,

    /// Server secret used to key session tokens
    pub secret_key: String,

    /// True when SECRET_KEY was not provided and a random one was generated
    pub secret_key_generated: bool,

    /// Maximum token age in seconds
    pub session_token_ttl_secs: i64,

    pub overdue_fine_amount: i64,

    pub bcrypt_cost: u32,

    /// Superuser created at startup when configured
    pub admin: Option<AdminAccount>,
}

#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Prefer DATABASE_PATH, fall back to DATABASE_URL
        let database_url = env::var("DATABASE_PATH")
            .or_else(|_| env::var("DATABASE_URL"))
            .map(|v| normalize_database_url(&v))
            .unwrap_or_else(|_| "sqlite:./data/libris.db".to_string());

        let (secret_key, secret_key_generated) = match env::var("SECRET_KEY") {
            Ok(key) if !key.trim().is_empty() => (key.trim().to_string(), false),
            _ => (generate_secret_key(), true),
        };

        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                let username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| {
                    email.split('@').next().unwrap_or("admin").to_string()
                });
                Some(AdminAccount {
                    email,
                    username,
                    password,
                })
            }
            _ => None,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url,

            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            secret_key,
            secret_key_generated,

            session_token_ttl_secs: parse_non_negative(
                "SESSION_TOKEN_TTL_SECS",
                env::var("SESSION_TOKEN_TTL_SECS").ok(),
                DEFAULT_SESSION_TOKEN_TTL_SECS,
            )?,

            overdue_fine_amount: parse_non_negative(
                "OVERDUE_FINE_AMOUNT",
                env::var("OVERDUE_FINE_AMOUNT").ok(),
                DEFAULT_OVERDUE_FINE_AMOUNT,
            )?,

            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),

            admin,
        })
    }
}

/// Parse an optional integer setting that must not be negative
fn parse_non_negative(name: &str, value: Option<String>, default: i64) -> Result<i64> {
    let Some(raw) = value else {
        return Ok(default);
    };
    let parsed: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid {}", name))?;
    if parsed < 0 {
        anyhow::bail!("Invalid {}: must not be negative, got {}", name, parsed);
    }
    Ok(parsed)
}

/// Accept a bare file path as well as a `sqlite:` URL
fn normalize_database_url(value: &str) -> String {
    if value.starts_with("sqlite:") {
        value.to_string()
    } else {
        format!("sqlite:{}", value)
    }
}

/// Random 32-byte secret, base64 encoded
pub fn generate_secret_key() -> String {
    let mut bytes = [0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_database_url() {
        assert_eq!(normalize_database_url("./data/x.db"), "sqlite:./data/x.db");
        assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_database_url("sqlite:///var/lib/libris.db"),
            "sqlite:///var/lib/libris.db"
        );
    }

    #[test]
    fn test_parse_non_negative() {
        assert_eq!(parse_non_negative("TTL", None, 86_400).unwrap(), 86_400);
        assert_eq!(parse_non_negative("TTL", Some(" 60 ".to_string()), 1).unwrap(), 60);
        assert_eq!(parse_non_negative("TTL", Some("0".to_string()), 1).unwrap(), 0);

        let negative = parse_non_negative("TTL", Some("-5".to_string()), 1).unwrap_err();
        assert!(negative.to_string().contains("must not be negative"));
        assert!(parse_non_negative("TTL", Some("soon".to_string()), 1).is_err());
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = generate_secret_key();
        let b = generate_secret_key();
        assert_ne!(a, b);
        assert_eq!(a.len(), 44);
    }
}

//! Session token authority
//!
//! Tokens use the password-reset layout `<base36 timestamp>-<hex hmac>`. The
//! timestamp is seconds since 2001-01-01 UTC. The tag is HMAC-SHA256 over
//! `user_id || timestamp || is_active`, keyed with `SHA256(KEY_SALT || secret)`
//! and truncated to 16 bytes.
//!
//! Validation recomputes the tag from the embedded timestamp, compares it in
//! constant time and then checks the token's age against the TTL. Flipping
//! `is_active` therefore invalidates every outstanding token for that user.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Unix time of 2001-01-01T00:00:00Z
const TOKEN_EPOCH_UNIX: i64 = 978_307_200;

const KEY_SALT: &str = "libris.services.session_token.SessionTokens";

/// Bytes of the HMAC tag kept in the token (32 hex chars)
const TAG_LEN: usize = 16;

/// Longest base36 rendering of a positive i64
const MAX_TIMESTAMP_DIGITS: usize = 13;

/// The identity fields a token is bound to
pub trait TokenSubject {
    fn subject_id(&self) -> &str;
    fn subject_active(&self) -> bool;
}

impl TokenSubject for crate::db::UserRecord {
    fn subject_id(&self) -> &str {
        &self.id
    }

    fn subject_active(&self) -> bool {
        self.is_active
    }
}

#[derive(Clone)]
pub struct SessionTokens {
    mac: HmacSha256,
    ttl_secs: i64,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl SessionTokens {
    pub fn new(secret: &str, ttl_secs: i64) -> anyhow::Result<Self> {
        let key = Sha256::new()
            .chain_update(KEY_SALT.as_bytes())
            .chain_update(secret.as_bytes())
            .finalize();
        let mac = HmacSha256::new_from_slice(&key)
            .map_err(|e| anyhow::anyhow!("Invalid session token key: {}", e))?;
        Ok(Self { mac, ttl_secs })
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a token for `subject` stamped with the current time
    pub fn make_token(&self, subject: &impl TokenSubject) -> String {
        self.make_token_at(subject, now_timestamp())
    }

    /// Issue a token stamped with `timestamp` (seconds since the token epoch)
    pub fn make_token_at(&self, subject: &impl TokenSubject, timestamp: i64) -> String {
        let tag = self.tag(subject, timestamp);
        format!("{}-{}", int_to_base36(timestamp), hex::encode(&tag[..TAG_LEN]))
    }

    /// True when `token` was issued for `subject` and is within the TTL
    pub fn check_token(&self, subject: &impl TokenSubject, token: &str) -> bool {
        self.check_token_at(subject, token, now_timestamp())
    }

    pub fn check_token_at(&self, subject: &impl TokenSubject, token: &str, now: i64) -> bool {
        let Some((ts_part, tag_part)) = token.split_once('-') else {
            return false;
        };
        if tag_part.contains('-') {
            return false;
        }
        let Some(timestamp) = base36_to_int(ts_part) else {
            return false;
        };
        let Ok(presented) = hex::decode(tag_part) else {
            return false;
        };
        if presented.len() != TAG_LEN {
            return false;
        }

        let mut mac = self.mac.clone();
        mac.update(message(subject, timestamp).as_bytes());
        if mac.verify_truncated_left(&presented).is_err() {
            return false;
        }

        now.saturating_sub(timestamp) <= self.ttl_secs
    }

    fn tag(&self, subject: &impl TokenSubject, timestamp: i64) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(message(subject, timestamp).as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

fn message(subject: &impl TokenSubject, timestamp: i64) -> String {
    format!(
        "{}{}{}",
        subject.subject_id(),
        timestamp,
        subject.subject_active()
    )
}

/// Seconds since 2001-01-01 UTC
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp() - TOKEN_EPOCH_UNIX
}

// ============================================================================
// Base36
// ============================================================================

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Lowercase base36; negative input renders as `0`
pub fn int_to_base36(value: i64) -> String {
    if value <= 0 {
        return "0".to_string();
    }
    let mut n = value as u64;
    let mut out = Vec::new();
    while n > 0 {
        out.push(BASE36_DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Parse base36 (either case). Rejects empty, signed, over-long or
/// non-alphanumeric input.
pub fn base36_to_int(s: &str) -> Option<i64> {
    if s.is_empty() || s.len() > MAX_TIMESTAMP_DIGITS {
        return None;
    }
    if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    i64::from_str_radix(s, 36).ok()
}

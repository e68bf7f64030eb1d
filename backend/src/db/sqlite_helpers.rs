//! SQLite helper utilities for type conversion
//!
//! SQLite has no native UUID, boolean or date types; these helpers keep the
//! TEXT/INTEGER encodings consistent across repositories.

use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Fresh v4 UUID as stored in TEXT primary keys
#[inline]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Timestamp Helpers
// ============================================================================

/// Current UTC time as RFC 3339 text
#[inline]
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339()
}

/// Today's date (UTC) as `YYYY-MM-DD`
#[inline]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ============================================================================
// Boolean Helpers
// ============================================================================

#[inline]
pub fn bool_to_int(b: bool) -> i32 {
    if b { 1 } else { 0 }
}

// ============================================================================
// LIKE Helpers
// ============================================================================

/// Escape `%`, `_` and `\` so user input matches literally inside a LIKE
/// pattern written with `ESCAPE '\'`
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `%value%`
pub fn like_contains(input: &str) -> String {
    format!("%{}%", escape_like(input))
}

/// `value%`
pub fn like_starts_with(input: &str) -> String {
    format!("{}%", escape_like(input))
}

/// `%value`
pub fn like_ends_with(input: &str) -> String {
    format!("%{}", escape_like(input))
}

// ============================================================================
// Error Helpers
// ============================================================================

/// True when a repository error is a UNIQUE constraint failure
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|e| e.is_unique_violation())
}

// ============================================================================
// Filter Helpers
// ============================================================================

/// How a text filter compares a column with the supplied value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    Exact,
    Contains,
    StartsWith,
    EndsWith,
}

/// Append ` AND <column> <op> ?` to a filter query. All modes are
/// case-insensitive for ASCII.
pub fn push_text_filter(
    qb: &mut QueryBuilder<'_, Sqlite>,
    column: &str,
    mode: TextMatch,
    value: &str,
) {
    qb.push(" AND ").push(column);
    match mode {
        TextMatch::Exact => {
            qb.push(" = ").push_bind(value.to_string()).push(" COLLATE NOCASE");
        }
        TextMatch::Contains => {
            qb.push(" LIKE ").push_bind(like_contains(value)).push(" ESCAPE '\\'");
        }
        TextMatch::StartsWith => {
            qb.push(" LIKE ").push_bind(like_starts_with(value)).push(" ESCAPE '\\'");
        }
        TextMatch::EndsWith => {
            qb.push(" LIKE ").push_bind(like_ends_with(value)).push(" ESCAPE '\\'");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_like_patterns() {
        assert_eq!(like_contains("dune"), "%dune%");
        assert_eq!(like_starts_with("the"), "the%");
        assert_eq!(like_ends_with("ion"), "%ion");
    }

    #[test]
    fn test_push_text_filter_sql() {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM genres WHERE 1 = 1");
        push_text_filter(&mut qb, "name", TextMatch::Exact, "Horror");
        push_text_filter(&mut qb, "description", TextMatch::Contains, "ghost");
        assert_eq!(
            qb.sql(),
            "SELECT * FROM genres WHERE 1 = 1 AND name = ? COLLATE NOCASE AND description LIKE ? ESCAPE '\\'"
        );
    }

    #[test]
    fn test_bool_to_int() {
        assert_eq!(bool_to_int(true), 1);
        assert_eq!(bool_to_int(false), 0);
    }

    #[test]
    fn test_new_id_is_uuid() {
        let id = new_id();
        assert!(Uuid::parse_str(&id).is_ok());
    }
}

//! GraphQL filter input types

use async_graphql::InputObject;

use crate::db::sqlite_helpers::TextMatch;
use crate::db::{BookFilter, GenreFilter};

/// Filter for string fields; every set operator must match (case-insensitive)
#[derive(InputObject, Default, Clone, Debug)]
pub struct StringFilter {
    /// Equals
    pub eq: Option<String>,
    /// Contains substring
    pub contains: Option<String>,
    /// Starts with
    pub starts_with: Option<String>,
    /// Ends with
    pub ends_with: Option<String>,
}

impl StringFilter {
    fn into_matches(self) -> Vec<(TextMatch, String)> {
        [
            (TextMatch::Exact, self.eq),
            (TextMatch::Contains, self.contains),
            (TextMatch::StartsWith, self.starts_with),
            (TextMatch::EndsWith, self.ends_with),
        ]
        .into_iter()
        .filter_map(|(mode, value)| value.map(|v| (mode, v)))
        .collect()
    }
}

fn matches(filter: Option<StringFilter>) -> Vec<(TextMatch, String)> {
    filter.map(StringFilter::into_matches).unwrap_or_default()
}

#[derive(InputObject, Default, Clone, Debug)]
pub struct GenreFilterInput {
    pub name: Option<StringFilter>,
    pub description: Option<StringFilter>,
}

impl From<GenreFilterInput> for GenreFilter {
    fn from(input: GenreFilterInput) -> Self {
        Self {
            name: matches(input.name),
            description: matches(input.description),
        }
    }
}

#[derive(InputObject, Default, Clone, Debug)]
pub struct BookFilterInput {
    /// Exact ISBN
    pub isbn: Option<String>,
    pub title: Option<StringFilter>,
    pub description: Option<StringFilter>,
}

impl From<BookFilterInput> for BookFilter {
    fn from(input: BookFilterInput) -> Self {
        Self {
            isbn: input.isbn,
            title: matches(input.title),
            description: matches(input.description),
        }
    }
}

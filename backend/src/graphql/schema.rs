//! GraphQL schema definition
//!
//! Queries and mutations are split per domain and merged here. Reads of the
//! public catalog are open; everything that writes, or reads per-user data,
//! resolves the caller through `verify_header` first.

use async_graphql::extensions::Tracing;
use async_graphql::{EmptySubscription, MergedObject, Schema};

use crate::db::Database;
use crate::services::Services;

use super::mutations::{
    AccountMutations, BookMutations, GenreMutations, LibraryMutations, ReviewMutations,
    TransactionMutations,
};
use super::queries::{
    AccountQueries, BookQueries, GenreQueries, LibraryQueries, ReviewQueries, TransactionQueries,
};

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    AccountQueries,
    GenreQueries,
    BookQueries,
    LibraryQueries,
    TransactionQueries,
    ReviewQueries,
);

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    AccountMutations,
    GenreMutations,
    BookMutations,
    LibraryMutations,
    TransactionMutations,
    ReviewMutations,
);

/// The GraphQL schema type
pub type LibrisSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the GraphQL schema with all resolvers
pub fn build_schema(db: Database, services: Services) -> LibrisSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .extension(Tracing)
        .data(db)
        .data(services)
        .finish()
}

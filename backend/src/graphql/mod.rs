//! GraphQL API
//!
//! The single API surface for the backend: `POST /graphql` executes,
//! `GET /graphql` serves GraphiQL to browsers.

pub mod auth;
pub mod filters;
pub mod http;
pub mod mutations;
pub mod queries;
mod schema;
pub mod types;

pub use auth::{AuthToken, verify_header};
pub use schema::{LibrisSchema, MutationRoot, QueryRoot, build_schema};

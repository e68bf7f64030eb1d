//! Libris backend - library management over GraphQL
//!
//! Accounts, catalog (books and genres), personal reading lists, loans and
//! reviews. Every restricted operation goes through the session token gate in
//! [`services::auth`] and the role/ownership checks in
//! [`services::authorization`].

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod services;

pub use app::AppState;
pub use error::{Error, Result};

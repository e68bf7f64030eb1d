//! Plain HTTP endpoints outside GraphQL

pub mod health;

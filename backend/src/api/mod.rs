//! API route definitions
//!
//! The primary API is GraphQL at /graphql (see [`crate::graphql::routes`]).
//! Plain HTTP endpoints here cover health checks.

pub mod health;

//! GraphQL API with subscriptions for real-time updates
//!
//! Query and mutation roots are merged from per-domain objects in `queries/`
//! and `mutations/`. Every resolver reports failures with the lowercase code
//! from [`ApiError`](crate::error::ApiError) as the message and a coarse
//! `extensions.code`.

pub mod auth;
pub mod loaders;
pub mod mutations;
pub mod pagination;
pub mod queries;
pub mod routes;
mod schema;
mod subscriptions;
pub mod types;

pub use schema::{MutationRoot, QueryRoot, ShowcaseSchema, build_schema};
pub use subscriptions::SubscriptionRoot;

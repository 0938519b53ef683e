pub mod auth;
pub mod categories;
pub mod favorites;
pub mod works;

pub use auth::AuthMutations;
pub use categories::CategoryMutations;
pub use favorites::FavoriteMutations;
pub use works::WorkMutations;

pub(crate) mod prelude {
    pub(crate) use std::sync::Arc;

    pub(crate) use async_graphql::{Context, ErrorExtensions, Object, Result};

    pub(crate) use crate::graphql::auth::AuthExt;
    pub(crate) use crate::graphql::types::*;
    pub(crate) use crate::services::{AuthService, CatalogService, FavoritesService};
}

pub mod categories;
pub mod favorites;
pub mod user;
pub mod works;

pub use categories::CategoryQueries;
pub use favorites::FavoriteQueries;
pub use user::UserQueries;
pub use works::WorkQueries;

pub(crate) mod prelude {
    pub(crate) use std::sync::Arc;

    pub(crate) use async_graphql::{Context, ErrorExtensions, Object, Result};

    pub(crate) use crate::db::PageRequest;
    pub(crate) use crate::graphql::auth::AuthExt;
    pub(crate) use crate::graphql::types::*;
    pub(crate) use crate::services::{CatalogService, FavoritesService};
}

//! GraphQL schema definition with queries, mutations, and subscriptions

use std::sync::Arc;

use async_graphql::dataloader::DataLoader;
use async_graphql::{MergedObject, Schema};

use crate::db::Database;
use crate::services::{AuthService, CatalogService, FavoritesService};

use super::loaders::{CategoryLoader, WorkLoader};
use super::mutations::{AuthMutations, CategoryMutations, FavoriteMutations, WorkMutations};
use super::queries::{CategoryQueries, FavoriteQueries, UserQueries, WorkQueries};
use super::subscriptions::SubscriptionRoot;

/// The GraphQL schema type
pub type ShowcaseSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(UserQueries, CategoryQueries, WorkQueries, FavoriteQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(AuthMutations, CategoryMutations, WorkMutations, FavoriteMutations);

/// Build the GraphQL schema with all resolvers
pub fn build_schema(
    db: Database,
    auth: Arc<AuthService>,
    catalog: Arc<CatalogService>,
    favorites: Arc<FavoritesService>,
) -> ShowcaseSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), SubscriptionRoot)
        .data(DataLoader::new(CategoryLoader::new(db.clone()), tokio::spawn))
        .data(DataLoader::new(WorkLoader::new(db.clone()), tokio::spawn))
        .data(db)
        .data(auth)
        .data(catalog)
        .data(favorites)
        .finish()
}

//! GraphQL DataLoaders for batching database queries
//!
//! A page of works resolves each `Work.category` through [`CategoryLoader`],
//! and a page of favorites resolves each `Favorite.work` through
//! [`WorkLoader`]. Lookups issued in the same tick are combined into one
//! `WHERE id IN (...)` query.
//!
//! ```ignore
//! let loader = ctx.data_unchecked::<DataLoader<CategoryLoader>>();
//! let category = loader.load_one(work.category_id).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dataloader::Loader;

use crate::db::Database;

use super::types::{Category, Work};

pub struct CategoryLoader {
    db: Database,
}

impl CategoryLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i64> for CategoryLoader {
    type Value = Category;
    type Error = Arc<anyhow::Error>;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        let records = self.db.categories().get_by_ids(keys).await.map_err(Arc::new)?;

        tracing::trace!(requested = keys.len(), loaded = records.len(), "Batch loaded categories");

        Ok(records
            .into_iter()
            .map(|record| (record.id, Category::from(record)))
            .collect())
    }
}

pub struct WorkLoader {
    db: Database,
}

impl WorkLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i64> for WorkLoader {
    type Value = Work;
    type Error = Arc<anyhow::Error>;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        let records = self.db.works().get_by_ids(keys).await.map_err(Arc::new)?;

        tracing::trace!(requested = keys.len(), loaded = records.len(), "Batch loaded works");

        Ok(records
            .into_iter()
            .map(|record| (record.id, Work::from(record)))
            .collect())
    }
}

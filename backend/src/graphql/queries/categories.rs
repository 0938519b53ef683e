use super::prelude::*;

#[derive(Default)]
pub struct CategoryQueries;

#[Object]
impl CategoryQueries {
    /// Get all categories
    async fn categories(&self, ctx: &Context<'_>) -> Result<CategoryConnection> {
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();
        let records = catalog.categories().await.map_err(|e| e.extend())?;
        Ok(CategoryConnection::from(records))
    }

    /// Get a specific category by ID
    async fn category(&self, ctx: &Context<'_>, id: i64) -> Result<Category> {
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();
        let record = catalog.category(id).await.map_err(|e| e.extend())?;
        Ok(Category::from(record))
    }
}

use super::prelude::*;

#[derive(Default)]
pub struct CategoryMutations;

#[Object]
impl CategoryMutations {
    /// Create a category (superuser)
    async fn create_category(
        &self,
        ctx: &Context<'_>,
        input: Option<CategoryInput>,
    ) -> Result<Category> {
        let name = CategoryInput::name(input)?;
        let su = ctx.superuser().await?;
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();

        let record = catalog
            .create_category(&su, &name)
            .await
            .map_err(|e| e.extend())?;
        Ok(Category::from(record))
    }

    /// Rename a category (superuser)
    async fn update_category(
        &self,
        ctx: &Context<'_>,
        id: i64,
        input: Option<CategoryInput>,
    ) -> Result<Category> {
        let name = CategoryInput::name(input)?;
        let su = ctx.superuser().await?;
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();

        let record = catalog
            .update_category(&su, id, &name)
            .await
            .map_err(|e| e.extend())?;
        Ok(Category::from(record))
    }

    /// Delete an empty category (superuser). Returns the deleted id.
    async fn delete_category(&self, ctx: &Context<'_>, id: i64) -> Result<i64> {
        let su = ctx.superuser().await?;
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();

        catalog
            .delete_category(&su, id)
            .await
            .map_err(|e| e.extend())
    }
}

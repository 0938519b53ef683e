use super::prelude::*;

#[derive(Default)]
pub struct WorkMutations;

#[Object]
impl WorkMutations {
    /// Create a work (superuser)
    async fn create_work(&self, ctx: &Context<'_>, input: Option<WorkInput>) -> Result<Work> {
        let draft = WorkInput::into_draft(input, ctx)?;
        let su = ctx.superuser().await?;
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();

        let record = catalog
            .create_work(&su, draft)
            .await
            .map_err(|e| e.extend())?;
        Ok(Work::from(record))
    }

    /// Replace every field of a work (superuser)
    async fn update_work(
        &self,
        ctx: &Context<'_>,
        id: i64,
        input: Option<WorkInput>,
    ) -> Result<Work> {
        let draft = WorkInput::into_draft(input, ctx)?;
        let su = ctx.superuser().await?;
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();

        let record = catalog
            .update_work(&su, id, draft)
            .await
            .map_err(|e| e.extend())?;
        Ok(Work::from(record))
    }

    /// Delete a work and every favorite of it (superuser). Returns the id.
    async fn delete_work(&self, ctx: &Context<'_>, id: i64) -> Result<i64> {
        let su = ctx.superuser().await?;
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();

        catalog.delete_work(&su, id).await.map_err(|e| e.extend())
    }
}

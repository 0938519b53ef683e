use super::prelude::*;

#[derive(Default)]
pub struct WorkQueries;

#[Object]
impl WorkQueries {
    /// Get works newest first.
    ///
    /// `page` selects a numbered page; otherwise `after` continues from a
    /// previous `endCursor`. Zero or negative values are ignored.
    async fn works(
        &self,
        ctx: &Context<'_>,
        page: Option<i64>,
        after: Option<i64>,
        category_id: Option<i64>,
    ) -> Result<WorkConnection> {
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();
        let page = catalog
            .works(category_id, PageRequest::new(page, after))
            .await
            .map_err(|e| e.extend())?;
        Ok(WorkConnection::from_page(page))
    }

    /// Get a specific work by ID
    async fn work(&self, ctx: &Context<'_>, id: i64) -> Result<Work> {
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();
        let record = catalog.work(id).await.map_err(|e| e.extend())?;
        Ok(Work::from(record))
    }
}

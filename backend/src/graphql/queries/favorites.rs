use super::prelude::*;

#[derive(Default)]
pub struct FavoriteQueries;

#[Object]
impl FavoriteQueries {
    /// Get the current user's favorites, most recently added first
    async fn my_favorites(
        &self,
        ctx: &Context<'_>,
        page: Option<i64>,
        after: Option<i64>,
    ) -> Result<FavoriteConnection> {
        let actor = ctx.actor().await?;
        let favorites = ctx.data_unchecked::<Arc<FavoritesService>>();
        let page = favorites
            .my_favorites(&actor, PageRequest::new(page, after))
            .await
            .map_err(|e| e.extend())?;
        Ok(FavoriteConnection::from_page(page))
    }

    /// Whether the current user has favorited a work
    async fn is_work_in_favorites(&self, ctx: &Context<'_>, id: i64) -> Result<bool> {
        let actor = ctx.actor().await?;
        let favorites = ctx.data_unchecked::<Arc<FavoritesService>>();
        favorites
            .is_work_in_favorites(&actor, id)
            .await
            .map_err(|e| e.extend())
    }
}

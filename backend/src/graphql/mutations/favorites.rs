use super::prelude::*;

#[derive(Default)]
pub struct FavoriteMutations;

#[Object]
impl FavoriteMutations {
    /// Mark a work as a favorite of the current user. Returns the work id.
    async fn add_favorite(&self, ctx: &Context<'_>, id: i64) -> Result<i64> {
        let actor = ctx.actor().await?;
        let favorites = ctx.data_unchecked::<Arc<FavoritesService>>();

        favorites
            .add_favorite(&actor, id)
            .await
            .map_err(|e| e.extend())
    }

    /// Unmark a work. Returns the work id even if it was not marked.
    async fn remove_favorite(&self, ctx: &Context<'_>, id: i64) -> Result<i64> {
        let actor = ctx.actor().await?;
        let favorites = ctx.data_unchecked::<Arc<FavoritesService>>();

        favorites
            .remove_favorite(&actor, id)
            .await
            .map_err(|e| e.extend())
    }
}

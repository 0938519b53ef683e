use super::prelude::*;

#[derive(Default)]
pub struct UserQueries;

#[Object]
impl UserQueries {
    /// Get the current authenticated user
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let actor = ctx.actor().await?;
        Ok(Some(User::from(actor)))
    }
}

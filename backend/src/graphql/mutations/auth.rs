//! Registration and login
//!
//! Neither mutation requires authentication.

use super::prelude::*;

#[derive(Default)]
pub struct AuthMutations;

#[Object]
impl AuthMutations {
    /// Create an account and return a token for it
    async fn register(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
        is_superuser: Option<bool>,
    ) -> Result<AuthPayload> {
        let auth = ctx.data_unchecked::<Arc<AuthService>>();
        let result = auth
            .register(&username, &password, is_superuser.unwrap_or(false))
            .await
            .map_err(|e| e.extend())?;
        Ok(AuthPayload::from(result))
    }

    /// Exchange a username and password for a token.
    ///
    /// With `superuserRequired`, non-superusers are refused.
    async fn login(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
        superuser_required: Option<bool>,
    ) -> Result<AuthPayload> {
        let auth = ctx.data_unchecked::<Arc<AuthService>>();
        let result = auth
            .login(&username, &password, superuser_required.unwrap_or(false))
            .await
            .map_err(|e| e.extend())?;
        Ok(AuthPayload::from(result))
    }
}

//! GraphQL authentication and authorization
//!
//! The HTTP layer stores the request's [`Credentials`] in the request data.
//! Resolvers that act on behalf of a user turn them into a capability:
//!
//! ```ignore
//! async fn add_favorite(&self, ctx: &Context<'_>, id: i64) -> Result<i64> {
//!     let actor = ctx.actor().await?;
//!     ...
//! }
//! ```
//!
//! Requests without credentials in their data are treated as anonymous.

use std::sync::Arc;

use async_graphql::{Context, ErrorExtensions, Result};
use async_trait::async_trait;

use crate::services::{Actor, AuthService, Credentials, Superuser};

/// Extension trait to resolve the acting user from GraphQL context
#[async_trait]
pub trait AuthExt {
    /// The authenticated user, or an UNAUTHENTICATED error
    async fn actor(&self) -> Result<Actor>;

    /// The authenticated user as a superuser, or a FORBIDDEN error
    async fn superuser(&self) -> Result<Superuser>;
}

#[async_trait]
impl AuthExt for Context<'_> {
    async fn actor(&self) -> Result<Actor> {
        let credentials = self.data_opt::<Credentials>().cloned().unwrap_or_default();
        let auth = self.data_unchecked::<Arc<AuthService>>();

        auth.authenticate(&credentials).await.map_err(|e| {
            tracing::debug!(error = %e, "Request authentication failed");
            e.extend()
        })
    }

    async fn superuser(&self) -> Result<Superuser> {
        let actor = self.actor().await?;
        actor.into_superuser().map_err(|e| e.extend())
    }
}

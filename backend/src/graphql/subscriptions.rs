//! GraphQL subscriptions for real-time updates
//!
//! Subscriptions allow clients to receive push updates over WebSocket.

use std::sync::Arc;

use async_graphql::{Context, Subscription};
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::services::CatalogService;

use super::types::Work;

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Receive every work created after subscribing
    async fn work_created<'ctx>(&self, ctx: &Context<'ctx>) -> impl Stream<Item = Work> + 'ctx {
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>().clone();
        let receiver = catalog.subscribe();

        BroadcastStream::new(receiver).filter_map(move |result| {
            let catalog = catalog.clone();
            async move {
                let event = match result {
                    Ok(event) => event,
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "workCreated subscriber lagged");
                        return None;
                    }
                };

                // The work may already be gone again
                match catalog.work(event.work_id).await {
                    Ok(record) => Some(Work::from(record)),
                    Err(e) => {
                        tracing::debug!(work_id = event.work_id, error = ?e, "Skipping workCreated event");
                        None
                    }
                }
            }
        })
    }
}

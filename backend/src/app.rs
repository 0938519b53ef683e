//! Application state and HTTP router construction.
//!
//! Used by [main] and by the router tests to build the Axum app.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Database;
use crate::graphql::ShowcaseSchema;

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub schema: ShowcaseSchema,
}

/// Build the full Axum router: health checks, /graphql, /graphql/ws, the
/// upload directories, and layers.
pub fn build_app(state: AppState) -> Router<()> {
    let cors = cors_layer(state.config.cors_origin.as_deref());

    Router::new()
        .merge(crate::api::health::router())
        .merge(crate::graphql::routes::router())
        .nest_service("/uploaded/models", ServeDir::new(&state.config.model_file_dir))
        .nest_service("/uploaded/covers", ServeDir::new(&state.config.cover_file_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match origin {
        None => cors.allow_origin(Any),
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => cors.allow_origin(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "Invalid CORS_ORIGIN; allowing any origin");
                cors.allow_origin(Any)
            }
        },
    }
}

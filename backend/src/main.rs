//! Showcase Backend - 3D model showcase service
//!
//! This is the main entry point for the showcase backend API.
//! All operations are exposed via GraphQL at /graphql. `showcase demo` fills
//! the database and upload directories with sample data instead of serving.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use showcase::cli::Command;
use showcase::config::Config;
use showcase::db::Database;
use showcase::graphql::build_schema;
use showcase::services::{
    AuthConfig, AuthService, CatalogService, DemoSeeder, FavoritesService, UploadStorage,
};
use showcase::{AppState, build_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "showcase=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let command = Command::from_args()?;
    tracing::info!(?command, "Starting showcase backend");

    let config = Arc::new(Config::from_env()?);
    tracing::info!("Configuration loaded");

    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;
    tracing::info!("Database connected");

    let storage = UploadStorage::new(&config.model_file_dir, &config.cover_file_dir);
    storage.ensure_dirs().await?;

    let auth = AuthService::new(db.clone(), AuthConfig::from(config.as_ref()));

    if command == Command::Demo {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;
        let seeder = DemoSeeder::new(
            db.clone(),
            auth,
            storage,
            http_client,
            config.demo_asset_url.clone(),
        );
        let result = seeder.run().await;
        db.close().await;
        return result;
    }

    let auth = Arc::new(auth);
    let catalog = Arc::new(CatalogService::new(db.clone(), storage, config.works_per_page));
    let favorites = Arc::new(FavoritesService::new(db.clone(), config.works_per_page));

    let schema = build_schema(db.clone(), auth, catalog, favorites);
    tracing::info!("GraphQL schema built");

    let state = AppState {
        config: config.clone(),
        db: db.clone(),
        schema,
    };
    let app = build_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);
    tracing::info!("GraphQL playground: http://localhost:{}/graphql", config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

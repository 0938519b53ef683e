//! Application configuration management

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use base64::Engine;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Allowed CORS origin. Any origin is allowed when unset.
    pub cors_origin: Option<String>,

    /// SQLite database path or `sqlite:` URL
    pub database_url: String,

    /// JWT secret for signing and verifying access tokens
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    pub access_token_lifetime: i64,

    /// Bcrypt cost factor
    pub bcrypt_cost: u32,

    /// Directory holding uploaded 3D model files
    pub model_file_dir: PathBuf,

    /// Directory holding uploaded cover images
    pub cover_file_dir: PathBuf,

    /// Page size for work and favorite listings
    pub works_per_page: i64,

    /// Base URL the `demo` command downloads sample models and covers from
    pub demo_asset_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_PATH")
            .or_else(|_| env::var("DATABASE_URL"))
            .unwrap_or_else(|_| "./data/showcase.db".to_string());

        // In production JWT_SECRET should be set explicitly; tokens signed with a
        // generated secret do not survive a restart.
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret.trim().to_string(),
            _ => {
                tracing::warn!("JWT_SECRET not set; generating an ephemeral development secret");
                generate_secret()
            }
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .context("Invalid PORT")?,

            cors_origin: env::var("CORS_ORIGIN").ok().filter(|s| !s.is_empty()),

            database_url,

            jwt_secret,

            access_token_lifetime: env::var("ACCESS_TOKEN_LIFETIME")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .context("Invalid ACCESS_TOKEN_LIFETIME")?,

            bcrypt_cost: parse_bcrypt_cost(env::var("BCRYPT_COST").ok().as_deref())?,

            model_file_dir: env::var("MODEL_FILE_DIR")
                .unwrap_or_else(|_| "./data/uploaded/models".to_string())
                .into(),

            cover_file_dir: env::var("COVER_FILE_DIR")
                .unwrap_or_else(|_| "./data/uploaded/covers".to_string())
                .into(),

            works_per_page: parse_page_size(env::var("WORKS_PER_PAGE").ok().as_deref())?,

            demo_asset_url: env::var("DEMO_ASSET_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| crate::services::demo::SAMPLE_MODELS_URL.to_string()),
        })
    }
}

/// Page size for listings; defaults to 10 and must be at least 1
fn parse_page_size(value: Option<&str>) -> Result<i64> {
    let size: i64 = value
        .unwrap_or("10")
        .parse()
        .context("Invalid WORKS_PER_PAGE")?;
    anyhow::ensure!(size >= 1, "WORKS_PER_PAGE must be at least 1, got {}", size);
    Ok(size)
}

/// Bcrypt cost; defaults to 12 and must lie in the range bcrypt accepts
fn parse_bcrypt_cost(value: Option<&str>) -> Result<u32> {
    let cost: u32 = value
        .unwrap_or("12")
        .parse()
        .context("Invalid BCRYPT_COST")?;
    anyhow::ensure!(
        (4..=31).contains(&cost),
        "BCRYPT_COST must be between 4 and 31, got {}",
        cost
    );
    Ok(cost)
}

fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

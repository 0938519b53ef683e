//! Authentication service for user accounts and JWT handling
//!
//! Provides:
//! - User registration and login
//! - Password hashing with bcrypt
//! - Access token issuing and validation
//! - Resolution of request credentials into an [`Actor`]

use anyhow::anyhow;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::db::{CreateUser, Database, UserRecord};
use crate::error::{ApiError, ApiResult};

use super::validation::validate_credentials;

// ============================================================================
// JWT Claims
// ============================================================================

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// User ID
    pub id: i64,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

// ============================================================================
// Request identity
// ============================================================================

/// What the client sent in its `Authorization` header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    #[default]
    Missing,
    /// Present but not of the form `Bearer <token>`
    Malformed,
    Bearer(String),
}

impl Credentials {
    pub fn from_header(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::Missing;
        };

        let words: Vec<&str> = value.split(' ').collect();
        match words.as_slice() {
            ["Bearer", token] => Self::Bearer((*token).to_string()),
            _ => Self::Malformed,
        }
    }
}

/// An authenticated user acting on a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub username: String,
    pub is_superuser: bool,
}

impl From<UserRecord> for Actor {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_superuser: user.is_superuser,
        }
    }
}

impl Actor {
    /// Upgrade to the superuser capability
    pub fn into_superuser(self) -> ApiResult<Superuser> {
        if self.is_superuser {
            Ok(Superuser(self))
        } else {
            Err(ApiError::NotSuperuser)
        }
    }
}

/// Proof that the acting user is a superuser. Only obtainable via
/// [`Actor::into_superuser`].
#[derive(Debug, Clone)]
pub struct Superuser(Actor);

impl Superuser {
    pub fn actor(&self) -> &Actor {
        &self.0
    }
}

/// Result of register or login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: UserRecord,
    pub access_token: String,
}

// ============================================================================
// Configuration
// ============================================================================

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 15 minutes)
    pub access_token_lifetime: i64,
    /// Bcrypt cost factor (default: 12)
    pub bcrypt_cost: u32,
}

impl From<&Config> for AuthConfig {
    fn from(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            access_token_lifetime: config.access_token_lifetime,
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

// ============================================================================
// Auth Service
// ============================================================================

#[derive(Clone)]
pub struct AuthService {
    db: Database,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: Database, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Register a new user and log them in
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        is_superuser: bool,
    ) -> ApiResult<LoginResult> {
        validate_credentials(username, password)?;

        let password_hash = self.hash_password(password).await?;
        let user = self
            .db
            .users()
            .create(CreateUser {
                username: username.to_string(),
                password_hash,
                is_superuser,
            })
            .await
            .map_err(ApiError::from_write)?;

        tracing::info!(user_id = user.id, is_superuser, "User registered");

        let access_token = self.issue_token(user.id)?;
        Ok(LoginResult { user, access_token })
    }

    /// Check a username/password pair and issue a token
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        superuser_required: bool,
    ) -> ApiResult<LoginResult> {
        validate_credentials(username, password)?;

        let user = self
            .db
            .users()
            .get_by_username(username)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        if !self.verify_password(password, &user.password_hash).await? {
            tracing::debug!(user_id = user.id, "Rejected login with wrong password");
            return Err(ApiError::PasswordIncorrect);
        }
        if superuser_required && !user.is_superuser {
            return Err(ApiError::NotSuperuser);
        }

        tracing::info!(user_id = user.id, "User logged in");

        let access_token = self.issue_token(user.id)?;
        Ok(LoginResult { user, access_token })
    }

    /// Resolve request credentials to the user they belong to
    pub async fn authenticate(&self, credentials: &Credentials) -> ApiResult<Actor> {
        let token = match credentials {
            Credentials::Missing => return Err(ApiError::NoAuthorization),
            Credentials::Malformed => return Err(ApiError::InvalidHeader),
            Credentials::Bearer(token) => token,
        };

        let claims = self.decode_token(token)?;
        let user = self
            .db
            .users()
            .get_by_id(claims.id)
            .await?
            .ok_or(ApiError::NoAuthorization)?;

        Ok(Actor::from(user))
    }

    /// Sign an access token for `user_id`
    pub fn issue_token(&self, user_id: i64) -> ApiResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            id: user_id,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.config.access_token_lifetime)).timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| anyhow!("Failed to create access token: {}", e))?;

        Ok(token)
    }

    /// Decode and validate an access token
    pub fn decode_token(&self, token: &str) -> ApiResult<AccessTokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "JWT verification failed");
            ApiError::JwtDecodeError
        })?;

        Ok(token_data.claims)
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    /// Hash a password with bcrypt off the async runtime
    async fn hash_password(&self, password: &str) -> ApiResult<String> {
        let password = password.to_string();
        let cost = self.config.bcrypt_cost;

        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| anyhow!("Password hashing task failed: {}", e))?
            .map_err(|e| anyhow!("Failed to hash password: {}", e))?;

        Ok(hashed)
    }

    async fn verify_password(&self, password: &str, hash: &str) -> ApiResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();

        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| anyhow!("Password verification task failed: {}", e))?
            .map_err(|e| anyhow!("Failed to verify password: {}", e))?;

        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    async fn service() -> AuthService {
        let db = Database::connect_in_memory().await.unwrap();
        AuthService::new(
            db,
            AuthConfig {
                jwt_secret: "test-secret".to_string(),
                access_token_lifetime: 900,
                bcrypt_cost: 4,
            },
        )
    }

    #[test]
    fn test_credentials_from_header() {
        assert_eq!(Credentials::from_header(None), Credentials::Missing);
        assert_eq!(
            Credentials::from_header(Some("Bearer abc.def")),
            Credentials::Bearer("abc.def".to_string())
        );
        assert_eq!(Credentials::from_header(Some("abc.def")), Credentials::Malformed);
        assert_eq!(Credentials::from_header(Some("Basic abc")), Credentials::Malformed);
        assert_eq!(
            Credentials::from_header(Some("Bearer  abc")),
            Credentials::Malformed
        );
        assert_eq!(Credentials::from_header(Some("bearer abc")), Credentials::Malformed);
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service().await;

        let registered = auth.register("alice", "secret", false).await.unwrap();
        assert_eq!(registered.user.username, "alice");
        assert_ne!(registered.user.password_hash, "secret");

        let logged_in = auth.login("alice", "secret", false).await.unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);

        let actor = auth
            .authenticate(&Credentials::Bearer(logged_in.access_token))
            .await
            .unwrap();
        assert_eq!(actor.username, "alice");
        assert!(!actor.is_superuser);
    }

    #[tokio::test]
    async fn test_register_errors() {
        let auth = service().await;

        assert_matches!(auth.register("", "secret", false).await, Err(ApiError::Invalid));
        assert_matches!(auth.register("bob", "abc", false).await, Err(ApiError::Invalid));

        auth.register("bob", "secret", false).await.unwrap();
        assert_matches!(
            auth.register("bob", "other-secret", true).await,
            Err(ApiError::Conflict)
        );
    }

    #[tokio::test]
    async fn test_login_errors() {
        let auth = service().await;
        auth.register("carol", "secret", false).await.unwrap();

        assert_matches!(
            auth.login("nobody", "secret", false).await,
            Err(ApiError::UserNotFound)
        );
        assert_matches!(
            auth.login("carol", "wrong!", false).await,
            Err(ApiError::PasswordIncorrect)
        );
        assert_matches!(
            auth.login("carol", "secret", true).await,
            Err(ApiError::NotSuperuser)
        );
    }

    #[tokio::test]
    async fn test_authenticate_errors() {
        let auth = service().await;

        assert_matches!(
            auth.authenticate(&Credentials::Missing).await,
            Err(ApiError::NoAuthorization)
        );
        assert_matches!(
            auth.authenticate(&Credentials::Malformed).await,
            Err(ApiError::InvalidHeader)
        );
        assert_matches!(
            auth.authenticate(&Credentials::Bearer("garbage".to_string())).await,
            Err(ApiError::JwtDecodeError)
        );

        // well-formed token for a user that does not exist
        let token = auth.issue_token(4242).unwrap();
        assert_matches!(
            auth.authenticate(&Credentials::Bearer(token)).await,
            Err(ApiError::NoAuthorization)
        );
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let mut auth = service().await;
        auth.config.access_token_lifetime = -60;

        let token = auth.issue_token(1).unwrap();
        assert_matches!(auth.decode_token(&token), Err(ApiError::JwtDecodeError));
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let auth = service().await;
        let mut other = auth.clone();
        other.config.jwt_secret = "other-secret".to_string();

        let token = other.issue_token(1).unwrap();
        assert_matches!(auth.decode_token(&token), Err(ApiError::JwtDecodeError));
    }

    #[test]
    fn test_superuser_capability() {
        let actor = Actor {
            id: 1,
            username: "root".to_string(),
            is_superuser: true,
        };
        let superuser = actor.clone().into_superuser().unwrap();
        assert_eq!(superuser.actor(), &actor);

        let plain = Actor {
            is_superuser: false,
            ..actor
        };
        assert_matches!(plain.into_superuser(), Err(ApiError::NotSuperuser));
    }
}

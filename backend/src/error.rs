//! API error codes
//!
//! Every failure a client can act on is one `ApiError` variant. Its `Display`
//! is the stable lowercase code clients match on; the GraphQL layer attaches a
//! coarse `extensions.code` through [`ErrorExtensions`].

use async_graphql::ErrorExtensions;

use crate::db::is_unique_violation;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid")]
    Invalid,
    #[error("conflict")]
    Conflict,
    #[error("user_not_found")]
    UserNotFound,
    #[error("password_incorrect")]
    PasswordIncorrect,
    #[error("not_superuser")]
    NotSuperuser,
    #[error("category_not_found")]
    CategoryNotFound,
    #[error("work_not_found")]
    WorkNotFound,
    #[error("not_empty")]
    NotEmpty,
    #[error("model_file_not_found")]
    ModelFileNotFound,
    #[error("cover_file_not_found")]
    CoverFileNotFound,
    #[error("no_authorization")]
    NoAuthorization,
    #[error("invalid_header")]
    InvalidHeader,
    #[error("jwt_decode_error")]
    JwtDecodeError,
    /// Details go to the log, never to the client
    #[error("internal_server_error")]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl ApiError {
    /// Classify a failed write: unique violations become `conflict`.
    pub fn from_write(err: anyhow::Error) -> Self {
        if is_unique_violation(&err) {
            Self::Conflict
        } else {
            Self::Internal(err)
        }
    }

    /// GraphQL `extensions.code`
    pub fn code(&self) -> &'static str {
        match self {
            Self::Invalid => "BAD_USER_INPUT",
            Self::NoAuthorization | Self::InvalidHeader | Self::JwtDecodeError => {
                "UNAUTHENTICATED"
            }
            Self::NotSuperuser => "FORBIDDEN",
            Self::Conflict | Self::NotEmpty => "CONFLICT",
            Self::UserNotFound
            | Self::PasswordIncorrect
            | Self::CategoryNotFound
            | Self::WorkNotFound
            | Self::ModelFileNotFound
            | Self::CoverFileNotFound => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        if let Self::Internal(err) = self {
            tracing::error!(error = ?err, "Request failed");
        }

        let code = self.code();
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

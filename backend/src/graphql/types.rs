//! GraphQL object and input types

use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, ErrorExtensions, InputObject, Result, SimpleObject, Upload};

use crate::db::{CategoryRecord, FavoriteRecord, UserRecord, WorkRecord};
use crate::error::ApiError;
use crate::services::validation::{validate_exactly_one, validate_name};
use crate::services::{Actor, FileSource, LoginResult, WorkDraft};

use super::loaders::{CategoryLoader, WorkLoader};

// ============================================================================
// Users
// ============================================================================

#[derive(SimpleObject, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_superuser: bool,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            is_superuser: record.is_superuser,
        }
    }
}

impl From<Actor> for User {
    fn from(actor: Actor) -> Self {
        Self {
            id: actor.id,
            username: actor.username,
            is_superuser: actor.is_superuser,
        }
    }
}

/// Returned by register and login
#[derive(SimpleObject, Debug, Clone)]
pub struct AuthPayload {
    /// Short-lived access token (JWT), sent back as `Authorization: Bearer <token>`
    pub access_token: String,
    pub user: User,
}

impl From<LoginResult> for AuthPayload {
    fn from(result: LoginResult) -> Self {
        Self {
            access_token: result.access_token,
            user: User::from(result.user),
        }
    }
}

// ============================================================================
// Categories
// ============================================================================

#[derive(SimpleObject, Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
        }
    }
}

#[derive(SimpleObject, Debug, Clone)]
pub struct CategoryEdge {
    pub node: Category,
}

/// Every category, unpaged
#[derive(SimpleObject, Debug, Clone)]
pub struct CategoryConnection {
    pub edges: Vec<CategoryEdge>,
}

impl From<Vec<CategoryRecord>> for CategoryConnection {
    fn from(records: Vec<CategoryRecord>) -> Self {
        Self {
            edges: records
                .into_iter()
                .map(|record| CategoryEdge {
                    node: Category::from(record),
                })
                .collect(),
        }
    }
}

#[derive(InputObject, Debug)]
pub struct CategoryInput {
    pub name: String,
}

impl CategoryInput {
    /// Validated category name. A missing input is invalid.
    pub fn name(input: Option<CategoryInput>) -> Result<String> {
        let input = input.ok_or_else(|| ApiError::Invalid.extend())?;
        validate_name(&input.name).map_err(|e| e.extend())?;
        Ok(input.name)
    }
}

// ============================================================================
// Works
// ============================================================================

#[derive(SimpleObject, Debug, Clone)]
#[graphql(complex)]
pub struct Work {
    pub id: i64,
    pub title: String,
    #[graphql(skip)]
    pub category_id: i64,
    pub model_filename: String,
    pub cover_filename: String,
}

impl From<WorkRecord> for Work {
    fn from(record: WorkRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            category_id: record.category_id,
            model_filename: record.model_filename,
            cover_filename: record.cover_filename,
        }
    }
}

#[ComplexObject]
impl Work {
    async fn category(&self, ctx: &Context<'_>) -> Result<Category> {
        let loader = ctx.data_unchecked::<DataLoader<CategoryLoader>>();
        loader
            .load_one(self.category_id)
            .await?
            .ok_or_else(|| ApiError::CategoryNotFound.extend())
    }
}

crate::define_connection!(WorkConnection, WorkEdge, Work);

/// Values for creating or replacing a work. Each file is given either as a
/// new upload or as the name of a file already stored.
#[derive(InputObject)]
pub struct WorkInput {
    pub title: String,
    pub category_id: i64,
    pub model_file: Option<Upload>,
    pub model_filename: Option<String>,
    pub cover_file: Option<Upload>,
    pub cover_filename: Option<String>,
}

impl WorkInput {
    /// Validate the input and open its uploads. A missing input is invalid.
    pub fn into_draft(input: Option<WorkInput>, ctx: &Context<'_>) -> Result<WorkDraft> {
        let input = input.ok_or_else(|| ApiError::Invalid.extend())?;

        validate_name(&input.title).map_err(|e| e.extend())?;
        validate_exactly_one(&input.model_file, &input.model_filename).map_err(|e| e.extend())?;
        validate_exactly_one(&input.cover_file, &input.cover_filename).map_err(|e| e.extend())?;

        Ok(WorkDraft {
            title: input.title,
            category_id: input.category_id,
            model: file_source(ctx, input.model_file, input.model_filename)?,
            cover: file_source(ctx, input.cover_file, input.cover_filename)?,
        })
    }
}

fn file_source(
    ctx: &Context<'_>,
    upload: Option<Upload>,
    filename: Option<String>,
) -> Result<FileSource> {
    match (upload, filename) {
        (Some(upload), _) => {
            let value = upload
                .value(ctx)
                .map_err(|e| ApiError::Internal(e.into()).extend())?;
            Ok(FileSource::Upload(tokio::fs::File::from_std(value.content)))
        }
        (None, Some(filename)) => Ok(FileSource::Existing(filename)),
        (None, None) => Err(ApiError::Invalid.extend()),
    }
}

// ============================================================================
// Favorites
// ============================================================================

#[derive(SimpleObject, Debug, Clone)]
#[graphql(complex)]
pub struct Favorite {
    pub id: i64,
    #[graphql(skip)]
    pub work_id: i64,
}

impl From<FavoriteRecord> for Favorite {
    fn from(record: FavoriteRecord) -> Self {
        Self {
            id: record.id,
            work_id: record.work_id,
        }
    }
}

#[ComplexObject]
impl Favorite {
    async fn work(&self, ctx: &Context<'_>) -> Result<Work> {
        let loader = ctx.data_unchecked::<DataLoader<WorkLoader>>();
        loader
            .load_one(self.work_id)
            .await?
            .ok_or_else(|| ApiError::WorkNotFound.extend())
    }
}

crate::define_connection!(FavoriteConnection, FavoriteEdge, Favorite);

//! Catalog service: categories and works
//!
//! All writes require the [`Superuser`] capability. Work writes resolve their
//! model and cover files first (storing uploads, checking referenced names),
//! then check the category and write the row inside one transaction. Files
//! stored for a write that ends up failing are removed again.

use tokio::sync::broadcast;

use crate::db::{
    CategoryRecord, CategoryRepository, Database, Page, PageRequest, WorkFields, WorkRecord,
    WorkRepository,
};
use crate::error::{ApiError, ApiResult};

use super::auth::Superuser;
use super::storage::{FileKind, UploadStorage, is_plain_filename};
use super::validation::validate_name;

/// Published after a work has been committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkCreatedEvent {
    pub work_id: i64,
}

/// Where a work's model or cover comes from
#[derive(Debug)]
pub enum FileSource {
    /// New content to store under a generated name
    Upload(tokio::fs::File),
    /// A file already present in storage
    Existing(String),
}

/// A complete set of work values as submitted by a client
#[derive(Debug)]
pub struct WorkDraft {
    pub title: String,
    pub category_id: i64,
    pub model: FileSource,
    pub cover: FileSource,
}

#[derive(Clone)]
pub struct CatalogService {
    db: Database,
    storage: UploadStorage,
    events: broadcast::Sender<WorkCreatedEvent>,
    page_size: i64,
}

impl CatalogService {
    pub fn new(db: Database, storage: UploadStorage, page_size: i64) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            db,
            storage,
            events,
            page_size,
        }
    }

    /// Receive an event for every work created from now on
    pub fn subscribe(&self) -> broadcast::Receiver<WorkCreatedEvent> {
        self.events.subscribe()
    }

    pub fn storage(&self) -> &UploadStorage {
        &self.storage
    }

    // ========================================================================
    // Categories
    // ========================================================================

    pub async fn categories(&self) -> ApiResult<Vec<CategoryRecord>> {
        Ok(self.db.categories().list_all().await?)
    }

    pub async fn category(&self, id: i64) -> ApiResult<CategoryRecord> {
        self.db
            .categories()
            .get_by_id(id)
            .await?
            .ok_or(ApiError::CategoryNotFound)
    }

    pub async fn create_category(&self, su: &Superuser, name: &str) -> ApiResult<CategoryRecord> {
        validate_name(name)?;

        let category = self
            .db
            .categories()
            .create(name)
            .await
            .map_err(ApiError::from_write)?;

        tracing::info!(
            user_id = su.actor().id,
            category_id = category.id,
            "Category created"
        );
        Ok(category)
    }

    pub async fn update_category(
        &self,
        su: &Superuser,
        id: i64,
        name: &str,
    ) -> ApiResult<CategoryRecord> {
        validate_name(name)?;

        let category = self
            .db
            .categories()
            .rename(id, name)
            .await
            .map_err(ApiError::from_write)?
            .ok_or(ApiError::CategoryNotFound)?;

        tracing::info!(user_id = su.actor().id, category_id = id, "Category renamed");
        Ok(category)
    }

    /// Delete an empty category
    pub async fn delete_category(&self, su: &Superuser, id: i64) -> ApiResult<i64> {
        let mut tx = self.db.begin().await?;

        if !CategoryRepository::exists_in(&mut tx, id).await? {
            return Err(ApiError::CategoryNotFound);
        }
        if WorkRepository::any_in_category_in(&mut tx, id).await? {
            return Err(ApiError::NotEmpty);
        }
        CategoryRepository::delete_in(&mut tx, id).await?;

        tx.commit().await?;

        tracing::info!(user_id = su.actor().id, category_id = id, "Category deleted");
        Ok(id)
    }

    // ========================================================================
    // Works
    // ========================================================================

    /// One page of works, newest first, optionally within one category.
    /// A category id of 0 means no filter.
    pub async fn works(
        &self,
        category_id: Option<i64>,
        request: PageRequest,
    ) -> ApiResult<Page<WorkRecord>> {
        let category_id = category_id.filter(|id| *id != 0);
        Ok(self
            .db
            .works()
            .page(category_id, request, self.page_size)
            .await?)
    }

    pub async fn work(&self, id: i64) -> ApiResult<WorkRecord> {
        self.db
            .works()
            .get_by_id(id)
            .await?
            .ok_or(ApiError::WorkNotFound)
    }

    pub async fn create_work(&self, su: &Superuser, draft: WorkDraft) -> ApiResult<WorkRecord> {
        validate_name(&draft.title)?;

        let mut stored = Vec::new();
        let result = self.insert_work(draft, &mut stored).await;
        if result.is_err() {
            self.discard(&stored).await;
        }
        let work = result?;

        tracing::info!(
            user_id = su.actor().id,
            work_id = work.id,
            category_id = work.category_id,
            "Work created"
        );

        // No receivers is not an error
        let _ = self.events.send(WorkCreatedEvent { work_id: work.id });

        Ok(work)
    }

    pub async fn update_work(
        &self,
        su: &Superuser,
        id: i64,
        draft: WorkDraft,
    ) -> ApiResult<WorkRecord> {
        validate_name(&draft.title)?;

        if self.db.works().get_by_id(id).await?.is_none() {
            return Err(ApiError::WorkNotFound);
        }

        let mut stored = Vec::new();
        let result = self.replace_work(id, draft, &mut stored).await;
        if result.is_err() {
            self.discard(&stored).await;
        }
        let work = result?;

        tracing::info!(
            user_id = su.actor().id,
            work_id = work.id,
            category_id = work.category_id,
            "Work updated"
        );
        Ok(work)
    }

    /// Delete a work and every favorite of it. Deleting a missing work succeeds.
    pub async fn delete_work(&self, su: &Superuser, id: i64) -> ApiResult<i64> {
        let existed = self.db.works().delete_with_favorites(id).await?;

        tracing::info!(user_id = su.actor().id, work_id = id, existed, "Work deleted");
        Ok(id)
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    async fn insert_work(
        &self,
        draft: WorkDraft,
        stored: &mut Vec<(FileKind, String)>,
    ) -> ApiResult<WorkRecord> {
        let fields = self.resolve_fields(draft, stored).await?;

        let mut tx = self.db.begin().await?;
        if !CategoryRepository::exists_in(&mut tx, fields.category_id).await? {
            return Err(ApiError::CategoryNotFound);
        }
        let work = WorkRepository::create_in(&mut tx, &fields).await?;
        tx.commit().await?;

        Ok(work)
    }

    async fn replace_work(
        &self,
        id: i64,
        draft: WorkDraft,
        stored: &mut Vec<(FileKind, String)>,
    ) -> ApiResult<WorkRecord> {
        let fields = self.resolve_fields(draft, stored).await?;

        let mut tx = self.db.begin().await?;
        if !CategoryRepository::exists_in(&mut tx, fields.category_id).await? {
            return Err(ApiError::CategoryNotFound);
        }
        let work = WorkRepository::update_in(&mut tx, id, &fields)
            .await?
            .ok_or(ApiError::WorkNotFound)?;
        tx.commit().await?;

        Ok(work)
    }

    async fn resolve_fields(
        &self,
        draft: WorkDraft,
        stored: &mut Vec<(FileKind, String)>,
    ) -> ApiResult<WorkFields> {
        let model_filename = self.resolve_file(FileKind::Model, draft.model, stored).await?;
        let cover_filename = self.resolve_file(FileKind::Cover, draft.cover, stored).await?;

        Ok(WorkFields {
            title: draft.title,
            category_id: draft.category_id,
            model_filename,
            cover_filename,
        })
    }

    async fn resolve_file(
        &self,
        kind: FileKind,
        source: FileSource,
        stored: &mut Vec<(FileKind, String)>,
    ) -> ApiResult<String> {
        match source {
            FileSource::Upload(mut file) => {
                let filename = self.storage.store(kind, &mut file).await?;
                stored.push((kind, filename.clone()));
                Ok(filename)
            }
            FileSource::Existing(filename) => {
                if !is_plain_filename(&filename) {
                    return Err(ApiError::Invalid);
                }
                if self.storage.exists(kind, &filename).await? {
                    Ok(filename)
                } else {
                    Err(match kind {
                        FileKind::Model => ApiError::ModelFileNotFound,
                        FileKind::Cover => ApiError::CoverFileNotFound,
                    })
                }
            }
        }
    }

    async fn discard(&self, stored: &[(FileKind, String)]) {
        for (kind, filename) in stored {
            if let Err(e) = self.storage.remove(*kind, filename).await {
                tracing::warn!(
                    kind = kind.as_str(),
                    filename = %filename,
                    error = %e,
                    "Failed to remove orphaned upload"
                );
            }
        }
    }
}

//! Work database repository

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::favorites::FavoriteRepository;
use super::pagination::{Keyed, Page, PageRequest, PageSource, Window, paginate};

const WORK_COLUMNS: &str = "id, title, category_id, model_filename, cover_filename";

/// Work record from database
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct WorkRecord {
    pub id: i64,
    pub title: String,
    pub category_id: i64,
    pub model_filename: String,
    pub cover_filename: String,
}

impl Keyed for WorkRecord {
    fn key(&self) -> i64 {
        self.id
    }
}

/// Column values for creating or replacing a work
#[derive(Debug, Clone)]
pub struct WorkFields {
    pub title: String,
    pub category_id: i64,
    pub model_filename: String,
    pub cover_filename: String,
}

/// Works listing, optionally restricted to one category
struct WorkListing<'a> {
    pool: &'a SqlitePool,
    category_id: Option<i64>,
}

#[async_trait]
impl PageSource for WorkListing<'_> {
    type Item = WorkRecord;

    async fn fetch_window(&self, window: &Window) -> Result<Vec<WorkRecord>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM works WHERE 1 = 1",
            WORK_COLUMNS
        ));
        if let Some(category_id) = self.category_id {
            qb.push(" AND category_id = ").push_bind(category_id);
        }
        window.push_sql(&mut qb, "id");

        let records = qb
            .build_query_as::<WorkRecord>()
            .fetch_all(self.pool)
            .await?;

        Ok(records)
    }
}

pub struct WorkRepository {
    pool: SqlitePool,
}

impl WorkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List works newest first, one page at a time
    pub async fn page(
        &self,
        category_id: Option<i64>,
        request: PageRequest,
        page_size: i64,
    ) -> Result<Page<WorkRecord>> {
        let listing = WorkListing {
            pool: &self.pool,
            category_id,
        };
        paginate(&listing, request, page_size).await
    }

    /// Get a work by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<WorkRecord>> {
        let record = sqlx::query_as::<_, WorkRecord>(&format!(
            "SELECT {} FROM works WHERE id = ?",
            WORK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Get every work whose id is in `ids` (batch loading)
    pub async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<WorkRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM works WHERE id IN (",
            WORK_COLUMNS
        ));
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let records = qb
            .build_query_as::<WorkRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Delete a work and every favorite pointing at it. Returns whether the work existed.
    pub async fn delete_with_favorites(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM works WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let removed = FavoriteRepository::delete_for_work_in(&mut tx, id).await?;

        tx.commit().await?;

        tracing::debug!(work_id = id, favorites_removed = removed, "Work deleted");

        Ok(result.rows_affected() > 0)
    }

    /// Insert a work inside an open transaction
    pub async fn create_in(conn: &mut SqliteConnection, fields: &WorkFields) -> Result<WorkRecord> {
        let record = sqlx::query_as::<_, WorkRecord>(&format!(
            r#"
            INSERT INTO works (title, category_id, model_filename, cover_filename)
            VALUES (?, ?, ?, ?)
            RETURNING {}
            "#,
            WORK_COLUMNS
        ))
        .bind(&fields.title)
        .bind(fields.category_id)
        .bind(&fields.model_filename)
        .bind(&fields.cover_filename)
        .fetch_one(&mut *conn)
        .await?;

        Ok(record)
    }

    /// Replace every column of a work inside an open transaction.
    /// Returns `None` if the work does not exist.
    pub async fn update_in(
        conn: &mut SqliteConnection,
        id: i64,
        fields: &WorkFields,
    ) -> Result<Option<WorkRecord>> {
        let record = sqlx::query_as::<_, WorkRecord>(&format!(
            r#"
            UPDATE works SET
                title = ?,
                category_id = ?,
                model_filename = ?,
                cover_filename = ?
            WHERE id = ?
            RETURNING {}
            "#,
            WORK_COLUMNS
        ))
        .bind(&fields.title)
        .bind(fields.category_id)
        .bind(&fields.model_filename)
        .bind(&fields.cover_filename)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(record)
    }

    /// Whether any work belongs to the category, inside an open transaction
    pub async fn any_in_category_in(conn: &mut SqliteConnection, category_id: i64) -> Result<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM works WHERE category_id = ? LIMIT 1")
                .bind(category_id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(found.is_some())
    }

    /// Whether a work exists, inside an open transaction
    pub async fn exists_in(conn: &mut SqliteConnection, id: i64) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM works WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(found.is_some())
    }
}

//! Favorite database repository

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::pagination::{Keyed, Page, PageRequest, PageSource, Window, paginate};

/// A user's favorite mark on a work
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FavoriteRecord {
    pub id: i64,
    pub user_id: i64,
    pub work_id: i64,
}

impl Keyed for FavoriteRecord {
    fn key(&self) -> i64 {
        self.id
    }
}

/// Favorites owned by one user
struct OwnedFavorites<'a> {
    pool: &'a SqlitePool,
    user_id: i64,
}

#[async_trait]
impl PageSource for OwnedFavorites<'_> {
    type Item = FavoriteRecord;

    async fn fetch_window(&self, window: &Window) -> Result<Vec<FavoriteRecord>> {
        let mut qb =
            QueryBuilder::<Sqlite>::new("SELECT id, user_id, work_id FROM favorites WHERE user_id = ");
        qb.push_bind(self.user_id);
        window.push_sql(&mut qb, "id");

        let records = qb
            .build_query_as::<FavoriteRecord>()
            .fetch_all(self.pool)
            .await?;

        Ok(records)
    }
}

pub struct FavoriteRepository {
    pool: SqlitePool,
}

impl FavoriteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List a user's favorites, most recently added first
    pub async fn page_for_user(
        &self,
        user_id: i64,
        request: PageRequest,
        page_size: i64,
    ) -> Result<Page<FavoriteRecord>> {
        let source = OwnedFavorites {
            pool: &self.pool,
            user_id,
        };
        paginate(&source, request, page_size).await
    }

    /// Whether the user already marked the work
    pub async fn exists(&self, user_id: i64, work_id: i64) -> Result<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM favorites WHERE user_id = ? AND work_id = ?")
                .bind(user_id)
                .bind(work_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(found.is_some())
    }

    /// Mark a work inside an open transaction.
    /// Fails with a unique violation when the pair already exists.
    pub async fn create_in(
        conn: &mut SqliteConnection,
        user_id: i64,
        work_id: i64,
    ) -> Result<FavoriteRecord> {
        let record = sqlx::query_as::<_, FavoriteRecord>(
            r#"
            INSERT INTO favorites (user_id, work_id)
            VALUES (?, ?)
            RETURNING id, user_id, work_id
            "#,
        )
        .bind(user_id)
        .bind(work_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(record)
    }

    /// Remove a user's mark. Returns whether anything was removed.
    pub async fn delete(&self, user_id: i64, work_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND work_id = ?")
            .bind(user_id)
            .bind(work_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every mark on a work inside an open transaction
    pub async fn delete_for_work_in(conn: &mut SqliteConnection, work_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM favorites WHERE work_id = ?")
            .bind(work_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }
}

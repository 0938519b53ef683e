//! Category database repository

use anyhow::Result;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

/// Category record from database
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
}

pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get all categories in creation order
    pub async fn list_all(&self) -> Result<Vec<CategoryRecord>> {
        let records =
            sqlx::query_as::<_, CategoryRecord>("SELECT id, name FROM categories ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(records)
    }

    /// Get a category by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<CategoryRecord>> {
        let record =
            sqlx::query_as::<_, CategoryRecord>("SELECT id, name FROM categories WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(record)
    }

    /// Get every category whose id is in `ids` (batch loading)
    pub async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<CategoryRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb =
            sqlx::QueryBuilder::<Sqlite>::new("SELECT id, name FROM categories WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let records = qb
            .build_query_as::<CategoryRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Create a category. Fails with a unique violation on a duplicate name.
    pub async fn create(&self, name: &str) -> Result<CategoryRecord> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            "INSERT INTO categories (name) VALUES (?) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Rename a category. Returns `None` if it does not exist.
    pub async fn rename(&self, id: i64, name: &str) -> Result<Option<CategoryRecord>> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            "UPDATE categories SET name = ? WHERE id = ? RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Check that a category exists inside an open transaction
    pub async fn exists_in(conn: &mut SqliteConnection, id: i64) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(found.is_some())
    }

    /// Delete a category inside an open transaction
    pub async fn delete_in(conn: &mut SqliteConnection, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{Database, is_unique_violation};

    #[tokio::test]
    async fn test_create_rename_and_list() {
        let db = Database::connect_in_memory().await.unwrap();
        let categories = db.categories();

        let car = categories.create("Car").await.unwrap();
        let ship = categories.create("Ship").await.unwrap();

        let renamed = categories.rename(car.id, "Vehicle").await.unwrap().unwrap();
        assert_eq!(renamed.name, "Vehicle");
        assert!(categories.rename(999, "Nothing").await.unwrap().is_none());

        let names: Vec<String> = categories
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Vehicle", "Ship"]);

        let batch = categories.get_by_ids(&[ship.id, 42]).await.unwrap();
        assert_eq!(batch, vec![ship]);
        assert!(categories.get_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_unique_violation() {
        let db = Database::connect_in_memory().await.unwrap();
        let categories = db.categories();

        categories.create("Car").await.unwrap();
        let other = categories.create("Ship").await.unwrap();

        assert!(is_unique_violation(&categories.create("Car").await.unwrap_err()));
        assert!(is_unique_violation(
            &categories.rename(other.id, "Car").await.unwrap_err()
        ));
    }
}

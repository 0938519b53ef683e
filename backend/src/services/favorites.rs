//! Per-user favorite marks on works

use crate::db::{
    Database, FavoriteRecord, FavoriteRepository, Page, PageRequest, WorkRepository,
};
use crate::error::{ApiError, ApiResult};

use super::auth::Actor;

#[derive(Clone)]
pub struct FavoritesService {
    db: Database,
    page_size: i64,
}

impl FavoritesService {
    pub fn new(db: Database, page_size: i64) -> Self {
        Self { db, page_size }
    }

    /// One page of the actor's favorites, most recently added first
    pub async fn my_favorites(
        &self,
        actor: &Actor,
        request: PageRequest,
    ) -> ApiResult<Page<FavoriteRecord>> {
        Ok(self
            .db
            .favorites()
            .page_for_user(actor.id, request, self.page_size)
            .await?)
    }

    pub async fn is_work_in_favorites(&self, actor: &Actor, work_id: i64) -> ApiResult<bool> {
        Ok(self.db.favorites().exists(actor.id, work_id).await?)
    }

    pub async fn add_favorite(&self, actor: &Actor, work_id: i64) -> ApiResult<i64> {
        let mut tx = self.db.begin().await?;

        if !WorkRepository::exists_in(&mut tx, work_id).await? {
            return Err(ApiError::WorkNotFound);
        }
        FavoriteRepository::create_in(&mut tx, actor.id, work_id)
            .await
            .map_err(ApiError::from_write)?;

        tx.commit().await?;

        tracing::info!(user_id = actor.id, work_id, "Favorite added");
        Ok(work_id)
    }

    /// Remove a mark. Removing a mark that does not exist succeeds.
    pub async fn remove_favorite(&self, actor: &Actor, work_id: i64) -> ApiResult<i64> {
        let removed = self.db.favorites().delete(actor.id, work_id).await?;

        tracing::info!(user_id = actor.id, work_id, removed, "Favorite removed");
        Ok(work_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CreateUser, WorkFields};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    async fn setup(work_count: usize) -> (FavoritesService, Actor, Vec<i64>) {
        let db = Database::connect_in_memory().await.unwrap();
        let user = db
            .users()
            .create(CreateUser {
                username: "dave".to_string(),
                password_hash: "hash".to_string(),
                is_superuser: false,
            })
            .await
            .unwrap();
        let category_id = db.categories().create("Misc").await.unwrap().id;

        let mut tx = db.begin().await.unwrap();
        let mut work_ids = Vec::new();
        for i in 0..work_count {
            let fields = WorkFields {
                title: format!("Work {}", i),
                category_id,
                model_filename: "m".to_string(),
                cover_filename: "c".to_string(),
            };
            work_ids.push(WorkRepository::create_in(&mut tx, &fields).await.unwrap().id);
        }
        tx.commit().await.unwrap();

        (FavoritesService::new(db, 2), Actor::from(user), work_ids)
    }

    #[tokio::test]
    async fn test_add_check_remove() {
        let (favorites, actor, work_ids) = setup(1).await;
        let work_id = work_ids[0];

        assert!(!favorites.is_work_in_favorites(&actor, work_id).await.unwrap());
        assert_eq!(favorites.add_favorite(&actor, work_id).await.unwrap(), work_id);
        assert!(favorites.is_work_in_favorites(&actor, work_id).await.unwrap());

        assert_matches!(
            favorites.add_favorite(&actor, work_id).await,
            Err(ApiError::Conflict)
        );
        assert_matches!(
            favorites.add_favorite(&actor, 999).await,
            Err(ApiError::WorkNotFound)
        );

        assert_eq!(favorites.remove_favorite(&actor, work_id).await.unwrap(), work_id);
        assert_eq!(favorites.remove_favorite(&actor, work_id).await.unwrap(), work_id);
        assert!(!favorites.is_work_in_favorites(&actor, work_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_my_favorites_pages_by_mark_order() {
        let (favorites, actor, work_ids) = setup(3).await;
        // mark oldest work last so it becomes the newest favorite
        for work_id in [work_ids[1], work_ids[2], work_ids[0]] {
            favorites.add_favorite(&actor, work_id).await.unwrap();
        }

        let first = favorites
            .my_favorites(&actor, PageRequest::default())
            .await
            .unwrap();
        let marked: Vec<i64> = first.items.iter().map(|f| f.work_id).collect();
        assert_eq!(marked, vec![work_ids[0], work_ids[2]]);
        assert!(first.has_next_page);

        let second = favorites
            .my_favorites(&actor, PageRequest::new(Some(2), None))
            .await
            .unwrap();
        let marked: Vec<i64> = second.items.iter().map(|f| f.work_id).collect();
        assert_eq!(marked, vec![work_ids[1]]);
        assert!(!second.has_next_page);
    }
}

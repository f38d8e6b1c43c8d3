use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use photonic_core::models::{MediaMetadataUpdate, MediaRecord, NewMedia, OwnerRef};
use photonic_core::AppError;
use tokio::sync::RwLock;

use crate::repository::MediaRepository;

#[derive(Default)]
struct State {
    next_id: i64,
    rows: BTreeMap<i64, MediaRecord>,
}

/// Media repository kept in process memory
///
/// Clones share the same rows.
#[derive(Clone, Default)]
pub struct InMemoryMediaRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryMediaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn find(&self, id: i64) -> Result<Option<MediaRecord>, AppError> {
        Ok(self.state.read().await.rows.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<MediaRecord>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .values()
            .filter(|row| ids.contains(&row.id))
            .cloned()
            .collect())
    }

    async fn create(&self, media: NewMedia) -> Result<MediaRecord, AppError> {
        let config = media.config_json()?;
        let mut state = self.state.write().await;

        if let Some(uuid) = &media.asset_uuid {
            if state
                .rows
                .values()
                .any(|row| row.asset_uuid.as_deref() == Some(uuid.as_str()))
            {
                return Err(AppError::InvalidInput(format!(
                    "Asset {} is already recorded",
                    uuid
                )));
            }
        }

        state.next_id += 1;
        let now = Utc::now();
        let record = MediaRecord {
            id: state.next_id,
            asset_uuid: media.asset_uuid,
            filename: media.filename,
            owner: media.owner,
            alt: media.metadata.alt,
            title: media.metadata.title,
            description: media.metadata.description,
            caption: media.metadata.caption,
            presets: media.presets,
            config,
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(record.id, record.clone());

        Ok(record)
    }

    async fn update_metadata(
        &self,
        id: i64,
        update: &MediaMetadataUpdate,
    ) -> Result<Option<MediaRecord>, AppError> {
        let mut state = self.state.write().await;
        Ok(state.rows.get_mut(&id).map(|row| {
            update.apply_to(row);
            row.updated_at = Utc::now();
            row.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.state.write().await.rows.remove(&id).is_some())
    }

    async fn list_for_owner(&self, owner: &OwnerRef) -> Result<Vec<MediaRecord>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .values()
            .filter(|row| row.owner.as_ref() == Some(owner))
            .cloned()
            .collect())
    }

    async fn delete_for_owner(&self, owner: &OwnerRef, id: i64) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let owned = state
            .rows
            .get(&id)
            .is_some_and(|row| row.owner.as_ref() == Some(owner));
        if owned {
            state.rows.remove(&id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photonic_core::models::AssetMetadata;

    fn new_media(uuid: &str, filename: &str, owner: Option<OwnerRef>) -> NewMedia {
        NewMedia {
            asset_uuid: Some(uuid.to_string()),
            filename: filename.to_string(),
            owner,
            metadata: AssetMetadata {
                alt: Some("Test image".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_and_find_returns_row() {
        let repo = InMemoryMediaRepository::new();
        let first = repo
            .create(new_media("uuid-123-456", "test-image.jpg", None))
            .await
            .unwrap();
        let second = repo.create(new_media("uuid-2", "b.jpg", None)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        let found = repo.find(first.id).await.unwrap().unwrap();
        assert_eq!(found.asset_uuid.as_deref(), Some("uuid-123-456"));
        assert_eq!(found.alt.as_deref(), Some("Test image"));
    }

    #[tokio::test]
    async fn duplicate_asset_uuid_is_rejected() {
        let repo = InMemoryMediaRepository::new();
        repo.create(new_media("dup", "a.jpg", None)).await.unwrap();
        let err = repo.create(new_media("dup", "b.jpg", None)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let repo = InMemoryMediaRepository::new();
        let media = repo.create(new_media("uuid-789", "u.jpg", None)).await.unwrap();

        let update = MediaMetadataUpdate {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        let updated = repo.update_metadata(media.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.title.as_deref(), Some("New title"));
        assert_eq!(updated.alt.as_deref(), Some("Test image"));

        assert!(repo.delete(media.id).await.unwrap());
        assert!(!repo.delete(media.id).await.unwrap());
        assert!(repo.update_metadata(media.id, &update).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn owner_scoped_operations() {
        let repo = InMemoryMediaRepository::new();
        let post = OwnerRef::new("post", 10).unwrap();
        let page = OwnerRef::new("page", 10).unwrap();

        let a = repo.create(new_media("a", "a.jpg", Some(post.clone()))).await.unwrap();
        let b = repo.create(new_media("b", "b.jpg", Some(page.clone()))).await.unwrap();
        repo.create(new_media("c", "c.jpg", Some(post.clone()))).await.unwrap();

        let owned = repo.list_for_owner(&post).await.unwrap();
        assert_eq!(owned.len(), 2);

        assert!(!repo.delete_for_owner(&post, b.id).await.unwrap());
        assert!(repo.delete_for_owner(&post, a.id).await.unwrap());
        assert_eq!(repo.list_for_owner(&post).await.unwrap().len(), 1);

        let many = repo.find_many(&[b.id, 999]).await.unwrap();
        assert_eq!(many.len(), 1);
        assert_eq!(many[0].owner.as_ref(), Some(&page));
    }
}

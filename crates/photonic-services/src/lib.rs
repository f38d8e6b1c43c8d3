//! Photonic services
//!
//! Wires the image API client, the media repository and a cache store into
//! the media cache, the asset resolver and the upload lifecycle service.

pub mod cache;
pub mod file;
pub mod media_cache;
pub mod resolver;
pub mod service;

use std::sync::Arc;
use std::time::Duration;

use photonic_core::{AppError, AssetUrlBuilder, PhotonicConfig};
use photonic_db::MediaRepository;

pub use cache::{CacheStore, InMemoryCacheStore};
pub use file::{FileSource, LoadedFile};
pub use media_cache::MediaCache;
pub use resolver::{AssetResolver, Resolution};
pub use service::{MediaService, UploadOutcome, UploadRequest};

/// Services sharing one repository and cache store
pub struct Photonic {
    pub resolver: AssetResolver,
    pub media: MediaService,
}

impl Photonic {
    pub fn new(
        config: PhotonicConfig,
        repository: Arc<dyn MediaRepository>,
        store: Arc<dyn CacheStore>,
    ) -> Result<Self, AppError> {
        let cache = Arc::new(MediaCache::new(
            repository.clone(),
            store,
            AssetUrlBuilder::from_config(&config),
            Duration::from_secs(config.cache_ttl_secs),
        ));

        Ok(Self {
            resolver: AssetResolver::new(cache.clone()),
            media: MediaService::new(config, repository, cache)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photonic_core::models::{AssetMetadata, OwnerRef};
    use photonic_db::InMemoryMediaRepository;

    #[tokio::test]
    async fn resolver_and_service_share_the_cache() {
        let config = PhotonicConfig {
            cdn_endpoint: "https://cdn.example.com".to_string(),
            site_uuid: "site-123".to_string(),
            ..Default::default()
        };
        let photonic = Photonic::new(
            config,
            Arc::new(InMemoryMediaRepository::new()),
            Arc::new(InMemoryCacheStore::default()),
        )
        .unwrap();

        let owner = OwnerRef::new("post", 1).unwrap();
        let media = photonic
            .media
            .add_for_owner(owner.clone(), "shared.jpg", None, AssetMetadata::default())
            .await
            .unwrap();

        assert!(photonic.resolver.media_by_id(media.id).await.unwrap().is_some());
        assert!(photonic.media.remove_for_owner(&owner, media.id).await.unwrap());
        assert!(photonic.resolver.media_by_id(media.id).await.unwrap().is_none());
    }
}

//! Cache-aside access to media rows and their CDN URLs

use std::sync::Arc;
use std::time::Duration;

use photonic_core::models::{MediaRecord, Preset, COMMON_PRESETS};
use photonic_core::{AppError, AssetUrlBuilder};
use photonic_db::MediaRepository;
use serde_json::Value as JsonValue;

use crate::cache::CacheStore;

pub fn media_key(id: i64) -> String {
    format!("photonic_media_{}", id)
}

pub fn asset_key(id: i64, preset: &Preset) -> String {
    format!("photonic_asset_{}_{}", id, preset)
}

/// Presets whose URLs are cached; exactly the set [`MediaCache::invalidate`] clears.
fn invalidated_presets() -> impl Iterator<Item = Preset> {
    COMMON_PRESETS
        .into_iter()
        .map(Preset::parse)
        .chain(std::iter::once(Preset::Auto))
}

fn is_url_cacheable(preset: &Preset) -> bool {
    match preset {
        Preset::Original | Preset::Auto => true,
        Preset::Named(name) => COMMON_PRESETS.contains(&name.as_str()),
    }
}

/// Media rows and computed URLs cached by media ID
///
/// Lookups fall through to the repository on a miss and populate the cache
/// for the TTL. Rows that do not exist are never cached. Cache backend
/// failures are logged and treated as misses.
pub struct MediaCache {
    repository: Arc<dyn MediaRepository>,
    store: Arc<dyn CacheStore>,
    urls: AssetUrlBuilder,
    default_ttl: Duration,
}

impl MediaCache {
    pub fn new(
        repository: Arc<dyn MediaRepository>,
        store: Arc<dyn CacheStore>,
        urls: AssetUrlBuilder,
        default_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            store,
            urls,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn urls(&self) -> &AssetUrlBuilder {
        &self.urls
    }

    /// Cached media row, fetched from the repository on a miss.
    pub async fn get(&self, id: i64) -> Result<Option<MediaRecord>, AppError> {
        self.media(id, None).await
    }

    /// Like [`MediaCache::get`] with an explicit TTL for a populated entry.
    pub async fn media(
        &self,
        id: i64,
        ttl: Option<Duration>,
    ) -> Result<Option<MediaRecord>, AppError> {
        let key = media_key(id);

        if let Some(value) = self.read(&key).await {
            match serde_json::from_value::<MediaRecord>(value) {
                Ok(record) => {
                    tracing::trace!(media_id = id, "Media cache hit");
                    return Ok(Some(record));
                }
                Err(e) => {
                    tracing::warn!(media_id = id, error = %e, "Discarding undecodable cache entry");
                }
            }
        }

        let Some(record) = self.repository.find(id).await? else {
            tracing::debug!(media_id = id, "Media not found");
            return Ok(None);
        };

        match serde_json::to_value(&record) {
            Ok(value) => self.write(&key, value, ttl).await,
            Err(e) => tracing::warn!(media_id = id, error = %e, "Media row not cacheable"),
        }
        Ok(Some(record))
    }

    /// Cached CDN URL for a media ID and preset.
    ///
    /// `None` when the row does not exist, has no asset UUID, or has an
    /// unusable filename. URLs for presets outside the invalidated set are
    /// built from the cached row on every call, never stored.
    pub async fn asset_url(
        &self,
        id: i64,
        preset: &Preset,
        ttl: Option<Duration>,
    ) -> Result<Option<String>, AppError> {
        let key = is_url_cacheable(preset).then(|| asset_key(id, preset));

        if let Some(key) = &key {
            if let Some(JsonValue::String(url)) = self.read(key).await {
                return Ok(Some(url));
            }
        }

        let Some(record) = self.media(id, ttl).await? else {
            return Ok(None);
        };

        let url = self.url_for_record(&record, preset);
        if let (Some(key), Some(url)) = (&key, &url) {
            self.write(key, JsonValue::String(url.clone()), ttl).await;
        }
        Ok(url)
    }

    /// Build the URL for a record without touching the cache.
    pub fn url_for_record(&self, record: &MediaRecord, preset: &Preset) -> Option<String> {
        let asset_uuid = record.asset_uuid.as_deref()?;
        self.urls.url(asset_uuid, &record.filename, preset)
    }

    /// Drop the cached row and every cached preset URL for a media ID.
    pub async fn invalidate(&self, id: i64) -> Result<(), AppError> {
        self.store.forget(&media_key(id)).await?;
        for preset in invalidated_presets() {
            self.store.forget(&asset_key(id, &preset)).await?;
        }

        tracing::debug!(media_id = id, "Media cache invalidated");
        Ok(())
    }

    async fn read(&self, key: &str) -> Option<JsonValue> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed");
                None
            }
        }
    }

    async fn write(&self, key: &str, value: JsonValue, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if let Err(e) = self.store.put(key, value, ttl).await {
            tracing::warn!(key = %key, error = %e, "Cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCacheStore;
    use photonic_core::models::NewMedia;
    use photonic_db::InMemoryMediaRepository;

    async fn setup() -> (InMemoryMediaRepository, Arc<InMemoryCacheStore>, MediaCache) {
        let repo = InMemoryMediaRepository::new();
        let store = Arc::new(InMemoryCacheStore::default());
        let cache = MediaCache::new(
            Arc::new(repo.clone()),
            store.clone(),
            AssetUrlBuilder::new("https://cdn.example.com", "site-123"),
            Duration::from_secs(3600),
        );
        (repo, store, cache)
    }

    async fn seed(repo: &InMemoryMediaRepository, uuid: &str, filename: &str) -> MediaRecord {
        repo.create(NewMedia {
            asset_uuid: Some(uuid.to_string()),
            filename: filename.to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    #[test]
    fn key_scheme() {
        assert_eq!(media_key(42), "photonic_media_42");
        assert_eq!(
            asset_key(42, &Preset::parse("featured")),
            "photonic_asset_42_featured"
        );
        assert_eq!(asset_key(42, &Preset::Original), "photonic_asset_42_original");
    }

    #[tokio::test]
    async fn cached_row_survives_deletion_until_invalidated() {
        let (repo, _store, cache) = setup().await;
        let media = seed(&repo, "abc-uuid", "photo.PNG").await;

        let first = cache.get(media.id).await.unwrap().unwrap();
        assert_eq!(first.filename, "photo.PNG");

        repo.delete(media.id).await.unwrap();
        assert!(cache.get(media.id).await.unwrap().is_some());

        cache.invalidate(media.id).await.unwrap();
        assert!(cache.get(media.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn misses_are_not_cached() {
        let (repo, store, cache) = setup().await;
        assert!(cache.get(1).await.unwrap().is_none());
        assert!(store.is_empty().await);

        let media = seed(&repo, "late", "late.jpg").await;
        assert_eq!(media.id, 1);
        assert!(cache.get(1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn asset_urls_are_cached_per_preset() {
        let (repo, store, cache) = setup().await;
        let media = seed(&repo, "abc-uuid", "photo.PNG").await;

        let featured = Preset::parse("featured");
        let url = cache.asset_url(media.id, &featured, None).await.unwrap();
        assert_eq!(
            url.as_deref(),
            Some("https://cdn.example.com/site-123/abc-uuid/presets/featured/photo.webp")
        );
        assert_eq!(
            store.get(&asset_key(media.id, &featured)).await.unwrap(),
            Some(JsonValue::String(url.clone().unwrap()))
        );

        let original = cache
            .asset_url(media.id, &Preset::Original, None)
            .await
            .unwrap();
        assert_eq!(
            original.as_deref(),
            Some("https://cdn.example.com/site-123/abc-uuid/original/photo.PNG")
        );

        cache.invalidate(media.id).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn uncommon_presets_never_outlive_invalidation() {
        let (repo, store, cache) = setup().await;
        let media = seed(&repo, "abc-uuid", "photo.PNG").await;

        let mixed_case = Preset::parse("Featured");
        let url = cache
            .asset_url(media.id, &mixed_case, None)
            .await
            .unwrap();
        assert_eq!(
            url.as_deref(),
            Some("https://cdn.example.com/site-123/abc-uuid/presets/Featured/photo.webp")
        );
        assert!(store
            .get(&asset_key(media.id, &mixed_case))
            .await
            .unwrap()
            .is_none());

        let custom = Preset::parse("hero-wide");
        cache.asset_url(media.id, &custom, None).await.unwrap();
        assert!(store.get(&asset_key(media.id, &custom)).await.unwrap().is_none());

        cache.asset_url(media.id, &Preset::Auto, None).await.unwrap();
        assert!(store
            .get(&asset_key(media.id, &Preset::Auto))
            .await
            .unwrap()
            .is_some());

        repo.delete(media.id).await.unwrap();
        cache.invalidate(media.id).await.unwrap();

        assert!(store.is_empty().await);
        assert!(cache.asset_url(media.id, &Preset::Auto, None).await.unwrap().is_none());
        assert!(cache.asset_url(media.id, &mixed_case, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn record_without_asset_uuid_has_no_url() {
        let (repo, _store, cache) = setup().await;
        let media = repo
            .create(NewMedia {
                filename: "legacy.jpg".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let url = cache
            .asset_url(media.id, &Preset::Original, None)
            .await
            .unwrap();
        assert!(url.is_none());
        assert!(cache.asset_url(999, &Preset::Auto, None).await.unwrap().is_none());
    }
}

//! Fluent asset resolution
//!
//! ```ignore
//! let url = resolver.for_id(42).preset("featured").url().await?;
//! let info = resolver.for_record(record).preset("thumbnail").info().await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use photonic_core::models::{MediaInfo, MediaRecord, Preset};
use photonic_core::AppError;

use crate::media_cache::MediaCache;

/// Entry point for resolving media rows and URLs, by ID or from a loaded record
#[derive(Clone)]
pub struct AssetResolver {
    cache: Arc<MediaCache>,
}

impl AssetResolver {
    pub fn new(cache: Arc<MediaCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &MediaCache {
        &self.cache
    }

    /// Resolve by media ID. Lookups go through the media cache.
    pub fn for_id(&self, id: i64) -> Resolution<'_> {
        Resolution::new(&self.cache, Target::Id(id))
    }

    /// Resolve a record the caller already holds. No repository lookups.
    pub fn for_record(&self, record: MediaRecord) -> Resolution<'_> {
        Resolution::new(&self.cache, Target::Record(record))
    }

    pub async fn asset_url_by_id(
        &self,
        id: i64,
        preset: impl Into<Preset>,
    ) -> Result<Option<String>, AppError> {
        self.for_id(id).preset(preset).url().await
    }

    pub async fn media_by_id(&self, id: i64) -> Result<Option<MediaRecord>, AppError> {
        self.for_id(id).media().await
    }

    /// Forget everything cached for a media ID.
    pub async fn forget(&self, id: i64) -> Result<(), AppError> {
        self.cache.invalidate(id).await
    }
}

enum Target {
    Id(i64),
    Record(MediaRecord),
}

/// Pending resolution; configure the preset and TTL, then ask for a result.
pub struct Resolution<'a> {
    cache: &'a MediaCache,
    target: Target,
    preset: Preset,
    ttl: Option<Duration>,
}

impl<'a> Resolution<'a> {
    fn new(cache: &'a MediaCache, target: Target) -> Self {
        Self {
            cache,
            target,
            preset: Preset::Original,
            ttl: None,
        }
    }

    pub fn preset(mut self, preset: impl Into<Preset>) -> Self {
        self.preset = preset.into();
        self
    }

    /// TTL for entries populated by this resolution
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub async fn media(&self) -> Result<Option<MediaRecord>, AppError> {
        match &self.target {
            Target::Id(id) => self.cache.media(*id, self.ttl).await,
            Target::Record(record) => Ok(Some(record.clone())),
        }
    }

    pub async fn url(&self) -> Result<Option<String>, AppError> {
        match &self.target {
            Target::Id(id) => self.cache.asset_url(*id, &self.preset, self.ttl).await,
            Target::Record(record) => Ok(self.cache.url_for_record(record, &self.preset)),
        }
    }

    /// Serialisable view of the record with the URL for the chosen preset.
    pub async fn info(&self) -> Result<Option<MediaInfo>, AppError> {
        let Some(record) = self.media().await? else {
            return Ok(None);
        };
        let url = self.cache.url_for_record(&record, &self.preset);
        Ok(Some(MediaInfo::from_record(
            &record,
            self.preset.clone(),
            url,
        )))
    }
}

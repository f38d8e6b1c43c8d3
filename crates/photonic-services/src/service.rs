//! Media upload and lifecycle service

use std::sync::Arc;

use photonic_api_client::ApiClient;
use photonic_core::models::{
    AssetMetadata, FileConfig, MediaMetadataUpdate, MediaRecord, NewMedia, OwnerRef,
    UploadedAsset,
};
use photonic_core::{AppError, PhotonicConfig};
use photonic_db::MediaRepository;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::file::{self, FileSource, LoadedFile};
use crate::media_cache::MediaCache;

/// A file to upload, optionally attached to an owning record
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub source: FileSource,
    pub metadata: AssetMetadata,
    pub owner: Option<OwnerRef>,
}

impl UploadRequest {
    pub fn new(source: FileSource) -> Self {
        Self {
            source,
            metadata: AssetMetadata::default(),
            owner: None,
        }
    }

    pub fn with_metadata(mut self, metadata: AssetMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_owner(mut self, owner: OwnerRef) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Result of an upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub asset: UploadedAsset,
    pub config: FileConfig,
    /// Stored row; `None` when recording is disabled or failed
    pub media: Option<MediaRecord>,
}

/// Coordinates the image API, the media table and the media cache
pub struct MediaService {
    config: PhotonicConfig,
    client: Option<ApiClient>,
    repository: Arc<dyn MediaRepository>,
    cache: Arc<MediaCache>,
}

impl MediaService {
    /// The API client is only built when an endpoint is configured; operations
    /// that need it fail with a configuration error otherwise.
    pub fn new(
        config: PhotonicConfig,
        repository: Arc<dyn MediaRepository>,
        cache: Arc<MediaCache>,
    ) -> Result<Self, AppError> {
        let client = match config.require_endpoint() {
            Ok(_) => Some(ApiClient::from_config(&config)?),
            Err(_) => None,
        };

        Ok(Self {
            config,
            client,
            repository,
            cache,
        })
    }

    pub fn config(&self) -> &PhotonicConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<MediaCache> {
        &self.cache
    }

    fn client(&self) -> Result<&ApiClient, AppError> {
        self.config.require_endpoint()?;
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Internal("API client unavailable".to_string()))
    }

    /// Upload an image and, when enabled, record it.
    ///
    /// Failing to record is logged and does not fail the upload.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadOutcome, AppError> {
        let client = self.client()?;
        let UploadRequest {
            source,
            metadata,
            owner,
        } = request;

        let LoadedFile { upload, config } = file::load(source).await?;

        tracing::info!(
            filename = %upload.filename,
            size = upload.size(),
            mode = %self.config.upload_mode,
            "Uploading image"
        );
        let asset = client
            .upload(&upload, &metadata, self.config.upload_mode)
            .await?;

        let media = if self.config.record_uploads {
            self.record(&asset, &config, metadata, owner).await
        } else {
            None
        };

        Ok(UploadOutcome {
            asset,
            config,
            media,
        })
    }

    async fn record(
        &self,
        asset: &UploadedAsset,
        config: &FileConfig,
        metadata: AssetMetadata,
        owner: Option<OwnerRef>,
    ) -> Option<MediaRecord> {
        let new_media = NewMedia {
            asset_uuid: asset.asset_uuid.clone(),
            filename: asset.filename.clone(),
            owner,
            metadata,
            presets: asset.presets.clone(),
            config: Some(config.clone()),
        };

        match self.repository.create(new_media).await {
            Ok(record) => {
                tracing::debug!(media_id = record.id, "Upload recorded");
                Some(record)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    filename = %asset.filename,
                    asset_uuid = ?asset.asset_uuid,
                    "Failed to record uploaded image"
                );
                None
            }
        }
    }

    /// Record an already-uploaded asset for an owner.
    pub async fn add_for_owner(
        &self,
        owner: OwnerRef,
        filename: impl Into<String>,
        presets: Option<JsonValue>,
        metadata: AssetMetadata,
    ) -> Result<MediaRecord, AppError> {
        let filename = filename.into();
        if filename.trim().is_empty() {
            return Err(AppError::InvalidInput("Filename cannot be empty".to_string()));
        }

        self.repository
            .create(NewMedia {
                filename,
                owner: Some(owner),
                metadata,
                presets,
                ..Default::default()
            })
            .await
    }

    pub async fn update_metadata(
        &self,
        id: i64,
        update: MediaMetadataUpdate,
    ) -> Result<MediaRecord, AppError> {
        let record = if update.is_empty() {
            self.repository.find(id).await?
        } else {
            self.repository.update_metadata(id, &update).await?
        }
        .ok_or_else(|| AppError::NotFound(format!("Media {} not found", id)))?;

        self.cache.invalidate(id).await?;
        Ok(record)
    }

    /// Delete the upstream asset, then the row, then the cached entries.
    ///
    /// An asset the API no longer knows counts as deleted. Any other upstream
    /// failure leaves the row in place.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let record = self
            .repository
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Media {} not found", id)))?;

        if let Some(asset_uuid) = record.asset_uuid.as_deref() {
            self.client()?.delete_asset(asset_uuid).await?;
        }

        self.repository.delete(id).await?;
        self.cache.invalidate(id).await?;

        tracing::info!(media_id = id, asset_uuid = ?record.asset_uuid, "Media deleted");
        Ok(())
    }

    pub async fn media_for_owner(&self, owner: &OwnerRef) -> Result<Vec<MediaRecord>, AppError> {
        self.repository.list_for_owner(owner).await
    }

    /// Remove an owner's media row. The upstream asset is left alone.
    pub async fn remove_for_owner(&self, owner: &OwnerRef, id: i64) -> Result<bool, AppError> {
        let removed = self.repository.delete_for_owner(owner, id).await?;
        if removed {
            self.cache.invalidate(id).await?;
        }
        Ok(removed)
    }

    pub async fn media_by_ids(&self, ids: &[i64]) -> Result<Vec<MediaRecord>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.repository.find_many(ids).await
    }

    /// Media referenced by a stored attribute holding one ID or a list of IDs.
    pub async fn media_from_value(&self, value: &JsonValue) -> Result<Vec<MediaRecord>, AppError> {
        let ids: Vec<i64> = match value {
            JsonValue::Null => Vec::new(),
            JsonValue::Array(items) => items.iter().filter_map(value_to_id).collect(),
            other => value_to_id(other).into_iter().collect(),
        };
        self.media_by_ids(&ids).await
    }
}

fn value_to_id(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

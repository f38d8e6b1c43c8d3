//! Asset operations on the Photonic API.
//!
//! Two upload flows are supported:
//! - direct: one multipart POST to `/assets` carrying the file
//! - signed: POST `/assets/signed-upload` for a storage URL, PUT the bytes
//!   there, then POST `/assets` with the returned key to register the asset

use bytes::Bytes;
use photonic_core::models::{AssetMetadata, SignedUpload, UploadedAsset};
use photonic_core::UploadMode;
use reqwest::multipart::{Form, Part};

use crate::response::{parse_signed_upload, parse_upload_response};
use crate::{ApiClient, ApiError};

const ASSETS_PATH: &str = "/assets";
const SIGNED_UPLOAD_PATH: &str = "/assets/signed-upload";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// File payload handed to the upload endpoints
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub data: Bytes,
    pub filename: String,
    pub content_type: String,
}

impl FileUpload {
    pub fn new(data: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            filename: filename.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

fn with_metadata(mut form: Form, metadata: &AssetMetadata) -> Form {
    for (name, value) in metadata.fields() {
        form = form.text(name, value.to_string());
    }
    form
}

impl ApiClient {
    /// Upload using the configured flow.
    pub async fn upload(
        &self,
        file: &FileUpload,
        metadata: &AssetMetadata,
        mode: UploadMode,
    ) -> Result<UploadedAsset, ApiError> {
        match mode {
            UploadMode::Direct => self.create_asset(file, metadata).await,
            UploadMode::Signed => self.upload_signed(file, metadata).await,
        }
    }

    /// Direct multipart upload to `/assets`.
    pub async fn create_asset(
        &self,
        file: &FileUpload,
        metadata: &AssetMetadata,
    ) -> Result<UploadedAsset, ApiError> {
        tracing::debug!(
            filename = %file.filename,
            size = file.size(),
            field = %self.file_field,
            "Uploading asset"
        );

        let part = Part::bytes(file.data.to_vec())
            .file_name(file.filename.clone())
            .mime_str(&file.content_type)?;

        let form = Form::new()
            .text("site_uuid", self.site_uuid.clone())
            .text("filename", file.filename.clone())
            .part(self.file_field.clone(), part);
        let form = with_metadata(form, metadata);

        let body = self.post_multipart(ASSETS_PATH, form).await?;
        let asset = parse_upload_response(&body, &self.filename_keys())?;

        tracing::info!(
            filename = %asset.filename,
            asset_uuid = ?asset.asset_uuid,
            "Asset uploaded"
        );
        Ok(asset)
    }

    /// Ask the API for a time-limited storage URL.
    pub async fn request_signed_upload(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<SignedUpload, ApiError> {
        let form = Form::new()
            .text("site_uuid", self.site_uuid.clone())
            .text("filename", filename.to_string())
            .text("content_type", content_type.to_string());

        let body = self.post_multipart(SIGNED_UPLOAD_PATH, form).await?;
        let signed = parse_signed_upload(&body)?;

        tracing::debug!(key = %signed.key, "Signed upload URL issued");
        Ok(signed)
    }

    /// PUT the raw bytes to a signed storage URL.
    ///
    /// The URL carries its own credentials, so no API headers are sent.
    pub async fn put_signed(
        &self,
        signed: &SignedUpload,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .put(&signed.url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), key = %signed.key, "Signed PUT rejected");
            return Err(ApiError::SignedPutFailed(status.as_u16()));
        }
        Ok(())
    }

    /// Register an object already written to storage under `key`.
    pub async fn register_asset(
        &self,
        key: &str,
        filename: &str,
        metadata: &AssetMetadata,
    ) -> Result<UploadedAsset, ApiError> {
        let form = Form::new()
            .text("site_uuid", self.site_uuid.clone())
            .text("filename", filename.to_string())
            .text("key", key.to_string());
        let form = with_metadata(form, metadata);

        let body = self.post_multipart(ASSETS_PATH, form).await?;
        parse_upload_response(&body, &self.filename_keys())
    }

    /// Signed-URL upload: request, PUT, register.
    pub async fn upload_signed(
        &self,
        file: &FileUpload,
        metadata: &AssetMetadata,
    ) -> Result<UploadedAsset, ApiError> {
        let signed = self
            .request_signed_upload(&file.filename, &file.content_type)
            .await?;
        self.put_signed(&signed, file.data.clone(), &file.content_type)
            .await?;

        let asset = self
            .register_asset(&signed.key, &file.filename, metadata)
            .await?;

        tracing::info!(
            filename = %asset.filename,
            asset_uuid = ?asset.asset_uuid,
            key = %signed.key,
            "Asset uploaded via signed URL"
        );
        Ok(asset)
    }

    /// Delete an asset. Returns `false` when the API no longer knows it.
    pub async fn delete_asset(&self, asset_uuid: &str) -> Result<bool, ApiError> {
        let path = format!("{}/{}", ASSETS_PATH, urlencoding::encode(asset_uuid));
        let status = self.delete(&path).await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!(asset_uuid = %asset_uuid, "Asset already gone upstream");
            return Ok(false);
        }

        tracing::info!(asset_uuid = %asset_uuid, "Asset deleted upstream");
        Ok(true)
    }
}

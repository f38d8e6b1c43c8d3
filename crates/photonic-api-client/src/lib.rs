//! HTTP client for the Photonic image API.
//!
//! Provides a minimal client with configurable auth (Bearer token or X-API-Key)
//! and the asset operations used by the services: direct multipart upload,
//! the signed-URL upload flow and asset deletion.

pub mod api;
pub mod response;

use std::time::Duration;

use photonic_core::{AppError, PhotonicConfig};
use reqwest::{Client, RequestBuilder, Response};

pub use api::FileUpload;
pub use response::{parse_signed_upload, parse_upload_response};

const SITE_HEADER: &str = "X-Site-UUID";
const FALLBACK_FILENAME_KEYS: [&str; 3] = ["filename", "file", "name"];

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
}

/// Errors raised while talking to the image API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Signed upload response is missing '{0}'")]
    MissingSignedField(&'static str),

    #[error("Signed upload PUT failed with status {0}")]
    SignedPutFailed(u16),

    #[error("Upload response body was empty")]
    MissingFilename,
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, body } => AppError::Upstream {
                status,
                message: body,
            },
            other => AppError::UploadFailed(other.to_string()),
        }
    }
}

/// HTTP client for the Photonic API with configurable auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Option<Auth>,
    site_uuid: String,
    file_field: String,
    response_key: Option<String>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        auth: Option<Auth>,
        site_uuid: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
            site_uuid: site_uuid.into(),
            file_field: "file".to_string(),
            response_key: None,
        })
    }

    /// Create client from configuration. A missing endpoint is a setup error.
    pub fn from_config(config: &PhotonicConfig) -> Result<Self, AppError> {
        let endpoint = config.require_endpoint()?;
        let auth = config.api_key.clone().map(Auth::Bearer);

        let client = Self::new(
            endpoint,
            auth,
            config.site_uuid.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )?
        .with_file_field(config.file_field.clone())
        .with_response_key(config.response_key.clone());

        Ok(client)
    }

    /// Multipart field name the API expects for the file part
    pub fn with_file_field(mut self, field: impl Into<String>) -> Self {
        self.file_field = field.into();
        self
    }

    /// Preferred response key holding the stored filename
    pub fn with_response_key(mut self, key: Option<String>) -> Self {
        self.response_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn site_uuid(&self) -> &str {
        &self.site_uuid
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Keys consulted, in order, for the stored filename
    pub(crate) fn filename_keys(&self) -> Vec<&str> {
        self.response_key
            .as_deref()
            .into_iter()
            .chain(FALLBACK_FILENAME_KEYS)
            .collect()
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header(reqwest::header::ACCEPT, "application/json")
            .header(SITE_HEADER, self.site_uuid.as_str());

        match &self.auth {
            Some(Auth::Bearer(token)) => request.bearer_auth(token),
            Some(Auth::XApiKey(key)) => request.header("X-API-Key", key.as_str()),
            None => request,
        }
    }

    /// POST a multipart form and return the raw body of a successful response.
    pub(crate) async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<String, ApiError> {
        let url = self.build_url(path);
        let request = self.apply_auth(self.client.post(&url).multipart(form));

        let response = request.send().await?;
        let response = ensure_success(response).await?;

        Ok(response.text().await?)
    }

    /// DELETE request. Returns the status of a non-error response.
    pub(crate) async fn delete(&self, path: &str) -> Result<reqwest::StatusCode, ApiError> {
        let url = self.build_url(path);
        let request = self.apply_auth(self.client.delete(&url));

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(status);
        }

        let response = ensure_success(response).await?;
        Ok(response.status())
    }
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

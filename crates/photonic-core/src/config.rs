//! Configuration module
//!
//! `PhotonicConfig` is built once (usually from the environment) and passed
//! explicitly to the API client, URL builder and services.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

// Common constants
const DEFAULT_FILE_FIELD: &str = "file";
const DEFAULT_RESPONSE_KEY: &str = "original_filename";
const DEFAULT_MEDIA_TABLE: &str = "photonic";
const CACHE_TTL_SECS: u64 = 3600;
const HTTP_TIMEOUT_SECS: u64 = 60;

/// How files are sent to the upstream image API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadMode {
    /// Multipart POST of the file bytes to `/assets`
    #[default]
    Direct,
    /// Signed URL request, PUT to storage, then asset registration
    Signed,
}

impl FromStr for UploadMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" | "multipart" => Ok(UploadMode::Direct),
            "signed" | "signed-url" | "signed_url" => Ok(UploadMode::Signed),
            other => Err(AppError::Configuration(format!(
                "Unknown upload mode '{}'. Expected 'direct' or 'signed'",
                other
            ))),
        }
    }
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadMode::Direct => f.write_str("direct"),
            UploadMode::Signed => f.write_str("signed"),
        }
    }
}

/// Photonic configuration
#[derive(Clone, Debug)]
pub struct PhotonicConfig {
    /// Base URL of the upstream image API
    pub endpoint: Option<String>,
    /// Base URL of the CDN serving processed assets
    pub cdn_endpoint: String,
    pub site_uuid: String,
    pub api_key: Option<String>,
    /// Multipart field name the API expects for the uploaded file
    pub file_field: String,
    /// Response key that contains the returned filename
    pub response_key: Option<String>,
    /// Whether successful uploads are persisted to the media table
    pub record_uploads: bool,
    pub media_table: String,
    pub upload_mode: UploadMode,
    pub cache_ttl_secs: u64,
    pub http_timeout_secs: u64,
}

impl Default for PhotonicConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            cdn_endpoint: String::new(),
            site_uuid: String::new(),
            api_key: None,
            file_field: DEFAULT_FILE_FIELD.to_string(),
            response_key: Some(DEFAULT_RESPONSE_KEY.to_string()),
            record_uploads: true,
            media_table: DEFAULT_MEDIA_TABLE.to_string(),
            upload_mode: UploadMode::Direct,
            cache_ttl_secs: CACHE_TTL_SECS,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }
}

impl PhotonicConfig {
    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let upload_mode = match get("PHOTONIC_UPLOAD_MODE") {
            Some(mode) => mode.parse::<UploadMode>()?,
            None => UploadMode::Direct,
        };

        let parse_secs = |key: &str, default: u64| -> Result<u64, anyhow::Error> {
            match get(key) {
                Some(value) => value.parse::<u64>().map_err(|e| {
                    anyhow::anyhow!(
                        "{} must be a whole number of seconds, got '{}': {}",
                        key,
                        value,
                        e
                    )
                }),
                None => Ok(default),
            }
        };

        let config = Self {
            endpoint: get("PHOTONIC_ENDPOINT").map(|s| s.trim_end_matches('/').to_string()),
            cdn_endpoint: get("PHOTONIC_CDN_ENDPOINT").unwrap_or_default(),
            site_uuid: get("PHOTONIC_SITE_UUID").unwrap_or_default(),
            api_key: get("PHOTONIC_API_KEY"),
            file_field: get("PHOTONIC_FILE_FIELD").unwrap_or_else(|| DEFAULT_FILE_FIELD.to_string()),
            response_key: Some(
                get("PHOTONIC_RESPONSE_KEY").unwrap_or_else(|| DEFAULT_RESPONSE_KEY.to_string()),
            ),
            record_uploads: get("PHOTONIC_RECORD_UPLOADS")
                .map(|v| parse_bool(&v))
                .unwrap_or(true),
            media_table: get("PHOTONIC_MEDIA_TABLE")
                .unwrap_or_else(|| DEFAULT_MEDIA_TABLE.to_string()),
            upload_mode,
            cache_ttl_secs: parse_secs("PHOTONIC_CACHE_TTL_SECS", CACHE_TTL_SECS)?,
            http_timeout_secs: parse_secs("PHOTONIC_HTTP_TIMEOUT_SECS", HTTP_TIMEOUT_SECS)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !is_valid_table_name(&self.media_table) {
            return Err(anyhow::anyhow!(
                "PHOTONIC_MEDIA_TABLE '{}' is not a valid table name",
                self.media_table
            ));
        }

        if self.file_field.trim().is_empty() {
            return Err(anyhow::anyhow!("PHOTONIC_FILE_FIELD cannot be empty"));
        }

        if self.http_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "PHOTONIC_HTTP_TIMEOUT_SECS must be greater than zero"
            ));
        }

        Ok(())
    }

    /// The API endpoint, or a fatal setup error when it is missing.
    pub fn require_endpoint(&self) -> Result<&str, AppError> {
        self.endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                AppError::Configuration(
                    "Photonic endpoint is not configured. Set PHOTONIC_ENDPOINT.".to_string(),
                )
            })
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = PhotonicConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.endpoint, None);
        assert_eq!(config.file_field, "file");
        assert_eq!(config.response_key.as_deref(), Some("original_filename"));
        assert!(config.record_uploads);
        assert_eq!(config.media_table, "photonic");
        assert_eq!(config.upload_mode, UploadMode::Direct);
        assert_eq!(config.cache_ttl_secs, 3600);
    }

    #[test]
    fn reads_values_and_trims_endpoint() {
        let config = PhotonicConfig::from_lookup(lookup(&[
            ("PHOTONIC_ENDPOINT", "https://api.example.com/"),
            ("PHOTONIC_CDN_ENDPOINT", "https://cdn.example.com"),
            ("PHOTONIC_SITE_UUID", "site-123"),
            ("PHOTONIC_API_KEY", "secret"),
            ("PHOTONIC_RECORD_UPLOADS", "false"),
            ("PHOTONIC_UPLOAD_MODE", "Signed"),
            ("PHOTONIC_CACHE_TTL_SECS", "60"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.site_uuid, "site-123");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert!(!config.record_uploads);
        assert_eq!(config.upload_mode, UploadMode::Signed);
        assert_eq!(config.cache_ttl_secs, 60);
    }

    #[test]
    fn empty_endpoint_is_a_configuration_error() {
        let config =
            PhotonicConfig::from_lookup(lookup(&[("PHOTONIC_ENDPOINT", "  ")])).unwrap();
        let err = config.require_endpoint().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn rejects_unknown_upload_mode() {
        let result = PhotonicConfig::from_lookup(lookup(&[("PHOTONIC_UPLOAD_MODE", "ftp")]));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_numeric_durations() {
        let err = PhotonicConfig::from_lookup(lookup(&[("PHOTONIC_CACHE_TTL_SECS", "abc")]))
            .unwrap_err();
        assert!(err.to_string().contains("PHOTONIC_CACHE_TTL_SECS"));

        let err = PhotonicConfig::from_lookup(lookup(&[("PHOTONIC_HTTP_TIMEOUT_SECS", "-5")]))
            .unwrap_err();
        assert!(err.to_string().contains("PHOTONIC_HTTP_TIMEOUT_SECS"));

        let result = PhotonicConfig::from_lookup(lookup(&[("PHOTONIC_HTTP_TIMEOUT_SECS", "0")]));
        assert!(result.is_err());

        let config =
            PhotonicConfig::from_lookup(lookup(&[("PHOTONIC_HTTP_TIMEOUT_SECS", " 15 ")])).unwrap();
        assert_eq!(config.http_timeout_secs, 15);
    }

    #[test]
    fn rejects_unsafe_table_name() {
        let result = PhotonicConfig::from_lookup(lookup(&[(
            "PHOTONIC_MEDIA_TABLE",
            "media; DROP TABLE users",
        )]));
        assert!(result.is_err());
        assert!(is_valid_table_name("lume_media"));
        assert!(!is_valid_table_name("1media"));
    }
}

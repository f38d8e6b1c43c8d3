use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Result of an upstream upload round-trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedAsset {
    /// Identifier assigned by the image API, when it returns one
    pub asset_uuid: Option<String>,
    /// Server-assigned filename used to build CDN URLs
    pub filename: String,
    /// Preset descriptor returned by the API (`presets` or `preset`)
    pub presets: Option<JsonValue>,
    /// Parsed JSON response body, when the body was JSON
    pub response: Option<JsonValue>,
}

/// Signed upload target handed out by the image API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedUpload {
    /// Time-limited URL accepting a PUT of the raw bytes
    pub url: String,
    /// Storage key used to register the asset afterwards
    pub key: String,
}

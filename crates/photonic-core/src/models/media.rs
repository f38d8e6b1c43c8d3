use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::AppError;

/// Type name of the record that owns a media row (e.g. "post", "App\\Models\\Page").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerKind(String);

impl OwnerKind {
    pub fn new(kind: impl Into<String>) -> Result<Self, AppError> {
        let kind = kind.into();
        let trimmed = kind.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidInput(
                "Owner kind cannot be empty".to_string(),
            ));
        }
        if trimmed.len() > 255 {
            return Err(AppError::InvalidInput(
                "Owner kind must be at most 255 characters".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OwnerKind {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OwnerKind::new(value)
    }
}

impl From<OwnerKind> for String {
    fn from(kind: OwnerKind) -> Self {
        kind.0
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Explicit owner reference replacing the polymorphic relation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
    pub kind: OwnerKind,
    pub id: i64,
}

impl OwnerRef {
    pub fn new(kind: impl Into<String>, id: i64) -> Result<Self, AppError> {
        Ok(Self {
            kind: OwnerKind::new(kind)?,
            id,
        })
    }
}

/// File descriptor stored in the `config` JSON column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    pub mime_type: Option<String>,
    pub extension: Option<String>,
    pub size: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub hash_name: Option<String>,
}

/// Descriptive metadata sent upstream and stored with the record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub alt: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub caption: Option<String>,
}

impl AssetMetadata {
    /// Non-empty fields as (name, value) pairs, in wire order.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("alt", self.alt.as_deref()),
            ("title", self.title.as_deref()),
            ("description", self.description.as_deref()),
            ("caption", self.caption.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}

/// A row of the media table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: i64,
    pub asset_uuid: Option<String>,
    pub filename: String,
    pub owner: Option<OwnerRef>,
    pub alt: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub caption: Option<String>,
    pub presets: Option<JsonValue>,
    pub config: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaRecord {
    /// Parsed file descriptor, if the `config` column holds one.
    pub fn file_config(&self) -> Option<FileConfig> {
        self.config
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn metadata(&self) -> AssetMetadata {
        AssetMetadata {
            alt: self.alt.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            caption: self.caption.clone(),
        }
    }
}

/// Insert payload for a media row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewMedia {
    pub asset_uuid: Option<String>,
    pub filename: String,
    pub owner: Option<OwnerRef>,
    pub metadata: AssetMetadata,
    pub presets: Option<JsonValue>,
    pub config: Option<FileConfig>,
}

impl NewMedia {
    pub fn config_json(&self) -> Result<Option<JsonValue>, AppError> {
        self.config
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(AppError::from)
    }
}

/// Partial metadata update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadataUpdate {
    pub alt: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub caption: Option<String>,
}

impl MediaMetadataUpdate {
    pub fn is_empty(&self) -> bool {
        self.alt.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.caption.is_none()
    }

    /// Apply the update to a record in place (used by non-SQL repositories).
    pub fn apply_to(&self, record: &mut MediaRecord) {
        if let Some(alt) = &self.alt {
            record.alt = Some(alt.clone());
        }
        if let Some(title) = &self.title {
            record.title = Some(title.clone());
        }
        if let Some(description) = &self.description {
            record.description = Some(description.clone());
        }
        if let Some(caption) = &self.caption {
            record.caption = Some(caption.clone());
        }
    }
}

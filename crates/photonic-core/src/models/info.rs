use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::media::MediaRecord;
use super::preset::Preset;

/// Immutable, serialisable view of a resolved media record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    pub id: i64,
    pub asset_uuid: Option<String>,
    pub filename: String,
    pub preset: Preset,
    pub url: Option<String>,
    pub alt: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub caption: Option<String>,
    pub config: Option<JsonValue>,
    pub created_at: String,
    pub updated_at: String,
}

impl MediaInfo {
    pub fn from_record(record: &MediaRecord, preset: Preset, url: Option<String>) -> Self {
        Self {
            id: record.id,
            asset_uuid: record.asset_uuid.clone(),
            filename: record.filename.clone(),
            preset,
            url,
            alt: record.alt.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            caption: record.caption.clone(),
            config: record.config.clone(),
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn serializes_with_camel_case_keys() {
        let record = MediaRecord {
            id: 7,
            asset_uuid: Some("resolver-info-uuid".to_string()),
            filename: "info.jpg".to_string(),
            owner: None,
            alt: Some("Info alt".to_string()),
            title: None,
            description: None,
            caption: None,
            presets: None,
            config: Some(serde_json::json!({ "quality": 80 })),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let info = MediaInfo::from_record(&record, Preset::Original, Some("u".to_string()));
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(json["assetUuid"], "resolver-info-uuid");
        assert_eq!(json["filename"], "info.jpg");
        assert_eq!(json["preset"], "original");
        assert_eq!(json["config"]["quality"], 80);
        assert!(json.get("createdAt").is_some());
    }
}

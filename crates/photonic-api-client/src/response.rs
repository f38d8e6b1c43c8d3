//! Response parsing for asset endpoints
//!
//! Upstreams differ in shape: some wrap the payload in `data`, some return it
//! at the top level, some return a bare filename. Lookups consult `data`
//! first, then the top level.

use photonic_core::models::{SignedUpload, UploadedAsset};
use serde_json::Value as JsonValue;

use crate::ApiError;

const UUID_KEYS: [&str; 2] = ["uuid", "asset_uuid"];
const PRESET_KEYS: [&str; 2] = ["presets", "preset"];

fn scopes(json: &JsonValue) -> Vec<&JsonValue> {
    match json.get("data") {
        Some(data) if data.is_object() => vec![data, json],
        _ => vec![json],
    }
}

fn lookup<'a>(scopes: &[&'a JsonValue], keys: &[&str]) -> Option<&'a JsonValue> {
    keys.iter().find_map(|key| {
        scopes
            .iter()
            .find_map(|scope| scope.get(*key).filter(|value| !value.is_null()))
    })
}

fn as_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extract the stored filename, asset UUID and presets from an upload response.
///
/// `filename_keys` are tried in order (configured response key first). When
/// none match, or the body is not a JSON object, the trimmed body is taken
/// verbatim as the filename. Only an empty body is an error.
pub fn parse_upload_response(
    body: &str,
    filename_keys: &[&str],
) -> Result<UploadedAsset, ApiError> {
    let json: Option<JsonValue> = serde_json::from_str(body).ok();

    let (filename, asset_uuid, presets) = match &json {
        Some(value @ (JsonValue::String(_) | JsonValue::Number(_))) => {
            (as_text(value), None, None)
        }
        Some(value @ JsonValue::Object(_)) => {
            let scopes = scopes(value);
            (
                lookup(&scopes, filename_keys).and_then(as_text),
                lookup(&scopes, &UUID_KEYS).and_then(as_text),
                lookup(&scopes, &PRESET_KEYS).cloned(),
            )
        }
        _ => (None, None, None),
    };

    let filename = filename
        .or_else(|| {
            let raw = body.trim();
            (!raw.is_empty()).then(|| raw.to_string())
        })
        .ok_or(ApiError::MissingFilename)?;

    Ok(UploadedAsset {
        asset_uuid,
        filename,
        presets,
        response: json.filter(JsonValue::is_object),
    })
}

/// Extract the signed URL and storage key. Both are required.
pub fn parse_signed_upload(body: &str) -> Result<SignedUpload, ApiError> {
    let json: JsonValue = serde_json::from_str(body).unwrap_or(JsonValue::Null);
    let scopes = scopes(&json);

    let url = lookup(&scopes, &["url"])
        .and_then(as_text)
        .ok_or(ApiError::MissingSignedField("url"))?;
    let key = lookup(&scopes, &["key"])
        .and_then(as_text)
        .ok_or(ApiError::MissingSignedField("key"))?;

    Ok(SignedUpload { url, key })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 4] = ["original_filename", "filename", "file", "name"];

    #[test]
    fn response_key_wins_over_fallbacks() {
        let body = r#"{"original_filename":"stored.jpg","filename":"other.jpg","uuid":"u-1"}"#;
        let asset = parse_upload_response(body, &KEYS).unwrap();
        assert_eq!(asset.filename, "stored.jpg");
        assert_eq!(asset.asset_uuid.as_deref(), Some("u-1"));
    }

    #[test]
    fn falls_back_through_common_keys() {
        let asset = parse_upload_response(r#"{"name":"n.png"}"#, &KEYS).unwrap();
        assert_eq!(asset.filename, "n.png");

        let asset = parse_upload_response(r#"{"file":"f.png","name":"n.png"}"#, &KEYS).unwrap();
        assert_eq!(asset.filename, "f.png");
    }

    #[test]
    fn data_envelope_is_consulted_first() {
        let body = r#"{"data":{"filename":"inner.jpg","uuid":"inner-uuid","presets":["thumb"]},"filename":"outer.jpg"}"#;
        let asset = parse_upload_response(body, &KEYS).unwrap();
        assert_eq!(asset.filename, "inner.jpg");
        assert_eq!(asset.asset_uuid.as_deref(), Some("inner-uuid"));
        assert_eq!(asset.presets, Some(serde_json::json!(["thumb"])));
        assert!(asset.response.is_some());
    }

    #[test]
    fn raw_body_is_the_last_resort() {
        let asset = parse_upload_response("  abc123.jpg\n", &KEYS).unwrap();
        assert_eq!(asset.filename, "abc123.jpg");
        assert!(asset.asset_uuid.is_none());
        assert!(asset.response.is_none());

        let asset = parse_upload_response("\"quoted.jpg\"", &KEYS).unwrap();
        assert_eq!(asset.filename, "quoted.jpg");
    }

    #[test]
    fn unmatched_json_falls_back_to_raw_body() {
        let body = r#"{"stored":"x.jpg","uuid":"u-9"}"#;
        let asset = parse_upload_response(body, &KEYS).unwrap();
        assert_eq!(asset.filename, body);
        assert_eq!(asset.asset_uuid.as_deref(), Some("u-9"));
        assert!(asset.response.is_some());

        let asset = parse_upload_response(" [\"x.jpg\"] ", &["filename"]).unwrap();
        assert_eq!(asset.filename, r#"["x.jpg"]"#);
        assert!(asset.response.is_none());

        let asset = parse_upload_response("true", &KEYS).unwrap();
        assert_eq!(asset.filename, "true");
    }

    #[test]
    fn empty_body_is_an_error() {
        let err = parse_upload_response("   ", &KEYS).unwrap_err();
        assert!(matches!(err, ApiError::MissingFilename));
        assert!(parse_upload_response("", &KEYS).is_err());
    }

    #[test]
    fn signed_upload_requires_url_and_key() {
        let signed =
            parse_signed_upload(r#"{"data":{"url":"https://s3/put","key":"tmp/a.jpg"}}"#).unwrap();
        assert_eq!(signed.url, "https://s3/put");
        assert_eq!(signed.key, "tmp/a.jpg");

        let err = parse_signed_upload(r#"{"key":"tmp/a.jpg"}"#).unwrap_err();
        assert!(matches!(err, ApiError::MissingSignedField("url")));
        let err = parse_signed_upload(r#"{"url":"https://s3/put"}"#).unwrap_err();
        assert!(matches!(err, ApiError::MissingSignedField("key")));
        assert!(parse_signed_upload("not json").is_err());
    }
}

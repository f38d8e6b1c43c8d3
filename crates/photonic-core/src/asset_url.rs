//! CDN asset URL builder
//!
//! Processed assets are served from a static CDN layout:
//!
//! - original upload: `{cdn}/{site}/{asset_uuid}/original/{filename}`
//! - preset rendition: `{cdn}/{site}/{asset_uuid}/presets/{preset}/{basename}.webp`
//!
//! Preset renditions are always WebP, so the filename's extension is replaced.

use std::path::Path;

use crate::config::PhotonicConfig;
use crate::models::Preset;

/// Build the CDN URL of an asset.
///
/// Returns `None` when the filename is empty; that is not an error, there is
/// simply nothing to point at. Every segment is trimmed of surrounding
/// slashes (the CDN base only of trailing ones).
///
/// # Example
/// ```
/// use photonic_core::asset_url::asset_url;
/// let url = asset_url("https://cdn.example.com", "site-123", "abc-uuid", "photo.PNG", "featured");
/// assert_eq!(
///     url.as_deref(),
///     Some("https://cdn.example.com/site-123/abc-uuid/presets/featured/photo.webp")
/// );
/// ```
pub fn asset_url(
    cdn_base: &str,
    site_uuid: &str,
    asset_uuid: &str,
    filename: &str,
    preset: &str,
) -> Option<String> {
    build(cdn_base, site_uuid, asset_uuid, filename, &Preset::parse(preset))
}

fn build(
    cdn_base: &str,
    site_uuid: &str,
    asset_uuid: &str,
    filename: &str,
    preset: &Preset,
) -> Option<String> {
    let filename = filename.trim_matches('/');
    if filename.is_empty() {
        return None;
    }

    let cdn = cdn_base.trim_end_matches('/');
    let site = site_uuid.trim_matches('/');
    let asset = asset_uuid.trim_matches('/');

    if preset.is_original() {
        return Some(format!("{}/{}/{}/original/{}", cdn, site, asset, filename));
    }

    let base = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    Some(format!(
        "{}/{}/{}/presets/{}/{}.webp",
        cdn,
        site,
        asset,
        preset.as_str(),
        base
    ))
}

/// URL builder bound to one CDN base and site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrlBuilder {
    cdn_base: String,
    site_uuid: String,
}

impl AssetUrlBuilder {
    pub fn new(cdn_base: impl Into<String>, site_uuid: impl Into<String>) -> Self {
        Self {
            cdn_base: cdn_base.into(),
            site_uuid: site_uuid.into(),
        }
    }

    pub fn from_config(config: &PhotonicConfig) -> Self {
        Self::new(config.cdn_endpoint.clone(), config.site_uuid.clone())
    }

    pub fn cdn_base(&self) -> &str {
        &self.cdn_base
    }

    pub fn site_uuid(&self) -> &str {
        &self.site_uuid
    }

    /// URL for an asset in the given preset
    pub fn url(&self, asset_uuid: &str, filename: &str, preset: &Preset) -> Option<String> {
        build(&self.cdn_base, &self.site_uuid, asset_uuid, filename, preset)
    }

    /// URL of the untouched original
    pub fn original(&self, asset_uuid: &str, filename: &str) -> Option<String> {
        self.url(asset_uuid, filename, &Preset::Original)
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Presets cleared on invalidation. The presets a caller actually resolved
/// are not tracked, so the common names are enumerated instead.
pub const COMMON_PRESETS: [&str; 7] = [
    "original",
    "thumbnail",
    "featured",
    "banner",
    "small",
    "medium",
    "large",
];

/// Named image rendering variant, mapped to a CDN path segment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    /// The untouched upload, served under `/original/`
    #[default]
    Original,
    /// Upstream-chosen automatic rendition
    Auto,
    /// Any other preset configured upstream (e.g. "featured", "thumbnail")
    Named(String),
}

impl Preset {
    /// Parse a preset segment. The sentinels match case-insensitively and
    /// surrounding slashes are ignored; an empty segment means `Original`.
    pub fn parse(value: &str) -> Self {
        let segment = value.trim().trim_matches('/');
        if segment.is_empty() || segment.eq_ignore_ascii_case("original") {
            Preset::Original
        } else if segment.eq_ignore_ascii_case("auto") {
            Preset::Auto
        } else {
            Preset::Named(segment.to_string())
        }
    }

    pub fn is_original(&self) -> bool {
        matches!(self, Preset::Original)
    }

    /// Path segment used in CDN URLs and cache keys
    pub fn as_str(&self) -> &str {
        match self {
            Preset::Original => "original",
            Preset::Auto => "auto",
            Preset::Named(name) => name,
        }
    }
}

impl FromStr for Preset {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Preset::parse(s))
    }
}

impl From<&str> for Preset {
    fn from(value: &str) -> Self {
        Preset::parse(value)
    }
}

impl From<String> for Preset {
    fn from(value: String) -> Self {
        Preset::parse(&value)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Preset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Preset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Preset::parse(&raw))
    }
}

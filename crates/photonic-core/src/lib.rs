//! Photonic Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! CDN URL builder that are shared across all Photonic components.

pub mod asset_url;
pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use asset_url::{asset_url, AssetUrlBuilder};
pub use config::{PhotonicConfig, UploadMode};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AssetMetadata, FileConfig, MediaInfo, MediaMetadataUpdate, MediaRecord, NewMedia, OwnerKind,
    OwnerRef, Preset, SignedUpload, UploadedAsset, COMMON_PRESETS,
};

pub mod info;
pub mod media;
pub mod preset;
pub mod upload;

pub use info::MediaInfo;
pub use media::{
    AssetMetadata, FileConfig, MediaMetadataUpdate, MediaRecord, NewMedia, OwnerKind, OwnerRef,
};
pub use preset::{Preset, COMMON_PRESETS};
pub use upload::{SignedUpload, UploadedAsset};

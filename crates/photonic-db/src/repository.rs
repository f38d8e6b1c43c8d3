//! Repository trait abstraction
//!
//! Services depend on this trait only, so any storage (SQL, in-memory, a host
//! application's own ORM bridge) can own the media rows.

use async_trait::async_trait;
use photonic_core::models::{MediaMetadataUpdate, MediaRecord, NewMedia, OwnerRef};
use photonic_core::AppError;

/// Operations the Photonic services need from the media table
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// Get a media row by ID
    async fn find(&self, id: i64) -> Result<Option<MediaRecord>, AppError>;

    /// Get several media rows by ID, ordered by ID. Unknown IDs are skipped.
    async fn find_many(&self, ids: &[i64]) -> Result<Vec<MediaRecord>, AppError>;

    /// Insert a media row after a successful upload
    async fn create(&self, media: NewMedia) -> Result<MediaRecord, AppError>;

    /// Update alt/title/description/caption.
    /// Returns `None` if the row does not exist.
    async fn update_metadata(
        &self,
        id: i64,
        update: &MediaMetadataUpdate,
    ) -> Result<Option<MediaRecord>, AppError>;

    /// Delete a media row. Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// All media rows attached to an owner, ordered by ID
    async fn list_for_owner(&self, owner: &OwnerRef) -> Result<Vec<MediaRecord>, AppError>;

    /// Delete a media row only if it belongs to the owner
    async fn delete_for_owner(&self, owner: &OwnerRef, id: i64) -> Result<bool, AppError>;
}

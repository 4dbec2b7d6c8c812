//! Persistence collaborator interface.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::read_model::VideoWithOwner;
use crate::types::DbId;
use crate::video::{Page, ValidatedVideo, Video, VideoPatch};

/// Backing store for video records and the owner lookup the read model needs.
///
/// Implementations map their driver errors to [`CoreError::Persistence`].
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Whether a user with `owner_id` exists.
    async fn owner_exists(&self, owner_id: DbId) -> Result<bool, CoreError>;

    /// Insert a validated video, returning the stored row.
    async fn create(&self, input: &ValidatedVideo) -> Result<Video, CoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Video>, CoreError>;

    /// Apply a partial update. Returns `None` if the row does not exist.
    async fn update_details(
        &self,
        id: DbId,
        patch: &VideoPatch,
    ) -> Result<Option<Video>, CoreError>;

    /// Flip `is_published` in place. Returns `None` if the row does not exist.
    async fn toggle_publish(&self, id: DbId) -> Result<Option<Video>, CoreError>;

    /// Remove a record. Returns `true` if a row was deleted.
    async fn delete(&self, id: DbId) -> Result<bool, CoreError>;

    /// Published videos joined with their owners, newest first, read from a
    /// single snapshot.
    async fn published_with_owners(&self, page: Page) -> Result<Vec<VideoWithOwner>, CoreError>;

    /// Round-trip to the backend. Stores without a remote backend are
    /// always reachable.
    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

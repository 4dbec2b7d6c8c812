//! Video record store operations.
//!
//! [`VideoService`] owns the lifecycle rules for video records: creation only
//! after both files are durably stored, partial updates that swap thumbnails
//! without ever leaving the record pointing at a removed object, explicit
//! publish toggling, and deletes that clean up remote media. It also serves
//! the published-video read model.

use std::sync::Arc;

use crate::error::CoreError;
use crate::media::{MediaKind, MediaStorage, StoredMedia};
use crate::read_model::{self, PublishedVideo};
use crate::store::VideoStore;
use crate::types::DbId;
use crate::video::{
    validate_changes, validate_id, validate_new_video, validate_text_fields, NewVideo,
    Page, Video, VideoChanges, VideoPatch, VideoUpload,
};

/// Entry point for every video operation the HTTP layer exposes.
#[derive(Clone)]
pub struct VideoService {
    store: Arc<dyn VideoStore>,
    media: Arc<dyn MediaStorage>,
}

impl VideoService {
    pub fn new(store: Arc<dyn VideoStore>, media: Arc<dyn MediaStorage>) -> Self {
        Self { store, media }
    }

    // ── Record store ─────────────────────────────────────────────────

    /// Create a record for files that are already stored remotely.
    pub async fn create(&self, input: NewVideo) -> Result<Video, CoreError> {
        let validated = validate_new_video(&input)?;
        self.ensure_owner(validated.owner_id).await?;

        let video = self.store.create(&validated).await?;
        tracing::info!(video_id = video.id, owner_id = video.owner_id, "Video created");
        Ok(video)
    }

    /// Upload a staged video and thumbnail, then create the record.
    ///
    /// No record is created unless both uploads succeed. Objects uploaded
    /// before a later step fails are removed again on a best-effort basis.
    pub async fn publish(&self, upload: VideoUpload) -> Result<Video, CoreError> {
        let (title, description) =
            validate_text_fields(upload.title.as_deref(), upload.description.as_deref())?;
        let video_path = upload
            .video_path
            .ok_or_else(|| CoreError::Validation("video file is required".into()))?;
        let thumbnail_path = upload
            .thumbnail_path
            .ok_or_else(|| CoreError::Validation("thumbnail file is required".into()))?;
        self.ensure_owner(upload.owner_id).await?;

        let video_file = self.media.store(&video_path, MediaKind::Video).await?;
        let thumbnail = match self.media.store(&thumbnail_path, MediaKind::Image).await {
            Ok(stored) => stored,
            Err(err) => {
                self.discard(&[(&video_file, MediaKind::Video)]).await;
                return Err(err);
            }
        };

        let input = NewVideo {
            title: Some(title),
            description: Some(description),
            video_file: Some(video_file.url.clone()),
            thumbnail: Some(thumbnail.url.clone()),
            duration: video_file.duration.unwrap_or(0.0),
            owner_id: upload.owner_id,
            video_public_id: Some(video_file.public_id.clone()),
            thumbnail_public_id: Some(thumbnail.public_id.clone()),
        };

        match self.create(input).await {
            Ok(video) => Ok(video),
            Err(err) => {
                self.discard(&[
                    (&video_file, MediaKind::Video),
                    (&thumbnail, MediaKind::Image),
                ])
                .await;
                Err(err)
            }
        }
    }

    pub async fn get_by_id(&self, id: DbId) -> Result<Video, CoreError> {
        validate_id(id)?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::video_not_found(id))
    }

    /// Apply a partial update of title, description and/or thumbnail.
    ///
    /// A replacement thumbnail is stored first; the record is then pointed at
    /// it, and only after that is the previous thumbnail removed. A failed
    /// upload leaves both the record and the old thumbnail untouched. A
    /// failure removing the old thumbnail is reported after the record has
    /// been updated, so the caller knows cleanup is incomplete.
    pub async fn update(&self, id: DbId, changes: VideoChanges) -> Result<Video, CoreError> {
        validate_id(id)?;
        let changes = validate_changes(changes)?;
        let current = self.get_by_id(id).await?;

        let new_thumbnail = match &changes.thumbnail_path {
            Some(path) => Some(self.media.store(path, MediaKind::Image).await?),
            None => None,
        };

        let patch = VideoPatch {
            title: changes.title,
            description: changes.description,
            thumbnail: new_thumbnail.clone(),
        };

        let updated = match self.store.update_details(id, &patch).await {
            Ok(Some(video)) => video,
            Ok(None) => {
                if let Some(stored) = &new_thumbnail {
                    self.discard(&[(stored, MediaKind::Image)]).await;
                }
                return Err(CoreError::video_not_found(id));
            }
            Err(err) => {
                if let Some(stored) = &new_thumbnail {
                    self.discard(&[(stored, MediaKind::Image)]).await;
                }
                return Err(err);
            }
        };

        if new_thumbnail.is_some() {
            let old = current.thumbnail_provider_id().ok_or_else(|| {
                CoreError::ExternalStorage(format!(
                    "cannot determine provider id of previous thumbnail '{}'",
                    current.thumbnail
                ))
            })?;
            self.media.remove(&old, MediaKind::Image).await.map_err(|err| {
                tracing::warn!(video_id = id, public_id = %old, error = %err, "Previous thumbnail not removed");
                CoreError::ExternalStorage(format!(
                    "video {id} updated but previous thumbnail '{old}' was not removed: {err}"
                ))
            })?;
        }

        tracing::info!(video_id = id, "Video updated");
        Ok(updated)
    }

    /// Delete a record and both of its remote media objects.
    ///
    /// Every cleanup step is attempted even if an earlier one failed. The
    /// record is removed regardless of provider failures, but any failure is
    /// still reported so the caller can retry the remote cleanup.
    pub async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        let video = self.get_by_id(id).await?;

        let mut leftovers = Vec::new();
        for (provider_id, kind, url) in [
            (video.video_provider_id(), MediaKind::Video, &video.video_file),
            (video.thumbnail_provider_id(), MediaKind::Image, &video.thumbnail),
        ] {
            let Some(provider_id) = provider_id else {
                leftovers.push(format!("{url} (no provider id)"));
                continue;
            };
            if let Err(err) = self.media.remove(&provider_id, kind).await {
                tracing::warn!(video_id = id, public_id = %provider_id, error = %err, "Media removal failed");
                leftovers.push(format!("{provider_id} ({err})"));
            }
        }

        let removed = self.store.delete(id).await?;
        if !removed {
            // Deleted concurrently between the lookup and here.
            tracing::debug!(video_id = id, "Video row already gone");
        }

        if !leftovers.is_empty() {
            return Err(CoreError::ExternalStorage(format!(
                "video {id} deleted but media cleanup failed for: {}",
                leftovers.join(", ")
            )));
        }

        tracing::info!(video_id = id, "Video deleted");
        Ok(())
    }

    /// Flip the publish flag of a video.
    pub async fn toggle_publish(&self, id: DbId) -> Result<Video, CoreError> {
        validate_id(id)?;
        let video = self
            .store
            .toggle_publish(id)
            .await?
            .ok_or_else(|| CoreError::video_not_found(id))?;
        tracing::info!(video_id = id, is_published = video.is_published, "Publish status toggled");
        Ok(video)
    }

    // ── Read model ───────────────────────────────────────────────────

    /// Published videos with their owner projection. An empty store yields
    /// an empty list.
    pub async fn list_published(&self, page: Page) -> Result<Vec<PublishedVideo>, CoreError> {
        let rows = self.store.published_with_owners(page).await?;
        Ok(read_model::build(rows))
    }

    /// Whether the backing store answers.
    pub async fn store_healthy(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "Video store health check failed");
                false
            }
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    async fn ensure_owner(&self, owner_id: DbId) -> Result<(), CoreError> {
        if owner_id <= 0 || !self.store.owner_exists(owner_id).await? {
            return Err(CoreError::NotFound {
                entity: "User",
                id: owner_id,
            });
        }
        Ok(())
    }

    /// Best-effort removal of objects uploaded for an operation that failed.
    /// The triggering error is what the caller sees; leftovers are logged.
    async fn discard(&self, objects: &[(&StoredMedia, MediaKind)]) {
        for (stored, kind) in objects {
            if let Err(err) = self.media.remove(&stored.public_id, *kind).await {
                tracing::warn!(public_id = %stored.public_id, error = %err, "Orphaned upload not removed");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

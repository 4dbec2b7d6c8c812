//! Video entity, input DTOs, and lifecycle rules.
//!
//! The rules here are pure functions so they can be exercised without a
//! database or media host. [`crate::service::VideoService`] applies them
//! before touching either collaborator.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::media::StoredMedia;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Publish flag given to newly created videos.
pub const DEFAULT_IS_PUBLISHED: bool = true;

/// Maximum page size for the published listing.
pub const MAX_LIST_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A stored video record.
///
/// Provider identifiers are internal addressing for the media host and are
/// never serialized to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Video {
    pub id: DbId,
    pub video_file: String,
    pub thumbnail: String,
    #[serde(skip_serializing)]
    pub video_public_id: Option<String>,
    #[serde(skip_serializing)]
    pub thumbnail_public_id: Option<String>,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Video {
    /// Provider id of the primary media file, falling back to the URL.
    pub fn video_provider_id(&self) -> Option<String> {
        self.video_public_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .or_else(|| derive_public_id(&self.video_file))
    }

    /// Provider id of the thumbnail, falling back to the URL.
    pub fn thumbnail_provider_id(&self) -> Option<String> {
        self.thumbnail_public_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .or_else(|| derive_public_id(&self.thumbnail))
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Input for creating a record whose files are already stored remotely.
#[derive(Debug, Clone, Deserialize)]
pub struct NewVideo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_file: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: f64,
    pub owner_id: DbId,
    pub video_public_id: Option<String>,
    pub thumbnail_public_id: Option<String>,
}

/// A [`NewVideo`] that passed [`validate_new_video`]. Only this type reaches
/// the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedVideo {
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub owner_id: DbId,
    pub video_public_id: Option<String>,
    pub thumbnail_public_id: Option<String>,
    pub is_published: bool,
}

/// Input for publishing a video from locally staged files.
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_path: Option<PathBuf>,
    pub thumbnail_path: Option<PathBuf>,
    pub owner_id: DbId,
}

/// Caller-requested changes for a partial update.
#[derive(Debug, Clone, Default)]
pub struct VideoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_path: Option<PathBuf>,
}

/// Patch applied by the store. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<StoredMedia>,
}

/// Paging window for the published listing. `limit: None` means no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: i64,
}

impl Page {
    /// Clamp raw query values into a valid window.
    pub fn clamped(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.map(|l| l.clamp(1, MAX_LIST_LIMIT)),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Trim a text field, treating blank as absent.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Check the text fields of a new video.
///
/// A video needs at least one of title and description, and the title itself
/// must not be blank.
pub fn validate_text_fields(
    title: Option<&str>,
    description: Option<&str>,
) -> Result<(String, String), CoreError> {
    let title = non_blank(title);
    let description = non_blank(description);

    match (title, description) {
        (None, None) => Err(CoreError::Validation(
            "title or description is required".into(),
        )),
        (None, Some(_)) => Err(CoreError::Validation("title must not be empty".into())),
        (Some(title), description) => Ok((title, description.unwrap_or_default())),
    }
}

/// Validate a [`NewVideo`] and fill in system defaults.
pub fn validate_new_video(input: &NewVideo) -> Result<ValidatedVideo, CoreError> {
    let (title, description) =
        validate_text_fields(input.title.as_deref(), input.description.as_deref())?;

    let video_file = non_blank(input.video_file.as_deref())
        .ok_or_else(|| CoreError::Validation("video file is required".into()))?;
    let thumbnail = non_blank(input.thumbnail.as_deref())
        .ok_or_else(|| CoreError::Validation("thumbnail file is required".into()))?;

    if !input.duration.is_finite() || input.duration < 0.0 {
        return Err(CoreError::Validation(format!(
            "duration must be a non-negative number of seconds, got {}",
            input.duration
        )));
    }

    if input.owner_id <= 0 {
        return Err(CoreError::Validation("owner id is required".into()));
    }

    Ok(ValidatedVideo {
        title,
        description,
        video_file,
        thumbnail,
        duration: input.duration,
        owner_id: input.owner_id,
        video_public_id: non_blank(input.video_public_id.as_deref()),
        thumbnail_public_id: non_blank(input.thumbnail_public_id.as_deref()),
        is_published: DEFAULT_IS_PUBLISHED,
    })
}

/// Reject ids that cannot name a stored record.
pub fn validate_id(id: DbId) -> Result<(), CoreError> {
    if id <= 0 {
        return Err(CoreError::Validation(format!("invalid video id {id}")));
    }
    Ok(())
}

/// Normalize update input, requiring at least one effective change.
pub fn validate_changes(changes: VideoChanges) -> Result<VideoChanges, CoreError> {
    let normalized = VideoChanges {
        title: non_blank(changes.title.as_deref()),
        description: non_blank(changes.description.as_deref()),
        thumbnail_path: changes.thumbnail_path,
    };

    if normalized.title.is_none()
        && normalized.description.is_none()
        && normalized.thumbnail_path.is_none()
    {
        return Err(CoreError::Validation(
            "at least one of title, description or thumbnail is required".into(),
        ));
    }

    Ok(normalized)
}

/// Derive a provider id from a stored media URL.
///
/// Takes the last path segment and drops its extension, so
/// `https://host/v1/abc123.mp4` yields `abc123`. Only used for records
/// created before provider ids were stored explicitly.
pub fn derive_public_id(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    let stem = match segment.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => segment,
    };

    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Media storage collaborator interface.
//!
//! The media host owns the bytes; the core only ever sees public URLs and
//! provider ids. Implementations live in `vidhub-cloud`.

use std::path::Path;

use async_trait::async_trait;

use crate::error::CoreError;

/// Kind of stored object. Media hosts address videos and images in
/// separate namespaces, so removal needs to know which one it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    /// Resource-type segment used by the media host's API.
    pub fn resource_type(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
        }
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMedia {
    /// Public URL of the stored object.
    pub url: String,
    /// The media host's handle for later removal.
    pub public_id: String,
    /// Playback length in seconds, reported for video uploads only.
    pub duration: Option<f64>,
}

/// Remote media host.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Upload the file at `local_path` into the namespace for `kind`,
    /// returning where it landed. Callers remove it later with the same kind.
    async fn store(&self, local_path: &Path, kind: MediaKind) -> Result<StoredMedia, CoreError>;

    /// Remove a previously stored object.
    async fn remove(&self, public_id: &str, kind: MediaKind) -> Result<(), CoreError>;
}

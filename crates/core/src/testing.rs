//! In-memory collaborators for tests.
//!
//! [`InMemoryVideoStore`] and [`RecordingMediaStorage`] implement the core
//! traits without a database or network, and record enough of what happened
//! for tests to assert on call ordering and side effects. Enabled for this
//! crate's unit tests and, via the `test-support` feature, for downstream
//! integration tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::CoreError;
use crate::media::{MediaKind, MediaStorage, StoredMedia};
use crate::read_model::{OwnerSummary, VideoWithOwner};
use crate::store::VideoStore;
use crate::types::DbId;
use crate::video::{Page, ValidatedVideo, Video, VideoPatch};

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    videos: BTreeMap<DbId, Video>,
    owners: BTreeMap<DbId, OwnerSummary>,
    next_id: DbId,
    fail_writes: bool,
    fail_deletes: bool,
}

/// A [`VideoStore`] backed by ordered maps.
#[derive(Default)]
pub struct InMemoryVideoStore {
    state: Mutex<StoreState>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("in-memory store mutex poisoned")
    }

    /// Register a user that videos can reference.
    pub fn add_owner(&self, id: DbId, username: &str) -> OwnerSummary {
        let owner = OwnerSummary {
            id: Some(id),
            username: Some(username.to_string()),
            full_name: Some(format!("{username} full name")),
            email: Some(format!("{username}@example.com")),
            avatar: Some(format!("https://media.test/image/upload/{username}.png")),
        };
        self.lock().owners.insert(id, owner.clone());
        owner
    }

    /// Remove a user, leaving any of their videos with a dangling owner.
    pub fn remove_owner(&self, id: DbId) {
        self.lock().owners.remove(&id);
    }

    /// Seed a video directly, bypassing validation. Returns the assigned id.
    pub fn seed(&self, title: &str, owner_id: DbId, is_published: bool) -> Video {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        let now = Utc::now();
        let video = Video {
            id,
            video_file: format!("https://media.test/video/upload/seed-{id}.mp4"),
            thumbnail: format!("https://media.test/image/upload/seed-thumb-{id}.jpg"),
            video_public_id: Some(format!("seed-{id}")),
            thumbnail_public_id: Some(format!("seed-thumb-{id}")),
            title: title.to_string(),
            description: format!("{title} description"),
            duration: 60.0,
            views: 0,
            is_published,
            owner_id,
            created_at: now,
            updated_at: now,
        };
        state.videos.insert(id, video.clone());
        video
    }

    /// Make every subsequent insert and update fail.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Make every subsequent delete fail.
    pub fn fail_deletes(&self, fail: bool) {
        self.lock().fail_deletes = fail;
    }

    pub fn get(&self, id: DbId) -> Option<Video> {
        self.lock().videos.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().videos.is_empty()
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn owner_exists(&self, owner_id: DbId) -> Result<bool, CoreError> {
        Ok(self.lock().owners.contains_key(&owner_id))
    }

    async fn create(&self, input: &ValidatedVideo) -> Result<Video, CoreError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(CoreError::Persistence("simulated write failure".into()));
        }
        state.next_id += 1;
        let id = state.next_id;
        let now = Utc::now();
        let video = Video {
            id,
            video_file: input.video_file.clone(),
            thumbnail: input.thumbnail.clone(),
            video_public_id: input.video_public_id.clone(),
            thumbnail_public_id: input.thumbnail_public_id.clone(),
            title: input.title.clone(),
            description: input.description.clone(),
            duration: input.duration,
            views: 0,
            is_published: input.is_published,
            owner_id: input.owner_id,
            created_at: now,
            updated_at: now,
        };
        state.videos.insert(id, video.clone());
        Ok(video)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Video>, CoreError> {
        Ok(self.lock().videos.get(&id).cloned())
    }

    async fn update_details(
        &self,
        id: DbId,
        patch: &VideoPatch,
    ) -> Result<Option<Video>, CoreError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(CoreError::Persistence("simulated write failure".into()));
        }
        let Some(video) = state.videos.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = &patch.title {
            video.title = title.clone();
        }
        if let Some(description) = &patch.description {
            video.description = description.clone();
        }
        if let Some(thumbnail) = &patch.thumbnail {
            video.thumbnail = thumbnail.url.clone();
            video.thumbnail_public_id = Some(thumbnail.public_id.clone());
        }
        video.updated_at = Utc::now();
        Ok(Some(video.clone()))
    }

    async fn toggle_publish(&self, id: DbId) -> Result<Option<Video>, CoreError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(CoreError::Persistence("simulated write failure".into()));
        }
        let Some(video) = state.videos.get_mut(&id) else {
            return Ok(None);
        };
        video.is_published = !video.is_published;
        video.updated_at = Utc::now();
        Ok(Some(video.clone()))
    }

    async fn delete(&self, id: DbId) -> Result<bool, CoreError> {
        let mut state = self.lock();
        if state.fail_deletes {
            return Err(CoreError::Persistence("simulated delete failure".into()));
        }
        Ok(state.videos.remove(&id).is_some())
    }

    async fn published_with_owners(&self, page: Page) -> Result<Vec<VideoWithOwner>, CoreError> {
        let state = self.lock();
        let mut rows: Vec<VideoWithOwner> = state
            .videos
            .values()
            .filter(|v| v.is_published)
            .map(|v| VideoWithOwner {
                video: v.clone(),
                owner: state.owners.get(&v.owner_id).cloned(),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.video
                .created_at
                .cmp(&a.video.created_at)
                .then(b.video.id.cmp(&a.video.id))
        });

        let offset = usize::try_from(page.offset).unwrap_or(0);
        let limit = page
            .limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }
}

// ---------------------------------------------------------------------------
// Media storage
// ---------------------------------------------------------------------------

/// One call made against [`RecordingMediaStorage`].
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    Store(PathBuf, MediaKind),
    Remove(String, MediaKind),
}

#[derive(Default)]
struct MediaState {
    calls: Vec<MediaCall>,
    fail_store_matching: Vec<String>,
    fail_remove_matching: Vec<String>,
    uploads: u32,
}

/// A [`MediaStorage`] that fabricates URLs and records every call.
#[derive(Default)]
pub struct RecordingMediaStorage {
    state: Mutex<MediaState>,
}

/// Duration reported for every stored video file.
pub const FAKE_VIDEO_DURATION: f64 = 42.0;

impl RecordingMediaStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MediaState> {
        self.state.lock().expect("media storage mutex poisoned")
    }

    /// Fail uploads whose path contains `needle`.
    pub fn fail_store_matching(&self, needle: &str) {
        self.lock().fail_store_matching.push(needle.to_string());
    }

    /// Fail removals whose public id contains `needle`.
    pub fn fail_remove_matching(&self, needle: &str) {
        self.lock().fail_remove_matching.push(needle.to_string());
    }

    pub fn calls(&self) -> Vec<MediaCall> {
        self.lock().calls.clone()
    }

    /// Public ids passed to `remove`, in call order.
    pub fn removed(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                MediaCall::Remove(id, _) => Some(id.clone()),
                MediaCall::Store(..) => None,
            })
            .collect()
    }
}

#[async_trait]
impl MediaStorage for RecordingMediaStorage {
    async fn store(&self, local_path: &Path, kind: MediaKind) -> Result<StoredMedia, CoreError> {
        let mut state = self.lock();
        state
            .calls
            .push(MediaCall::Store(local_path.to_path_buf(), kind));

        let display = local_path.to_string_lossy();
        if state
            .fail_store_matching
            .iter()
            .any(|needle| display.contains(needle.as_str()))
        {
            return Err(CoreError::ExternalStorage(format!(
                "simulated upload failure for {display}"
            )));
        }

        state.uploads += 1;
        let stem = local_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("file");
        let ext = local_path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("bin");
        let public_id = format!("{stem}-{}", state.uploads);

        Ok(StoredMedia {
            url: format!(
                "https://media.test/{}/upload/{public_id}.{ext}",
                kind.resource_type()
            ),
            public_id,
            duration: (kind == MediaKind::Video).then_some(FAKE_VIDEO_DURATION),
        })
    }

    async fn remove(&self, public_id: &str, kind: MediaKind) -> Result<(), CoreError> {
        let mut state = self.lock();
        state
            .calls
            .push(MediaCall::Remove(public_id.to_string(), kind));

        if state
            .fail_remove_matching
            .iter()
            .any(|needle| public_id.contains(needle.as_str()))
        {
            return Err(CoreError::ExternalStorage(format!(
                "simulated removal failure for {public_id}"
            )));
        }
        Ok(())
    }
}

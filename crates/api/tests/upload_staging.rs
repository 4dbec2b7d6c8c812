//! Staged upload lifetime across request timeouts.

mod common;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use common::{build_test_app_with, Part, TestApp};
use vidhub_core::error::CoreError;
use vidhub_core::media::{MediaKind, MediaStorage, StoredMedia};
use vidhub_core::testing::RecordingMediaStorage;

/// Media storage whose uploads take `delay` before completing.
struct SlowMediaStorage {
    inner: Arc<RecordingMediaStorage>,
    delay: Duration,
}

#[async_trait]
impl MediaStorage for SlowMediaStorage {
    async fn store(&self, local_path: &Path, kind: MediaKind) -> Result<StoredMedia, CoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.store(local_path, kind).await
    }

    async fn remove(&self, public_id: &str, kind: MediaKind) -> Result<(), CoreError> {
        self.inner.remove(public_id, kind).await
    }
}

fn slow_app(request_secs: u64, upload_secs: u64, delay: Duration) -> TestApp {
    build_test_app_with(
        |config| {
            config.request_timeout_secs = request_secs;
            config.upload_timeout_secs = upload_secs;
        },
        move |inner| Arc::new(SlowMediaStorage { inner, delay }) as Arc<dyn MediaStorage>,
    )
}

fn form() -> [Part; 4] {
    [
        Part::Text("title", "Slow upload"),
        Part::Text("description", "Takes a while"),
        Part::File("videoFile", "c.mp4", b"video bytes"),
        Part::File("thumbnail", "t.jpg", b"jpeg bytes"),
    ]
}

#[tokio::test]
async fn timed_out_publish_leaves_no_staged_files() {
    let test = slow_app(1, 1, Duration::from_secs(3));

    let response = test
        .multipart(Method::POST, "/api/v1/videos", &form())
        .await;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(test.store.is_empty());
    assert!(
        test.staged_files().is_empty(),
        "staged files left behind: {:?}",
        test.staged_files()
    );
}

#[tokio::test]
async fn timed_out_update_leaves_no_staged_files() {
    let test = slow_app(1, 1, Duration::from_secs(3));
    let seeded = test.store.seed("Clip", common::OWNER_ID, true);

    let response = test
        .multipart(
            Method::PATCH,
            &format!("/api/v1/videos/{}", seeded.id),
            &[Part::File("thumbnail", "t.jpg", b"jpeg bytes")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(test.store.get(seeded.id).unwrap().thumbnail, seeded.thumbnail);
    assert!(test.staged_files().is_empty());
}

#[tokio::test]
async fn uploads_run_under_their_own_timeout() {
    // Two uploads of 1.5s each outlast the 1s request timeout.
    let test = slow_app(1, 30, Duration::from_millis(1500));

    let response = test
        .multipart(Method::POST, "/api/v1/videos", &form())
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(test.store.len(), 1);
    assert!(test.staged_files().is_empty());
}

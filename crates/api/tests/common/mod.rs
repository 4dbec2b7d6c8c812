use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use vidhub_api::auth::jwt::{generate_access_token, JwtConfig};
use vidhub_api::config::ServerConfig;
use vidhub_api::router::build_app_router;
use vidhub_api::state::AppState;
use vidhub_core::media::MediaStorage;
use vidhub_core::service::VideoService;
use vidhub_core::testing::{InMemoryVideoStore, RecordingMediaStorage};
use vidhub_core::types::DbId;

/// User that exists in every test store.
pub const OWNER_ID: DbId = 1;

const BOUNDARY: &str = "vidhub-test-boundary";

/// The application plus handles on its in-memory collaborators.
pub struct TestApp {
    pub app: Router,
    pub store: Arc<InMemoryVideoStore>,
    pub media: Arc<RecordingMediaStorage>,
    pub config: ServerConfig,
    upload_dir: TempDir,
}

impl TestApp {
    /// Files currently left in the staging directory.
    pub fn staged_files(&self) -> Vec<String> {
        std::fs::read_dir(self.upload_dir.path())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `Authorization` header value for `user_id`.
    pub fn bearer(&self, user_id: DbId) -> String {
        let token = generate_access_token(user_id, &self.config.jwt).unwrap();
        format!("Bearer {token}")
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    /// Send a request with an `Authorization` header for [`OWNER_ID`].
    pub async fn authed(&self, method: Method, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(AUTHORIZATION, self.bearer(OWNER_ID))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a multipart form, authenticated as [`OWNER_ID`].
    pub async fn multipart(&self, method: Method, uri: &str, parts: &[Part]) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(AUTHORIZATION, self.bearer(OWNER_ID))
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(request).await
    }
}

/// Build a test `ServerConfig` staging uploads into `upload_dir`.
pub fn test_config(upload_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_timeout_secs: 30,
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 10 * 1024 * 1024,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router over in-memory collaborators.
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app() -> TestApp {
    build_test_app_with(|_| {}, |media| media as Arc<dyn MediaStorage>)
}

/// Like [`build_test_app`], with a config tweak and a wrapper around the
/// recording media storage (for example to slow it down).
pub fn build_test_app_with(
    configure: impl FnOnce(&mut ServerConfig),
    wrap_media: impl FnOnce(Arc<RecordingMediaStorage>) -> Arc<dyn MediaStorage>,
) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(upload_dir.path());
    configure(&mut config);

    let store = Arc::new(InMemoryVideoStore::new());
    store.add_owner(OWNER_ID, "ana");
    let media = Arc::new(RecordingMediaStorage::new());

    let state = AppState {
        config: Arc::new(config.clone()),
        videos: VideoService::new(store.clone(), wrap_media(media.clone())),
    };
    let app = build_app_router(state, &config);

    TestApp {
        app,
        store,
        media,
        config,
        upload_dir,
    }
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

/// One multipart form part.
pub enum Part {
    Text(&'static str, &'static str),
    File(&'static str, &'static str, &'static [u8]),
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

//! [`MediaStorage`] backed by the media host's REST API.

use std::path::Path;

use async_trait::async_trait;
use vidhub_core::error::CoreError;
use vidhub_core::media::{MediaKind, MediaStorage, StoredMedia};

use crate::api::{CloudinaryApi, CloudinaryApiError, DestroyResponse, UploadResponse};
use crate::config::CloudinaryConfig;

/// Stores staged files on the media host.
pub struct CloudinaryStorage {
    api: CloudinaryApi,
}

impl CloudinaryStorage {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            api: CloudinaryApi::new(config),
        }
    }
}

#[async_trait]
impl MediaStorage for CloudinaryStorage {
    async fn store(&self, local_path: &Path, kind: MediaKind) -> Result<StoredMedia, CoreError> {
        let unreadable = |e: std::io::Error| {
            CoreError::ExternalStorage(format!(
                "cannot read staged file {}: {e}",
                local_path.display()
            ))
        };
        let file = tokio::fs::File::open(local_path).await.map_err(unreadable)?;
        let len = file.metadata().await.map_err(unreadable)?.len();
        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let uploaded = self
            .api
            .upload(kind.resource_type(), file_name, file, len)
            .await
            .map_err(|e| upload_error(local_path, e))?;

        tracing::debug!(public_id = %uploaded.public_id, kind = kind.resource_type(), "Media stored");
        Ok(stored_media(uploaded, kind))
    }

    async fn remove(&self, public_id: &str, kind: MediaKind) -> Result<(), CoreError> {
        let response = self
            .api
            .destroy(kind.resource_type(), public_id)
            .await
            .map_err(|e| {
                CoreError::ExternalStorage(format!("failed to remove {public_id}: {e}"))
            })?;
        check_destroyed(public_id, response)
    }
}

fn upload_error(path: &Path, err: CloudinaryApiError) -> CoreError {
    tracing::warn!(path = %path.display(), error = %err, "Media upload failed");
    CoreError::ExternalStorage(format!("failed to upload {}: {err}", path.display()))
}

fn stored_media(uploaded: UploadResponse, kind: MediaKind) -> StoredMedia {
    StoredMedia {
        url: uploaded.secure_url,
        public_id: uploaded.public_id,
        duration: match kind {
            MediaKind::Video => uploaded.duration,
            MediaKind::Image => None,
        },
    }
}

/// `"not found"` means the object is already gone, which is the desired end
/// state of a removal.
fn check_destroyed(public_id: &str, response: DestroyResponse) -> Result<(), CoreError> {
    match response.result.as_str() {
        "ok" => Ok(()),
        "not found" => {
            tracing::debug!(public_id, "Media already absent");
            Ok(())
        }
        other => Err(CoreError::ExternalStorage(
            CloudinaryApiError::Rejected(format!("destroy {public_id}: {other}")).to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    fn config(api_base: String) -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
            api_base,
        }
    }

    /// Accept one HTTP request, answer it with `reply` as JSON and hand back
    /// the request line and body.
    async fn serve_once(reply: &'static str) -> (String, JoinHandle<(String, Vec<u8>)>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 8192];

            let body_start = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before headers");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&buf[..body_start]).to_ascii_lowercase();
            let len: usize = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map(|v| v.trim().parse().unwrap())
                .expect("upload must declare its length");
            while buf.len() < body_start + len {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed mid-body");
                buf.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reply}",
                reply.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();

            let request_line = head.lines().next().unwrap_or_default().to_string();
            (request_line, buf[body_start..body_start + len].to_vec())
        });

        (base, handle)
    }

    fn upload(duration: Option<f64>) -> UploadResponse {
        UploadResponse {
            public_id: "clip".into(),
            secure_url: "https://h/demo/video/upload/clip.mp4".into(),
            duration,
        }
    }

    #[test]
    fn video_upload_keeps_duration() {
        let stored = stored_media(upload(Some(9.5)), MediaKind::Video);
        assert_eq!(stored.duration, Some(9.5));
        assert_eq!(stored.public_id, "clip");
        assert_eq!(stored.url, "https://h/demo/video/upload/clip.mp4");
    }

    #[test]
    fn image_upload_drops_duration() {
        assert_eq!(stored_media(upload(Some(1.0)), MediaKind::Image).duration, None);
    }

    #[test]
    fn destroy_results() {
        let result = |r: &str| DestroyResponse { result: r.into() };
        assert!(check_destroyed("a", result("ok")).is_ok());
        assert!(check_destroyed("a", result("not found")).is_ok());
        assert_matches!(
            check_destroyed("a", result("error")),
            Err(CoreError::ExternalStorage(msg)) if msg.contains("destroy a")
        );
    }

    #[tokio::test]
    async fn missing_staged_file_is_external_storage_error() {
        let storage = CloudinaryStorage::new(config("http://127.0.0.1:9".into()));

        let result = storage
            .store(Path::new("/nonexistent/vidhub/staged/clip.mp4"), MediaKind::Video)
            .await;
        assert_matches!(result, Err(CoreError::ExternalStorage(_)));
    }

    #[tokio::test]
    async fn store_streams_the_staged_file_into_the_kind_namespace() {
        let dir = std::env::temp_dir().join(format!("vidhub-cloud-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let staged = dir.join("clip.3gp");
        let contents = vec![7u8; 256 * 1024];
        tokio::fs::write(&staged, &contents).await.unwrap();

        let (base, server) = serve_once(
            r#"{"public_id":"clip","secure_url":"https://h/demo/video/upload/clip.3gp","duration":4.5}"#,
        )
        .await;
        let storage = CloudinaryStorage::new(config(base));

        let stored = storage.store(&staged, MediaKind::Video).await.unwrap();
        let (request_line, body) = server.await.unwrap();
        tokio::fs::remove_dir_all(&dir).await.unwrap();

        assert_eq!(stored.public_id, "clip");
        assert_eq!(stored.duration, Some(4.5));
        assert!(request_line.starts_with("post /demo/video/upload "), "{request_line}");
        assert!(body.windows(contents.len()).any(|w| w == contents.as_slice()));
        assert!(String::from_utf8_lossy(&body).contains("filename=\"clip.3gp\""));
    }
}

//! Multipart upload staging.
//!
//! File parts are streamed to the configured upload directory under a
//! unique name; text parts are collected as-is. Each staged file is held by
//! a [`TempPath`], so it is removed when the form is dropped. That covers a
//! request cut short by a timeout or a client disconnect as well as the
//! normal return path.

use std::path::{Path, PathBuf};

use axum::extract::multipart::{Field, Multipart};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const TITLE_FIELD: &str = "title";
pub const DESCRIPTION_FIELD: &str = "description";
pub const VIDEO_FIELD: &str = "videoFile";
pub const THUMBNAIL_FIELD: &str = "thumbnail";

/// A parsed multipart form with its files on local disk.
#[derive(Debug, Default)]
pub struct StagedForm {
    pub title: Option<String>,
    pub description: Option<String>,
    video: Option<TempPath>,
    thumbnail: Option<TempPath>,
}

impl StagedForm {
    /// Read every field of `multipart`, staging files under `dir`.
    ///
    /// On error the partly read form is dropped, which removes anything
    /// already staged.
    pub async fn read(dir: &Path, multipart: &mut Multipart) -> AppResult<Self> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AppError::InternalError(format!("cannot create upload dir {}: {e}", dir.display()))
        })?;

        let mut form = Self::default();
        form.read_fields(dir, multipart).await?;
        Ok(form)
    }

    pub fn video_path(&self) -> Option<PathBuf> {
        self.video.as_deref().map(Path::to_path_buf)
    }

    pub fn thumbnail_path(&self) -> Option<PathBuf> {
        self.thumbnail.as_deref().map(Path::to_path_buf)
    }

    async fn read_fields(&mut self, dir: &Path, multipart: &mut Multipart) -> AppResult<()> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                TITLE_FIELD => self.title = Some(read_text(field).await?),
                DESCRIPTION_FIELD => self.description = Some(read_text(field).await?),
                VIDEO_FIELD => {
                    let staged = stage_file(dir, field).await?;
                    replace_staged(&mut self.video, staged);
                }
                THUMBNAIL_FIELD => {
                    let staged = stage_file(dir, field).await?;
                    replace_staged(&mut self.thumbnail, staged);
                }
                _ => {} // ignore unknown fields
            }
        }
        Ok(())
    }

    /// Remove every staged file now. Failures are logged, not returned.
    pub fn discard(self) {
        for staged in [self.video, self.thumbnail].into_iter().flatten() {
            remove_staged(staged);
        }
    }
}

async fn read_text(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Stream a file part to disk. Parts without a file name (an empty file
/// input) count as absent.
async fn stage_file(dir: &Path, mut field: Field<'_>) -> AppResult<Option<TempPath>> {
    let Some(original) = field
        .file_name()
        .map(str::to_owned)
        .filter(|n| !n.trim().is_empty())
    else {
        return Ok(None);
    };

    let path = dir.join(staged_file_name(&original));
    // Guard first: the file is removed on every exit from here on,
    // including a cancelled request.
    let staged = TempPath::from_path(&path);
    let file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| stage_error(&path, e))?;
    write_field(&path, file, &mut field).await?;

    tracing::debug!(path = %path.display(), "Upload staged");
    Ok(Some(staged))
}

fn stage_error(path: &Path, e: std::io::Error) -> AppError {
    AppError::InternalError(format!("cannot stage upload {}: {e}", path.display()))
}

async fn write_field(
    path: &Path,
    mut file: tokio::fs::File,
    field: &mut Field<'_>,
) -> AppResult<()> {
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| stage_error(path, e))?;
    }
    file.flush().await.map_err(|e| stage_error(path, e))?;
    Ok(())
}

/// A repeated file field replaces the earlier one.
fn replace_staged(slot: &mut Option<TempPath>, staged: Option<TempPath>) {
    if staged.is_none() {
        return;
    }
    if let Some(previous) = std::mem::replace(slot, staged) {
        remove_staged(previous);
    }
}

fn remove_staged(staged: TempPath) {
    let path = staged.to_path_buf();
    match staged.close() {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Staged upload not removed");
        }
    }
}

/// Unique on-disk name that keeps the client's extension, which the media
/// host uses to detect the file format.
fn staged_file_name(original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_start_matches('.');
    let sanitized = if sanitized.is_empty() { "upload" } else { sanitized };

    format!("{}-{sanitized}", Uuid::new_v4().simple())
}

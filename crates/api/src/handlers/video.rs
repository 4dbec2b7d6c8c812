//! Handlers for the `/videos` resource.

use axum::extract::{Multipart, Path, Query, State};
use vidhub_core::read_model::PublishedVideo;
use vidhub_core::types::DbId;
use vidhub_core::video::{Video, VideoChanges, VideoUpload};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{ApiResponse, Empty};
use crate::state::AppState;
use crate::upload::StagedForm;

/// GET /api/v1/videos
///
/// Published videos with a minimal owner projection, newest first.
pub async fn list_published(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<ApiResponse<Vec<PublishedVideo>>> {
    let videos = state.videos.list_published(params.page()).await?;
    Ok(ApiResponse::ok(videos, "Videos fetched successfully"))
}

/// POST /api/v1/videos
///
/// Multipart form with `videoFile`, `thumbnail`, `title` and `description`.
/// The caller becomes the owner.
pub async fn publish(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<Video>> {
    let form = StagedForm::read(&state.config.upload_dir, &mut multipart).await?;

    let upload = VideoUpload {
        title: form.title.clone(),
        description: form.description.clone(),
        video_path: form.video_path(),
        thumbnail_path: form.thumbnail_path(),
        owner_id: user.user_id,
    };
    let result = state.videos.publish(upload).await;
    form.discard();

    Ok(ApiResponse::created(result?, "Video published successfully"))
}

/// GET /api/v1/videos/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Video>> {
    let video = state.videos.get_by_id(id).await?;
    Ok(ApiResponse::ok(video, "Video fetched successfully"))
}

/// PATCH /api/v1/videos/{id}
///
/// Multipart form with any of `title`, `description` and `thumbnail`.
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<Video>> {
    let form = StagedForm::read(&state.config.upload_dir, &mut multipart).await?;

    let changes = VideoChanges {
        title: form.title.clone(),
        description: form.description.clone(),
        thumbnail_path: form.thumbnail_path(),
    };
    let result = state.videos.update(id, changes).await;
    form.discard();

    Ok(ApiResponse::ok(result?, "Video details updated successfully"))
}

/// DELETE /api/v1/videos/{id}
///
/// Removes both media objects and the record.
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Empty>> {
    state.videos.delete(id).await?;
    Ok(ApiResponse::ok(Empty::default(), "Video deleted successfully"))
}

/// PATCH /api/v1/videos/toggle/publish/{id}
pub async fn toggle_publish(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Video>> {
    let video = state.videos.toggle_publish(id).await?;
    Ok(ApiResponse::ok(video, "Publish status toggled successfully"))
}

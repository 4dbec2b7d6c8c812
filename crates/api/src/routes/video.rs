//! Route definitions for the `/videos` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use super::RouteTimeouts;
use crate::handlers::video;
use crate::state::AppState;

/// Routes mounted at `/videos`.
///
/// ```text
/// GET    /                        -> list_published
/// POST   /                        -> publish
/// GET    /{id}                    -> get_by_id
/// PATCH  /{id}                    -> update
/// DELETE /{id}                    -> delete
/// PATCH  /toggle/publish/{id}     -> toggle_publish
/// ```
///
/// `publish` and `update` take multipart uploads and run under the upload
/// timeout; everything else uses the request timeout.
pub fn router(timeouts: RouteTimeouts) -> Router<AppState> {
    let RouteTimeouts { request, upload } = timeouts;

    Router::new()
        .route(
            "/",
            get(video::list_published)
                .layer(request)
                .merge(post(video::publish).layer(upload)),
        )
        .route(
            "/{id}",
            get(video::get_by_id)
                .delete(video::delete)
                .layer(request)
                .merge(patch(video::update).layer(upload)),
        )
        .route(
            "/toggle/publish/{id}",
            patch(video::toggle_publish).layer(request),
        )
}

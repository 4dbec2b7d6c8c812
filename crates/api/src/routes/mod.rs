pub mod health;
pub mod video;

use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Timeouts applied route by route. Multipart uploads get their own budget
/// since they carry the whole file through staging and the media host.
#[derive(Debug, Clone, Copy)]
pub struct RouteTimeouts {
    pub request: TimeoutLayer,
    pub upload: TimeoutLayer,
}

impl RouteTimeouts {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            request: timeout_layer(config.request_timeout_secs),
            upload: timeout_layer(config.upload_timeout_secs),
        }
    }
}

fn timeout_layer(secs: u64) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(secs))
}

/// Build the `/api/v1` route tree.
///
/// ```text
/// /videos                          list (public), publish (auth)
/// /videos/{id}                     get (public), update, delete (auth)
/// /videos/toggle/publish/{id}      toggle publish flag (auth)
/// ```
pub fn api_routes(timeouts: RouteTimeouts) -> Router<AppState> {
    Router::new().nest("/videos", video::router(timeouts))
}

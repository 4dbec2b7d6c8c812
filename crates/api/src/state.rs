use std::sync::Arc;

use vidhub_core::service::VideoService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the config is behind an `Arc` and the service only
/// holds `Arc`s to its collaborators.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Video record store and published read model.
    pub videos: VideoService,
}

//! Shared query parameter types for API handlers.

use serde::Deserialize;
use vidhub_core::video::Page;

/// Pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Clamp into a valid listing window.
    pub fn page(&self) -> Page {
        Page::clamped(self.limit, self.offset)
    }
}

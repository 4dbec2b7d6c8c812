use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The backing store failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The media host rejected or failed a call.
    #[error("External storage error: {0}")]
    ExternalStorage(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl CoreError {
    /// Shorthand for a missing video.
    pub fn video_not_found(id: DbId) -> Self {
        Self::NotFound {
            entity: "Video",
            id,
        }
    }
}

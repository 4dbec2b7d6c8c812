//! [`VideoStore`] implementation over the sqlx repositories.

use async_trait::async_trait;
use vidhub_core::error::CoreError;
use vidhub_core::read_model::VideoWithOwner;
use vidhub_core::store::VideoStore;
use vidhub_core::types::DbId;
use vidhub_core::video::{Page, ValidatedVideo, Video, VideoPatch};

use crate::repositories::{UserRepo, VideoRepo};
use crate::DbPool;

/// PostgreSQL-backed video store.
#[derive(Clone)]
pub struct PgVideoStore {
    pool: DbPool,
}

impl PgVideoStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a driver error to the core's persistence error.
fn persistence(op: &'static str) -> impl FnOnce(sqlx::Error) -> CoreError {
    move |err| {
        tracing::error!(error = %err, op, "Database error");
        CoreError::Persistence(format!("{op}: {err}"))
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn owner_exists(&self, owner_id: DbId) -> Result<bool, CoreError> {
        UserRepo::exists(&self.pool, owner_id)
            .await
            .map_err(persistence("owner lookup"))
    }

    async fn create(&self, input: &ValidatedVideo) -> Result<Video, CoreError> {
        VideoRepo::create(&self.pool, input)
            .await
            .map(Video::from)
            .map_err(persistence("insert video"))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Video>, CoreError> {
        VideoRepo::find_by_id(&self.pool, id)
            .await
            .map(|row| row.map(Video::from))
            .map_err(persistence("find video"))
    }

    async fn update_details(
        &self,
        id: DbId,
        patch: &VideoPatch,
    ) -> Result<Option<Video>, CoreError> {
        VideoRepo::update(&self.pool, id, patch)
            .await
            .map(|row| row.map(Video::from))
            .map_err(persistence("update video"))
    }

    async fn toggle_publish(&self, id: DbId) -> Result<Option<Video>, CoreError> {
        VideoRepo::toggle_publish(&self.pool, id)
            .await
            .map(|row| row.map(Video::from))
            .map_err(persistence("toggle publish"))
    }

    async fn delete(&self, id: DbId) -> Result<bool, CoreError> {
        VideoRepo::delete(&self.pool, id)
            .await
            .map_err(persistence("delete video"))
    }

    async fn published_with_owners(&self, page: Page) -> Result<Vec<VideoWithOwner>, CoreError> {
        let rows = VideoRepo::list_published(&self.pool, page)
            .await
            .map_err(persistence("list published videos"))?;
        Ok(rows.into_iter().map(VideoWithOwner::from).collect())
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(persistence("health check"))
    }
}

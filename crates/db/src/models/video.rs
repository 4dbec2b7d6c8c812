//! Video entity model and the joined row behind the published listing.

use sqlx::FromRow;
use vidhub_core::read_model::{OwnerSummary, VideoWithOwner};
use vidhub_core::types::{DbId, Timestamp};
use vidhub_core::video::Video;

/// A row from the `videos` table.
#[derive(Debug, Clone, FromRow)]
pub struct VideoRow {
    pub id: DbId,
    pub video_file: String,
    pub thumbnail: String,
    pub video_public_id: Option<String>,
    pub thumbnail_public_id: Option<String>,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Self {
            id: row.id,
            video_file: row.video_file,
            thumbnail: row.thumbnail,
            video_public_id: row.video_public_id,
            thumbnail_public_id: row.thumbnail_public_id,
            title: row.title,
            description: row.description,
            duration: row.duration,
            views: row.views,
            is_published: row.is_published,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A published video joined with its owner. Owner columns are `NULL` when
/// the owner reference does not resolve.
#[derive(Debug, Clone, FromRow)]
pub struct PublishedVideoRow {
    #[sqlx(flatten)]
    pub video: VideoRow,
    pub owner_user_id: Option<DbId>,
    pub owner_username: Option<String>,
    pub owner_full_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_avatar: Option<String>,
}

impl From<PublishedVideoRow> for VideoWithOwner {
    fn from(row: PublishedVideoRow) -> Self {
        let owner = row.owner_user_id.map(|id| OwnerSummary {
            id: Some(id),
            username: row.owner_username,
            full_name: row.owner_full_name,
            email: row.owner_email,
            avatar: row.owner_avatar,
        });
        Self {
            video: row.video.into(),
            owner,
        }
    }
}

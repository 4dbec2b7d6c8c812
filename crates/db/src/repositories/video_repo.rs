//! Repository for the `videos` table.

use sqlx::PgPool;
use vidhub_core::types::DbId;
use vidhub_core::video::{Page, ValidatedVideo, VideoPatch};

use crate::models::video::{PublishedVideoRow, VideoRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, video_file, thumbnail, video_public_id, thumbnail_public_id, \
    title, description, duration, views, is_published, owner_id, created_at, updated_at";

/// Provides CRUD, publish toggling and the published listing for videos.
pub struct VideoRepo;

impl VideoRepo {
    // ── Standard CRUD ────────────────────────────────────────────────

    /// Insert a new video, returning the created row.
    pub async fn create(pool: &PgPool, input: &ValidatedVideo) -> Result<VideoRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos
                (video_file, thumbnail, video_public_id, thumbnail_public_id,
                 title, description, duration, is_published, owner_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoRow>(&query)
            .bind(&input.video_file)
            .bind(&input.thumbnail)
            .bind(&input.video_public_id)
            .bind(&input.thumbnail_public_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.duration)
            .bind(input.is_published)
            .bind(input.owner_id)
            .fetch_one(pool)
            .await
    }

    /// Find a video by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<VideoRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1");
        sqlx::query_as::<_, VideoRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a video. Only non-`None` fields in `patch` are applied;
    /// `is_published`, `views` and the primary file are never touched here.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        patch: &VideoPatch,
    ) -> Result<Option<VideoRow>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                thumbnail = COALESCE($4, thumbnail),
                thumbnail_public_id = COALESCE($5, thumbnail_public_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let (thumbnail, thumbnail_public_id) = match &patch.thumbnail {
            Some(stored) => (Some(stored.url.as_str()), Some(stored.public_id.as_str())),
            None => (None, None),
        };
        sqlx::query_as::<_, VideoRow>(&query)
            .bind(id)
            .bind(&patch.title)
            .bind(&patch.description)
            .bind(thumbnail)
            .bind(thumbnail_public_id)
            .fetch_optional(pool)
            .await
    }

    /// Flip `is_published` in a single statement so concurrent toggles do
    /// not lose updates. Returns `None` if the row does not exist.
    pub async fn toggle_publish(pool: &PgPool, id: DbId) -> Result<Option<VideoRow>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET is_published = NOT is_published
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a video by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Read model ───────────────────────────────────────────────────

    /// Published videos joined with their owner, newest first.
    ///
    /// A single statement, so every row comes from the same snapshot. The
    /// `LEFT JOIN` keeps videos whose owner no longer exists.
    pub async fn list_published(
        pool: &PgPool,
        page: Page,
    ) -> Result<Vec<PublishedVideoRow>, sqlx::Error> {
        sqlx::query_as::<_, PublishedVideoRow>(
            "SELECT v.id, v.video_file, v.thumbnail, v.video_public_id, v.thumbnail_public_id, \
                    v.title, v.description, v.duration, v.views, v.is_published, v.owner_id, \
                    v.created_at, v.updated_at, \
                    u.id AS owner_user_id, u.username AS owner_username, \
                    u.full_name AS owner_full_name, u.email AS owner_email, \
                    u.avatar AS owner_avatar \
             FROM videos v \
             LEFT JOIN users u ON u.id = v.owner_id \
             WHERE v.is_published = true \
             ORDER BY v.created_at DESC, v.id DESC \
             LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool)
        .await
    }
}

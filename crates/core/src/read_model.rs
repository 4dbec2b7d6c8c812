//! Published-video read model.
//!
//! The store performs the match and the owner lookup in one read; this module
//! reshapes the joined rows into the display-oriented entries served to
//! public browsing surfaces. Entries are derived on every call and never
//! persisted.

use std::cmp::Reverse;

use serde::Serialize;

use crate::types::{DbId, Timestamp};
use crate::video::Video;

/// Minimal owner projection embedded in each entry.
///
/// Every field is optional: a video whose owner no longer resolves carries
/// an empty projection, serialized as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OwnerSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl OwnerSummary {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A video row joined with its owner, as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoWithOwner {
    pub video: Video,
    /// `None` when the owner reference is dangling.
    pub owner: Option<OwnerSummary>,
}

/// One entry of the public listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedVideo {
    pub id: DbId,
    pub thumbnail: String,
    pub title: String,
    pub duration: f64,
    pub views: i64,
    pub owner: OwnerSummary,
    pub created_at: Timestamp,
}

impl From<VideoWithOwner> for PublishedVideo {
    fn from(row: VideoWithOwner) -> Self {
        let VideoWithOwner { video, owner } = row;
        Self {
            id: video.id,
            thumbnail: video.thumbnail,
            title: video.title,
            duration: video.duration,
            views: video.views,
            owner: owner.unwrap_or_default(),
            created_at: video.created_at,
        }
    }
}

/// Build the listing from joined rows.
///
/// Unpublished rows are dropped even if a store hands them over, and entries
/// are ordered newest first with the id as tie-breaker so repeated calls over
/// the same data yield the same sequence.
pub fn build(rows: Vec<VideoWithOwner>) -> Vec<PublishedVideo> {
    let mut entries: Vec<PublishedVideo> = rows
        .into_iter()
        .filter(|row| row.video.is_published)
        .map(PublishedVideo::from)
        .collect();

    entries.sort_by_key(|e| (Reverse(e.created_at), Reverse(e.id)));
    entries
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn video(id: DbId, is_published: bool, age_secs: i64) -> Video {
        let created_at = Utc::now() - Duration::seconds(age_secs);
        Video {
            id,
            video_file: format!("https://cdn.example/v/{id}.mp4"),
            thumbnail: format!("https://cdn.example/i/{id}.jpg"),
            video_public_id: Some(format!("v{id}")),
            thumbnail_public_id: Some(format!("i{id}")),
            title: format!("Video {id}"),
            description: "secret description".into(),
            duration: 30.0,
            views: id * 10,
            is_published,
            owner_id: 1,
            created_at,
            updated_at: created_at,
        }
    }

    fn owner() -> OwnerSummary {
        OwnerSummary {
            id: Some(1),
            username: Some("ana".into()),
            full_name: Some("Ana Lima".into()),
            email: Some("ana@example.com".into()),
            avatar: Some("https://cdn.example/a/ana.png".into()),
        }
    }

    #[test]
    fn keeps_only_published_rows() {
        let rows = vec![
            VideoWithOwner { video: video(1, true, 30), owner: Some(owner()) },
            VideoWithOwner { video: video(2, false, 20), owner: Some(owner()) },
            VideoWithOwner { video: video(3, true, 10), owner: Some(owner()) },
        ];
        let ids: Vec<DbId> = build(rows).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn dangling_owner_yields_empty_projection() {
        let rows = vec![VideoWithOwner { video: video(4, true, 0), owner: None }];
        let entries = build(rows);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].owner.is_empty());

        let json = serde_json::to_value(&entries[0]).unwrap();
        assert_eq!(json["owner"], serde_json::json!({}));
    }

    #[test]
    fn entries_expose_only_display_fields() {
        let rows = vec![VideoWithOwner { video: video(5, true, 0), owner: Some(owner()) }];
        let json = serde_json::to_value(&build(rows)[0]).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["created_at", "duration", "id", "owner", "thumbnail", "title", "views"]
        );
        assert_eq!(json["owner"]["username"], "ana");
    }

    #[test]
    fn ordering_is_stable_for_equal_timestamps() {
        let mut a = video(7, true, 0);
        let mut b = video(8, true, 0);
        b.created_at = a.created_at;
        a.updated_at = a.created_at;

        let forward = build(vec![
            VideoWithOwner { video: a.clone(), owner: None },
            VideoWithOwner { video: b.clone(), owner: None },
        ]);
        let backward = build(vec![
            VideoWithOwner { video: b, owner: None },
            VideoWithOwner { video: a, owner: None },
        ]);
        assert_eq!(forward, backward);
        assert_eq!(forward[0].id, 8);
    }
}

//! User entity model and DTOs.
//!
//! Users are managed elsewhere; this crate only reads them to resolve video
//! owners, plus a create DTO used for seeding.

use serde::Deserialize;
use sqlx::FromRow;
use vidhub_core::read_model::OwnerSummary;
use vidhub_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for OwnerSummary {
    fn from(user: User) -> Self {
        Self {
            id: Some(user.id),
            username: Some(user.username),
            full_name: Some(user.full_name),
            email: Some(user.email),
            avatar: Some(user.avatar),
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
}

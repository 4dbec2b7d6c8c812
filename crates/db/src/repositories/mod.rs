//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod user_repo;
pub mod video_repo;

pub use user_repo::UserRepo;
pub use video_repo::VideoRepo;

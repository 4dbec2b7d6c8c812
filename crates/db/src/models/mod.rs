//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Conversions into the core domain types

pub mod user;
pub mod video;

//! Remote media hosting for vidhub.
//!
//! - [`api`] -- signed REST client for the media host's upload and destroy
//!   endpoints.
//! - [`storage`] -- [`vidhub_core::media::MediaStorage`] implementation on
//!   top of the client.

pub mod api;
pub mod config;
pub mod storage;

pub use config::CloudinaryConfig;
pub use storage::CloudinaryStorage;

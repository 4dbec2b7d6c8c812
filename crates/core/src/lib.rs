//! Domain core for the vidhub video backend.
//!
//! Holds the video lifecycle rules, the published-video read model, the
//! collaborator traits for persistence and media hosting, and the
//! [`service::VideoService`] that ties them together. Zero internal deps so
//! the db, cloud and api crates can all build on it.

pub mod error;
pub mod media;
pub mod read_model;
pub mod service;
pub mod store;
pub mod types;
pub mod video;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

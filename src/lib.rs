//! Uploader for the RaceShot photographer API - sends a race photo plus its
//! event metadata to the marketplace and reports the outcome
//!
//! Requests are validated when built; every upload attempt resolves to an
//! [`models::UploadResult`] value rather than an error.

pub mod client;
pub mod content_type;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{upload_photo, UploadClient};
pub use error::{Error, Result};
pub use models::{UploadRequest, UploadResult};

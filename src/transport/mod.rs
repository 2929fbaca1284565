//! HTTP transport for the upload endpoint
//!
//! Abstracts "perform one authenticated multipart POST" so the upload flow
//! can run against the real service or an in-memory mock.

pub mod client;
pub mod mock;

pub use client::HttpTransport;
pub use mock::MockTransport;

use crate::content_type::ContentType;
use crate::Result;
use async_trait::async_trait;

/// Binary `image` part of the form.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePart {
    pub file_name: String,
    pub content_type: ContentType,
    pub bytes: Vec<u8>,
}

/// Transport-neutral multipart form for one upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadForm {
    pub image: ImagePart,
    pub event_id: String,
    pub bib_number: String,
    pub location: String,
    pub price: String,
}

impl UploadForm {
    /// Text fields in wire order, keyed by their form names.
    pub fn text_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("eventId", self.event_id.as_str()),
            ("bibNumber", self.bib_number.as_str()),
            ("location", self.location.as_str()),
            ("price", self.price.as_str()),
        ]
    }
}

/// Status and body of a completed HTTP exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Sends `form` to `url` with `Authorization: Bearer <credential>`.
    ///
    /// Returns `Err` only when no response was received.
    async fn post_multipart(
        &self,
        url: &str,
        credential: &str,
        form: UploadForm,
    ) -> Result<RawResponse>;
}

//! Data models and structures
//!
//! Defines the upload request (validated at construction), the normalized
//! upload result, the service's error body, and runtime configuration.

use crate::content_type::ContentType;
use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.raceshot.app/api/photographer/upload";

/// Prices below this are rejected before any network call.
pub const MIN_PRICE: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

pub const UNKNOWN_BIB_NUMBER: &str = "unknown";

pub const REPORTED_FAILURE_MESSAGE: &str = "API responded 2xx but reported failure";

/// Where the image payload comes from.
#[derive(Clone, PartialEq)]
pub enum ImageSource {
    /// Read fully into memory when the upload runs.
    Path(PathBuf),
    Bytes { file_name: String, bytes: Vec<u8> },
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ImageSource::Bytes { file_name, bytes } => f
                .debug_struct("Bytes")
                .field("file_name", file_name)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// A validated upload. Only obtainable through [`UploadRequestBuilder::build`].
#[derive(Clone)]
pub struct UploadRequest {
    credential: String,
    image: ImageSource,
    file_name: String,
    content_type: ContentType,
    event_id: String,
    bib_number: String,
    location: String,
    price: Decimal,
}

impl UploadRequest {
    pub fn builder() -> UploadRequestBuilder {
        UploadRequestBuilder::default()
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn image(&self) -> &ImageSource {
        &self.image
    }

    /// Basename sent as the `image` part's filename.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn bib_number(&self) -> &str {
        &self.bib_number
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn price(&self) -> Decimal {
        self.price
    }
}

impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("credential", &"<redacted>")
            .field("image", &self.image)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("event_id", &self.event_id)
            .field("bib_number", &self.bib_number)
            .field("location", &self.location)
            .field("price", &self.price)
            .finish()
    }
}

#[derive(Debug, Default, Clone)]
pub struct UploadRequestBuilder {
    credential: Option<String>,
    image: Option<ImageSource>,
    event_id: Option<String>,
    bib_number: Option<String>,
    location: Option<String>,
    price: Option<Decimal>,
}

impl UploadRequestBuilder {
    pub fn credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.image = Some(ImageSource::Path(path.into()));
        self
    }

    pub fn image_bytes(mut self, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.image = Some(ImageSource::Bytes {
            file_name: file_name.into(),
            bytes,
        });
        self
    }

    pub fn event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    pub fn bib_number(mut self, bib_number: impl Into<String>) -> Self {
        self.bib_number = Some(bib_number.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Validates every field without touching the network.
    ///
    /// Fails with [`Error::InvalidArgument`] when a required field is absent
    /// or blank, when the price is below [`MIN_PRICE`], or when the image
    /// cannot be located or is empty. A missing bib number defaults to
    /// [`UNKNOWN_BIB_NUMBER`].
    pub fn build(self) -> Result<UploadRequest> {
        let credential = required(self.credential, "credential")?;
        let image = self
            .image
            .ok_or_else(|| Error::InvalidArgument("image is required".to_string()))?;
        let event_id = required(self.event_id, "eventId")?;
        let location = required(self.location, "location")?;

        let price = self
            .price
            .ok_or_else(|| Error::InvalidArgument("price is required".to_string()))?;
        if price < MIN_PRICE {
            return Err(Error::InvalidArgument(format!(
                "price must be at least {}, got {}",
                MIN_PRICE, price
            )));
        }

        let file_name = locate_image(&image)?;
        let content_type = ContentType::from_file_name(&file_name);

        let bib_number = self
            .bib_number
            .filter(|bib| !bib.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_BIB_NUMBER.to_string());

        Ok(UploadRequest {
            credential,
            image,
            file_name,
            content_type,
            event_id,
            bib_number,
            location,
            price,
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::InvalidArgument(format!("{} is required", name))),
    }
}

/// Checks the image exists and is non-empty, returning its basename.
fn locate_image(image: &ImageSource) -> Result<String> {
    match image {
        ImageSource::Path(path) => {
            let metadata = std::fs::metadata(path).map_err(|_| {
                Error::InvalidArgument(format!("image not found: {}", path.display()))
            })?;
            if !metadata.is_file() {
                return Err(Error::InvalidArgument(format!(
                    "image is not a file: {}",
                    path.display()
                )));
            }
            if metadata.len() == 0 {
                return Err(Error::InvalidArgument(format!(
                    "image is empty: {}",
                    path.display()
                )));
            }
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    Error::InvalidArgument(format!(
                        "image path has no file name: {}",
                        path.display()
                    ))
                })
        }
        ImageSource::Bytes { file_name, bytes } => {
            if bytes.is_empty() {
                return Err(Error::InvalidArgument("image is empty".to_string()));
            }
            // Callers may hand over a full path; only the basename goes on the wire.
            let base_name = std::path::Path::new(file_name)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            if base_name.trim().is_empty() {
                return Err(Error::InvalidArgument(
                    "image file name is required".to_string(),
                ));
            }
            Ok(base_name)
        }
    }
}

/// Normalized outcome of one upload call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudflare_id: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl UploadResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            photo_id: None,
            original_file_id: None,
            cloudflare_id: None,
            message: message.into(),
        }
    }

    /// Parses a 2xx response body, matching keys case-insensitively.
    ///
    /// The body's own `success` flag is authoritative: anything other than a
    /// JSON `true` yields a failed result with [`REPORTED_FAILURE_MESSAGE`].
    pub fn from_success_body(body: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        if value.is_null() {
            return Ok(Self::failure(REPORTED_FAILURE_MESSAGE));
        }
        let parsed: SuccessBody = serde_json::from_value(lowercase_keys(value))?;

        if parsed.success != serde_json::Value::Bool(true) {
            return Ok(Self::failure(REPORTED_FAILURE_MESSAGE));
        }

        Ok(Self {
            success: true,
            photo_id: parsed.photo_id,
            original_file_id: parsed.original_file_id,
            cloudflare_id: parsed.cloudflare_id,
            message: parsed.message.unwrap_or_default(),
        })
    }
}

impl fmt::Display for UploadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            write!(
                f,
                "uploaded photo {}",
                self.photo_id.as_deref().unwrap_or("<none>")
            )?;
            if !self.message.is_empty() {
                write!(f, ": {}", self.message)?;
            }
            Ok(())
        } else {
            write!(f, "upload failed: {}", self.message)
        }
    }
}

#[derive(Debug, Deserialize)]
struct SuccessBody {
    #[serde(default)]
    success: serde_json::Value,
    #[serde(default, rename = "photoid")]
    photo_id: Option<String>,
    #[serde(default, rename = "originalfileid")]
    original_file_id: Option<String>,
    #[serde(default, rename = "cloudflareid")]
    cloudflare_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: String,
}

impl ErrorResult {
    /// Returns `None` for bodies that are not JSON or carry no usable
    /// `error` field.
    pub fn parse(body: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        let parsed: ErrorResult = serde_json::from_value(lowercase_keys(value)).ok()?;
        if parsed.error.trim().is_empty() {
            return None;
        }
        Some(parsed)
    }
}

fn lowercase_keys(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_lowercase(), value))
                .collect(),
        ),
        other => other,
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: Option<String>,
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_token: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        // A missing .env is fine; a malformed one is not.
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e.into());
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let timeout = match lookup("RACESHOT_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Config(format!("RACESHOT_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        Ok(Self {
            api_token: lookup("RACESHOT_API_TOKEN").filter(|token| !token.trim().is_empty()),
            api_url: lookup("RACESHOT_API_URL").unwrap_or(defaults.api_url),
            timeout,
        })
    }
}

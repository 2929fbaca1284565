//! Upload flow against the photographer upload endpoint.
//!
//! [`UploadClient::upload`] is total: transport failures, remote rejections
//! and unexpected errors all come back as a failed [`UploadResult`].

use crate::models::{
    Config, ErrorResult, ImageSource, UploadRequest, UploadRequestBuilder, UploadResult,
    DEFAULT_API_URL,
};
use crate::transport::{HttpTransport, ImagePart, UploadForm, UploadTransport};
use crate::Result;
use tracing::{debug, error, info, warn};

pub struct UploadClient {
    transport: Box<dyn UploadTransport>,
    api_url: String,
}

impl UploadClient {
    /// Client for the default endpoint over the given transport.
    pub fn new(transport: Box<dyn UploadTransport>) -> Self {
        Self {
            transport,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Client over reqwest using the configured endpoint and timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::new(Box::new(transport)).with_api_url(config.api_url.clone()))
    }

    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Performs exactly one upload attempt.
    pub async fn upload(&self, request: &UploadRequest) -> UploadResult {
        match self.try_upload(request).await {
            Ok(result) => result,
            Err(e) => {
                error!("Upload of {} failed: {}", request.file_name(), e);
                UploadResult::failure(e.to_string())
            }
        }
    }

    async fn try_upload(&self, request: &UploadRequest) -> Result<UploadResult> {
        info!("Reading image {}", request.file_name());
        let form = build_form(request).await?;

        info!(
            "Uploading image {} (event: {}, bib: {})",
            request.file_name(),
            request.event_id(),
            request.bib_number()
        );
        debug!("Sending upload request to {}", self.api_url);

        let response = self
            .transport
            .post_multipart(&self.api_url, request.credential(), form)
            .await?;

        if response.is_success() {
            let result = UploadResult::from_success_body(&response.body)?;
            if result.success {
                info!(
                    "Upload succeeded (photo: {}, original file: {})",
                    result.photo_id.as_deref().unwrap_or("-"),
                    result.original_file_id.as_deref().unwrap_or("-")
                );
            } else {
                warn!(
                    "Service returned status {} but reported failure: {}",
                    response.status, response.body
                );
            }
            return Ok(result);
        }

        warn!(
            "Upload rejected with status {}: {}",
            response.status, response.body
        );
        let message = match ErrorResult::parse(&response.body) {
            Some(error_result) => error_result.error,
            None => format!("HTTP error {}", response.status),
        };
        Ok(UploadResult::failure(message))
    }
}

async fn build_form(request: &UploadRequest) -> Result<UploadForm> {
    let bytes = match request.image() {
        ImageSource::Path(path) => tokio::fs::read(path).await?,
        ImageSource::Bytes { bytes, .. } => bytes.clone(),
    };

    Ok(UploadForm {
        image: ImagePart {
            file_name: request.file_name().to_string(),
            content_type: request.content_type(),
            bytes,
        },
        event_id: request.event_id().to_string(),
        bib_number: request.bib_number().to_string(),
        location: request.location().to_string(),
        price: request.price().to_string(),
    })
}

/// Validates and uploads in one step; validation failures become a failed
/// result without any network traffic.
pub async fn upload_photo(builder: UploadRequestBuilder, client: &UploadClient) -> UploadResult {
    match builder.build() {
        Ok(request) => client.upload(&request).await,
        Err(e) => {
            warn!("Upload request rejected before sending: {}", e);
            UploadResult::failure(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_type::ContentType;
    use crate::models::REPORTED_FAILURE_MESSAGE;
    use crate::transport::MockTransport;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn request() -> UploadRequest {
        UploadRequest::builder()
            .credential("tok")
            .image_bytes("finish.JPG", vec![0xFF, 0xD8, 0xFF])
            .event_id("00000")
            .location("Finish line")
            .price("100.50".parse().unwrap())
            .build()
            .unwrap()
    }

    fn client(transport: &MockTransport) -> UploadClient {
        UploadClient::new(Box::new(transport.clone()))
    }

    #[tokio::test]
    async fn test_upload_success() {
        let transport = MockTransport::new().with_response(
            200,
            r#"{"success":true,"photoId":"p1","originalFileId":"o1","message":"ok"}"#,
        );

        let result = client(&transport).upload(&request()).await;

        assert_eq!(
            result,
            UploadResult {
                success: true,
                photo_id: Some("p1".to_string()),
                original_file_id: Some("o1".to_string()),
                cloudflare_id: None,
                message: "ok".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_upload_sends_expected_form() {
        let transport = MockTransport::new();

        client(&transport).upload(&request()).await;

        let requests = transport.get_requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];
        assert_eq!(sent.url, DEFAULT_API_URL);
        assert_eq!(sent.credential, "tok");
        assert_eq!(sent.form.image.file_name, "finish.JPG");
        assert_eq!(sent.form.image.content_type, ContentType::Jpeg);
        assert_eq!(sent.form.image.bytes, vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(
            sent.form.text_fields(),
            [
                ("eventId", "00000"),
                ("bibNumber", "unknown"),
                ("location", "Finish line"),
                ("price", "100.50"),
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_2xx_with_success_false_is_overridden() {
        let transport = MockTransport::new().with_response(200, r#"{"success":false}"#);

        let result = client(&transport).upload(&request()).await;

        assert_eq!(result, UploadResult::failure(REPORTED_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn test_upload_2xx_null_body_is_reported_failure() {
        let transport = MockTransport::new().with_response(200, "null");

        let result = client(&transport).upload(&request()).await;

        assert_eq!(result, UploadResult::failure(REPORTED_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn test_upload_2xx_unparsable_body_fails() {
        let transport = MockTransport::new().with_response(200, "not json");

        let result = client(&transport).upload(&request()).await;

        assert!(!result.success);
        assert!(!result.message.is_empty());
    }

    #[tokio::test]
    async fn test_upload_error_body() {
        let transport = MockTransport::new().with_response(422, r#"{"error":"bad bib"}"#);

        let result = client(&transport).upload(&request()).await;

        assert_eq!(result, UploadResult::failure("bad bib"));
    }

    #[tokio::test]
    async fn test_upload_unparsable_error_body() {
        let transport = MockTransport::new().with_response(500, "<html>oops</html>");

        let result = client(&transport).upload(&request()).await;

        assert_eq!(result, UploadResult::failure("HTTP error 500"));
    }

    #[tokio::test]
    async fn test_upload_error_body_without_error_field() {
        let transport = MockTransport::new().with_response(401, r#"{"message":"expired"}"#);

        let result = client(&transport).upload(&request()).await;

        assert_eq!(result, UploadResult::failure("HTTP error 401"));
    }

    #[tokio::test]
    async fn test_upload_transport_failure() {
        let transport = MockTransport::new().with_failure("connection refused");

        let result = client(&transport).upload(&request()).await;

        assert!(!result.success);
        assert!(result.message.contains("connection refused"));
        assert_eq!(transport.get_request_count(), 1);
    }

    #[tokio::test]
    async fn test_upload_image_removed_after_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("finish.png");
        std::fs::write(&path, b"png").unwrap();

        let request = UploadRequest::builder()
            .credential("tok")
            .image_path(&path)
            .event_id("00000")
            .location("Finish line")
            .price(Decimal::from(60))
            .build()
            .unwrap();
        std::fs::remove_file(&path).unwrap();

        let transport = MockTransport::new();
        let result = client(&transport).upload(&request).await;

        assert!(!result.success);
        assert!(result.message.starts_with("IO error"));
        assert_eq!(transport.get_request_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_photo_validation_failure_skips_network() {
        let transport = MockTransport::new();
        let builder = UploadRequest::builder()
            .credential("tok")
            .image_bytes("a.jpg", vec![1])
            .event_id("00000")
            .location("Finish line")
            .price(Decimal::from(59));

        let result = upload_photo(builder, &client(&transport)).await;

        assert!(!result.success);
        assert!(result.message.contains("price"));
        assert_eq!(transport.get_request_count(), 0);
    }

    #[tokio::test]
    async fn test_custom_api_url() {
        let transport = MockTransport::new();
        let client = client(&transport).with_api_url("https://staging.example/upload".to_string());

        client.upload(&request()).await;

        assert_eq!(client.api_url(), "https://staging.example/upload");
        assert_eq!(transport.get_requests()[0].url, "https://staging.example/upload");
    }
}

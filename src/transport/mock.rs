use super::{RawResponse, UploadForm, UploadTransport};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// One request observed by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub credential: String,
    pub form: UploadForm,
}

#[derive(Clone)]
pub struct MockTransport {
    response: Arc<Mutex<RawResponse>>,
    failure: Arc<Mutex<Option<String>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            response: Arc::new(Mutex::new(RawResponse {
                status: 200,
                body: r#"{"success":true,"photoId":"mock-photo","originalFileId":"mock-original","cloudflareId":"mock-cf","message":"uploaded"}"#.to_string(),
            })),
            failure: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, status: u16, body: impl Into<String>) -> Self {
        *self.response.lock().unwrap() = RawResponse {
            status,
            body: body.into(),
        };
        self
    }

    /// Simulates a request that never gets a response.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        *self.failure.lock().unwrap() = Some(message.into());
        self
    }

    pub fn get_request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UploadTransport for MockTransport {
    async fn post_multipart(
        &self,
        url: &str,
        credential: &str,
        form: UploadForm,
    ) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            credential: credential.to_string(),
            form,
        });

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::Transport(message));
        }

        Ok(self.response.lock().unwrap().clone())
    }
}

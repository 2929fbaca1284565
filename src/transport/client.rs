use super::{RawResponse, UploadForm, UploadTransport};
use crate::Result;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::new_with_client(client))
    }

    pub fn new_with_client(client: Client) -> Self {
        Self { client }
    }

    fn build_form(form: UploadForm) -> Result<Form> {
        let content_type = form.image.content_type;
        let image = Part::bytes(form.image.bytes)
            .file_name(form.image.file_name)
            .mime_str(content_type.as_str())?;

        Ok(Form::new()
            .part("image", image)
            .text("eventId", form.event_id)
            .text("bibNumber", form.bib_number)
            .text("location", form.location)
            .text("price", form.price))
    }
}

#[async_trait]
impl UploadTransport for HttpTransport {
    async fn post_multipart(
        &self,
        url: &str,
        credential: &str,
        form: UploadForm,
    ) -> Result<RawResponse> {
        let form = Self::build_form(form)?;

        let response = self
            .client
            .post(url)
            .bearer_auth(credential)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send upload request: {}", e);
                e
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

//! Multipart upload of a captured image to the sorting endpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

/// Successful answer from the endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SubmitReply {
    pub(crate) class: String,
    pub(crate) command: String,
    #[serde(default)]
    pub(crate) bin: Option<String>,
}

/// What came back for one upload.
#[derive(Debug, Clone)]
pub(crate) enum UploadOutcome {
    /// 2xx with a decodable body.
    Accepted(SubmitReply),
    /// Any other status; the body is kept for diagnostics.
    Rejected { status: u16, body: String },
}

#[async_trait]
pub(crate) trait Uploader: Send + Sync {
    async fn upload(&self, file_name: &str, image: Vec<u8>) -> Result<UploadOutcome>;
}

pub(crate) struct HttpUploader {
    client: Client,
    url: String,
}

impl HttpUploader {
    pub(crate) fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, file_name: &str, image: Vec<u8>) -> Result<UploadOutcome> {
        let part = Part::bytes(image).file_name(file_name.to_owned());
        let form = Form::new().part("file", part);

        let resp = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("upload to {} failed", self.url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Ok(UploadOutcome::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let reply = resp
            .json::<SubmitReply>()
            .await
            .context("endpoint returned an unreadable reply")?;
        Ok(UploadOutcome::Accepted(reply))
    }
}

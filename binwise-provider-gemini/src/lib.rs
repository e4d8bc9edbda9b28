//! Classifier implementation using Gemini `generateContent` on Vertex AI.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use binwise_core::auth::TokenSource;
use binwise_core::ports::{CLASSIFY_INSTRUCTION, Classifier, PortError};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Region used when none is configured.
pub const DEFAULT_LOCATION: &str = "us-central1";

/// Connection settings for a Vertex AI project.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Google Cloud project id.
    pub project_id: String,
    /// Vertex AI region, e.g. `us-central1`.
    pub location: String,
    /// Publisher model name.
    pub model: String,
}

impl GeminiConfig {
    /// Settings for a project with default region and model.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            location: DEFAULT_LOCATION.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://{location}-aiplatform.googleapis.com/v1/projects/{project}/locations/{location}/publishers/google/models/{model}:generateContent",
            location = self.location,
            project = self.project_id,
            model = self.model,
        )
    }
}

/// Body of a `generateContent` call.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    InlineData {
        #[serde(rename = "mimeType")]
        mime_type: &'a str,
        data: String,
    },
    Text(&'a str),
}

/// Response from `generateContent`; only the candidate text is modelled.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Classifier asking a Gemini model for a bare category label.
pub struct GeminiClassifier {
    client: Client,
    config: GeminiConfig,
    tokens: Arc<dyn TokenSource>,
}

impl GeminiClassifier {
    /// Create a new classifier bound to the given HTTP client and token source.
    #[must_use]
    pub fn new(client: Client, config: GeminiConfig, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            client,
            config,
            tokens,
        }
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    async fn classify(&self, image: &[u8], mime_type: &str) -> Result<String, PortError> {
        let body = build_request(image, mime_type);

        let token = self.tokens.token().await?;
        let req = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(token)
            .json(&body);

        tracing::debug!(model = %self.config.model, bytes = image.len(), "requesting classification");
        let resp = fetch_json::<GenerateResponse>(req).await?;

        candidate_text(resp)
    }
}

fn build_request<'a>(image: &[u8], mime_type: &'a str) -> GenerateRequest<'a> {
    GenerateRequest {
        contents: [Content {
            role: "user",
            parts: [
                Part::InlineData {
                    mime_type,
                    data: STANDARD.encode(image),
                },
                Part::Text(CLASSIFY_INSTRUCTION),
            ],
        }],
    }
}

/// Concatenate the text parts of the first candidate, as the SDK's `.text` does.
fn candidate_text(resp: GenerateResponse) -> Result<String, PortError> {
    let content = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .ok_or_else(|| PortError::Decode("Model returned no candidates".into()))?;

    let text: String = content
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        return Err(PortError::Decode("Model returned no text".into()));
    }
    Ok(text)
}

// Send the request and decode JSON, keeping the body of failed responses.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(PortError::Upstream {
            status: status.as_u16(),
            message,
        });
    }
    resp.json().await.map_err(PortError::from)
}

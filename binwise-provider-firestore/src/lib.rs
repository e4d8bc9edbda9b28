//! Waste log implementation writing one Firestore document per record.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use binwise_core::{
    auth::TokenSource,
    model::{RecordId, WasteLogRecord},
    ports::{PortError, WasteLog},
};

/// Public Firestore REST root.
pub const DEFAULT_API_ROOT: &str = "https://firestore.googleapis.com/v1";

/// Collection written to when none is configured.
pub const DEFAULT_COLLECTION: &str = "waste_logs";
/// Database used when none is configured.
pub const DEFAULT_DATABASE: &str = "(default)";

/// Location of the collection records are appended to.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// REST root; points at an emulator when overridden.
    pub api_root: String,
    /// Google Cloud project id.
    pub project_id: String,
    /// Database id, usually `(default)`.
    pub database: String,
    /// Collection id.
    pub collection: String,
}

impl FirestoreConfig {
    /// Settings for the default database and collection of a project.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_owned(),
            project_id: project_id.into(),
            database: DEFAULT_DATABASE.to_owned(),
            collection: DEFAULT_COLLECTION.to_owned(),
        }
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents/{}",
            self.api_root, self.project_id, self.database, self.collection
        )
    }
}

/// Document body in Firestore's typed-value encoding.
#[derive(Debug, Serialize)]
struct DocumentBody {
    fields: Fields,
}

#[derive(Debug, Serialize)]
struct Fields {
    timestamp: Value,
    class: Value,
    bin: Value,
    #[serde(rename = "deviceId")]
    device_id: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Value {
    StringValue(String),
    TimestampValue(String),
}

/// Created document; Firestore assigns the trailing path segment.
#[derive(Debug, Deserialize)]
struct CreatedDocument {
    name: String,
}

/// Append-only waste log stored in a Firestore collection.
pub struct FirestoreWasteLog {
    client: Client,
    config: FirestoreConfig,
    tokens: Arc<dyn TokenSource>,
}

impl FirestoreWasteLog {
    /// Create a new log bound to the given HTTP client and token source.
    #[must_use]
    pub fn new(client: Client, config: FirestoreConfig, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            client,
            config,
            tokens,
        }
    }
}

#[async_trait]
impl WasteLog for FirestoreWasteLog {
    async fn append(&self, record: &WasteLogRecord) -> Result<RecordId, PortError> {
        let token = self.tokens.token().await?;
        let req = self
            .client
            .post(self.config.collection_url())
            .bearer_auth(token)
            .json(&document(record));

        let created = fetch_json::<CreatedDocument>(req).await?;
        let id = document_id(&created.name)?;
        tracing::debug!(collection = %self.config.collection, id = %id, "record appended");
        Ok(id)
    }
}

fn document(record: &WasteLogRecord) -> DocumentBody {
    DocumentBody {
        fields: Fields {
            timestamp: Value::TimestampValue(
                record.timestamp().to_rfc3339_opts(SecondsFormat::Micros, true),
            ),
            class: Value::StringValue(record.class().to_owned()),
            bin: Value::StringValue(record.bin().as_str().to_owned()),
            device_id: Value::StringValue(record.device_id().0.clone()),
        },
    }
}

fn document_id(name: &str) -> Result<RecordId, PortError> {
    name.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(|segment| RecordId(segment.to_owned()))
        .ok_or_else(|| PortError::Decode(format!("Unexpected document name: {name}")))
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

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};
    use binwise_core::auth::StaticToken;
    use binwise_core::model::DeviceId;
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};

    use super::*;

    type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    /// Local stand-in for the documents endpoint; remembers auth header and body.
    async fn documents_server() -> (String, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route(
                "/projects/demo/databases/(default)/documents/waste_logs",
                post(
                    |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        let auth = headers[axum::http::header::AUTHORIZATION]
                            .to_str()
                            .unwrap()
                            .to_owned();
                        seen.lock().unwrap().push((auth, body));
                        Json(json!({
                            "name": "projects/demo/databases/(default)/documents/waste_logs/Xy12",
                        }))
                    },
                ),
            )
            .with_state(Arc::clone(&seen));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        (format!("http://{addr}"), seen)
    }

    #[tokio::test]
    async fn append_sends_token_from_source_and_returns_document_id() {
        let (root, seen) = documents_server().await;
        let mut config = FirestoreConfig::new("demo");
        config.api_root = root;
        let log = FirestoreWasteLog::new(
            Client::new(),
            config,
            Arc::new(StaticToken::new("ya29.test")),
        );

        let record = WasteLogRecord::new(Utc::now(), "metal", DeviceId::default());
        let id = log.append(&record).await.unwrap();

        assert_eq!(id, RecordId("Xy12".into()));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "Bearer ya29.test");
        assert_eq!(seen[0].1["fields"]["class"]["stringValue"], "metal");
    }

    #[test]
    fn collection_url_uses_configured_database() {
        let mut config = FirestoreConfig::new("waste-demo");
        assert_eq!(
            config.collection_url(),
            "https://firestore.googleapis.com/v1/projects/waste-demo/databases/(default)/documents/waste_logs"
        );

        config.collection = "bench_logs".into();
        assert!(config.collection_url().ends_with("/documents/bench_logs"));
    }

    #[test]
    fn record_is_encoded_as_typed_fields() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let record = WasteLogRecord::new(at, "green-glass", DeviceId("bin-12".into()));

        let body = serde_json::to_value(document(&record)).unwrap();

        assert_eq!(
            body,
            json!({
                "fields": {
                    "timestamp": { "timestampValue": "2025-03-14T09:26:53.000000Z" },
                    "class": { "stringValue": "green-glass" },
                    "bin": { "stringValue": "Recycle" },
                    "deviceId": { "stringValue": "bin-12" },
                }
            })
        );
    }

    #[test]
    fn document_id_is_last_path_segment() {
        let id = document_id("projects/p/databases/(default)/documents/waste_logs/aZ3kQ9").unwrap();
        assert_eq!(id, RecordId("aZ3kQ9".into()));
        assert!(document_id("projects/p/documents/waste_logs/").is_err());
    }
}

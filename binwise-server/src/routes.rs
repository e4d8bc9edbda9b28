//! HTTP surface: preflight, image submission, and health check.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use binwise_core::{ServiceError, SortDecision, SortingService};
use serde::Serialize;
use tower_http::trace::TraceLayer;

const ANY_ORIGIN: &str = "*";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) service: Arc<SortingService>,
}

pub(crate) fn router(service: Arc<SortingService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", post(submit).options(preflight))
        .route("/healthz", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    status: &'static str,
    class: String,
    bin: &'static str,
    command: String,
}

impl From<SortDecision> for SubmitResponse {
    fn from(decision: SortDecision) -> Self {
        Self {
            status: "success",
            command: decision.command(),
            bin: decision.bin.as_str(),
            class: decision.class,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Failures rendered as JSON with the CORS origin header.
enum ApiError {
    /// Outcome of the sorting service.
    Service(ServiceError),
    /// The `file` part was present but could not be read.
    Upload { status: StatusCode, message: String },
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        // Size-limit errors keep their 413; anything else is a server-side failure
        let status = match err.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::Upload {
            status,
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Service(err @ ServiceError::MissingInput) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Service(err @ ServiceError::DownstreamFailure(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Upload { status, message } => (status, message),
        };
        (
            status,
            [(header::ACCESS_CONTROL_ALLOW_ORIGIN, ANY_ORIGIN)],
            Json(ErrorBody { error }),
        )
            .into_response()
    }
}

async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, ANY_ORIGIN),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            (header::ACCESS_CONTROL_MAX_AGE, "3600"),
        ],
    )
}

async fn submit(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let image = match multipart {
        Ok(multipart) => read_file_field(multipart).await?,
        Err(rejection) => {
            tracing::debug!(%rejection, "request is not multipart");
            None
        }
    };

    let decision = state.service.process(image.as_deref()).await?;
    let body = SubmitResponse::from(decision);

    Ok((
        StatusCode::OK,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, ANY_ORIGIN)],
        Json(body),
    )
        .into_response())
}

/// Bytes of the first file part named `file`, or `None` when there is none.
///
/// Plain form fields named `file` (no filename) are not uploads and are skipped.
async fn read_file_field(mut multipart: Multipart) -> Result<Option<Vec<u8>>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        tracing::warn!(error = %err, "malformed multipart body");
        ApiError::from(err)
    })? {
        if field.name() != Some("file") || field.file_name().is_none() {
            continue;
        }
        let bytes = field.bytes().await.map_err(|err| {
            tracing::warn!(error = %err, "failed to read uploaded file");
            ApiError::from(err)
        })?;
        return Ok(Some(bytes.to_vec()));
    }
    Ok(None)
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

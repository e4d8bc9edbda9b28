//! Command line and environment configuration for the server.

use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

/// Where classification events are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogBackend {
    /// Firestore collection.
    Firestore,
    /// Process memory; lost on exit.
    Memory,
}

#[derive(Debug, Parser)]
#[command(name = "binwise-server")]
#[command(about = "Classify uploaded waste images and answer with a bin command")]
pub(crate) struct Args {
    #[arg(long, env = "BINWISE_LISTEN", default_value = "0.0.0.0:8080")]
    pub(crate) listen: SocketAddr,

    /// Google Cloud project hosting the model and the database.
    #[arg(long, env = "GCP_PROJECT_ID")]
    pub(crate) project_id: String,

    #[arg(long, env = "GCP_LOCATION", default_value = binwise_provider_gemini::DEFAULT_LOCATION)]
    pub(crate) location: String,

    #[arg(long, env = "BINWISE_MODEL", default_value = binwise_provider_gemini::DEFAULT_MODEL)]
    pub(crate) model: String,

    /// Fixed OAuth bearer token for Vertex AI and Firestore. When absent,
    /// service-account tokens are fetched from the metadata server and refreshed.
    #[arg(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    pub(crate) access_token: Option<String>,

    #[arg(long, env = "BINWISE_TOKEN_URL", default_value = binwise_core::METADATA_TOKEN_URL)]
    pub(crate) token_url: String,

    /// Firestore REST root, e.g. an emulator address.
    #[arg(long, env = "FIRESTORE_API_ROOT", default_value = binwise_provider_firestore::DEFAULT_API_ROOT)]
    pub(crate) firestore_root: String,

    #[arg(long, env = "FIRESTORE_DATABASE", default_value = binwise_provider_firestore::DEFAULT_DATABASE)]
    pub(crate) database: String,

    #[arg(long, env = "BINWISE_COLLECTION", default_value = binwise_provider_firestore::DEFAULT_COLLECTION)]
    pub(crate) collection: String,

    /// Device id stamped on every persisted record.
    #[arg(long, env = "BINWISE_DEVICE_ID", default_value = binwise_core::DeviceId::DEFAULT)]
    pub(crate) device_id: String,

    #[arg(long, value_enum, env = "BINWISE_LOG_BACKEND", default_value = "firestore")]
    pub(crate) log_backend: LogBackend,

    /// Largest accepted request body in bytes.
    #[arg(long, env = "BINWISE_MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub(crate) max_upload_bytes: usize,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub(crate) log: String,
}

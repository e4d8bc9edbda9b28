//! HTTP endpoint that classifies uploaded waste images, logs them, and answers
//! with a bin command.

mod config;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use binwise_core::{
    Classifier, DeviceId, MemoryWasteLog, MetadataTokenSource, SortingService, StaticToken,
    TokenSource, WasteLog,
};
use binwise_provider_firestore::{FirestoreConfig, FirestoreWasteLog};
use binwise_provider_gemini::{GeminiClassifier, GeminiConfig};
use clap::Parser;
use reqwest::Client;
use tracing_subscriber::EnvFilter;

use crate::config::{Args, LogBackend};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log))
        .init();

    // Collaborators are built once and shared by every request
    let client = Client::builder().user_agent("binwise/0.1").build()?;
    let service = Arc::new(build_service(&args, client));
    let app = routes::router(service, args.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    tracing::info!(
        addr = %args.listen,
        model = %args.model,
        log_backend = ?args.log_backend,
        "binwise server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("binwise server stopped");
    Ok(())
}

fn build_service(args: &Args, client: Client) -> SortingService {
    // One token source for both APIs; a fixed token overrides the metadata server
    let tokens: Arc<dyn TokenSource> = match &args.access_token {
        Some(token) => Arc::new(StaticToken::new(token.clone())),
        None => Arc::new(MetadataTokenSource::with_url(
            client.clone(),
            args.token_url.clone(),
        )),
    };

    let classifier: Arc<dyn Classifier> = Arc::new(GeminiClassifier::new(
        client.clone(),
        GeminiConfig {
            project_id: args.project_id.clone(),
            location: args.location.clone(),
            model: args.model.clone(),
        },
        Arc::clone(&tokens),
    ));

    let log: Arc<dyn WasteLog> = match args.log_backend {
        LogBackend::Firestore => Arc::new(FirestoreWasteLog::new(
            client,
            FirestoreConfig {
                api_root: args.firestore_root.clone(),
                project_id: args.project_id.clone(),
                database: args.database.clone(),
                collection: args.collection.clone(),
            },
            tokens,
        )),
        LogBackend::Memory => {
            tracing::warn!("records are kept in memory and lost on exit");
            Arc::new(MemoryWasteLog::new())
        }
    };

    SortingService::new(classifier, log, DeviceId(args.device_id.clone()))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

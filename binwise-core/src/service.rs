//! Classification-and-routing service combining the classifier, policy, and log.

use std::sync::Arc;

use chrono::Utc;

use crate::model::{Bin, DeviceId, RecordId, WasteLogRecord};
use crate::ports::{Classifier, IMAGE_MIME_TYPE, WasteLog};
use crate::routing::normalize_label;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Reasons a submission can fail.
pub enum ServiceError {
    /// The request carried no image; nothing downstream was called.
    #[error("No file uploaded")]
    MissingInput,
    /// The classifier or the waste log failed. Carries the collaborator's message.
    #[error("{0}")]
    DownstreamFailure(String),
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDecision {
    /// Normalized class label.
    pub class: String,
    /// Bin the item was routed to.
    pub bin: Bin,
    /// Identifier of the persisted record.
    pub record_id: RecordId,
}

impl SortDecision {
    /// Command sent back to the device.
    #[must_use]
    pub fn command(&self) -> String {
        self.bin.command()
    }
}

/// Public entry point turning an uploaded image into a bin decision.
///
/// Collaborators are built once per process and shared across requests; the
/// service itself holds no per-request state.
pub struct SortingService {
    classifier: Arc<dyn Classifier>,
    log: Arc<dyn WasteLog>,
    device_id: DeviceId,
}

impl SortingService {
    /// Create a new service bound to the given collaborators.
    #[must_use]
    pub fn new(classifier: Arc<dyn Classifier>, log: Arc<dyn WasteLog>, device_id: DeviceId) -> Self {
        Self {
            classifier,
            log,
            device_id,
        }
    }

    /// Device identifier stamped on every record.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Classify an image, route it, and persist the event.
    ///
    /// Classification happens at most once and nothing is retried. A log failure
    /// after a successful classification is reported as a failure with no
    /// compensating action.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::MissingInput`] when `image` is `None`, and
    /// [`ServiceError::DownstreamFailure`] when the classifier or the log fails.
    pub async fn process(&self, image: Option<&[u8]>) -> Result<SortDecision, ServiceError> {
        let image = image.ok_or(ServiceError::MissingInput)?;

        let raw = self
            .classifier
            .classify(image, IMAGE_MIME_TYPE)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "classification failed");
                ServiceError::DownstreamFailure(err.to_string())
            })?;
        let class = normalize_label(&raw);

        let record = WasteLogRecord::new(Utc::now(), class, self.device_id.clone());
        let record_id = self.log.append(&record).await.map_err(|err| {
            tracing::error!(error = %err, class = record.class(), "waste log append failed");
            ServiceError::DownstreamFailure(err.to_string())
        })?;

        tracing::info!(
            class = record.class(),
            bin = %record.bin(),
            record = %record_id,
            "item sorted"
        );

        Ok(SortDecision {
            class: record.class().to_owned(),
            bin: record.bin(),
            record_id,
        })
    }
}

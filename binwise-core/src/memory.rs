//! Waste log kept in process memory.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::model::{RecordId, WasteLogRecord};
use crate::ports::{PortError, WasteLog};

/// Append-only log held in memory; records are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryWasteLog {
    records: Mutex<Vec<(RecordId, WasteLogRecord)>>,
}

impl MemoryWasteLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all appended records in insertion order.
    #[must_use]
    pub fn records(&self) -> Vec<(RecordId, WasteLogRecord)> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of appended records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl WasteLog for MemoryWasteLog {
    async fn append(&self, record: &WasteLogRecord) -> Result<RecordId, PortError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let id = RecordId(format!("mem-{:06}", records.len() + 1));
        records.push((id.clone(), record.clone()));
        Ok(id)
    }
}

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reelcore_config::FolderPathProvider;
use reelcore_index::{IndexCursor, IndexError, IndexQuery, RecordingIndex, RecordingRecord};
use serde::{Deserialize, Serialize};

/// Whether the owning context currently permits index queries.
///
/// Clones share one flag, so the lifecycle side and the query side can each
/// hold a handle on different threads. Starts inactive.
#[derive(Debug, Clone, Default)]
pub struct ActivationSignal {
    active: Arc<AtomicBool>,
}

impl ActivationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&self) {
        self.active.store(true, Ordering::Release);
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("could not query the index for folder {filter_key:?}")]
    IndexUnavailable {
        filter_key: String,
        #[source]
        source: IndexError,
    },
    #[error("could not convert row {position} into a recording")]
    RowConversionFailed {
        position: usize,
        #[source]
        source: IndexError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// Inactive at entry; the index was not touched.
    Skipped,
    Complete,
    /// Deactivated mid-scan; the records collected so far are kept.
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Folder path read for this scan; `None` when skipped.
    pub folder: Option<String>,
    pub records: Vec<RecordingRecord>,
    pub status: ScanStatus,
}

/// Final component of `path`, used to match the index's folder display name.
///
/// Separators follow the host platform and trailing separators are ignored.
/// Paths without a usable component yield an empty key.
pub fn filter_key(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub struct RecordingLoader<I, P> {
    index: I,
    folder: P,
    signal: ActivationSignal,
}

impl<I, P> RecordingLoader<I, P>
where
    I: RecordingIndex,
    P: FolderPathProvider,
{
    pub fn new(index: I, folder: P, signal: ActivationSignal) -> Self {
        Self {
            index,
            folder,
            signal,
        }
    }

    pub fn signal(&self) -> &ActivationSignal {
        &self.signal
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Lists the recordings in the configured folder, newest first.
    ///
    /// Returns an empty list without touching the index when inactive, and a
    /// truncated list when deactivated while iterating. Blocks for as long as
    /// the index takes to answer.
    pub fn query_recordings(&self) -> Result<Vec<RecordingRecord>, QueryError> {
        self.scan().map(|report| report.records)
    }

    /// Same as [`query_recordings`](Self::query_recordings), also reporting
    /// how the scan ended.
    pub fn scan(&self) -> Result<ScanReport, QueryError> {
        if !self.signal.is_active() {
            tracing::debug!("loader inactive, skipping index query");
            return Ok(ScanReport {
                folder: None,
                records: Vec::new(),
                status: ScanStatus::Skipped,
            });
        }

        let folder = self.folder.folder_path();
        let key = filter_key(&folder);
        let query = IndexQuery::newest_first(key.clone());
        let mut cursor = self
            .index
            .open(&query)
            .map_err(|source| QueryError::IndexUnavailable {
                filter_key: key.clone(),
                source,
            })?;

        let mut records = Vec::new();
        while let Some(row) = cursor.next_row() {
            if !self.signal.is_active() {
                tracing::info!(
                    filter_key = %key,
                    collected = records.len(),
                    "loader deactivated mid-scan"
                );
                return Ok(ScanReport {
                    folder: Some(folder),
                    records,
                    status: ScanStatus::Interrupted,
                });
            }

            let record = self
                .index
                .to_record(row)
                .map_err(|source| QueryError::RowConversionFailed {
                    position: records.len(),
                    source,
                })?;
            records.push(record);
        }

        tracing::debug!(filter_key = %key, count = records.len(), "scan complete");
        Ok(ScanReport {
            folder: Some(folder),
            records,
            status: ScanStatus::Complete,
        })
    }
}

use std::sync::Arc;

use reelcore_config::{FolderPathProvider, Settings, SharedFolderPath};
use reelcore_index::{RecordingIndex, RecordingRecord};
use reelcore_query::{ActivationSignal, QueryError, RecordingLoader, ScanStatus};
use serde::{Deserialize, Serialize};

/// Lifecycle transitions of whatever context owns the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Start,
    Stop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingList {
    pub folder: String,
    pub items: Vec<RecordingRecord>,
    /// Set when the scan was cut short by a stop.
    pub truncated: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("recording scan worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub struct RecordingService<I> {
    folder: SharedFolderPath,
    loader: Arc<RecordingLoader<I, SharedFolderPath>>,
}

impl<I> RecordingService<I>
where
    I: RecordingIndex + Send + Sync + 'static,
{
    pub fn new(index: I, settings: &Settings) -> Self {
        let folder = SharedFolderPath::from(settings);
        let loader = RecordingLoader::new(index, folder.clone(), ActivationSignal::new());
        Self {
            folder,
            loader: Arc::new(loader),
        }
    }

    pub fn handle_lifecycle(&self, event: LifecycleEvent) {
        tracing::info!(?event, "lifecycle transition");
        match event {
            LifecycleEvent::Start => self.loader.signal().activate(),
            LifecycleEvent::Stop => self.loader.signal().deactivate(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.loader.signal().is_active()
    }

    pub fn recordings_folder(&self) -> String {
        self.folder.folder_path()
    }

    pub fn set_recordings_folder(&self, path: impl Into<String>) {
        self.folder.set(path);
    }

    /// Runs a scan on the blocking pool and collects the result.
    ///
    /// `folder` in the result is the path the scan actually read, even if the
    /// folder changed while it ran.
    pub async fn refresh(&self) -> Result<RecordingList, ServiceError> {
        let loader = Arc::clone(&self.loader);

        let report = tokio::task::spawn_blocking(move || loader.scan())
            .await?
            .inspect_err(|err| tracing::warn!(error = %err, "recording scan failed"))?;

        Ok(RecordingList {
            folder: report.folder.unwrap_or_else(|| self.recordings_folder()),
            items: report.records,
            truncated: report.status == ScanStatus::Interrupted,
        })
    }
}

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub recordings_folder: String,
    pub video_extensions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            recordings_folder: default_recordings_folder(),
            video_extensions: ["mp4", "mkv", "webm", "mov", "3gp"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Settings {
    /// Reads settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default())
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_err)
    }
}

fn default_recordings_folder() -> String {
    let base = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(|home| PathBuf::from(home).join("Movies"))
        .unwrap_or_else(|_| PathBuf::from("."));
    base.join("ScreenRecordings").to_string_lossy().into_owned()
}

/// Source of the folder recordings are listed from.
///
/// Implementations must return the value current at the time of the call;
/// readers re-query it on every use instead of caching it.
pub trait FolderPathProvider: Send + Sync {
    fn folder_path(&self) -> String;
}

impl FolderPathProvider for String {
    fn folder_path(&self) -> String {
        self.clone()
    }
}

impl FolderPathProvider for &'static str {
    fn folder_path(&self) -> String {
        (*self).to_string()
    }
}

impl FolderPathProvider for Settings {
    fn folder_path(&self) -> String {
        self.recordings_folder.clone()
    }
}

impl<P: FolderPathProvider + ?Sized> FolderPathProvider for Arc<P> {
    fn folder_path(&self) -> String {
        (**self).folder_path()
    }
}

/// Shared, externally mutable folder path. Clones observe each other's writes.
#[derive(Debug, Clone, Default)]
pub struct SharedFolderPath {
    inner: Arc<RwLock<String>>,
}

impl SharedFolderPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(path.into())),
        }
    }

    pub fn set(&self, path: impl Into<String>) {
        *self.inner.write() = path.into();
    }
}

impl From<&Settings> for SharedFolderPath {
    fn from(settings: &Settings) -> Self {
        Self::new(settings.recordings_folder.clone())
    }
}

impl FolderPathProvider for SharedFolderPath {
    fn folder_path(&self) -> String {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_folder_ends_with_screen_recordings() {
        let settings = Settings::default();
        assert!(settings.recordings_folder.ends_with("ScreenRecordings"));
        assert!(settings.video_extensions.iter().any(|ext| ext == "mp4"));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn save_then_load_keeps_folder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            recordings_folder: "/data/Movies/Clips".to_string(),
            ..Settings::default()
        };
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "recordings_folder": "/tmp/Caps" }"#).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.recordings_folder, "/tmp/Caps");
        assert_eq!(loaded.video_extensions, Settings::default().video_extensions);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            Settings::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn shared_path_clones_see_updates() {
        let shared = SharedFolderPath::new("/a/One");
        let reader = shared.clone();
        shared.set("/a/Two");
        assert_eq!(reader.folder_path(), "/a/Two");
    }
}

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use walkdir::WalkDir;

use crate::{
    sort_by_date_added, IndexCursor, IndexError, IndexQuery, RecordingId, RecordingIndex,
    RecordingRecord,
};

/// Catalog backed by a directory tree. Video files are grouped by the name of
/// the directory that contains them; the modification time stands in for the
/// date the entry was added.
#[derive(Debug, Clone)]
pub struct DirectoryIndex {
    root: PathBuf,
    extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRow {
    pub id: RecordingId,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_unix_secs: i64,
}

pub struct DirectoryCursor {
    rows: std::vec::IntoIter<DirectoryRow>,
}

impl IndexCursor for DirectoryCursor {
    type Row = DirectoryRow;

    fn next_row(&mut self) -> Option<DirectoryRow> {
        self.rows.next()
    }
}

impl DirectoryIndex {
    pub fn new(root: impl Into<PathBuf>, extensions: &[String]) -> Self {
        Self {
            root: root.into(),
            extensions: extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    fn is_video(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|known| *known == ext)
            })
            .unwrap_or(false)
    }
}

fn parent_name(path: &Path) -> Option<&str> {
    path.parent()?.file_name()?.to_str()
}

/// Seconds relative to the epoch, floored; earlier times are negative.
fn unix_secs(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs() as i64,
        Err(err) => {
            let before = err.duration();
            let secs = before.as_secs() as i64;
            if before.subsec_nanos() > 0 {
                -secs - 1
            } else {
                -secs
            }
        }
    }
}

/// Same path, same id, across queries and folders.
fn path_id(path: &Path) -> RecordingId {
    let hash = blake3::hash(path.as_os_str().as_encoded_bytes());
    let mut id = [0u8; 8];
    id.copy_from_slice(&hash.as_bytes()[..8]);
    RecordingId::from_le_bytes(id)
}

impl RecordingIndex for DirectoryIndex {
    type Row = DirectoryRow;
    type Cursor = DirectoryCursor;

    fn open(&self, query: &IndexQuery) -> Result<DirectoryCursor, IndexError> {
        if !self.root.is_dir() {
            return Err(IndexError::Unavailable {
                reason: format!("{} is not a readable directory", self.root.display()),
            });
        }

        let mut rows = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(IndexError::Io(err.into())),
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unreadable catalog entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.is_video(entry.path()) {
                continue;
            }
            if parent_name(entry.path()) != Some(query.folder_name.as_str()) {
                continue;
            }

            let stamped = entry
                .metadata()
                .map_err(std::io::Error::from)
                .and_then(|metadata| metadata.modified().map(|time| (metadata.len(), time)));
            let (size_bytes, modified) = match stamped {
                Ok(found) => found,
                Err(err) => {
                    tracing::debug!(
                        path = %entry.path().display(),
                        error = %err,
                        "skipping catalog entry without a timestamp"
                    );
                    continue;
                }
            };

            let path = entry.into_path();
            rows.push(DirectoryRow {
                id: path_id(&path),
                path,
                size_bytes,
                modified_unix_secs: unix_secs(modified),
            });
        }

        sort_by_date_added(&mut rows, query.order, |row| row.modified_unix_secs);

        Ok(DirectoryCursor {
            rows: rows.into_iter(),
        })
    }

    fn to_record(&self, row: DirectoryRow) -> Result<RecordingRecord, IndexError> {
        let name = row
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| IndexError::MalformedRow {
                reason: format!("no file name in {}", row.path.display()),
            })?;

        Ok(RecordingRecord {
            id: row.id,
            name,
            path: row.path,
            size_bytes: row.size_bytes,
            date_added_unix_secs: row.modified_unix_secs,
        })
    }
}

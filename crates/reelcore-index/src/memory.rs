use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::{
    sort_by_date_added, IndexCursor, IndexError, IndexQuery, RecordingId, RecordingIndex,
    RecordingRecord,
};

/// A catalog entry as stored by a media catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub id: RecordingId,
    pub display_name: String,
    pub bucket_display_name: String,
    pub data_path: String,
    pub size_bytes: u64,
    pub date_added_unix_secs: i64,
}

/// In-memory media catalog.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    rows: Vec<CatalogRow>,
    unavailable: AtomicBool,
}

impl MemoryIndex {
    pub fn new(rows: Vec<CatalogRow>) -> Self {
        Self {
            rows,
            unavailable: AtomicBool::new(false),
        }
    }

    /// While unavailable, every `open` fails.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

pub struct MemoryCursor {
    rows: std::vec::IntoIter<CatalogRow>,
}

impl IndexCursor for MemoryCursor {
    type Row = CatalogRow;

    fn next_row(&mut self) -> Option<CatalogRow> {
        self.rows.next()
    }
}

impl RecordingIndex for MemoryIndex {
    type Row = CatalogRow;
    type Cursor = MemoryCursor;

    fn open(&self, query: &IndexQuery) -> Result<MemoryCursor, IndexError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IndexError::Unavailable {
                reason: "catalog is offline".to_string(),
            });
        }

        let mut rows: Vec<CatalogRow> = self
            .rows
            .iter()
            .filter(|row| row.bucket_display_name == query.folder_name)
            .cloned()
            .collect();
        sort_by_date_added(&mut rows, query.order, |row| row.date_added_unix_secs);

        Ok(MemoryCursor {
            rows: rows.into_iter(),
        })
    }

    fn to_record(&self, row: CatalogRow) -> Result<RecordingRecord, IndexError> {
        if row.data_path.is_empty() {
            return Err(IndexError::MalformedRow {
                reason: format!("row {} has no data path", row.id),
            });
        }
        if row.date_added_unix_secs < 0 {
            return Err(IndexError::MalformedRow {
                reason: format!("row {} has a negative date added", row.id),
            });
        }

        Ok(RecordingRecord {
            id: row.id,
            name: row.display_name,
            path: PathBuf::from(row.data_path),
            size_bytes: row.size_bytes,
            date_added_unix_secs: row.date_added_unix_secs,
        })
    }
}

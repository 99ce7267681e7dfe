use std::path::PathBuf;

use serde::{Deserialize, Serialize};

mod directory;
mod memory;

pub use directory::{DirectoryCursor, DirectoryIndex, DirectoryRow};
pub use memory::{CatalogRow, MemoryCursor, MemoryIndex};

pub type RecordingId = u64;

/// One discovered recording, as handed to callers of the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingRecord {
    pub id: RecordingId,
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub date_added_unix_secs: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    DateAddedDesc,
    DateAddedAsc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexQuery {
    /// Matched against the display name of the folder containing each entry.
    pub folder_name: String,
    pub order: SortOrder,
}

impl IndexQuery {
    pub fn newest_first(folder_name: impl Into<String>) -> Self {
        Self {
            folder_name: folder_name.into(),
            order: SortOrder::DateAddedDesc,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("index unavailable: {reason}")]
    Unavailable { reason: String },
    #[error("malformed row: {reason}")]
    MalformedRow { reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An open query over the index. Dropping the cursor releases it.
pub trait IndexCursor {
    type Row;

    fn next_row(&mut self) -> Option<Self::Row>;
}

pub trait RecordingIndex {
    type Row;
    type Cursor: IndexCursor<Row = Self::Row>;

    /// Opens a cursor over the entries in `query.folder_name`, in `query.order`.
    fn open(&self, query: &IndexQuery) -> Result<Self::Cursor, IndexError>;

    fn to_record(&self, row: Self::Row) -> Result<RecordingRecord, IndexError>;
}

impl<I: RecordingIndex + ?Sized> RecordingIndex for std::sync::Arc<I> {
    type Row = I::Row;
    type Cursor = I::Cursor;

    fn open(&self, query: &IndexQuery) -> Result<Self::Cursor, IndexError> {
        (**self).open(query)
    }

    fn to_record(&self, row: Self::Row) -> Result<RecordingRecord, IndexError> {
        (**self).to_record(row)
    }
}

pub(crate) fn sort_by_date_added<T>(
    rows: &mut [T],
    order: SortOrder,
    date_added: impl Fn(&T) -> i64,
) {
    match order {
        SortOrder::DateAddedDesc => rows.sort_by_key(|row| std::cmp::Reverse(date_added(row))),
        SortOrder::DateAddedAsc => rows.sort_by_key(|row| date_added(row)),
    }
}

//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the storage port for book snapshots and match results,
// plus the JSON file implementation used by both the REST adapter and the
// batch worker. Loading is lenient: a missing or malformed snapshot degrades
// to an empty book so the worker stays available.
//
// | Component     | Description                                                               |
// |---------------|---------------------------------------------------------------------------|
// | BookStore     | Async Load/Save port the engine is handed at construction                 |
// | JsonFileStore | File-backed implementation (orderbook.json / result.json)                 |
// | StorageError  | IO and serialization failures                                             |
//--------------------------------------------------------------------------------------------------

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::orderbook::BookSnapshot;
use crate::types::MatchOutcome;

/// Persistence failures. The engine never mutates in-memory state it cannot
/// flush; a failed save rolls the cycle back.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Storage port for the order book snapshot and the latest match result.
///
/// Passed into the engine explicitly rather than reached through process-wide
/// paths, so transports and tests can swap implementations.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Loads the persisted book. Absent or malformed snapshots yield an
    /// empty book; this method does not fail.
    async fn load_book(&self) -> BookSnapshot;

    /// Persists the book snapshot.
    async fn save_book(&self, snapshot: &BookSnapshot) -> Result<(), StorageError>;

    /// Persists the result record of a match cycle.
    async fn save_result(&self, outcome: &MatchOutcome) -> Result<(), StorageError>;

    /// Returns the most recently persisted result, if any.
    async fn load_latest_result(&self) -> Option<MatchOutcome>;
}

/// File-backed store: one JSON file for the book, one for the latest result.
pub struct JsonFileStore {
    book_path: PathBuf,
    result_path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `data_dir`, creating the directory if
    /// needed. Uses `orderbook.json` and `result.json` inside it.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> std::io::Result<Self> {
        let dir = data_dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            book_path: dir.join("orderbook.json"),
            result_path: dir.join("result.json"),
        })
    }

    /// Creates a store with explicit file locations, for split input/output
    /// directories (the batch worker's layout).
    pub fn with_paths(book_path: PathBuf, result_path: PathBuf) -> std::io::Result<Self> {
        for path in [&book_path, &result_path] {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            book_path,
            result_path,
        })
    }

    async fn write_json<T: serde::Serialize>(
        path: &Path,
        value: &T,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(value)?;
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(&json).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl BookStore for JsonFileStore {
    async fn load_book(&self) -> BookSnapshot {
        let raw = match tokio::fs::read_to_string(&self.book_path).await {
            Ok(raw) => raw,
            Err(_) => return BookSnapshot::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(path = %self.book_path.display(), %err, "malformed book snapshot, starting empty");
                BookSnapshot::default()
            }
        }
    }

    async fn save_book(&self, snapshot: &BookSnapshot) -> Result<(), StorageError> {
        Self::write_json(&self.book_path, snapshot).await
    }

    async fn save_result(&self, outcome: &MatchOutcome) -> Result<(), StorageError> {
        Self::write_json(&self.result_path, outcome).await
    }

    async fn load_latest_result(&self) -> Option<MatchOutcome> {
        let raw = tokio::fs::read_to_string(&self.result_path).await.ok()?;
        serde_json::from_str(&raw).ok()
    }
}

//--------------------------------------------------------------------------------------------------
//  TESTS
//--------------------------------------------------------------------------------------------------

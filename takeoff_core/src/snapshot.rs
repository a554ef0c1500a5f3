//! # Row Snapshots
//!
//! Calculators can persist their rows between sessions. A [`SnapshotStore`]
//! is a key-value store of JSON text keyed by [`CalculatorId`]; the typed
//! helpers [`save_rows`] and [`load_rows`] wrap a [`RowCollection`] in a
//! versioned [`RowSnapshot`] and restore it verbatim.
//!
//! Two stores ship with the crate:
//! - [`MemorySnapshotStore`] for tests and embedding
//! - [`FileSnapshotStore`] (native only), one `<calculator-id>.json` per
//!   calculator in a directory, written atomically under a file lock
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::calculators::CalculatorId;
//! use takeoff_core::calculators::masonry::BrickRow;
//! use takeoff_core::rows::RowCollection;
//! use takeoff_core::snapshot::{load_rows, save_rows, MemorySnapshotStore};
//!
//! let mut store = MemorySnapshotStore::new();
//! let mut rows: RowCollection<BrickRow> = RowCollection::new();
//! rows.update_row(1, "area", 12.5);
//! save_rows(&mut store, CalculatorId::Brick, &rows)?;
//!
//! let restored: RowCollection<BrickRow> = load_rows(&store, CalculatorId::Brick)?.unwrap();
//! assert_eq!(restored, rows);
//! # Ok::<(), takeoff_core::errors::TakeoffError>(())
//! ```

use std::collections::BTreeMap;

use crate::calculators::CalculatorId;
use crate::errors::{TakeoffError, TakeoffResult};
use crate::rows::{RowCollection, RowFields, RowSnapshot};
use crate::session::validate_version;

/// Key-value store for persisted row snapshots.
pub trait SnapshotStore {
    fn save_raw(&mut self, id: CalculatorId, json: String) -> TakeoffResult<()>;

    fn load_raw(&self, id: CalculatorId) -> TakeoffResult<Option<String>>;

    fn remove(&mut self, id: CalculatorId) -> TakeoffResult<()>;
}

/// Persist a calculator's rows
pub fn save_rows<T: RowFields>(
    store: &mut dyn SnapshotStore,
    id: CalculatorId,
    rows: &RowCollection<T>,
) -> TakeoffResult<()> {
    let snapshot = rows.snapshot(id);
    let json = serde_json::to_string(&snapshot).map_err(TakeoffError::serialization)?;
    tracing::debug!(calculator = %id, rows = rows.len(), "saving row snapshot");
    store.save_raw(id, json)
}

/// Restore a calculator's rows; `None` when nothing was saved for it
pub fn load_rows<T: RowFields>(store: &dyn SnapshotStore, id: CalculatorId) -> TakeoffResult<Option<RowCollection<T>>> {
    let Some(json) = store.load_raw(id)? else {
        return Ok(None);
    };

    let snapshot: RowSnapshot<T> = serde_json::from_str(&json)
        .map_err(|e| TakeoffError::serialization(format!("snapshot for {}: {}", id, e)))?;
    validate_version(&snapshot.version)?;

    if snapshot.calculator != id {
        return Err(TakeoffError::invalid_input(
            "calculator",
            snapshot.calculator.as_str(),
            format!("snapshot stored under {} belongs to another calculator", id),
        ));
    }

    tracing::debug!(calculator = %id, rows = snapshot.rows.len(), "restored row snapshot");
    Ok(Some(RowCollection::restore(snapshot)))
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    entries: BTreeMap<CalculatorId, String>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        MemorySnapshotStore::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save_raw(&mut self, id: CalculatorId, json: String) -> TakeoffResult<()> {
        self.entries.insert(id, json);
        Ok(())
    }

    fn load_raw(&self, id: CalculatorId) -> TakeoffResult<Option<String>> {
        Ok(self.entries.get(&id).cloned())
    }

    fn remove(&mut self, id: CalculatorId) -> TakeoffResult<()> {
        self.entries.remove(&id);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file_store::FileSnapshotStore;

#[cfg(not(target_arch = "wasm32"))]
mod file_store {
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::SnapshotStore;
    use crate::calculators::CalculatorId;
    use crate::errors::{TakeoffError, TakeoffResult};
    use crate::file_io::{read_file, write_atomic, FileLock};

    /// One JSON file per calculator in a directory.
    #[derive(Debug, Clone)]
    pub struct FileSnapshotStore {
        dir: PathBuf,
        user_id: String,
    }

    impl FileSnapshotStore {
        pub fn new(dir: impl Into<PathBuf>, user_id: impl Into<String>) -> Self {
            FileSnapshotStore {
                dir: dir.into(),
                user_id: user_id.into(),
            }
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        pub fn path_for(&self, id: CalculatorId) -> PathBuf {
            self.dir.join(format!("{}.json", id.as_str()))
        }
    }

    impl SnapshotStore for FileSnapshotStore {
        fn save_raw(&mut self, id: CalculatorId, json: String) -> TakeoffResult<()> {
            fs::create_dir_all(&self.dir).map_err(|e| {
                TakeoffError::file_error("create snapshot dir", self.dir.display().to_string(), e.to_string())
            })?;
            let path = self.path_for(id);
            let _lock = FileLock::acquire(&path, self.user_id.as_str())?;
            write_atomic(&path, &json)
        }

        fn load_raw(&self, id: CalculatorId) -> TakeoffResult<Option<String>> {
            let path = self.path_for(id);
            if !path.exists() {
                return Ok(None);
            }
            read_file(&path).map(Some)
        }

        fn remove(&mut self, id: CalculatorId) -> TakeoffResult<()> {
            let path = self.path_for(id);
            if path.exists() {
                fs::remove_file(&path)
                    .map_err(|e| TakeoffError::file_error("remove snapshot", path.display().to_string(), e.to_string()))?;
            }
            Ok(())
        }
    }
}

//! File-backed record store.
//!
//! The whole collection lives in one JSON array file. Every append reloads the
//! file, pushes the record and rewrites the array. All file access goes through
//! a single mutex, so two appends in the same process can never interleave
//! their load and write steps.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::{IngestError, IngestResult};
use crate::record::{Collection, Record};

pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Open the store at `path`, creating an empty collection if the file is absent.
    pub fn open(path: impl Into<PathBuf>) -> IngestResult<Self> {
        let store = Self::new(path);
        store.initialize()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the backing file holding `[]` unless it already exists.
    ///
    /// An existing file is left untouched, whatever it contains.
    pub fn initialize(&self) -> IngestResult<()> {
        let _guard = self.acquire()?;

        if self.path.exists() {
            tracing::debug!(path = %self.path.display(), "store already present");
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| IngestError::store_unavailable("creating store directory", e))?;
        }

        self.write_collection(&Collection::new())?;
        tracing::info!(path = %self.path.display(), "created empty store");
        Ok(())
    }

    /// Read the full collection in insertion order.
    pub fn load(&self) -> IngestResult<Collection> {
        let _guard = self.acquire()?;
        self.read_collection()
    }

    /// Append `record` and persist the collection. Returns the new length.
    pub fn append(&self, record: Record) -> IngestResult<usize> {
        let _guard = self.acquire()?;

        let mut records = self.read_collection()?;
        records.push(record);
        self.write_collection(&records)?;

        tracing::debug!(path = %self.path.display(), total = records.len(), "record appended");
        Ok(records.len())
    }

    fn acquire(&self) -> IngestResult<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| IngestError::internal("store lock poisoned"))
    }

    fn read_collection(&self) -> IngestResult<Collection> {
        let bytes = fs::read(&self.path).map_err(|e| {
            IngestError::store_unavailable(format!("reading {}", self.path.display()), e)
        })?;
        serde_json::from_slice(&bytes).map_err(IngestError::corrupt_store)
    }

    // Write to a sibling temp file and rename it over the store, so a crash
    // mid-write leaves the previous collection intact.
    fn write_collection(&self, records: &Collection) -> IngestResult<()> {
        let body = serde_json::to_vec_pretty(records)
            .map_err(|e| IngestError::internal(format!("serializing collection: {e}")))?;

        let tmp_path = self.tmp_path();
        let mut file = File::create(&tmp_path).map_err(|e| {
            IngestError::store_unavailable(format!("creating {}", tmp_path.display()), e)
        })?;
        file.write_all(&body)
            .and_then(|()| file.sync_all())
            .map_err(|e| {
                IngestError::store_unavailable(format!("writing {}", tmp_path.display()), e)
            })?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            IngestError::store_unavailable(format!("replacing {}", self.path.display()), e)
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn temp_store() -> (JsonFileStore, TempDir) {
        let dir = TempDir::new().expect("temp dir should be created");
        let store = JsonFileStore::open(dir.path().join("dados.json")).expect("store should open");
        (store, dir)
    }

    #[test]
    fn initialize_creates_empty_array() {
        let (store, _dir) = temp_store();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn initialize_is_idempotent_and_keeps_content() {
        let (store, _dir) = temp_store();
        store.append(record(json!({"a": 1}))).unwrap();

        store.initialize().unwrap();
        store.initialize().unwrap();

        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn initialize_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("dados.json");
        let store = JsonFileStore::open(&path).unwrap();
        assert!(path.exists());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn append_returns_running_total_in_order() {
        let (store, _dir) = temp_store();
        assert_eq!(store.append(record(json!({"n": 1}))).unwrap(), 1);
        assert_eq!(store.append(record(json!({"n": 2}))).unwrap(), 2);
        assert_eq!(store.append(record(json!({"n": 1}))).unwrap(), 3);

        let loaded = store.load().unwrap();
        let ns: Vec<_> = loaded.iter().map(|r| r["n"].clone()).collect();
        assert_eq!(ns, [json!(1), json!(2), json!(1)]);
    }

    #[test]
    fn file_is_pretty_printed_with_two_spaces() {
        let (store, _dir) = temp_store();
        store
            .append(record(json!({"sensor": "temp", "value": 21.5})))
            .unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            text,
            "[\n  {\n    \"sensor\": \"temp\",\n    \"value\": 21.5\n  }\n]"
        );
        assert!(!store.tmp_path().exists());
    }

    #[test]
    fn reload_preserves_content_and_order() {
        let (store, dir) = temp_store();
        let first = record(json!({"z": [1, {"k": null}], "a": "ção", "timestamp": "2024-01-01 00:00:00"}));
        let second = record(json!({"b": true, "n": -3}));
        store.append(first.clone()).unwrap();
        store.append(second.clone()).unwrap();

        let reopened = JsonFileStore::open(dir.path().join("dados.json")).unwrap();
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded, vec![first, second]);
        let keys: Vec<&str> = loaded[0].keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "timestamp"]);
    }

    #[test]
    fn load_reports_corrupt_content() {
        let (store, _dir) = temp_store();
        fs::write(store.path(), "{\"not\": \"an array\"}").unwrap();
        assert!(matches!(store.load(), Err(IngestError::CorruptStore { .. })));

        fs::write(store.path(), "[1, 2").unwrap();
        assert!(matches!(store.load(), Err(IngestError::CorruptStore { .. })));
    }

    #[test]
    fn append_to_corrupt_store_leaves_file_alone() {
        let (store, _dir) = temp_store();
        fs::write(store.path(), "garbage").unwrap();

        let err = store.append(record(json!({"a": 1}))).unwrap_err();
        assert!(matches!(err, IngestError::CorruptStore { .. }));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "garbage");
    }

    #[test]
    fn missing_file_is_unavailable() {
        let (store, _dir) = temp_store();
        fs::remove_file(store.path()).unwrap();

        assert!(matches!(store.load(), Err(IngestError::StoreUnavailable { .. })));
        assert!(matches!(
            store.append(record(json!({"a": 1}))),
            Err(IngestError::StoreUnavailable { .. })
        ));
    }

    #[test]
    fn concurrent_appends_do_not_lose_records() {
        let (store, _dir) = temp_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..10 {
                        store
                            .append(record(json!({"worker": worker, "i": i})))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.load().unwrap().len(), 80);
    }
}

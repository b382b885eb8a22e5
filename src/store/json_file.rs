//! JSON-file store — one pretty-printed file per record.
//!
//! Layout:
//! ```text
//! {data_dir}/
//! ├── snippets.json
//! └── graph.json
//! ```
//!
//! Each `set` is a single `fs::write` of the whole record, which the core
//! assumes is atomic enough for its purposes (per-record, not cross-record).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

use super::StateStore;

#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (or create) the store rooted at `dir`.  Safe to call repeatedly.
    pub fn open(dir: &Path) -> Result<Self, AppError> {
        fs::create_dir_all(dir)
            .map_err(|e| AppError::Store(format!("cannot create {}: {e}", dir.display())))?;
        Ok(Self { dir: dir.to_path_buf() })
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStore for JsonFileStore {
    fn store_type(&self) -> &str {
        "json_file"
    }

    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| AppError::Store(format!("cannot read {}: {e}", path.display())))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.record_path(key);
        fs::write(&path, value)
            .map_err(|e| AppError::Store(format!("cannot write {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_store() -> (TempDir, JsonFileStore) {
        let temp = TempDir::new().expect("tempdir");
        let store = JsonFileStore::open(&temp.path().join("weaver")).expect("open");
        (temp, store)
    }

    #[test]
    fn open_creates_dir() {
        let (temp, _store) = make_store();
        assert!(temp.path().join("weaver").exists());
    }

    #[test]
    fn missing_key_reads_none() {
        let (_temp, store) = make_store();
        assert!(store.get("snippets").expect("get").is_none());
    }

    #[test]
    fn set_then_get_round_trips() {
        let (_temp, store) = make_store();
        store.set("graph", "{\"nodes\":[]}").expect("set");
        assert_eq!(store.get("graph").expect("get").as_deref(), Some("{\"nodes\":[]}"));
    }

    #[test]
    fn set_overwrites_previous_value() {
        let (_temp, store) = make_store();
        store.set("graph", "first").expect("set");
        store.set("graph", "second").expect("overwrite");
        assert_eq!(store.get("graph").expect("get").as_deref(), Some("second"));
    }

    #[test]
    fn records_live_in_separate_files() {
        let (temp, store) = make_store();
        store.set("snippets", "[]").expect("set snippets");
        store.set("graph", "{}").expect("set graph");
        assert!(temp.path().join("weaver/snippets.json").exists());
        assert!(temp.path().join("weaver/graph.json").exists());
    }
}

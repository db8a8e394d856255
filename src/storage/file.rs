//! File Store Module
//!
//! Default secondary backend: one JSON record file per key under a root
//! directory, written atomically via a temp file and rename.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::cache::Entry;
use crate::error::{CacheError, Result};
use crate::storage::{SecondaryStore, MAX_KEY_LENGTH};

/// Subdirectory for in-flight writes; reserved by the leading-dot key rule.
const TMP_DIR: &str = ".tmp";

// == File Store ==
/// Stores each entry as `<root>/<key>`, serialized as JSON.
///
/// Writes land in `<root>/.tmp/<uuid>` first and are renamed into place, so
/// a record is either fully visible or not there at all. Temp files share
/// the root's filesystem, which keeps the rename atomic.
#[derive(Debug)]
pub struct FileStore {
    /// Directory holding one record file per key
    root: PathBuf,
    /// Staging directory for in-flight writes
    tmp_dir: PathBuf,
}

impl FileStore {
    // == Constructor ==
    /// Creates a store rooted at `root`, creating the directory tree if
    /// needed.
    ///
    /// # Arguments
    /// * `root` - Directory that will hold the record files
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let tmp_dir = root.join(TMP_DIR);

        std::fs::create_dir_all(&tmp_dir).map_err(|e| {
            CacheError::Storage(format!(
                "create store directory '{}': {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self { root, tmp_dir })
    }

    // == Record Path ==
    /// Returns the on-disk path for `key`. Only safe for validated keys.
    fn record_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

// == Secondary Store Implementation ==
#[async_trait]
impl SecondaryStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    // == Validate Key ==
    /// Enforces the file-naming scheme: keys become file names verbatim, so
    /// anything that would escape the root directory or collide with the
    /// temp directory is rejected.
    fn validate_key(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("key must not be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidKey(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if key.starts_with('.') {
            return Err(CacheError::InvalidKey(format!(
                "key '{}' must not start with '.'",
                key
            )));
        }
        if let Some(bad) = key.chars().find(|c| matches!(c, '/' | '\\' | '\0')) {
            return Err(CacheError::InvalidKey(format!(
                "key contains forbidden character {:?}",
                bad
            )));
        }
        Ok(())
    }

    // == Write ==
    async fn write(&self, key: &str, entry: &Entry) -> Result<()> {
        self.validate_key(key)?;

        let bytes = serde_json::to_vec(entry).map_err(|e| {
            CacheError::Storage(format!("serialize record for '{}': {}", key, e))
        })?;

        // Stage under a unique name, then rename into place
        let temp_path = self.tmp_dir.join(Uuid::new_v4().to_string());
        fs::write(&temp_path, &bytes).await.map_err(|e| {
            CacheError::Storage(format!("stage record for '{}': {}", key, e))
        })?;

        if let Err(e) = fs::rename(&temp_path, self.record_path(key)).await {
            // Best-effort cleanup; the temp file is garbage either way
            let _ = fs::remove_file(&temp_path).await;
            return Err(CacheError::Storage(format!(
                "publish record for '{}': {}",
                key, e
            )));
        }

        Ok(())
    }

    // == Read ==
    async fn read(&self, key: &str) -> Result<Option<Entry>> {
        self.validate_key(key)?;

        let bytes = match fs::read(self.record_path(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheError::Storage(format!(
                    "read record for '{}': {}",
                    key, e
                )))
            }
        };

        let entry = serde_json::from_slice(&bytes).map_err(|e| {
            CacheError::Storage(format!("decode record for '{}': {}", key, e))
        })?;

        Ok(Some(entry))
    }

    // == Delete ==
    async fn delete(&self, key: &str) -> Result<bool> {
        self.validate_key(key)?;

        match fs::remove_file(self.record_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Storage(format!(
                "delete record for '{}': {}",
                key, e
            ))),
        }
    }

    // == Contains ==
    async fn contains(&self, key: &str) -> bool {
        if self.validate_key(key).is_err() {
            return false;
        }
        match fs::metadata(self.record_path(key)).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let (_dir, store) = store();
        let entry = Entry::new(json!({"n": 1}), None, None);

        store.write("key1", &entry).await.unwrap();
        let loaded = store.read("key1").await.unwrap();

        assert_eq!(loaded, Some(entry));
    }

    #[tokio::test]
    async fn test_read_absent_is_none() {
        let (_dir, store) = store();

        assert_eq!(store.read("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_overwrites_record() {
        let (_dir, store) = store();

        store
            .write("key1", &Entry::new(json!("old"), None, None))
            .await
            .unwrap();
        store
            .write("key1", &Entry::new(json!("new"), None, None))
            .await
            .unwrap();

        let loaded = store.read("key1").await.unwrap().unwrap();
        assert_eq!(loaded.value, json!("new"));
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let (_dir, store) = store();

        store
            .write("key1", &Entry::new(json!(1), None, None))
            .await
            .unwrap();

        assert!(store.delete("key1").await.unwrap());
        assert!(!store.delete("key1").await.unwrap());
        assert_eq!(store.read("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_contains_probe() {
        let (_dir, store) = store();

        assert!(!store.contains("key1").await);
        store
            .write("key1", &Entry::new(json!(1), None, None))
            .await
            .unwrap();
        assert!(store.contains("key1").await);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_storage_error() {
        let (dir, store) = store();

        std::fs::write(dir.path().join("key1"), b"not json").unwrap();

        let result = store.read("key1").await;
        assert!(matches!(result, Err(CacheError::Storage(_))));
    }

    #[tokio::test]
    async fn test_record_file_named_by_key() {
        let (dir, store) = store();

        store
            .write("exact-name", &Entry::new(json!(true), None, None))
            .await
            .unwrap();

        assert!(dir.path().join("exact-name").is_file());
    }

    #[tokio::test]
    async fn test_temp_dir_left_clean_after_writes() {
        let (dir, store) = store();

        for i in 0..5 {
            let key = format!("key{}", i);
            store
                .write(&key, &Entry::new(json!(i), None, None))
                .await
                .unwrap();
        }

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join(TMP_DIR))
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_validate_key_rules() {
        let (_dir, store) = store();

        assert!(store.validate_key("plain-key").is_ok());
        assert!(store.validate_key("key.with.dots").is_ok());
        assert!(store.validate_key(&"x".repeat(MAX_KEY_LENGTH)).is_ok());

        assert!(matches!(
            store.validate_key(""),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(
            store.validate_key(&"x".repeat(MAX_KEY_LENGTH + 1)),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(
            store.validate_key(".hidden"),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(
            store.validate_key("a/b"),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(
            store.validate_key("a\\b"),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(
            store.validate_key("a\0b"),
            Err(CacheError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_operations_reject_invalid_keys() {
        let (_dir, store) = store();
        let entry = Entry::new(json!(1), None, None);

        assert!(matches!(
            store.write("../escape", &entry).await,
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(
            store.read(".tmp").await,
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(
            store.delete("").await,
            Err(CacheError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_backend_name() {
        let (_dir, store) = store();
        assert_eq!(store.name(), "file");
    }
}

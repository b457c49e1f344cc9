//! File-backed key-value store with atomic writes.
//!
//! Each key maps to one file in the store directory. Writes go to a
//! temporary sibling file which is fsynced and then renamed over the
//! target, so a crash mid-write leaves the previous snapshot intact.

use async_trait::async_trait;
use ephone_core::error::{EphoneError, Result};
use ephone_core::storage::KeyValueStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// A handle to a directory of key files.
///
/// Provides:
/// - **Atomicity**: updates are all-or-nothing via tmp file + atomic rename
/// - **Isolation**: writes through one store are serialized by an async lock
/// - **Durability**: explicit fsync before rename
#[derive(Debug)]
pub struct FileKeyValueStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a storage key to its file.
    ///
    /// Anything outside `[A-Za-z0-9._-]` becomes `_`, so keys such as
    /// `@e-phone:cart` stay portable file names.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file_stem}.json"))
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(EphoneError::io(format!(
                "Failed to read {}: {}",
                path.display(),
                err
            ))),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        fs::create_dir_all(&self.root).await?;

        let path = self.path_for(key);
        let tmp_path = Self::temp_path(&path);

        let mut tmp_file = fs::File::create(&tmp_path).await?;
        tmp_file.write_all(&value).await?;
        tmp_file.sync_all().await?;
        drop(tmp_file);

        fs::rename(&tmp_path, &path).await?;
        tracing::debug!(key, path = %path.display(), bytes = value.len(), "Stored snapshot");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_key_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("store"));
        assert!(store.get("@e-phone:cart").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_creates_directory_and_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("nested").join("store"));

        store.set("@e-phone:cart", b"[1,2,3]".to_vec()).await.unwrap();
        assert_eq!(
            store.get("@e-phone:cart").await.unwrap(),
            Some(b"[1,2,3]".to_vec())
        );

        let path = store.path_for("@e-phone:cart");
        assert_eq!(path.file_name().unwrap(), "_e-phone_cart.json");
        assert_eq!(path.parent().unwrap(), store.root());
        assert!(!FileKeyValueStore::temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_previous_value() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.set("key", b"first".to_vec()).await.unwrap();
        store.set("key", b"second".to_vec()).await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.set("key", b"value".to_vec()).await.unwrap();
        store.delete("key").await.unwrap();
        store.delete("key").await.unwrap();
        assert!(store.get("key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blank_file_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());
        std::fs::write(store.path_for("key"), "  \n").unwrap();
        assert!(store.get("key").await.unwrap().is_none());
    }
}

//! Key-value storage backends for saved options.
//!
//! [`FileStore`] keeps the options in a JSON object on disk and stands in
//! for the browser's synced storage. [`MemoryStore`] keeps them in memory.
//!
//! ## Atomicity
//!
//! `FileStore` writes use a temp file + rename so a crash mid-write never
//! leaves a truncated options file behind.

use std::collections::BTreeMap;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::errors::StoreError;

/// Saved option values keyed by option name.
pub type SavedOptions = BTreeMap<String, String>;

/// Environment variable overriding the options file location.
pub const OPTIONS_FILE_ENV_VAR: &str = "READ_ALOUD_OPTIONS_FILE";

/// Persistent key-value storage for option values.
///
/// Uses native async functions in traits; implementations must be
/// `Send + Sync` so handlers can be shared across tasks.
pub trait OptionsStore: Send + Sync {
    /// Returns the stored values for `keys`. Keys without a value are left
    /// out of the result.
    fn get(&self, keys: &[&str]) -> impl Future<Output = Result<SavedOptions, StoreError>> + Send;

    /// Stores `values`, keeping any keys not mentioned.
    fn set(&self, values: SavedOptions) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Options persisted as a JSON object in a file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store backed by `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the location named by `READ_ALOUD_OPTIONS_FILE`,
    /// or `<config dir>/read-aloud/options.json`.
    ///
    /// ## Errors
    ///
    /// Returns `StoreError::NoConfigDir` if neither is available.
    pub fn from_env() -> Result<Self, StoreError> {
        if let Some(path) = std::env::var_os(OPTIONS_FILE_ENV_VAR).filter(|p| !p.is_empty()) {
            return Ok(Self::new(path));
        }
        Self::default_path().map(Self::new)
    }

    /// The default options file location.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        dirs::config_dir()
            .map(|dir| dir.join("read-aloud").join("options.json"))
            .ok_or(StoreError::NoConfigDir)
    }

    /// Returns the path of the options file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<SavedOptions, StoreError> {
        let path_str = self.path.display().to_string();

        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path_str, "No options file yet");
                return Ok(SavedOptions::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: path_str,
                    source,
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(SavedOptions::new());
        }

        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            path: path_str,
            source,
        })
    }

    fn write_atomically(&self, values: &SavedOptions) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(values)?;

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        // Temp file in the same directory so the rename stays on one filesystem
        let mut temp_file = tempfile::NamedTempFile::new_in(&parent)?;
        temp_file.write_all(json.as_bytes())?;
        temp_file.flush()?;
        temp_file.persist(&self.path)?;

        Ok(())
    }
}

impl OptionsStore for FileStore {
    async fn get(&self, keys: &[&str]) -> Result<SavedOptions, StoreError> {
        let mut all = self.load().await?;
        Ok(keys
            .iter()
            .filter_map(|key| all.remove_entry(*key))
            .collect())
    }

    async fn set(&self, values: SavedOptions) -> Result<(), StoreError> {
        let mut all = self.load().await?;
        let count = values.len();
        all.extend(values);

        self.write_atomically(&all)
            .map_err(|e| StoreError::Write {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        tracing::info!(path = %self.path.display(), count, "Saved options");
        Ok(())
    }
}

/// Options held in memory for the lifetime of the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<SavedOptions>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `values`.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl OptionsStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<SavedOptions, StoreError> {
        let values = self.values.lock().await;
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, values: SavedOptions) -> Result<(), StoreError> {
        self.values.lock().await.extend(values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options(pairs: &[(&str, &str)]) -> SavedOptions {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_file_store_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("options.json"));
        let values = store.get(&["apiKey", "voice"]).await.unwrap();
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_round_trip_and_merge() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("options.json"));

        store.set(options(&[("apiKey", "abc")])).await.unwrap();
        store.set(options(&[("voice", "en-US-Wavenet-D")])).await.unwrap();

        let values = store.get(&["apiKey", "voice"]).await.unwrap();
        assert_eq!(values, options(&[("apiKey", "abc"), ("voice", "en-US-Wavenet-D")]));

        let only_voice = store.get(&["voice"]).await.unwrap();
        assert_eq!(only_voice.len(), 1);
    }

    #[tokio::test]
    async fn test_file_store_reports_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let store = FileStore::new(&path);
        let err = store.get(&["apiKey"]).await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_file_store_does_not_leave_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("options.json"));
        store.set(options(&[("apiKey", "abc")])).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_uses_override() {
        // SAFETY: serialized with the other env-touching tests
        unsafe {
            std::env::set_var(OPTIONS_FILE_ENV_VAR, "/tmp/read-aloud-test.json");
        }
        let store = FileStore::from_env().unwrap();
        assert_eq!(store.path(), Path::new("/tmp/read-aloud-test.json"));
        unsafe {
            std::env::remove_var(OPTIONS_FILE_ENV_VAR);
        }
    }

    #[tokio::test]
    async fn test_memory_store_get_and_set() {
        let store = MemoryStore::with_values([("apiKey", "k")]);
        store.set(options(&[("voice", "v")])).await.unwrap();

        let values = store.get(&["apiKey", "voice", "other"]).await.unwrap();
        assert_eq!(values, options(&[("apiKey", "k"), ("voice", "v")]));
    }
}

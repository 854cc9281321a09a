//! Durable client-side storage for the session token.
//!
//! Storage is a flat string map persisted as JSON, so the token survives
//! restarts the same way a browser keeps it in local storage.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use color_eyre::Result;
use tracing::debug;

use crate::api::SessionToken;

/// Key under which the session token is stored.
pub const TOKEN_KEY: &str = "token";

const DATA_DIR: &str = "lazyarticles";
const STORAGE_FILE: &str = "storage.json";

/// A small string key/value store.
pub trait Storage: Send {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns an error if the value could not be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// # Errors
    /// Returns an error if the removal could not be persisted.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Read the stored session token, if any.
pub fn load_token(storage: &dyn Storage) -> Option<SessionToken> {
    storage
        .get(TOKEN_KEY)
        .filter(|token| !token.is_empty())
        .map(SessionToken::new)
}

/// In-memory storage, used when no data directory is available and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Storage backed by a JSON file. Every write rewrites the whole file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let data = fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&data)?
            }
        } else {
            BTreeMap::new()
        };
        debug!("Opened storage at {:?} ({} keys)", path, values.len());
        Ok(Self { path, values })
    }

    /// Default location: `<data_local_dir>/lazyarticles/storage.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|p| p.join(DATA_DIR).join(STORAGE_FILE))
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.values)?;
        let mut file = owner_only_options().open(&self.path)?;
        // Files created before permissions were restricted keep their mode.
        restrict_permissions(&self.path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// The file holds a bearer token.
#[cfg(unix)]
fn owner_only_options() -> OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true).mode(0o600);
    options
}

#[cfg(not(unix))]
fn owner_only_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    options
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();
        assert!(load_token(&storage).is_none());

        storage.set(TOKEN_KEY, "abc").unwrap();
        assert_eq!(load_token(&storage), Some(SessionToken::new("abc")));

        storage.remove(TOKEN_KEY).unwrap();
        assert!(load_token(&storage).is_none());
    }

    #[test]
    fn empty_token_counts_as_absent() {
        let mut storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "").unwrap();
        assert!(load_token(&storage).is_none());
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(STORAGE_FILE);

        let mut storage = FileStorage::open(&path).unwrap();
        storage.set(TOKEN_KEY, "persisted").unwrap();
        storage.set("other", "value").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(load_token(&reopened), Some(SessionToken::new("persisted")));
        assert_eq!(reopened.get("other").as_deref(), Some("value"));
    }

    #[test]
    fn file_storage_remove_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORAGE_FILE);

        let mut storage = FileStorage::open(&path).unwrap();
        storage.set(TOKEN_KEY, "t").unwrap();
        storage.set("other", "value").unwrap();
        storage.remove(TOKEN_KEY).unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert!(reopened.get(TOKEN_KEY).is_none());
        assert_eq!(reopened.get("other").as_deref(), Some("value"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORAGE_FILE);
        fs::write(&path, "not json").unwrap();

        assert!(FileStorage::open(&path).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORAGE_FILE);
        let mut storage = FileStorage::open(&path).unwrap();
        storage.set(TOKEN_KEY, "t").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn existing_readable_file_is_tightened() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORAGE_FILE);
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let mut storage = FileStorage::open(&path).unwrap();
        storage.set(TOKEN_KEY, "t").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).as_deref(), Some("t"));
    }
}

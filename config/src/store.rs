//! The persisted local key/value store.
//!
//! A flat table of strings in `~/.rabbit/local.toml`. Every mutation rewrites
//! the file atomically with owner-only permissions; comments and unknown keys
//! in the file survive because edits go through `toml_edit`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use rabbit_utils::{AtomicWriteOptions, FileSyncPolicy, PersistMode, atomic_write_with_options};

use crate::rabbit_dir;

/// Keys the console reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreKey {
    ApiBase,
    DevApiKey,
    DevUserId,
    SocialProvider,
    AdminAuthToken,
    LitellmApiKey,
    EnvWritebackSnapshot,
}

impl StoreKey {
    pub const ALL: [Self; 7] = [
        Self::ApiBase,
        Self::DevApiKey,
        Self::DevUserId,
        Self::SocialProvider,
        Self::AdminAuthToken,
        Self::LitellmApiKey,
        Self::EnvWritebackSnapshot,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiBase => "api_base",
            Self::DevApiKey => "dev_api_key",
            Self::DevUserId => "dev_user_id",
            Self::SocialProvider => "social_provider",
            Self::AdminAuthToken => "admin_auth_token",
            Self::LitellmApiKey => "litellm_api_key",
            Self::EnvWritebackSnapshot => "env_writeback_snapshot",
        }
    }

    /// Whether the value is a credential that must never be printed in full.
    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(
            self,
            Self::DevApiKey | Self::AdminAuthToken | Self::LitellmApiKey
        )
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not determine home directory for the local store")]
    NoHomeDir,
    #[error("failed to access local store at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse local store at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },
}

/// Process-wide key/value state shared by the client and session workflows.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: StoreKey) -> Option<String>;
    fn set(&self, key: StoreKey, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: StoreKey) -> Result<(), StoreError>;

    /// The trimmed value, treating blank as absent.
    fn get_non_empty(&self, key: StoreKey) -> Option<String> {
        self.get(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

#[must_use]
pub fn local_store_path() -> Option<PathBuf> {
    rabbit_dir().map(|dir| dir.join("local.toml"))
}

/// File-backed store.
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl LocalStore {
    /// Open the store at its default location.
    pub fn open_default() -> Result<Self, StoreError> {
        let path = local_store_path().ok_or(StoreError::NoHomeDir)?;
        Self::open(path)
    }

    /// Open (or lazily create) the store at `path`. Non-string values in an
    /// existing file are ignored.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let doc = read_document(&path)?;
        let entries = doc
            .iter()
            .filter_map(|(key, item)| item.as_str().map(|value| (key.to_string(), value.to_string())))
            .collect();
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, key: StoreKey, value: Option<&str>) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        let mut doc = read_document(&self.path)?;
        match value {
            Some(value) => doc[key.as_str()] = toml_edit::value(value),
            None => {
                doc.remove(key.as_str());
            }
        }
        self.persist(&doc)?;

        match value {
            Some(value) => entries.insert(key.as_str().to_string(), value.to_string()),
            None => entries.remove(key.as_str()),
        };
        tracing::debug!(key = %key, removed = value.is_none(), "Updated local store");
        Ok(())
    }

    fn persist(&self, doc: &toml_edit::DocumentMut) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if owned_by_current_user(parent) || !parent.exists() {
                rabbit_utils::ensure_private_dir(parent).map_err(io_err)?;
            } else {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        atomic_write_with_options(
            &self.path,
            doc.to_string().as_bytes(),
            AtomicWriteOptions {
                file_sync: FileSyncPolicy::SyncAll,
                mode: PersistMode::SensitiveOwnerOnly,
            },
        )
        .map_err(io_err)
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: StoreKey) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key.as_str())
            .cloned()
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        self.update(key, Some(value))
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        if self.get(key).is_none() {
            return Ok(());
        }
        self.update(key, None)
    }
}

fn read_document(path: &Path) -> Result<toml_edit::DocumentMut, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(unix)]
fn owned_by_current_user(path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    // SAFETY: getuid has no preconditions and cannot fail.
    let our_uid = unsafe { libc::getuid() };
    fs::metadata(path).is_ok_and(|metadata| metadata.uid() == our_uid)
}

#[cfg(not(unix))]
fn owned_by_current_user(_path: &Path) -> bool {
    true
}

/// In-memory store for tests and one-shot invocations.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<StoreKey, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(self, key: StoreKey, value: &str) -> Self {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, LocalStore, MemoryStore, StoreKey};

    #[test]
    fn local_store_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".rabbit").join("local.toml");

        let store = LocalStore::open(&path).unwrap();
        assert_eq!(store.get(StoreKey::ApiBase), None);
        store.set(StoreKey::ApiBase, "localhost:8000").unwrap();
        store.set(StoreKey::DevUserId, "7").unwrap();
        store.remove(StoreKey::DevUserId).unwrap();

        let reopened = LocalStore::open(&path).unwrap();
        assert_eq!(reopened.get(StoreKey::ApiBase).as_deref(), Some("localhost:8000"));
        assert_eq!(reopened.get(StoreKey::DevUserId), None);
    }

    #[test]
    fn local_store_preserves_comments_and_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.toml");
        std::fs::write(&path, "# kept\nfavourite_color = \"teal\"\n").unwrap();

        let store = LocalStore::open(&path).unwrap();
        store.set(StoreKey::SocialProvider, "github").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# kept"));
        assert!(content.contains("favourite_color = \"teal\""));
        assert!(content.contains("social_provider = \"github\""));
    }

    #[cfg(unix)]
    #[test]
    fn local_store_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.toml");
        let store = LocalStore::open(&path).unwrap();
        store.set(StoreKey::AdminAuthToken, "tok").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn corrupt_store_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.toml");
        std::fs::write(&path, "api_base = ").unwrap();
        let err = LocalStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse local store"));
    }

    #[test]
    fn non_empty_lookup_ignores_blank_values() {
        let store = MemoryStore::new()
            .with(StoreKey::DevApiKey, "   ")
            .with(StoreKey::DevUserId, " 3 ");
        assert_eq!(store.get_non_empty(StoreKey::DevApiKey), None);
        assert_eq!(store.get_non_empty(StoreKey::DevUserId).as_deref(), Some("3"));
    }

    #[test]
    fn secret_keys() {
        assert!(StoreKey::AdminAuthToken.is_secret());
        assert!(!StoreKey::ApiBase.is_secret());
        assert_eq!(StoreKey::ALL.len(), 7);
    }
}

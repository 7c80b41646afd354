//! Persisted key/value storage and the token store on top of it.
//!
//! [`Storage`] is shaped like browser local storage: string keys, string
//! values, three operations. [`TokenStore`] keeps exactly one key in it,
//! the JSON-serialized [`TokenPair`].

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use screener_protocol::{Codec, JsonCodec, TokenPair};

use crate::{SessionError, TOKEN_STORAGE_KEY};

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// String key/value storage that outlives the process (or not, for
/// [`MemoryStorage`]).
///
/// Methods take `&self`: implementations handle their own interior
/// mutability so a storage handle can be shared.
pub trait Storage: Send + Sync + 'static {
    /// Returns the value for `key`, or `None` if it was never set.
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Sets `key` to `value`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), SessionError>;
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// Storage backed by a single JSON file: `{ "key": "value", ... }`.
///
/// Every write rewrites the whole file through a sibling temp file and a
/// rename, so a crash mid-write leaves either the old or the new file,
/// never half of one. A file that exists but is not a JSON object of
/// strings reads as an error and is replaced wholesale on the next write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, SessionError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error("read", &e)),
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(|e| {
            SessionError::Storage(format!("{} is malformed: {e}", self.path.display()))
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error("create directory for", &e))?;
        }

        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| SessionError::Storage(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, bytes).map_err(|e| self.io_error("write", &e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error("replace", &e))
    }

    fn io_error(&self, action: &str, err: &io::Error) -> SessionError {
        SessionError::Storage(format!("failed to {action} {}: {err}", self.path.display()))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self.read_all().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "discarding unreadable storage file");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        match self.read_all() {
            Ok(mut entries) => {
                if entries.remove(key).is_none() {
                    return Ok(());
                }
                self.write_all(&entries)
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable storage file");
                self.write_all(&BTreeMap::new())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// In-process storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_entries<R>(
        &self,
        f: impl FnOnce(&mut HashMap<String, String>) -> R,
    ) -> Result<R, SessionError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| SessionError::Storage("memory storage lock poisoned".into()))?;
        Ok(f(&mut guard))
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.with_entries(|map| map.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.with_entries(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        self.with_entries(|map| {
            map.remove(key);
        })
    }
}

// ---------------------------------------------------------------------------
// TokenStore
// ---------------------------------------------------------------------------

/// Persists the current [`TokenPair`] under a single storage key.
///
/// The store has no lifecycle of its own. It mirrors whatever the
/// session last wrote and is read once at startup.
#[derive(Debug, Clone)]
pub struct TokenStore<S> {
    storage: S,
    key: String,
    codec: JsonCodec,
}

impl<S: Storage> TokenStore<S> {
    /// A store using the default `authTokens` key.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, TOKEN_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            codec: JsonCodec,
        }
    }

    /// Reads the persisted pair.
    ///
    /// Absent, unreadable, and malformed all come back as `None`; the
    /// reason is logged, never raised.
    pub fn load(&self) -> Option<TokenPair> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %self.key, "no persisted token pair");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "token storage unreadable");
                return None;
            }
        };

        match self.codec.decode::<TokenPair>(raw.as_bytes()) {
            Ok(pair) => Some(pair),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "persisted token pair is malformed");
                None
            }
        }
    }

    /// Serializes and persists `pair`, replacing whatever was stored.
    pub fn save(&self, pair: &TokenPair) -> Result<(), SessionError> {
        let bytes = self.codec.encode(pair)?;
        let text = String::from_utf8(bytes).map_err(|e| SessionError::Storage(e.to_string()))?;
        self.storage.set_item(&self.key, &text)
    }

    /// Removes the persisted pair.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.storage.remove_item(&self.key)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

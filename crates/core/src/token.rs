//! Session token storage
//!
//! A single bearer token shared by the request pipeline (read on every call,
//! cleared on 401) and the navigation guard (read on every transition).
//! Reads never block and never fail; writers are serialized per store.

use crate::{Error, Result};
use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// File name used by [`FileTokenStore`] inside its state directory
pub const SESSION_FILE: &str = "session.json";

/// Opaque bearer credential for an authenticated session
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// An empty token never counts as a session
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short prefix suitable for log lines
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(6).collect();
        format!("{prefix}...")
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&self.redacted()).finish()
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Process-wide accessor over the persisted session token
pub trait TokenStore: Send + Sync {
    /// Current token, if any
    fn read(&self) -> Option<SessionToken>;

    /// Replace any stored token
    fn write(&self, token: SessionToken) -> Result<()>;

    /// Remove the stored token. Clearing an empty store succeeds.
    fn clear(&self) -> Result<()>;

    /// Clear the store only while it still holds `expected`.
    ///
    /// Returns `true` when the stored value matched `expected` and the store
    /// is now empty, `false` when a different token has been written since.
    fn clear_if(&self, expected: Option<&SessionToken>) -> Result<bool> {
        if self.read().as_ref() != expected {
            return Ok(false);
        }
        if expected.is_some() {
            self.clear()?;
        }
        Ok(true)
    }

    fn is_authenticated(&self) -> bool {
        self.read().is_some_and(|token| !token.is_empty())
    }
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn read(&self) -> Option<SessionToken> {
        (**self).read()
    }

    fn write(&self, token: SessionToken) -> Result<()> {
        (**self).write(token)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn clear_if(&self, expected: Option<&SessionToken>) -> Result<bool> {
        (**self).clear_if(expected)
    }
}

/// Lock-free reads, serialized writes
#[derive(Default)]
struct TokenSlot {
    current: ArcSwapOption<SessionToken>,
    writer: Mutex<()>,
}

impl TokenSlot {
    fn new(initial: Option<SessionToken>) -> Self {
        Self {
            current: ArcSwapOption::new(initial.map(Arc::new)),
            writer: Mutex::new(()),
        }
    }

    fn load(&self) -> Option<SessionToken> {
        self.current
            .load_full()
            .filter(|token| !token.is_empty())
            .map(|token| (*token).clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|_| Error::TokenStore("token store lock poisoned".into()))
    }

    /// Persist first, then publish, so readers never see an unsaved token
    fn replace<F>(&self, next: Option<SessionToken>, persist: F) -> Result<()>
    where
        F: FnOnce(Option<&SessionToken>) -> Result<()>,
    {
        let _guard = self.lock()?;
        persist(next.as_ref())?;
        self.current.store(next.map(Arc::new));
        Ok(())
    }

    fn clear_if<F>(&self, expected: Option<&SessionToken>, persist: F) -> Result<bool>
    where
        F: FnOnce(Option<&SessionToken>) -> Result<()>,
    {
        let _guard = self.lock()?;
        if self.load().as_ref() != expected {
            return Ok(false);
        }
        if expected.is_some() {
            persist(None)?;
            self.current.store(None);
        }
        Ok(true)
    }
}

/// In-memory token store, lost when the process exits
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: TokenSlot,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<SessionToken>) -> Self {
        Self {
            slot: TokenSlot::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Option<SessionToken> {
        self.slot.load()
    }

    fn write(&self, token: SessionToken) -> Result<()> {
        self.slot.replace(Some(token), |_| Ok(()))
    }

    fn clear(&self) -> Result<()> {
        self.slot.replace(None, |_| Ok(()))
    }

    fn clear_if(&self, expected: Option<&SessionToken>) -> Result<bool> {
        self.slot.clear_if(expected, |_| Ok(()))
    }
}

/// Token store persisted as a JSON object under a well-known key.
///
/// The file is read once when the store is opened; afterwards reads are
/// served from memory and every write goes through to disk. Other keys in
/// the file are preserved.
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
    slot: TokenSlot,
}

impl FileTokenStore {
    /// Open (or lazily create) `dir/session.json`
    pub fn open(dir: impl AsRef<Path>, key: impl Into<String>) -> Result<Self> {
        let path = dir.as_ref().join(SESSION_FILE);
        let key = key.into();
        let initial = load_entries(&path)?.remove(&key).map(SessionToken::new);

        debug!(
            path = %path.display(),
            authenticated = initial.is_some(),
            "Opened session token store"
        );

        Ok(Self {
            path,
            key,
            slot: TokenSlot::new(initial),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn persist(&self, token: Option<&SessionToken>) -> Result<()> {
        let mut entries = load_entries(&self.path)?;
        match token {
            Some(token) => {
                entries.insert(self.key.clone(), token.as_str().to_string());
            }
            None => {
                entries.remove(&self.key);
            }
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn read(&self) -> Option<SessionToken> {
        self.slot.load()
    }

    fn write(&self, token: SessionToken) -> Result<()> {
        info!(token = %token.redacted(), "Storing session token");
        self.slot.replace(Some(token), |next| self.persist(next))
    }

    fn clear(&self) -> Result<()> {
        info!("Clearing session token");
        self.slot.replace(None, |next| self.persist(next))
    }

    fn clear_if(&self, expected: Option<&SessionToken>) -> Result<bool> {
        self.slot.clear_if(expected, |next| self.persist(next))
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{SessionToken, TokenStore};
    use crate::{Error, Result};
    use gloo::storage::{LocalStorage, Storage};

    /// Token kept in the browser's `localStorage`, surviving page reloads
    pub struct LocalStorageTokenStore {
        key: String,
    }

    impl LocalStorageTokenStore {
        pub fn new(key: impl Into<String>) -> Self {
            Self { key: key.into() }
        }
    }

    impl TokenStore for LocalStorageTokenStore {
        fn read(&self) -> Option<SessionToken> {
            LocalStorage::raw()
                .get_item(&self.key)
                .ok()
                .flatten()
                .filter(|value| !value.is_empty())
                .map(SessionToken::new)
        }

        fn write(&self, token: SessionToken) -> Result<()> {
            LocalStorage::raw()
                .set_item(&self.key, token.as_str())
                .map_err(|e| Error::TokenStore(format!("localStorage write failed: {e:?}")))
        }

        fn clear(&self) -> Result<()> {
            LocalStorage::raw()
                .remove_item(&self.key)
                .map_err(|e| Error::TokenStore(format!("localStorage remove failed: {e:?}")))
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::LocalStorageTokenStore;

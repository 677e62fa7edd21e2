//! Access-code login.
//!
//! Two people share the archive. Each has a four-digit code configured in
//! `[auth.users]`; entering it marks the session authenticated under that
//! person's display name. Session state sits in a [`KeyValueStore`] so the
//! CLI can keep it in a file and tests can keep it in memory.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{info, warn};

pub const AUTHENTICATED_KEY: &str = "authenticated";
pub const CURRENT_USER_KEY: &str = "current_user";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid access code")]
    InvalidCode,
    #[error("not logged in")]
    NotLoggedIn,
    #[error("session IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key-value persistence for session state.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AuthError>;
    fn remove(&self, key: &str) -> Result<(), AuthError>;
}

/// A JSON object in a single file. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, AuthError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, map: &BTreeMap<String, String>) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(map)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        self.save(&map)
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Login state over a credential table and a key-value store.
pub struct Session<K: KeyValueStore> {
    users: BTreeMap<String, String>,
    storage: K,
}

impl<K: KeyValueStore> Session<K> {
    /// `users` maps access code to display name.
    pub fn new(users: BTreeMap<String, String>, storage: K) -> Self {
        Self { users, storage }
    }

    /// The logged-in user, if the stored state says so.
    pub fn restore(&self) -> Result<Option<String>, AuthError> {
        let authenticated = self.storage.get(AUTHENTICATED_KEY)?;
        let user = self.storage.get(CURRENT_USER_KEY)?;
        Ok(match (authenticated.as_deref(), user) {
            (Some("true"), Some(user)) if !user.is_empty() => Some(user),
            _ => None,
        })
    }

    /// Like [`restore`](Self::restore) but an error when nobody is logged in.
    pub fn require_user(&self) -> Result<String, AuthError> {
        self.restore()?.ok_or(AuthError::NotLoggedIn)
    }

    /// Check a code and, on success, persist the session.
    pub fn login(&self, code: &str) -> Result<String, AuthError> {
        let Some(user) = self.users.get(code.trim()) else {
            warn!("login rejected");
            return Err(AuthError::InvalidCode);
        };
        self.storage.set(AUTHENTICATED_KEY, "true")?;
        self.storage.set(CURRENT_USER_KEY, user)?;
        info!(user = %user, "logged in");
        Ok(user.clone())
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.storage.remove(AUTHENTICATED_KEY)?;
        self.storage.remove(CURRENT_USER_KEY)?;
        info!("logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn users() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("1234".to_string(), "Илья".to_string()),
            ("0608".to_string(), "Аделя".to_string()),
        ])
    }

    #[test]
    fn fresh_session_is_logged_out() {
        let session = Session::new(users(), MemoryKeyValueStore::new());
        assert_eq!(session.restore().unwrap(), None);
        assert!(matches!(
            session.require_user().unwrap_err(),
            AuthError::NotLoggedIn
        ));
    }

    #[test]
    fn login_with_valid_code() {
        let session = Session::new(users(), MemoryKeyValueStore::new());
        assert_eq!(session.login("0608").unwrap(), "Аделя");
        assert_eq!(session.restore().unwrap().as_deref(), Some("Аделя"));
    }

    #[test]
    fn login_trims_input() {
        let session = Session::new(users(), MemoryKeyValueStore::new());
        assert_eq!(session.login(" 1234\n").unwrap(), "Илья");
    }

    #[test]
    fn login_rejects_unknown_code() {
        let session = Session::new(users(), MemoryKeyValueStore::new());
        assert!(matches!(
            session.login("0000").unwrap_err(),
            AuthError::InvalidCode
        ));
        assert_eq!(session.restore().unwrap(), None);
    }

    #[test]
    fn logout_clears_both_keys() {
        let storage = MemoryKeyValueStore::new();
        let session = Session::new(users(), storage);
        session.login("1234").unwrap();
        session.logout().unwrap();
        assert_eq!(session.restore().unwrap(), None);
        assert_eq!(session.storage.get(AUTHENTICATED_KEY).unwrap(), None);
        assert_eq!(session.storage.get(CURRENT_USER_KEY).unwrap(), None);
    }

    #[test]
    fn restore_needs_flag_and_user() {
        let storage = MemoryKeyValueStore::new();
        storage.set(CURRENT_USER_KEY, "Илья").unwrap();
        let session = Session::new(users(), storage);
        assert_eq!(session.restore().unwrap(), None);

        session.storage.set(AUTHENTICATED_KEY, "true").unwrap();
        assert_eq!(session.restore().unwrap().as_deref(), Some("Илья"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state/session.json");

        Session::new(users(), FileKeyValueStore::new(&path))
            .login("1234")
            .unwrap();

        let reopened = Session::new(users(), FileKeyValueStore::new(&path));
        assert_eq!(reopened.restore().unwrap().as_deref(), Some("Илья"));
    }

    #[test]
    fn file_store_remove_missing_is_ok() {
        let tmp = TempDir::new().unwrap();
        let kv = FileKeyValueStore::new(tmp.path().join("session.json"));
        kv.remove("nothing").unwrap();
        assert_eq!(kv.get("nothing").unwrap(), None);
    }
}

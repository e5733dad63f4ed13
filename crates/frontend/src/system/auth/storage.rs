//! Persisted session: access token, refresh token and cached profile.
//!
//! The three keys are written and cleared together. Storage is reached
//! through [`KeyValueStorage`] so tests can run against memory.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use contracts::system::auth::TokenPair;
use contracts::system::users::UserInfo;
use thiserror::Error;
use web_sys::window;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_PROFILE_KEY: &str = "userProfile";

const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_PROFILE_KEY];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage is not available")]
    Unavailable,

    #[error("Failed to write '{0}'")]
    Write(String),

    #[error("Failed to serialize profile: {0}")]
    Serialize(String),
}

/// Minimal key-value storage
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str);
}

/// Browser `localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

fn get_local_storage() -> Option<web_sys::Storage> {
    window()?.local_storage().ok()?
}

impl KeyValueStorage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        get_local_storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = get_local_storage().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|_| StorageError::Write(key.to_string()))
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = get_local_storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// In-memory storage, used when `localStorage` is missing and in tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// Typed access to the persisted session
#[derive(Clone)]
pub struct SessionStore {
    backend: Rc<dyn KeyValueStorage>,
}

impl SessionStore {
    pub fn new(backend: Rc<dyn KeyValueStorage>) -> Self {
        Self { backend }
    }

    /// `localStorage` when the browser exposes it, memory otherwise
    pub fn browser() -> Self {
        if get_local_storage().is_some() {
            Self::new(Rc::new(LocalStorage))
        } else {
            log::warn!("localStorage unavailable, session will not survive reloads");
            Self::new(Rc::new(MemoryStorage::new()))
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.backend.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.backend.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Cached profile; a corrupt entry reads as absent
    pub fn user(&self) -> Option<UserInfo> {
        let raw = self.backend.get(USER_PROFILE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("Discarding unreadable user profile: {}", e);
                None
            }
        }
    }

    /// Profile of the logged-in user; requires both profile and access token
    pub fn current_user(&self) -> Option<UserInfo> {
        self.access_token()?;
        self.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Persist tokens and profile as one unit
    pub fn save_session(&self, tokens: &TokenPair, user: &UserInfo) -> Result<(), StorageError> {
        let profile =
            serde_json::to_string(user).map_err(|e| StorageError::Serialize(e.to_string()))?;
        let writes = [
            (ACCESS_TOKEN_KEY, tokens.access_token.as_str()),
            (REFRESH_TOKEN_KEY, tokens.refresh_token.as_str()),
            (USER_PROFILE_KEY, profile.as_str()),
        ];
        for (key, value) in writes {
            if let Err(e) = self.backend.set(key, value) {
                self.clear();
                return Err(e);
            }
        }
        Ok(())
    }

    /// Swap in a refreshed token pair, keeping the previous pair on failure
    pub fn replace_tokens(&self, tokens: &TokenPair) -> Result<(), StorageError> {
        let previous_access = self.backend.get(ACCESS_TOKEN_KEY);
        self.backend.set(ACCESS_TOKEN_KEY, &tokens.access_token)?;
        if let Err(e) = self.backend.set(REFRESH_TOKEN_KEY, &tokens.refresh_token) {
            match previous_access {
                Some(token) => {
                    let _ = self.backend.set(ACCESS_TOKEN_KEY, &token);
                }
                None => self.backend.remove(ACCESS_TOKEN_KEY),
            }
            return Err(e);
        }
        Ok(())
    }

    /// Remove all session keys
    pub fn clear(&self) {
        for key in SESSION_KEYS {
            self.backend.remove(key);
        }
    }
}

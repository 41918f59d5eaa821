//! Key/value persistence over browser LocalStorage
//!
//! Features:
//! - `Storage` trait with a LocalStorage backend (wasm) and an in-memory one
//! - Tolerant reads: malformed, negative or non-finite values become defaults
//! - Typed write errors so callers can shrink and retry on quota failures
//! - Debounced wallet writes (see [`wallet`])

pub mod wallet;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use wallet::Wallet;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage quota exceeded")]
    QuotaExceeded,
    #[error("storage write failed: {0}")]
    Write(String),
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StorageError {
    /// Whether shrinking the payload might make a retry succeed
    pub fn is_quota(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded)
    }
}

/// String key/value store
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared handle used by every persisted component
pub type SharedStorage = Rc<dyn Storage>;

/// In-memory storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
    /// Total byte budget for keys plus values
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects writes once `bytes` would be exceeded
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    fn used_without(&self, key: &str) -> usize {
        self.items
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if self.used_without(key) + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn handle() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }

    /// Whether the browser exposes LocalStorage at all
    pub fn available() -> bool {
        Self::handle().is_some()
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::handle()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        use wasm_bindgen::JsCast;

        let storage = Self::handle().ok_or(StorageError::Unavailable)?;
        storage.set_item(key, value).map_err(|err| {
            match err.dyn_ref::<web_sys::DomException>() {
                Some(ex) if ex.name() == "QuotaExceededError" => StorageError::QuotaExceeded,
                Some(ex) => StorageError::Write(ex.message()),
                None => StorageError::Write(format!("{:?}", err)),
            }
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let storage = Self::handle().ok_or(StorageError::Unavailable)?;
        storage
            .remove_item(key)
            .map_err(|err| StorageError::Write(format!("{:?}", err)))
    }
}

/// Open the platform storage, falling back to memory when unavailable
#[cfg(target_arch = "wasm32")]
pub fn open() -> SharedStorage {
    if LocalStorage::available() {
        Rc::new(LocalStorage)
    } else {
        log::warn!("LocalStorage unavailable, progress will not be saved");
        Rc::new(MemoryStorage::new())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn open() -> SharedStorage {
    Rc::new(MemoryStorage::new())
}

/// Parse a persisted counter. Anything malformed, negative or non-finite is 0.
pub fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.floor().min(u64::MAX as f64) as u64)
        .unwrap_or(0)
}

/// Parse a persisted non-negative float (seconds, volumes)
pub fn parse_amount(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

/// Parse a persisted flag ("true"/"on"/"1")
pub fn parse_flag(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some("true" | "on" | "1"))
}

pub fn load_count(storage: &dyn Storage, key: &str) -> u64 {
    parse_count(storage.get(key).as_deref())
}

/// Load a JSON value, falling back to `Default` when absent or malformed
pub fn load_json<T: DeserializeOwned + Default>(storage: &dyn Storage, key: &str) -> T {
    let Some(json) = storage.get(key) else {
        return T::default();
    };
    match serde_json::from_str(&json) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Ignoring malformed value for '{}': {}", key, e);
            T::default()
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    storage: &dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    storage.set(key, &json)
}

mod config;
pub mod database;
pub mod memory;
pub mod reminder_store;

pub use config::{Config, NotificationsConfig, RecurrenceConfig, StorageConfig, SweeperConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use reminder_store::ReminderStore;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::StorageError;

/// Read/write contract of the persistent key-value store.
///
/// Values are opaque strings; callers own the encoding.
pub trait KeyValueStore: Send {
    /// Read `key`. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite `key` with `value`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + Sync + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Returns `~/.config/billminder[-dev]/` based on BILLMINDER_ENV.
///
/// Set BILLMINDER_ENV=dev to use the development data directory, or
/// BILLMINDER_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("BILLMINDER_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("BILLMINDER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("billminder-dev")
            } else {
                base_dir.join("billminder")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

mod error;
mod models;
mod settings_store;
mod vault;

pub use error::{Result, StorageError};
pub use models::*;
pub use settings_store::{
    JsonSettingsStore, MemorySettingsStore, SettingsStore, SETTINGS_FILE, STATE_DIR,
};
pub use vault::{EntryKind, FileVault, Vault};

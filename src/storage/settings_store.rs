use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use super::error::{Result, StorageError};
use super::models::Settings;

/// File name of the settings document inside a vault's state directory
pub const SETTINGS_FILE: &str = "settings.json";
/// Per-vault state directory
pub const STATE_DIR: &str = ".avocado";

/// Persistence boundary for [`Settings`]
pub trait SettingsStore: Send + Sync {
    /// Load the persisted document merged over the defaults
    fn load(&self) -> Result<Settings>;

    /// Persist the full settings document. Readers never observe a partial write.
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Settings stored as a pretty-printed JSON file
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default location inside a vault
    pub fn for_vault(vault_root: &Path) -> Self {
        Self::new(vault_root.join(STATE_DIR).join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Settings> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("Settings: no file at {}, using defaults", self.path.display());
                return Ok(Settings::default());
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        let value = match serde_json::from_str::<Value>(&content) {
            Ok(value) => value,
            Err(e) => {
                log::warn!(
                    "Settings: {} is not valid JSON ({}), using defaults",
                    self.path.display(),
                    e
                );
                Value::Null
            }
        };

        Ok(Settings::from_persisted(value))
    }

    /// Atomic write (write to .tmp then rename)
    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// In-memory store holding the raw persisted document. Useful for embedding
/// hosts that keep their own key-value storage, and for tests.
#[derive(Default)]
pub struct MemorySettingsStore {
    document: Mutex<Option<Value>>,
    saves: AtomicUsize,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already persisted (possibly partial) document
    pub fn with_document(document: Value) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            saves: AtomicUsize::new(0),
        }
    }

    /// The currently persisted document, if anything was ever stored
    pub fn document(&self) -> Option<Value> {
        self.document
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of successful `save` calls
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings> {
        Ok(self
            .document()
            .map(Settings::from_persisted)
            .unwrap_or_default())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let value = serde_json::to_value(settings)?;
        *self.document.lock().unwrap_or_else(|e| e.into_inner()) = Some(value);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::{CollectionId, MappingEntry};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (JsonSettingsStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSettingsStore::for_vault(temp_dir.path());
        (store, temp_dir)
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let (store, _temp) = create_test_store();
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let (store, _temp) = create_test_store();

        let mut settings = Settings::default();
        settings.token = "abc".to_string();
        settings.last_sync_time = 1_700_000_000_000;
        settings
            .mapping
            .insert("Avocado/My Book.md".to_string(), MappingEntry::new(CollectionId::Number(42)));
        store.save(&settings).unwrap();

        assert!(store.path().exists());
        assert!(!store.path().with_extension("json.tmp").exists());
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_partial_file_is_merged() {
        let (store, _temp) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"rootFolder": "Books", "mapping": 7}"#).unwrap();

        let settings = store.load().unwrap();
        assert_eq!(settings.root_folder, "Books");
        assert_eq!(settings.token, "default");
        assert!(settings.mapping.is_empty());
    }

    #[test]
    fn test_garbage_file_loads_defaults() {
        let (store, _temp) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ nope").unwrap();

        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySettingsStore::with_document(json!({ "syncInterval": 5 }));
        let mut settings = store.load().unwrap();
        assert_eq!(settings.sync_interval_minutes, 5);

        settings.token = "t".to_string();
        store.save(&settings).unwrap();
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.document().unwrap()["avocadoToken"], json!("t"));
    }
}

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_TOKEN: &str = "default";
pub const DEFAULT_ROOT_FOLDER: &str = "Avocado";
pub const DEFAULT_SYNC_INTERVAL_MINUTES: u64 = 60;

/// Remote identifier of a collection (book). The service sends either a
/// JSON number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CollectionId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for CollectionId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Sync progress for one local document.
///
/// Persisted as a two-element array `[collectionId, cursor]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(CollectionId, u64)", into = "(CollectionId, u64)")]
pub struct MappingEntry {
    pub collection_id: CollectionId,
    /// 1-based index of the next unfetched highlight batch
    pub cursor: u64,
}

impl MappingEntry {
    /// Entry for a freshly materialized document; cursors start at 1.
    pub fn new(collection_id: CollectionId) -> Self {
        Self {
            collection_id,
            cursor: 1,
        }
    }
}

impl From<(CollectionId, u64)> for MappingEntry {
    fn from((collection_id, cursor): (CollectionId, u64)) -> Self {
        Self {
            collection_id,
            cursor,
        }
    }
}

impl From<MappingEntry> for (CollectionId, u64) {
    fn from(entry: MappingEntry) -> Self {
        (entry.collection_id, entry.cursor)
    }
}

/// Local document path (vault-relative, `/`-separated) to sync progress.
pub type Mapping = BTreeMap<String, MappingEntry>;

/// User-configurable sync state, persisted as a single JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Bearer token for the remote service
    #[serde(rename = "avocadoToken")]
    pub token: String,
    /// Vault folder that receives one document per collection
    pub root_folder: String,
    /// Milliseconds since the Unix epoch of the last completed pass
    pub last_sync_time: i64,
    /// Minimum number of minutes between two passes
    #[serde(rename = "syncInterval")]
    pub sync_interval_minutes: u64,
    pub mapping: Mapping,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN.to_string(),
            root_folder: DEFAULT_ROOT_FOLDER.to_string(),
            last_sync_time: 0,
            sync_interval_minutes: DEFAULT_SYNC_INTERVAL_MINUTES,
            mapping: Mapping::new(),
        }
    }
}

impl Settings {
    /// Merge a persisted document over the defaults.
    ///
    /// Top-level keys present in `value` override the default; keys that are
    /// missing or fail to parse keep their default. Anything other than a
    /// JSON object yields plain defaults.
    pub fn from_persisted(value: Value) -> Self {
        let defaults = Self::default();
        let Value::Object(obj) = value else {
            return defaults;
        };

        Self {
            token: field(&obj, "avocadoToken").unwrap_or(defaults.token),
            root_folder: field(&obj, "rootFolder").unwrap_or(defaults.root_folder),
            last_sync_time: field(&obj, "lastSyncTime").unwrap_or(defaults.last_sync_time),
            sync_interval_minutes: field(&obj, "syncInterval")
                .unwrap_or(defaults.sync_interval_minutes),
            mapping: field(&obj, "mapping").unwrap_or(defaults.mapping),
        }
    }

    /// Change the target folder. Existing mapping entries point into the old
    /// folder, so the whole mapping is dropped.
    pub fn set_root_folder(&mut self, folder: impl Into<String>) {
        self.root_folder = folder.into();
        self.mapping.clear();
    }

    /// Minutes elapsed since the last completed pass
    pub fn minutes_since_last_sync(&self, now: DateTime<Utc>) -> f64 {
        (now.timestamp_millis() - self.last_sync_time) as f64 / 60_000.0
    }

    /// Whether enough time has passed for a new pass to run
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.minutes_since_last_sync(now) > self.sync_interval_minutes as f64
    }

    pub fn last_sync_at(&self) -> Option<DateTime<Utc>> {
        if self.last_sync_time == 0 {
            return None;
        }
        DateTime::from_timestamp_millis(self.last_sync_time)
    }

    /// Folder path without trailing separators
    pub fn root_folder_path(&self) -> &str {
        self.root_folder.trim_end_matches('/')
    }
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    let value = obj.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("Settings: ignoring unreadable '{}' ({}), using default", key, e);
            None
        }
    }
}

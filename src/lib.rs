//! One-way sync of Readavocado book highlights into a Markdown vault.
//!
//! The remote service lists books ("collections"); each gets one document
//! under the configured root folder, and every pass appends the highlights
//! added since the stored cursor.

pub mod storage;
pub mod sync;

pub use storage::{
    CollectionId, EntryKind, FileVault, JsonSettingsStore, Mapping, MappingEntry,
    MemorySettingsStore, Settings, SettingsStore, StorageError, Vault,
};
pub use sync::{
    start_sync_scheduler, AvocadoClient, CatalogSource, LogNotifier, Notice, Notifier,
    SyncError, SyncManager, SyncOutcome, SyncReport, SyncScheduler, DEFAULT_API_URL,
};

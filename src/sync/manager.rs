use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;

use super::config::{SyncOutcome, SyncReport};
use super::mapper;
use super::notice::{Notice, Notifier};
use super::remote::{CatalogSource, RemoteCollection, RemoteError};
use crate::storage::{
    CollectionId, EntryKind, MappingEntry, Settings, SettingsStore, StorageError, Vault,
};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Owner of the sync state and driver of sync passes.
///
/// A pass walks `TimeGate -> EnsureFolder -> Discover -> Materialize ->
/// Increment -> Persist`. The settings sit behind an async mutex: a pass that
/// finds it taken returns [`SyncOutcome::AlreadyRunning`], settings edits wait
/// for it. The settings document is saved after every mapping change, so a
/// failing pass keeps the progress made before the failure. `lastSyncTime`
/// only moves when a pass completes.
pub struct SyncManager {
    catalog: Arc<dyn CatalogSource>,
    store: Arc<dyn SettingsStore>,
    vault: Arc<dyn Vault>,
    notifier: Arc<dyn Notifier>,
    settings: Mutex<Settings>,
}

impl SyncManager {
    /// Create a manager, loading the settings from `store`
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        store: Arc<dyn SettingsStore>,
        vault: Arc<dyn Vault>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, SyncError> {
        let settings = store.load()?;
        Ok(Self {
            catalog,
            store,
            vault,
            notifier,
            settings: Mutex::new(settings),
        })
    }

    /// Snapshot of the current settings
    pub async fn settings(&self) -> Settings {
        self.settings.lock().await.clone()
    }

    pub async fn set_token(&self, token: String) -> Result<(), SyncError> {
        self.update_settings(|settings| settings.token = token).await
    }

    /// Point the sync at another folder. Clears the whole mapping.
    pub async fn set_root_folder(&self, folder: String) -> Result<(), SyncError> {
        self.update_settings(|settings| settings.set_root_folder(folder))
            .await
    }

    pub async fn set_sync_interval(&self, minutes: u64) -> Result<(), SyncError> {
        self.update_settings(|settings| settings.sync_interval_minutes = minutes)
            .await
    }

    async fn update_settings<F>(&self, edit: F) -> Result<(), SyncError>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.lock().await;
        let mut updated = settings.clone();
        edit(&mut updated);
        self.store.save(&updated)?;
        *settings = updated;
        Ok(())
    }

    /// Run one pass now
    pub async fn run_pass(&self) -> Result<SyncOutcome, SyncError> {
        self.run_pass_at(Utc::now()).await
    }

    /// Run one pass as if the current time were `now`
    pub async fn run_pass_at(&self, now: DateTime<Utc>) -> Result<SyncOutcome, SyncError> {
        let Ok(mut settings) = self.settings.try_lock() else {
            log::info!("Sync: another pass is in progress, skipping");
            return Ok(SyncOutcome::AlreadyRunning);
        };

        // Pick up edits made by other processes sharing the store
        *settings = self.store.load()?;

        let elapsed_minutes = settings.minutes_since_last_sync(now);
        if !settings.is_due(now) {
            log::debug!(
                "Sync: not initiated, {:.1} minutes since last sync (interval {} minutes)",
                elapsed_minutes,
                settings.sync_interval_minutes
            );
            return Ok(SyncOutcome::RateGated { elapsed_minutes });
        }

        log::info!(
            "Sync: starting pass, {:.1} minutes since last sync",
            elapsed_minutes
        );
        let started = Instant::now();

        match self.run_stages(&mut settings, now).await {
            Ok(mut report) => {
                report.duration_ms = started.elapsed().as_millis() as u64;
                log::info!(
                    "Sync: pass complete - collections={}, created={}, appended={}, advanced={}, orphans={}, collisions={}",
                    report.collections_seen,
                    report.documents_created,
                    report.increments_appended,
                    report.cursors_advanced,
                    report.orphaned_documents.len(),
                    report.title_collisions.len(),
                );
                Ok(SyncOutcome::Completed(report))
            }
            Err(e) => {
                log::error!("Sync: pass aborted: {}", e);
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        settings: &mut Settings,
        now: DateTime<Utc>,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();

        self.ensure_root_folder(settings)?;
        let collections = self.discover(settings).await?;
        report.collections_seen = collections.len();

        self.materialize(settings, &collections, &mut report)?;
        self.increment(settings, &mut report).await?;

        settings.last_sync_time = now.timestamp_millis();
        self.store.save(settings)?;
        Ok(report)
    }

    fn ensure_root_folder(&self, settings: &Settings) -> Result<(), SyncError> {
        let root = settings.root_folder_path();
        if self.vault.entry_kind(root)? != Some(EntryKind::Folder) {
            log::info!("Sync: creating folder '{}'", root);
            self.vault.create_folder(root)?;
        }
        Ok(())
    }

    async fn discover(&self, settings: &Settings) -> Result<Vec<RemoteCollection>, SyncError> {
        match self.catalog.list_collections(&settings.token).await {
            Ok(collections) => {
                self.notifier.notify(Notice::SyncStarted);
                log::info!("Sync: catalog lists {} collection(s)", collections.len());
                Ok(collections)
            }
            Err(RemoteError::InvalidToken) => {
                self.notifier.notify(Notice::InvalidToken);
                Err(RemoteError::InvalidToken.into())
            }
            Err(e) => {
                self.notifier.notify(Notice::SyncFailed(e.to_string()));
                Err(e.into())
            }
        }
    }

    fn materialize(
        &self,
        settings: &mut Settings,
        collections: &[RemoteCollection],
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let root = settings.root_folder_path().to_string();
        let mut claimed: HashMap<String, CollectionId> = HashMap::new();

        for collection in collections {
            let path = mapper::document_path(&root, &collection.title);
            let owner = claimed
                .get(&path)
                .cloned()
                .or_else(|| settings.mapping.get(&path).map(|e| e.collection_id.clone()));
            if let Some(owner) = owner {
                if owner != collection.id && !report.title_collisions.contains(&path) {
                    log::warn!(
                        "Sync: '{}' (collection {}) maps onto {}, already used by collection {}",
                        collection.title,
                        collection.id,
                        path,
                        owner
                    );
                    report.title_collisions.push(path.clone());
                }
            }
            claimed.entry(path).or_insert_with(|| collection.id.clone());

            let ensured = mapper::ensure_document(
                self.vault.as_ref(),
                &root,
                collection,
                &mut settings.mapping,
            )?;

            if ensured.created {
                log::info!(
                    "Sync: created {} for collection {}",
                    ensured.path,
                    collection.id
                );
                report.documents_created += 1;
                self.store.save(settings)?;
            } else if !settings.mapping.contains_key(&ensured.path)
                && !report.orphaned_documents.contains(&ensured.path)
            {
                log::warn!(
                    "Sync: {} exists but is not tracked, collection {} will not be synced into it",
                    ensured.path,
                    collection.id
                );
                report.orphaned_documents.push(ensured.path);
            }
        }

        Ok(())
    }

    async fn increment(
        &self,
        settings: &mut Settings,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let entries: Vec<(String, MappingEntry)> = settings
            .mapping
            .iter()
            .map(|(path, entry)| (path.clone(), entry.clone()))
            .collect();

        for (path, entry) in entries {
            let increment = self
                .catalog
                .fetch_increment(&settings.token, &entry.collection_id, entry.cursor)
                .await?;

            if !increment.content.is_empty() {
                if self.vault.entry_kind(&path)? == Some(EntryKind::Document) {
                    self.vault.append(&path, &increment.content)?;
                    report.increments_appended += 1;
                    log::debug!(
                        "Sync: appended {} bytes to {}",
                        increment.content.len(),
                        path
                    );
                } else {
                    log::warn!("Sync: {} is not a document, highlights not written", path);
                }
            }

            if let Some(next) = increment.advance_to() {
                if next != entry.cursor {
                    log::debug!("Sync: {} cursor {} -> {}", path, entry.cursor, next);
                    report.cursors_advanced += 1;
                }
                settings.mapping.insert(
                    path,
                    MappingEntry {
                        collection_id: entry.collection_id,
                        cursor: next,
                    },
                );
                self.store.save(settings)?;
            }
        }

        Ok(())
    }
}

use serde::Serialize;

/// Counters describing a completed pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Collections listed by the catalog
    pub collections_seen: usize,
    /// Documents created for newly discovered collections
    pub documents_created: usize,
    /// Documents that exist but have no mapping entry, so never receive highlights
    pub orphaned_documents: Vec<String>,
    /// Document paths claimed by more than one collection
    pub title_collisions: Vec<String>,
    /// Documents that received new highlight content
    pub increments_appended: usize,
    /// Mapping entries whose cursor moved
    pub cursors_advanced: usize,
    /// Duration of the pass in milliseconds
    pub duration_ms: u64,
}

/// Result of asking for a pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SyncOutcome {
    /// The pass ran to completion and `lastSyncTime` was updated
    Completed(SyncReport),
    /// The sync interval has not elapsed yet; nothing was touched
    #[serde(rename_all = "camelCase")]
    RateGated { elapsed_minutes: f64 },
    /// Another pass holds the settings; nothing was touched
    AlreadyRunning,
}

pub mod config;
pub mod mapper;
pub mod notice;
pub mod remote;
pub mod scheduler;

mod manager;

pub use config::{SyncOutcome, SyncReport};
pub use manager::{SyncError, SyncManager};
pub use notice::{LogNotifier, Notice, Notifier};
pub use remote::{
    AvocadoClient, CatalogSource, RemoteCollection, RemoteError, RemoteIncrement,
    DEFAULT_API_URL,
};
pub use scheduler::{start_sync_scheduler, SyncScheduler, SyncSchedulerMessage};

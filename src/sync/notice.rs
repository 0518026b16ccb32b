use std::fmt;

/// Transient user-facing message emitted during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The catalog answered; highlights are being pulled
    SyncStarted,
    /// The catalog rejected the token (HTTP 405)
    InvalidToken,
    /// The catalog could not be reached or answered with an error
    SyncFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SyncStarted => f.write_str("Avocado: Fetching new highlights"),
            Self::InvalidToken => f.write_str("Avocado: Invalid token"),
            Self::SyncFailed(reason) => write!(f, "Avocado: Sync failed ({})", reason),
        }
    }
}

/// Sink for [`Notice`]s; the host decides how they are shown
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that only writes to the log
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::SyncStarted => log::info!("{}", notice),
            _ => log::warn!("{}", notice),
        }
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use avocado_lib::storage::{FileVault, JsonSettingsStore};
use avocado_lib::sync::{AvocadoClient, Notice, Notifier, SyncManager, DEFAULT_API_URL};

use crate::config::CliConfig;
use crate::render::terminal::Color;

/// Values given on the command line; they win over the config file
pub struct Overrides {
    pub vault: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub api_url: Option<String>,
    pub config: Option<PathBuf>,
}

/// Shared application state for CLI commands
pub struct App {
    pub config: CliConfig,
    pub vault_path: PathBuf,
    pub settings_path: PathBuf,
    pub api_url: String,
    pub manager: Arc<SyncManager>,
}

impl App {
    pub fn new(overrides: Overrides, use_color: bool) -> Result<Self> {
        let config = match overrides.config.or_else(CliConfig::default_path) {
            Some(path) => CliConfig::load(&path)?,
            None => CliConfig::default(),
        };

        let vault_path = match overrides.vault.or_else(|| config.vault_path.clone()) {
            Some(path) => path,
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        let store = match overrides.settings.or_else(|| config.settings_path.clone()) {
            Some(path) => JsonSettingsStore::new(path),
            None => JsonSettingsStore::for_vault(&vault_path),
        };
        let settings_path = store.path().to_path_buf();
        let api_url = overrides
            .api_url
            .or_else(|| config.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let client = AvocadoClient::new(&api_url)
            .with_context(|| format!("Invalid API URL '{}'", api_url))?;
        let manager = SyncManager::new(
            Arc::new(client),
            Arc::new(store),
            Arc::new(FileVault::new(vault_path.clone())),
            Arc::new(ConsoleNotifier { use_color }),
        )
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;

        Ok(Self {
            config,
            vault_path,
            settings_path,
            api_url,
            manager: Arc::new(manager),
        })
    }
}

/// Prints notices to stderr
struct ConsoleNotifier {
    use_color: bool,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        log::debug!("Notice: {:?}", notice);
        let color = match notice {
            Notice::SyncStarted => Color::GREEN,
            Notice::InvalidToken | Notice::SyncFailed(_) => Color::YELLOW,
        };
        if self.use_color {
            eprintln!("{}{}{}", color, notice, Color::RESET);
        } else {
            eprintln!("{}", notice);
        }
    }
}

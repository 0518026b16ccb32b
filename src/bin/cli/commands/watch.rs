use std::time::Duration;

use anyhow::{Context, Result};

use avocado_lib::sync::start_sync_scheduler;

use crate::app::App;

pub async fn run(app: &App, every: Option<u64>) -> Result<()> {
    let minutes = every
        .map(|m| m.max(1))
        .unwrap_or_else(|| app.config.watch_every_minutes());

    println!(
        "Watching {} (checking every {} minute(s), Ctrl-C to stop)",
        app.vault_path.display(),
        minutes
    );

    let scheduler = start_sync_scheduler(app.manager.clone(), Duration::from_secs(minutes * 60));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    scheduler.shutdown();
    scheduler.join().await;
    Ok(())
}

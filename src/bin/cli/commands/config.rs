use anyhow::{Context, Result};

use crate::app::App;

pub async fn run_token(app: &App, token: String) -> Result<()> {
    app.manager
        .set_token(token)
        .await
        .context("Failed to save token")?;
    println!("Token saved to {}", app.settings_path.display());
    Ok(())
}

pub async fn run_folder(app: &App, folder: String) -> Result<()> {
    let forgotten = app.manager.settings().await.mapping.len();
    app.manager
        .set_root_folder(folder.clone())
        .await
        .context("Failed to save root folder")?;
    println!(
        "Root folder set to '{}'; {} tracked document(s) forgotten",
        folder, forgotten
    );
    Ok(())
}

pub async fn run_interval(app: &App, minutes: u64) -> Result<()> {
    app.manager
        .set_sync_interval(minutes)
        .await
        .context("Failed to save sync interval")?;
    println!("Sync interval set to {} minute(s)", minutes);
    Ok(())
}

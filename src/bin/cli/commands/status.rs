use anyhow::Result;
use chrono::Utc;

use crate::app::App;
use crate::render::terminal::{format_minutes, mask_secret, paint, Color};
use crate::OutputFormat;

pub async fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let settings = app.manager.settings().await;
    let now = Utc::now();
    let elapsed = settings.minutes_since_last_sync(now);
    let due = settings.is_due(now);

    match format {
        OutputFormat::Json => {
            let documents: Vec<_> = settings
                .mapping
                .iter()
                .map(|(path, entry)| {
                    serde_json::json!({
                        "path": path,
                        "collectionId": entry.collection_id,
                        "cursor": entry.cursor,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "vault": app.vault_path.to_string_lossy(),
                "settingsPath": app.settings_path.to_string_lossy(),
                "apiUrl": app.api_url,
                "token": mask_secret(&settings.token),
                "rootFolder": settings.root_folder,
                "syncInterval": settings.sync_interval_minutes,
                "lastSync": settings.last_sync_at().map(|t| t.to_rfc3339()),
                "due": due,
                "documents": documents,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Vault:         {}", app.vault_path.display());
            println!("Settings:      {}", app.settings_path.display());
            println!("API:           {}", app.api_url);
            println!("Token:         {}", mask_secret(&settings.token));
            println!("Root folder:   {}", settings.root_folder);
            println!("Sync interval: {} minutes", settings.sync_interval_minutes);
            match settings.last_sync_at() {
                Some(at) => println!(
                    "Last sync:     {} ({} ago)",
                    at.format("%Y-%m-%d %H:%M"),
                    format_minutes(elapsed)
                ),
                None => println!("Last sync:     never"),
            }
            if due {
                println!("Next pass:     {}", paint("due now", Color::GREEN, use_color));
            } else {
                let remaining = settings.sync_interval_minutes as f64 - elapsed;
                println!("Next pass:     in {}", format_minutes(remaining));
            }

            println!();
            println!(
                "{}",
                paint(
                    &format!("Tracked documents ({})", settings.mapping.len()),
                    Color::BOLD,
                    use_color
                )
            );
            if settings.mapping.is_empty() {
                println!("  (none)");
            }
            for (path, entry) in &settings.mapping {
                println!(
                    "  {} {}",
                    path,
                    paint(
                        &format!("[book {}, next batch {}]", entry.collection_id, entry.cursor),
                        Color::DIM,
                        use_color
                    )
                );
            }
        }
    }

    Ok(())
}

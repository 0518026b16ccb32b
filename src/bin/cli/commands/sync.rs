use anyhow::{Context, Result};

use avocado_lib::sync::{SyncOutcome, SyncReport};

use crate::app::App;
use crate::render::terminal::{format_minutes, paint, Color};
use crate::OutputFormat;

pub async fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let outcome = app.manager.run_pass().await.context("Sync failed")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Plain => match outcome {
            SyncOutcome::Completed(report) => print_report(&report, use_color),
            SyncOutcome::RateGated { elapsed_minutes } => {
                let settings = app.manager.settings().await;
                println!(
                    "Sync not initiated: last sync {} ago, interval is {} minutes",
                    format_minutes(elapsed_minutes),
                    settings.sync_interval_minutes
                );
            }
            SyncOutcome::AlreadyRunning => {
                println!("Sync not initiated: another pass is in progress");
            }
        },
    }

    Ok(())
}

fn print_report(report: &SyncReport, use_color: bool) {
    println!(
        "{} {} collection(s), {} new document(s), {} document(s) updated ({} ms)",
        paint("Synced", Color::GREEN, use_color),
        report.collections_seen,
        report.documents_created,
        report.increments_appended,
        report.duration_ms
    );
    for path in &report.orphaned_documents {
        println!(
            "  {} {} exists but is not tracked; move it away to let it sync",
            paint("warning:", Color::YELLOW, use_color),
            path
        );
    }
    for path in &report.title_collisions {
        println!(
            "  {} several books map onto {}",
            paint("warning:", Color::YELLOW, use_color),
            path
        );
    }
}

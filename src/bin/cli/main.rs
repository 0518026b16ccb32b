mod app;
mod commands;
mod config;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "avocado-cli", about = "Sync Readavocado highlights into a Markdown vault", version)]
struct Cli {
    /// Vault directory (default: config file, then current directory)
    #[arg(long, global = true)]
    vault: Option<PathBuf>,

    /// Settings document (default: <vault>/.avocado/settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Base URL of the highlight service
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// CLI configuration file (default: <config dir>/avocado/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run one sync pass now (skipped if the sync interval has not elapsed)
    Sync,

    /// Sync on startup and then periodically until interrupted
    Watch {
        /// Minutes between checks
        #[arg(long)]
        every: Option<u64>,
    },

    /// Show settings and tracked documents
    Status,

    /// Edit sync settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Set the Readavocado token (from https://readavocado.com/user)
    Token {
        token: String,
    },

    /// Set the vault folder for synced books. Forgets all tracked documents.
    Folder {
        folder: String,
    },

    /// Set the minimum number of minutes between passes
    Interval {
        minutes: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && render::terminal::stdout_is_tty();

    let overrides = app::Overrides {
        vault: cli.vault,
        settings: cli.settings,
        api_url: cli.api_url,
        config: cli.config,
    };
    let app = app::App::new(overrides, use_color)?;

    match cli.command {
        Command::Sync => {
            commands::sync::run(&app, &cli.format, use_color).await?;
        }
        Command::Watch { every } => {
            commands::watch::run(&app, every).await?;
        }
        Command::Status => {
            commands::status::run(&app, &cli.format, use_color).await?;
        }
        Command::Config(subcmd) => match subcmd {
            ConfigCommand::Token { token } => {
                commands::config::run_token(&app, token).await?;
            }
            ConfigCommand::Folder { folder } => {
                commands::config::run_folder(&app, folder).await?;
            }
            ConfigCommand::Interval { minutes } => {
                commands::config::run_interval(&app, minutes).await?;
            }
        },
    }

    Ok(())
}

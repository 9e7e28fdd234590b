//! Seguito - web front-end for a project follow-up tracker service.
//!
//! All project state lives in the remote tracker; this binary renders it,
//! wires user actions back to the tracker's HTTP API, and keeps nothing
//! locally except UI preferences.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod client;
mod config;
mod filter;
mod html;
mod prefs;
mod server;
mod types;
mod week;

use client::ApiClient;
use config::Settings;
use filter::UiPrefs;

#[derive(Parser, Debug)]
#[command(name = "seguito")]
#[command(about = "Web front-end for a project follow-up tracker service")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web front-end (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Fetch the board once and write static HTML (no server)
    Snapshot {
        /// Output file for the rendered board
        #[arg(short, long, default_value = "board.html")]
        output: PathBuf,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level))
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("tower_http=warn".parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_max_level(Level::TRACE)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);

    let settings = Settings::from_env()?;
    let client = ApiClient::new(settings.api_url.clone());

    match args.command.unwrap_or(Commands::Serve { port: 8080 }) {
        Commands::Serve { port } => {
            let conn = prefs::open(&settings.prefs_db)?;
            server::serve(port, client, conn).await?;
        }
        Commands::Snapshot { output } => {
            let projects = client.list_projects().await?;
            let owners = filter::owner_options(&projects);
            let ui = UiPrefs::everything_visible(&projects);
            let refs: Vec<&types::Project> = filter::filter_projects(&projects, &ui);
            html::generate_html(&refs, &owners, &ui, &output)?;
            info!(path = %output.display(), count = projects.len(), "HTML saved");
        }
    }

    Ok(())
}

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use media_bridge::agent::config::Config;
use media_bridge::comms::local_api;
use media_bridge::media::{Action, MediaBridge};
use media_bridge::utils;

#[derive(Parser)]
#[command(name = "media-bridge", version, about = "Local HTTP bridge to a media-control executable")]
struct AppCli {
    /// Config file path (JSON); defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server (local API)
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Play current track
    Play,
    /// Pause current track
    Pause,
    /// Play next track
    Next,
    /// Play previous track
    Previous,
    /// See what's currently playing
    Status,
}

async fn run_once(bridge: &MediaBridge, action: Action) -> Result<()> {
    let outcome = bridge.dispatcher().dispatch_and_wait(action).await?;
    if !outcome.stdout.trim().is_empty() {
        println!("{}", outcome.stdout.trim_end());
    }
    if !outcome.success {
        bail!("{} exited with {:?}", action, outcome.exit_code);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AppCli::parse();
    utils::logging::init(args.verbose);

    let mut config = Config::load(args.config.as_deref())?;

    match args.command {
        None => local_api::serve(config).await?,
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.port = port;
            }
            info!("Starting local API server on port {}", config.port);
            local_api::serve(config).await?;
        }
        Some(Commands::Status) => {
            let status = MediaBridge::new(&config).status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Some(Commands::Play) => run_once(&MediaBridge::new(&config), Action::Play).await?,
        Some(Commands::Pause) => run_once(&MediaBridge::new(&config), Action::Pause).await?,
        Some(Commands::Next) => run_once(&MediaBridge::new(&config), Action::Next).await?,
        Some(Commands::Previous) => {
            run_once(&MediaBridge::new(&config), Action::Previous).await?
        }
    }

    Ok(())
}

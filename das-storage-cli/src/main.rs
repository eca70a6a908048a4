use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "das-storage-cli")]
#[command(about = "Store and fetch data-availability payloads by content hash")]
#[command(version)]
struct Cli {
    /// Output format
    #[arg(long, global = true)]
    json: bool,

    /// Storage configuration file
    #[arg(
        long,
        global = true,
        env = "DAS_STORAGE_CONFIG",
        default_value = "das-storage.toml"
    )]
    config: PathBuf,

    /// Per-request timeout in seconds (0 disables)
    #[arg(long, global = true, default_value_t = 30)]
    request_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a file's contents under its hash
    Put(commands::blob::PutArgs),
    /// Fetch a payload by hash
    Get(commands::blob::GetArgs),
    /// Print the hash and object key of a file without storing it
    Hash(commands::blob::HashArgs),
    /// Show the configured backend and its expiration policy
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "das_storage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let ctx = commands::Context {
        json_output: cli.json,
        config_path: cli.config,
        request_timeout_secs: cli.request_timeout,
    };

    match cli.command {
        Commands::Put(args) => commands::blob::put(args, &ctx).await,
        Commands::Get(args) => commands::blob::get(args, &ctx).await,
        Commands::Hash(args) => commands::blob::hash(args, &ctx).await,
        Commands::Info => commands::info::run(&ctx).await,
    }
}

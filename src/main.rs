mod cli;
mod server;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use infodiet::config::DietConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "infodiet",
    version,
    about = "Track your information diet: books, articles, podcasts, videos, courses and papers"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (transport from config: stdio or http)
    Serve {
        /// Override the configured transport
        #[arg(long)]
        transport: Option<String>,
    },
    /// Add an item to the backlog
    Add(cli::items::AddArgs),
    /// Change fields of an item
    Update(cli::items::UpdateArgs),
    /// Mark an item as in progress
    Start { id: String },
    /// Mark an item as finished
    Finish {
        id: String,
        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: Option<i64>,
    },
    /// Mark an item as abandoned
    Abandon { id: String },
    /// Show an item with its progress log
    Show { id: String },
    /// Search items by title, type, status, or tags
    Search(cli::items::SearchArgs),
    /// List items
    List(cli::items::ListArgs),
    /// Log progress on an item
    Log(cli::items::LogArgs),
    /// Show items currently in progress
    Current,
    /// Show consumption statistics
    Stats {
        /// week, month, year, or all
        #[arg(short, long)]
        period: Option<String>,
    },
    /// Show recent activity
    Timeline {
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// Export all items and progress as JSON to stdout
    Export,
    /// Import items from an export file
    Import { file: PathBuf },
    /// Check database health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = DietConfig::load()?;

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { transport } => {
            let mut config = config;
            if let Some(transport) = transport {
                config.server.transport = transport;
            }
            match config.server.transport.as_str() {
                "stdio" => server::serve_stdio(config).await?,
                "http" => server::serve_http(config).await?,
                other => anyhow::bail!("unknown transport: {other} (expected stdio or http)"),
            }
        }
        Command::Add(args) => cli::items::add(&config, args)?,
        Command::Update(args) => cli::items::update(&config, args)?,
        Command::Start { id } => cli::items::start(&config, &id)?,
        Command::Finish { id, rating } => cli::items::finish(&config, &id, rating)?,
        Command::Abandon { id } => cli::items::abandon(&config, &id)?,
        Command::Show { id } => cli::items::show(&config, &id)?,
        Command::Search(args) => cli::items::search(&config, args)?,
        Command::List(args) => cli::items::list(&config, args)?,
        Command::Log(args) => cli::items::log(&config, args)?,
        Command::Current => cli::stats::current(&config)?,
        Command::Stats { period } => cli::stats::stats(&config, period)?,
        Command::Timeline { limit } => cli::stats::timeline(&config, limit)?,
        Command::Export => cli::export::export(&config)?,
        Command::Import { file } => cli::import::import(&config, &file)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}

//! Stepgraph CLI entry point

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod processor;

#[derive(Parser)]
#[command(name = "stepgraph")]
#[command(about = "Convert STEP assemblies into proximity and containment graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a folder of STEP files into graph artifacts
    Process(commands::ProcessArgs),
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::new(format!(
        "stepgraph={log_level},stepgraph_core={log_level},stepgraph_step={log_level},stepgraph_ai={log_level},stepgraph_render={log_level}"
    ));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    // `--log` adds a plain-text processing log inside the output folder.
    let log_file = match &cli.command {
        Commands::Process(args) if args.log => {
            std::fs::create_dir_all(&args.output)?;
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(args.output.join("processing_log.txt"))?;
            Some(std::sync::Arc::new(file))
        }
        _ => None,
    };
    match log_file {
        Some(file) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false),
            )
            .init(),
        None => registry.init(),
    }

    tracing::info!("stepgraph v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Process(args) => commands::process(args).await,
        Commands::Version => {
            println!("stepgraph v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

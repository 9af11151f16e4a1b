mod cmd;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cabinet",
    about = "Policy-gated, plan-driven decisions for property lifecycle events",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (YAML); environment variables override its values
    #[arg(long, global = true, env = "CABINET_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server and, if configured, the event subscription listener
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, env = "PORT", default_value = "4000")]
        port: u16,
    },

    /// Run one lifecycle event (JSON file, or `-` for stdin) through the pipeline
    Process { event: PathBuf },

    /// Show how a free-form task name maps onto the canonical vocabulary
    Task { raw: String },

    /// Show the resolved configuration and any warnings
    Config,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Serve { port } => cmd::serve::run(config_path, port),
        Commands::Process { event } => cmd::process::run(config_path, &event, cli.json),
        Commands::Task { raw } => cmd::task::run(&raw, cli.json),
        Commands::Config => cmd::config::run(config_path, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

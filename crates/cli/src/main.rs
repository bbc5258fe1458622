//! Wayfarer CLI, the main entry point.
//!
//! Commands:
//! - `chat`    Talk to the router agent (interactive or single message)
//! - `plan`    Plan a journey directly, without any model
//! - `config`  Show the default or effective configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "wayfarer",
    about = "Wayfarer: conversational journey planning for London",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the router agent
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Plan a journey and print every plan found as JSON
    Plan {
        /// Starting point: a place name, station code or "lat,lon"
        #[arg(long)]
        from: String,

        /// Destination, in the same forms as --from
        #[arg(long)]
        to: String,

        #[arg(long)]
        via: Option<String>,

        /// Date of travel, YYYYMMDD
        #[arg(long)]
        date: Option<String>,

        /// Time of travel, HHMM
        #[arg(long)]
        time: Option<String>,
    },

    /// Print configuration as TOML
    Config {
        /// Show the loaded configuration instead of the defaults
        #[arg(long)]
        effective: bool,

        /// Only print the config file path
        #[arg(long, conflicts_with = "effective")]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat { message } => commands::chat::run(message, cli.verbose).await?,
        Commands::Plan {
            from,
            to,
            via,
            date,
            time,
        } => commands::plan::run(commands::plan::PlanArgs {
            from,
            to,
            via,
            date,
            time,
        })
        .await?,
        Commands::Config { effective, path } => commands::config_cmd::run(effective, path)?,
    }

    Ok(())
}

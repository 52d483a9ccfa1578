use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use studyhub::config::Config;

mod cli;

#[derive(Parser)]
#[command(name = "studyhub")]
#[command(about = "StudyHub progression engine - XP, levels, streaks and achievements")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.studyhub/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default ~/.studyhub/config.toml
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show a user's level, streak, counters and achievements
    Show {
        user: String,
    },

    /// Count today's activity towards a user's streak
    Checkin {
        user: String,
    },

    /// Record a study-app event for a user
    Record {
        user: String,

        #[command(subcommand)]
        event: cli::record::RecordEvent,
    },

    /// Score study efficiency from a JSON activity summary
    Report {
        /// JSON file with studySessions, studyHours, completionRate, ...
        input: PathBuf,

        /// Also print profile insights for this user
        #[arg(long)]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init must work even when the existing config is broken
    if let Commands::Init { force } = cli.command {
        init_logging(cli.verbose, None);
        return cli::init::init_command(cli.config, force).await;
    }

    let config = Config::load_from(cli.config.as_deref())?;
    init_logging(cli.verbose, Some(&config));

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Show { user } => {
            cli::show::show_command(&config, &user, cli.json).await?;
        }
        Commands::Checkin { user } => {
            cli::checkin::checkin_command(&config, &user).await?;
        }
        Commands::Record { user, event } => {
            cli::record::record_command(&config, &user, event, cli.json).await?;
        }
        Commands::Report { input, user } => {
            cli::report::report_command(&config, &input, user.as_deref(), cli.json).await?;
        }
    }

    Ok(())
}

/// Initialize logging: RUST_LOG, then the config filter; --verbose forces debug
fn init_logging(verbose: bool, config: Option<&Config>) {
    let fallback = config
        .map(|c| c.logging.filter.clone())
        .unwrap_or_else(|| studyhub::config::DEFAULT_LOG_FILTER.to_string());

    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(&fallback))
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

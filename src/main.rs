mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use careminder::config::CareConfig;

#[derive(Parser)]
#[command(name = "careminder", version, about = "Voice reminder assistant for elderly users")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read transcripts from stdin (one per line) and fire reminders as they come due
    Listen {
        /// Language tag for lines without a `[xx]` prefix (en, hi, mr)
        #[arg(long)]
        lang: Option<String>,
    },
    /// Handle a single utterance
    Say {
        text: String,
        #[arg(long)]
        lang: Option<String>,
    },
    /// Show today's active reminders
    Today,
    /// Clear today's reminders
    Clear {
        /// Clear every active reminder, not just today's
        #[arg(long)]
        all: bool,
        #[arg(long)]
        lang: Option<String>,
    },
    /// Delete inactive reminders older than the retention window
    Purge {
        /// Override `housekeeping.retention_days`
        #[arg(long)]
        days: Option<u32>,
    },
    /// Run database diagnostics
    Doctor,
    /// Export all reminders as JSON to stdout
    Export,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CareConfig::load()?;

    // Log to stderr so stdout carries only responses and exports.
    let filter = EnvFilter::try_new(&config.engine.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Listen { lang } => cli::listen::listen(&config, lang.as_deref()).await?,
        Command::Say { text, lang } => cli::say::say(&config, &text, lang.as_deref()).await?,
        Command::Today => cli::today::today(&config).await?,
        Command::Clear { all, lang } => cli::clear::clear(&config, all, lang.as_deref()).await?,
        Command::Purge { days } => cli::purge::purge(&config, days)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
        Command::Export => cli::export::export(&config)?,
    }

    Ok(())
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tilawah", version, about = "Tilawah CLI")]
struct Cli {
    /// User id the command acts for
    #[arg(long, global = true, default_value = "local")]
    user: String,

    /// Database file (default: ~/.config/tilawah/tilawah.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reading progress and history
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Reading streak
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Verse of the day and verse lookups
    Verse {
        #[command(subcommand)]
        action: commands::verse::VerseAction,
    },
    /// Stored AI chat history
    Chat {
        #[command(subcommand)]
        action: commands::chat::ChatAction,
    },
    /// Bookmarks
    Bookmark {
        #[command(subcommand)]
        action: commands::bookmark::BookmarkAction,
    },
    /// User profile and preferences
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Chapters, juz and editions
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context {
        user: cli.user,
        db: cli.db,
    };
    let result = match cli.command {
        Commands::Progress { action } => commands::progress::run(&ctx, action),
        Commands::Streak { action } => commands::streak::run(&ctx, action),
        Commands::Verse { action } => commands::verse::run(action),
        Commands::Chat { action } => commands::chat::run(&ctx, action),
        Commands::Bookmark { action } => commands::bookmark::run(&ctx, action),
        Commands::Profile { action } => commands::profile::run(&ctx, action),
        Commands::Catalog { action } => commands::catalog::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

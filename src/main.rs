use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chatvault::cli::commands;

/// The main CLI command line interface.
#[derive(Parser)]
#[command(name = "chatvault")]
#[command(version)]
#[command(about = "Back up chat history to Markdown and a git remote")]
#[command(long_about = "ChatVault exports a chat application's conversation history from\n\
    its SQLite database into a Markdown backup tree, extracts embedded\n\
    images into content-addressed files, and keeps the tree synchronized\n\
    with a remote git repository.")]
#[command(after_help = "EXAMPLES:\n    \
    chatvault backup --user alice        Back up alice's conversations\n    \
    chatvault config show                Show current configuration\n    \
    chatvault config set remote_url https://github.com/alice/backup.git\n\n    \
    For more information about a command, run 'chatvault <command> --help'.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Export conversations and sync them to the remote repository
    #[command(long_about = "Reads the configured SQLite database, writes one Markdown file\n\
        per conversation plus an index, extracts embedded images, and\n\
        commits and pushes the result to the configured remote.")]
    Backup(commands::backup::Args),

    /// View and manage configuration settings
    #[command(long_about = "Provides subcommands to show, get, and set configuration values.\n\
        Configuration is stored in ~/.chatvault/config.json.")]
    Config(commands::config::Args),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "chatvault=debug"
    } else {
        "chatvault=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match cli.command {
        Commands::Backup(args) => commands::backup::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}

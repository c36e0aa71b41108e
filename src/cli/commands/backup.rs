//! Backup command - export conversations and sync to the remote

use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::notify::ConsoleNotifier;
use crate::service;

/// Arguments for the backup command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    chatvault backup --user alice              Back up alice's conversations\n    \
    chatvault backup --user alice --no-push    Export locally, skip the remote\n    \
    chatvault backup --user alice --db ./webui.db --out ./backup")]
pub struct Args {
    /// User whose conversations are backed up
    #[arg(short, long, value_name = "USER_ID")]
    pub user: String,

    /// Override the configured database path
    #[arg(long, value_name = "FILE")]
    pub db: Option<String>,

    /// Override the configured backup directory
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<String>,

    /// Export locally without pushing to the remote repository
    #[arg(long)]
    pub no_push: bool,
}

pub fn run(args: Args) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(db) = args.db {
        config.db_path = db;
    }
    if let Some(out) = args.out {
        config.backup_path = out;
    }
    if args.no_push {
        config.auto_push = false;
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let summary = runtime.block_on(service::run_backup(
        &args.user,
        &config,
        Arc::new(ConsoleNotifier),
    ));

    println!("{summary}");
    Ok(())
}

//! Config command - manage configuration

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;

use crate::config::Config;

#[derive(clap::Args)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        Some(ConfigCommand::Show) | None => show_config(),
        Some(ConfigCommand::Get { key }) => get_config(&key),
        Some(ConfigCommand::Set { key, value }) => set_config(&key, &value),
    }
}

fn display_value(key: &str, value: &str) -> String {
    if value.is_empty() {
        "(not set)".dimmed().to_string()
    } else if key == "token" {
        "********".to_string()
    } else {
        value.to_string()
    }
}

fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("{}", "ChatVault Configuration".bold());
    println!();
    for key in Config::KEYS {
        let value = config.get(key).unwrap_or_default();
        let label = format!("{key}:{}", " ".repeat(14usize.saturating_sub(key.len())));
        println!("  {}{}", label.dimmed(), display_value(key, &value));
    }
    println!();
    println!(
        "  {}  {}",
        "File:".dimmed(),
        Config::config_path()?.display()
    );

    Ok(())
}

fn get_config(key: &str) -> Result<()> {
    let config = Config::load()?;
    match config.get(key) {
        Some(value) => println!("{value}"),
        None => bail!("unknown config key '{key}'"),
    }
    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;
    println!("{} {} = {}", "Set".green(), key, display_value(key, value));
    Ok(())
}

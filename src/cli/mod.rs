//! Command-line interface for ChatVault.
//!
//! Provides the CLI commands for running backups and managing the
//! tool's configuration.

/// Individual CLI command implementations.
pub mod commands;

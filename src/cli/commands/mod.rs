//! CLI commands for ChatVault.
//!
//! Each submodule implements a single CLI command with its argument
//! parsing and execution logic.

/// Run a full backup for one user.
pub mod backup;

/// Configuration viewing and management.
pub mod config;

//! ChatVault - chat history backup
//!
//! ChatVault exports a chat application's conversation history from its
//! SQLite database into a Markdown backup tree and keeps that tree
//! synchronized with a remote git repository.

pub mod cli;
pub mod config;
pub mod export;
pub mod git;
pub mod notify;
pub mod service;
pub mod storage;
pub mod sync;

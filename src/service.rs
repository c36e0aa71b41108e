//! Backup orchestration.
//!
//! Ties the pipeline together: read conversations from the database,
//! write the backup tree, then reconcile it with the remote repository.
//! The entry point never panics or returns an error; every outcome,
//! success or failure, is reported as a human-readable summary.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::export::Exporter;
use crate::notify::Notifier;
use crate::storage::db::Database;
use crate::sync::{GitCredentials, Reconciler, SyncError, SystemGit};

/// Runs a full backup for one user and returns a summary line.
///
/// Failures are folded into the summary instead of propagating, so a
/// caller always has something to show. The terminal status event
/// carries the same text.
pub async fn run_backup(user_id: &str, config: &Config, notifier: Arc<dyn Notifier>) -> String {
    let summary = match try_backup(user_id, config, Arc::clone(&notifier)).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Backup failed: {e:#}");
            format!("backup failed: {e:#}")
        }
    };

    notifier.status(&summary, true);
    summary
}

async fn try_backup(
    user_id: &str,
    config: &Config,
    notifier: Arc<dyn Notifier>,
) -> Result<String> {
    if user_id.is_empty() {
        bail!("no user id given");
    }
    if config.backup_path.is_empty() {
        bail!("backup_path is not configured");
    }
    if config.db_path.is_empty() {
        bail!("db_path is not configured");
    }

    let db_path = PathBuf::from(&config.db_path);
    if !db_path.exists() {
        bail!("database not found at {}", db_path.display());
    }

    notifier.status("Reading conversations...", false);
    let conversations = {
        let db_path = db_path.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let db = Database::open_read_only(&db_path)?;
            db.list_conversations(&user_id)
        })
        .await
        .context("Database task panicked")??
    };

    if conversations.is_empty() {
        return Ok(format!("no conversations found for user {user_id}"));
    }

    let backup_root = PathBuf::from(&config.backup_path);
    let count = {
        let backup_root = backup_root.clone();
        let db_path = db_path.clone();
        let notifier = Arc::clone(&notifier);
        tokio::task::spawn_blocking(move || {
            let exporter = Exporter::new(backup_root, &db_path);
            exporter.export_all(&conversations, notifier.as_ref())
        })
        .await
        .context("Export task panicked")??
    };

    if config.auto_push && !config.remote_url.is_empty() {
        sync_backup(config, &backup_root, Arc::clone(&notifier)).await?;
    }

    Ok(format!(
        "backed up {count} conversations to {}",
        backup_root.display()
    ))
}

async fn sync_backup(
    config: &Config,
    backup_root: &Path,
    notifier: Arc<dyn Notifier>,
) -> Result<()> {
    let mirror = config.mirror_path()?;
    let remote_url = config.remote_url.clone();
    let credentials = GitCredentials::from_settings(&config.token, &config.ssh_key_path);
    let proxy = (!config.proxy.is_empty()).then(|| config.proxy.clone());
    let backup_root = backup_root.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let git = SystemGit::new();
        let reconciler = Reconciler::new(
            &git,
            mirror,
            remote_url,
            credentials,
            proxy,
            notifier.as_ref(),
        );
        match reconciler.reconcile(&backup_root) {
            Ok(_) => Ok(()),
            Err(e @ SyncError::Locked(_)) => Err(anyhow::Error::new(e)),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to sync with remote")),
        }
    })
    .await
    .context("Sync task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NoopNotifier, Notifier};
    use rusqlite::Connection;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Records status events for assertions.
    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<(String, bool)>>,
    }

    impl Notifier for RecordingNotifier {
        fn status(&self, description: &str, done: bool) {
            self.events
                .lock()
                .unwrap()
                .push((description.to_string(), done));
        }
    }

    fn seed_db(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE chat (
                id TEXT PRIMARY KEY,
                user_id TEXT,
                title TEXT,
                share_id TEXT,
                archived INTEGER,
                pinned INTEGER,
                created_at INTEGER,
                updated_at INTEGER,
                meta TEXT,
                chat TEXT
            );",
        )
        .unwrap();
        conn.execute(
            "INSERT INTO chat VALUES (
                'c1', 'alice', 'Hello', NULL, 0, 0, 1710000000, 1710000100,
                '{}',
                '{\"messages\":[{\"role\":\"user\",\"content\":\"hi\",\"timestamp\":1}]}'
            )",
            [],
        )
        .unwrap();
    }

    fn test_config(dir: &Path) -> Config {
        Config {
            backup_path: dir.join("backup").to_string_lossy().to_string(),
            db_path: dir.join("webui.db").to_string_lossy().to_string(),
            auto_push: false,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_user_reported_in_summary() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());

        let summary = run_backup("", &config, Arc::new(NoopNotifier)).await;
        assert!(summary.contains("no user id"), "got: {summary}");
    }

    #[tokio::test]
    async fn test_unconfigured_paths_reported_in_summary() {
        let summary = run_backup("alice", &Config::default(), Arc::new(NoopNotifier)).await;
        assert!(summary.contains("backup_path"), "got: {summary}");
    }

    #[tokio::test]
    async fn test_missing_database_reported_in_summary() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());

        let summary = run_backup("alice", &config, Arc::new(NoopNotifier)).await;
        assert!(summary.contains("database not found"), "got: {summary}");
    }

    #[tokio::test]
    async fn test_user_without_conversations() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        seed_db(Path::new(&config.db_path));

        let summary = run_backup("nobody", &config, Arc::new(NoopNotifier)).await;
        assert_eq!(summary, "no conversations found for user nobody");
    }

    #[tokio::test]
    async fn test_terminal_status_event_carries_summary() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        seed_db(Path::new(&config.db_path));
        let notifier = Arc::new(RecordingNotifier::default());

        let summary = run_backup("alice", &config, notifier.clone()).await;

        let events = notifier.events.lock().unwrap();
        let (last, done) = events.last().unwrap();
        assert!(*done, "last event is terminal");
        assert_eq!(*last, summary);
        assert!(events.iter().take(events.len() - 1).all(|(_, d)| !d));
    }

    #[tokio::test]
    async fn test_local_backup_writes_tree_and_reports_count() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        seed_db(Path::new(&config.db_path));

        let summary = run_backup("alice", &config, Arc::new(NoopNotifier)).await;

        assert!(summary.starts_with("backed up 1 conversations"), "got: {summary}");
        let backup = dir.path().join("backup");
        assert!(backup.join("index.md").exists());
        assert!(backup.join("chats/2024/03/Hello.md").exists());
    }
}

//! Version-control primitives for the reconciler.
//!
//! `GitRunner` is the seam between the reconciliation state machine and
//! the actual version-control tooling, so tests can substitute a
//! recording fake. `SystemGit` is the production implementation: network
//! and mutating operations shell out to the `git` executable (the only
//! way to honor `GIT_SSH_COMMAND` and proxy overrides per invocation),
//! while read-only inspection goes through the `git` module.

use std::path::Path;
use std::process::Command;
use thiserror::Error;

use crate::git::MirrorStatus;

/// Errors from version-control primitives.
#[derive(Debug, Error)]
pub enum GitCmdError {
    #[error("git not installed or not in PATH")]
    GitNotFound,

    #[error("git command failed to run: {0}")]
    CommandFailed(String),

    #[error("git exited with code {code}: {output}")]
    NonZeroExit { code: i32, output: String },

    #[error("git repository inspection failed: {0}")]
    Inspect(String),
}

/// The version-control operations the reconciler needs.
///
/// `env` carries per-invocation overrides (proxy, SSH transport command)
/// for operations that may touch the network.
pub trait GitRunner {
    fn clone_repo(&self, url: &str, dest: &Path, env: &[(String, String)])
        -> Result<(), GitCmdError>;

    fn init(&self, dest: &Path) -> Result<(), GitCmdError>;

    fn add_remote(&self, repo: &Path, name: &str, url: &str) -> Result<(), GitCmdError>;

    fn set_remote_url(&self, repo: &Path, name: &str, url: &str) -> Result<(), GitCmdError>;

    fn fetch(&self, repo: &Path, env: &[(String, String)]) -> Result<(), GitCmdError>;

    fn hard_reset(&self, repo: &Path, target: &str, env: &[(String, String)])
        -> Result<(), GitCmdError>;

    fn add_all(&self, repo: &Path) -> Result<(), GitCmdError>;

    fn commit(&self, repo: &Path, message: &str) -> Result<(), GitCmdError>;

    /// Renames the current branch, replacing any existing branch of that name.
    fn force_branch(&self, repo: &Path, name: &str) -> Result<(), GitCmdError>;

    fn pull_rebase(&self, repo: &Path, env: &[(String, String)]) -> Result<(), GitCmdError>;

    fn push(
        &self,
        repo: &Path,
        remote: &str,
        branch: &str,
        set_upstream: bool,
        env: &[(String, String)],
    ) -> Result<(), GitCmdError>;

    /// Working-tree state used for the commit decision.
    fn status(&self, repo: &Path) -> Result<MirrorStatus, GitCmdError>;

    /// Paths tracked by the commit at HEAD.
    fn tracked_paths(&self, repo: &Path) -> Result<Vec<String>, GitCmdError>;
}

/// Production runner backed by the `git` executable.
#[derive(Clone, Copy, Default)]
pub struct SystemGit;

impl SystemGit {
    pub fn new() -> Self {
        Self
    }

    fn run_git(
        &self,
        repo: Option<&Path>,
        args: &[&str],
        env: &[(String, String)],
    ) -> Result<(), GitCmdError> {
        let mut cmd = Command::new("git");
        if let Some(repo) = repo {
            cmd.current_dir(repo);
        }
        cmd.args(args);
        for (key, value) in env {
            cmd.env(key, value);
        }

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GitCmdError::GitNotFound
            } else {
                GitCmdError::CommandFailed(e.to_string())
            }
        })?;

        if output.status.success() {
            Ok(())
        } else {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let combined = match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
                (false, false) => format!("{}\n{}", stdout.trim(), stderr.trim()),
                (false, true) => stdout.trim().to_string(),
                _ => stderr.trim().to_string(),
            };
            Err(GitCmdError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                output: combined,
            })
        }
    }
}

impl GitRunner for SystemGit {
    fn clone_repo(
        &self,
        url: &str,
        dest: &Path,
        env: &[(String, String)],
    ) -> Result<(), GitCmdError> {
        let dest = dest.to_string_lossy();
        self.run_git(None, &["clone", url, dest.as_ref()], env)
    }

    fn init(&self, dest: &Path) -> Result<(), GitCmdError> {
        let dest = dest.to_string_lossy();
        self.run_git(None, &["init", dest.as_ref()], &[])
    }

    fn add_remote(&self, repo: &Path, name: &str, url: &str) -> Result<(), GitCmdError> {
        self.run_git(Some(repo), &["remote", "add", name, url], &[])
    }

    fn set_remote_url(&self, repo: &Path, name: &str, url: &str) -> Result<(), GitCmdError> {
        self.run_git(Some(repo), &["remote", "set-url", name, url], &[])
    }

    fn fetch(&self, repo: &Path, env: &[(String, String)]) -> Result<(), GitCmdError> {
        self.run_git(Some(repo), &["fetch"], env)
    }

    fn hard_reset(
        &self,
        repo: &Path,
        target: &str,
        env: &[(String, String)],
    ) -> Result<(), GitCmdError> {
        self.run_git(Some(repo), &["reset", "--hard", target], env)
    }

    fn add_all(&self, repo: &Path) -> Result<(), GitCmdError> {
        self.run_git(Some(repo), &["add", "--all"], &[])
    }

    fn commit(&self, repo: &Path, message: &str) -> Result<(), GitCmdError> {
        self.run_git(Some(repo), &["commit", "-m", message], &[])
    }

    fn force_branch(&self, repo: &Path, name: &str) -> Result<(), GitCmdError> {
        self.run_git(Some(repo), &["branch", "-M", name], &[])
    }

    fn pull_rebase(&self, repo: &Path, env: &[(String, String)]) -> Result<(), GitCmdError> {
        self.run_git(Some(repo), &["pull", "--rebase"], env)
    }

    fn push(
        &self,
        repo: &Path,
        remote: &str,
        branch: &str,
        set_upstream: bool,
        env: &[(String, String)],
    ) -> Result<(), GitCmdError> {
        if set_upstream {
            self.run_git(Some(repo), &["push", "--set-upstream", remote, branch], env)
        } else {
            self.run_git(Some(repo), &["push", remote, branch], env)
        }
    }

    fn status(&self, repo: &Path) -> Result<MirrorStatus, GitCmdError> {
        crate::git::mirror_status(repo).map_err(|e| GitCmdError::Inspect(format!("{e:#}")))
    }

    fn tracked_paths(&self, repo: &Path) -> Result<Vec<String>, GitCmdError> {
        crate::git::tracked_blob_paths(repo).map_err(|e| GitCmdError::Inspect(format!("{e:#}")))
    }
}

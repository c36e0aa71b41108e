//! Git mirror inspection.
//!
//! Read-only queries against the local mirror repository: working-tree
//! cleanliness, untracked files, and the set of paths tracked at HEAD.
//! All mutating and network operations go through the sync runner.

use anyhow::{Context, Result};
use std::path::Path;

/// Working-tree state of the mirror, as seen by the commit decision.
#[derive(Debug, Clone, Default)]
pub struct MirrorStatus {
    /// True when tracked content differs from HEAD (staged or not).
    pub dirty: bool,
    /// Paths present in the working tree but unknown to git.
    pub untracked: Vec<String>,
}

impl MirrorStatus {
    /// Whether a commit is warranted.
    pub fn has_changes(&self) -> bool {
        self.dirty || !self.untracked.is_empty()
    }
}

/// Inspects the mirror's working tree and index.
///
/// # Errors
///
/// Returns an error if the path is not a git repository.
pub fn mirror_status(path: &Path) -> Result<MirrorStatus> {
    let repo = git2::Repository::open(path).context("Not a git repository")?;

    let mut opts = git2::StatusOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);

    let statuses = repo
        .statuses(Some(&mut opts))
        .context("Failed to read repository status")?;

    let mut status = MirrorStatus::default();
    for entry in statuses.iter() {
        let flags = entry.status();
        if flags.contains(git2::Status::WT_NEW) {
            if let Some(p) = entry.path() {
                status.untracked.push(p.to_string());
            }
        } else if !flags.is_empty() {
            status.dirty = true;
        }
    }

    Ok(status)
}

/// Lists every blob path tracked by the commit at HEAD.
///
/// Returns an empty list for a repository with no commits yet.
pub fn tracked_blob_paths(path: &Path) -> Result<Vec<String>> {
    let repo = git2::Repository::open(path).context("Not a git repository")?;

    let head = match repo.head() {
        Ok(head) => head,
        Err(_) => return Ok(Vec::new()),
    };
    let tree = head.peel_to_tree().context("Failed to resolve HEAD tree")?;

    let mut paths = Vec::new();
    tree.walk(git2::TreeWalkMode::PreOrder, |root, entry| {
        if entry.kind() == Some(git2::ObjectType::Blob) {
            if let Some(name) = entry.name() {
                paths.push(format!("{root}{name}"));
            }
        }
        git2::TreeWalkResult::Ok
    })
    .context("Failed to walk HEAD tree")?;

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn init_repo(path: &Path) -> git2::Repository {
        git2::Repository::init(path).expect("Failed to init test repository")
    }

    fn commit_all(repo: &git2::Repository, message: &str) {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("test", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    #[test]
    fn test_status_of_clean_repository() {
        let dir = tempdir().unwrap();
        let repo = init_repo(dir.path());
        fs::write(dir.path().join("a.md"), "hello").unwrap();
        commit_all(&repo, "initial");

        let status = mirror_status(dir.path()).unwrap();
        assert!(!status.has_changes());
    }

    #[test]
    fn test_status_reports_untracked_files() {
        let dir = tempdir().unwrap();
        init_repo(dir.path());
        fs::write(dir.path().join("new.md"), "fresh").unwrap();

        let status = mirror_status(dir.path()).unwrap();
        assert!(status.has_changes());
        assert_eq!(status.untracked, vec!["new.md".to_string()]);
        assert!(!status.dirty);
    }

    #[test]
    fn test_status_reports_modified_files_as_dirty() {
        let dir = tempdir().unwrap();
        let repo = init_repo(dir.path());
        fs::write(dir.path().join("a.md"), "hello").unwrap();
        commit_all(&repo, "initial");
        fs::write(dir.path().join("a.md"), "changed").unwrap();

        let status = mirror_status(dir.path()).unwrap();
        assert!(status.dirty);
        assert!(status.untracked.is_empty());
    }

    #[test]
    fn test_tracked_blob_paths() {
        let dir = tempdir().unwrap();
        let repo = init_repo(dir.path());
        fs::create_dir_all(dir.path().join("chats/2024")).unwrap();
        fs::write(dir.path().join("index.md"), "idx").unwrap();
        fs::write(dir.path().join("chats/2024/one.md"), "one").unwrap();
        commit_all(&repo, "initial");

        let mut paths = tracked_blob_paths(dir.path()).unwrap();
        paths.sort();
        assert_eq!(paths, vec!["chats/2024/one.md", "index.md"]);
    }

    #[test]
    fn test_tracked_blob_paths_empty_before_first_commit() {
        let dir = tempdir().unwrap();
        init_repo(dir.path());
        assert!(tracked_blob_paths(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_status_fails_outside_repository() {
        let dir = tempdir().unwrap();
        assert!(mirror_status(dir.path()).is_err());
    }
}

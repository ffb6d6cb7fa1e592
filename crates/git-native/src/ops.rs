use std::path::Path;

use artsync_core::repo_name::{normalize_repo_name, repo_name_from_remote};
use artsync_core::SHORT_HASH_LEN;
use gix::Repository;

use crate::error::{GitError, Result};

/// Wrap any gix-compatible error into [`GitError::Gix`].
pub fn gix_err(e: impl std::error::Error + Send + Sync + 'static) -> GitError {
    GitError::Gix(Box::new(e))
}

/// Open a git repository at `repo_path`.
///
/// Returns [`GitError::NotARepo`] when `.git` is absent.
pub fn open_repo(repo_path: &Path) -> Result<Repository> {
    let repo = gix::open(repo_path).map_err(|e| {
        if repo_path.join(".git").exists() {
            gix_err(e)
        } else {
            GitError::NotARepo(repo_path.to_path_buf())
        }
    })?;
    Ok(repo)
}

/// Short name of the checked-out branch, `None` when HEAD is detached.
pub fn current_branch(repo: &Repository) -> Result<Option<String>> {
    let name = repo.head_name().map_err(gix_err)?;
    Ok(name.map(|full| full.shorten().to_string()))
}

/// First [`SHORT_HASH_LEN`] hex characters of the commit HEAD points at.
pub fn head_short_hash(repo: &Repository) -> Result<String> {
    let head = repo.head().map_err(gix_err)?;
    let Some(id) = head.id() else {
        return Err(GitError::UnbornHead(repo.git_dir().to_path_buf()));
    };
    let mut hex = id.detach().to_string();
    hex.truncate(SHORT_HASH_LEN);
    Ok(hex)
}

/// Fetch URLs of all configured remotes, `origin` first, then by name.
pub fn remote_urls(repo: &Repository) -> Vec<String> {
    let mut remotes: Vec<(String, String)> = Vec::new();
    for name in repo.remote_names().iter() {
        let remote = match repo.find_remote(&**name) {
            Ok(remote) => remote,
            Err(e) => {
                tracing::debug!(remote = %name, error = %e, "skipping unreadable remote");
                continue;
            }
        };
        if let Some(url) = remote.url(gix::remote::Direction::Fetch) {
            remotes.push((name.to_string(), url.to_bstring().to_string()));
        }
    }
    remotes.sort_by_key(|(name, _)| name != "origin");
    remotes.into_iter().map(|(_, url)| url).collect()
}

/// Repository identity read from a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitContext {
    /// Lower-cased repository name.
    pub repo_name: String,
    /// Active branch, `None` in detached-head state.
    pub branch: Option<String>,
    pub short_hash: String,
}

/// Read [`GitContext`] from the repository rooted at `repo_root`.
///
/// The repository name comes from `ci_repository` when given, else from the
/// first remote URL, else from the root directory's name.
pub fn read_git_context(repo_root: &Path, ci_repository: Option<&str>) -> Result<GitContext> {
    let repo = open_repo(repo_root)?;
    let short_hash = head_short_hash(&repo)?;
    let branch = current_branch(&repo)?;

    let repo_name = ci_repository
        .and_then(normalize_repo_name)
        .or_else(|| {
            remote_urls(&repo)
                .iter()
                .find_map(|url| repo_name_from_remote(url))
        })
        .or_else(|| {
            repo_root
                .file_name()
                .and_then(|name| normalize_repo_name(&name.to_string_lossy()))
        })
        .ok_or_else(|| GitError::NotARepo(repo_root.to_path_buf()))?;

    Ok(GitContext {
        repo_name,
        branch,
        short_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{add_remote, detach_head, head_commit, init_test_repo};

    #[test]
    fn test_open_repo_not_a_repo() {
        let tmp = tempfile::tempdir().unwrap();
        let err = open_repo(tmp.path()).unwrap_err();
        assert!(
            matches!(err, GitError::NotARepo(_)),
            "expected NotARepo, got: {err}"
        );
    }

    #[test]
    fn test_branch_and_short_hash() {
        let tmp = tempfile::tempdir().unwrap();
        init_test_repo(tmp.path());

        let repo = open_repo(tmp.path()).unwrap();
        assert_eq!(current_branch(&repo).unwrap(), Some("main".to_string()));

        let short = head_short_hash(&repo).unwrap();
        assert_eq!(short.len(), SHORT_HASH_LEN);
        assert!(head_commit(tmp.path()).starts_with(&short));
    }

    #[test]
    fn test_detached_head_has_no_branch() {
        let tmp = tempfile::tempdir().unwrap();
        init_test_repo(tmp.path());
        detach_head(tmp.path());

        let repo = open_repo(tmp.path()).unwrap();
        assert_eq!(current_branch(&repo).unwrap(), None);
        assert!(head_short_hash(&repo).is_ok());
    }

    #[test]
    fn test_unborn_head() {
        let tmp = tempfile::tempdir().unwrap();
        std::process::Command::new("git")
            .args(["init", "--initial-branch=main"])
            .current_dir(tmp.path())
            .output()
            .expect("git init failed");

        let repo = open_repo(tmp.path()).unwrap();
        let err = head_short_hash(&repo).unwrap_err();
        assert!(
            matches!(err, GitError::UnbornHead(_)),
            "expected UnbornHead, got: {err}"
        );
    }

    #[test]
    fn test_remote_urls_prefer_origin() {
        let tmp = tempfile::tempdir().unwrap();
        init_test_repo(tmp.path());
        add_remote(tmp.path(), "alpha", "https://example.com/team/alpha.git");
        add_remote(tmp.path(), "origin", "https://github.com/Acme/Widgets.git");

        let repo = open_repo(tmp.path()).unwrap();
        assert_eq!(
            remote_urls(&repo),
            vec![
                "https://github.com/Acme/Widgets.git".to_string(),
                "https://example.com/team/alpha.git".to_string(),
            ]
        );
    }

    #[test]
    fn test_context_name_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("LocalName");
        std::fs::create_dir_all(&root).unwrap();
        init_test_repo(&root);

        let ctx = read_git_context(&root, None).unwrap();
        assert_eq!(ctx.repo_name, "localname");
        assert_eq!(ctx.branch.as_deref(), Some("main"));

        add_remote(&root, "origin", "https://github.com/Acme/Widgets.git");
        let ctx = read_git_context(&root, None).unwrap();
        assert_eq!(ctx.repo_name, "widgets");

        let ctx = read_git_context(&root, Some("Acme/FromCI")).unwrap();
        assert_eq!(ctx.repo_name, "fromci");
    }
}

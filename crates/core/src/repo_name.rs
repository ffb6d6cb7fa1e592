/// Extract the repository path ("owner/repo") from a git remote URL.
///
/// Handles:
///   - `https://github.com/foo/bar.git` → `foo/bar`
///   - `git@github.com:foo/bar.git` → `foo/bar`
///   - `ssh://git@github.com/foo/bar` → `foo/bar`
///   - `file:///srv/git/bar.git` and `/srv/git/bar.git` → `srv/git/bar`
pub fn remote_repo_path(remote_url: &str) -> Option<&str> {
    let s = remote_url.trim().trim_end_matches('/');
    if s.is_empty() {
        return None;
    }

    let path = if let Some((_, without_scheme)) = s.split_once("://") {
        // skip "user@host/" or "host/"; file:// has an empty host
        let path_start = without_scheme.find('/')? + 1;
        &without_scheme[path_start..]
    } else if s.starts_with('/') {
        s.trim_start_matches('/')
    } else if let Some((host, path)) = s.split_once(':') {
        // scp-like: [user@]host:owner/repo.git
        if host.is_empty() || host.contains('/') {
            return None;
        }
        path
    } else {
        return None;
    };

    let path = path.strip_suffix(".git").unwrap_or(path);
    let path = path.trim_matches('/');
    if path.is_empty() { None } else { Some(path) }
}

/// Normalize a repository identifier to the single lower-cased name used as
/// the first prefix segment. `Owner/Repo.git` becomes `repo`.
pub fn normalize_repo_name(identifier: &str) -> Option<String> {
    let last = identifier.trim().trim_end_matches('/').rsplit('/').next()?;
    let last = last.strip_suffix(".git").unwrap_or(last).trim();
    if last.is_empty() || last == "." || last == ".." {
        None
    } else {
        Some(last.to_lowercase())
    }
}

/// Repository name derived from a remote URL.
pub fn repo_name_from_remote(remote_url: &str) -> Option<String> {
    remote_repo_path(remote_url).and_then(normalize_repo_name)
}

use std::path::{Path, PathBuf};

use artsync_core::{RemotePrefix, SHA_SEGMENT_PREFIX};
use tracing::{info, warn};

use crate::error::Result;
use crate::ops::{read_git_context, GitContext};

/// Branch segment used when HEAD is detached and CI names no branch.
pub const DETACHED_BRANCH: &str = "detached";

/// Inputs to prefix resolution that would otherwise come from process state.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Checkout to inspect. It must be the working tree root itself; parent
    /// directories are not searched.
    pub workdir: PathBuf,
    /// CI-provided repository identifier such as `owner/repo`.
    pub ci_repository: Option<String>,
    /// CI-provided branch, used only when HEAD is detached.
    pub ci_branch: Option<String>,
    pub detached_branch: String,
}

impl ResolveOptions {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            ci_repository: None,
            ci_branch: None,
            detached_branch: DETACHED_BRANCH.to_string(),
        }
    }
}

/// Compose `repo / branch / SHA-<hash>` from a git context.
pub fn git_prefix(ctx: &GitContext, opts: &ResolveOptions) -> RemotePrefix {
    let branch = ctx
        .branch
        .as_deref()
        .or(opts.ci_branch.as_deref().filter(|b| !b.trim().is_empty()))
        .unwrap_or(&opts.detached_branch);

    let mut prefix = RemotePrefix::root();
    prefix.push_segment(&ctx.repo_name);
    prefix.push_segment(branch);
    prefix.push_segment(&format!("{SHA_SEGMENT_PREFIX}{}", ctx.short_hash));
    prefix
}

/// Read the git context of the checkout at `opts.workdir`.
pub fn detect(opts: &ResolveOptions) -> Result<GitContext> {
    read_git_context(&opts.workdir, opts.ci_repository.as_deref())
}

/// Resolve the remote prefix for `base`.
///
/// With `use_git` off, or when no usable repository is found, the result is
/// `base` alone. Otherwise it is `repo / branch / SHA-<hash> / base`.
pub fn resolve_prefix(use_git: bool, base: &Path, opts: &ResolveOptions) -> RemotePrefix {
    let base_prefix = RemotePrefix::from_path(base);
    if !use_git {
        info!("git info usage disabled, proceeding without git info");
        return base_prefix;
    }

    match detect(opts) {
        Ok(ctx) => {
            info!(
                repo = %ctx.repo_name,
                branch = ctx.branch.as_deref().unwrap_or("(detached)"),
                commit = %ctx.short_hash,
                "git repository detected"
            );
            git_prefix(&ctx, opts).join(&base_prefix)
        }
        Err(e) => {
            warn!(
                workdir = %opts.workdir.display(),
                error = %e,
                "no usable git repository, proceeding without git info"
            );
            base_prefix
        }
    }
}

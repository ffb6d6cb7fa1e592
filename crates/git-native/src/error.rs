use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("not a git repository: {0}")]
    NotARepo(PathBuf),

    #[error("repository has no commits yet: {0}")]
    UnbornHead(PathBuf),

    #[error("git error: {0}")]
    Gix(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, GitError>;

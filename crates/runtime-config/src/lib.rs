//! Configuration sources for artsync.
//!
//! Settings come from an optional `artsync.toml`, from store credentials in
//! the environment, and from a CI environment snapshot. Everything here is
//! read once in `main` and passed down as plain values.

use std::path::{Path, PathBuf};

use artsync_core::{DEFAULT_BUCKET, DEFAULT_REGION};
use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "artsync.toml";

/// Top-level config (persisted as `artsync.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ArtsyncConfig {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub git: GitSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreSettings {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_key: None,
            secret_key: None,
            region: default_region(),
            bucket: default_bucket(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GitSettings {
    #[serde(default = "default_true")]
    pub use_git: bool,
    /// Branch segment used for detached checkouts.
    #[serde(default = "default_detached_branch")]
    pub detached_branch: String,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            use_git: true,
            detached_branch: default_detached_branch(),
        }
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_true() -> bool {
    true
}

fn default_detached_branch() -> String {
    "detached".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Parse one config file.
pub fn load_config_file(path: &Path) -> Result<ArtsyncConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Implicit config locations, in lookup order: `./artsync.toml`, then
/// `~/.config/artsync/artsync.toml`.
pub fn config_candidates(cwd: &Path, home: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = vec![cwd.join(CONFIG_FILE_NAME)];
    if let Some(home) = home {
        candidates.push(home.join(".config").join("artsync").join(CONFIG_FILE_NAME));
    }
    candidates
}

/// Load the config to use for this run.
///
/// An explicit path must exist. Otherwise the first existing candidate is
/// used, and defaults apply when there is none. Returns the file that was
/// read, if any.
pub fn load_config(
    explicit: Option<&Path>,
    cwd: &Path,
    home: Option<&Path>,
) -> Result<(ArtsyncConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = explicit {
        return Ok((load_config_file(path)?, Some(path.to_path_buf())));
    }
    for candidate in config_candidates(cwd, home) {
        if candidate.is_file() {
            let config = load_config_file(&candidate)?;
            return Ok((config, Some(candidate)));
        }
    }
    Ok((ArtsyncConfig::default(), None))
}

/// Home directory from `HOME`/`USERPROFILE`.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// CI variables consulted by a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CiEnv {
    /// `GITHUB_WORKSPACE`: checkout directory to inspect for git info.
    pub workspace: Option<PathBuf>,
    /// `GITHUB_REPOSITORY`: `owner/repo`.
    pub repository: Option<String>,
    /// `GITHUB_HEAD_REF`: source branch of a pull request.
    pub head_ref: Option<String>,
    /// `GITHUB_REF_NAME`: branch or tag that triggered the run.
    pub ref_name: Option<String>,
    /// `GITHUB_OUTPUT`: file that receives `key=value` step outputs.
    pub output_file: Option<PathBuf>,
}

impl CiEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            workspace: non_empty(lookup("GITHUB_WORKSPACE")).map(PathBuf::from),
            repository: non_empty(lookup("GITHUB_REPOSITORY")),
            head_ref: non_empty(lookup("GITHUB_HEAD_REF")),
            ref_name: non_empty(lookup("GITHUB_REF_NAME")),
            output_file: non_empty(lookup("GITHUB_OUTPUT")).map(PathBuf::from),
        }
    }

    /// Branch named by CI, preferring the pull-request head.
    pub fn branch(&self) -> Option<&str> {
        self.head_ref.as_deref().or(self.ref_name.as_deref())
    }
}

/// Store settings taken from the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreEnv {
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl StoreEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            endpoint: non_empty(lookup("MINIO_API_URI")),
            access_key: non_empty(lookup("MINIO_ACCESS_KEY")),
            secret_key: non_empty(lookup("MINIO_SECRET_KEY")),
        }
    }
}

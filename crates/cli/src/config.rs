use artsync_core::{Credentials, TransferRequest};
use artsync_git_native::ResolveOptions;
use artsync_runtime_config::{ArtsyncConfig, CiEnv, StoreEnv};
use std::path::Path;

use crate::Cli;

/// A required store setting that no source provided.
#[derive(Debug, thiserror::Error)]
#[error("missing {flag} (or set {env}, or [store].{key} in artsync.toml)")]
pub struct MissingSetting {
    pub flag: &'static str,
    pub env: &'static str,
    pub key: &'static str,
}

/// Parse a yes/no style boolean (`yes/true/t/y/1`, `no/false/f/n/0`).
pub fn parse_bool_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Ok(true),
        "no" | "false" | "f" | "n" | "0" => Ok(false),
        other => Err(format!("boolean value expected, got '{other}'")),
    }
}

/// Flag first, then environment, then config file.
fn pick(
    flag: Option<&String>,
    env: Option<&String>,
    file: Option<&String>,
    missing: MissingSetting,
) -> Result<String, MissingSetting> {
    flag.or(env)
        .or(file)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(missing)
}

/// Merge CLI flags, environment and config file into one request.
pub fn build_request(
    cli: &Cli,
    config: &ArtsyncConfig,
    env: &StoreEnv,
) -> Result<TransferRequest, MissingSetting> {
    let endpoint = pick(
        cli.minio_api_uri.as_ref(),
        env.endpoint.as_ref(),
        config.store.endpoint.as_ref(),
        MissingSetting {
            flag: "--minio_api_uri",
            env: "MINIO_API_URI",
            key: "endpoint",
        },
    )?;
    let access_key = pick(
        cli.minio_access_key.as_ref(),
        env.access_key.as_ref(),
        config.store.access_key.as_ref(),
        MissingSetting {
            flag: "--minio_access_key",
            env: "MINIO_ACCESS_KEY",
            key: "access_key",
        },
    )?;
    let secret_key = pick(
        cli.minio_secret_key.as_ref(),
        env.secret_key.as_ref(),
        config.store.secret_key.as_ref(),
        MissingSetting {
            flag: "--minio_secret_key",
            env: "MINIO_SECRET_KEY",
            key: "secret_key",
        },
    )?;

    Ok(TransferRequest {
        mode: cli.mode.into(),
        source: cli.src_path.clone(),
        destination: cli.tgt_path.clone(),
        bucket: cli
            .bucket
            .clone()
            .unwrap_or_else(|| config.store.bucket.clone()),
        credentials: Credentials {
            access_key,
            secret_key,
        },
        endpoint,
        region: cli
            .region
            .clone()
            .unwrap_or_else(|| config.store.region.clone()),
        use_git: cli.use_git.unwrap_or(config.git.use_git),
    })
}

/// Git inspection happens in the CI workspace when one is set, otherwise in
/// the current directory.
pub fn resolve_options(cwd: &Path, ci: &CiEnv, config: &ArtsyncConfig) -> ResolveOptions {
    let workdir = ci.workspace.clone().unwrap_or_else(|| cwd.to_path_buf());
    ResolveOptions {
        ci_repository: ci.repository.clone(),
        ci_branch: ci.branch().map(str::to_string),
        detached_branch: config.git.detached_branch.clone(),
        ..ResolveOptions::new(workdir)
    }
}

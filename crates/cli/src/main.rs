mod config;
mod download;
mod output;
mod upload;

use anyhow::{Context, Result};
use artsync_core::TransferMode;
use artsync_runtime_config::{home_dir, load_config, CiEnv, StoreEnv};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::MissingSetting;

#[derive(Parser)]
#[command(
    name = "artsync",
    version,
    about = "Upload or download build artifacts to an S3/MinIO bucket, scoped by repo/branch/commit"
)]
pub(crate) struct Cli {
    /// MinIO secret key for authentication [env: MINIO_SECRET_KEY]
    #[arg(long = "minio_secret_key")]
    minio_secret_key: Option<String>,

    /// MinIO access key for authentication [env: MINIO_ACCESS_KEY]
    #[arg(long = "minio_access_key")]
    minio_access_key: Option<String>,

    /// MinIO API URI, e.g. http://minio:9000 [env: MINIO_API_URI]
    #[arg(long = "minio_api_uri")]
    minio_api_uri: Option<String>,

    /// Source file or directory path
    #[arg(long = "src_path")]
    src_path: PathBuf,

    /// Target file or directory path
    #[arg(long = "tgt_path", default_value = "./")]
    tgt_path: PathBuf,

    /// Bucket name [default: artifacts]
    #[arg(long)]
    bucket: Option<String>,

    /// Operation mode
    #[arg(long, value_enum)]
    mode: Mode,

    /// Prefix remote paths with repo/branch/SHA-<commit> [default: true]
    #[arg(
        long = "use_git",
        value_parser = config::parse_bool_flag,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    use_git: Option<bool>,

    /// Region sent to the object store [default: us-east-1]
    #[arg(long)]
    region: Option<String>,

    /// Config file (defaults to ./artsync.toml, then ~/.config/artsync/artsync.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Upload,
    Download,
}

impl From<Mode> for TransferMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Upload => TransferMode::Upload,
            Mode::Download => TransferMode::Download,
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let default_filter = format!(
        "warn,artsync={level},artsync_core={level},artsync_git_native={level},artsync_s3={level}"
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Could not determine current directory")?;
    let ci = CiEnv::from_env();
    let (file_config, config_path) =
        load_config(cli.config.as_deref(), &cwd, home_dir().as_deref())?;
    if let Some(path) = &config_path {
        tracing::debug!(path = %path.display(), "loaded config file");
    }

    let request = config::build_request(&cli, &file_config, &StoreEnv::from_env())?;
    let resolve = config::resolve_options(&cwd, &ci, &file_config);
    tracing::debug!(
        mode = %request.mode,
        bucket = %request.bucket,
        endpoint = %request.endpoint,
        use_git = request.use_git,
        "transfer requested"
    );

    output::print_banner();
    let report = match request.mode {
        TransferMode::Upload => upload::run_upload(&request, &resolve).await?,
        TransferMode::Download => download::run_download(&request, &resolve).await?,
    };

    if let Some(path) = &ci.output_file {
        output::write_ci_output(path, "artifact_path", &report.location)
            .with_context(|| format!("Failed to write CI output to {}", path.display()))?;
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        if let Some(missing) = e.downcast_ref::<MissingSetting>() {
            Cli::command()
                .error(ErrorKind::MissingRequiredArgument, missing)
                .exit();
        }
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

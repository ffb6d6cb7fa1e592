use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::key::{safe_relative_path, source_key_name, RemotePrefix};
use crate::store::{ObjectStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("source path does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("source is neither a file nor a directory: {0}")]
    UnsupportedSource(PathBuf),

    #[error("bucket does not exist: {0}")]
    BucketMissing(String),

    #[error("failed to create bucket {bucket}: {source}")]
    CreateBucket {
        bucket: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to list objects under {location}: {source}")]
    List {
        location: String,
        #[source]
        source: StoreError,
    },

    #[error("io error at {path}: {source}")]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, TransferError>;

/// One object that could not be copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFailure {
    pub key: String,
    pub error: String,
}

/// Outcome of an upload or download pass.
#[derive(Debug, Clone, Default)]
pub struct TransferReport {
    /// `bucket/prefix` the pass operated on.
    pub location: String,
    pub transferred: usize,
    pub failed: Vec<TransferFailure>,
    /// Listed keys that had no usable local path (directory markers, escapes).
    pub skipped: usize,
}

impl TransferReport {
    fn new(bucket: &str, prefix: &RemotePrefix) -> Self {
        Self {
            location: location(bucket, prefix),
            ..Self::default()
        }
    }

    pub fn attempted(&self) -> usize {
        self.transferred + self.failed.len()
    }

    /// Every key the pass looked at, including skipped ones.
    pub fn matched(&self) -> usize {
        self.attempted() + self.skipped
    }

    fn record_failure(&mut self, key: &str, error: impl std::fmt::Display) {
        warn!(%key, %error, "transfer failed, skipping");
        self.failed.push(TransferFailure {
            key: key.to_string(),
            error: error.to_string(),
        });
    }
}

/// Human-readable `bucket/prefix`.
pub fn location(bucket: &str, prefix: &RemotePrefix) -> String {
    if prefix.is_root() {
        bucket.to_string()
    } else {
        format!("{bucket}/{prefix}")
    }
}

/// A local file paired with the object key it uploads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    pub local: PathBuf,
    pub key: String,
}

/// Work out which keys an upload of `source` produces below `prefix`.
///
/// A file lands at `prefix/<file name>`. A directory's regular files land at
/// `prefix/<source name>/<relative path>`, sorted by relative path. Relative
/// sources are read from the process working directory.
pub fn plan_upload(source: &Path, prefix: &RemotePrefix) -> Result<Vec<UploadItem>> {
    plan_upload_in(Path::new(""), source, prefix)
}

/// [`plan_upload`] with relative sources read from `base_dir`.
///
/// Keys are derived from `source` as given, never from `base_dir`.
pub fn plan_upload_in(
    base_dir: &Path,
    source: &Path,
    prefix: &RemotePrefix,
) -> Result<Vec<UploadItem>> {
    let local = base_dir.join(source);
    let metadata = std::fs::metadata(&local).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TransferError::SourceMissing(source.to_path_buf()),
        _ => TransferError::LocalIo {
            path: local.clone(),
            source: e,
        },
    })?;

    if metadata.is_file() {
        let Some(name) = source.file_name() else {
            return Err(TransferError::UnsupportedSource(source.to_path_buf()));
        };
        return Ok(vec![UploadItem {
            key: prefix.object_key(Path::new(name)),
            local,
        }]);
    }
    if !metadata.is_dir() {
        return Err(TransferError::UnsupportedSource(source.to_path_buf()));
    }

    let base = prefix.join(&source_key_name(source));
    let items = collect_files(&local)?
        .into_iter()
        .map(|relative| UploadItem {
            key: base.object_key(&relative),
            local: local.join(relative),
        })
        .collect();
    Ok(items)
}

/// Relative paths of every regular file below `root`, sorted.
///
/// Symlinks and special files are skipped.
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    walk_files(root, Path::new(""), &mut out)?;
    out.sort();
    Ok(out)
}

fn walk_files(root: &Path, relative: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let dir = root.join(relative);
    let io_err = |source: std::io::Error| TransferError::LocalIo {
        path: dir.clone(),
        source,
    };
    for entry in std::fs::read_dir(&dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let file_type = entry.file_type().map_err(io_err)?;
        let child = relative.join(entry.file_name());
        if file_type.is_dir() {
            walk_files(root, &child, out)?;
        } else if file_type.is_file() {
            out.push(child);
        } else {
            debug!(path = %root.join(&child).display(), "skipping non-regular file");
        }
    }
    Ok(())
}

/// Push `source` to `bucket` below `prefix`, creating the bucket if needed.
///
/// Per-file store errors are recorded in the report; only precondition
/// failures return `Err`.
pub async fn upload<S: ObjectStore>(
    store: &S,
    bucket: &str,
    source: &Path,
    prefix: &RemotePrefix,
) -> Result<TransferReport> {
    upload_in(store, bucket, Path::new(""), source, prefix).await
}

/// [`upload`] with relative sources read from `base_dir`.
pub async fn upload_in<S: ObjectStore>(
    store: &S,
    bucket: &str,
    base_dir: &Path,
    source: &Path,
    prefix: &RemotePrefix,
) -> Result<TransferReport> {
    let items = plan_upload_in(base_dir, source, prefix)?;

    if !store.bucket_exists(bucket).await? {
        info!(%bucket, "bucket not found, creating it");
        store
            .create_bucket(bucket)
            .await
            .map_err(|e| TransferError::CreateBucket {
                bucket: bucket.to_string(),
                source: e,
            })?;
    }

    let mut report = TransferReport::new(bucket, prefix);
    info!(
        source = %source.display(),
        location = %report.location,
        files = items.len(),
        "starting upload"
    );

    for item in &items {
        match store.put_file(bucket, &item.key, &item.local).await {
            Ok(()) => {
                debug!(key = %item.key, "uploaded");
                report.transferred += 1;
            }
            Err(e) => report.record_failure(&item.key, e),
        }
    }

    info!(
        uploaded = report.transferred,
        failed = report.failed.len(),
        "upload finished"
    );
    Ok(report)
}

/// Pull every object below `prefix` into `target`, mirroring the key layout.
pub async fn download<S: ObjectStore>(
    store: &S,
    bucket: &str,
    prefix: &RemotePrefix,
    target: &Path,
) -> Result<TransferReport> {
    if !store.bucket_exists(bucket).await? {
        return Err(TransferError::BucketMissing(bucket.to_string()));
    }

    std::fs::create_dir_all(target).map_err(|source| TransferError::LocalIo {
        path: target.to_path_buf(),
        source,
    })?;

    let mut report = TransferReport::new(bucket, prefix);
    let keys = store
        .list_keys(bucket, &prefix.key_prefix())
        .await
        .map_err(|e| TransferError::List {
            location: report.location.clone(),
            source: e,
        })?;

    if keys.is_empty() {
        info!(location = %report.location, "no files found");
        return Ok(report);
    }

    info!(
        location = %report.location,
        target = %target.display(),
        objects = keys.len(),
        "starting download"
    );

    for key in &keys {
        let Some(relative) = prefix.strip_key(key).and_then(safe_relative_path) else {
            warn!(%key, "skipping object outside a usable relative path");
            report.skipped += 1;
            continue;
        };
        let dest = target.join(&relative);
        if let Some(parent) = dest.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                report.record_failure(key, e);
                continue;
            }
        }
        match store.get_to_file(bucket, key, &dest).await {
            Ok(()) => {
                debug!(%key, dest = %dest.display(), "downloaded");
                report.transferred += 1;
            }
            Err(e) => report.record_failure(key, e),
        }
    }

    info!(
        downloaded = report.transferred,
        failed = report.failed.len(),
        skipped = report.skipped,
        "download finished"
    );
    Ok(report)
}

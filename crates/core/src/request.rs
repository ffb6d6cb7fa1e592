use std::fmt;
use std::path::{Path, PathBuf};

/// Bucket used when none is configured.
pub const DEFAULT_BUCKET: &str = "artifacts";

/// Region sent to S3-compatible endpoints that ignore it.
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Upload,
    Download,
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => f.write_str("upload"),
            Self::Download => f.write_str("download"),
        }
    }
}

/// Access/secret key pair. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// One invocation's worth of transfer parameters.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub mode: TransferMode,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub bucket: String,
    pub credentials: Credentials,
    pub endpoint: String,
    pub region: String,
    pub use_git: bool,
}

impl TransferRequest {
    /// The path that ends up below the git prefix on the remote side.
    pub fn remote_base(&self) -> &Path {
        match self.mode {
            TransferMode::Upload => &self.destination,
            TransferMode::Download => &self.source,
        }
    }

    /// The path on the local filesystem.
    pub fn local_path(&self) -> &Path {
        match self.mode {
            TransferMode::Upload => &self.source,
            TransferMode::Download => &self.destination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mode: TransferMode) -> TransferRequest {
        TransferRequest {
            mode,
            source: PathBuf::from("build/out"),
            destination: PathBuf::from("./"),
            bucket: DEFAULT_BUCKET.to_string(),
            credentials: Credentials {
                access_key: "minio".to_string(),
                secret_key: "hunter2".to_string(),
            },
            endpoint: "http://localhost:9000".to_string(),
            region: DEFAULT_REGION.to_string(),
            use_git: true,
        }
    }

    #[test]
    fn upload_maps_destination_to_remote() {
        let req = request(TransferMode::Upload);
        assert_eq!(req.remote_base(), Path::new("./"));
        assert_eq!(req.local_path(), Path::new("build/out"));
    }

    #[test]
    fn download_maps_source_to_remote() {
        let req = request(TransferMode::Download);
        assert_eq!(req.remote_base(), Path::new("build/out"));
        assert_eq!(req.local_path(), Path::new("./"));
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", request(TransferMode::Upload));
        assert!(rendered.contains("minio"));
        assert!(!rendered.contains("hunter2"));
    }
}

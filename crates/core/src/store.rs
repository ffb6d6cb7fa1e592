use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("bucket not found: {0}")]
    NoSuchBucket(String),

    #[error("object not found: {0}")]
    NoSuchKey(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{operation} failed: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    /// Wrap a backend SDK error for the named operation.
    pub fn backend(
        operation: &'static str,
        e: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            operation,
            source: Box::new(e),
        }
    }
}

/// The object-store operations the transfer executor needs.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError>;

    async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError>;

    /// Upload the file at `path` as `key`, overwriting any existing object.
    async fn put_file(&self, bucket: &str, key: &str, path: &Path) -> Result<(), StoreError>;

    /// Fetch `key` into `dest`. The parent directory must already exist.
    async fn get_to_file(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StoreError>;

    /// Every key starting with `prefix`, across all pages.
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StoreError>;
}

use crate::store::{ObjectStore, StoreError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Mutex;

/// In-memory [`ObjectStore`] for tests.
///
/// `fail_on("bucket/key")` makes every put/get of that object fail with a
/// backend error, which the executor must treat as a per-item failure.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: Mutex<BTreeMap<String, BTreeMap<String, Vec<u8>>>>,
    failing: Mutex<BTreeSet<String>>,
}

#[derive(Debug, thiserror::Error)]
#[error("injected failure for {0}")]
pub struct InjectedFailure(pub String);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with one empty bucket.
    pub fn with_bucket(bucket: &str) -> Self {
        let store = Self::default();
        store
            .buckets
            .lock()
            .unwrap()
            .insert(bucket.to_string(), BTreeMap::new());
        store
    }

    pub fn fail_on(&self, bucket_and_key: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert(bucket_and_key.to_string());
    }

    /// Insert an object directly, creating the bucket if needed.
    pub fn insert(&self, bucket: &str, key: &str, body: &[u8]) {
        self.buckets
            .lock()
            .unwrap()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), body.to_vec());
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.buckets.lock().unwrap().contains_key(bucket)
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .and_then(|objects| objects.get(key).cloned())
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn check_failure(&self, operation: &'static str, bucket: &str, key: &str) -> Result<(), StoreError> {
        let id = format!("{bucket}/{key}");
        if self.failing.lock().unwrap().contains(&id) {
            return Err(StoreError::backend(operation, InjectedFailure(id)));
        }
        Ok(())
    }
}

impl ObjectStore for MemoryStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        Ok(self.has_bucket(bucket))
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        self.buckets
            .lock()
            .unwrap()
            .entry(bucket.to_string())
            .or_default();
        Ok(())
    }

    async fn put_file(&self, bucket: &str, key: &str, path: &Path) -> Result<(), StoreError> {
        self.check_failure("PutObject", bucket, key)?;
        let body = std::fs::read(path)?;
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        objects.insert(key.to_string(), body);
        Ok(())
    }

    async fn get_to_file(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StoreError> {
        self.check_failure("GetObject", bucket, key)?;
        let body = {
            let buckets = self.buckets.lock().unwrap();
            let objects = buckets
                .get(bucket)
                .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
            objects
                .get(key)
                .cloned()
                .ok_or_else(|| StoreError::NoSuchKey(key.to_string()))?
        };
        std::fs::write(dest, body)?;
        Ok(())
    }

    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        let buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        Ok(objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

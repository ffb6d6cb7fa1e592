use std::path::Path;

use artsync_core::{Credentials, ObjectStore, StoreError, TransferRequest};
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::{ByteStream, Length};
use aws_sdk_s3::types::{
    BucketLocationConstraint, CompletedMultipartUpload, CompletedPart, CreateBucketConfiguration,
};
use aws_sdk_s3::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

/// Region that must not be sent as a bucket location constraint.
const US_EAST_1: &str = "us-east-1";

/// Files larger than this go through a multipart upload.
pub const MULTIPART_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Smallest part size sent. S3 rejects non-final parts under 5 MiB.
const MIN_PART_SIZE: u64 = 16 * 1024 * 1024;

/// S3 limit on parts per upload.
const MAX_PARTS: u64 = 10_000;

/// One byte range of a multipart upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PartRange {
    number: i32,
    offset: u64,
    length: u64,
}

/// Split `total` bytes into consecutive parts, numbered from 1.
fn part_ranges(total: u64) -> Vec<PartRange> {
    let part_size = MIN_PART_SIZE.max(total.div_ceil(MAX_PARTS));
    let mut parts = Vec::new();
    let mut offset = 0;
    let mut number = 1;
    while offset < total {
        let length = part_size.min(total - offset);
        parts.push(PartRange {
            number,
            offset,
            length,
        });
        offset += length;
        number += 1;
    }
    parts
}

/// [`ObjectStore`] backed by an S3-compatible endpoint (MinIO, AWS, ...).
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    region: String,
}

impl S3Store {
    /// Build a client for `endpoint` with static credentials.
    ///
    /// Path-style addressing is always on so bucket names never have to
    /// resolve as subdomains of the endpoint. SDK retries are disabled.
    pub async fn connect(endpoint: &str, credentials: &Credentials, region: &str) -> Self {
        let creds = aws_sdk_s3::config::Credentials::new(
            credentials.access_key.clone(),
            credentials.secret_key.clone(),
            None,
            None,
            "artsync",
        );
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.to_string()))
            .credentials_provider(creds)
            .endpoint_url(endpoint)
            .retry_config(RetryConfig::disabled())
            .load()
            .await;
        let config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(true)
            .build();

        debug!(%endpoint, %region, "s3 client configured");
        Self::from_client(Client::from_conf(config), region)
    }

    pub async fn from_request(request: &TransferRequest) -> Self {
        Self::connect(&request.endpoint, &request.credentials, &request.region).await
    }

    pub fn from_client(client: Client, region: &str) -> Self {
        Self {
            client,
            region: region.to_string(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    #[instrument(skip(self, path))]
    async fn put_multipart(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        size: u64,
    ) -> Result<(), StoreError> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_err("CreateMultipartUpload", e))?;
        let Some(upload_id) = created.upload_id().map(str::to_string) else {
            return Err(StoreError::backend(
                "CreateMultipartUpload",
                std::io::Error::other("response carried no upload id"),
            ));
        };

        let sent = self.send_parts(bucket, key, &upload_id, path, size).await;
        if sent.is_err() {
            if let Err(abort) = self
                .client
                .abort_multipart_upload()
                .bucket(bucket)
                .key(key)
                .upload_id(&upload_id)
                .send()
                .await
            {
                warn!(error = %DisplayErrorContext(&abort), "failed to abort multipart upload");
            }
        }
        sent
    }

    async fn send_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        path: &Path,
        size: u64,
    ) -> Result<(), StoreError> {
        let mut completed = Vec::new();
        for part in part_ranges(size) {
            let body = ByteStream::read_from()
                .path(path)
                .offset(part.offset)
                .length(Length::Exact(part.length))
                .build()
                .await
                .map_err(|e| StoreError::backend("open upload part", e))?;
            let resp = self
                .client
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part.number)
                .body(body)
                .send()
                .await
                .map_err(|e| sdk_err("UploadPart", e))?;
            debug!(part = part.number, bytes = part.length, "part uploaded");
            completed.push(
                CompletedPart::builder()
                    .part_number(part.number)
                    .set_e_tag(resp.e_tag().map(str::to_string))
                    .build(),
            );
        }

        self.client
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| sdk_err("CompleteMultipartUpload", e))?;
        Ok(())
    }
}

/// Flatten an SDK error, including its service message, into a [`StoreError`].
fn sdk_err<E, R>(operation: &'static str, err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    StoreError::Backend {
        operation,
        source: DisplayErrorContext(&err).to_string().into(),
    }
}

impl ObjectStore for S3Store {
    #[instrument(skip(self), fields(%bucket))]
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let not_found = err.as_service_error().is_some_and(|e| e.is_not_found())
                    || err
                        .raw_response()
                        .is_some_and(|raw| raw.status().as_u16() == 404);
                if not_found {
                    debug!("bucket does not exist");
                    Ok(false)
                } else {
                    Err(sdk_err("HeadBucket", err))
                }
            }
        }
    }

    #[instrument(skip(self), fields(%bucket))]
    async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let mut req = self.client.create_bucket().bucket(bucket);
        if self.region != US_EAST_1 {
            req = req.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        match req.send().await {
            Ok(_) => {
                debug!("bucket created");
                Ok(())
            }
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_bucket_already_owned_by_you()) =>
            {
                debug!("bucket already owned by caller");
                Ok(())
            }
            Err(err) => Err(sdk_err("CreateBucket", err)),
        }
    }

    #[instrument(skip(self), fields(%bucket, %key))]
    async fn put_file(&self, bucket: &str, key: &str, path: &Path) -> Result<(), StoreError> {
        let size = tokio::fs::metadata(path).await?.len();
        if size > MULTIPART_THRESHOLD {
            self.put_multipart(bucket, key, path, size).await?;
            debug!(path = %path.display(), size, "object uploaded in parts");
            return Ok(());
        }

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StoreError::backend("open upload body", e))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| sdk_err("PutObject", e))?;

        debug!(path = %path.display(), "object uploaded");
        Ok(())
    }

    #[instrument(skip(self), fields(%bucket, %key))]
    async fn get_to_file(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StoreError> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                    StoreError::NoSuchKey(key.to_string())
                } else {
                    sdk_err("GetObject", err)
                }
            })?;

        let mut body = resp.body;
        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0usize;
        let copied: Result<(), StoreError> = async {
            while let Some(chunk) = body
                .try_next()
                .await
                .map_err(|e| StoreError::backend("read GetObject body", e))?
            {
                file.write_all(&chunk).await?;
                written += chunk.len();
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        if let Err(e) = copied {
            drop(file);
            let _ = tokio::fs::remove_file(dest).await;
            return Err(e);
        }

        debug!(path = %dest.display(), bytes = written, "object downloaded");
        Ok(())
    }

    /// Automatically paginates through all results.
    #[instrument(skip(self), fields(%bucket, %prefix))]
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self.client.list_objects_v2().bucket(bucket);
            if !prefix.is_empty() {
                req = req.prefix(prefix);
            }
            if let Some(ref token) = continuation_token {
                req = req.continuation_token(token);
            }

            let resp = req.send().await.map_err(|err| {
                if err.as_service_error().is_some_and(|e| e.is_no_such_bucket()) {
                    StoreError::NoSuchBucket(bucket.to_string())
                } else {
                    sdk_err("ListObjectsV2", err)
                }
            })?;

            for obj in resp.contents() {
                if let Some(k) = obj.key() {
                    keys.push(k.to_string());
                }
            }

            match resp.next_continuation_token() {
                Some(token) if resp.is_truncated() == Some(true) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        debug!(count = keys.len(), "listed objects");
        Ok(keys)
    }
}

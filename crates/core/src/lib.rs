pub mod key;
pub mod repo_name;
pub mod request;
pub mod store;
pub mod transfer;

pub use key::{RemotePrefix, SHA_SEGMENT_PREFIX, SHORT_HASH_LEN};
pub use request::{
    Credentials, TransferMode, TransferRequest, DEFAULT_BUCKET, DEFAULT_REGION,
};
pub use store::{ObjectStore, StoreError};
pub use transfer::{download, upload, TransferError, TransferFailure, TransferReport};

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub mod error;
pub mod ops;
pub mod resolve;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{GitError, Result};
pub use ops::GitContext;
pub use resolve::{resolve_prefix, ResolveOptions, DETACHED_BRANCH};

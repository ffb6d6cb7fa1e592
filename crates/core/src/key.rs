use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Marker placed in front of the short commit hash segment.
pub const SHA_SEGMENT_PREFIX: &str = "SHA-";

/// Number of hex characters kept from a commit id.
pub const SHORT_HASH_LEN: usize = 7;

/// An ordered list of object-key segments shared by every key of a run.
///
/// Segments are never empty and never `.` or `..`. Rendering always uses `/`
/// regardless of the host path separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RemotePrefix {
    segments: Vec<String>,
}

impl RemotePrefix {
    /// The bucket root (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a prefix from a local path, normalizing it lexically.
    pub fn from_path(path: &Path) -> Self {
        let mut prefix = Self::root();
        prefix.push_path(path);
        prefix
    }

    /// Append a `/`-separated segment string.
    pub fn push_segment(&mut self, raw: &str) {
        for part in raw.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    self.segments.pop();
                }
                other => self.segments.push(other.to_string()),
            }
        }
    }

    /// Append the normal components of a local path. `..` pops, root and
    /// drive prefixes are dropped.
    pub fn push_path(&mut self, path: &Path) {
        for component in path.components() {
            match component {
                Component::Normal(part) => self.push_segment(&part.to_string_lossy()),
                Component::ParentDir => {
                    self.segments.pop();
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
    }

    /// Return a new prefix with `other` appended.
    pub fn join(&self, other: &RemotePrefix) -> Self {
        let mut joined = self.clone();
        joined.segments.extend(other.segments.iter().cloned());
        joined
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Key prefix used for listing: `a/b/` or the empty string at the root.
    pub fn key_prefix(&self) -> String {
        if self.segments.is_empty() {
            String::new()
        } else {
            format!("{}/", self.segments.join("/"))
        }
    }

    /// Full object key for a relative path below this prefix.
    pub fn object_key(&self, relative: &Path) -> String {
        self.join(&Self::from_path(relative)).to_string()
    }

    /// Strip this prefix from `key`, returning the remainder.
    ///
    /// Matching is per segment: `a/b` does not match `a/bc/file`.
    pub fn strip_key<'k>(&self, key: &'k str) -> Option<&'k str> {
        key.strip_prefix(self.key_prefix().as_str())
    }
}

impl fmt::Display for RemotePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Name under which an uploaded directory appears below the prefix.
///
/// A relative source keeps its normalized path (`./build/out/` becomes
/// `build/out`). An absolute source, or one that climbs with `..`, keeps only
/// its final component.
pub fn source_key_name(source: &Path) -> RemotePrefix {
    let escapes = source.is_absolute()
        || source
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
    if !escapes {
        return RemotePrefix::from_path(source);
    }
    let mut prefix = RemotePrefix::root();
    if let Some(name) = source.file_name() {
        prefix.push_segment(&name.to_string_lossy());
    }
    prefix
}

/// Convert the part of an object key below a prefix into a local relative
/// path. Returns `None` for directory markers and anything that would leave
/// the target directory.
pub fn safe_relative_path(relative_key: &str) -> Option<PathBuf> {
    if relative_key.is_empty() || relative_key.ends_with('/') {
        return None;
    }
    let mut path = PathBuf::new();
    for part in relative_key.split('/') {
        if part.is_empty() || part == "." || part == ".." || part.contains('\\') {
            return None;
        }
        path.push(part);
    }
    Some(path)
}

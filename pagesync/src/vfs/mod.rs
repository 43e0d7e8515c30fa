//! Virtual file storage interface.
//!
//! The projector materializes remote records through [`VirtualFs`] and never
//! touches storage directly. Paths are [`VirtualPath`]s: absolute,
//! `/`-separated, with no empty, `.` or `..` segments.
//!
//! Two stores ship with the crate:
//!
//! - [`MemoryFs`] keeps everything in memory (embedding, tests)
//! - [`DiskFs`] maps virtual paths below a local root directory

mod disk;
mod memory;

use std::fmt;
use std::io;

use thiserror::Error;

pub use disk::DiskFs;
pub use memory::MemoryFs;

/// Errors from a virtual filesystem.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("file not found: {0}")]
    NotFound(VirtualPath),

    #[error("file already exists: {0}")]
    AlreadyExists(VirtualPath),

    #[error("parent directory does not exist: {0}")]
    ParentNotFound(VirtualPath),

    #[error("not a directory: {0}")]
    NotADirectory(VirtualPath),

    #[error("is a directory: {0}")]
    IsADirectory(VirtualPath),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: VirtualPath,
        #[source]
        source: io::Error,
    },
}

/// Absolute path inside the virtual filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualPath(String);

impl VirtualPath {
    /// The filesystem root, `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Normalize a path: collapse repeated separators, drop `.` and `..`.
    pub fn new(path: &str) -> Self {
        Self::root().join(path)
    }

    /// Append one or more `/`-separated segments.
    pub fn join(&self, segments: &str) -> Self {
        let mut joined = self.0.trim_end_matches('/').to_string();
        for segment in segments
            .split('/')
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        {
            joined.push('/');
            joined.push_str(segment);
        }
        if joined.is_empty() {
            return Self::root();
        }
        Self(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Path segments below the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Final segment, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Containing directory; `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VirtualPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Flags for [`VirtualFs::write_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Create the file when missing.
    pub create: bool,
    /// Replace the file when present.
    pub overwrite: bool,
}

impl WriteOptions {
    /// Create when missing, replace when present.
    pub const fn upsert() -> Self {
        Self {
            create: true,
            overwrite: true,
        }
    }
}

/// Storage primitive consumed by the projector.
pub trait VirtualFs: Send + Sync {
    /// Create a directory and any missing ancestors.
    fn create_directory(&self, path: &VirtualPath) -> Result<(), FsError>;

    /// Write a file. The parent directory must exist.
    fn write_file(&self, path: &VirtualPath, content: &[u8], options: WriteOptions) -> Result<(), FsError>;
}

impl<F: VirtualFs + ?Sized> VirtualFs for std::sync::Arc<F> {
    fn create_directory(&self, path: &VirtualPath) -> Result<(), FsError> {
        (**self).create_directory(path)
    }

    fn write_file(&self, path: &VirtualPath, content: &[u8], options: WriteOptions) -> Result<(), FsError> {
        (**self).write_file(path, content, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(VirtualPath::new("a//b/./c/").as_str(), "/a/b/c");
        assert_eq!(VirtualPath::new("").as_str(), "/");
        assert_eq!(VirtualPath::new("../../etc").as_str(), "/etc");
    }

    #[test]
    fn test_join_and_parent() {
        let site = VirtualPath::new("/site");
        let file = site.join("web-pages/home/home.en-US.webpage.copy.html");
        assert_eq!(file.as_str(), "/site/web-pages/home/home.en-US.webpage.copy.html");
        assert_eq!(file.file_name(), Some("home.en-US.webpage.copy.html"));
        assert_eq!(file.parent().unwrap().as_str(), "/site/web-pages/home");
        assert_eq!(site.parent(), Some(VirtualPath::root()));
        assert_eq!(VirtualPath::root().parent(), None);
    }

    #[test]
    fn test_segments() {
        let path = VirtualPath::new("/a/b");
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(VirtualPath::root().segments().count(), 0);
    }
}

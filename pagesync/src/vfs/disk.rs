//! Disk-backed virtual filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use super::{FsError, VirtualFs, VirtualPath, WriteOptions};

/// Maps virtual paths below a local root directory.
#[derive(Debug, Clone)]
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path backing a virtual path.
    pub fn local_path(&self, path: &VirtualPath) -> PathBuf {
        path.segments()
            .fold(self.root.clone(), |local, segment| local.join(segment))
    }

    fn io_error(path: &VirtualPath, source: std::io::Error) -> FsError {
        FsError::Io {
            path: path.clone(),
            source,
        }
    }
}

impl VirtualFs for DiskFs {
    fn create_directory(&self, path: &VirtualPath) -> Result<(), FsError> {
        let local = self.local_path(path);
        if local.is_file() {
            return Err(FsError::NotADirectory(path.clone()));
        }
        fs::create_dir_all(&local).map_err(|e| Self::io_error(path, e))
    }

    fn write_file(&self, path: &VirtualPath, content: &[u8], options: WriteOptions) -> Result<(), FsError> {
        let local = self.local_path(path);

        let parent_is_dir = local.parent().map(Path::is_dir).unwrap_or(false);
        if !parent_is_dir {
            return Err(FsError::ParentNotFound(path.clone()));
        }
        if local.is_dir() {
            return Err(FsError::IsADirectory(path.clone()));
        }

        let exists = local.exists();
        if exists && !options.overwrite {
            return Err(FsError::AlreadyExists(path.clone()));
        }
        if !exists && !options.create {
            return Err(FsError::NotFound(path.clone()));
        }

        fs::write(&local, content).map_err(|e| Self::io_error(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_mapping() {
        let fs = DiskFs::new("/tmp/out");
        assert_eq!(
            fs.local_path(&VirtualPath::new("/site/web-pages/home")),
            PathBuf::from("/tmp/out/site/web-pages/home")
        );
    }

    #[test]
    fn test_write_creates_file_on_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fs = DiskFs::new(temp_dir.path());

        fs.create_directory(&VirtualPath::new("/site/web-pages")).unwrap();
        let file = VirtualPath::new("/site/web-pages/home.html");
        fs.write_file(&file, b"<p>hi</p>", WriteOptions::upsert()).unwrap();

        let written = std::fs::read(temp_dir.path().join("site/web-pages/home.html")).unwrap();
        assert_eq!(written, b"<p>hi</p>");
    }

    #[test]
    fn test_write_without_parent_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fs = DiskFs::new(temp_dir.path());

        let result = fs.write_file(&VirtualPath::new("/nope/file.txt"), b"x", WriteOptions::upsert());
        assert!(matches!(result, Err(FsError::ParentNotFound(_))));
    }

    #[test]
    fn test_no_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fs = DiskFs::new(temp_dir.path());
        let file = VirtualPath::new("/file.txt");

        fs.write_file(&file, b"a", WriteOptions::upsert()).unwrap();
        let result = fs.write_file(
            &file,
            b"b",
            WriteOptions {
                create: true,
                overwrite: false,
            },
        );
        assert!(matches!(result, Err(FsError::AlreadyExists(_))));
    }
}

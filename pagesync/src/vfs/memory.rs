//! In-memory virtual filesystem.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::{FsError, VirtualFs, VirtualPath, WriteOptions};

#[derive(Debug, Clone)]
enum Node {
    Directory,
    File(Vec<u8>),
}

/// Virtual filesystem held entirely in memory.
#[derive(Debug)]
pub struct MemoryFs {
    nodes: RwLock<BTreeMap<VirtualPath, Node>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    /// Create a filesystem containing only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(VirtualPath::root(), Node::Directory);
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    pub fn read_file(&self, path: &VirtualPath) -> Result<Vec<u8>, FsError> {
        match self.nodes.read().get(path) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Directory) => Err(FsError::IsADirectory(path.clone())),
            None => Err(FsError::NotFound(path.clone())),
        }
    }

    pub fn is_dir(&self, path: &VirtualPath) -> bool {
        matches!(self.nodes.read().get(path), Some(Node::Directory))
    }

    pub fn exists(&self, path: &VirtualPath) -> bool {
        self.nodes.read().contains_key(path)
    }

    /// All file paths, sorted.
    pub fn files(&self) -> Vec<VirtualPath> {
        self.nodes
            .read()
            .iter()
            .filter(|(_, node)| matches!(node, Node::File(_)))
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// All directory paths except the root, sorted.
    pub fn directories(&self) -> Vec<VirtualPath> {
        self.nodes
            .read()
            .iter()
            .filter(|(path, node)| matches!(node, Node::Directory) && !path.is_root())
            .map(|(path, _)| path.clone())
            .collect()
    }
}

impl VirtualFs for MemoryFs {
    fn create_directory(&self, path: &VirtualPath) -> Result<(), FsError> {
        let mut nodes = self.nodes.write();

        let mut current = VirtualPath::root();
        for segment in path.segments() {
            current = current.join(segment);
            match nodes.get(&current) {
                Some(Node::Directory) => {}
                Some(Node::File(_)) => return Err(FsError::NotADirectory(current)),
                None => {
                    nodes.insert(current.clone(), Node::Directory);
                }
            }
        }
        Ok(())
    }

    fn write_file(&self, path: &VirtualPath, content: &[u8], options: WriteOptions) -> Result<(), FsError> {
        let mut nodes = self.nodes.write();

        let parent = path.parent().ok_or_else(|| FsError::IsADirectory(path.clone()))?;
        match nodes.get(&parent) {
            Some(Node::Directory) => {}
            Some(Node::File(_)) => return Err(FsError::NotADirectory(parent)),
            None => return Err(FsError::ParentNotFound(path.clone())),
        }

        match nodes.get(path) {
            Some(Node::Directory) => return Err(FsError::IsADirectory(path.clone())),
            Some(Node::File(_)) if !options.overwrite => {
                return Err(FsError::AlreadyExists(path.clone()))
            }
            None if !options.create => return Err(FsError::NotFound(path.clone())),
            _ => {}
        }

        nodes.insert(path.clone(), Node::File(content.to_vec()));
        Ok(())
    }
}

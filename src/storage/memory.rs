//! In-memory filesystem used by the unit tests.
//!
//! Every trait call bumps a counter so tests can assert that a command never
//! reached the filesystem.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::StorageError;
use crate::storage::filesystem::FileSystem;
use crate::storage::results::DirEntry;

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

type Entries = Arc<Mutex<BTreeMap<PathBuf, Node>>>;

#[derive(Debug, Clone)]
pub struct MemoryFs {
    entries: Entries,
    calls: Arc<AtomicUsize>,
}

impl MemoryFs {
    /// Creates a filesystem holding only the directory `root` and its ancestors.
    pub fn new(root: &Path) -> Self {
        let fs = Self {
            entries: Arc::new(Mutex::new(BTreeMap::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        };
        fs.insert_dir(root);
        fs
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn insert_dir(&self, path: &Path) {
        let mut entries = self.entries.lock().unwrap();
        for ancestor in path.ancestors() {
            entries.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }

    pub fn insert_file(&self, path: &Path, contents: &[u8]) {
        if let Some(parent) = path.parent() {
            self.insert_dir(parent);
        }
        self.entries
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), Node::File(contents.to_vec()));
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        match self.entries.lock().unwrap().get(path) {
            Some(Node::File(data)) => Some(data.clone()),
            _ => None,
        }
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MemoryWriter {
    path: PathBuf,
    entries: Entries,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(&self.path) {
            Some(Node::File(data)) => {
                data.extend_from_slice(buf);
                Ok(buf.len())
            }
            _ => Err(io::Error::new(io::ErrorKind::NotFound, "file removed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FileSystem for MemoryFs {
    type Writer = MemoryWriter;

    fn file_exists(&self, path: &Path) -> bool {
        self.touch();
        matches!(self.entries.lock().unwrap().get(path), Some(Node::File(_)))
    }

    fn dir_exists(&self, path: &Path) -> bool {
        self.touch();
        matches!(self.entries.lock().unwrap().get(path), Some(Node::Dir))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>, StorageError> {
        self.touch();
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(Node::Dir) => {}
            Some(Node::File(_)) => return Err(StorageError::NotADirectory(path.to_path_buf())),
            None => return Err(StorageError::NotFound(path.to_path_buf())),
        }

        Ok(entries
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .map(|(p, node)| DirEntry {
                name: p
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                size: match node {
                    Node::File(data) => data.len() as u64,
                    Node::Dir => 0,
                },
                is_dir: matches!(node, Node::Dir),
            })
            .collect())
    }

    fn create_file(&self, path: &Path) -> Result<Self::Writer, StorageError> {
        self.touch();
        let mut entries = self.entries.lock().unwrap();
        let parent_is_dir = path
            .parent()
            .is_some_and(|parent| matches!(entries.get(parent), Some(Node::Dir)));
        if !parent_is_dir {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        if matches!(entries.get(path), Some(Node::Dir)) {
            return Err(StorageError::AlreadyExists(path.to_path_buf()));
        }
        entries.insert(path.to_path_buf(), Node::File(Vec::new()));

        Ok(MemoryWriter {
            path: path.to_path_buf(),
            entries: Arc::clone(&self.entries),
        })
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        self.touch();
        match self.entries.lock().unwrap().get(path) {
            Some(Node::File(data)) => Ok(data.clone()),
            _ => Err(StorageError::NotFound(path.to_path_buf())),
        }
    }

    fn delete_file(&self, path: &Path) -> Result<(), StorageError> {
        self.touch();
        match self.entries.lock().unwrap().remove(path) {
            Some(Node::File(_)) => Ok(()),
            _ => Err(StorageError::NotFound(path.to_path_buf())),
        }
    }

    fn create_dir(&self, path: &Path) -> Result<(), StorageError> {
        self.touch();
        self.insert_dir(path);
        Ok(())
    }

    fn delete_dir(&self, path: &Path, recursive: bool) -> Result<(), StorageError> {
        self.touch();
        let mut entries = self.entries.lock().unwrap();
        let has_children = entries.keys().any(|p| p.parent() == Some(path));
        if has_children && !recursive {
            return Err(StorageError::IoError(io::Error::other("directory not empty")));
        }
        entries.retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    fn parent_of(&self, path: &Path) -> Result<PathBuf, StorageError> {
        self.touch();
        path.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| StorageError::NoParent(path.to_path_buf()))
    }
}

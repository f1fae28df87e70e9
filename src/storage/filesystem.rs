//! File system operations
//!
//! The filesystem collaborator used by the session, and its `std::fs`
//! implementation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::storage::results::DirEntry;

/// Filesystem operations needed by the command handlers.
///
/// Implementations serialize their own operations; the session issues one
/// call at a time.
pub trait FileSystem: Send + Sync {
    /// Writer returned by `create_file`. Uploads drive it from the blocking pool.
    type Writer: Write + Send + 'static;

    fn file_exists(&self, path: &Path) -> bool;
    fn dir_exists(&self, path: &Path) -> bool;
    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>, StorageError>;
    /// Creates the file, truncating it if it already exists.
    fn create_file(&self, path: &Path) -> Result<Self::Writer, StorageError>;
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, StorageError>;
    fn delete_file(&self, path: &Path) -> Result<(), StorageError>;
    fn create_dir(&self, path: &Path) -> Result<(), StorageError>;
    fn delete_dir(&self, path: &Path, recursive: bool) -> Result<(), StorageError>;
    fn parent_of(&self, path: &Path) -> Result<PathBuf, StorageError>;
}

/// Local disk backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    type Writer = fs::File;

    fn file_exists(&self, path: &Path) -> bool {
        path.exists() && path.is_file()
    }

    fn dir_exists(&self, path: &Path) -> bool {
        path.exists() && path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>, StorageError> {
        if !path.exists() {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(StorageError::NotADirectory(path.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                size: if metadata.is_dir() { 0 } else { metadata.len() },
                is_dir: metadata.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(entries)
    }

    fn create_file(&self, path: &Path) -> Result<Self::Writer, StorageError> {
        Ok(fs::File::create(path)?)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        if !self.file_exists(path) {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        Ok(fs::read(path)?)
    }

    fn delete_file(&self, path: &Path) -> Result<(), StorageError> {
        Ok(fs::remove_file(path)?)
    }

    fn create_dir(&self, path: &Path) -> Result<(), StorageError> {
        Ok(fs::create_dir_all(path)?)
    }

    fn delete_dir(&self, path: &Path, recursive: bool) -> Result<(), StorageError> {
        if recursive {
            Ok(fs::remove_dir_all(path)?)
        } else {
            Ok(fs::remove_dir(path)?)
        }
    }

    fn parent_of(&self, path: &Path) -> Result<PathBuf, StorageError> {
        path.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| StorageError::NoParent(path.to_path_buf()))
    }
}

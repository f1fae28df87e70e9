//! Storage operations
//!
//! Handles the filesystem side of MKD, RMD, DELE and the LIST line format.

use log::info;
use std::path::Path;

use crate::error::StorageError;
use crate::storage::filesystem::FileSystem;
use crate::storage::results::DirEntry;

/// Creates `target` unless something already exists there.
pub fn make_directory<F: FileSystem>(fs: &F, target: &Path) -> Result<(), StorageError> {
    if fs.dir_exists(target) || fs.file_exists(target) {
        return Err(StorageError::AlreadyExists(target.to_path_buf()));
    }

    fs.create_dir(target)?;
    info!("Created directory {}", target.display());
    Ok(())
}

/// Recursively removes the directory `target`.
pub fn remove_directory<F: FileSystem>(fs: &F, target: &Path) -> Result<(), StorageError> {
    if !fs.dir_exists(target) {
        return Err(StorageError::NotFound(target.to_path_buf()));
    }

    fs.delete_dir(target, true)?;
    info!("Removed directory {}", target.display());
    Ok(())
}

/// Deletes the file `target`.
pub fn delete_file<F: FileSystem>(fs: &F, target: &Path) -> Result<(), StorageError> {
    if !fs.file_exists(target) {
        return Err(StorageError::NotFound(target.to_path_buf()));
    }

    fs.delete_file(target)?;
    info!("Deleted file {}", target.display());
    Ok(())
}

/// Renders a directory listing in the fixed `ls -l` style sent over the
/// data connection. Permission bits, owner and date are constants.
pub fn format_listing(entries: &[DirEntry]) -> String {
    let mut listing = String::new();
    for entry in entries {
        listing.push(if entry.is_dir { 'd' } else { '-' });
        listing.push_str("rwxrwxrwx 1 unknown unknown ");
        listing.push_str(&entry.size.to_string());
        listing.push_str(" Jan 1 09:00 ");
        listing.push_str(&entry.name);
        listing.push_str("\r\n");
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryFs;
    use std::path::PathBuf;

    fn root() -> PathBuf {
        PathBuf::from("/srv")
    }

    #[test]
    fn test_make_directory_fresh_and_existing() {
        let fs = MemoryFs::new(&root());
        let target = root().join("new");

        make_directory(&fs, &target).unwrap();
        assert!(fs.dir_exists(&target));

        let result = make_directory(&fs, &target);
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[test]
    fn test_make_directory_over_file_fails() {
        let fs = MemoryFs::new(&root());
        fs.insert_file(&root().join("f"), b"x");
        assert!(make_directory(&fs, &root().join("f")).is_err());
        assert_eq!(fs.contents(&root().join("f")), Some(b"x".to_vec()));
    }

    #[test]
    fn test_remove_directory_is_recursive() {
        let fs = MemoryFs::new(&root());
        fs.insert_file(&root().join("d/inner/f"), b"x");

        remove_directory(&fs, &root().join("d")).unwrap();
        assert!(!fs.dir_exists(&root().join("d")));
        assert!(!fs.file_exists(&root().join("d/inner/f")));
    }

    #[test]
    fn test_remove_missing_directory() {
        let fs = MemoryFs::new(&root());
        let result = remove_directory(&fs, &root().join("missing"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_delete_file() {
        let fs = MemoryFs::new(&root());
        fs.insert_file(&root().join("f"), b"x");

        delete_file(&fs, &root().join("f")).unwrap();
        assert!(!fs.file_exists(&root().join("f")));
        assert!(delete_file(&fs, &root().join("f")).is_err());
    }

    #[test]
    fn test_format_listing() {
        let entries = vec![
            DirEntry {
                name: "docs".into(),
                size: 0,
                is_dir: true,
            },
            DirEntry {
                name: "a.txt".into(),
                size: 42,
                is_dir: false,
            },
        ];
        assert_eq!(
            format_listing(&entries),
            "drwxrwxrwx 1 unknown unknown 0 Jan 1 09:00 docs\r\n\
             -rwxrwxrwx 1 unknown unknown 42 Jan 1 09:00 a.txt\r\n"
        );
    }
}

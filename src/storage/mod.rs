//! File system storage management
//!
//! The filesystem collaborator and the file/directory operations built on it.

pub mod filesystem;
#[cfg(test)]
pub(crate) mod memory;
pub mod operations;
pub mod results;

pub use filesystem::{FileSystem, LocalFs};
pub use results::DirEntry;

//! Navigate module
//!
//! Handles root-confined path resolution and working-directory changes.

mod operations;

// Re-export public types and functions
pub use operations::{change_directory, change_to_parent, print_working_directory, resolve_path};

//! Navigation operations implementation

use log::{debug, info};
use std::ffi::OsString;
use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

use crate::error::{FtpServerError, NavigateError};
use crate::storage::FileSystem;

/// Resolves a command argument to a path confined to `base`.
///
/// An argument starting with the root marker is taken relative to `base`,
/// anything else relative to `current`. `.` is skipped and `..` pops one
/// level; climbing above `base` is rejected.
pub fn resolve_path(base: &Path, current: &Path, argument: &str) -> Result<PathBuf, NavigateError> {
    let rooted = argument.starts_with(MAIN_SEPARATOR) || argument.starts_with('/');

    let mut stack: Vec<OsString> = if rooted {
        Vec::new()
    } else {
        current
            .strip_prefix(base)
            .map_err(|_| NavigateError::PathTraversal(current.display().to_string()))?
            .components()
            .map(|c| c.as_os_str().to_os_string())
            .collect()
    };

    for component in Path::new(argument).components() {
        match component {
            Component::Normal(part) => stack.push(part.to_os_string()),
            Component::ParentDir => {
                if stack.pop().is_none() {
                    return Err(NavigateError::PathTraversal(argument.to_string()));
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    let mut resolved = base.to_path_buf();
    resolved.extend(stack);
    debug!("Resolved '{}' to {}", argument, resolved.display());
    Ok(resolved)
}

/// Changes the working directory, returning the new current directory.
pub fn change_directory<F: FileSystem>(
    fs: &F,
    base: &Path,
    current: &Path,
    target_path: &str,
) -> Result<PathBuf, NavigateError> {
    let target = resolve_path(base, current, target_path)?;

    if !fs.dir_exists(&target) {
        return Err(NavigateError::DirectoryNotFound(target));
    }

    info!("Changed directory to {}", target.display());
    Ok(target)
}

/// Moves to the parent of `current`; refused at the base directory.
pub fn change_to_parent<F: FileSystem>(
    fs: &F,
    base: &Path,
    current: &Path,
) -> Result<PathBuf, FtpServerError> {
    if current == base || !current.starts_with(base) {
        return Err(NavigateError::AtRoot.into());
    }

    let parent = fs.parent_of(current)?;
    info!("Changed directory up to {}", parent.display());
    Ok(parent)
}

/// Current directory as the client sees it: slash-rooted, relative to `base`.
pub fn print_working_directory(base: &Path, current: &Path) -> String {
    let relative: Vec<String> = current
        .strip_prefix(base)
        .map(|rest| {
            rest.components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();

    format!("/{}", relative.join("/"))
}

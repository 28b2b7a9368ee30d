//! File system helpers shared by the install and update workflows

use crate::Result;
use std::fs;
use std::path::Path;

/// Create a directory (and parents) if it does not exist yet
pub fn ensure_dir<P: AsRef<Path>>(dir: P) -> Result<()> {
    let dir = dir.as_ref();
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| crate::HubError::file_system(dir, e))?;
    }
    Ok(())
}

/// Copy a single file, creating the destination's parent directories
pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dest: Q) -> Result<()> {
    let dest = dest.as_ref();
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src.as_ref(), dest).map_err(|e| crate::HubError::file_system(dest, e))?;
    Ok(())
}

/// Check whether a path is a symbolic link (without following it)
pub fn is_symlink<P: AsRef<Path>>(path: P) -> bool {
    fs::symlink_metadata(path.as_ref())
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Create a symlink at `link`, replacing any existing file, link, or directory
#[cfg(unix)]
pub fn create_symlink<P: AsRef<Path>, Q: AsRef<Path>>(target: P, link: Q) -> Result<()> {
    let link = link.as_ref();
    if let Some(parent) = link.parent() {
        ensure_dir(parent)?;
    }
    if link.exists() || is_symlink(link) {
        remove_path(link)?;
    }
    std::os::unix::fs::symlink(target.as_ref(), link)
        .map_err(|e| crate::HubError::file_system(link, e))?;
    Ok(())
}

#[cfg(not(unix))]
pub fn create_symlink<P: AsRef<Path>, Q: AsRef<Path>>(_target: P, _link: Q) -> Result<()> {
    Err(crate::HubError::unknown(
        "symlinks are not supported on this platform; use copy mode",
    ))
}

/// Remove a file, symlink, or directory tree; missing paths are not an error
pub fn remove_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if is_symlink(path) || path.is_file() {
        fs::remove_file(path).map_err(|e| crate::HubError::file_system(path, e))?;
    } else if path.is_dir() {
        fs::remove_dir_all(path).map_err(|e| crate::HubError::file_system(path, e))?;
    }
    Ok(())
}

/// Count regular files under a directory, recursively
pub fn count_files<P: AsRef<Path>>(dir: P) -> usize {
    walkdir::WalkDir::new(dir.as_ref())
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}

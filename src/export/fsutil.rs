//! Filesystem helpers for package export

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{ExportError, Result};

/// Copy a directory tree into `dst`, creating it as needed
///
/// Existing files in `dst` are overwritten; extra files already present are
/// left alone. Fails with [`ExportError::PathNotFound`] when `src` does not
/// exist.
pub fn copy_dir_recursive(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if !src.exists() {
        return Err(ExportError::PathNotFound {
            path: src.to_path_buf(),
        });
    }
    fs::create_dir_all(dst)?;

    for entry in WalkDir::new(src) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .expect("walked path is under its root");
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

use ignore::WalkBuilder;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::core::error::{Error, ErrorKind, Result};

/// True for files whose final path segment ends in `.txt` or `.text`,
/// compared case-insensitively.
pub fn is_text_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| {
            let name = name.to_lowercase();
            name.ends_with(".txt") || name.ends_with(".text")
        })
        .unwrap_or(false)
}

/// Collects the indexable files under `root` depth-first.
///
/// Directories are filtered by [`is_text_file`]; a `root` that is itself
/// a file is returned as-is, extension notwithstanding. Paths come back
/// canonicalized so locations are absolute and stable.
pub fn walk(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(Error::new(
            ErrorKind::NotFound,
            format!("input path {} does not exist", root.display()),
        ));
    }
    if root.is_file() {
        return Ok(vec![canonical(root)]);
    }

    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).standard_filters(false).build() {
        match entry {
            Ok(entry) => {
                let is_file = entry.file_type().is_some_and(|kind| kind.is_file());
                if is_file && is_text_file(entry.path()) {
                    files.push(canonical(entry.path()));
                }
            }
            Err(err) => warn!("skipping unreadable entry under {}: {}", root.display(), err),
        }
    }
    Ok(files)
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|err| {
        debug!("could not canonicalize {}: {}", path.display(), err);
        path.to_path_buf()
    })
}

//! PPD collection lookup: comma-separated search paths, recursive
//! discovery of `.ppd` files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Split a comma-separated path list, trimming blanks and dropping
/// duplicates while preserving order.
pub fn split_paths(spec: &str) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let path = PathBuf::from(part);
        if !out.contains(&path) {
            out.push(path);
        }
    }
    out
}

/// Recursively collect every `.ppd` file (case-insensitive extension)
/// under the given roots, sorted for a deterministic scan order. An
/// unreadable subtree is skipped with a warning rather than aborting the
/// whole discovery.
pub fn find_ppds(roots: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for root in roots {
        walk(root, &mut found)?;
    }
    found.sort();
    found.dedup();
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> io::Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "skipping unreadable PPD directory");
            return Ok(());
        }
    };
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&path, found)?;
        } else if file_type.is_file() && has_ppd_extension(&path) {
            found.push(path);
        }
    }
    Ok(())
}

fn has_ppd_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ppd"))
}

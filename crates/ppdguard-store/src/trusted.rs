use crate::record::HashRecord;
use crate::StoreError;
use std::collections::HashSet;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Group-writable bit.
const S_IWGRP: u32 = 0o020;
/// World-writable bit.
const S_IWOTH: u32 = 0o002;
/// Setuid bit.
const S_ISUID: u32 = 0o4000;

/// Filtering rules applied to entries of a trusted hash directory before
/// their contents are loaded.
///
/// `require_root_owned` is on for the system/user hash directories an
/// administrator populates; tests and unprivileged callers can relax it.
#[derive(Debug, Clone, Copy)]
pub struct LoadPolicy {
    pub require_root_owned: bool,
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self {
            require_root_owned: true,
        }
    }
}

/// Read-only set of vetted hash records.
///
/// The store only answers membership questions; it never decides trust.
/// Which directories count as trusted is the caller's choice.
#[derive(Debug, Default)]
pub struct TrustedHashStore {
    records: HashSet<HashRecord>,
}

impl TrustedHashStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from pre-vetted record lines. Invalid lines are
    /// skipped with a warning; they never poison the set.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        for line in lines {
            store.add_line(line.as_ref());
        }
        store
    }

    /// Load every safe file in `dir`, one record per line. A missing or
    /// unreadable directory is skipped with a warning, matching the
    /// tolerance of the original tool for absent hash directories.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>, policy: LoadPolicy) {
        let dir = dir.as_ref();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping trusted hash directory");
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !entry_is_safe(&path, policy) {
                debug!(path = %path.display(), "skipping unsafe trusted hash entry");
                continue;
            }
            if let Err(e) = self.load_file(&path) {
                warn!(path = %path.display(), error = %e, "skipping unreadable hash file");
            }
        }
    }

    /// Load several directories in order (e.g. system then user).
    pub fn load_dirs<I, P>(dirs: I, policy: LoadPolicy) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut store = Self::new();
        for dir in dirs {
            store.load_dir(dir, policy);
        }
        store
    }

    /// Add an already-validated record, e.g. from a previous output file
    /// that later runs must not duplicate.
    pub fn insert(&mut self, record: HashRecord) {
        self.records.insert(record);
    }

    pub fn contains(&self, record: &HashRecord) -> bool {
        self.records.contains(record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn load_file(&mut self, path: &Path) -> Result<(), StoreError> {
        let file = fs::File::open(path)?;
        for line in BufReader::new(file).lines() {
            self.add_line(&line?);
        }
        Ok(())
    }

    fn add_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match HashRecord::parse(line) {
            Ok(record) => {
                self.records.insert(record);
            }
            Err(_) => warn!(line, "ignoring malformed trusted hash line"),
        }
    }
}

/// Reject directory entries an attacker could plant or modify: anything
/// that is not a regular file, symlinks, hidden files, setuid or
/// group/world-writable files, and (under the default policy) files not
/// owned by root.
fn entry_is_safe(path: &Path, policy: LoadPolicy) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }

    // symlink_metadata so a symlink is seen as such, not as its target
    let Ok(meta) = fs::symlink_metadata(path) else {
        return false;
    };
    if !meta.file_type().is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let mode = meta.mode();
        if mode & (S_IWGRP | S_IWOTH | S_ISUID) != 0 {
            return false;
        }
        if policy.require_root_owned && meta.uid() != 0 {
            return false;
        }
    }
    #[cfg(not(unix))]
    {
        let _ = policy;
    }

    true
}

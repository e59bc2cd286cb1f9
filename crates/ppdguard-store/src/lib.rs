//! Value corpus and hash allow-list storage for ppdguard.
//!
//! This crate provides the storage layer: the insertion-ordered `ValueSet`
//! of extracted directive values, the validated `HashRecord` digest
//! encoding, the read-only `TrustedHashStore` loaded from vetted hash
//! directories, and the allow-list operations that turn values into
//! net-new SHA-256 records written atomically to disk.

pub mod allowlist;
pub mod record;
pub mod trusted;
pub mod values;

pub use allowlist::{build_net_new, digest, load_records, write_records};
pub use record::HashRecord;
pub use trusted::{LoadPolicy, TrustedHashStore};
pub use values::ValueSet;

use std::path::Path;
use thiserror::Error;

/// Fsync a directory to ensure that a preceding `rename()` is durable.
///
/// On Linux with ext4 `data=ordered` (the default), renames are usually
/// durable without an explicit dir fsync, but POSIX does not guarantee
/// this. Calling `fsync()` on the parent directory makes the rename
/// durable on all filesystems and mount configurations.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hash record '{0}': expected 64 lowercase hex characters")]
    InvalidRecord(String),
    #[error("failed to replace output file '{path}': {source}")]
    Persist {
        path: String,
        source: std::io::Error,
    },
}

use crate::record::HashRecord;
use crate::trusted::TrustedHashStore;
use crate::values::ValueSet;
use crate::{fsync_dir, StoreError};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Hash the exact byte sequence of a value. No normalization happens
/// here; the parser has already applied all trimming the format defines.
pub fn digest(value: &str) -> HashRecord {
    let out = Sha256::digest(value.as_bytes());
    HashRecord::from_digest(&out.into())
}

/// Digest every value and keep the records whose digest is neither in the
/// trusted store nor already produced by an earlier value of this run.
/// Output order follows the value set's insertion order.
pub fn build_net_new(values: &ValueSet, trusted: &TrustedHashStore) -> Vec<HashRecord> {
    let mut emitted: HashSet<HashRecord> = HashSet::new();
    let mut out = Vec::new();
    for value in values.iter() {
        let record = digest(value);
        if trusted.contains(&record) {
            debug!(%record, "digest already trusted");
            continue;
        }
        if emitted.insert(record.clone()) {
            out.push(record);
        }
    }
    out
}

/// Write records one per line, atomically replacing `path`. A crashed run
/// leaves either the old file or the new one, never a torn mix.
pub fn write_records(records: &[HashRecord], path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    for record in records {
        writeln!(tmp, "{record}")?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Persist {
        path: path.display().to_string(),
        source: e.error,
    })?;
    fsync_dir(dir)?;
    Ok(())
}

/// Read a previously written hash file back into records. Used to fold an
/// existing output file into the dedup set in append mode.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<HashRecord>, StoreError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| HashRecord::parse(l.trim()))
        .collect()
}

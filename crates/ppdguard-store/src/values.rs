use crate::{fsync_dir, StoreError};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Insertion-ordered, duplicate-free set of extracted directive values.
///
/// Values accumulate across any number of parser runs; inserting a value
/// that is already present is a no-op, so re-scanning the same PPD is
/// idempotent.
#[derive(Debug, Default)]
pub struct ValueSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning true if it was not already present.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.seen.contains(&value) {
            return false;
        }
        self.seen.insert(value.clone());
        self.order.push(value);
        true
    }

    pub fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate members in insertion order. Restartable and side-effect
    /// free.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Seed the set from an existing corpus file, one escaped value per
    /// line. A missing file yields an empty set so the first run of an
    /// append-mode scan can create it.
    pub fn load_corpus(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let mut set = Self::new();
        if !path.exists() {
            debug!(path = %path.display(), "no existing corpus, starting empty");
            return Ok(set);
        }
        let content = fs::read_to_string(path)?;
        for line in content.lines() {
            if line.is_empty() {
                continue;
            }
            set.insert(unescape_value(line));
        }
        Ok(set)
    }

    /// Write the corpus, one escaped value per line, atomically replacing
    /// `path`. Values containing embedded newlines (legitimate output of
    /// the multi-line quote path) survive the round-trip via escaping.
    pub fn write_corpus(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let dir = corpus_parent(path);
        let mut tmp = NamedTempFile::new_in(dir)?;
        for value in self.iter() {
            writeln!(tmp, "{}", escape_value(value))?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::Persist {
            path: path.display().to_string(),
            source: e.error,
        })?;
        fsync_dir(dir)?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter().map(String::as_str)
    }
}

fn corpus_parent(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// One-value-per-line serialization cannot carry literal newlines, so
/// backslash, LF, and CR are escaped. Every other character is written
/// as-is.
fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_value(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            // Unknown escape: keep both characters rather than corrupt.
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut set = ValueSet::new();
        assert!(set.insert("duplex=%s"));
        assert!(!set.insert("duplex=%s"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn preserves_insertion_order() {
        let mut set = ValueSet::new();
        set.insert("c");
        set.insert("a");
        set.insert("b");
        set.insert("a");
        let members: Vec<_> = set.iter().collect();
        assert_eq!(members, ["c", "a", "b"]);
    }

    #[test]
    fn iter_is_restartable() {
        let mut set = ValueSet::new();
        set.insert("x");
        let first: Vec<_> = set.iter().collect();
        let second: Vec<_> = set.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn contains_matches_inserted() {
        let mut set = ValueSet::new();
        set.insert("gs -q");
        assert!(set.contains("gs -q"));
        assert!(!set.contains("gs"));
    }

    #[test]
    fn corpus_roundtrip_plain_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.txt");

        let mut set = ValueSet::new();
        set.insert("duplex=%s");
        set.insert("gs -q -dBATCH");
        set.write_corpus(&path).unwrap();

        let loaded = ValueSet::load_corpus(&path).unwrap();
        let members: Vec<_> = loaded.iter().collect();
        assert_eq!(members, ["duplex=%s", "gs -q -dBATCH"]);
    }

    #[test]
    fn corpus_roundtrip_embedded_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.txt");

        let mut set = ValueSet::new();
        set.insert("gs -q\nfoo=bar\nbaz");
        set.insert("back\\slash");
        set.write_corpus(&path).unwrap();

        // On disk each member is exactly one physical line.
        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw.lines().count(), 2);

        let loaded = ValueSet::load_corpus(&path).unwrap();
        assert!(loaded.contains("gs -q\nfoo=bar\nbaz"));
        assert!(loaded.contains("back\\slash"));
    }

    #[test]
    fn load_missing_corpus_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let set = ValueSet::load_corpus(dir.path().join("absent.txt")).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn load_deduplicates_corpus_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.txt");
        fs::write(&path, "same\nsame\nother\n").unwrap();
        let set = ValueSet::load_corpus(&path).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.txt");
        fs::write(&path, "stale contents\n").unwrap();

        let mut set = ValueSet::new();
        set.insert("fresh");
        set.write_corpus(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn unknown_escape_is_preserved() {
        assert_eq!(unescape_value("a\\qb"), "a\\qb");
        assert_eq!(unescape_value("trailing\\"), "trailing\\");
    }

    #[test]
    fn escape_unescape_roundtrip() {
        for v in ["plain", "with\nnewline", "with\\backslash", "cr\rhere", "\\n"] {
            assert_eq!(unescape_value(&escape_value(v)), v);
        }
    }
}

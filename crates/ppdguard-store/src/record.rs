use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Length of a hex-encoded SHA-256 digest.
pub const RECORD_LEN: usize = 64;

/// A hex-encoded SHA-256 digest: exactly 64 lowercase hex characters.
///
/// The fixed-case, fixed-width encoding makes equality a straight string
/// compare, so a record set can never hold two textually distinct
/// encodings of the same digest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashRecord(String);

impl HashRecord {
    /// Validate and wrap an existing encoding, e.g. a line from a trusted
    /// hash file.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        if s.len() == RECORD_LEN
            && s.bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            Ok(Self(s.to_owned()))
        } else {
            Err(StoreError::InvalidRecord(s.to_owned()))
        }
    }

    /// Encode a raw SHA-256 digest.
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for HashRecord {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HashRecord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

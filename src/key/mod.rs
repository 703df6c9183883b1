//! Key Derivation Module
//!
//! Builds namespaced cache keys of the form `{prefix}:{entity}:{operation}:{digest}`
//! where `digest` is the hex SHA-1 of the canonical argument text.

mod arg;
mod canonical;

use std::fmt;

use sha1::{Digest, Sha1};

use crate::error::{CacherError, Result};

pub use arg::{Arg, SharedArg};
pub use canonical::{canonical_text, ERROR_MARKER, PENDING_MARKER};

/// Separator between key segments. Never allowed inside a segment.
pub const KEY_SEPARATOR: char = ':';

/// Length of the hex digest segment.
pub const DIGEST_LEN: usize = 40;

/// Longest accepted prefix or entity name. Two maximal segments plus the
/// longest operation name and the digest stay under the store's key limit.
pub const MAX_SEGMENT_LEN: usize = 96;

// == Cache Key ==
/// A derived cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the trailing digest segment.
    pub fn digest(&self) -> &str {
        &self.0[self.0.len() - DIGEST_LEN..]
    }

    /// Consumes the key, returning the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// == Derive Key ==
/// Derives the cache key for `operation` on `entity` called with `args`.
///
/// Never fails: cycles collapse to markers and non-data values (handles,
/// errors, pending computations) collapse to fixed strings. Two distinct
/// errors, or two distinct pending computations, therefore derive the same
/// key. Segment names are expected to have passed [`validate_segment`].
pub fn derive_key(entity: &str, operation: &str, args: &[Arg], prefix: &str) -> CacheKey {
    let digest = hex::encode(Sha1::digest(canonical_text(args).as_bytes()));
    CacheKey(format!(
        "{prefix}{sep}{entity}{sep}{operation}{sep}{digest}",
        sep = KEY_SEPARATOR
    ))
}

/// Glob pattern matching every key under `entity` in `prefix`.
pub fn entity_pattern(prefix: &str, entity: &str) -> String {
    format!("{prefix}{sep}{entity}{sep}*", sep = KEY_SEPARATOR)
}

/// Checks that `name` can be used as a key segment.
///
/// Accepts names of 1 to [`MAX_SEGMENT_LEN`] ASCII letters, digits, `_`, `-`
/// and `.`. This keeps the separator and glob metacharacters out of every
/// segment.
pub fn validate_segment(kind: &'static str, name: &str) -> Result<()> {
    let valid = (1..=MAX_SEGMENT_LEN).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(CacherError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod property_tests;

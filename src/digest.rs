//! Content digests used for cache keys and cache invalidation.
//!
//! Digests are 64-bit xxh3 hashes rendered as 16 lowercase hex characters, which
//! is also the form they take when persisted alongside cached analytics.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use xxhash_rust::xxh3::Xxh3;

/// Type-safe 64-bit digest value.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Digest(u64);

impl Digest {
    /// Create a digest from a raw u64 value
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Raw digest value
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the digest as a lowercase hexadecimal string
    pub fn as_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl FromStr for Digest {
    type Err = ParseDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 16 {
            return Err(ParseDigestError::InvalidLength(s.len()));
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| ParseDigestError::InvalidHex)
    }
}

impl Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for digest parsing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseDigestError {
    /// Invalid hexadecimal characters in the input
    #[error("invalid hexadecimal characters in digest string")]
    InvalidHex,
    /// Invalid length (expected 16 hex characters)
    #[error("invalid digest length: expected 16 hex characters, got {0}")]
    InvalidLength(usize),
}

/// Streaming digest builder.
///
/// Every field is written with a terminator so that `("ab", "c")` and
/// `("a", "bc")` produce different digests.
pub struct DigestBuilder {
    hasher: Xxh3,
}

impl Default for DigestBuilder {
    fn default() -> Self {
        Self { hasher: Xxh3::new() }
    }
}

impl DigestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a string field.
    pub fn str(&mut self, value: &str) -> &mut Self {
        self.hasher.update(value.as_bytes());
        self.hasher.update(&[0xff]);
        self
    }

    /// Append an integer field.
    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    /// Append an optional integer field, distinguishing `None` from `Some(0)`.
    pub fn opt_i64(&mut self, value: Option<i64>) -> &mut Self {
        match value {
            Some(v) => {
                self.hasher.update(&[1]);
                self.hasher.update(&v.to_le_bytes());
            }
            None => self.hasher.update(&[0]),
        }
        self
    }

    pub fn finish(&self) -> Digest {
        Digest(self.hasher.digest())
    }
}

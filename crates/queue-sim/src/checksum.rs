//! Message body checksums.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// MD5 digest of a message body as 32 lowercase hex characters.
///
/// Used by callers to verify that a body survived the round trip unchanged.
/// This is an integrity check only, not a security property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyChecksum(String);

impl BodyChecksum {
    /// Compute checksum of the UTF-8 bytes of `body`
    pub fn compute(body: &str) -> Self {
        let digest = Md5::digest(body.as_bytes());
        Self(hex::encode(digest))
    }

    /// Check whether `body` hashes to this checksum
    pub fn matches(&self, body: &str) -> bool {
        Self::compute(body) == *self
    }

    /// Get checksum as hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BodyChecksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "checksum_tests.rs"]
mod tests;

//! Content fingerprints.
//!
//! A fingerprint is the SHA-256 digest of UTF-8 encoded content, rendered
//! as 64 lowercase hex characters. Fingerprints identify file content in the
//! trace ledger and back the optimistic file lock.

use sha2::{Digest, Sha256};

/// Fingerprint UTF-8 text content.
pub fn fingerprint(content: &str) -> String {
    fingerprint_bytes(content.as_bytes())
}

/// Fingerprint raw bytes.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

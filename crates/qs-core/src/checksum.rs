//! SHA-256 checksum utilities for migration fingerprinting.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 checksum of the given bytes as lowercase hex.
pub fn checksum_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Checksum of an up/down script pair.
///
/// Each script is length-prefixed so the boundary between the two cannot
/// shift without changing the digest.
pub fn script_pair_checksum(up: &str, down: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update((up.len() as u64).to_le_bytes());
    hasher.update(up.as_bytes());
    hasher.update((down.len() as u64).to_le_bytes());
    hasher.update(down.as_bytes());
    format!("{:x}", hasher.finalize())
}

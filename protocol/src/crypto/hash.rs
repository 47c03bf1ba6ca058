//! # Hashing Utilities
//!
//! SHA-256 helpers. Transaction IDs are `double_sha256` of the canonical
//! transaction bytes, and seeded demo wallets derive their key seeds from
//! a SHA-256 of the alias.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use tally_protocol::crypto::sha256;
///
/// let hash = sha256(b"tally");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Compute the double-SHA-256 hash: `SHA-256(SHA-256(data))`.
///
/// Used for transaction IDs. The double hash closes off length-extension
/// games on the ID.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

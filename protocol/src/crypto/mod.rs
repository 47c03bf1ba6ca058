//! # Cryptographic Primitives for Tally
//!
//! Everything that touches key material or hashes lives here:
//!
//! - **Ed25519** for signatures, via `ed25519-dalek`.
//! - **SHA-256** for transaction IDs and seeded demo keys.
//!
//! The ledger core depends only on the [`SignatureVerifier`] trait, never
//! on the concrete curve. Swapping the primitive means writing a new
//! verifier, not touching the ledger.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{double_sha256, sha256};
pub use keys::{Identity, KeyError, Keypair, Signature};
pub use signatures::{
    sign, verify, Ed25519Verifier, SignatureError, SignatureVerifier, SigningService,
};

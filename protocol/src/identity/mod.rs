//! # Identity Module
//!
//! Who owns an account, what humans call them, and who can sign for them.
//!
//! 1. **Identity**: the Ed25519 public key, re-exported from
//!    [`crate::crypto`]. This is the ledger's account key.
//! 2. **Directory**: [`IdentityDirectory`] and its map-backed
//!    implementation [`PublicKeyMap`], used only for reports.
//! 3. **Wallet**: local aliases mapped to keypairs; the bundled
//!    [`SigningService`](crate::crypto::SigningService).

pub mod directory;
pub mod wallet;

pub use crate::crypto::keys::Identity;
pub use directory::{HexDirectory, IdentityDirectory, PublicKeyMap};
pub use wallet::{Wallet, WalletError};

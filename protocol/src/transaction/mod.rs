//! # Transaction Module
//!
//! Construction, validation and application of signed-input transactions.
//!
//! ## Architecture
//!
//! ```text
//! input.rs        SignedInput and the canonical payload each input signs
//! builder.rs      Transaction (structural rules) and TransactionBuilder
//! verification.rs Amount, signature and affordability checks; apply
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: fix the outputs, then sign each input over them with
//!    [`TransactionBuilder::sign_with`].
//! 2. **Verify**: [`Transaction::verify`] against a ledger and a verifier.
//! 3. **Apply**: [`Transaction::apply`] debits and credits atomically, or
//!    leaves the ledger untouched.
//!
//! ## Design Decisions
//!
//! - Each signature covers the full output batch in order plus the
//!   signer's own amount and identity. Redirecting, reordering or resizing
//!   anything invalidates it.
//! - Affordability is decided on inputs aggregated per identity, never
//!   per entry.
//! - Transaction IDs are `double_sha256` of the content without
//!   signatures, so the ID is known before signing.

pub mod builder;
pub mod input;
pub mod verification;

pub use builder::{BuildError, Side, Transaction, TransactionBuilder, ValidationError};
pub use input::{signing_payload, SignedInput};
pub use verification::TransactionError;

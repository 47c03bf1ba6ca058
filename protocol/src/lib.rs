// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Tally Protocol: Core Library
//!
//! A small account ledger that only moves money when the owners of that
//! money have signed for exactly where it goes.
//!
//! A transaction is a list of signed inputs (who pays, how much) and a
//! batch of outputs (who receives, how much). It is accepted when:
//!
//! - the outputs total no more than the inputs,
//! - every input's Ed25519 signature covers these exact outputs and that
//!   input's amount,
//! - the inputs, summed per identity, fit within the ledger's balances.
//!
//! Accepted transactions are applied all at once; rejected ones change
//! nothing.
//!
//! ## Architecture
//!
//! - **config**: protocol constants.
//! - **crypto**: Ed25519 keys, SHA-256, the signature capability traits.
//! - **identity**: name directory and the alias-keyed wallet.
//! - **ledger**: entry batches, balances, the shared ledger wrapper.
//! - **transaction**: signed inputs, construction, validation, apply.
//!
//! ## Example
//!
//! ```
//! use tally_protocol::crypto::Ed25519Verifier;
//! use tally_protocol::identity::Wallet;
//! use tally_protocol::ledger::Ledger;
//! use tally_protocol::transaction::TransactionBuilder;
//!
//! let wallet = Wallet::generate(["alice", "bob", "carol"]);
//! let alice = wallet.identity("alice").unwrap();
//! let bob = wallet.identity("bob").unwrap();
//! let carol = wallet.identity("carol").unwrap();
//!
//! let mut ledger = Ledger::from_balances([(alice, 25)]);
//! let tx = TransactionBuilder::new()
//!     .input(alice, 25)
//!     .output(bob, 5)
//!     .output(carol, 20)
//!     .sign_with(&wallet)
//!     .unwrap();
//!
//! tx.apply(&mut ledger, &Ed25519Verifier).unwrap();
//! assert_eq!(ledger.balance(&alice), 0);
//! assert_eq!(ledger.balance(&carol), 20);
//! ```

pub mod config;
pub mod crypto;
pub mod identity;
pub mod ledger;
pub mod transaction;

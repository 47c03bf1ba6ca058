//! # Ledger Module
//!
//! Account balances and the batches that move them.
//!
//! ```text
//! entries.rs  EntryBatch, per-identity AggregatedBalance
//! state.rs    Ledger: identity → balance, aggregate checks, atomic transfer
//! shared.rs   SharedLedger: check-and-apply under one lock
//! ```
//!
//! ## Invariants
//!
//! - Balances are `u64` and never go below zero: every debit is checked
//!   against the identity's *aggregated* total first.
//! - A transfer either writes every touched balance or none of them.
//! - Unknown identities read as zero and are not errors.

pub mod entries;
pub mod shared;
pub mod state;

pub use entries::{AggregatedBalance, Amount, Entry, EntryBatch};
pub use shared::SharedLedger;
pub use state::{Ledger, LedgerError};

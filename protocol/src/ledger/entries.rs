//! Entry batches and their per-identity aggregation.
//!
//! An [`EntryBatch`] is an ordered list of `(identity, amount)` pairs. It
//! is deliberately *not* deduplicated: "pay Bob 5, pay Bob 5" is two
//! entries. Before any affordability decision the batch is folded into an
//! [`AggregatedBalance`], where each identity appears once with the sum of
//! all its entries. Deciding affordability entry by entry would accept
//! `[(alice, 15), (alice, 15)]` against a balance of 20.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::state::LedgerError;
use crate::crypto::keys::Identity;

/// Monetary amount in the smallest indivisible unit. Never negative.
pub type Amount = u64;

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A single `(identity, amount)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub identity: Identity,
    pub amount: Amount,
}

impl Entry {
    pub fn new(identity: Identity, amount: Amount) -> Self {
        Self { identity, amount }
    }
}

// ---------------------------------------------------------------------------
// EntryBatch
// ---------------------------------------------------------------------------

/// Ordered sequence of entries, possibly repeating identities.
///
/// Used for both sides of a transaction: the debit side (inputs, with
/// signatures stripped) and the credit side (outputs).
///
/// # Examples
///
/// ```
/// use tally_protocol::crypto::Keypair;
/// use tally_protocol::ledger::EntryBatch;
///
/// let a = Keypair::generate().identity();
/// let b = Keypair::generate().identity();
/// let batch = EntryBatch::new().with_entry(a, 15).with_entry(b, 5);
/// assert_eq!(batch.total_amount().unwrap(), 20);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryBatch {
    entries: Vec<Entry>,
}

impl EntryBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. No validation happens here.
    pub fn append(&mut self, identity: Identity, amount: Amount) {
        self.entries.push(Entry::new(identity, amount));
    }

    /// Builder-style [`append`](Self::append).
    pub fn with_entry(mut self, identity: Identity, amount: Amount) -> Self {
        self.append(identity, amount);
        self
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if any entry names `identity`.
    pub fn contains(&self, identity: &Identity) -> bool {
        self.entries.iter().any(|e| &e.identity == identity)
    }

    /// Sum of every entry's amount.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AmountOverflow`] if the sum does not fit in a `u64`.
    pub fn total_amount(&self) -> Result<Amount, LedgerError> {
        self.entries.iter().try_fold(0u64, |acc, e| {
            acc.checked_add(e.amount).ok_or(LedgerError::AmountOverflow)
        })
    }

    /// Folds the batch into one amount per identity, in first-seen order.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AmountOverflow`] if any identity's sum overflows.
    pub fn to_aggregated_balance(&self) -> Result<AggregatedBalance, LedgerError> {
        let mut amounts: IndexMap<Identity, Amount> = IndexMap::with_capacity(self.entries.len());
        for entry in &self.entries {
            let slot = amounts.entry(entry.identity).or_insert(0);
            *slot = slot
                .checked_add(entry.amount)
                .ok_or(LedgerError::AmountOverflow)?;
        }
        Ok(AggregatedBalance { amounts })
    }
}

impl FromIterator<(Identity, Amount)> for EntryBatch {
    fn from_iter<I: IntoIterator<Item = (Identity, Amount)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(identity, amount)| Entry::new(identity, amount))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EntryBatch {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// AggregatedBalance
// ---------------------------------------------------------------------------

/// Per-identity totals of an [`EntryBatch`].
///
/// Each identity appears exactly once. Iteration follows the order in which
/// identities first appeared in the source batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedBalance {
    amounts: IndexMap<Identity, Amount>,
}

impl AggregatedBalance {
    /// Aggregated amount for `identity`, zero if absent.
    pub fn get(&self, identity: &Identity) -> Amount {
        self.amounts.get(identity).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &Amount)> {
        self.amounts.iter()
    }

    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        self.amounts.keys()
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

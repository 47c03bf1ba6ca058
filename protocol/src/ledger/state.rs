//! # Ledger State
//!
//! The authoritative map from [`Identity`] to balance.
//!
//! Balances live in a single insertion-ordered map, so reporting order and
//! lookup share one structure. Absent identities read as zero.
//!
//! ## Mutation rules
//!
//! - `set_balance` overwrites unconditionally.
//! - `add_balance` / `subtract_balance` are checked: overflow and underflow
//!   are reported, never wrapped.
//! - `apply_debit`, `apply_credit` and [`Ledger::apply_transfer`] validate
//!   the whole batch first and only then mutate. A failed call leaves every
//!   balance exactly as it was.
//!
//! Debit affordability is always judged against the batch's
//! [`AggregatedBalance`], never entry by entry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

use super::entries::{AggregatedBalance, Amount, EntryBatch};
use crate::crypto::keys::Identity;
use crate::identity::directory::IdentityDirectory;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while reading totals from or mutating a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Summing entry amounts overflowed a `u64`.
    #[error("amount overflow while summing entries")]
    AmountOverflow,

    /// An identity cannot cover its aggregated debit.
    #[error("insufficient balance for {identity}: available {available}, required {required}")]
    InsufficientBalance {
        identity: Identity,
        available: Amount,
        required: Amount,
    },

    /// Crediting would push a balance past `u64::MAX`.
    #[error("balance overflow for {identity}: current {current}, credit {credit}")]
    BalanceOverflow {
        identity: Identity,
        current: Amount,
        credit: Amount,
    },
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Identity → balance mapping for a single in-process ledger.
///
/// Not `Sync`-safe for check-then-apply on its own; wrap it in a
/// [`SharedLedger`](super::SharedLedger) when several callers submit
/// transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    balances: IndexMap<Identity, Amount>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger from opening balances. Later duplicates overwrite
    /// earlier ones but keep the first position.
    pub fn from_balances<I>(balances: I) -> Self
    where
        I: IntoIterator<Item = (Identity, Amount)>,
    {
        let mut ledger = Self::new();
        for (identity, amount) in balances {
            ledger.set_balance(identity, amount);
        }
        ledger
    }

    /// Balance of `identity`; zero for identities the ledger has never seen.
    pub fn balance(&self, identity: &Identity) -> Amount {
        self.balances.get(identity).copied().unwrap_or(0)
    }

    /// Returns `true` if `identity` has an entry (even a zero one).
    pub fn contains(&self, identity: &Identity) -> bool {
        self.balances.contains_key(identity)
    }

    /// Overwrites the balance of `identity`, creating the account if absent.
    pub fn set_balance(&mut self, identity: Identity, amount: Amount) {
        self.balances.insert(identity, amount);
    }

    /// Adds `amount` to `identity`'s balance.
    ///
    /// # Errors
    ///
    /// [`LedgerError::BalanceOverflow`]; the balance is left unchanged.
    pub fn add_balance(&mut self, identity: Identity, amount: Amount) -> Result<(), LedgerError> {
        let current = self.balance(&identity);
        let updated = current
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow {
                identity,
                current,
                credit: amount,
            })?;
        self.set_balance(identity, updated);
        Ok(())
    }

    /// Subtracts `amount` from `identity`'s balance.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientBalance`] if the balance would go negative;
    /// the balance is left unchanged.
    pub fn subtract_balance(
        &mut self,
        identity: Identity,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let available = self.balance(&identity);
        let updated = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                identity,
                available,
                required: amount,
            })?;
        self.set_balance(identity, updated);
        Ok(())
    }

    /// Returns `true` if every identity in `aggregated` can cover its total.
    pub fn can_deduct(&self, aggregated: &AggregatedBalance) -> bool {
        self.shortfall(aggregated).is_none()
    }

    /// The first identity (in aggregation order) that cannot cover its
    /// aggregated debit, as an [`LedgerError::InsufficientBalance`].
    pub fn shortfall(&self, aggregated: &AggregatedBalance) -> Option<LedgerError> {
        aggregated.iter().find_map(|(identity, &required)| {
            let available = self.balance(identity);
            (available < required).then_some(LedgerError::InsufficientBalance {
                identity: *identity,
                available,
                required,
            })
        })
    }

    /// Subtracts every entry of `batch`.
    ///
    /// # Errors
    ///
    /// Fails closed: if the aggregated batch cannot be deducted, nothing is
    /// mutated and the shortfall is returned.
    pub fn apply_debit(&mut self, batch: &EntryBatch) -> Result<(), LedgerError> {
        self.apply_transfer(batch, &EntryBatch::new())
    }

    /// Adds every entry of `batch`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::BalanceOverflow`] if any aggregated credit would
    /// overflow; nothing is mutated in that case.
    pub fn apply_credit(&mut self, batch: &EntryBatch) -> Result<(), LedgerError> {
        self.apply_transfer(&EntryBatch::new(), batch)
    }

    /// Debits `debits` and credits `credits` as one all-or-nothing step.
    ///
    /// Both batches are aggregated, the debit side is checked for
    /// affordability, and every credited balance is checked for overflow
    /// *after* its own debit. Only when all checks pass is any balance
    /// written.
    pub fn apply_transfer(
        &mut self,
        debits: &EntryBatch,
        credits: &EntryBatch,
    ) -> Result<(), LedgerError> {
        let debit_totals = debits.to_aggregated_balance()?;
        let credit_totals = credits.to_aggregated_balance()?;

        if let Some(shortfall) = self.shortfall(&debit_totals) {
            return Err(shortfall);
        }

        // Stage the final balance of every touched identity before writing.
        let mut staged: IndexMap<Identity, Amount> =
            IndexMap::with_capacity(debit_totals.len() + credit_totals.len());
        for (identity, &amount) in debit_totals.iter() {
            staged.insert(*identity, self.balance(identity) - amount);
        }
        for (identity, &credit) in credit_totals.iter() {
            let current = staged
                .get(identity)
                .copied()
                .unwrap_or_else(|| self.balance(identity));
            let updated = current
                .checked_add(credit)
                .ok_or(LedgerError::BalanceOverflow {
                    identity: *identity,
                    current,
                    credit,
                })?;
            staged.insert(*identity, updated);
        }

        for (identity, amount) in staged {
            self.set_balance(identity, amount);
        }
        tracing::debug!(
            debited = debit_totals.len(),
            credited = credit_totals.len(),
            "ledger transfer applied"
        );
        Ok(())
    }

    /// Identities in the order they were first recorded.
    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        self.balances.keys()
    }

    /// `(identity, balance)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &Amount)> {
        self.balances.iter()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum of all balances. `u128` so that it can never overflow.
    pub fn total_balance(&self) -> u128 {
        self.balances.values().map(|&b| u128::from(b)).sum()
    }

    /// One line per account, in insertion order:
    /// `The balance for <name> is <value>`.
    pub fn report<D: IdentityDirectory + ?Sized>(&self, directory: &D) -> String {
        let mut out = String::new();
        for (identity, balance) in &self.balances {
            let _ = writeln!(
                out,
                "The balance for {} is {}",
                directory.display_name(identity),
                balance
            );
        }
        out
    }
}

impl FromIterator<(Identity, Amount)> for Ledger {
    fn from_iter<I: IntoIterator<Item = (Identity, Amount)>>(iter: I) -> Self {
        Self::from_balances(iter)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::PublicKeyMap;

    fn id(byte: u8) -> Identity {
        Identity::from_bytes([byte; 32])
    }

    #[test]
    fn unknown_identity_reads_zero() {
        let ledger = Ledger::new();
        assert_eq!(ledger.balance(&id(1)), 0);
        assert!(!ledger.contains(&id(1)));
    }

    #[test]
    fn reads_are_idempotent() {
        let ledger = Ledger::from_balances([(id(1), 42)]);
        for _ in 0..5 {
            assert_eq!(ledger.balance(&id(1)), 42);
        }
    }

    #[test]
    fn set_add_subtract() {
        let mut ledger = Ledger::new();
        ledger.set_balance(id(1), 20);
        ledger.add_balance(id(2), 15).unwrap();
        ledger.subtract_balance(id(2), 5).unwrap();
        ledger.set_balance(id(3), 10);

        assert_eq!(ledger.balance(&id(1)), 20);
        assert_eq!(ledger.balance(&id(2)), 10);
        assert_eq!(ledger.balance(&id(3)), 10);
    }

    #[test]
    fn subtract_below_zero_is_rejected_without_mutation() {
        let mut ledger = Ledger::from_balances([(id(1), 3)]);
        match ledger.subtract_balance(id(1), 4) {
            Err(LedgerError::InsufficientBalance {
                available: 3,
                required: 4,
                ..
            }) => {}
            other => panic!("expected InsufficientBalance, got {:?}", other),
        }
        assert_eq!(ledger.balance(&id(1)), 3);
    }

    #[test]
    fn add_overflow_is_rejected_without_mutation() {
        let mut ledger = Ledger::from_balances([(id(1), u64::MAX - 1)]);
        assert!(matches!(
            ledger.add_balance(id(1), 2),
            Err(LedgerError::BalanceOverflow { .. })
        ));
        assert_eq!(ledger.balance(&id(1)), u64::MAX - 1);
    }

    #[test]
    fn duplicate_entries_are_checked_in_aggregate() {
        // Each 15 fits in 20 on its own, the 30 together does not.
        let ledger = Ledger::from_balances([(id(1), 20)]);
        let batch = EntryBatch::new().with_entry(id(1), 15).with_entry(id(1), 15);
        assert!(!ledger.can_deduct(&batch.to_aggregated_balance().unwrap()));
    }

    #[test]
    fn duplicate_entries_within_balance_are_deductible() {
        let mut ledger = Ledger::from_balances([(id(2), 15)]);
        let batch = EntryBatch::new().with_entry(id(2), 5).with_entry(id(2), 5);
        assert!(ledger.can_deduct(&batch.to_aggregated_balance().unwrap()));

        ledger.apply_debit(&batch).unwrap();
        assert_eq!(ledger.balance(&id(2)), 5);
    }

    #[test]
    fn unknown_identity_cannot_be_debited() {
        let ledger = Ledger::new();
        let batch = EntryBatch::new().with_entry(id(7), 1);
        assert!(!ledger.can_deduct(&batch.to_aggregated_balance().unwrap()));
    }

    #[test]
    fn shortfall_names_the_offending_identity() {
        let ledger = Ledger::from_balances([(id(1), 20), (id(2), 5)]);
        let batch = EntryBatch::new()
            .with_entry(id(1), 15)
            .with_entry(id(2), 4)
            .with_entry(id(2), 4);
        match ledger.shortfall(&batch.to_aggregated_balance().unwrap()) {
            Some(LedgerError::InsufficientBalance {
                identity,
                available: 5,
                required: 8,
            }) => assert_eq!(identity, id(2)),
            other => panic!("expected shortfall on id(2), got {:?}", other),
        }
    }

    #[test]
    fn failed_debit_is_a_no_op() {
        let mut ledger = Ledger::from_balances([(id(1), 20), (id(2), 15)]);
        let before = ledger.clone();
        let batch = EntryBatch::new()
            .with_entry(id(2), 5)
            .with_entry(id(1), 15)
            .with_entry(id(1), 15);

        assert!(ledger.apply_debit(&batch).is_err());
        assert_eq!(ledger, before);
    }

    #[test]
    fn debit_never_drives_balance_negative() {
        let mut ledger = Ledger::from_balances([(id(1), 10)]);
        let batch = EntryBatch::new().with_entry(id(1), 4).with_entry(id(1), 6);
        ledger.apply_debit(&batch).unwrap();
        assert_eq!(ledger.balance(&id(1)), 0);
        assert!(ledger.apply_debit(&EntryBatch::new().with_entry(id(1), 1)).is_err());
    }

    #[test]
    fn credit_creates_accounts_and_accumulates() {
        let mut ledger = Ledger::from_balances([(id(1), 20)]);
        let batch = EntryBatch::new().with_entry(id(1), 15).with_entry(id(1), 15);
        ledger.apply_credit(&batch).unwrap();
        assert_eq!(ledger.balance(&id(1)), 50);

        ledger
            .apply_credit(&EntryBatch::new().with_entry(id(4), 3))
            .unwrap();
        assert_eq!(ledger.balance(&id(4)), 3);
    }

    #[test]
    fn credit_overflow_is_all_or_nothing() {
        let mut ledger = Ledger::from_balances([(id(1), 1), (id(2), u64::MAX)]);
        let before = ledger.clone();
        let batch = EntryBatch::new().with_entry(id(1), 5).with_entry(id(2), 1);
        assert!(ledger.apply_credit(&batch).is_err());
        assert_eq!(ledger, before);
    }

    #[test]
    fn transfer_to_self_nets_out() {
        let mut ledger = Ledger::from_balances([(id(1), 15)]);
        let debits = EntryBatch::new().with_entry(id(1), 15);
        let credits = EntryBatch::new().with_entry(id(1), 15);
        ledger.apply_transfer(&debits, &credits).unwrap();
        assert_eq!(ledger.balance(&id(1)), 15);
    }

    #[test]
    fn transfer_credit_overflow_checked_after_debit() {
        // Debit brings the balance down far enough for the credit to fit.
        let mut ledger = Ledger::from_balances([(id(1), u64::MAX)]);
        let debits = EntryBatch::new().with_entry(id(1), 10);
        let credits = EntryBatch::new().with_entry(id(1), 5);
        ledger.apply_transfer(&debits, &credits).unwrap();
        assert_eq!(ledger.balance(&id(1)), u64::MAX - 5);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut ledger = Ledger::new();
        ledger.set_balance(id(3), 1);
        ledger.set_balance(id(1), 1);
        ledger.set_balance(id(3), 9);
        ledger.add_balance(id(2), 1).unwrap();

        let order: Vec<Identity> = ledger.identities().copied().collect();
        assert_eq!(order, vec![id(3), id(1), id(2)]);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn total_balance_does_not_overflow() {
        let ledger = Ledger::from_balances([(id(1), u64::MAX), (id(2), u64::MAX)]);
        assert_eq!(ledger.total_balance(), 2 * u128::from(u64::MAX));
    }

    #[test]
    fn report_uses_directory_names_in_order() {
        let mut names = PublicKeyMap::new();
        names.insert("Bob", id(2));
        names.insert("Alice", id(1));

        let ledger = Ledger::from_balances([(id(1), 20), (id(2), 10)]);
        let report = ledger.report(&names);
        assert_eq!(
            report,
            "The balance for Alice is 20\nThe balance for Bob is 10\n"
        );
    }

    #[test]
    fn ledger_serde_roundtrip() {
        let ledger = Ledger::from_balances([(id(2), 5), (id(1), 7)]);
        let json = serde_json::to_string(&ledger).unwrap();
        let recovered: Ledger = serde_json::from_str(&json).unwrap();
        assert_eq!(ledger, recovered);
    }
}

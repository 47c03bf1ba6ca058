//! A ledger shared between threads.
//!
//! [`Transaction::apply`] is check-then-act. Two callers that each check
//! against the same balance and then apply would both succeed and spend
//! the money twice. [`SharedLedger::submit`] holds one lock across both
//! steps.

use parking_lot::Mutex;

use super::entries::Amount;
use super::state::Ledger;
use crate::crypto::keys::Identity;
use crate::crypto::signatures::SignatureVerifier;
use crate::transaction::{Transaction, TransactionError};

/// Mutex-guarded [`Ledger`].
#[derive(Debug, Default)]
pub struct SharedLedger {
    inner: Mutex<Ledger>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Mutex::new(ledger),
        }
    }

    /// Verifies and applies `tx` inside a single critical section.
    ///
    /// # Errors
    ///
    /// Whatever [`Transaction::apply`] reports; the ledger is unchanged.
    pub fn submit<V: SignatureVerifier + ?Sized>(
        &self,
        tx: &Transaction,
        verifier: &V,
    ) -> Result<(), TransactionError> {
        let mut guard = self.inner.lock();
        tx.apply(&mut *guard, verifier)
    }

    pub fn balance(&self, identity: &Identity) -> Amount {
        self.inner.lock().balance(identity)
    }

    /// Point-in-time copy.
    pub fn snapshot(&self) -> Ledger {
        self.inner.lock().clone()
    }

    /// Runs `f` with exclusive access, for direct balance edits.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }

    pub fn into_inner(self) -> Ledger {
        self.inner.into_inner()
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}

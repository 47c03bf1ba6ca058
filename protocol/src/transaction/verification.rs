//! Transaction validation against a ledger and application to it.
//!
//! Three checks decide whether a [`Transaction`] is valid, cheapest first:
//!
//! 1. **Amounts**: the outputs total no more than the inputs. Any surplus
//!    is burned.
//! 2. **Signatures**: every input's signature covers exactly these outputs
//!    and that input's amount.
//! 3. **Affordability**: the inputs, aggregated per identity, can be
//!    deducted from the ledger.
//!
//! The boolean predicates answer yes or no. [`Transaction::verify`] reports
//! the first failing check as a [`TransactionError`].
//! [`Transaction::diagnose`] reports every failing check.

use thiserror::Error;

use super::builder::Transaction;
use crate::crypto::keys::Identity;
use crate::crypto::signatures::SignatureVerifier;
use crate::ledger::entries::Amount;
use crate::ledger::state::{Ledger, LedgerError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a transaction was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// The outputs spend more than the inputs provide.
    #[error("outputs total {outputs} exceeds inputs total {inputs}")]
    AmountsExceedInputs { inputs: Amount, outputs: Amount },

    /// Input or output totals overflow. Only reachable for transactions
    /// that bypassed [`Transaction::new`], e.g. deserialized ones.
    #[error("transaction totals overflow")]
    AmountOverflow,

    /// The signature on input `index` does not cover this transaction.
    #[error("invalid signature on input {index} from {identity}")]
    InvalidSignature { index: usize, identity: Identity },

    /// The ledger refused the debit or credit.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

impl Transaction {
    /// `true` iff the outputs total at most the inputs total.
    pub fn check_amounts_valid(&self) -> bool {
        self.amounts_error().is_none()
    }

    /// `true` iff every input's signature covers these outputs.
    pub fn check_signatures_valid<V: SignatureVerifier + ?Sized>(&self, verifier: &V) -> bool {
        self.signature_errors(verifier).next().is_none()
    }

    /// Amounts, signatures and aggregated affordability all hold.
    pub fn check_valid<V: SignatureVerifier + ?Sized>(
        &self,
        ledger: &Ledger,
        verifier: &V,
    ) -> bool {
        self.verify(ledger, verifier).is_ok()
    }

    /// Runs every check in order and returns the first failure.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::AmountsExceedInputs`] / [`TransactionError::AmountOverflow`]
    /// - [`TransactionError::InvalidSignature`] for the first bad input
    /// - [`TransactionError::Ledger`] carrying [`LedgerError::InsufficientBalance`]
    pub fn verify<V: SignatureVerifier + ?Sized>(
        &self,
        ledger: &Ledger,
        verifier: &V,
    ) -> Result<(), TransactionError> {
        if let Some(err) = self.amounts_error() {
            return Err(err);
        }
        if let Some(err) = self.signature_errors(verifier).next() {
            return Err(err);
        }
        self.affordability_error(ledger).map_or(Ok(()), Err)
    }

    /// Every failing check, in check order. Empty means valid.
    pub fn diagnose<V: SignatureVerifier + ?Sized>(
        &self,
        ledger: &Ledger,
        verifier: &V,
    ) -> Vec<TransactionError> {
        let mut errors: Vec<TransactionError> = self.amounts_error().into_iter().collect();
        errors.extend(self.signature_errors(verifier));
        errors.extend(self.affordability_error(ledger));
        errors
    }

    /// Verifies, then debits every input and credits every output as one
    /// step.
    ///
    /// # Errors
    ///
    /// Any [`verify`](Self::verify) failure, or
    /// [`LedgerError::BalanceOverflow`] if a credit would overflow. On error
    /// the ledger is unchanged.
    pub fn apply<V: SignatureVerifier + ?Sized>(
        &self,
        ledger: &mut Ledger,
        verifier: &V,
    ) -> Result<(), TransactionError> {
        let outcome = self.verify(ledger, verifier).and_then(|()| {
            ledger
                .apply_transfer(&self.to_inputs(), self.outputs())
                .map_err(TransactionError::from)
        });

        match &outcome {
            Ok(()) => tracing::debug!(
                tx_id = %self.compute_id(),
                inputs = self.inputs().len(),
                outputs = self.outputs().len(),
                "transaction applied"
            ),
            Err(err) => tracing::warn!(
                tx_id = %self.compute_id(),
                error = %err,
                "transaction rejected"
            ),
        }
        outcome
    }

    fn amounts_error(&self) -> Option<TransactionError> {
        let inputs = self.to_inputs().total_amount();
        let outputs = self.outputs().total_amount();
        match (inputs, outputs) {
            (Ok(inputs), Ok(outputs)) if outputs > inputs => {
                Some(TransactionError::AmountsExceedInputs { inputs, outputs })
            }
            (Ok(_), Ok(_)) => None,
            _ => Some(TransactionError::AmountOverflow),
        }
    }

    fn signature_errors<'a, V: SignatureVerifier + ?Sized>(
        &'a self,
        verifier: &'a V,
    ) -> impl Iterator<Item = TransactionError> + 'a {
        self.inputs()
            .iter()
            .enumerate()
            .filter(move |(_, input)| !input.check_signature(self.outputs(), verifier))
            .map(|(index, input)| TransactionError::InvalidSignature {
                index,
                identity: *input.identity(),
            })
    }

    fn affordability_error(&self, ledger: &Ledger) -> Option<TransactionError> {
        match self.to_inputs().to_aggregated_balance() {
            Ok(aggregated) => ledger.shortfall(&aggregated).map(TransactionError::from),
            Err(err) => Some(err.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

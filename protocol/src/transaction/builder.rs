//! Transactions and their construction.
//!
//! A [`Transaction`] is a list of [`SignedInput`]s (the debit side) and an
//! [`EntryBatch`] of outputs (the credit side). Construction enforces the
//! structural rules that do not depend on any ledger: bounded input and
//! output counts, no zero amounts, and totals that fit in a `u64`.
//! Everything that depends on the ledger or on signatures lives in
//! [`super::verification`].
//!
//! [`TransactionBuilder`] collects unsigned inputs and outputs, then asks a
//! [`SigningService`] to sign every input over the final output batch. The
//! outputs must be fixed before signing because every signature covers
//! them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::input::SignedInput;
use crate::config::{MAX_TX_INPUTS, MAX_TX_OUTPUTS, TX_ENCODING_VERSION};
use crate::crypto::hash::double_sha256;
use crate::crypto::keys::Identity;
use crate::crypto::signatures::{SignatureError, SigningService};
use crate::ledger::entries::{Amount, EntryBatch};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Which side of a transaction an entry sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Input,
    Output,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Input => f.write_str("input"),
            Side::Output => f.write_str("output"),
        }
    }
}

/// Structural rule violated while constructing a [`Transaction`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("too many {side}s: {count} (max {max})")]
    TooMany { side: Side, count: usize, max: usize },

    /// An entry moves no value. Rejected so that every entry is meaningful.
    #[error("{side} {index} for {identity} has zero amount")]
    ZeroAmount {
        side: Side,
        index: usize,
        identity: Identity,
    },

    #[error("{side} total does not fit in a u64")]
    TotalOverflow { side: Side },
}

/// Failure while building and signing a transaction.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to sign input: {0}")]
    Signing(#[from] SignatureError),
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Signed inputs plus the outputs they pay for.
///
/// Immutable once built. Validity is a pure function of the content, a
/// [`Ledger`](crate::ledger::Ledger) and a signature verifier, so the same
/// transaction can be checked any number of times. Applying it twice
/// debits twice; replay protection is the caller's concern.
///
/// Deserialization goes through [`Transaction::new`], so decoded
/// transactions obey the same structural rules as built ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTransaction")]
pub struct Transaction {
    inputs: Vec<SignedInput>,
    outputs: EntryBatch,
}

impl Transaction {
    /// Validates structure and assembles the transaction.
    ///
    /// Signatures are *not* checked here.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, inputs before outputs.
    pub fn new(inputs: Vec<SignedInput>, outputs: EntryBatch) -> Result<Self, ValidationError> {
        if inputs.len() > MAX_TX_INPUTS {
            return Err(ValidationError::TooMany {
                side: Side::Input,
                count: inputs.len(),
                max: MAX_TX_INPUTS,
            });
        }
        if outputs.len() > MAX_TX_OUTPUTS {
            return Err(ValidationError::TooMany {
                side: Side::Output,
                count: outputs.len(),
                max: MAX_TX_OUTPUTS,
            });
        }

        let input_entries = inputs.iter().map(|i| (*i.identity(), i.amount()));
        check_entries(Side::Input, input_entries)?;
        check_entries(Side::Output, outputs.iter().map(|e| (e.identity, e.amount)))?;

        Ok(Self { inputs, outputs })
    }

    pub fn inputs(&self) -> &[SignedInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &EntryBatch {
        &self.outputs
    }

    /// The debit side with signatures stripped.
    pub fn to_inputs(&self) -> EntryBatch {
        self.inputs
            .iter()
            .map(|i| (*i.identity(), i.amount()))
            .collect()
    }

    /// The credit side.
    pub fn to_outputs(&self) -> EntryBatch {
        self.outputs.clone()
    }

    /// Deterministic byte encoding of the transaction content.
    ///
    /// Signatures are excluded, so the ID is the same before and after
    /// signing.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(18 + (self.inputs.len() + self.outputs.len()) * 40);

        buf.extend_from_slice(&TX_ENCODING_VERSION.to_le_bytes());

        buf.extend_from_slice(&(self.inputs.len() as u64).to_le_bytes());
        for input in &self.inputs {
            buf.extend_from_slice(input.identity().as_bytes());
            buf.extend_from_slice(&input.amount().to_le_bytes());
        }

        buf.extend_from_slice(&(self.outputs.len() as u64).to_le_bytes());
        for entry in &self.outputs {
            buf.extend_from_slice(entry.identity.as_bytes());
            buf.extend_from_slice(&entry.amount.to_le_bytes());
        }

        buf
    }

    /// Transaction ID: `hex(double_sha256(canonical_bytes))`.
    pub fn compute_id(&self) -> String {
        hex::encode(double_sha256(&self.canonical_bytes()))
    }
}

/// Wire shape of a [`Transaction`] before structural validation.
#[derive(Deserialize)]
struct RawTransaction {
    inputs: Vec<SignedInput>,
    outputs: EntryBatch,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = ValidationError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        Transaction::new(raw.inputs, raw.outputs)
    }
}

fn check_entries(
    side: Side,
    entries: impl Iterator<Item = (Identity, Amount)>,
) -> Result<(), ValidationError> {
    let mut total: Amount = 0;
    for (index, (identity, amount)) in entries.enumerate() {
        if amount == 0 {
            return Err(ValidationError::ZeroAmount {
                side,
                index,
                identity,
            });
        }
        total = total
            .checked_add(amount)
            .ok_or(ValidationError::TotalOverflow { side })?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Fluent builder that signs every input over the final outputs.
///
/// # Examples
///
/// ```
/// use tally_protocol::identity::Wallet;
/// use tally_protocol::transaction::TransactionBuilder;
///
/// let wallet = Wallet::generate(["alice", "bob"]);
/// let alice = wallet.identity("alice").unwrap();
/// let bob = wallet.identity("bob").unwrap();
///
/// let tx = TransactionBuilder::new()
///     .input(alice, 10)
///     .output(bob, 10)
///     .sign_with(&wallet)
///     .unwrap();
/// assert_eq!(tx.inputs().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    inputs: Vec<(Identity, Amount)>,
    outputs: EntryBatch,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an input to be signed by `identity`.
    pub fn input(mut self, identity: Identity, amount: Amount) -> Self {
        self.inputs.push((identity, amount));
        self
    }

    pub fn output(mut self, identity: Identity, amount: Amount) -> Self {
        self.outputs.append(identity, amount);
        self
    }

    /// Replaces the outputs wholesale.
    pub fn outputs(mut self, outputs: EntryBatch) -> Self {
        self.outputs = outputs;
        self
    }

    /// Signs every input through `signer` and validates the result.
    ///
    /// # Errors
    ///
    /// [`BuildError::Signing`] if `signer` holds no key for an input's
    /// identity, [`BuildError::Validation`] for structural violations.
    pub fn sign_with<S: SigningService + ?Sized>(
        self,
        signer: &S,
    ) -> Result<Transaction, BuildError> {
        let inputs = self
            .inputs
            .into_iter()
            .map(|(identity, amount)| SignedInput::sign(signer, identity, amount, &self.outputs))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Transaction::new(inputs, self.outputs)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::{Keypair, Signature};
    use crate::identity::Wallet;

    fn id(byte: u8) -> Identity {
        Identity::from_bytes([byte; 32])
    }

    fn unsigned(identity: Identity, amount: Amount) -> SignedInput {
        SignedInput::new(identity, amount, Signature::from_bytes([0u8; 64]))
    }

    #[test]
    fn builds_and_signs_through_wallet() {
        let wallet = Wallet::generate(["alice", "bob", "carol"]);
        let alice = wallet.identity("alice").unwrap();
        let bob = wallet.identity("bob").unwrap();
        let carol = wallet.identity("carol").unwrap();

        let tx = TransactionBuilder::new()
            .input(alice, 25)
            .output(bob, 5)
            .output(carol, 20)
            .sign_with(&wallet)
            .unwrap();

        assert_eq!(tx.to_inputs().total_amount().unwrap(), 25);
        assert_eq!(tx.to_outputs().total_amount().unwrap(), 25);
        assert!(tx.inputs()[0].check_signature(tx.outputs(), &wallet));
    }

    #[test]
    fn sign_with_unknown_identity_fails() {
        let wallet = Wallet::generate(["alice"]);
        let stranger = Keypair::generate().identity();

        match TransactionBuilder::new()
            .input(stranger, 1)
            .output(id(1), 1)
            .sign_with(&wallet)
        {
            Err(BuildError::Signing(SignatureError::UnknownIdentity(who))) => {
                assert_eq!(who, stranger)
            }
            other => panic!("expected UnknownIdentity, got {:?}", other),
        }
    }

    #[test]
    fn rejects_zero_amount_input() {
        let result = Transaction::new(
            vec![unsigned(id(1), 5), unsigned(id(2), 0)],
            EntryBatch::new().with_entry(id(3), 5),
        );
        match result {
            Err(ValidationError::ZeroAmount {
                side: Side::Input,
                index: 1,
                ..
            }) => {}
            other => panic!("expected ZeroAmount on input 1, got {:?}", other),
        }
    }

    #[test]
    fn rejects_zero_amount_output() {
        let result = Transaction::new(
            vec![unsigned(id(1), 5)],
            EntryBatch::new().with_entry(id(3), 0),
        );
        match result {
            Err(ValidationError::ZeroAmount {
                side: Side::Output, ..
            }) => {}
            other => panic!("expected ZeroAmount on output, got {:?}", other),
        }
    }

    #[test]
    fn rejects_too_many_outputs() {
        let outputs: EntryBatch = (0..=MAX_TX_OUTPUTS).map(|_| (id(1), 1)).collect();
        match Transaction::new(vec![unsigned(id(2), 1)], outputs) {
            Err(ValidationError::TooMany {
                side: Side::Output,
                count,
                ..
            }) => assert_eq!(count, MAX_TX_OUTPUTS + 1),
            other => panic!("expected TooMany outputs, got {:?}", other),
        }
    }

    #[test]
    fn rejects_output_total_overflow() {
        let outputs = EntryBatch::new()
            .with_entry(id(1), u64::MAX)
            .with_entry(id(2), 1);
        match Transaction::new(vec![unsigned(id(3), 1)], outputs) {
            Err(ValidationError::TotalOverflow { side: Side::Output }) => {}
            other => panic!("expected TotalOverflow, got {:?}", other),
        }
    }

    #[test]
    fn self_paying_transaction_is_allowed() {
        let tx = Transaction::new(
            vec![unsigned(id(1), 10)],
            EntryBatch::new().with_entry(id(1), 10),
        );
        assert!(tx.is_ok());
    }

    #[test]
    fn id_is_deterministic_and_ignores_signatures() {
        let outputs = EntryBatch::new().with_entry(id(2), 4);
        let a = Transaction::new(vec![unsigned(id(1), 4)], outputs.clone()).unwrap();
        let b = Transaction::new(
            vec![SignedInput::new(id(1), 4, Signature::from_bytes([9u8; 64]))],
            outputs,
        )
        .unwrap();

        assert_eq!(a.compute_id(), b.compute_id());
        assert_eq!(a.compute_id().len(), 64);
    }

    #[test]
    fn id_changes_with_content() {
        let a = Transaction::new(
            vec![unsigned(id(1), 4)],
            EntryBatch::new().with_entry(id(2), 4),
        )
        .unwrap();
        let b = Transaction::new(
            vec![unsigned(id(1), 4)],
            EntryBatch::new().with_entry(id(3), 4),
        )
        .unwrap();
        assert_ne!(a.compute_id(), b.compute_id());
    }

    #[test]
    fn transaction_serde_roundtrip() {
        let wallet = Wallet::generate(["a", "b"]);
        let tx = TransactionBuilder::new()
            .input(wallet.identity("a").unwrap(), 3)
            .output(wallet.identity("b").unwrap(), 3)
            .sign_with(&wallet)
            .unwrap();

        let json = serde_json::to_string(&tx).unwrap();
        let recovered: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, recovered);
    }

    #[test]
    fn deserializing_zero_amount_transaction_fails() {
        let keypair = Keypair::generate();
        let outputs = EntryBatch::new().with_entry(id(2), 0);
        let input = SignedInput::sign_with_keypair(&keypair, 0, &outputs);
        assert!(Transaction::new(vec![input.clone()], outputs.clone()).is_err());

        let json = serde_json::json!({ "inputs": [input], "outputs": outputs });
        let err = serde_json::from_value::<Transaction>(json).unwrap_err();
        assert!(err.to_string().contains("zero amount"));
    }

    #[test]
    fn deserializing_oversized_transaction_fails() {
        let outputs: EntryBatch = (0..=MAX_TX_OUTPUTS).map(|_| (id(1), 1)).collect();
        let json = serde_json::json!({ "inputs": [unsigned(id(2), 1)], "outputs": outputs });
        let err = serde_json::from_value::<Transaction>(json).unwrap_err();
        assert!(err.to_string().contains("too many outputs"));
    }
}

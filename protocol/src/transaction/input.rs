//! Signed inputs and the canonical payload they sign.
//!
//! A [`SignedInput`] says: "identity I authorizes spending `amount`, and the
//! money goes to exactly these outputs." The signature covers a canonical
//! byte encoding of the output batch *and* the input amount, so a valid
//! signature cannot be replayed onto different outputs or a different
//! amount.
//!
//! # Payload layout
//!
//! ```text
//! INPUT_SIGNING_DOMAIN || 0x00
//! TX_ENCODING_VERSION          u16 LE
//! signer identity              32 bytes
//! output count                 u64 LE
//! for each output, in order:   identity (32 bytes) || amount (u64 LE)
//! input amount                 u64 LE
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{INPUT_SIGNING_DOMAIN, TX_ENCODING_VERSION};
use crate::crypto::keys::{Identity, Keypair, Signature};
use crate::crypto::signatures::{SignatureError, SignatureVerifier, SigningService};
use crate::ledger::entries::{Amount, Entry, EntryBatch};

/// Canonical bytes an input owner signs.
///
/// Outputs are encoded in batch order, not sorted: reordering the outputs
/// produces a different payload.
pub fn signing_payload(identity: &Identity, amount: Amount, outputs: &EntryBatch) -> Vec<u8> {
    let mut buf = Vec::with_capacity(INPUT_SIGNING_DOMAIN.len() + 52 + outputs.len() * 40);

    buf.extend_from_slice(INPUT_SIGNING_DOMAIN);
    buf.push(0x00);
    buf.extend_from_slice(&TX_ENCODING_VERSION.to_le_bytes());
    buf.extend_from_slice(identity.as_bytes());

    buf.extend_from_slice(&(outputs.len() as u64).to_le_bytes());
    for entry in outputs {
        buf.extend_from_slice(entry.identity.as_bytes());
        buf.extend_from_slice(&entry.amount.to_le_bytes());
    }

    buf.extend_from_slice(&amount.to_le_bytes());
    buf
}

/// A debit entry plus its owner's authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInput {
    identity: Identity,
    amount: Amount,
    signature: Signature,
}

impl SignedInput {
    /// Wraps an existing signature. Nothing is verified here.
    pub fn new(identity: Identity, amount: Amount, signature: Signature) -> Self {
        Self {
            identity,
            amount,
            signature,
        }
    }

    /// Asks `signer` to authorize `amount` from `identity` towards `outputs`.
    pub fn sign<S: SigningService + ?Sized>(
        signer: &S,
        identity: Identity,
        amount: Amount,
        outputs: &EntryBatch,
    ) -> Result<Self, SignatureError> {
        let payload = signing_payload(&identity, amount, outputs);
        let signature = signer.sign(&identity, &payload)?;
        Ok(Self::new(identity, amount, signature))
    }

    /// Signs directly with a keypair; the identity is the keypair's own.
    pub fn sign_with_keypair(keypair: &Keypair, amount: Amount, outputs: &EntryBatch) -> Self {
        let identity = keypair.identity();
        let signature = keypair.sign(&signing_payload(&identity, amount, outputs));
        Self::new(identity, amount, signature)
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The debit entry with the signature stripped.
    pub fn entry(&self) -> Entry {
        Entry::new(self.identity, self.amount)
    }

    /// The payload this input's signature must cover for `outputs`.
    pub fn payload(&self, outputs: &EntryBatch) -> Vec<u8> {
        signing_payload(&self.identity, self.amount, outputs)
    }

    /// `true` iff the signature covers exactly `outputs` and this amount.
    ///
    /// Never panics; malformed signatures simply yield `false`.
    pub fn check_signature<V: SignatureVerifier + ?Sized>(
        &self,
        outputs: &EntryBatch,
        verifier: &V,
    ) -> bool {
        verifier.verify(&self.identity, &self.payload(outputs), &self.signature)
    }
}

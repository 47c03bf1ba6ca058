//! # Digital Signatures
//!
//! Ed25519 signing and verification, plus the capability traits the ledger
//! core consumes.
//!
//! The core never touches key material. It is handed something that
//! implements [`SignatureVerifier`] and asks it one question: did this
//! identity sign these bytes? Production code passes [`Ed25519Verifier`];
//! tests are free to pass a deterministic fake.
//!
//! [`SigningService`] extends the verifier with `sign`. Wallets implement
//! it; the core only ever calls `verify`.
//!
//! ## Strictness
//!
//! Verification uses `ed25519-dalek`'s `verify_strict`, which rejects
//! small-order keys and non-canonical signatures.

use thiserror::Error;

use super::keys::{Identity, Keypair, Signature};

/// Errors during signing.
///
/// Verification never errors: it answers `false`.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The signing service holds no key for the requested identity.
    #[error("no signing key held for identity {0}")]
    UnknownIdentity(Identity),
}

/// Answers whether `identity` produced `signature` over `payload`.
///
/// Implementations must be total: every input yields `true` or `false`,
/// no panics on malformed signatures or identities.
pub trait SignatureVerifier {
    fn verify(&self, identity: &Identity, payload: &[u8], signature: &Signature) -> bool;
}

/// A capability that can produce signatures on behalf of identities.
pub trait SigningService: SignatureVerifier {
    fn sign(&self, identity: &Identity, payload: &[u8]) -> Result<Signature, SignatureError>;
}

impl<T: SignatureVerifier + ?Sized> SignatureVerifier for &T {
    fn verify(&self, identity: &Identity, payload: &[u8], signature: &Signature) -> bool {
        (**self).verify(identity, payload, signature)
    }
}

/// Ed25519 verification where the identity bytes are the public key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, identity: &Identity, payload: &[u8], signature: &Signature) -> bool {
        identity.verify(payload, signature)
    }
}

/// Sign a message using a keypair.
///
/// # Example
///
/// ```
/// use tally_protocol::crypto::{sign, verify, Keypair};
///
/// let keypair = Keypair::generate();
/// let signature = sign(&keypair, b"send 5 to bob");
/// assert!(verify(&keypair.identity(), b"send 5 to bob", &signature));
/// ```
pub fn sign(keypair: &Keypair, message: &[u8]) -> Signature {
    keypair.sign(message)
}

/// Verify an Ed25519 signature against an identity and message.
///
/// No distinction is made between "bad signature" and "wrong key".
pub fn verify(identity: &Identity, message: &[u8], signature: &Signature) -> bool {
    Ed25519Verifier.verify(identity, message, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let kp = Keypair::generate();
        let sig = sign(&kp, b"hello, ledger");
        assert!(verify(&kp.identity(), b"hello, ledger", &sig));
    }

    #[test]
    fn test_wrong_message_fails() {
        let kp = Keypair::generate();
        let sig = sign(&kp, b"correct message");
        assert!(!verify(&kp.identity(), b"wrong message", &sig));
    }

    #[test]
    fn test_wrong_key_fails() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::generate();
        let sig = sign(&kp1, b"test message");
        assert!(!Ed25519Verifier.verify(&kp2.identity(), b"test message", &sig));
    }

    #[test]
    fn test_garbage_signature_is_false_not_panic() {
        let kp = Keypair::generate();
        let garbage = Signature::from_raw(vec![0xAB; 17]);
        assert!(!Ed25519Verifier.verify(&kp.identity(), b"anything", &garbage));

        let zeros = Signature::from_bytes([0u8; 64]);
        assert!(!Ed25519Verifier.verify(&kp.identity(), b"anything", &zeros));
    }

    #[test]
    fn test_verifier_through_reference() {
        fn check<V: SignatureVerifier>(v: V, id: &Identity, msg: &[u8], sig: &Signature) -> bool {
            v.verify(id, msg, sig)
        }
        let kp = Keypair::generate();
        let sig = kp.sign(b"by ref");
        let verifier = Ed25519Verifier;
        assert!(check(&verifier, &kp.identity(), b"by ref", &sig));
    }

    #[test]
    fn test_empty_message() {
        let kp = Keypair::generate();
        let sig = sign(&kp, b"");
        assert!(verify(&kp.identity(), b"", &sig));
    }
}

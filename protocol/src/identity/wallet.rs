//! # Wallet
//!
//! A [`Wallet`] holds Ed25519 keypairs under local aliases ("A1", "alice",
//! ...) and signs on their behalf. It is the bundled [`SigningService`]:
//! transaction builders hand it an identity and a payload, and it finds
//! the matching key.
//!
//! Secret keys never leave the wallet except through
//! [`Keypair::secret_key_bytes`] on an explicitly borrowed keypair.

use indexmap::IndexMap;
use thiserror::Error;

use super::directory::PublicKeyMap;
use crate::crypto::hash::sha256;
use crate::crypto::keys::{Identity, Keypair, Signature};
use crate::crypto::signatures::{
    Ed25519Verifier, SignatureError, SignatureVerifier, SigningService,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("no key stored under alias {0:?}")]
    UnknownAlias(String),

    #[error("alias {0:?} is already taken")]
    DuplicateAlias(String),
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// Alias → keypair store, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Wallet {
    keys: IndexMap<String, Keypair>,
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh random keypair for every alias. Repeated aliases keep the
    /// first key.
    pub fn generate<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut wallet = Self::new();
        for alias in aliases {
            wallet.keys.entry(alias.into()).or_insert_with(Keypair::generate);
        }
        wallet
    }

    /// Deterministic keypairs seeded from `sha256(alias)`.
    ///
    /// For demos and reproducible scenarios only: anyone who knows the
    /// alias can recompute the secret key.
    pub fn from_aliases_seeded<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut wallet = Self::new();
        for alias in aliases {
            let alias = alias.into();
            let seed = sha256(alias.as_bytes());
            wallet.keys.entry(alias).or_insert_with(|| Keypair::from_seed(&seed));
        }
        wallet
    }

    /// Stores `keypair` under `alias`.
    ///
    /// # Errors
    ///
    /// [`WalletError::DuplicateAlias`] if the alias is taken; the wallet is
    /// unchanged.
    pub fn insert(
        &mut self,
        alias: impl Into<String>,
        keypair: Keypair,
    ) -> Result<(), WalletError> {
        let alias = alias.into();
        if self.keys.contains_key(&alias) {
            return Err(WalletError::DuplicateAlias(alias));
        }
        self.keys.insert(alias, keypair);
        Ok(())
    }

    pub fn identity(&self, alias: &str) -> Option<Identity> {
        self.keys.get(alias).map(Keypair::identity)
    }

    pub fn keypair(&self, alias: &str) -> Option<&Keypair> {
        self.keys.get(alias)
    }

    /// Signs `payload` with the key stored under `alias`.
    pub fn sign_as(&self, alias: &str, payload: &[u8]) -> Result<Signature, WalletError> {
        self.keys
            .get(alias)
            .map(|kp| kp.sign(payload))
            .ok_or_else(|| WalletError::UnknownAlias(alias.to_owned()))
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// `true` if some stored key belongs to `identity`.
    pub fn holds(&self, identity: &Identity) -> bool {
        self.keypair_for(identity).is_some()
    }

    /// Public half of the wallet: every alias with its identity.
    pub fn to_public_key_map(&self) -> PublicKeyMap {
        self.keys
            .iter()
            .map(|(alias, kp)| (alias.clone(), kp.identity()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn keypair_for(&self, identity: &Identity) -> Option<&Keypair> {
        self.keys.values().find(|kp| kp.identity() == *identity)
    }
}

impl SignatureVerifier for Wallet {
    fn verify(&self, identity: &Identity, payload: &[u8], signature: &Signature) -> bool {
        Ed25519Verifier.verify(identity, payload, signature)
    }
}

impl SigningService for Wallet {
    fn sign(&self, identity: &Identity, payload: &[u8]) -> Result<Signature, SignatureError> {
        self.keypair_for(identity)
            .map(|kp| kp.sign(payload))
            .ok_or(SignatureError::UnknownIdentity(*identity))
    }
}

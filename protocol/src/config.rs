//! # Protocol Configuration & Constants
//!
//! Every magic number in Tally lives here. The canonical signing payload
//! and the transaction ID both depend on these values, so changing one is
//! a breaking change for every signature already issued.

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Crate-level protocol version string, reported by the node binary.
pub const PROTOCOL_VERSION: &str = "0.1.0";

/// Version byte mixed into the canonical transaction encoding.
pub const TX_ENCODING_VERSION: u16 = 1;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// The only signature scheme the bundled verifier speaks.
pub const SIGNING_ALGORITHM: &str = "Ed25519";

/// Identity (Ed25519 public key) length in bytes.
pub const IDENTITY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Hash used for transaction IDs.
pub const TX_ID_HASH_FUNCTION: &str = "double-SHA-256";

/// Domain tag prefixed to every input signing payload.
///
/// Keeps an input signature from ever being mistaken for a signature over
/// some other message format produced with the same key.
pub const INPUT_SIGNING_DOMAIN: &[u8] = b"tally/signed-input/v1";

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Maximum number of signed inputs per transaction. Keeps validation bounded.
pub const MAX_TX_INPUTS: usize = 256;

/// Maximum number of outputs per transaction.
pub const MAX_TX_OUTPUTS: usize = 256;

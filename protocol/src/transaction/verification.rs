//! Envelope verification: structural checks and cryptographic validation.
//!
//! [`verify_envelope`] answers one question: would the broadcast endpoint
//! accept this signature? It does not look at balances, nonces or whether
//! the recipient exists. The checks are ordered from cheapest to most
//! expensive so garbage fails before any curve arithmetic runs.

use serde_json::Value;
use thiserror::Error;

use super::envelope::SignedEnvelope;
use crate::crypto::hash::tx_hash;
use crate::crypto::keys::{address, PublicKey, Signature};
use crate::crypto::signatures::verify_message;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons an envelope fails verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// The legacy empty envelope. Nothing was signed.
    #[error("envelope is the unsigned sentinel")]
    Sentinel,

    #[error("envelope has no payload")]
    MissingPayload,

    #[error("malformed public key")]
    MalformedPublicKey,

    #[error("malformed signature")]
    MalformedSignature,

    #[error("payload timestamp is missing or not a non-negative integer")]
    MissingTimestamp,

    /// `from` is absent or names a different address than the public key.
    #[error("sender mismatch: payload says {claimed:?}, public key derives {derived}")]
    SenderMismatch {
        claimed: Option<String>,
        derived: String,
    },

    #[error("signature does not verify against the public key")]
    InvalidSignature,
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verifies a signed envelope.
///
/// The checks, in order:
///
/// 1. **Sentinel**: an empty key and signature are rejected outright.
/// 2. **Payload** must be present.
/// 3. **Public key** must decode to a valid Ed25519 point.
/// 4. **Signature** must be 128 hex characters.
/// 5. **Timestamp** must be a non-negative integer.
/// 6. **Sender**: `from` must equal `address(public_key)`. Without this a
///    valid signature by one key could claim to spend from another wallet.
/// 7. **Signature** must verify over `tx_hash(payload)`.
pub fn verify_envelope(envelope: &SignedEnvelope) -> Result<(), VerificationError> {
    // 1. Legacy sentinel.
    if envelope.is_sentinel() {
        return Err(VerificationError::Sentinel);
    }

    // 2. Payload.
    let payload = envelope
        .payload
        .as_ref()
        .ok_or(VerificationError::MissingPayload)?;

    // 3-4. Key and signature shape.
    let public_key = PublicKey::from_hex(&envelope.public_key)
        .map_err(|_| VerificationError::MalformedPublicKey)?;
    let signature =
        Signature::from_hex(&envelope.signature).map_err(|_| VerificationError::MalformedSignature)?;

    // 5. Timestamp.
    let timestamp = payload
        .get("timestamp")
        .and_then(Value::as_u64)
        .ok_or(VerificationError::MissingTimestamp)?;

    // 6. Sender binding. The address is derived from the hex text as sent.
    let derived = address(&envelope.public_key);
    let claimed = payload.get("from").and_then(Value::as_str);
    if claimed != Some(derived.as_str()) {
        return Err(VerificationError::SenderMismatch {
            claimed: claimed.map(str::to_string),
            derived,
        });
    }

    // 7. Signature.
    let message = tx_hash(&Value::Object(payload.clone()), timestamp);
    if !verify_message(&public_key, &message, &signature) {
        return Err(VerificationError::InvalidSignature);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Payload signing.
//!
//! The [`Signer`] turns a payload map and a private key into a
//! [`SignedEnvelope`]:
//!
//! 1. Validate the private key (64 hex characters).
//! 2. Derive the public key and the sender address.
//! 3. Write `from` into the payload.
//! 4. If `timestamp` is not a number, write `now` into it. `"transaction"`
//!    payloads get `now + 2s`; the endpoint rejects stamps from the past.
//! 5. Sign `tx_hash(payload)`.
//!
//! Existing keys are updated in place and missing keys are appended, so a
//! payload built with a `timestamp: null` placeholder keeps `timestamp`
//! before `from`. Key order is part of the signed bytes.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::envelope::SignedEnvelope;
use super::types::Transaction;
use crate::clock::{Clock, SystemClock};
use crate::config::{DEFAULT_PAYLOAD_KEY, TRANSACTION_TIMESTAMP_SKEW_MICROS};
use crate::crypto::hash::tx_hash;
use crate::crypto::keys::{KeyError, Keypair};
use crate::crypto::signatures::sign_message;

/// Errors that can occur while signing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    #[error(transparent)]
    InvalidKey(#[from] KeyError),

    /// `timestamp` is a number, but not a non-negative integer.
    #[error("payload timestamp must be a non-negative integer")]
    InvalidTimestamp,

    #[error("failed to serialize envelope: {0}")]
    Serialization(String),
}

/// What the signer does with a malformed private key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidKeyPolicy {
    /// Return [`SigningError::InvalidKey`].
    #[default]
    Reject,
    /// Return the legacy sentinel envelope (`{"public_key":"","signature":""}`)
    /// and log a warning. For callers that still feed the old endpoint
    /// contract. Check [`SignedEnvelope::is_sentinel`] before broadcasting.
    LegacySentinel,
}

/// Signs payloads with a private key.
///
/// # Example
///
/// ```
/// use qcc_protocol::clock::FixedClock;
/// use qcc_protocol::transaction::Signer;
/// use serde_json::json;
///
/// let signer = Signer::with_clock(FixedClock(1_700_000_000_000_000));
/// let payload = json!({"type": "Send", "to": "abc", "amount": "1"});
/// let env = signer
///     .sign(payload.as_object().unwrap().clone(), &"00".repeat(32), "transaction")
///     .unwrap();
/// assert_eq!(env.timestamp(), Some(1_700_000_002_000_000));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Signer<C = SystemClock> {
    clock: C,
    policy: InvalidKeyPolicy,
}

impl Signer<SystemClock> {
    /// A signer on the wall clock that rejects malformed keys.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> Signer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            policy: InvalidKeyPolicy::default(),
        }
    }

    pub fn invalid_key_policy(mut self, policy: InvalidKeyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> InvalidKeyPolicy {
        self.policy
    }

    /// Signs `payload` and wraps it under `payload_key`.
    pub fn sign(
        &self,
        mut payload: Map<String, Value>,
        private_key_hex: &str,
        payload_key: &str,
    ) -> Result<SignedEnvelope, SigningError> {
        let keypair = match Keypair::from_private_key_hex(private_key_hex) {
            Ok(kp) => kp,
            Err(err) => return self.invalid_key(err),
        };

        let public_key = keypair.public_key_hex();
        let from = keypair.address();
        payload.insert("from".into(), Value::from(from.as_str()));

        let timestamp = match payload.get("timestamp") {
            Some(Value::Number(n)) => n.as_u64().ok_or(SigningError::InvalidTimestamp)?,
            _ => {
                let skew = if payload_key == DEFAULT_PAYLOAD_KEY {
                    TRANSACTION_TIMESTAMP_SKEW_MICROS
                } else {
                    0
                };
                let ts = self.clock.now_micros() + skew;
                payload.insert("timestamp".into(), Value::from(ts));
                ts
            }
        };

        let message = tx_hash(&Value::Object(payload.clone()), timestamp);
        let signature = sign_message(&keypair, &message).to_hex();

        debug!(%from, payload_key, timestamp, "signed payload");

        Ok(SignedEnvelope {
            payload_key: payload_key.to_string(),
            payload: Some(payload),
            public_key,
            signature,
        })
    }

    /// Signs a [`Transaction`] under the `"transaction"` key.
    pub fn sign_transaction(
        &self,
        tx: &Transaction,
        private_key_hex: &str,
    ) -> Result<SignedEnvelope, SigningError> {
        self.sign(tx.to_payload(), private_key_hex, DEFAULT_PAYLOAD_KEY)
    }

    fn invalid_key(&self, err: KeyError) -> Result<SignedEnvelope, SigningError> {
        match self.policy {
            InvalidKeyPolicy::Reject => Err(err.into()),
            InvalidKeyPolicy::LegacySentinel => {
                warn!("invalid private key, returning empty sentinel envelope");
                Ok(SignedEnvelope::sentinel())
            }
        }
    }
}

/// Signs with the wall clock and the default policy.
pub fn sign_payload(
    payload: Map<String, Value>,
    private_key_hex: &str,
    payload_key: &str,
) -> Result<SignedEnvelope, SigningError> {
    Signer::new().sign(payload, private_key_hex, payload_key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::crypto::signatures::verify_hex;
    use serde_json::json;

    const ZERO_KEY: &str = "0000000000000000000000000000000000000000000000000000000000000000";
    const ZERO_KEY_PUBLIC: &str = "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29";
    const ZERO_KEY_ADDRESS: &str = "3d64dbc4b1ba36651c7d0304cb5f5bc077550bc48ee3";
    const TO: &str = "9d2fdce4c234c11b89484624934c181a2b13ce451a70";
    const NOW: u64 = 1_700_000_000_000_000;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    fn signer() -> Signer<FixedClock> {
        Signer::with_clock(FixedClock(NOW))
    }

    #[test]
    fn known_send_vector() {
        let payload = obj(json!({
            "type": "Send",
            "to": TO,
            "amount": "1000000000000000000",
            "timestamp": NOW,
        }));
        let env = signer().sign(payload, ZERO_KEY, "transaction").unwrap();
        assert_eq!(env.public_key, ZERO_KEY_PUBLIC);
        assert_eq!(
            env.signature,
            "a9b8e5a0d062d79f7e75b1219b163c44089bca49ba9592cf6f91b60217bb4d29\
             9ae6364d197ade7a3cc2fa83f81eb2a5032dc8d8d57a7c738576b452b5ef8f07"
        );
        assert_eq!(env.from_address(), Some(ZERO_KEY_ADDRESS));
    }

    #[test]
    fn known_stake_vector_with_float_field() {
        // `apy` hashes as `6`, as the endpoint's JSON.stringify writes it.
        let payload = obj(json!({"op": "stake", "apy": 6.0, "timestamp": 1}));
        let env = signer().sign(payload, ZERO_KEY, "stake").unwrap();
        assert_eq!(
            env.signature,
            "cfa63c073546adae99514e3199c6ee9d452e2324cbb3fe81dd3928f849bfffef\
             2dd6d4815c6710819dcf00ad8027c68f9841c7f50d354eaa7695516b920fe90e"
        );
    }

    #[test]
    fn signature_covers_tx_hash() {
        let env = signer()
            .sign(obj(json!({"type": "Send", "timestamp": NOW})), ZERO_KEY, "transaction")
            .unwrap();
        let payload = Value::Object(env.payload.clone().unwrap());
        let message = tx_hash(&payload, NOW);
        assert!(verify_hex(&env.public_key, &message, &env.signature).is_ok());
    }

    #[test]
    fn signing_is_deterministic() {
        let p = obj(json!({"type": "Send", "timestamp": NOW}));
        let a = signer().sign(p.clone(), ZERO_KEY, "transaction").unwrap();
        let b = signer().sign(p, ZERO_KEY, "transaction").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_timestamp_gets_skew_for_transactions() {
        let env = signer()
            .sign(obj(json!({"type": "Send"})), ZERO_KEY, "transaction")
            .unwrap();
        assert_eq!(env.timestamp(), Some(NOW + 2_000_000));
    }

    #[test]
    fn missing_timestamp_no_skew_for_other_payloads() {
        let env = signer().sign(obj(json!({"op": "stake"})), ZERO_KEY, "stake").unwrap();
        assert_eq!(env.timestamp(), Some(NOW));
        assert_eq!(env.payload_key, "stake");
    }

    #[test]
    fn non_numeric_timestamp_is_replaced() {
        let env = signer()
            .sign(obj(json!({"timestamp": "123"})), ZERO_KEY, "transaction")
            .unwrap();
        assert_eq!(env.timestamp(), Some(NOW + 2_000_000));
    }

    #[test]
    fn fractional_timestamp_is_rejected() {
        let result = signer().sign(obj(json!({"timestamp": 1.5})), ZERO_KEY, "transaction");
        assert_eq!(result, Err(SigningError::InvalidTimestamp));
    }

    #[test]
    fn appended_keys_follow_from_then_timestamp() {
        let env = signer().sign(obj(json!({"type": "Send"})), ZERO_KEY, "transaction").unwrap();
        let keys: Vec<_> = env.payload.unwrap().keys().cloned().collect();
        assert_eq!(keys, ["type", "from", "timestamp"]);
    }

    #[test]
    fn existing_keys_are_updated_in_place() {
        let payload = obj(json!({"from": "spoofed", "timestamp": null, "type": "Send"}));
        let env = signer().sign(payload, ZERO_KEY, "transaction").unwrap();
        let map = env.payload.unwrap();
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, ["from", "timestamp", "type"]);
        assert_eq!(map["from"], json!(ZERO_KEY_ADDRESS));
    }

    #[test]
    fn transaction_placeholder_keeps_timestamp_before_from() {
        let tx = Transaction::send(TO, "1", None);
        let env = signer().sign_transaction(&tx, ZERO_KEY).unwrap();
        let keys: Vec<_> = env.payload.unwrap().keys().cloned().collect();
        assert_eq!(keys, ["type", "to", "amount", "timestamp", "from"]);
    }

    #[test]
    fn invalid_key_is_rejected_by_default() {
        let (short, nonhex, spaced) = ("0".repeat(63), "g".repeat(64), " 0".repeat(32));
        for bad in ["", "00", short.as_str(), nonhex.as_str(), spaced.as_str()] {
            assert_eq!(
                signer().sign(Map::new(), bad, "transaction"),
                Err(SigningError::InvalidKey(KeyError::InvalidPrivateKey)),
                "key {bad:?}"
            );
        }
    }

    #[test]
    fn legacy_policy_returns_sentinel() {
        let s = signer().invalid_key_policy(InvalidKeyPolicy::LegacySentinel);
        let env = s.sign(obj(json!({"type": "Send"})), "nope", "transaction").unwrap();
        assert!(env.is_sentinel());
        assert_eq!(env.to_json().unwrap(), r#"{"public_key":"","signature":""}"#);
    }

    #[test]
    fn uppercase_key_signs_like_lowercase() {
        let p = obj(json!({"timestamp": NOW}));
        let lower = signer().sign(p.clone(), &"ab".repeat(32), "transaction").unwrap();
        let upper = signer().sign(p, &"AB".repeat(32), "transaction").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn sign_payload_uses_wall_clock() {
        let before = SystemClock.now_micros();
        let env = sign_payload(Map::new(), ZERO_KEY, "transaction").unwrap();
        let ts = env.timestamp().unwrap();
        assert!(ts >= before + 2_000_000);
    }
}

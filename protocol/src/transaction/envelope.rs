//! The signed envelope: the JSON object that actually goes over the wire.
//!
//! ```text
//! {"public_key":"<64 hex>","signature":"<128 hex>","<payload_key>":{...}}
//! ```
//!
//! Keys are emitted in that order. The broadcast endpoint does not care,
//! but existing clients produce this order and byte-identical output makes
//! envelopes diffable across implementations.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::DEFAULT_PAYLOAD_KEY;

/// A signed payload plus the key that signed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    /// Name of the payload field, usually `"transaction"`.
    pub payload_key: String,
    /// The signed payload, with `from` and `timestamp` filled in. `None`
    /// only for the legacy sentinel.
    pub payload: Option<Map<String, Value>>,
    /// Signer's public key, lowercase hex.
    pub public_key: String,
    /// Detached Ed25519 signature over the payload's time-hash, lowercase hex.
    pub signature: String,
}

impl SignedEnvelope {
    /// The legacy "invalid key" result: empty key, empty signature, no
    /// payload. Serializes to `{"public_key":"","signature":""}`.
    pub fn sentinel() -> Self {
        Self {
            payload_key: DEFAULT_PAYLOAD_KEY.to_string(),
            payload: None,
            public_key: String::new(),
            signature: String::new(),
        }
    }

    /// `true` if this envelope carries no signature. Such an envelope must
    /// never be broadcast.
    pub fn is_sentinel(&self) -> bool {
        self.public_key.is_empty() && self.signature.is_empty()
    }

    /// A field of the payload, if present.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.as_ref().and_then(|p| p.get(key))
    }

    /// The payload's `timestamp`, if it is a non-negative integer.
    pub fn timestamp(&self) -> Option<u64> {
        self.field("timestamp").and_then(Value::as_u64)
    }

    /// The payload's `from` address.
    pub fn from_address(&self) -> Option<&str> {
        self.field("from").and_then(Value::as_str)
    }

    /// Compact JSON, ready for the request body.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Serialize for SignedEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.payload.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("public_key", &self.public_key)?;
        map.serialize_entry("signature", &self.signature)?;
        if let Some(payload) = &self.payload {
            map.serialize_entry(&self.payload_key, payload)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SignedEnvelope {
    /// Accepts the three keys in any order. The payload key is whichever
    /// remaining key holds an object.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = Map::<String, Value>::deserialize(deserializer)?;

        let public_key = take_string(&mut raw, "public_key")?;
        let signature = take_string(&mut raw, "signature")?;

        let payload_key = raw
            .iter()
            .find(|(_, v)| v.is_object())
            .map(|(k, _)| k.clone());

        let (payload_key, payload) = match payload_key {
            Some(key) => {
                let payload = match raw.remove(&key) {
                    Some(Value::Object(map)) => Some(map),
                    _ => None,
                };
                (key, payload)
            }
            None => (DEFAULT_PAYLOAD_KEY.to_string(), None),
        };

        Ok(Self {
            payload_key,
            payload,
            public_key,
            signature,
        })
    }
}

fn take_string<E: de::Error>(raw: &mut Map<String, Value>, key: &'static str) -> Result<String, E> {
    match raw.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(E::custom(format!("`{key}` must be a string"))),
        None => Err(E::missing_field(key)),
    }
}

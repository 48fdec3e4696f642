//! # Hashing Utilities
//!
//! The wallet hashes *strings*, not bytes. Every helper here takes the
//! canonical string form of a value (see [`super::canonical`]), hashes its
//! UTF-8 bytes, and hands back lowercase hex. Chained constructions hash the
//! hex text of the previous step, never the raw digest. That is what the
//! broadcast endpoint does, so that is what we do.
//!
//! ```text
//! hash(v)        = sha256_hex(canonical(v))
//! short_hash(v)  = ripemd160_hex(hash(v))                       40 hex
//! checksum(h)    = hash(hash(h))[..4]                            4 hex
//! id_hash(v)     = short_hash(v) || checksum(short_hash(v))     44 hex
//! time_hash(v,t) = hextime(t) || hash(v)                        78 hex
//! tx_hash(p)     = time_hash(hash(p), p.timestamp)
//! ```
//!
//! Two algorithms, picked by an enum. No lookups by name.

use ripemd::Ripemd160;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::canonical::{canonicalize, canonicalize_str};
use crate::clock::Clock;
use crate::config::{CHECKSUM_HEX_LENGTH, HEX_TIME_SIZE};

/// The digest algorithms the wallet uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256, 32-byte digest.
    Sha256,
    /// RIPEMD-160, 20-byte digest. Only used to shorten addresses.
    Ripemd160,
}

impl HashAlgorithm {
    /// Hashes raw bytes.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Ripemd160 => Ripemd160::digest(data).to_vec(),
        }
    }

    /// Hashes the UTF-8 bytes of `data` and returns lowercase hex.
    pub fn digest_hex(self, data: &str) -> String {
        hex::encode(self.digest(data.as_bytes()))
    }

    /// Digest length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Ripemd160 => 20,
        }
    }
}

/// SHA-256 of a byte slice, as a fixed-size array.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 of a string, lowercase hex. 64 characters.
pub fn sha256_hex(s: &str) -> String {
    HashAlgorithm::Sha256.digest_hex(s)
}

/// RIPEMD-160 of a string, lowercase hex. 40 characters.
pub fn ripemd160_hex(s: &str) -> String {
    HashAlgorithm::Ripemd160.digest_hex(s)
}

/// Canonical hash of a value: SHA-256 over its canonical string.
pub fn hash(value: &Value) -> String {
    sha256_hex(&canonicalize(value))
}

/// Canonical hash of a bare string. Same as `hash(&Value::String(..))`.
pub fn hash_str(s: &str) -> String {
    sha256_hex(&canonicalize_str(s))
}

/// RIPEMD-160 of the canonical hash.
pub fn short_hash(value: &Value) -> String {
    ripemd160_hex(&hash(value))
}

/// [`short_hash`] for a bare string.
pub fn short_hash_str(s: &str) -> String {
    ripemd160_hex(&hash_str(s))
}

/// First four hex characters of the double canonical hash of `h`.
pub fn checksum(h: &str) -> String {
    let mut double = hash_str(&hash_str(h));
    double.truncate(CHECKSUM_HEX_LENGTH);
    double
}

/// Short hash followed by its checksum. 44 hex characters.
pub fn id_hash(value: &Value) -> String {
    with_checksum(short_hash(value))
}

/// [`id_hash`] for a bare string. Addresses are `id_hash_str(public_key_hex)`.
pub fn id_hash_str(s: &str) -> String {
    with_checksum(short_hash_str(s))
}

fn with_checksum(short: String) -> String {
    let sum = checksum(&short);
    short + &sum
}

/// Hex timestamp prefix used by [`time_hash`].
///
/// Lowercase hex, left-padded with zeros to 14 characters, then cut to the
/// first 14. A value that needs more than 14 digits keeps its leading
/// digits and loses the trailing ones. The endpoint does the same cut, so
/// it is reproduced here rather than "fixed".
pub fn hextime(micros: u64) -> String {
    let mut hex = format!("{:0>width$x}", micros, width = HEX_TIME_SIZE);
    hex.truncate(HEX_TIME_SIZE);
    hex
}

/// [`hextime`] of the clock's current reading.
pub fn hextime_now(clock: &impl Clock) -> String {
    hextime(clock.now_micros())
}

/// `hextime(micros) || hash(value)`.
pub fn time_hash(value: &Value, micros: u64) -> String {
    hextime(micros) + &hash(value)
}

/// [`time_hash`] for a bare string.
pub fn time_hash_str(s: &str, micros: u64) -> String {
    hextime(micros) + &hash_str(s)
}

/// The message a transaction signature covers:
/// `time_hash(hash(payload), timestamp)`.
///
/// Note the double hash: the canonical hash of the payload is itself
/// hashed once more inside `time_hash`.
pub fn tx_hash(payload: &Value, timestamp: u64) -> String {
    time_hash_str(&hash(payload), timestamp)
}

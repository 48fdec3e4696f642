//! # Key Management
//!
//! Ed25519 keypairs for wallet identities.
//!
//! A wallet's private key is the 32-byte Ed25519 seed, carried around as 64
//! hex characters. The public key is derived from it deterministically and
//! the address from the public key's *hex text* (see [`address`]). Nothing
//! else is ever derived from a private key, and no second private key is
//! ever produced from one.
//!
//! ## Validation
//!
//! Private keys are checked against `^[0-9a-fA-F]{64}$` before anything is
//! decoded. A key that fails is rejected outright; the signer never signs
//! with partially decoded material.
//!
//! Key bytes are never logged and never printed by `Debug`.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::hash::id_hash_str;
use crate::config::{PRIVATE_KEY_HEX_LENGTH, PUBLIC_KEY_HEX_LENGTH, SIGNATURE_HEX_LENGTH};

/// Errors that can occur during key operations.
///
/// Messages describe the shape problem only. They never echo the input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid private key: expected 64 hex characters")]
    InvalidPrivateKey,

    #[error("invalid public key: expected 64 hex characters encoding an Ed25519 point")]
    InvalidPublicKey,

    #[error("invalid signature: expected 128 hex characters")]
    InvalidSignature,
}

/// Returns `true` if `key` is exactly 64 hex characters (either case).
pub fn is_valid_private_key(key: &str) -> bool {
    key.len() == PRIVATE_KEY_HEX_LENGTH && key.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Derives the address for a hex public key: `id_hash(public_key_hex)`.
///
/// The hash input is the hex *string*, lowercase as produced by
/// [`PublicKey::to_hex`]. Passing uppercase hex gives a different address.
pub fn address(public_key_hex: &str) -> String {
    id_hash_str(public_key_hex)
}

/// A wallet keypair wrapping an Ed25519 signing key.
///
/// Deliberately not `Serialize`. Exporting a private key should be an
/// explicit call to [`private_key_hex`](Self::private_key_hex).
///
/// # Examples
///
/// ```
/// use qcc_protocol::crypto::keys::Keypair;
///
/// let kp = Keypair::from_private_key_hex(&"00".repeat(32)).unwrap();
/// let sig = kp.sign(b"hello");
/// assert!(kp.public_key().verify(b"hello", &sig));
/// assert_eq!(kp.address().len(), 44);
/// ```
pub struct Keypair {
    signing_key: SigningKey,
}

/// The public half of a keypair.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    bytes: [u8; 32],
}

/// A detached Ed25519 signature. Always 64 bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    bytes: [u8; 64],
}

impl Keypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        Self { signing_key }
    }

    /// Builds the keypair whose Ed25519 seed is `seed`.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parses a 64-character hex private key.
    ///
    /// Rejects anything that is not exactly 64 hex digits, including
    /// surrounding whitespace and a `0x` prefix.
    pub fn from_private_key_hex(private_key: &str) -> Result<Self, KeyError> {
        if !is_valid_private_key(private_key) {
            return Err(KeyError::InvalidPrivateKey);
        }
        let mut seed = [0u8; 32];
        hex::decode_to_slice(private_key, &mut seed).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_seed(&seed))
    }

    /// The private key (Ed25519 seed) as lowercase hex.
    ///
    /// This is the secret. Don't log it.
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// The 64-byte secret key in the NaCl layout: `seed || public_key`.
    pub fn to_keypair_bytes(&self) -> [u8; 64] {
        self.signing_key.to_keypair_bytes()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Lowercase hex public key. 64 characters.
    pub fn public_key_hex(&self) -> String {
        self.public_key().to_hex()
    }

    /// The wallet address for this keypair.
    pub fn address(&self) -> String {
        self.public_key().address()
    }

    /// Detached signature over `message`. Deterministic (RFC 8032).
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature {
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }
}

impl Clone for Keypair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair(pub={})", self.public_key_hex())
    }
}

impl PartialEq for Keypair {
    /// Compares public keys only.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for Keypair {}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

impl PublicKey {
    /// Wraps raw bytes after checking they decode to a curve point.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, KeyError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// Parses a 64-character hex public key.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        if s.len() != PUBLIC_KEY_HEX_LENGTH {
            return Err(KeyError::InvalidPublicKey);
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// The wallet address derived from this key.
    pub fn address(&self) -> String {
        address(&self.to_hex())
    }

    /// Returns `true` if `signature` is valid for `message` under this key.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig = DalekSignature::from_bytes(&signature.bytes);
        verifying_key.verify(message, &sig).is_ok()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

impl Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self { bytes }
    }

    /// Parses a 128-character hex signature.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        if s.len() != SIGNATURE_HEX_LENGTH {
            return Err(KeyError::InvalidSignature);
        }
        let mut bytes = [0u8; 64];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| KeyError::InvalidSignature)?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.bytes
    }

    /// Lowercase hex. 128 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 8032, section 7.1, TEST 1.
    const RFC_SECRET: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const RFC_PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
    const RFC_SIG: &str = "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b";

    #[test]
    fn test_rfc8032_vector() {
        let kp = Keypair::from_private_key_hex(RFC_SECRET).unwrap();
        assert_eq!(kp.public_key_hex(), RFC_PUBLIC);
        assert_eq!(kp.sign(b"").to_hex(), RFC_SIG);
    }

    #[test]
    fn test_private_key_round_trip() {
        let kp = Keypair::from_private_key_hex(RFC_SECRET).unwrap();
        assert_eq!(kp.private_key_hex(), RFC_SECRET);
    }

    #[test]
    fn uppercase_private_key_is_accepted() {
        let upper = RFC_SECRET.to_uppercase();
        let kp = Keypair::from_private_key_hex(&upper).unwrap();
        assert_eq!(kp.public_key_hex(), RFC_PUBLIC);
    }

    #[test]
    fn malformed_private_keys_are_rejected() {
        let short = &RFC_SECRET[..63];
        let long = format!("{}0", RFC_SECRET);
        let non_hex = format!("{}g", &RFC_SECRET[..63]);
        let prefixed = format!("0x{}", &RFC_SECRET[..62]);
        let padded = format!(" {}", &RFC_SECRET[..63]);

        for bad in [short, long.as_str(), non_hex.as_str(), prefixed.as_str(), padded.as_str(), ""] {
            assert_eq!(
                Keypair::from_private_key_hex(bad).unwrap_err(),
                KeyError::InvalidPrivateKey,
                "accepted {bad:?}"
            );
            assert!(!is_valid_private_key(bad));
        }
    }

    #[test]
    fn keypair_bytes_are_seed_then_public() {
        let kp = Keypair::from_private_key_hex(RFC_SECRET).unwrap();
        let bytes = kp.to_keypair_bytes();
        assert_eq!(hex::encode(&bytes[..32]), RFC_SECRET);
        assert_eq!(hex::encode(&bytes[32..]), RFC_PUBLIC);
    }

    #[test]
    fn address_is_id_hash_of_public_hex() {
        let kp = Keypair::from_private_key_hex(RFC_SECRET).unwrap();
        assert_eq!(kp.address(), id_hash_str(RFC_PUBLIC));
        assert_eq!(kp.address(), address(RFC_PUBLIC));
        assert_eq!(kp.address().len(), 44);
    }

    #[test]
    fn address_is_stable() {
        let a = Keypair::from_private_key_hex(RFC_SECRET).unwrap().address();
        let b = Keypair::from_private_key_hex(RFC_SECRET).unwrap().address();
        assert_eq!(a, b);
    }

    #[test]
    fn verify_rejects_wrong_message_and_key() {
        let kp = Keypair::from_private_key_hex(RFC_SECRET).unwrap();
        let other = Keypair::generate();
        let sig = kp.sign(b"message");
        assert!(kp.public_key().verify(b"message", &sig));
        assert!(!kp.public_key().verify(b"massage", &sig));
        assert!(!other.public_key().verify(b"message", &sig));
    }

    #[test]
    fn public_key_hex_parsing() {
        let pk = PublicKey::from_hex(RFC_PUBLIC).unwrap();
        assert_eq!(pk.to_hex(), RFC_PUBLIC);
        assert_eq!(PublicKey::from_hex("abcd"), Err(KeyError::InvalidPublicKey));
        assert_eq!(
            PublicKey::from_hex(&"zz".repeat(32)),
            Err(KeyError::InvalidPublicKey)
        );
    }

    #[test]
    fn signature_hex_parsing() {
        let sig = Signature::from_hex(RFC_SIG).unwrap();
        assert_eq!(sig.to_hex(), RFC_SIG);
        assert_eq!(Signature::from_hex(&RFC_SIG[..126]), Err(KeyError::InvalidSignature));
    }

    #[test]
    fn debug_never_prints_secret() {
        let kp = Keypair::from_private_key_hex(RFC_SECRET).unwrap();
        let dbg = format!("{:?}", kp);
        assert!(!dbg.contains(RFC_SECRET));
        assert!(dbg.contains(RFC_PUBLIC));
    }

    #[test]
    fn clone_preserves_identity() {
        let kp = Keypair::generate();
        assert_eq!(kp.clone(), kp);
    }
}

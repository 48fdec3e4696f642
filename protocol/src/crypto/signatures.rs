//! # Digital Signatures
//!
//! Signing and verification over *string* messages.
//!
//! The wallet never signs raw digests. It signs the text of a time-hash
//! (78 hex characters), converted to bytes one UTF-16 code unit at a time
//! with each unit truncated to its low byte. For the hex messages the core
//! produces that is just the ASCII bytes. The truncation is kept so that
//! anything else fed through here signs exactly what the endpoint expects.

use thiserror::Error;

use super::canonical::canonicalize_str;
use super::keys::{KeyError, Keypair, PublicKey, Signature};

/// Errors during signature verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error(transparent)]
    Key(#[from] KeyError),
}

/// The byte image of a message: each UTF-16 code unit masked to 8 bits.
pub fn message_bytes(message: &str) -> Vec<u8> {
    if message.is_ascii() {
        return message.as_bytes().to_vec();
    }
    message.encode_utf16().map(|unit| (unit & 0xff) as u8).collect()
}

/// Signs the canonical form of `message`.
///
/// # Example
///
/// ```
/// use qcc_protocol::crypto::keys::Keypair;
/// use qcc_protocol::crypto::signatures::{sign_message, verify_message};
///
/// let kp = Keypair::generate();
/// let sig = sign_message(&kp, "00018bcfe5680000abcd");
/// assert!(verify_message(&kp.public_key(), "00018bcfe5680000abcd", &sig));
/// ```
pub fn sign_message(keypair: &Keypair, message: &str) -> Signature {
    keypair.sign(&message_bytes(&canonicalize_str(message)))
}

/// Checks a signature produced by [`sign_message`].
pub fn verify_message(public_key: &PublicKey, message: &str, signature: &Signature) -> bool {
    public_key.verify(&message_bytes(&canonicalize_str(message)), signature)
}

/// [`verify_message`] over hex-encoded key and signature, as they appear in
/// an envelope.
pub fn verify_hex(
    public_key_hex: &str,
    message: &str,
    signature_hex: &str,
) -> Result<(), SignatureError> {
    let public_key = PublicKey::from_hex(public_key_hex)?;
    let signature = Signature::from_hex(signature_hex)?;
    if verify_message(&public_key, message, &signature) {
        Ok(())
    } else {
        Err(SignatureError::VerificationFailed)
    }
}

/// Verifies every `(public_key, message, signature)` triple.
///
/// Fails on the first bad entry without saying which one it was.
pub fn batch_verify(items: &[(PublicKey, String, Signature)]) -> Result<(), SignatureError> {
    for (public_key, message, signature) in items {
        if !verify_message(public_key, message, signature) {
            return Err(SignatureError::VerificationFailed);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_messages_are_their_bytes() {
        assert_eq!(message_bytes("abc123"), b"abc123".to_vec());
    }

    #[test]
    fn wide_units_are_truncated_to_low_byte() {
        // U+0100 -> 0x00, U+D55C -> 0x5C, 'a' -> 0x61
        assert_eq!(message_bytes("\u{100}\u{d55c}a"), vec![0x00, 0x5c, 0x61]);
        // Latin-1 stays one byte, unlike its UTF-8 encoding.
        assert_eq!(message_bytes("é"), vec![0xe9]);
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let kp = Keypair::generate();
        let msg = "060a24181e4000e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        let sig = sign_message(&kp, msg);
        assert!(verify_message(&kp.public_key(), msg, &sig));
        assert!(verify_hex(&kp.public_key_hex(), msg, &sig.to_hex()).is_ok());
    }

    #[test]
    fn hex_message_signature_equals_raw_signature() {
        let kp = Keypair::generate();
        let msg = "00ff";
        assert_eq!(sign_message(&kp, msg), kp.sign(b"00ff"));
    }

    #[test]
    fn verify_hex_reports_malformed_inputs() {
        let kp = Keypair::generate();
        let sig = sign_message(&kp, "m").to_hex();
        assert_eq!(
            verify_hex("abc", "m", &sig),
            Err(SignatureError::Key(KeyError::InvalidPublicKey))
        );
        assert_eq!(
            verify_hex(&kp.public_key_hex(), "m", "00"),
            Err(SignatureError::Key(KeyError::InvalidSignature))
        );
        assert_eq!(
            verify_hex(&kp.public_key_hex(), "other", &sig),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn batch_verify_fails_on_any_bad_entry() {
        let items: Vec<_> = (0..4)
            .map(|i| {
                let kp = Keypair::generate();
                let msg = format!("tx-{i}");
                let sig = sign_message(&kp, &msg);
                (kp.public_key(), msg, sig)
            })
            .collect();
        assert!(batch_verify(&items).is_ok());

        let mut tampered = items.clone();
        tampered[2].1 = "tx-x".to_string();
        assert_eq!(batch_verify(&tampered), Err(SignatureError::VerificationFailed));
    }
}

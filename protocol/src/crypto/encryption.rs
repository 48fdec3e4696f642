//! # Passphrase Encryption (OpenSSL "Salted__" format)
//!
//! Key files exported by the web wallet were sealed with CryptoJS's
//! passphrase mode, which is OpenSSL's legacy `enc` format:
//!
//! ```text
//! base64( "Salted__" || salt[8] || AES-256-CBC(key, iv, PKCS#7(plaintext)) )
//! (key, iv) = EVP_BytesToKey(MD5, passphrase, salt, count = 1)
//! ```
//!
//! This is not a good format. One MD5 round is no KDF, and CBC without a MAC
//! gives no integrity: a wrong passphrase usually shows up as a padding
//! error, occasionally as garbage. Callers must validate the plaintext.
//! It is implemented because existing `.qcc` files use it.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use md5::{Digest, Md5};
use rand::RngCore;
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Magic prefix of a salted container.
const SALTED_MAGIC: &[u8; 8] = b"Salted__";

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 8;

const KEY_LENGTH: usize = 32;
const IV_LENGTH: usize = 16;

/// Errors that can occur during encryption/decryption.
///
/// Wrong passphrase and corrupted ciphertext are reported the same way.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("ciphertext is not valid base64")]
    InvalidEncoding,

    #[error("ciphertext is missing the Salted__ header")]
    MissingSalt,

    #[error("decryption failed -- wrong passphrase or corrupted ciphertext")]
    DecryptFailed,

    #[error("encryption failed")]
    EncryptFailed,
}

/// OpenSSL `EVP_BytesToKey` with MD5 and a single iteration.
///
/// Returns `(key, iv)` for AES-256-CBC.
pub fn evp_bytes_to_key(
    passphrase: &[u8],
    salt: &[u8; SALT_LENGTH],
) -> ([u8; KEY_LENGTH], [u8; IV_LENGTH]) {
    let mut derived = Vec::with_capacity(KEY_LENGTH + IV_LENGTH + 16);
    let mut block: Vec<u8> = Vec::new();
    while derived.len() < KEY_LENGTH + IV_LENGTH {
        let mut hasher = Md5::new();
        hasher.update(&block);
        hasher.update(passphrase);
        hasher.update(salt);
        block = hasher.finalize().to_vec();
        derived.extend_from_slice(&block);
    }

    let mut key = [0u8; KEY_LENGTH];
    let mut iv = [0u8; IV_LENGTH];
    key.copy_from_slice(&derived[..KEY_LENGTH]);
    iv.copy_from_slice(&derived[KEY_LENGTH..KEY_LENGTH + IV_LENGTH]);
    (key, iv)
}

/// Seals `plaintext` under `passphrase` with a fresh random salt.
///
/// # Example
///
/// ```
/// use qcc_protocol::crypto::encryption::{decrypt_with_passphrase, encrypt_with_passphrase};
///
/// let sealed = encrypt_with_passphrase("hunter2", b"wallet json").unwrap();
/// assert!(sealed.starts_with("U2FsdGVkX1"));
/// let opened = decrypt_with_passphrase("hunter2", &sealed).unwrap();
/// assert_eq!(opened, b"wallet json");
/// ```
pub fn encrypt_with_passphrase(passphrase: &str, plaintext: &[u8]) -> Result<String, EncryptionError> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    encrypt_with_salt(passphrase, &salt, plaintext)
}

/// Seals `plaintext` with a caller-chosen salt. Deterministic; meant for
/// known-answer tests and fixtures.
pub fn encrypt_with_salt(
    passphrase: &str,
    salt: &[u8; SALT_LENGTH],
    plaintext: &[u8],
) -> Result<String, EncryptionError> {
    let (key, iv) = evp_bytes_to_key(passphrase.as_bytes(), salt);
    let cipher =
        Aes256CbcEnc::new_from_slices(&key, &iv).map_err(|_| EncryptionError::EncryptFailed)?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut container = Vec::with_capacity(SALTED_MAGIC.len() + SALT_LENGTH + ciphertext.len());
    container.extend_from_slice(SALTED_MAGIC);
    container.extend_from_slice(salt);
    container.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(container))
}

/// Opens a container produced by [`encrypt_with_passphrase`] or by CryptoJS.
///
/// Surrounding whitespace (a trailing newline in a file, say) is ignored.
pub fn decrypt_with_passphrase(passphrase: &str, sealed: &str) -> Result<Vec<u8>, EncryptionError> {
    let raw = STANDARD
        .decode(sealed.trim())
        .map_err(|_| EncryptionError::InvalidEncoding)?;

    let header_len = SALTED_MAGIC.len() + SALT_LENGTH;
    if raw.len() < header_len || &raw[..SALTED_MAGIC.len()] != SALTED_MAGIC {
        return Err(EncryptionError::MissingSalt);
    }

    let mut salt = [0u8; SALT_LENGTH];
    salt.copy_from_slice(&raw[SALTED_MAGIC.len()..header_len]);
    let ciphertext = &raw[header_len..];

    let (key, iv) = evp_bytes_to_key(passphrase.as_bytes(), &salt);
    let cipher =
        Aes256CbcDec::new_from_slices(&key, &iv).map_err(|_| EncryptionError::DecryptFailed)?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| EncryptionError::DecryptFailed)
}

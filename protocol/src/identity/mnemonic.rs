//! # Mnemonic Phrases
//!
//! BIP-39 English phrases, and the one derivation the wallet runs on them:
//!
//! ```text
//! phrase -> PBKDF2 seed (64 bytes, empty passphrase) -> SHA-256 -> private key
//! ```
//!
//! This is *not* BIP-32/SLIP-10. There is no derivation path and no chain
//! code; the whole seed is hashed once and the digest is the Ed25519 seed.
//! Other wallets given the same phrase will derive a different key.

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use crate::config::{mnemonic_strength_bits, SUPPORTED_MNEMONIC_LENGTHS};
use crate::crypto::hash::sha256;

/// Mnemonic parsing and generation errors.
///
/// No variant carries the phrase. A phrase with one wrong word is still
/// most of a seed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("invalid mnemonic phrase")]
    InvalidPhrase,

    #[error("unsupported mnemonic length: {0} words (expected 12, 15, 18, 21 or 24)")]
    UnsupportedLength(usize),

    #[error("invalid entropy length: {0} bytes")]
    InvalidEntropy(usize),
}

/// Generates a fresh phrase of `word_count` words from OS entropy.
pub fn generate_mnemonic(word_count: usize) -> Result<String, MnemonicError> {
    if !SUPPORTED_MNEMONIC_LENGTHS.contains(&word_count) {
        return Err(MnemonicError::UnsupportedLength(word_count));
    }
    let mut entropy = vec![0u8; mnemonic_strength_bits(word_count) / 8];
    OsRng.fill_bytes(&mut entropy);
    mnemonic_from_entropy(&entropy)
}

/// Encodes raw entropy (16 to 32 bytes, in steps of 4) as a phrase.
pub fn mnemonic_from_entropy(entropy: &[u8]) -> Result<String, MnemonicError> {
    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
        .map_err(|_| MnemonicError::InvalidEntropy(entropy.len()))?;
    Ok(mnemonic.to_string())
}

/// Parses and checks a phrase: wordlist membership, word count, checksum.
///
/// Runs of whitespace are collapsed first, so a phrase pasted with a
/// trailing newline or double spaces still validates. Returns the
/// normalized phrase.
pub fn validate_mnemonic(phrase: &str) -> Result<String, MnemonicError> {
    parse(phrase).map(|m| m.to_string())
}

/// PBKDF2 seed of a phrase with an empty passphrase.
pub fn seed_from_mnemonic(phrase: &str) -> Result<[u8; 64], MnemonicError> {
    Ok(parse(phrase)?.to_seed(""))
}

/// SHA-256 of `seed`, hex-encoded. The result is a 64-character private key.
pub fn private_key_from_seed(seed: &[u8]) -> String {
    hex::encode(sha256(seed))
}

fn parse(phrase: &str) -> Result<Mnemonic, MnemonicError> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    let word_count = words.len();
    if !SUPPORTED_MNEMONIC_LENGTHS.contains(&word_count) {
        return Err(MnemonicError::UnsupportedLength(word_count));
    }
    Mnemonic::parse_in_normalized(Language::English, &words.join(" "))
        .map_err(|_| MnemonicError::InvalidPhrase)
}

//! # Wallet Addresses
//!
//! An address is the id-hash of a public key's hex text:
//!
//! ```text
//! public_key_hex (64 chars)
//!     -> SHA-256 hex of the canonical string   (64 chars)
//!     -> RIPEMD-160 hex of that text            (40 chars)
//!     -> || first 4 hex of double SHA-256       (44 chars)
//! ```
//!
//! The four-character checksum is weak, but it catches most single
//! character typos when an address is pasted by hand.

use crate::config::{ADDRESS_HEX_LENGTH, SHORT_HASH_HEX_LENGTH};
use crate::crypto::hash::{checksum, id_hash_str};

/// Derives the address of a hex-encoded public key.
///
/// No validation: any string has an address. Feed it the lowercase hex
/// produced by [`crate::crypto::keys::PublicKey::to_hex`].
pub fn address_from_public_key(public_key_hex: &str) -> String {
    id_hash_str(public_key_hex)
}

/// Returns `true` if `address` is 44 lowercase hex characters and its last
/// four match the checksum of the first forty.
pub fn is_valid_address(address: &str) -> bool {
    if address.len() != ADDRESS_HEX_LENGTH {
        return false;
    }
    if !address
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return false;
    }
    let (short, sum) = address.split_at(SHORT_HASH_HEX_LENGTH);
    checksum(short) == sum
}

/// Shortens an address for display: first six characters, `...`, last four.
///
/// Short inputs are not special-cased: head and tail are clamped to the
/// input, so `"short"` becomes `"short...hort"`. Empty input stays empty.
pub fn truncate_address(address: &str) -> String {
    const HEAD: usize = 6;
    const TAIL: usize = 4;

    if address.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = address.chars().collect();
    let head: String = chars[..HEAD.min(chars.len())].iter().collect();
    let tail: String = chars[chars.len().saturating_sub(TAIL)..].iter().collect();
    format!("{head}...{tail}")
}

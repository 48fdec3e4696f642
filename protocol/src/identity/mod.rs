//! # Identity Module
//!
//! Wallet identities for QCC. Every wallet is a single Ed25519 keypair; the
//! address users share is derived from the public key by a hash chain with a
//! short checksum (see [`address`]).
//!
//! The identity stack is layered:
//!
//! 1. **Mnemonic**: BIP-39 English phrase. Seed via PBKDF2 with an empty
//!    passphrase, private key = SHA-256(seed).
//! 2. **Wallet**: private key, public key, address, and the phrase when the
//!    wallet was created or restored from one.
//! 3. **Address**: derivation, checksum validation, display truncation.
//!
//! ## Design Decisions
//!
//! - Phrase handling uses the `bip39` crate; we never ship our own wordlist.
//! - One key per phrase. No HD derivation paths. Wallets created by the web
//!   front-end use this scheme, and their phrases must keep restoring to the
//!   same address.

pub mod address;
pub mod mnemonic;
pub mod wallet;

pub use address::{address_from_public_key, is_valid_address, truncate_address};
pub use mnemonic::{
    generate_mnemonic, mnemonic_from_entropy, private_key_from_seed, seed_from_mnemonic,
    validate_mnemonic, MnemonicError,
};
pub use wallet::{WalletError, WalletIdentity};

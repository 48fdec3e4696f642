//! # Cryptographic Primitives
//!
//! Everything the wallet signs or derives goes through this module:
//!
//! - **canonical**: the string encoding that all hashing runs over.
//! - **hash**: SHA-256 / RIPEMD-160 chains: short hash, checksum, id hash,
//!   time hash.
//! - **keys**: Ed25519 keypairs, public keys, signatures, addresses.
//! - **signatures**: signing and verifying string messages.
//! - **encryption**: OpenSSL-style passphrase encryption for key files.
//!
//! Every function here is a thin wrapper over audited crates
//! (`ed25519-dalek`, `sha2`, `ripemd`, `aes`/`cbc`). The wrappers exist to
//! pin down the exact byte and string conventions the broadcast endpoint
//! expects, not to reinvent any primitive.

pub mod canonical;
pub mod encryption;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use canonical::canonicalize;
pub use hash::{
    checksum, hash, hextime, hextime_now, id_hash, short_hash, time_hash, tx_hash, HashAlgorithm,
};
pub use keys::{address, is_valid_private_key, KeyError, Keypair, PublicKey, Signature};
pub use signatures::{sign_message, verify_hex, verify_message, SignatureError};

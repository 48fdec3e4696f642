// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # QCC Protocol: Wallet Signing Core
//!
//! Everything a QCC wallet needs between "the user typed a phrase" and
//! "the broadcast endpoint accepted the envelope": key derivation, address
//! encoding, amount conversion, payload signing, key-file storage and the
//! handful of response shapes the wallet has to read back.
//!
//! No networking lives here. Callers fetch and POST; this crate builds and
//! checks the bytes.
//!
//! ## Architecture
//!
//! - **crypto**: Canonical JSON text, the hash chain, Ed25519 keys and the
//!   key-file cipher.
//! - **identity**: Mnemonics, addresses and the [`WalletIdentity`] triple.
//! - **amount**: Exact decimal ↔ base-unit conversion.
//! - **transaction**: Payloads, the signer, signed envelopes, verification
//!   and history records.
//! - **keyfile**: Encrypted `.qcc` wallet backups.
//! - **broadcast**: Server-time and broadcast response decoding.
//! - **staking**: Lock-up periods, reward estimates and the rate cache.
//! - **clock**: Injectable time sources.
//! - **config**: Wire constants.
//!
//! ## Compatibility
//!
//! Signatures produced here are byte-for-byte those of the legacy web
//! wallet. The canonical text, the hash chain and the envelope layout are
//! all pinned by tests against known vectors; changing any of them breaks
//! every wallet already in the field.

pub mod amount;
pub mod broadcast;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod identity;
pub mod keyfile;
pub mod staking;
pub mod transaction;

pub use identity::WalletIdentity;
pub use transaction::{SignedEnvelope, Signer, Transaction, TransactionType};

//! # Transaction Module
//!
//! Construction, signing and verification of QCC transaction requests, plus
//! decoding of the history records the explorer returns.
//!
//! ## Architecture
//!
//! ```text
//! types.rs          TransactionType, the unsigned Transaction, payload maps
//! builder.rs        request builders and the fluent TransactionBuilder
//! signing.rs        Signer: injects `from`/`timestamp`, signs the time-hash
//! envelope.rs       SignedEnvelope and its wire serialization
//! verification.rs   checks an envelope the way the endpoint does
//! record.rs         history rows: stored payload decoding, display amounts
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: [`TransactionBuilder`] or [`Transaction::send`] /
//!    [`Transaction::transfer`].
//! 2. **Sign**: [`Signer::sign_transaction`] yields a [`SignedEnvelope`].
//! 3. **Broadcast**: the caller POSTs [`SignedEnvelope::to_json`]. Not done
//!    here; see [`crate::broadcast`] for reading the response.
//! 4. **History**: confirmed rows come back as [`RawTransaction`]s.
//!
//! ## Design Decisions
//!
//! - Payloads are `serde_json` maps with insertion order preserved. The
//!   signature covers the JSON text, so the order is part of the contract.
//! - Amounts travel as base-unit integer strings, never as JSON numbers.
//! - The signing message is `hextime(timestamp) || sha256(hash(payload))`.
//!   There is no separate transaction ID; the endpoint assigns one.

pub mod builder;
pub mod envelope;
pub mod record;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{
    build_send_request_data, build_transfer_token_request_data, BuildError, TransactionBuilder,
};
pub use envelope::SignedEnvelope;
pub use record::{
    parse_transaction, parse_transaction_data, parse_transaction_data_or_unknown,
    parse_transactions, HistoryEntry, RawTransaction, RecordError, TransactionListResponse,
    TransactionRecord,
};
pub use signing::{sign_payload, InvalidKeyPolicy, Signer, SigningError};
pub use types::{Transaction, TransactionType};
pub use verification::{verify_envelope, VerificationError};

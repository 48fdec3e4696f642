//! # Protocol Configuration & Constants
//!
//! Every magic number the signing core depends on lives here. Most of these
//! are not tunables: they are baked into signatures that the broadcast
//! endpoint already accepts, so changing one means every wallet built on
//! the old value stops producing verifiable envelopes.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Wire Format
// ---------------------------------------------------------------------------

/// Width of the hex timestamp prefix in a time-hash.
///
/// The prefix is padded to this width and then cut to its first
/// `HEX_TIME_SIZE` characters. Current microsecond timestamps need 13 hex
/// digits, so the cut never fires in practice; once it does, the low-order
/// digits are dropped. The broadcast endpoint computes the same value, so
/// this stays as-is until the wire owner says otherwise.
pub const HEX_TIME_SIZE: usize = 14;

/// Length of a hex-encoded private key (32-byte Ed25519 seed).
pub const PRIVATE_KEY_HEX_LENGTH: usize = 64;

/// Length of a hex-encoded public key.
pub const PUBLIC_KEY_HEX_LENGTH: usize = 64;

/// Length of a hex-encoded detached Ed25519 signature.
pub const SIGNATURE_HEX_LENGTH: usize = 128;

/// RIPEMD-160 digest in hex.
pub const SHORT_HASH_HEX_LENGTH: usize = 40;

/// Checksum suffix appended to a short hash (first 4 hex chars of a
/// double SHA-256).
pub const CHECKSUM_HEX_LENGTH: usize = 4;

/// Full address length: short hash + checksum.
pub const ADDRESS_HEX_LENGTH: usize = SHORT_HASH_HEX_LENGTH + CHECKSUM_HEX_LENGTH;

/// Payload key used in the signed envelope when the caller does not pick one.
pub const DEFAULT_PAYLOAD_KEY: &str = "transaction";

/// Forward skew added to the signer-assigned timestamp of `"transaction"`
/// payloads, in microseconds.
pub const TRANSACTION_TIMESTAMP_SKEW_MICROS: u64 = 2_000_000;

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Number of decimal places between a display token and its base unit.
pub const BASE_UNIT_DECIMALS: u32 = 18;

/// Decimal places shown when rendering on-chain amounts in history views.
pub const DISPLAY_DECIMALS: u32 = 6;

/// Ticker shown next to balances.
pub const DISPLAY_SYMBOL: &str = "QCC";

/// Symbol written into exported key files.
pub const KEYFILE_SYMBOL: &str = "QTC";

// ---------------------------------------------------------------------------
// Mnemonics
// ---------------------------------------------------------------------------

/// Word counts accepted when creating a wallet.
pub const SUPPORTED_MNEMONIC_LENGTHS: [usize; 5] = [12, 15, 18, 21, 24];

/// Word count used when the caller does not choose one.
pub const DEFAULT_MNEMONIC_LENGTH: usize = 12;

/// Entropy strength in bits for a given word count: `(words / 3) * 32`.
pub const fn mnemonic_strength_bits(word_count: usize) -> usize {
    (word_count / 3) * 32
}

// ---------------------------------------------------------------------------
// Key Files
// ---------------------------------------------------------------------------

/// File extension of exported key files.
pub const KEYFILE_EXTENSION: &str = "qcc";

/// Passphrase the legacy web wallet used for every `.qcc` key file.
///
/// It ships in every copy of the front-end, so it protects nothing. It is
/// here only so files exported by that wallet can still be imported. New
/// exports should pass a user-chosen passphrase.
pub const LEGACY_KEYFILE_PASSPHRASE: &str = "sasuel_gold_secret_v1";

// ---------------------------------------------------------------------------
// Staking
// ---------------------------------------------------------------------------

/// How long fetched interest rates stay valid before a refresh.
pub const RATE_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Fallback staking wallet used when the backend config is unavailable.
/// Development value only.
pub const FALLBACK_STAKING_ADDRESS: &str = "dde0b5f4a236f209d62efe7354e73ca2f52a2dc78cca";

//! # Key Files (`.qcc`)
//!
//! A key file is a wallet sealed with a passphrase (see
//! [`crate::crypto::encryption`]). The plaintext is JSON:
//!
//! ```text
//! {"wallet":{"private_key":..,"public_key":..,"address":..,"mnemonic":..,"symbol":"QTC"},
//!  "timestamp":<ms since epoch>}
//! ```
//!
//! Three layouts exist in the wild and all are read:
//!
//! - **current**: the layout above.
//! - **recipients**: the same plus a `recipients` field, written by an older
//!   bulk-transfer build. The extra field is ignored.
//! - **legacy flat**: the wallet object on its own, no wrapper.
//!
//! Only the current layout is written.
//!
//! ## Security
//!
//! The web wallet sealed every file with [`LEGACY_KEYFILE_PASSPHRASE`], a
//! constant shipped in its JavaScript bundle. Those files are effectively
//! plaintext. Import accepts the constant so old files still open; export
//! takes whatever passphrase the caller supplies, and callers should not
//! supply that one.
//!
//! [`LEGACY_KEYFILE_PASSPHRASE`]: crate::config::LEGACY_KEYFILE_PASSPHRASE

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::{KEYFILE_EXTENSION, KEYFILE_SYMBOL};
use crate::crypto::encryption::{decrypt_with_passphrase, encrypt_with_passphrase, EncryptionError};
use crate::crypto::keys::{KeyError, Keypair};
use crate::identity::wallet::WalletIdentity;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors reading or writing a key file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyFileError {
    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    /// Decryption produced bytes that are not UTF-8 JSON. With this
    /// container that almost always means a wrong passphrase.
    #[error("key file did not decrypt to valid JSON (wrong passphrase?)")]
    InvalidPlaintext,

    #[error("key file is missing required field `{0}`")]
    MissingField(&'static str),

    #[error(transparent)]
    Key(#[from] KeyError),

    /// The recorded public key or address does not belong to the private key.
    #[error("key file is inconsistent: recorded {field} does not match the private key")]
    Inconsistent { field: &'static str },

    #[error("failed to serialize key file: {0}")]
    Serialization(String),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which on-disk layout a key file used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFileFormat {
    Current,
    Recipients,
    LegacyFlat,
}

/// The wallet object inside a key file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub private_key: String,
    #[serde(default)]
    pub public_key: String,
    pub address: String,
    /// Empty when the wallet was imported from a bare key.
    #[serde(default)]
    pub mnemonic: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

fn default_symbol() -> String {
    KEYFILE_SYMBOL.to_string()
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("address", &self.address)
            .field("mnemonic", &if self.mnemonic.is_empty() { "" } else { "<redacted>" })
            .field("symbol", &self.symbol)
            .finish()
    }
}

/// A decrypted key file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFile {
    pub wallet: WalletRecord,
    /// Milliseconds since the epoch when the file was written.
    pub timestamp: u64,
}

impl KeyFile {
    /// Wraps an identity for export, stamped with the clock's time.
    pub fn from_identity(identity: &WalletIdentity, clock: &impl Clock) -> Self {
        Self {
            wallet: WalletRecord {
                private_key: identity.private_key.clone(),
                public_key: identity.public_key.clone(),
                address: identity.address.clone(),
                mnemonic: identity.mnemonic.clone().unwrap_or_default(),
                symbol: default_symbol(),
            },
            timestamp: clock.now_millis(),
        }
    }

    /// Decrypts and parses a key file.
    ///
    /// Files without a timestamp are stamped with the clock's time.
    pub fn decrypt(
        sealed: &str,
        passphrase: &str,
        clock: &impl Clock,
    ) -> Result<Self, KeyFileError> {
        let plaintext = decrypt_with_passphrase(passphrase, sealed)?;
        let text = String::from_utf8(plaintext).map_err(|_| KeyFileError::InvalidPlaintext)?;
        let (file, format) = Self::parse(&text, clock)?;
        debug!(address = %file.wallet.address, ?format, "decrypted key file");
        Ok(file)
    }

    /// Parses decrypted key-file JSON and reports which layout it used.
    pub fn parse(json: &str, clock: &impl Clock) -> Result<(Self, KeyFileFormat), KeyFileError> {
        let value: Value = serde_json::from_str(json).map_err(|_| KeyFileError::InvalidPlaintext)?;
        let obj = value.as_object().ok_or(KeyFileError::InvalidPlaintext)?;

        let (wallet_value, format) = match obj.get("wallet") {
            Some(wallet) if obj.contains_key("recipients") => (wallet, KeyFileFormat::Recipients),
            Some(wallet) => (wallet, KeyFileFormat::Current),
            None => (&value, KeyFileFormat::LegacyFlat),
        };

        let wallet = parse_wallet(wallet_value)?;
        let timestamp = match format {
            KeyFileFormat::LegacyFlat => None,
            _ => obj.get("timestamp").and_then(Value::as_u64).filter(|&t| t != 0),
        }
        .unwrap_or_else(|| clock.now_millis());

        Ok((Self { wallet, timestamp }, format))
    }

    /// Serializes and seals the file under `passphrase`.
    pub fn encrypt(&self, passphrase: &str) -> Result<String, KeyFileError> {
        let json = serde_json::to_string(self)
            .map_err(|e| KeyFileError::Serialization(e.to_string()))?;
        Ok(encrypt_with_passphrase(passphrase, json.as_bytes())?)
    }

    /// Checks that the recorded public key and address are the ones the
    /// private key derives. A missing public key is not an error; old files
    /// did not always record it.
    pub fn verify(&self) -> Result<(), KeyFileError> {
        let keypair = Keypair::from_private_key_hex(&self.wallet.private_key)?;

        if !self.wallet.public_key.is_empty()
            && !self.wallet.public_key.eq_ignore_ascii_case(&keypair.public_key_hex())
        {
            warn!(address = %self.wallet.address, "key file public key does not match private key");
            return Err(KeyFileError::Inconsistent { field: "public_key" });
        }
        if self.wallet.address != keypair.address() {
            warn!(address = %self.wallet.address, "key file address does not match private key");
            return Err(KeyFileError::Inconsistent { field: "address" });
        }
        Ok(())
    }

    /// The identity this file holds, after [`verify`](Self::verify).
    pub fn to_identity(&self) -> Result<WalletIdentity, KeyFileError> {
        self.verify()?;
        let mut identity = WalletIdentity::from_private_key(&self.wallet.private_key)
            .map_err(|_| KeyError::InvalidPrivateKey)?;
        if !self.wallet.mnemonic.is_empty() {
            identity.mnemonic = Some(self.wallet.mnemonic.clone());
        }
        Ok(identity)
    }

    /// `<address>.qcc`
    pub fn suggested_file_name(&self) -> String {
        format!("{}.{}", self.wallet.address, KEYFILE_EXTENSION)
    }
}

/// `true` if `name` ends in `.qcc`.
pub fn has_keyfile_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext == KEYFILE_EXTENSION)
}

fn parse_wallet(value: &Value) -> Result<WalletRecord, KeyFileError> {
    let obj = value.as_object().ok_or(KeyFileError::InvalidPlaintext)?;
    for field in ["address", "private_key"] {
        match obj.get(field).and_then(Value::as_str) {
            Some(s) if !s.is_empty() => {}
            _ => return Err(KeyFileError::MissingField(field)),
        }
    }
    serde_json::from_value(value.clone()).map_err(|_| KeyFileError::InvalidPlaintext)
}

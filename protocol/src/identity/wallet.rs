//! A wallet identity: everything derived from one private key, plus the
//! phrase it came from when there is one.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::mnemonic::{
    generate_mnemonic, private_key_from_seed, seed_from_mnemonic, validate_mnemonic,
    MnemonicError,
};
use crate::crypto::keys::{KeyError, Keypair};

/// Errors raised while building a wallet identity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),

    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Key material of one wallet.
///
/// `public_key` and `address` are always consistent with `private_key`;
/// every constructor derives them rather than accepting them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletIdentity {
    pub private_key: String,
    pub public_key: String,
    pub address: String,
    /// The phrase the key was derived from. `None` for key imports.
    pub mnemonic: Option<String>,
}

impl WalletIdentity {
    /// Creates a wallet from a fresh phrase of `word_count` words.
    pub fn create(word_count: usize) -> Result<Self, WalletError> {
        let phrase = generate_mnemonic(word_count)?;
        Self::restore(&phrase)
    }

    /// Restores the wallet a phrase derives to.
    ///
    /// The stored phrase is the whitespace-normalized form.
    pub fn restore(phrase: &str) -> Result<Self, WalletError> {
        let normalized = validate_mnemonic(phrase)?;
        let seed = seed_from_mnemonic(&normalized)?;
        let private_key = private_key_from_seed(&seed);
        let mut identity = Self::from_private_key(&private_key)?;
        identity.mnemonic = Some(normalized);
        Ok(identity)
    }

    /// Imports a bare private key. The result carries no phrase.
    ///
    /// The stored key is lowercased, so uppercase input round-trips to the
    /// same identity as its lowercase spelling.
    pub fn from_private_key(private_key: &str) -> Result<Self, WalletError> {
        let keypair = Keypair::from_private_key_hex(private_key)?;
        let identity = Self::from_keypair(&keypair);
        debug!(address = %identity.address, "derived wallet identity");
        Ok(identity)
    }

    pub fn from_keypair(keypair: &Keypair) -> Self {
        Self {
            private_key: keypair.private_key_hex(),
            public_key: keypair.public_key_hex(),
            address: keypair.address(),
            mnemonic: None,
        }
    }

    /// Rebuilds the signing keypair.
    pub fn keypair(&self) -> Result<Keypair, KeyError> {
        Keypair::from_private_key_hex(&self.private_key)
    }

    pub fn has_mnemonic(&self) -> bool {
        self.mnemonic.is_some()
    }
}

impl fmt::Debug for WalletIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletIdentity")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("address", &self.address)
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

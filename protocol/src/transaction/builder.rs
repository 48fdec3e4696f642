//! Transaction construction.
//!
//! Two layers:
//!
//! - [`build_send_request_data`] / [`build_transfer_token_request_data`]
//!   take a key, a recipient, an amount already in base units and a
//!   timestamp, and return the request body as a JSON string.
//! - [`TransactionBuilder`] assembles an unsigned [`Transaction`] step by
//!   step, converting display amounts on the way.
//!
//! The builder does not sign. That happens in [`super::signing`], which
//! keeps construction testable without key material.

use thiserror::Error;

use super::signing::{Signer, SigningError};
use super::types::{Transaction, TransactionType};
use crate::amount::{to_base_units, AmountError, BaseUnits};

// ---------------------------------------------------------------------------
// Request builders
// ---------------------------------------------------------------------------

/// Signs a `Send` of `amount` base units and returns the envelope JSON.
///
/// Payload: `{"type":"Send","to":..,"amount":..,"timestamp":..,"from":..}`.
pub fn build_send_request_data(
    private_key: &str,
    to: &str,
    amount: &str,
    timestamp: u64,
) -> Result<String, SigningError> {
    let tx = Transaction::send(to, amount, Some(timestamp));
    envelope_json(&tx, private_key)
}

/// Signs a token `Transfer` and returns the envelope JSON.
///
/// Payload: `{"type":"Transfer","to":..,"amount":..,"token_address":..,
/// "timestamp":..,"from":..}`.
pub fn build_transfer_token_request_data(
    private_key: &str,
    to: &str,
    amount: &str,
    token_address: &str,
    timestamp: u64,
) -> Result<String, SigningError> {
    let tx = Transaction::transfer(to, amount, token_address, Some(timestamp));
    envelope_json(&tx, private_key)
}

fn envelope_json(tx: &Transaction, private_key: &str) -> Result<String, SigningError> {
    Signer::new()
        .sign_transaction(tx, private_key)?
        .to_json()
        .map_err(|e| SigningError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Errors from [`TransactionBuilder::build`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("recipient address is required")]
    MissingRecipient,

    #[error("amount is required")]
    MissingAmount,

    #[error("token transfers require a token address")]
    MissingTokenAddress,

    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Fluent builder for unsigned [`Transaction`]s.
///
/// # Usage
///
/// ```
/// use qcc_protocol::transaction::TransactionBuilder;
///
/// let tx = TransactionBuilder::send("9d2fdce4c234c11b89484624934c181a2b13ce451a70")
///     .amount_tokens("1.5")
///     .timestamp(1_700_000_000_000_000)
///     .build()
///     .unwrap();
/// assert_eq!(tx.amount, "1500000000000000000");
/// ```
///
/// Without [`timestamp`](Self::timestamp) the signer stamps the payload
/// when it is signed.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    tx_type: TransactionType,
    to: String,
    token_address: Option<String>,
    amount: Option<Result<BaseUnits, AmountError>>,
    timestamp: Option<u64>,
}

impl TransactionBuilder {
    /// Starts a native coin `Send`.
    pub fn send(to: &str) -> Self {
        Self::new(TransactionType::Send, to, None)
    }

    /// Starts a token `Transfer`.
    pub fn transfer(to: &str, token_address: &str) -> Self {
        Self::new(TransactionType::Transfer, to, Some(token_address.to_string()))
    }

    fn new(tx_type: TransactionType, to: &str, token_address: Option<String>) -> Self {
        Self {
            tx_type,
            to: to.trim().to_string(),
            token_address,
            amount: None,
            timestamp: None,
        }
    }

    /// Sets the amount in base units (a plain integer string).
    pub fn amount_base_units(mut self, base_units: &str) -> Self {
        self.amount = Some(base_units.parse());
        self
    }

    /// Sets the amount in display units. Scaled by 10^18; scientific
    /// notation accepted.
    pub fn amount_tokens(mut self, tokens: &str) -> Self {
        self.amount = Some(to_base_units(tokens));
        self
    }

    /// Sets the timestamp in microseconds.
    pub fn timestamp(mut self, micros: u64) -> Self {
        self.timestamp = Some(micros);
        self
    }

    /// Produces the unsigned [`Transaction`].
    ///
    /// Amount errors are reported here rather than at the setter, so a
    /// chain reads straight through.
    pub fn build(self) -> Result<Transaction, BuildError> {
        if self.to.is_empty() {
            return Err(BuildError::MissingRecipient);
        }
        let amount = self.amount.ok_or(BuildError::MissingAmount)??;

        let token_address = match self.tx_type {
            TransactionType::Send => None,
            TransactionType::Transfer => match self.token_address {
                Some(token) if !token.trim().is_empty() => Some(token.trim().to_string()),
                _ => return Err(BuildError::MissingTokenAddress),
            },
        };

        Ok(Transaction {
            tx_type: self.tx_type,
            to: self.to,
            amount: amount.to_string(),
            token_address,
            timestamp: self.timestamp,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

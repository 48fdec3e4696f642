//! Core type definitions for QCC transactions.
//!
//! A [`Transaction`] is the unsigned request a wallet hands to the signer.
//! It is turned into an ordered JSON map by [`Transaction::to_payload`];
//! the order of that map is part of what gets signed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// The operation a transaction represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Native coin transfer.
    Send,
    /// Token transfer. Carries a `token_address`.
    Transfer,
}

impl TransactionType {
    /// The wire spelling of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Send => "Send",
            Self::Transfer => "Transfer",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Send" => Ok(Self::Send),
            "Transfer" => Ok(Self::Transfer),
            other => Err(UnknownTransactionType(other.to_string())),
        }
    }
}

/// Returned when parsing a type name other than `Send` or `Transfer`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transaction type: {0}")]
pub struct UnknownTransactionType(pub String);

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// An unsigned transaction request.
///
/// `from` is absent on purpose: the signer derives it from the private key
/// and writes it into the payload. A caller cannot claim to be someone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub tx_type: TransactionType,

    /// Recipient address.
    pub to: String,

    /// Amount in base units (10^18 per token), as a plain integer string.
    pub amount: String,

    /// Token contract address. Present only on [`TransactionType::Transfer`].
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub token_address: Option<String>,

    /// Microseconds since the epoch. `None` lets the signer pick one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<u64>,
}

impl Transaction {
    /// A `Send` of `amount` base units.
    pub fn send(to: impl Into<String>, amount: impl Into<String>, timestamp: Option<u64>) -> Self {
        Self {
            tx_type: TransactionType::Send,
            to: to.into(),
            amount: amount.into(),
            token_address: None,
            timestamp,
        }
    }

    /// A token `Transfer` of `amount` base units.
    pub fn transfer(
        to: impl Into<String>,
        amount: impl Into<String>,
        token_address: impl Into<String>,
        timestamp: Option<u64>,
    ) -> Self {
        Self {
            tx_type: TransactionType::Transfer,
            to: to.into(),
            amount: amount.into(),
            token_address: Some(token_address.into()),
            timestamp,
        }
    }

    /// The payload map, keys in wire order:
    /// `type, to, amount, [token_address], timestamp`.
    ///
    /// An unset timestamp is written as `null` so the key keeps its
    /// position; the signer replaces it in place.
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("type".into(), Value::from(self.tx_type.as_str()));
        map.insert("to".into(), Value::from(self.to.as_str()));
        map.insert("amount".into(), Value::from(self.amount.as_str()));
        if let Some(token) = &self.token_address {
            map.insert("token_address".into(), Value::from(token.as_str()));
        }
        map.insert(
            "timestamp".into(),
            self.timestamp.map(Value::from).unwrap_or(Value::Null),
        );
        map
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Transaction history records.
//!
//! The explorer API returns confirmed transactions with the original
//! payload stored as a JSON *string* in `data`. This module decodes that
//! string and renders the amount for display.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::amount::{from_base_units, AmountError};
use crate::config::DISPLAY_DECIMALS;

/// Errors while decoding a stored payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("transaction data is not a JSON object: {0}")]
    InvalidJson(String),

    #[error("transaction data has no amount")]
    MissingAmount,

    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// A transaction row as the explorer API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub txto: String,
    /// The signed payload, JSON-encoded.
    pub data: String,
    pub txtimestamp: String,
    pub txhash: String,
    pub txfrom: String,
    pub txtype: String,
    pub block_height: u64,
}

/// A page of history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<RawTransaction>,
    pub total_count: u64,
}

/// The decoded payload of a history row. `amount` is in display units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "type")]
    pub tx_type: String,
    pub to: String,
    pub amount: String,
    pub from: String,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub token_address: Option<String>,
}

impl TransactionRecord {
    /// The placeholder shown for rows whose payload cannot be decoded.
    pub fn unknown() -> Self {
        Self {
            tx_type: "Unknown".to_string(),
            to: String::new(),
            amount: "0".to_string(),
            from: String::new(),
            timestamp: 0,
            token_address: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.tx_type == "Unknown"
    }
}

/// A history row with its payload decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub txto: String,
    pub txtimestamp: String,
    pub txhash: String,
    pub txfrom: String,
    pub txtype: String,
    pub block_height: u64,
    pub parsed_data: TransactionRecord,
}

/// Decodes a stored payload and converts its amount to display units
/// (6 decimals, rounded half up).
///
/// The amount may be stored as a string or a number.
pub fn parse_transaction_data(data: &str) -> Result<TransactionRecord, RecordError> {
    let value: Value =
        serde_json::from_str(data).map_err(|e| RecordError::InvalidJson(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| RecordError::InvalidJson("expected an object".to_string()))?;

    let text = |key: &str| obj.get(key).and_then(Value::as_str).unwrap_or_default().to_string();

    let amount = match obj.get("amount") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(RecordError::MissingAmount),
    };

    Ok(TransactionRecord {
        tx_type: text("type"),
        to: text("to"),
        amount: from_base_units(&amount, DISPLAY_DECIMALS)?,
        from: text("from"),
        timestamp: obj.get("timestamp").and_then(Value::as_u64).unwrap_or(0),
        token_address: obj
            .get("token_address")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// [`parse_transaction_data`], falling back to [`TransactionRecord::unknown`]
/// on any error so one bad row does not hide the rest of the history.
pub fn parse_transaction_data_or_unknown(data: &str) -> TransactionRecord {
    parse_transaction_data(data).unwrap_or_else(|err| {
        warn!(error = %err, "failed to parse transaction data");
        TransactionRecord::unknown()
    })
}

pub fn parse_transaction(raw: RawTransaction) -> HistoryEntry {
    let parsed_data = parse_transaction_data_or_unknown(&raw.data);
    HistoryEntry {
        txto: raw.txto,
        txtimestamp: raw.txtimestamp,
        txhash: raw.txhash,
        txfrom: raw.txfrom,
        txtype: raw.txtype,
        block_height: raw.block_height,
        parsed_data,
    }
}

pub fn parse_transactions(raw: Vec<RawTransaction>) -> Vec<HistoryEntry> {
    raw.into_iter().map(parse_transaction).collect()
}

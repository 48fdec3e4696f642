//! # Broadcast Responses
//!
//! The core never talks to the network, but the two endpoints around a
//! broadcast have loose response shapes that every caller ends up decoding:
//!
//! - `GET /api/ts` returns the server's clock in microseconds, as a bare
//!   JSON number or a numeric string depending on the deployment.
//! - `POST /broadcast/` returns an object whose `output` text contains
//!   `"error"` on failure, and whose transaction hash has lived under
//!   several names over time.
//!
//! These helpers turn both into typed values.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors interpreting an endpoint response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BroadcastError {
    /// The endpoint accepted the request but reported an error in `output`.
    #[error("broadcast rejected: {output}")]
    Rejected { output: String },

    #[error("broadcast response is not a JSON object")]
    InvalidResponse,

    #[error("server timestamp is not a non-negative integer: {0:?}")]
    InvalidTimestamp(String),
}

/// A successful broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadcastReceipt {
    /// The transaction hash, when the endpoint reported one.
    pub tx_hash: Option<String>,
    /// The endpoint's `output` text. Empty when absent.
    pub output: String,
}

/// Where the transaction hash has been found, in lookup order.
const TX_HASH_PATHS: &[&[&str]] = &[
    &["txhash"],
    &["txHash"],
    &["txid"],
    &["data", "txid"],
    &["data", "txHash"],
    &["result", "txid"],
    &["hash"],
];

/// Parses the body of the server-time endpoint.
///
/// ```
/// use qcc_protocol::broadcast::parse_server_timestamp;
///
/// assert_eq!(parse_server_timestamp("1700000000000000").unwrap(), 1_700_000_000_000_000);
/// assert_eq!(parse_server_timestamp("\"1700000000000000\"").unwrap(), 1_700_000_000_000_000);
/// ```
pub fn parse_server_timestamp(body: &str) -> Result<u64, BroadcastError> {
    let invalid = || BroadcastError::InvalidTimestamp(body.trim().to_string());
    let value: Value = serde_json::from_str(body.trim()).map_err(|_| invalid())?;
    match &value {
        Value::Number(n) => n.as_u64().ok_or_else(invalid),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            s.parse().map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}

/// Interprets a broadcast response body.
///
/// An `output` containing `"error"` means rejection, whatever else the body
/// says. Otherwise the hash is taken from the first present of `txhash`,
/// `txHash`, `txid`, `data.txid`, `data.txHash`, `result.txid`, `hash`.
/// Empty strings and the placeholder `"unknown"` do not count as a hash.
pub fn interpret_broadcast_response(response: &Value) -> Result<BroadcastReceipt, BroadcastError> {
    if !response.is_object() {
        return Err(BroadcastError::InvalidResponse);
    }

    let output = response
        .get("output")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if output.contains("error") {
        return Err(BroadcastError::Rejected { output });
    }

    let tx_hash = TX_HASH_PATHS
        .iter()
        .find_map(|path| lookup(response, path))
        .map(str::to_string);

    Ok(BroadcastReceipt { tx_hash, output })
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    current
        .as_str()
        .filter(|s| !s.is_empty() && *s != "unknown")
}

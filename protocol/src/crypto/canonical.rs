//! # Canonical String Encoding
//!
//! Every hash and every signature in the wallet is computed over the
//! string produced by [`canonicalize`]. It is *not* a canonical JSON form in
//! the RFC 8785 sense:
//!
//! 1. Objects and arrays are written as compact JSON, keys in insertion
//!    order. Nothing is sorted. Two maps with the same entries in a
//!    different order hash differently.
//! 2. Every `/` becomes `\/`.
//! 3. Every UTF-16 code unit above `0xFF` becomes `\u` followed by its
//!    lowercase hex digits, with no zero padding (`U+0100` is `\u100`,
//!    `U+AC00` is `\uac00`). Characters outside the BMP become two escaped
//!    surrogates. Everything else passes through untouched, including
//!    Latin-1 characters, which later hash as their UTF-8 bytes.
//!
//! Scalars are converted with plain string conversion first: a string is
//! used as-is (no quotes), numbers and booleans use their JSON spelling.
//!
//! The broadcast endpoint runs the same transform to verify signatures, so
//! any "improvement" here silently breaks every wallet.
//!
//! ## Numbers
//!
//! Numbers are spelled the way the endpoint's JavaScript runtime spells
//! them, at the top level and inside objects alike:
//!
//! - integers are written digit for digit (`1700000000000000`);
//! - floats use the shortest round-trip form of `Number.prototype.toString`,
//!   so `6.0` is `6`, `1e21` is `1e+21` and `1e-7` is `1e-7`.
//!
//! Integers above 2^53 are written exactly here but lose precision on the
//! endpoint. Timestamps stay far below that, and amounts travel as strings
//! precisely so they never hit number formatting.

use std::fmt::Write as _;
use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::{Number, Value};

/// Encodes a value into the string that gets hashed.
///
/// # Example
///
/// ```
/// use qcc_protocol::crypto::canonical::canonicalize;
/// use serde_json::json;
///
/// assert_eq!(canonicalize(&json!({"to": "a/b"})), r#"{"to":"a\/b"}"#);
/// assert_eq!(canonicalize(&json!("plain")), "plain");
/// ```
pub fn canonicalize(value: &Value) -> String {
    let raw = match value {
        Value::Object(_) | Value::Array(_) => compact_json(value),
        Value::String(s) => s.clone(),
        Value::Number(n) => number_to_string(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
    };
    escape_unicode(&escape_slashes(&raw))
}

/// Writes a number the way JavaScript's `String(n)` does.
///
/// ```
/// use qcc_protocol::crypto::canonical::number_to_string;
/// use serde_json::Number;
///
/// let six = Number::from_f64(6.0).unwrap();
/// assert_eq!(number_to_string(&six), "6");
/// assert_eq!(number_to_string(&Number::from(42u64)), "42");
/// ```
pub fn number_to_string(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => ryu_js::Buffer::new().format(f).to_string(),
        _ => n.to_string(),
    }
}

/// Compact JSON with JavaScript number spelling.
fn compact_json(value: &Value) -> String {
    let mut buf = Vec::with_capacity(128);
    let mut ser = Serializer::with_formatter(&mut buf, JsNumberFormatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        // Serializing a `Value` into memory does not fail.
        Err(_) => value.to_string(),
    }
}

/// `serde_json`'s compact layout with floats written by `ryu_js`.
struct JsNumberFormatter;

impl Formatter for JsNumberFormatter {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(ryu_js::Buffer::new().format(value).as_bytes())
    }
}

/// Canonicalizes a bare string. Shorthand for `canonicalize(&Value::String(..))`
/// without the clone.
pub fn canonicalize_str(s: &str) -> String {
    escape_unicode(&escape_slashes(s))
}

/// Replaces every `/` with `\/`.
pub fn escape_slashes(s: &str) -> String {
    s.replace('/', "\\/")
}

/// Rewrites UTF-16 code units above `0xFF` as unpadded `\uXXXX` escapes.
pub fn escape_unicode(s: &str) -> String {
    if s.is_ascii() {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + 16);
    for ch in s.chars() {
        if (ch as u32) <= 0xFF {
            out.push(ch);
            continue;
        }
        let mut units = [0u16; 2];
        for unit in ch.encode_utf16(&mut units) {
            // Writing to a String cannot fail.
            let _ = write!(out, "\\u{:x}", unit);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_ascii_object_matches_compact_json() {
        let v = json!({"type": "Send", "to": "abc", "amount": "1", "timestamp": 1});
        assert_eq!(canonicalize(&v), v.to_string());
        assert_eq!(
            canonicalize(&v),
            r#"{"type":"Send","to":"abc","amount":"1","timestamp":1}"#
        );
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut a = serde_json::Map::new();
        a.insert("b".into(), json!(1));
        a.insert("a".into(), json!(2));
        let mut b = serde_json::Map::new();
        b.insert("a".into(), json!(2));
        b.insert("b".into(), json!(1));

        let ca = canonicalize(&Value::Object(a));
        let cb = canonicalize(&Value::Object(b));
        assert_eq!(ca, r#"{"b":1,"a":2}"#);
        assert_eq!(cb, r#"{"a":2,"b":1}"#);
        assert_ne!(ca, cb);
    }

    #[test]
    fn slashes_are_escaped() {
        assert_eq!(canonicalize(&json!("a/b/c")), r"a\/b\/c");
        assert_eq!(canonicalize(&json!(["x/y"])), r#"["x\/y"]"#);
    }

    #[test]
    fn latin1_passes_through() {
        assert_eq!(canonicalize(&json!("café ÿ")), "café ÿ");
    }

    #[test]
    fn high_code_points_are_escaped_unpadded() {
        assert_eq!(canonicalize(&json!("Ā")), r"\u100");
        assert_eq!(canonicalize(&json!("한")), r"\ud55c");
        assert_eq!(canonicalize(&json!("€")), r"\u20ac");
    }

    #[test]
    fn astral_characters_become_surrogate_pairs() {
        // U+1F600 = D83D DE00
        assert_eq!(canonicalize(&json!("😀")), r"\ud83d\ude00");
    }

    #[test]
    fn escapes_apply_inside_objects() {
        let v = json!({"memo": "송금/1"});
        assert_eq!(canonicalize(&v), r#"{"memo":"\uc1a1\uae08\/1"}"#);
    }

    #[test]
    fn scalars_use_plain_string_conversion() {
        assert_eq!(canonicalize(&json!(1_700_000_000_000_000u64)), "1700000000000000");
        assert_eq!(canonicalize(&json!(true)), "true");
        assert_eq!(canonicalize(&Value::Null), "null");
        assert_eq!(canonicalize(&json!("")), "");
    }

    #[test]
    fn float_scalars_use_javascript_spelling() {
        // Expected values are Node's String(n).
        let cases = [
            (6.0, "6"),
            (0.5, "0.5"),
            (100.0, "100"),
            (-2.5, "-2.5"),
            (0.1 + 0.2, "0.30000000000000004"),
            (1e21, "1e+21"),
            (1.5e-6, "0.0000015"),
            (1e-7, "1e-7"),
            (123456789012345680000.0, "123456789012345680000"),
        ];
        for (input, expected) in cases {
            assert_eq!(canonicalize(&json!(input)), expected, "input {input:?}");
        }
    }

    #[test]
    fn floats_inside_objects_use_javascript_spelling() {
        // Node: JSON.stringify({apy: 6.0, big: 1e21, r: 0.5})
        let v = json!({"apy": 6.0, "big": 1e21, "r": 0.5});
        assert_eq!(canonicalize(&v), r#"{"apy":6,"big":1e+21,"r":0.5}"#);
        assert_eq!(canonicalize(&json!([1.0, 2.25, -0.5])), "[1,2.25,-0.5]");
    }

    #[test]
    fn integers_are_unchanged_by_number_formatting() {
        let v = json!({"n": -7, "t": 1_700_000_000_000_000u64});
        assert_eq!(canonicalize(&v), v.to_string());
    }

    #[test]
    fn json_control_escapes_survive() {
        let v = json!({"m": "a\"b\\c\n"});
        assert_eq!(canonicalize(&v), r#"{"m":"a\"b\\c\n"}"#);
    }

    #[test]
    fn canonicalize_str_matches_value_form() {
        let s = "path/to/한";
        assert_eq!(canonicalize_str(s), canonicalize(&json!(s)));
    }
}

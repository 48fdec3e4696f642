//! # Amounts
//!
//! Token amounts cross three representations:
//!
//! - **Display** (`"1.5"`, `"2e-3"`): what a user types. Decimal, maybe in
//!   scientific notation.
//! - **Base units** (`"1500000000000000000"`): display × 10^18, a plain
//!   integer string. This is what goes into a transaction's `amount`.
//! - **History** (`"1.500000"`): base units back to display with a fixed
//!   number of decimals.
//!
//! Everything here is exact string/bignum arithmetic. No `f64` ever touches
//! an amount: 10^18 is well past the 2^53 limit where floats stop counting
//! in ones.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use thiserror::Error;

use crate::config::BASE_UNIT_DECIMALS;

/// Largest exponent magnitude accepted in scientific notation. Anything
/// bigger is not an amount, and expanding it would allocate without bound.
const MAX_EXPONENT: i64 = 1_000;

/// Errors from parsing or converting an amount.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount must not be negative")]
    Negative,

    #[error("amount is not a decimal number: {0:?}")]
    NotNumeric(String),

    #[error("malformed exponent in {0:?}")]
    InvalidExponent(String),
}

// ---------------------------------------------------------------------------
// Scientific notation
// ---------------------------------------------------------------------------

/// Expands scientific notation into a plain decimal string.
///
/// Input without an exponent is validated and returned unchanged. With an
/// exponent, the result has no leading zeros in its integer part and no
/// trailing zeros in its fraction.
///
/// ```
/// use qcc_protocol::amount::unscientific_notation;
///
/// assert_eq!(unscientific_notation("1e+21").unwrap(), format!("1{}", "0".repeat(21)));
/// assert_eq!(unscientific_notation("5.5e-7").unwrap(), "0.00000055");
/// assert_eq!(unscientific_notation("123").unwrap(), "123");
/// ```
pub fn unscientific_notation(value: &str) -> Result<String, AmountError> {
    let parts = split_number(value)?;
    let Some(exponent) = parts.exponent else {
        return Ok(value.trim().to_string());
    };

    let digits = format!("{}{}", parts.int, parts.frac);
    let point = parts.int.len() as i64 + exponent;

    let (int, frac) = if point <= 0 {
        let zeros = "0".repeat(point.unsigned_abs() as usize);
        (String::new(), zeros + &digits)
    } else if point as usize >= digits.len() {
        let zeros = "0".repeat(point as usize - digits.len());
        (digits + &zeros, String::new())
    } else {
        let (i, f) = digits.split_at(point as usize);
        (i.to_string(), f.to_string())
    };

    Ok(join_decimal(&int, &frac))
}

/// Scales a display amount to base units (× 10^18).
///
/// Digits past the 18th decimal place are dropped; base units are integers.
///
/// ```
/// use qcc_protocol::amount::to_base_units;
///
/// assert_eq!(to_base_units("1").unwrap().to_string(), "1000000000000000000");
/// assert_eq!(to_base_units("0.25").unwrap().to_string(), "250000000000000000");
/// ```
pub fn to_base_units(amount: &str) -> Result<BaseUnits, AmountError> {
    let decimal = Decimal::parse(amount)?;
    Ok(BaseUnits(decimal.scaled(BASE_UNIT_DECIMALS)))
}

/// Converts base units back to a display amount with exactly `places`
/// decimals, rounding half up.
///
/// Accepts the same notations as [`to_base_units`], so a history record
/// holding `"1.5e+18"` still renders.
pub fn from_base_units(base: &str, places: u32) -> Result<String, AmountError> {
    let decimal = Decimal::parse(base)?;

    let divisor = pow10(BASE_UNIT_DECIMALS + decimal.scale);
    Ok(round_half_up(decimal.digits * pow10(places), &divisor, places))
}

/// Cuts `amount` to at most `places` decimals without rounding and strips
/// trailing zeros. A leading `-` is kept: this is for display, and
/// balances shown here can be negative.
pub fn format_amount(amount: &str, places: u32) -> Result<String, AmountError> {
    let trimmed = amount.trim();
    let (negative, magnitude) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let plain = unscientific_notation(magnitude)?;
    let (int, frac) = plain.split_once('.').unwrap_or((plain.as_str(), ""));
    let frac = &frac[..frac.len().min(places as usize)];

    let formatted = join_decimal(int, frac);
    if negative && formatted != "0" {
        Ok(format!("-{formatted}"))
    } else {
        Ok(formatted)
    }
}

// ---------------------------------------------------------------------------
// BaseUnits
// ---------------------------------------------------------------------------

/// A non-negative integer amount in base units.
///
/// Displays as a plain integer string, the form transaction payloads carry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BaseUnits(BigUint);

impl BaseUnits {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_inner(self) -> BigUint {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }

    /// Display amount with `places` decimals. See [`from_base_units`].
    pub fn to_display(&self, places: u32) -> String {
        round_half_up(&self.0 * pow10(places), &pow10(BASE_UNIT_DECIMALS), places)
    }
}

impl fmt::Display for BaseUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BaseUnits {
    type Err = AmountError;

    /// Parses a plain integer string of base units.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        if s.starts_with('-') {
            return Err(AmountError::Negative);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::NotNumeric(s.to_string()));
        }
        BigUint::parse_bytes(s.as_bytes(), 10)
            .map(Self)
            .ok_or_else(|| AmountError::NotNumeric(s.to_string()))
    }
}

impl From<u64> for BaseUnits {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// A decimal split into its lexical parts.
struct NumberParts<'a> {
    int: &'a str,
    frac: &'a str,
    exponent: Option<i64>,
}

/// `[+]digits[.digits][(e|E)[+|-]digits]`, surrounding whitespace ignored.
fn split_number(value: &str) -> Result<NumberParts<'_>, AmountError> {
    let s = value.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }
    if s.starts_with('-') {
        return Err(AmountError::Negative);
    }
    let s = s.strip_prefix('+').unwrap_or(s);

    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(pos) => (&s[..pos], Some(parse_exponent(&s[pos + 1..], value)?)),
        None => (s, None),
    };

    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !all_digits(int) || !all_digits(frac) {
        return Err(AmountError::NotNumeric(value.trim().to_string()));
    }

    Ok(NumberParts { int, frac, exponent })
}

fn parse_exponent(exp: &str, original: &str) -> Result<i64, AmountError> {
    let invalid = || AmountError::InvalidExponent(original.trim().to_string());
    let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let magnitude: i64 = digits.parse().map_err(|_| invalid())?;
    if magnitude > MAX_EXPONENT {
        return Err(invalid());
    }
    Ok(if exp.starts_with('-') { -magnitude } else { magnitude })
}

/// Joins integer and fraction digits, normalizing both ends.
fn join_decimal(int: &str, frac: &str) -> String {
    let int = int.trim_start_matches('0');
    let frac = frac.trim_end_matches('0');
    let int = if int.is_empty() { "0" } else { int };
    if frac.is_empty() {
        int.to_string()
    } else {
        format!("{int}.{frac}")
    }
}

/// An exact decimal: `digits / 10^scale`.
struct Decimal {
    digits: BigUint,
    scale: u32,
}

impl Decimal {
    fn parse(value: &str) -> Result<Self, AmountError> {
        let plain = unscientific_notation(value)?;
        let plain = plain.strip_prefix('+').unwrap_or(plain.as_str());
        let (int, frac) = plain.split_once('.').unwrap_or((plain, ""));
        let combined = format!("{int}{frac}");
        let digits = if combined.is_empty() {
            BigUint::default()
        } else {
            BigUint::parse_bytes(combined.as_bytes(), 10)
                .ok_or_else(|| AmountError::NotNumeric(value.trim().to_string()))?
        };
        Ok(Self {
            digits,
            scale: frac.len() as u32,
        })
    }

    /// `self × 10^places`, truncated to an integer.
    fn scaled(self, places: u32) -> BigUint {
        if self.scale <= places {
            self.digits * pow10(places - self.scale)
        } else {
            self.digits / pow10(self.scale - places)
        }
    }
}

fn pow10(exp: u32) -> BigUint {
    BigUint::from(10u32).pow(exp)
}

/// `numerator / divisor` rounded half up, rendered with `places` decimals.
fn round_half_up(numerator: BigUint, divisor: &BigUint, places: u32) -> String {
    let mut quotient = &numerator / divisor;
    if (numerator % divisor) * 2u32 >= *divisor {
        quotient += 1u32;
    }
    fixed_point(&quotient, places)
}

/// Renders `value / 10^places` with exactly `places` decimals.
fn fixed_point(value: &BigUint, places: u32) -> String {
    let places = places as usize;
    let digits = format!("{:0>width$}", value.to_string(), width = places + 1);
    if places == 0 {
        return digits;
    }
    let (int, frac) = digits.split_at(digits.len() - places);
    format!("{int}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unscientific_reference_cases() {
        assert_eq!(unscientific_notation("1e+21").unwrap(), format!("1{}", "0".repeat(21)));
        assert_eq!(unscientific_notation("5.5e-7").unwrap(), "0.00000055");
        assert_eq!(unscientific_notation("123").unwrap(), "123");
        assert_eq!(unscientific_notation("1000000000000000000").unwrap(), "1000000000000000000");
    }

    #[test]
    fn test_unscientific_table() {
        let cases = [
            ("1.5e21", "1500000000000000000000"),
            ("1.234e+1", "12.34"),
            ("1.234e1", "12.34"),
            ("1.5E+3", "1500"),
            ("1e0", "1"),
            ("0.5e1", "5"),
            ("1.50e1", "15"),
            ("1e-1", "0.1"),
            ("12.5e-1", "1.25"),
            ("123e-5", "0.00123"),
            ("0e-5", "0"),
            ("0e+5", "0"),
            ("1.7976931348623157e+30", "1797693134862315700000000000000"),
        ];
        for (input, expected) in cases {
            assert_eq!(unscientific_notation(input).unwrap(), expected, "input {input}");
        }
    }

    #[test]
    fn test_unscientific_rejects_garbage() {
        assert_eq!(unscientific_notation(""), Err(AmountError::Empty));
        assert_eq!(unscientific_notation("  "), Err(AmountError::Empty));
        assert_eq!(unscientific_notation("-1"), Err(AmountError::Negative));
        assert!(matches!(unscientific_notation("abc"), Err(AmountError::NotNumeric(_))));
        assert!(matches!(unscientific_notation("1.2.3"), Err(AmountError::NotNumeric(_))));
        assert!(matches!(unscientific_notation("."), Err(AmountError::NotNumeric(_))));
        assert!(matches!(unscientific_notation("e5"), Err(AmountError::NotNumeric(_))));
        assert!(matches!(unscientific_notation("1e"), Err(AmountError::InvalidExponent(_))));
        assert!(matches!(unscientific_notation("1e+"), Err(AmountError::InvalidExponent(_))));
        assert!(matches!(unscientific_notation("1e5.5"), Err(AmountError::InvalidExponent(_))));
        assert!(matches!(unscientific_notation("1e99999"), Err(AmountError::InvalidExponent(_))));
    }

    #[test]
    fn test_to_base_units() {
        let cases = [
            ("1", "1000000000000000000"),
            ("0", "0"),
            ("1000", "1000000000000000000000"),
            ("0.5", "500000000000000000"),
            (".5", "500000000000000000"),
            ("5.", "5000000000000000000"),
            ("0.000000000000000001", "1"),
            ("0.0000000000000000019", "1"),
            ("0.0000000000000000001", "0"),
            ("1e-18", "1"),
            ("5.5e-7", "550000000000"),
            ("123.456789", "123456789000000000000"),
            ("1e+3", "1000000000000000000000"),
            ("  2  ", "2000000000000000000"),
        ];
        for (input, expected) in cases {
            assert_eq!(to_base_units(input).unwrap().to_string(), expected, "input {input}");
        }
    }

    #[test]
    fn test_to_base_units_errors() {
        assert_eq!(to_base_units("-1"), Err(AmountError::Negative));
        assert_eq!(to_base_units(""), Err(AmountError::Empty));
        assert!(to_base_units("1,5").is_err());
        assert!(to_base_units("NaN").is_err());
        assert!(to_base_units("Infinity").is_err());
    }

    #[test]
    fn test_from_base_units_rounds_half_up() {
        assert_eq!(from_base_units("1000000000000000000", 6).unwrap(), "1.000000");
        assert_eq!(from_base_units("1500000000000000000", 6).unwrap(), "1.500000");
        assert_eq!(from_base_units("1234567500000000000", 6).unwrap(), "1.234568");
        assert_eq!(from_base_units("1234567499999999999", 6).unwrap(), "1.234567");
        assert_eq!(from_base_units("0", 6).unwrap(), "0.000000");
        assert_eq!(from_base_units("1", 6).unwrap(), "0.000000");
        assert_eq!(from_base_units("500000000000", 6).unwrap(), "0.000001");
        assert_eq!(from_base_units("1.5e+18", 2).unwrap(), "1.50");
        assert_eq!(from_base_units("2500000000000000000", 0).unwrap(), "3");
    }

    #[test]
    fn test_format_amount_truncates() {
        assert_eq!(format_amount("1.123456789", 8).unwrap(), "1.12345678");
        assert_eq!(format_amount("1.129", 2).unwrap(), "1.12");
        assert_eq!(format_amount("1.500", 8).unwrap(), "1.5");
        assert_eq!(format_amount("42", 8).unwrap(), "42");
        assert_eq!(format_amount("1.99", 0).unwrap(), "1");
        assert_eq!(format_amount("-1.239", 2).unwrap(), "-1.23");
        assert_eq!(format_amount("-0.001", 2).unwrap(), "0");
        assert_eq!(format_amount("007.10", 8).unwrap(), "7.1");
    }

    #[test]
    fn test_base_units_parse_and_display() {
        let b: BaseUnits = "1000000000000000000".parse().unwrap();
        assert_eq!(b.to_string(), "1000000000000000000");
        assert_eq!(b.to_display(6), "1.000000");
        assert!(BaseUnits::from(0).is_zero());
        assert_eq!("1.5".parse::<BaseUnits>(), Err(AmountError::NotNumeric("1.5".into())));
        assert_eq!("-5".parse::<BaseUnits>(), Err(AmountError::Negative));
        assert_eq!("".parse::<BaseUnits>(), Err(AmountError::Empty));
    }
}

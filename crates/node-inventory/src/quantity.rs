//! Kubernetes resource quantity parsing.
//!
//! Quantities are a number followed by an optional suffix, e.g. `500m`,
//! `2Gi` or `110`. Decimal SI suffixes scale by powers of 1000, binary
//! suffixes (`Ki`, `Mi`, ...) by powers of 1024.
//!
//! An unknown suffix is not an error: the number is taken as a raw count and
//! the suffix is reported on the returned [`Quantity`] so callers can warn.

use crate::error::QuantityError;

/// Suffix to multiplier table
const MULTIPLIERS: [(&str, f64); 13] = [
    ("m", 1e-3),
    ("K", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
    ("Ki", 1_024.0),
    ("Mi", 1_048_576.0),
    ("Gi", 1_073_741_824.0),
    ("Ti", 1_099_511_627_776.0),
    ("Pi", 1_125_899_906_842_624.0),
    ("Ei", 1_152_921_504_606_846_976.0),
];

/// A parsed resource quantity
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    /// Numeric value with the suffix multiplier applied
    pub value: f64,
    /// Suffix that was not in the table, if any (multiplier 1 was used)
    pub unrecognized_suffix: Option<String>,
}

impl Quantity {
    /// True when the suffix was unknown and the value is a raw count
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        self.unrecognized_suffix.is_some()
    }
}

/// Multiplier for a suffix. The empty suffix maps to 1.
#[must_use]
pub fn multiplier(suffix: &str) -> Option<f64> {
    if suffix.is_empty() {
        return Some(1.0);
    }
    MULTIPLIERS
        .iter()
        .find(|(known, _)| *known == suffix)
        .map(|(_, factor)| *factor)
}

/// Parse a quantity string such as `250m` or `7901Mi`.
///
/// # Errors
///
/// - [`QuantityError::Empty`] for empty input
/// - [`QuantityError::MissingNumeral`] when the input does not start with a digit
/// - [`QuantityError::Malformed`] when the suffix contains digits
pub fn parse_quantity(input: &str) -> Result<Quantity, QuantityError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(QuantityError::Empty);
    }

    let split = numeral_len(input);
    if split == 0 {
        return Err(QuantityError::MissingNumeral(input.to_string()));
    }

    let (numeral, suffix) = input.split_at(split);
    if suffix.bytes().any(|b| b.is_ascii_digit()) {
        return Err(QuantityError::Malformed(input.to_string()));
    }

    let number: f64 = numeral
        .parse()
        .map_err(|_| QuantityError::Malformed(input.to_string()))?;

    let quantity = match multiplier(suffix) {
        Some(factor) => Quantity {
            value: number * factor,
            unrecognized_suffix: None,
        },
        None => Quantity {
            value: number,
            unrecognized_suffix: Some(suffix.to_string()),
        },
    };
    Ok(quantity)
}

/// Length of the leading `digits[.digits]` run
fn numeral_len(input: &str) -> usize {
    let bytes = input.as_bytes();
    let integer = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if integer == 0 {
        return 0;
    }
    if bytes.get(integer) == Some(&b'.') {
        let fraction = bytes[integer + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if fraction > 0 {
            return integer + 1 + fraction;
        }
    }
    integer
}

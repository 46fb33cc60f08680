//! Weighted-sum check digits used by the banking layouts.

use crate::error::{RemessaError, Result};
use std::ops::RangeInclusive;

fn digits_of(value: &str) -> Result<Vec<u32>> {
    value
        .chars()
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| RemessaError::NotNumeric {
            value: value.to_string(),
        })
}

/// Modulo 10 with alternating weights 2,1 from the rightmost digit; products
/// above 9 contribute the sum of their digits.
pub fn mod10(value: &str) -> Result<char> {
    let sum: u32 = digits_of(value)?
        .iter()
        .rev()
        .zip([2u32, 1].iter().cycle())
        .map(|(d, w)| {
            let p = d * w;
            p / 10 + p % 10
        })
        .sum();
    let dv = (10 - sum % 10) % 10;
    Ok(char::from_digit(dv, 10).unwrap_or('0'))
}

/// Modulo 11 with weights cycling through `weights` from the rightmost digit.
///
/// The digit is `11 - remainder` unless `exceptions` maps the remainder to a
/// literal. Remainders 0 and 1 yield two-digit results, so a bank's table must
/// cover them; an unmapped one is reported as `FieldTooLong`. An empty
/// `weights` range is rejected with `EmptyWeights`.
pub fn mod11(
    value: &str,
    weights: RangeInclusive<u32>,
    exceptions: &[(u32, char)],
) -> Result<char> {
    if weights.is_empty() {
        return Err(RemessaError::EmptyWeights {
            start: *weights.start(),
            end: *weights.end(),
        });
    }
    let cycle: Vec<u32> = weights.collect();
    let sum: u32 = digits_of(value)?
        .iter()
        .rev()
        .zip(cycle.iter().cycle())
        .map(|(d, w)| d * w)
        .sum();
    let remainder = sum % 11;
    if let Some((_, digit)) = exceptions.iter().find(|(r, _)| *r == remainder) {
        return Ok(*digit);
    }
    let dv = 11 - remainder;
    char::from_digit(dv, 10).ok_or_else(|| RemessaError::FieldTooLong {
        value: dv.to_string(),
        width: 1,
    })
}

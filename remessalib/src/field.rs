//! Fixed-width field rendering.
//!
//! Every function either returns exactly `width` characters or fails; nothing is
//! truncated silently. Over-long values are a validation concern upstream.

use crate::error::{RemessaError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use encoding_rs::ISO_8859_15;
use rust_decimal::Decimal;

/// Digits left-padded with `'0'`.
pub fn numeric(value: &str, width: usize) -> Result<String> {
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(RemessaError::NotNumeric {
            value: value.to_string(),
        });
    }
    if value.len() > width {
        return Err(RemessaError::FieldTooLong {
            value: value.to_string(),
            width,
        });
    }
    Ok(format!("{value:0>width$}"))
}

pub fn number(value: u64, width: usize) -> Result<String> {
    numeric(&value.to_string(), width)
}

/// Text right-padded with spaces.
pub fn text(value: &str, width: usize) -> Result<String> {
    if let Some(ch) = first_unsupported_char(value) {
        return Err(RemessaError::UnsupportedCharacter {
            ch,
            value: value.to_string(),
        });
    }
    if value.chars().count() > width {
        return Err(RemessaError::FieldTooLong {
            value: value.to_string(),
            width,
        });
    }
    Ok(format!("{value:<width$}"))
}

pub fn blank(width: usize) -> String {
    " ".repeat(width)
}

pub fn zeros(width: usize) -> String {
    "0".repeat(width)
}

/// `DDMMAAAA`
pub fn date(d: NaiveDate) -> String {
    d.format("%d%m%Y").to_string()
}

/// `DDMMAAAA`, or eight zeros when absent.
pub fn optional_date(d: Option<NaiveDate>) -> String {
    d.map(date).unwrap_or_else(|| zeros(8))
}

/// `HHMMSS`
pub fn time(t: NaiveDateTime) -> String {
    t.format("%H%M%S").to_string()
}

/// Amount in cents, zero-padded. Values with more than 2 decimals are rounded.
pub fn money(value: &Decimal, width: usize) -> Result<String> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(RemessaError::NotNumeric {
            value: value.to_string(),
        });
    }
    let mut cents = value.round_dp(2);
    cents.rescale(2);
    numeric(&cents.mantissa().abs().to_string(), width)
}

/// First char that the ISO-8859-15 output can't carry. Control chars count too,
/// they would break the record structure.
pub fn first_unsupported_char(value: &str) -> Option<char> {
    value.chars().find(|c| c.is_control() || !is_latin9(*c))
}

fn is_latin9(c: char) -> bool {
    let mut buf = [0u8; 4];
    let (_, _, had_errors) = ISO_8859_15.encode(c.encode_utf8(&mut buf));
    !had_errors
}

/// Transcodes rendered text (lines plus terminators) to ISO-8859-15 bytes.
pub fn encode_latin(value: &str) -> Result<Vec<u8>> {
    let (bytes, _, had_errors) = ISO_8859_15.encode(value);
    if had_errors {
        let ch = value.chars().find(|c| !is_latin9(*c)).unwrap_or(char::REPLACEMENT_CHARACTER);
        return Err(RemessaError::UnsupportedCharacter {
            ch,
            value: value.to_string(),
        });
    }
    Ok(bytes.into_owned())
}

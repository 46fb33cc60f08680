//! Aggregated validation errors over the file → batch → payment/account graph.
//!
//! Nothing here short-circuits: each check appends to a `ValidationErrors` and
//! callers keep going, so one pass reports every defect in the graph.

use crate::field;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub enum Violation {
    #[error("can't be blank")]
    Blank,
    #[error("must not be empty")]
    Empty,
    #[error("must have exactly {count} characters")]
    LengthIs { count: usize },
    #[error("must have at most {count} characters")]
    LengthMaximum { count: usize },
    #[error("must contain only digits")]
    NotNumeric,
    #[error("must be one of {allowed}")]
    Inclusion { allowed: &'static str },
    #[error("must not be negative")]
    Negative,
    #[error("must have at most 2 decimal places")]
    TooManyFractionDigits,
    #[error("contains {ch:?}, which is not representable in ISO-8859-15")]
    UnsupportedCharacter { ch: char },
    #[error("must not be before {other}")]
    DateBefore { other: &'static str },
    #[error("must not be after {other}")]
    DateAfter { other: &'static str },
    #[error("must be at most {count} items")]
    TooMany { count: usize },
    #[error("must fit in {count} digits as cents")]
    AmountTooLarge { count: usize },
    #[error("must fit in {count} records")]
    TooManyRecords { count: usize },
    #[error("belongs to bank {found}, encoder expects {expected}")]
    BankMismatch { expected: String, found: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Dotted attribute path, e.g. `batches[0].payments[2].amount`.
    pub path: String,
    pub violation: Violation,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.violation)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, violation: Violation) {
        self.0.push(ValidationError {
            path: path.into(),
            violation,
        });
    }

    /// Hoists a child's errors under `prefix`, keeping their order.
    pub fn nest(&mut self, prefix: &str, child: ValidationErrors) {
        for e in child.0 {
            let path = if e.path.is_empty() {
                prefix.to_string()
            } else {
                format!("{prefix}.{}", e.path)
            };
            self.0.push(ValidationError {
                path,
                violation: e.violation,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Errors recorded exactly at `path`.
    pub fn on<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.0.iter().filter(move |e| e.path == path).map(|e| &e.violation)
    }

    /// Errors at `prefix` or anywhere below it.
    pub fn under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.0.iter().filter(move |e| {
            e.path == prefix
                || e.path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
        })
    }

    /* ----------------------------- checks ------------------------------- */

    /// Records `Blank` for an empty/whitespace value; returns whether a value is present.
    pub fn required(&mut self, path: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.add(path, Violation::Blank);
            return false;
        }
        true
    }

    pub fn numeric(&mut self, path: &str, value: &str) {
        if !value.is_empty() && !value.chars().all(|c| c.is_ascii_digit()) {
            self.add(path, Violation::NotNumeric);
        }
    }

    pub fn length_is(&mut self, path: &str, value: &str, count: usize) {
        if !value.is_empty() && value.chars().count() != count {
            self.add(path, Violation::LengthIs { count });
        }
    }

    pub fn length_max(&mut self, path: &str, value: &str, count: usize) {
        if value.chars().count() > count {
            self.add(path, Violation::LengthMaximum { count });
        }
    }

    /// Free text: must fit `max` columns and the target charset.
    pub fn text(&mut self, path: &str, value: &str, max: usize) {
        self.length_max(path, value, max);
        if let Some(ch) = field::first_unsupported_char(value) {
            self.add(path, Violation::UnsupportedCharacter { ch });
        }
    }

    /// Amount rendered as cents into a `digits`-wide column.
    pub fn money(&mut self, path: &str, value: &Decimal, digits: usize) {
        if value.is_sign_negative() && !value.is_zero() {
            self.add(path, Violation::Negative);
        }
        if value.normalize().scale() > 2 {
            self.add(path, Violation::TooManyFractionDigits);
        }
        self.cents_fit(path, value, digits);
    }

    pub fn cents_fit(&mut self, path: &str, value: &Decimal, digits: usize) {
        let mut whole = value.abs().trunc();
        whole.rescale(0);
        let whole_digits = whole.mantissa().to_string().trim_start_matches('0').len();
        if whole_digits + 2 > digits {
            self.add(path, Violation::AmountTooLarge { count: digits });
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

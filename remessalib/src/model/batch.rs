//! A batch ("lote"): payments collected under one account.

use crate::{
    cnab240::base::SEGMENTS_PER_PAYMENT,
    error::Result,
    model::{account::Account, payment::Payment},
    traits::Validate,
    validation::{ValidationErrors, Violation},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const MAX_MESSAGES: usize = 2;
/// Detail record numbers are five digits wide, three segments per payment.
pub const MAX_PAYMENTS: usize = 33_333;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Batch {
    /// Shared with other batches of the same creditor.
    pub account: Arc<Account>,
    pub payments: Vec<Payment>,
    /// Batch header messages 1 and 2.
    #[serde(default)]
    pub messages: Vec<String>,
}

impl Batch {
    pub fn new(account: Arc<Account>, payments: impl IntoIterator<Item = Payment>) -> Self {
        Self {
            account,
            payments: payments.into_iter().collect(),
            messages: Vec::new(),
        }
    }

    pub fn from_fields(fields: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(fields)?)
    }

    pub fn with_messages<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.messages = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn push(&mut self, payment: Payment) {
        self.payments.push(payment);
    }

    /// Header, detail segments and trailer.
    pub fn record_count(&self) -> usize {
        self.payments.len() * SEGMENTS_PER_PAYMENT + 2
    }

    pub fn total_amount(&self) -> Decimal {
        self.payments.iter().map(|p| p.amount).sum()
    }

    pub fn message(&self, index: usize) -> &str {
        self.messages.get(index).map(String::as_str).unwrap_or("")
    }
}

impl Validate for Batch {
    fn validate_into(&self, errors: &mut ValidationErrors) {
        errors.nest("account", self.account.errors());
        if self.payments.is_empty() {
            errors.add("payments", Violation::Empty);
        } else if self.payments.len() > MAX_PAYMENTS {
            errors.add("payments", Violation::TooMany { count: MAX_PAYMENTS });
        }
        for (i, payment) in self.payments.iter().enumerate() {
            errors.nest(&format!("payments[{i}]"), payment.errors());
        }
        if self.messages.len() > MAX_MESSAGES {
            errors.add("messages", Violation::TooMany { count: MAX_MESSAGES });
        }
        for (i, line) in self.messages.iter().enumerate() {
            errors.text(&format!("messages[{i}]"), line, 40);
        }
    }
}

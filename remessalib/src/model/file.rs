//! Root aggregate submitted to the bank.

use crate::{
    error::Result,
    model::{
        account::Account,
        batch::Batch,
        payment::{inscription_type, validate_document},
    },
    traits::Validate,
    validation::{ValidationErrors, Violation},
};
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

pub const MAX_SEQUENCE_NUMBER: u32 = 999_999;
/// Batch numbers are four digits wide.
pub const MAX_BATCHES: usize = 9_999;
/// The file trailer counts lines in six digits.
pub const MAX_RECORDS: usize = 999_999;

fn now() -> NaiveDateTime {
    let t = Local::now().naive_local();
    t.with_nanosecond(0).unwrap_or(t)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct File {
    /// Creditor ("empresa") name as registered with the bank.
    pub company_name: String,
    /// CPF or CNPJ of the creditor.
    pub company_document: String,
    /// NSA, sequential per submission.
    pub sequence_number: u32,
    /// Fixed at construction; header dates and times are taken from here.
    #[serde(default = "now")]
    pub created_at: NaiveDateTime,
    pub batches: Vec<Batch>,
}

impl File {
    pub fn new(
        company_name: impl Into<String>,
        company_document: impl Into<String>,
        sequence_number: u32,
        batches: impl IntoIterator<Item = Batch>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            company_document: company_document.into(),
            sequence_number,
            created_at: now(),
            batches: batches.into_iter().collect(),
        }
    }

    pub fn from_fields(fields: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(fields)?)
    }

    pub fn with_created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn inscription_type(&self) -> char {
        inscription_type(&self.company_document)
    }

    /// Account shown in the file header: the one of the first batch.
    pub fn header_account(&self) -> Option<&Account> {
        self.batches.first().map(|b| b.account.as_ref())
    }

    pub fn payment_count(&self) -> usize {
        self.batches.iter().map(|b| b.payments.len()).sum()
    }

    /// Every line of the encoded file, headers and trailers included.
    pub fn record_count(&self) -> usize {
        2 + self.batches.iter().map(Batch::record_count).sum::<usize>()
    }
}

impl Validate for File {
    fn validate_into(&self, errors: &mut ValidationErrors) {
        if errors.required("company_name", &self.company_name) {
            errors.text("company_name", &self.company_name, 30);
        }
        validate_document(errors, "company_document", &self.company_document);
        if self.sequence_number == 0 || self.sequence_number > MAX_SEQUENCE_NUMBER {
            errors.add(
                "sequence_number",
                Violation::Inclusion {
                    allowed: "1..=999999",
                },
            );
        }
        if self.batches.is_empty() {
            errors.add("batches", Violation::Empty);
        } else if self.batches.len() > MAX_BATCHES {
            errors.add("batches", Violation::TooMany { count: MAX_BATCHES });
        }
        if self.record_count() > MAX_RECORDS {
            errors.add("batches", Violation::TooManyRecords { count: MAX_RECORDS });
        }
        for (i, batch) in self.batches.iter().enumerate() {
            errors.nest(&format!("batches[{i}]"), batch.errors());
        }
    }
}

//! One boleto collection instruction and its payer.

use crate::{
    error::Result,
    traits::Validate,
    validation::{ValidationErrors, Violation},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MAX_INSTRUCTIONS: usize = 2;
/// Width of every amount column of the detail segments.
pub const AMOUNT_DIGITS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Payer {
    pub name: String,
    /// CPF (11 digits) or CNPJ (14 digits).
    pub document: String,
    pub address: String,
    #[serde(default)]
    pub neighborhood: String,
    /// CEP, 8 digits.
    pub zip_code: String,
    pub city: String,
    /// UF, two letters.
    pub state: String,
}

impl Payer {
    pub fn inscription_type(&self) -> char {
        inscription_type(&self.document)
    }
}

/// `1` for a CPF, `2` for a CNPJ.
pub fn inscription_type(document: &str) -> char {
    if document.len() == 11 {
        '1'
    } else {
        '2'
    }
}

pub(crate) fn validate_document(errors: &mut ValidationErrors, path: &str, document: &str) {
    if errors.required(path, document) {
        errors.numeric(path, document);
        if document.len() != 11 && document.len() != 14 {
            errors.add(
                path,
                Violation::Inclusion {
                    allowed: "CPF (11 digits) or CNPJ (14 digits)",
                },
            );
        }
    }
}

impl Validate for Payer {
    fn validate_into(&self, errors: &mut ValidationErrors) {
        if errors.required("name", &self.name) {
            errors.text("name", &self.name, 40);
        }
        validate_document(errors, "document", &self.document);
        if errors.required("address", &self.address) {
            errors.text("address", &self.address, 40);
        }
        errors.text("neighborhood", &self.neighborhood, 15);
        if errors.required("zip_code", &self.zip_code) {
            errors.numeric("zip_code", &self.zip_code);
            errors.length_is("zip_code", &self.zip_code, 8);
        }
        if errors.required("city", &self.city) {
            errors.text("city", &self.city, 15);
        }
        if errors.required("state", &self.state) {
            errors.length_is("state", &self.state, 2);
            if !self.state.chars().all(|c| c.is_ascii_alphabetic()) {
                errors.add("state", Violation::Inclusion { allowed: "two-letter UF" });
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Discount {
    /// Last day the discount applies.
    pub date: NaiveDate,
    pub amount: Decimal,
}

fn default_document_kind() -> String {
    "01".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Payment {
    pub document_number: String,
    /// Bank-assigned id; the last character is its check digit. Separators
    /// (`/`, `-`, `.`) are allowed and ignored when rendering.
    pub our_number: String,
    pub due_date: NaiveDate,
    pub issue_date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub interest_per_day: Decimal,
    #[serde(default)]
    pub fine_amount: Decimal,
    #[serde(default)]
    pub discount: Option<Discount>,
    #[serde(default)]
    pub rebate_amount: Decimal,
    #[serde(default)]
    pub iof_amount: Decimal,
    /// Title kind ("espécie"), two digits.
    #[serde(default = "default_document_kind")]
    pub document_kind: String,
    pub payer: Payer,
    /// Free-text lines printed on the slip, at most two.
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl Payment {
    /// Issue date defaults to the due date; the remaining amounts to zero.
    pub fn new(
        document_number: impl Into<String>,
        our_number: impl Into<String>,
        due_date: NaiveDate,
        amount: Decimal,
        payer: Payer,
    ) -> Self {
        Self {
            document_number: document_number.into(),
            our_number: our_number.into(),
            due_date,
            issue_date: due_date,
            amount,
            interest_per_day: Decimal::ZERO,
            fine_amount: Decimal::ZERO,
            discount: None,
            rebate_amount: Decimal::ZERO,
            iof_amount: Decimal::ZERO,
            document_kind: default_document_kind(),
            payer,
            instructions: Vec::new(),
        }
    }

    pub fn from_fields(fields: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(fields)?)
    }

    pub fn with_issue_date(mut self, issue_date: NaiveDate) -> Self {
        self.issue_date = issue_date;
        self
    }

    pub fn with_instructions<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_discount(mut self, date: NaiveDate, amount: Decimal) -> Self {
        self.discount = Some(Discount { date, amount });
        self
    }

    /// Digits of the our-number, separators removed.
    pub fn our_number_digits(&self) -> String {
        self.our_number.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// Our-number digits without the trailing check digit.
    pub fn our_number_body(&self) -> String {
        let mut digits = self.our_number_digits();
        digits.pop();
        digits
    }

    /// The check digit carried as the last character of the our-number.
    pub fn our_number_check_digit(&self) -> Option<char> {
        self.our_number.chars().last().filter(|c| c.is_ascii_digit())
    }

    pub fn instruction(&self, index: usize) -> &str {
        self.instructions.get(index).map(String::as_str).unwrap_or("")
    }
}

impl Validate for Payment {
    fn validate_into(&self, errors: &mut ValidationErrors) {
        if errors.required("document_number", &self.document_number) {
            errors.numeric("document_number", &self.document_number);
            errors.length_max("document_number", &self.document_number, 15);
        }
        if errors.required("our_number", &self.our_number) {
            let well_formed = self
                .our_number
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '/' | '-' | '.'));
            if !well_formed || self.our_number_check_digit().is_none() {
                errors.add("our_number", Violation::NotNumeric);
            }
            errors.length_max("our_number", &self.our_number_digits(), 20);
        }
        if self.due_date < self.issue_date {
            errors.add("due_date", Violation::DateBefore { other: "issue_date" });
        }
        errors.money("amount", &self.amount, AMOUNT_DIGITS);
        errors.money("interest_per_day", &self.interest_per_day, AMOUNT_DIGITS);
        errors.money("fine_amount", &self.fine_amount, AMOUNT_DIGITS);
        errors.money("rebate_amount", &self.rebate_amount, AMOUNT_DIGITS);
        errors.money("iof_amount", &self.iof_amount, AMOUNT_DIGITS);
        if let Some(discount) = &self.discount {
            errors.money("discount.amount", &discount.amount, AMOUNT_DIGITS);
            if discount.date > self.due_date {
                errors.add("discount.date", Violation::DateAfter { other: "due_date" });
            }
        }
        if errors.required("document_kind", &self.document_kind) {
            errors.numeric("document_kind", &self.document_kind);
            errors.length_is("document_kind", &self.document_kind, 2);
        }
        errors.nest("payer", self.payer.errors());
        if self.instructions.len() > MAX_INSTRUCTIONS {
            errors.add("instructions", Violation::TooMany { count: MAX_INSTRUCTIONS });
        }
        for (i, line) in self.instructions.iter().enumerate() {
            errors.text(&format!("instructions[{i}]"), line, 40);
        }
    }
}

//! Creditor bank account.

use crate::{error::Result, traits::Validate, validation::ValidationErrors};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Account {
    /// Three-digit clearing code of the bank, e.g. `341`.
    pub bank_code: String,
    pub agency: String,
    #[serde(default)]
    pub agency_check_digit: String,
    pub account_number: String,
    pub account_check_digit: String,
    /// Wallet/portfolio ("carteira").
    #[serde(default)]
    pub wallet: String,
    /// Agreement code ("convênio").
    #[serde(default)]
    pub agreement: String,
}

impl Account {
    /// Builds from a field-value mapping; unknown keys are rejected.
    pub fn from_fields(fields: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(fields)?)
    }
}

impl Validate for Account {
    fn validate_into(&self, errors: &mut ValidationErrors) {
        if errors.required("bank_code", &self.bank_code) {
            errors.numeric("bank_code", &self.bank_code);
            errors.length_is("bank_code", &self.bank_code, 3);
        }
        if errors.required("agency", &self.agency) {
            errors.numeric("agency", &self.agency);
        }
        errors.length_max("agency_check_digit", &self.agency_check_digit, 1);
        if errors.required("account_number", &self.account_number) {
            errors.numeric("account_number", &self.account_number);
        }
        if errors.required("account_check_digit", &self.account_check_digit) {
            errors.text("account_check_digit", &self.account_check_digit, 2);
        }
        errors.numeric("wallet", &self.wallet);
        errors.numeric("agreement", &self.agreement);
    }
}

//! Banco Itaú (341) CNAB240 dialect.

use crate::{
    check_digit,
    cnab240::base::BankEncoder,
    error::{RemessaError, Result},
    field,
    model::{account::Account, batch::Batch, payment::Payment},
    validation::ValidationErrors,
};

pub const BANK_CODE: &str = "341";

/// Wallets whose our-number DAC leaves agency and account out.
const WALLETS_WITHOUT_ACCOUNT_IN_DAC: [&str; 5] = ["126", "131", "146", "150", "168"];

#[derive(Debug, Clone, Copy, Default)]
pub struct Itau;

impl Itau {
    /// DAC of the our-number (modulo 10), for callers assigning our-numbers.
    pub fn our_number_dac(account: &Account, payment: &Payment) -> Result<char> {
        let wallet = field::numeric(&account.wallet, 3)?;
        let number = field::numeric(&payment.document_number, 8)?;
        if WALLETS_WITHOUT_ACCOUNT_IN_DAC.contains(&wallet.as_str()) {
            return check_digit::mod10(&(wallet + &number));
        }
        check_digit::mod10(
            &[
                field::numeric(&account.agency, 4)?,
                field::numeric(&account.account_number, 5)?,
                wallet,
                number,
            ]
            .concat(),
        )
    }

    /// Account check digit, preceded by a blank unless it already takes two columns.
    fn account_check_digit_span(account: &Account) -> Result<String> {
        let dv = &account.account_check_digit;
        if dv.chars().count() == 2 {
            field::text(dv, 2)
        } else {
            Ok(field::blank(1) + &field::text(dv, 1)?)
        }
    }
}

impl BankEncoder for Itau {
    fn bank_code(&self) -> &'static str {
        BANK_CODE
    }

    fn bank_name(&self) -> &'static str {
        "BANCO ITAU SA"
    }

    fn layout_version(&self) -> &'static str {
        "040"
    }

    fn batch_layout_version(&self) -> &'static str {
        "030"
    }

    /// agency(5) + blank + zeros(7) + account(5) + [blank] + check digit
    fn account_block(&self, account: &Account) -> Result<String> {
        Ok([
            field::numeric(&account.agency, 5)?,
            field::blank(1),
            field::zeros(7),
            field::numeric(&account.account_number, 5)?,
            Self::account_check_digit_span(account)?,
        ]
        .concat())
    }

    fn agency_block(&self, account: &Account) -> Result<String> {
        Ok(field::numeric(&account.agency, 5)? + &field::blank(1))
    }

    fn file_header_agreement(&self, _account: &Account) -> Result<String> {
        Ok(field::blank(20))
    }

    fn file_header_complement(&self) -> String {
        field::zeros(3) + &field::blank(12)
    }

    fn batch_agreement(&self, _batch: &Batch) -> Result<String> {
        Ok(field::blank(20))
    }

    /// zeros(7) + account(5) + [blank] + check digit + wallet(3) + document
    /// number(8) + our-number DAC + blanks(8)
    fn wallet_block(&self, payment: &Payment, account: &Account) -> Result<String> {
        Ok([
            field::zeros(7),
            field::numeric(&account.account_number, 5)?,
            Self::account_check_digit_span(account)?,
            field::numeric(&account.wallet, 3)?,
            field::numeric(&payment.document_number, 8)?,
            self.our_number_check_digit(payment, account)?.to_string(),
            field::blank(8),
        ]
        .concat())
    }

    /// Taken as given: the last character of the our-number.
    fn our_number_check_digit(&self, payment: &Payment, _account: &Account) -> Result<char> {
        payment
            .our_number_check_digit()
            .ok_or_else(|| RemessaError::NotNumeric {
                value: payment.our_number.clone(),
            })
    }

    fn title_registration_block(&self, _payment: &Payment) -> String {
        field::zeros(5)
    }

    /// document number(10) + blanks(5)
    fn document_number_block(&self, payment: &Payment) -> Result<String> {
        Ok(field::numeric(&payment.document_number, 10)? + &field::blank(5))
    }

    fn fine_code(&self, _payment: &Payment) -> char {
        '0'
    }

    /// Totals are only meaningful in return files: zeros(92), then the credit
    /// notice number and the FEBRABAN tail in blanks.
    fn batch_trailer_reserved_block(&self, _batch: &Batch, _record_count: usize) -> Result<String> {
        Ok([field::zeros(92), field::blank(8), field::blank(117)].concat())
    }

    fn validate_account(&self, account: &Account, errors: &mut ValidationErrors) {
        errors.length_is("agency", &account.agency, 4);
        errors.length_max("account_number", &account.account_number, 5);
        errors.length_max("account_check_digit", &account.account_check_digit, 2);
        if errors.required("wallet", &account.wallet) {
            errors.length_is("wallet", &account.wallet, 3);
        }
        if errors.required("agreement", &account.agreement) {
            errors.length_max("agreement", &account.agreement, 5);
        }
    }

    /// The trailer carries no totals.
    fn validate_batch(&self, _batch: &Batch, _errors: &mut ValidationErrors) {}

    fn validate_payment(&self, payment: &Payment, errors: &mut ValidationErrors) {
        errors.length_max("document_number", &payment.document_number, 8);
    }
}

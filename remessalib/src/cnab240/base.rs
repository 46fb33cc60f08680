//! CNAB240 layout shared by every bank.
//!
//! Record types: `0` file header, `1` batch header, `3` detail (segments P, Q
//! and R for each payment), `5` batch trailer, `9` file trailer. Each record is
//! a fixed sequence of sub-fields; the ones banks disagree on are hooks with a
//! FEBRABAN default, so a bank encoder overrides only the columns that differ.
//! Positions in the comments are 1-based and inclusive, as in the bank manuals.

use crate::{
    check_digit,
    error::{RemessaError, Result},
    field,
    model::{account::Account, batch::Batch, file::File, payment::Payment},
    traits::Validate,
    validation::{ValidationErrors, Violation},
};
use rust_decimal::Decimal;
use std::fmt;

pub const RECORD_WIDTH: usize = 240;

/// Detail records emitted per payment: segments P, Q and R.
pub const SEGMENTS_PER_PAYMENT: usize = 3;

/// One fixed-width record, without terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line(String);

impl Line {
    /// Concatenates `parts`, failing unless the result is exactly `width` chars.
    pub fn assemble(record: &'static str, width: usize, parts: &[&str]) -> Result<Self> {
        let line = parts.concat();
        let actual = line.chars().count();
        if actual != width {
            return Err(RemessaError::LineWidthMismatch {
                record,
                expected: width,
                actual,
            });
        }
        Ok(Self(line))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn width(&self) -> usize {
        self.0.chars().count()
    }

    /// Columns `from..=to`, 1-based as in the layout manuals.
    pub fn columns(&self, from: usize, to: usize) -> String {
        self.0.chars().skip(from - 1).take(to + 1 - from).collect()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Line {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Checks a hook result against the width its slot has in the record.
pub fn sized(hook: &'static str, width: usize, value: String) -> Result<String> {
    let actual = value.chars().count();
    if actual != width {
        return Err(RemessaError::LineWidthMismatch {
            record: hook,
            expected: width,
            actual,
        });
    }
    Ok(value)
}

/// Batch-level values assigned while encoding.
#[derive(Debug, Clone, Copy)]
pub struct BatchContext<'a> {
    pub file: &'a File,
    /// 1-based position of the batch in the file.
    pub batch_number: u32,
}

/// Payment-level values assigned while encoding.
#[derive(Debug, Clone, Copy)]
pub struct PaymentContext<'a> {
    pub batch_number: u32,
    /// 1-based position of the payment in its batch.
    pub sequence: u32,
    pub account: &'a Account,
}

impl PaymentContext<'_> {
    /// Record number inside the batch of the `segment`-th (0-based) segment.
    pub fn record_number(&self, segment: usize) -> u64 {
        (self.sequence as u64 - 1) * SEGMENTS_PER_PAYMENT as u64 + segment as u64 + 1
    }
}

fn positive(value: &Decimal) -> bool {
    *value > Decimal::ZERO
}

/// A bank's CNAB240 dialect.
///
/// Object safe, so callers can pick an encoder at runtime by bank code.
pub trait BankEncoder: Send + Sync {
    fn bank_code(&self) -> &'static str;

    fn bank_name(&self) -> &'static str;

    fn record_width(&self) -> usize {
        RECORD_WIDTH
    }

    /* ------------------------------ hooks ------------------------------- */

    /// File header 164-166.
    fn layout_version(&self) -> &'static str {
        "087"
    }

    /// Batch header 14-16.
    fn batch_layout_version(&self) -> &'static str {
        "045"
    }

    /// Agency, account and their check digits (20). Headers 53-72 / 54-73.
    fn account_block(&self, account: &Account) -> Result<String> {
        Ok([
            field::numeric(&account.agency, 5)?,
            field::text(&account.agency_check_digit, 1)?,
            field::numeric(&account.account_number, 12)?,
            field::text(&account.account_check_digit, 1)?,
            field::blank(1),
        ]
        .concat())
    }

    /// Agency and its check digit (6). Segment P 18-23.
    fn agency_block(&self, account: &Account) -> Result<String> {
        Ok(field::numeric(&account.agency, 5)? + &field::text(&account.agency_check_digit, 1)?)
    }

    /// Agreement code (20). File header 33-52.
    fn file_header_agreement(&self, account: &Account) -> Result<String> {
        field::text(&account.agreement, 20)
    }

    /// Tail of the file header (15). 226-240.
    fn file_header_complement(&self) -> String {
        field::blank(15)
    }

    /// Agreement code (20). Batch header 34-53.
    fn batch_agreement(&self, batch: &Batch) -> Result<String> {
        self.file_header_agreement(&batch.account)
    }

    /// Account and our-number span (34). Segment P 24-57.
    fn wallet_block(&self, payment: &Payment, account: &Account) -> Result<String> {
        Ok([
            field::numeric(&account.account_number, 12)?,
            field::text(&account.account_check_digit, 1)?,
            field::blank(1),
            field::numeric(&payment.our_number_body(), 19)?,
            self.our_number_check_digit(payment, account)?.to_string(),
        ]
        .concat())
    }

    /// Check digit of the our-number: modulo 11, weights 2..9, remainders 0
    /// and 1 map to `0`.
    fn our_number_check_digit(&self, payment: &Payment, _account: &Account) -> Result<char> {
        check_digit::mod11(&payment.our_number_body(), 2..=9, &[(0, '0'), (1, '0')])
    }

    /// Wallet kind, registration, document type, issuer and distributor (5).
    /// Segment P 58-62.
    fn title_registration_block(&self, _payment: &Payment) -> String {
        "11122".to_string()
    }

    /// Document number (15). Segment P 63-77.
    fn document_number_block(&self, payment: &Payment) -> Result<String> {
        field::numeric(&payment.document_number, 15)
    }

    /// Fine code, segment R 66: `1` fixed amount, `0` none.
    fn fine_code(&self, payment: &Payment) -> char {
        if positive(&payment.fine_amount) {
            '1'
        } else {
            '0'
        }
    }

    /// Batch trailer 24-240 (217): four count/amount pairs (the first filled
    /// with the simple-collection totals), the credit notice number and the
    /// FEBRABAN reserved tail.
    fn batch_trailer_reserved_block(&self, batch: &Batch, _record_count: usize) -> Result<String> {
        Ok([
            field::number(batch.payments.len() as u64, 6)?,
            field::money(&batch.total_amount(), 17)?,
            field::zeros(69),
            field::blank(8),
            field::blank(117),
        ]
        .concat())
    }

    /// Bank-specific account rules on top of `Account`'s own, sized to the
    /// default `account_block` and `file_header_agreement`.
    fn validate_account(&self, account: &Account, errors: &mut ValidationErrors) {
        errors.length_max("agency", &account.agency, 5);
        errors.length_max("account_number", &account.account_number, 12);
        errors.length_max("account_check_digit", &account.account_check_digit, 1);
        errors.length_max("agreement", &account.agreement, 20);
    }

    /// Bank-specific batch rules. The default trailer carries the batch total
    /// in 17 digits.
    fn validate_batch(&self, batch: &Batch, errors: &mut ValidationErrors) {
        errors.cents_fit("total_amount", &batch.total_amount(), 17);
    }

    /// Bank-specific payment rules on top of `Payment`'s own.
    fn validate_payment(&self, _payment: &Payment, _errors: &mut ValidationErrors) {}

    /* ---------------------------- validation ---------------------------- */

    /// Full check of `file` as this bank would receive it.
    fn validate(&self, file: &File) -> ValidationErrors {
        let mut errors = file.errors();
        for (i, batch) in file.batches.iter().enumerate() {
            let mut bank = ValidationErrors::new();
            if batch.account.bank_code != self.bank_code() {
                bank.add(
                    "bank_code",
                    Violation::BankMismatch {
                        expected: self.bank_code().to_string(),
                        found: batch.account.bank_code.clone(),
                    },
                );
            }
            self.validate_account(&batch.account, &mut bank);
            errors.nest(&format!("batches[{i}].account"), bank);
            let mut bank = ValidationErrors::new();
            self.validate_batch(batch, &mut bank);
            errors.nest(&format!("batches[{i}]"), bank);
            for (j, payment) in batch.payments.iter().enumerate() {
                let mut bank = ValidationErrors::new();
                self.validate_payment(payment, &mut bank);
                errors.nest(&format!("batches[{i}].payments[{j}]"), bank);
            }
        }
        errors
    }

    /* ----------------------------- records ------------------------------ */

    fn file_header(&self, file: &File) -> Result<Line> {
        let account = file.header_account().ok_or_else(|| {
            let mut errors = ValidationErrors::new();
            errors.add("batches", Violation::Empty);
            RemessaError::InvalidGraph(errors)
        })?;
        let agreement = sized("file_header_agreement", 20, self.file_header_agreement(account)?)?;
        Line::assemble(
            "file header",
            self.record_width(),
            &[
                self.bank_code(), // 001-003
                "0000", // 004-007 batch
                "0", // 008 record type
                &field::blank(9), // 009-017
                &file.inscription_type().to_string(), // 018
                &field::numeric(&file.company_document, 14)?, // 019-032
                &agreement, // 033-052
                &sized("account_block", 20, self.account_block(account)?)?, // 053-072
                &field::text(&file.company_name, 30)?, // 073-102
                &field::text(self.bank_name(), 30)?, // 103-132
                &field::blank(10), // 133-142
                "1", // 143 remessa
                &field::date(file.created_at.date()), // 144-151
                &field::time(file.created_at), // 152-157
                &field::number(file.sequence_number.into(), 6)?, // 158-163
                &sized("layout_version", 3, self.layout_version().to_string())?, // 164-166
                &field::zeros(5), // 167-171 density
                &field::blank(54), // 172-225
                &sized("file_header_complement", 15, self.file_header_complement())?, // 226-240
            ],
        )
    }

    fn batch_header(&self, ctx: &BatchContext<'_>, batch: &Batch) -> Result<Line> {
        let file = ctx.file;
        let layout_version =
            sized("batch_layout_version", 3, self.batch_layout_version().to_string())?;
        Line::assemble(
            "batch header",
            self.record_width(),
            &[
                self.bank_code(), // 001-003
                &field::number(ctx.batch_number.into(), 4)?, // 004-007
                "1", // 008
                "R", // 009 operation
                "01", // 010-011 service
                &field::blank(2), // 012-013
                &layout_version, // 014-016
                &field::blank(1), // 017
                &file.inscription_type().to_string(), // 018
                &field::numeric(&file.company_document, 15)?, // 019-033
                &sized("batch_agreement", 20, self.batch_agreement(batch)?)?, // 034-053
                &sized("account_block", 20, self.account_block(&batch.account)?)?, // 054-073
                &field::text(&file.company_name, 30)?, // 074-103
                &field::text(batch.message(0), 40)?, // 104-143
                &field::text(batch.message(1), 40)?, // 144-183
                &field::number(file.sequence_number.into(), 8)?, // 184-191
                &field::date(file.created_at.date()), // 192-199
                &field::zeros(8), // 200-207 credit date
                &field::blank(33), // 208-240
            ],
        )
    }

    /// Segment P: title identification, due date and charges.
    fn segment_p(&self, payment: &Payment, ctx: &PaymentContext<'_>) -> Result<Line> {
        let interest = positive(&payment.interest_per_day);
        let (discount_code, discount_date, discount_amount) = match &payment.discount {
            Some(d) => ("1", Some(d.date), d.amount),
            None => ("0", None, Decimal::ZERO),
        };
        let interest_date = interest.then(|| payment.due_date.succ_opt()).flatten();
        let registration =
            sized("title_registration_block", 5, self.title_registration_block(payment))?;
        let document_number =
            sized("document_number_block", 15, self.document_number_block(payment)?)?;
        Line::assemble(
            "segment P",
            self.record_width(),
            &[
                self.bank_code(), // 001-003
                &field::number(ctx.batch_number.into(), 4)?, // 004-007
                "3", // 008
                &field::number(ctx.record_number(0), 5)?, // 009-013
                "P", // 014
                &field::blank(1), // 015
                "01", // 016-017 entry
                &sized("agency_block", 6, self.agency_block(ctx.account)?)?, // 018-023
                &sized("wallet_block", 34, self.wallet_block(payment, ctx.account)?)?, // 024-057
                &registration, // 058-062
                &document_number, // 063-077
                &field::date(payment.due_date), // 078-085
                &field::money(&payment.amount, 15)?, // 086-100
                &field::zeros(5), // 101-105 collecting agency
                &field::blank(1), // 106
                &field::numeric(&payment.document_kind, 2)?, // 107-108
                "N", // 109 acceptance
                &field::date(payment.issue_date), // 110-117
                if interest { "1" } else { "3" }, // 118 interest code
                &field::optional_date(interest_date), // 119-126
                &field::money(&payment.interest_per_day, 15)?, // 127-141
                discount_code, // 142
                &field::optional_date(discount_date), // 143-150
                &field::money(&discount_amount, 15)?, // 151-165
                &field::money(&payment.iof_amount, 15)?, // 166-180
                &field::money(&payment.rebate_amount, 15)?, // 181-195
                &field::text(&payment.document_number, 25)?, // 196-220 company use
                "3", // 221 do not protest
                "00", // 222-223
                "0", // 224 write-off
                "000", // 225-227
                "09", // 228-229 BRL
                &field::zeros(10), // 230-239 contract
                &field::blank(1), // 240
            ],
        )
    }

    /// Segment Q: payer identity and address.
    fn segment_q(&self, payment: &Payment, ctx: &PaymentContext<'_>) -> Result<Line> {
        let payer = &payment.payer;
        let zip = field::numeric(&payer.zip_code, 8)?;
        Line::assemble(
            "segment Q",
            self.record_width(),
            &[
                self.bank_code(), // 001-003
                &field::number(ctx.batch_number.into(), 4)?, // 004-007
                "3", // 008
                &field::number(ctx.record_number(1), 5)?, // 009-013
                "Q", // 014
                &field::blank(1), // 015
                "01", // 016-017
                &payer.inscription_type().to_string(), // 018
                &field::numeric(&payer.document, 15)?, // 019-033
                &field::text(&payer.name, 40)?, // 034-073
                &field::text(&payer.address, 40)?, // 074-113
                &field::text(&payer.neighborhood, 15)?, // 114-128
                &zip[..5], // 129-133
                &zip[5..], // 134-136
                &field::text(&payer.city, 15)?, // 137-151
                &field::text(&payer.state, 2)?, // 152-153
                "0", // 154 guarantor
                &field::zeros(15), // 155-169
                &field::blank(40), // 170-209
                "000", // 210-212 correspondent
                &field::blank(20), // 213-232
                &field::blank(8), // 233-240
            ],
        )
    }

    /// Segment R: extra discounts, fine and instruction lines.
    fn segment_r(&self, payment: &Payment, ctx: &PaymentContext<'_>) -> Result<Line> {
        let fine = positive(&payment.fine_amount);
        Line::assemble(
            "segment R",
            self.record_width(),
            &[
                self.bank_code(), // 001-003
                &field::number(ctx.batch_number.into(), 4)?, // 004-007
                "3", // 008
                &field::number(ctx.record_number(2), 5)?, // 009-013
                "R", // 014
                &field::blank(1), // 015
                "01", // 016-017
                "0", // 018 discount 2
                &field::zeros(8), // 019-026
                &field::zeros(15), // 027-041
                "0", // 042 discount 3
                &field::zeros(8), // 043-050
                &field::zeros(15), // 051-065
                &self.fine_code(payment).to_string(), // 066
                &field::optional_date(fine.then_some(payment.due_date)), // 067-074
                &field::money(&payment.fine_amount, 15)?, // 075-089
                &field::blank(10), // 090-099
                &field::text(payment.instruction(0), 40)?, // 100-139
                &field::text(payment.instruction(1), 40)?, // 140-179
                &field::blank(20), // 180-199
                &field::zeros(8), // 200-207
                &field::zeros(3), // 208-210 debit bank
                &field::zeros(5), // 211-215
                &field::blank(1), // 216
                &field::zeros(12), // 217-228
                &field::blank(1), // 229
                &field::blank(1), // 230
                "0", // 231 debit notice
                &field::blank(9), // 232-240
            ],
        )
    }

    /// All detail records of one payment, in order.
    fn payment_segments(&self, payment: &Payment, ctx: &PaymentContext<'_>) -> Result<Vec<Line>> {
        Ok(vec![
            self.segment_p(payment, ctx)?,
            self.segment_q(payment, ctx)?,
            self.segment_r(payment, ctx)?,
        ])
    }

    fn batch_trailer(
        &self,
        batch: &Batch,
        batch_number: u32,
        payment_count: usize,
    ) -> Result<Line> {
        let record_count = payment_count * SEGMENTS_PER_PAYMENT + 2;
        Line::assemble(
            "batch trailer",
            self.record_width(),
            &[
                self.bank_code(), // 001-003
                &field::number(batch_number.into(), 4)?, // 004-007
                "5", // 008
                &field::blank(9), // 009-017
                &field::number(record_count as u64, 6)?, // 018-023
                &sized(
                    "batch_trailer_reserved_block",
                    217,
                    self.batch_trailer_reserved_block(batch, record_count)?,
                )?, // 024-240
            ],
        )
    }

    fn file_trailer(
        &self,
        _file: &File,
        batch_count: usize,
        total_line_count: usize,
    ) -> Result<Line> {
        Line::assemble(
            "file trailer",
            self.record_width(),
            &[
                self.bank_code(), // 001-003
                "9999", // 004-007
                "9", // 008
                &field::blank(9), // 009-017
                &field::number(batch_count as u64, 6)?, // 018-023
                &field::number(total_line_count as u64, 6)?, // 024-029
                &field::zeros(6), // 030-035
                &field::blank(205), // 036-240
            ],
        )
    }
}

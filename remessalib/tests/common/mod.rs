#![allow(dead_code)]

use chrono::NaiveDate;
use remessalib::model::{
    account::Account,
    batch::Batch,
    file::File,
    payment::{Payer, Payment},
};
use rust_decimal::Decimal;
use std::sync::Arc;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn account() -> Account {
    Account {
        bank_code: "341".into(),
        agency: "1234".into(),
        agency_check_digit: String::new(),
        account_number: "12345".into(),
        account_check_digit: "7".into(),
        wallet: "109".into(),
        agreement: "12345".into(),
    }
}

pub fn payer() -> Payer {
    Payer {
        name: "JOAO DA SILVA".into(),
        document: "12345678901".into(),
        address: "RUA DAS FLORES 100".into(),
        neighborhood: "CENTRO".into(),
        zip_code: "01310100".into(),
        city: "SAO PAULO".into(),
        state: "SP".into(),
    }
}

pub fn payment() -> Payment {
    Payment::new(
        "89378",
        "109/00089378-2",
        date(2016, 3, 7),
        Decimal::from_str_exact("879.66").unwrap(),
        payer(),
    )
    .with_issue_date(date(2016, 3, 1))
}

pub fn batch() -> Batch {
    Batch::new(Arc::new(account()), vec![payment()])
}

pub fn file(batches: Vec<Batch>) -> File {
    File::new("EMPRESA TESTE LTDA", "12345678000199", 1, batches)
        .with_created_at(date(2016, 3, 1).and_hms_opt(10, 20, 30).unwrap())
}

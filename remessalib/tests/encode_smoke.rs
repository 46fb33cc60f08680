mod common;

use common::{account, batch, file, payment};
use remessalib::{
    cnab240::{
        base::{BankEncoder, Line},
        itau::Itau,
    },
    encode, encoder_for,
    model::{
        batch::{Batch, MAX_PAYMENTS},
        file::File,
        payment::Payment,
    },
    validation::Violation,
    RemessaError, Result,
};
use rust_decimal::Decimal;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Only the mandatory methods: every hook keeps its FEBRABAN default.
struct Febraban;

impl BankEncoder for Febraban {
    fn bank_code(&self) -> &'static str {
        "341"
    }

    fn bank_name(&self) -> &'static str {
        "FEBRABAN DEFAULTS"
    }
}

struct BrokenDocumentBlock;

impl BankEncoder for BrokenDocumentBlock {
    fn bank_code(&self) -> &'static str {
        "341"
    }

    fn bank_name(&self) -> &'static str {
        "BROKEN"
    }

    fn document_number_block(&self, _payment: &Payment) -> Result<String> {
        Ok("123".into())
    }
}

#[derive(Default)]
struct Recorder {
    called: AtomicBool,
}

impl BankEncoder for Recorder {
    fn bank_code(&self) -> &'static str {
        "341"
    }

    fn bank_name(&self) -> &'static str {
        "RECORDER"
    }

    fn file_header(&self, _file: &File) -> Result<Line> {
        self.called.store(true, Ordering::SeqCst);
        Line::assemble("file header", 3, &["341"])
    }
}

#[test]
fn itau_single_payment_layout() {
    let out = encode(&file(vec![batch()]), &Itau).expect("encode");
    let lines = out.lines();
    assert_eq!(lines.len(), 7);
    assert!(lines.iter().all(|l| l.width() == 240));

    let kinds: Vec<String> = lines.iter().map(|l| l.columns(8, 8)).collect();
    assert_eq!(kinds, ["0", "1", "3", "3", "3", "5", "9"]);

    let header = &lines[0];
    assert_eq!(header.columns(1, 3), "341");
    assert_eq!(header.columns(18, 18), "2");
    assert_eq!(header.columns(19, 32), "12345678000199");
    assert_eq!(header.columns(33, 52), " ".repeat(20));
    assert_eq!(header.columns(53, 72), "01234 000000012345 7");
    assert_eq!(header.columns(73, 102), format!("{:<30}", "EMPRESA TESTE LTDA"));
    assert_eq!(header.columns(103, 132), format!("{:<30}", "BANCO ITAU SA"));
    assert_eq!(header.columns(143, 157), "101032016102030");
    assert_eq!(header.columns(158, 171), "00000104000000");
    assert_eq!(header.columns(226, 240), format!("000{}", " ".repeat(12)));

    let batch_header = &lines[1];
    assert_eq!(batch_header.columns(4, 17), "00011R01  030 ");
    assert_eq!(batch_header.columns(34, 53), " ".repeat(20));
    assert_eq!(batch_header.columns(54, 73), "01234 000000012345 7");
    assert_eq!(batch_header.columns(184, 199), "0000000101032016");

    let p = &lines[2];
    assert_eq!(p.columns(9, 14), "00001P");
    assert_eq!(p.columns(18, 23), "01234 ");
    assert_eq!(
        p.columns(24, 57),
        format!("000000012345 710900089378{}{}", "2", " ".repeat(8))
    );
    assert_eq!(p.columns(58, 62), "00000");
    assert_eq!(p.columns(63, 77), "0000089378     ");
    assert_eq!(p.columns(78, 85), "07032016");
    assert_eq!(p.columns(86, 100), "000000000087966");
    assert_eq!(p.columns(107, 118), "01N010320163");
    assert_eq!(p.columns(119, 126), "00000000");
    assert_eq!(p.columns(228, 229), "09");

    let q = &lines[3];
    assert_eq!(q.columns(9, 14), "00002Q");
    assert_eq!(q.columns(18, 33), "1000012345678901");
    assert_eq!(q.columns(34, 73), format!("{:<40}", "JOAO DA SILVA"));
    assert_eq!(q.columns(129, 136), "01310100");
    assert_eq!(q.columns(137, 153), "SAO PAULO      SP");

    let r = &lines[4];
    assert_eq!(r.columns(9, 14), "00003R");
    assert_eq!(r.columns(66, 66), "0");

    let trailer = &lines[5];
    assert_eq!(trailer.columns(18, 23), "000005");
    assert_eq!(trailer.columns(24, 115), "0".repeat(92));

    let file_trailer = &lines[6];
    assert_eq!(file_trailer.columns(4, 8), "99999");
    assert_eq!(file_trailer.columns(18, 29), "000001000007");
}

#[test]
fn numbers_batches_and_records() {
    let second = Batch::new(Arc::new(account()), vec![payment(), payment()]);
    let out = encode(&file(vec![batch(), second]), &Itau).expect("encode");
    let lines = out.lines();
    assert_eq!(lines.len(), 15);

    assert_eq!(lines[6].columns(4, 8), "00021");
    assert_eq!(lines[10].columns(4, 14), "0002300004P");
    assert_eq!(lines[13].columns(4, 8), "00025");
    assert_eq!(lines[13].columns(18, 23), "000008");
    assert_eq!(lines[14].columns(18, 29), "000002000015");
}

#[test]
fn encoding_is_idempotent() {
    let f = file(vec![batch()]);
    let a = encode(&f, &Itau).unwrap();
    let b = encode(&f, &Itau).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_text(), b.to_text());
}

#[test]
fn text_form_is_crlf_terminated() {
    let out = encode(&file(vec![batch()]), &Itau).unwrap();
    let text = out.to_text();
    assert_eq!(text.len(), 7 * 242);
    assert!(text.ends_with("\r\n"));
    assert_eq!(text.split("\r\n").filter(|l| !l.is_empty()).count(), 7);
}

#[test]
fn writes_latin9_bytes() {
    let mut b = batch();
    b.payments[0].payer.name = "JOÃO DA SILVA".into();
    let out = encode(&file(vec![b]), &Itau).unwrap();

    let mut bytes = Vec::new();
    out.write_to(&mut bytes).unwrap();
    assert_eq!(bytes.len(), 7 * 242);
    assert!(bytes.contains(&0xC3));
}

#[test]
fn empty_file_is_rejected_before_encoding() {
    let recorder = Recorder::default();
    let err = encode(&file(Vec::new()), &recorder).unwrap_err();
    match err {
        RemessaError::InvalidGraph(errors) => {
            assert!(errors.on("batches").any(|v| *v == Violation::Empty));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!recorder.called.load(Ordering::SeqCst));
}

#[test]
fn invalid_graph_carries_every_error() {
    let mut first = batch();
    first.payments[0].payer.name = "☃".into();
    let mut second = batch();
    second.payments[0].amount = rust_decimal::Decimal::new(-1, 0);

    let err = encode(&file(vec![first, second]), &Itau).unwrap_err();
    let RemessaError::InvalidGraph(errors) = err else {
        panic!("expected InvalidGraph");
    };
    assert!(errors
        .on("batches[0].payments[0].payer.name")
        .any(|v| *v == Violation::UnsupportedCharacter { ch: '☃' }));
    assert!(errors
        .on("batches[1].payments[0].amount")
        .any(|v| *v == Violation::Negative));
}

fn invalid_graph(err: RemessaError) -> remessalib::validation::ValidationErrors {
    match err {
        RemessaError::InvalidGraph(errors) => errors,
        other => panic!("expected InvalidGraph, got {other}"),
    }
}

#[test]
fn largest_amount_fills_the_column() {
    let mut b = batch();
    b.payments[0].amount = Decimal::new(999_999_999_999_999, 2);
    let out = encode(&file(vec![b]), &Itau).expect("encode");
    assert_eq!(out.lines()[2].columns(86, 100), "9".repeat(15));
}

#[test]
fn amount_over_the_column_is_rejected_before_encoding() {
    let mut b = batch();
    b.payments[0].amount = Decimal::new(1_000_000_000_000_000, 2);
    b.payments[0].interest_per_day = Decimal::new(1_000_000_000_000_000, 2);

    let errors = invalid_graph(encode(&file(vec![b]), &Itau).unwrap_err());
    assert!(errors
        .on("batches[0].payments[0].amount")
        .any(|v| *v == Violation::AmountTooLarge { count: 15 }));
    assert!(errors
        .on("batches[0].payments[0].interest_per_day")
        .any(|v| *v == Violation::AmountTooLarge { count: 15 }));
}

#[test]
fn batch_over_the_record_numbers_is_rejected_before_encoding() {
    let mut b = Batch::new(Arc::new(account()), Vec::new());
    for _ in 0..=MAX_PAYMENTS {
        b.push(payment());
    }

    let errors = invalid_graph(encode(&file(vec![b]), &Itau).unwrap_err());
    assert!(errors
        .on("batches[0].payments")
        .any(|v| *v == Violation::TooMany { count: MAX_PAYMENTS }));
}

#[test]
fn default_account_block_limits_are_validated() {
    let mut acc = account();
    acc.agency = "123456".into();
    acc.account_number = "1234567890123".into();
    let b = Batch::new(Arc::new(acc), vec![payment()]);

    let errors = invalid_graph(encode(&file(vec![b]), &Febraban).unwrap_err());
    assert!(errors
        .on("batches[0].account.agency")
        .any(|v| *v == Violation::LengthMaximum { count: 5 }));
    assert!(errors
        .on("batches[0].account.account_number")
        .any(|v| *v == Violation::LengthMaximum { count: 12 }));
}

#[test]
fn default_trailer_total_must_fit() {
    let mut p = payment();
    p.amount = Decimal::new(999_999_999_999_999, 2);
    let b = Batch::new(Arc::new(account()), vec![p; 101]);
    let f = file(vec![b]);

    assert!(Febraban
        .validate(&f)
        .on("batches[0].total_amount")
        .any(|v| *v == Violation::AmountTooLarge { count: 17 }));
    // Itaú zero-fills the totals
    assert!(Itau.validate(&f).is_empty());
}

#[test]
fn record_count_matches_encoded_lines() {
    let second = Batch::new(Arc::new(account()), vec![payment(), payment()]);
    let f = file(vec![batch(), second]);
    assert_eq!(f.record_count(), 15);
    assert_eq!(encode(&f, &Itau).unwrap().lines().len(), f.record_count());
}

#[test]
fn default_hooks_follow_febraban() {
    let acc = account();
    let mut p = payment();
    p.our_number = "1234567-0".into();

    assert_eq!(Febraban.account_block(&acc).unwrap(), "01234 0000000123457 ");
    assert_eq!(Febraban.agency_block(&acc).unwrap(), "01234 ");
    assert_eq!(
        Febraban.wallet_block(&p, &acc).unwrap(),
        format!("0000000123457 {}9", "0000000000001234567")
    );
    assert_eq!(Febraban.document_number_block(&p).unwrap(), "000000000089378");
    assert_eq!(Febraban.file_header_agreement(&acc).unwrap(), format!("{:<20}", "12345"));

    let block = Febraban.batch_trailer_reserved_block(&batch(), 5).unwrap();
    assert_eq!(block.len(), 217);
    assert_eq!(&block[..23], "00000100000000000087966");
}

#[test]
fn default_layout_encodes_full_width() {
    let out = encode(&file(vec![batch()]), &Febraban).expect("encode");
    assert!(out.lines().iter().all(|l| l.width() == 240));
    // our-number check digit recomputed: modulo 11 of 10900089378
    assert_eq!(out.lines()[2].columns(57, 57), "1");
    assert_eq!(out.lines()[2].columns(58, 62), "11122");
}

#[test]
fn wrong_hook_width_is_fatal() {
    let err = encode(&file(vec![batch()]), &BrokenDocumentBlock).unwrap_err();
    assert!(matches!(
        err,
        RemessaError::LineWidthMismatch {
            record: "document_number_block",
            expected: 15,
            actual: 3
        }
    ));
}

#[test]
fn picks_encoder_by_bank_code() {
    let enc = encoder_for("341").expect("itau");
    assert_eq!(enc.bank_name(), "BANCO ITAU SA");
    assert!(encoder_for("999").is_none());

    let out = encode(&file(vec![batch()]), enc.as_ref()).unwrap();
    assert_eq!(out, encode(&file(vec![batch()]), &Itau).unwrap());
}

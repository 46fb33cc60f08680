use chrono::NaiveDate;
use remessalib::{
    cnab240::itau::Itau,
    encode, encoder_for,
    model::{
        account::Account,
        batch::Batch,
        file::File,
        payment::{Payer, Payment},
    },
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=remessalib=debug to follow the encoder
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let account = Arc::new(Account {
        bank_code: "341".into(),
        agency: "0057".into(),
        agency_check_digit: String::new(),
        account_number: "12345".into(),
        account_check_digit: "7".into(),
        wallet: "109".into(),
        agreement: "12345".into(),
    });

    let payer = Payer {
        name: "JOÃO DA SILVA".into(),
        document: "12345678901".into(),
        address: "RUA DAS FLORES 100".into(),
        neighborhood: "CENTRO".into(),
        zip_code: "01310100".into(),
        city: "SAO PAULO".into(),
        state: "SP".into(),
    };

    let due = NaiveDate::from_ymd_opt(2016, 3, 7).ok_or("bad date")?;
    let mut payment = Payment::new("12345678", "", due, Decimal::new(87966, 2), payer)
        .with_instructions(["NAO RECEBER APOS O VENCIMENTO"]);
    let dac = Itau::our_number_dac(&account, &payment)?;
    payment.our_number = format!("{}/{}-{}", account.wallet, payment.document_number, dac);

    let mut batch = Batch::new(account.clone(), Vec::new());
    batch.push(payment);
    let file = File::new("EMPRESA TESTE LTDA", "12345678000199", 1, [batch]);

    let encoder = encoder_for(&account.bank_code).ok_or("unsupported bank")?;
    let remessa = encode(&file, encoder.as_ref())?;
    remessa.write_to(std::io::stdout().lock())?;
    Ok(())
}

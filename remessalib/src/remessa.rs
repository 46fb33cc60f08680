//! Encoding pipeline: validated graph in, fixed-width records out.

use crate::{
    cnab240::{
        base::{BankEncoder, BatchContext, Line, PaymentContext},
        itau::{self, Itau},
    },
    error::{RemessaError, Result},
    field,
    model::file::File,
};
use std::io::Write;

/// Record terminator of the text form.
pub const LINE_TERMINATOR: &str = "\r\n";

/// A generated remittance file, in record order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remessa {
    lines: Vec<Line>,
}

impl Remessa {
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Every record followed by CRLF.
    pub fn to_text(&self) -> String {
        let mut s = String::with_capacity(self.lines.iter().map(|l| l.as_str().len() + 2).sum());
        for line in &self.lines {
            s.push_str(line.as_str());
            s.push_str(LINE_TERMINATOR);
        }
        s
    }

    /// Writes the text form in ISO-8859-15.
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<()> {
        w.write_all(&field::encode_latin(&self.to_text())?)?;
        Ok(())
    }
}

/// Encoder for a supported bank code.
pub fn encoder_for(bank_code: &str) -> Option<Box<dyn BankEncoder>> {
    match bank_code {
        itau::BANK_CODE => Some(Box::new(Itau)),
        _ => None,
    }
}

/// Validates `file` against `encoder` and renders it. All or nothing: an
/// invalid graph yields `InvalidGraph` with every error, and a formatting
/// failure aborts without partial output.
pub fn encode(file: &File, encoder: &dyn BankEncoder) -> Result<Remessa> {
    let errors = encoder.validate(file);
    if !errors.is_empty() {
        tracing::warn!(
            bank = encoder.bank_code(),
            errors = errors.len(),
            "remessa rejected by validation"
        );
        return Err(RemessaError::InvalidGraph(errors));
    }

    let mut lines = Vec::with_capacity(file.record_count());
    lines.push(encoder.file_header(file)?);

    for (i, batch) in file.batches.iter().enumerate() {
        let batch_number = i as u32 + 1;
        tracing::debug!(batch_number, payments = batch.payments.len(), "encoding batch");

        lines.push(encoder.batch_header(&BatchContext { file, batch_number }, batch)?);
        for (j, payment) in batch.payments.iter().enumerate() {
            let ctx = PaymentContext {
                batch_number,
                sequence: j as u32 + 1,
                account: &batch.account,
            };
            lines.extend(encoder.payment_segments(payment, &ctx)?);
        }
        lines.push(encoder.batch_trailer(batch, batch_number, batch.payments.len())?);
    }

    let total = lines.len() + 1;
    lines.push(encoder.file_trailer(file, file.batches.len(), total)?);

    tracing::info!(
        bank = encoder.bank_code(),
        sequence = file.sequence_number,
        payments = file.payment_count(),
        lines = lines.len(),
        "remessa encoded"
    );
    Ok(Remessa { lines })
}

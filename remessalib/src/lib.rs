//! remessalib — encoder and validator for CNAB240 boleto remittance files
//! ("remessa") sent to Brazilian banks.
//!
//! Build a [`model::file::File`], pick the bank's encoder and call
//! [`remessa::encode`]; the graph is validated as a whole before any record is
//! rendered.

pub mod check_digit;
pub mod error;
pub mod field;
pub mod remessa;
pub mod traits;
pub mod validation;

pub mod model {
    pub mod account;
    pub mod batch;
    pub mod file;
    pub mod payment;
}

pub mod cnab240 {
    pub mod base;
    pub mod itau;
}

pub use error::{RemessaError, Result};
pub use remessa::{encode, encoder_for, Remessa};

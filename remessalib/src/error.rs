//! Single error type of the public API.

use crate::validation::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemessaError {
    #[error("value {value:?} does not fit in {width} columns")]
    FieldTooLong { value: String, width: usize },

    #[error("value {value:?} is not numeric")]
    NotNumeric { value: String },

    #[error("check digit weight range {start}..={end} is empty")]
    EmptyWeights { start: u32, end: u32 },

    #[error("character {ch:?} in {value:?} is not representable in ISO-8859-15")]
    UnsupportedCharacter { ch: char, value: String },

    #[error("{record} rendered {actual} columns, layout requires {expected}")]
    LineWidthMismatch {
        record: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("refusing to encode an invalid graph: {0}")]
    InvalidGraph(ValidationErrors),

    #[error("attribute error: {0}")]
    Attributes(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RemessaError>;

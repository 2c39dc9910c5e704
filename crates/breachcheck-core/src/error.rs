//! Validation errors for breach records, hashes and prefix entries

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid digest: expected {expected} hex characters, got {value:?}")]
    InvalidDigest { value: String, expected: usize },

    #[error("Invalid prefix format: {0:?} (expected 5 uppercase hex characters)")]
    InvalidPrefix(String),

    #[error("Invalid suffix at position {index}: {value:?} (expected uppercase hex)")]
    InvalidSuffix { index: usize, value: String },

    #[error("Suffix/count length mismatch: {suffixes} suffixes, {counts} counts")]
    LengthMismatch { suffixes: usize, counts: usize },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid date in {field}: {value:?} (expected YYYY-MM or YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("Membership entry must reference at least one breach")]
    EmptyBreachIds,

    #[error("{kind} id {found} is out of sequence (next id is {expected})")]
    OutOfSequence {
        kind: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("Unknown data type: {0:?} (expected \"email\" or \"phone\")")]
    UnknownDataType(String),
}

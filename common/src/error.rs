use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors of the loading layer
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("can't open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not enough entries on line {line} of {what}")]
    BadLine { what: &'static str, line: usize },

    #[error("not enough {what}: expected {expected}, found {found}")]
    TooFew {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("point/normal counts disagree ({points} points, {normals} normals)")]
    CountMismatch { points: usize, normals: usize },
}

/// Why a line of the measurement file could not be parsed
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("expected 8 fields, found {0}")]
    FieldCount(usize),

    #[error("invalid {field}: {value:?}")]
    BadField { field: &'static str, value: String },

    #[error("average time is not finite")]
    NonFinite,
}

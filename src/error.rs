use std::collections::BTreeSet;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Key mismatch: expected {expected:?}, found {found:?}")]
    KeyMismatch {
        expected: BTreeSet<String>,
        found: BTreeSet<String>,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

impl MatchError {
    pub fn key_mismatch<'a, E, F>(expected: E, found: F) -> Self
    where
        E: IntoIterator<Item = &'a String>,
        F: IntoIterator<Item = &'a String>,
    {
        Self::KeyMismatch {
            expected: expected.into_iter().cloned().collect(),
            found: found.into_iter().cloned().collect(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;

// Helper conversions
impl From<csv::Error> for MatchError {
    fn from(e: csv::Error) -> Self {
        if e.is_io_error() {
            match e.into_kind() {
                csv::ErrorKind::Io(io) => Self::Io(io),
                other => Self::Csv(format!("{other:?}")),
            }
        } else {
            Self::Csv(e.to_string())
        }
    }
}
impl From<config::ConfigError> for MatchError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}

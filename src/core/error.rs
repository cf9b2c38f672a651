//! Error types for voxtree
//!
//! Only the outer surfaces (configuration, data readers, the CLI) report
//! errors as values. Tree operations never fail: broken internal invariants
//! panic, inputs are aligned rather than rejected, and a missed query is an
//! ordinary `None`/`false`.

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Wrong size of dataset: expected {expected} bytes, found {actual}")]
    DatasetSize { expected: u64, actual: u64 },

    #[error("Dataset error: {0}")]
    Dataset(String),
}

//! Error types for the cleaning pipeline and the derived metrics.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a cleaning run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The raw input file does not exist.
    #[error("source file not found: {}", path.display())]
    SourceMissing { path: PathBuf },

    /// A row (or the header) does not have the fixed column count of its source.
    #[error("{source_name}: expected {expected} columns, found {found} at line {line}")]
    SchemaMismatch {
        source_name: &'static str,
        expected: usize,
        found: usize,
        line: u64,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Returned by a derived metric whose value cannot be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    #[error("metric undefined: {0}")]
    Undefined(&'static str),
}

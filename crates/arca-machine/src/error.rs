use thiserror::Error;

use arca_file::FileError;

/// Errors from machine operations.
#[derive(Debug, Error)]
pub enum MachineError {
    /// A log-domain operation produced a NaN intermediate. The offending
    /// operands ride along as error context.
    #[error("{op}: NaN intermediate (log_a = {log_a}, log_b = {log_b})")]
    NotANumber {
        op: &'static str,
        log_a: f64,
        log_b: f64,
    },

    /// `log_sub` requires `log_a >= log_b`.
    #[error("log_sub: log_a ({log_a}) must be greater than or equal to log_b ({log_b})")]
    LogSubOrder { log_a: f64, log_b: f64 },

    /// A parameter vector's length disagrees with the machine's input
    /// dimensionality.
    #[error("dimension mismatch for {name}: expected {expected}, got {actual}")]
    DimensionMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Persistence failure from the file facade.
    #[error(transparent)]
    File(#[from] FileError),
}

/// Result alias for machine operations.
pub type MachineResult<T> = Result<T, MachineError>;

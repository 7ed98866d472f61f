use thiserror::Error;

use arca_file::FileError;
use arca_machine::MachineError;

/// Errors from trainer operations.
#[derive(Debug, Error)]
pub enum TrainerError {
    /// Training was invoked on an empty sample set.
    #[error("empty dataset: at least one sample is required")]
    EmptyDataset,

    /// Training was invoked on a machine with no means.
    #[error("machine has no means: at least one cluster is required")]
    NoMeans,

    /// A sample's dimensionality disagrees with the machine's.
    #[error("dimension mismatch for sample {index}: expected {expected}, got {actual}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// Fewer samples than clusters to seed.
    #[error("too few samples: need at least {needed}, got {got}")]
    TooFewSamples { needed: usize, got: usize },

    /// Failure from an underlying machine operation.
    #[error(transparent)]
    Machine(#[from] MachineError),

    /// Persistence failure from the file facade.
    #[error(transparent)]
    File(#[from] FileError),
}

/// Result alias for trainer operations.
pub type TrainerResult<T> = Result<T, TrainerError>;

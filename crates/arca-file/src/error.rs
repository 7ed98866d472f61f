use thiserror::Error;

use arca_container::ContainerError;
use arca_types::TypeError;

/// Errors surfaced by the file facade.
#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Result alias for facade operations.
pub type FileResult<T> = Result<T, FileError>;

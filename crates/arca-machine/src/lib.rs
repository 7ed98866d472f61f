//! Statistical machines for arca.
//!
//! - [`log`] — log-domain arithmetic (`log_add`, `log_sub`) and constants
//! - [`Gaussian`] — diagonal-covariance Gaussian density with variance
//!   flooring, serialized through the [`arca_file::ArcaFile`] facade
//!
//! The persistence contract is the primary external surface of the storage
//! core: a machine saves its parameter vectors as named entries and loads
//! them back by name, failing hard on any missing or ill-typed entry.

pub mod error;
pub mod gaussian;
pub mod log;

pub use error::{MachineError, MachineResult};
pub use gaussian::Gaussian;
pub use log::{log_add, log_sub, LOG_2PI, LOG_ONE, LOG_ZERO, MINUS_LOG_THRESHOLD};

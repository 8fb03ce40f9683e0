//! Errors surfaced by the command line front end.

use thiserror::Error;

use super::*;

/// Convenience alias for results produced by CLI commands.
pub type Result<T> = std::result::Result<T, EvidencedError>;

/// Failures of a CLI invocation.
#[derive(Error, Debug)]
pub enum EvidencedError {
  /// Any failure reported by the library
  #[error(transparent)]
  Evidence(#[from] EvidenceError),

  /// Terminal or filesystem failure outside the library
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// Acquisition finished but left documents without a file
  #[error("{failed} of {processed} documents failed")]
  Incomplete {
    /// Documents attempted
    processed: usize,
    /// Documents that ended in an error
    failed:    usize,
  },
}

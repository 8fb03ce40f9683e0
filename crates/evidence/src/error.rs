//! Error types for the evidence library.
//!
//! Every failure that concerns a single document names the offending identifier or URL, and
//! where it matters, the [`Stage`] of acquisition it happened in. The library itself never
//! retries or swallows errors; batch drivers such as
//! [`DocumentHandler::process_all`](crate::DocumentHandler::process_all) decide what to log and
//! what to skip.
//!
//! # Examples
//!
//! ```
//! use evidence::{error::EvidenceError, prelude::*};
//!
//! let registry = RetrieverRegistry::default();
//! match registry.resolve("nowhere") {
//!   Err(EvidenceError::UnknownSource(source)) => assert_eq!(source, "nowhere"),
//!   _ => unreachable!(),
//! }
//! ```

use thiserror::Error;

/// Error type alias used for the [`evidence`](crate) crate.
pub type Result<T> = core::result::Result<T, EvidenceError>;

/// The point in an acquisition at which a filesystem failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  /// Searching or copying from a local directory.
  LocalSearch,
  /// Writing a downloaded document.
  RemoteFetch,
  /// Reading a file to fingerprint it.
  Hashing,
  /// Walking roots for the local store, or persisting it.
  Index,
}

impl std::fmt::Display for Stage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Stage::LocalSearch => write!(f, "local search"),
      Stage::RemoteFetch => write!(f, "remote fetch"),
      Stage::Hashing => write!(f, "hashing"),
      Stage::Index => write!(f, "indexing"),
    }
  }
}

/// Errors that can occur while acquiring and caching documents.
#[derive(Error, Debug)]
pub enum EvidenceError {
  /// The URL does not match the pattern its source expects.
  ///
  /// Caller error, never worth retrying.
  #[error("Invalid {tag} URL format: {url}")]
  InvalidUrlFormat {
    /// Source tag whose pattern was applied
    tag: String,
    /// The offending URL
    url: String,
  },

  /// No retriever is registered under this source tag.
  #[error("No retriever registered for source \"{0}\"")]
  UnknownSource(String),

  /// Remote metadata could not be fetched or parsed.
  #[error("Failed to fetch {tag} metadata for {id}: {reason}")]
  MetadataFetch {
    /// Source tag
    tag:    String,
    /// Document identifier
    id:     String,
    /// What went wrong
    reason: String,
  },

  /// A document download answered with something other than 200.
  #[error("Failed to download document from {url}: HTTP {status}")]
  RemoteFetch {
    /// Requested URL
    url:    String,
    /// Status code returned by the server
    status: u16,
  },

  /// The request never produced a response (DNS, TLS, timeout, reset, ...).
  ///
  /// Unlike [`EvidenceError::RemoteFetch`] this class is usually transient.
  #[error("Transport failure requesting {url}: {source}")]
  Transport {
    /// Requested URL
    url:    String,
    /// Underlying client error
    #[source]
    source: reqwest::Error,
  },

  /// The requested digest algorithm is not supported.
  #[error("Unsupported hash algorithm \"{0}\", expected one of: md5, sha256")]
  UnsupportedAlgorithm(String),

  /// The source explicitly disallows this operation. Permanent, do not retry.
  #[error("{tag} refuses {operation}: {reason}")]
  PolicyRefusal {
    /// Source tag
    tag:       String,
    /// The refused operation (e.g. "metadata retrieval")
    operation: &'static str,
    /// Why the source refuses
    reason:    String,
  },

  /// A freshly computed hash differs from the one previously recorded.
  #[error("Hash mismatch for {id}: expected {expected}, got {actual}")]
  IntegrityMismatch {
    /// Document identifier
    id:       String,
    /// Previously recorded digest
    expected: String,
    /// Newly computed digest
    actual:   String,
  },

  /// The acquisition was cancelled before it completed.
  #[error("Acquisition of {id} was cancelled")]
  Cancelled {
    /// Document identifier
    id: String,
  },

  /// A filesystem operation on a specific path failed during a known stage.
  #[error("I/O failure during {stage} at {}: {source}", path.display())]
  Filesystem {
    /// Path being read or written
    path:   std::path::PathBuf,
    /// Acquisition stage
    stage:  Stage,
    /// Underlying I/O error
    #[source]
    source: std::io::Error,
  },

  /// A file system operation failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// JSON (de)serialization failed.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// A TOML document could not be parsed.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// A configuration could not be written as TOML.
  #[error(transparent)]
  TomlSer(#[from] toml::ser::Error),

  /// A configured pattern is not a valid regular expression.
  #[error(transparent)]
  Regex(#[from] regex::Error),

  /// Invalid or missing configuration.
  #[error("{0}")]
  Config(String),
}

impl EvidenceError {
  /// Whether an external caller may reasonably retry the failed operation.
  pub fn is_retryable(&self) -> bool {
    matches!(
      self,
      EvidenceError::Transport { .. }
        | EvidenceError::RemoteFetch { .. }
        | EvidenceError::MetadataFetch { .. }
    )
  }

  /// Attach a path and stage to an I/O error.
  pub(crate) fn stage(
    path: impl Into<std::path::PathBuf>,
    stage: Stage,
  ) -> impl FnOnce(std::io::Error) -> Self {
    let path = path.into();
    move |source| EvidenceError::Filesystem { path, stage, source }
  }
}

//! Error types for `society-core`.

use thiserror::Error;

/// The caller-facing classification of an [`Error`]. Callers branch on this,
/// not on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Unauthenticated,
  InvalidArgument,
  NotFound,
  Internal,
}

impl ErrorKind {
  pub fn as_str(self) -> &'static str {
    match self {
      ErrorKind::Unauthenticated => "unauthenticated",
      ErrorKind::InvalidArgument => "invalid_argument",
      ErrorKind::NotFound => "not_found",
      ErrorKind::Internal => "internal",
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("uuid not found in context")]
  Unauthenticated,

  /// Bad input or insufficient rights; the caller can fix it.
  #[error("{0}")]
  InvalidArgument(String),

  #[error("{0}")]
  NotFound(String),

  /// A repository call failed. `op` names the call.
  #[error("{op}: {source}")]
  Store {
    op:     &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl Error {
  pub fn invalid(msg: impl Into<String>) -> Self { Error::InvalidArgument(msg.into()) }

  pub fn not_found(msg: impl Into<String>) -> Self { Error::NotFound(msg.into()) }

  /// Wrap a repository error, tagging it with the failing operation.
  pub fn store<E>(op: &'static str, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store { op, source: Box::new(source) }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Unauthenticated => ErrorKind::Unauthenticated,
      Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
      Error::NotFound(_) => ErrorKind::NotFound,
      Error::Store { .. } => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

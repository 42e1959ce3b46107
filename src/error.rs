use anyhow::Error as AnyhowError;
use std::{error::Error, fmt};

/// Convenience type for a result that may contain a `RalError`.
pub type RalResult<T> = std::result::Result<T, RalError>;

/// Broad category of a `RalError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// An option name or value the exporter does not recognize. Raised before any traversal.
  InvalidConfiguration,

  /// Two distinct type declarations resolved to the same class name.
  NamespaceCollision,

  /// A software access policy or side effect outside the known domain.
  UnrecognizedAccessPolicy,

  /// The register model could not be loaded or is not usable for export.
  Model,

  /// Reading an input or writing the output failed.
  Io,
}

/// Error struct for all errors thrown by this crate or the crates on which it depends.
#[derive(Debug)]
pub struct RalError {
  /// What went wrong, broadly.
  pub kind: ErrorKind,

  /// Description of the error that occurred.
  pub details: String,
}
impl RalError {
  pub(crate) fn new(kind: ErrorKind, msg: &str) -> RalError {
    Self {
      kind,
      details: msg.to_string(),
    }
  }

  pub(crate) fn config(msg: &str) -> RalError {
    Self::new(ErrorKind::InvalidConfiguration, msg)
  }

  pub(crate) fn model(msg: &str) -> RalError {
    Self::new(ErrorKind::Model, msg)
  }
}
impl fmt::Display for RalError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.details)
  }
}
impl Error for RalError {}
impl From<std::io::Error> for RalError {
  fn from(err: std::io::Error) -> Self {
    RalError::new(ErrorKind::Io, &format!("std::io::Error {}", &err.to_string()))
  }
}
impl From<fmt::Error> for RalError {
  fn from(err: fmt::Error) -> Self {
    RalError::new(ErrorKind::Io, &format!("fmt::Error {}", err))
  }
}
impl From<AnyhowError> for RalError {
  fn from(err: AnyhowError) -> Self {
    RalError::model(&format!("anyhow::Error {:?}", err))
  }
}
impl From<regex::Error> for RalError {
  fn from(err: regex::Error) -> Self {
    RalError::config(&format!("regex::Error {:?}", err))
  }
}
impl From<xmltree::ParseError> for RalError {
  fn from(err: xmltree::ParseError) -> Self {
    RalError::model(&format!("xmltree::ParseError {:?}", err))
  }
}
impl From<toml::de::Error> for RalError {
  fn from(err: toml::de::Error) -> Self {
    RalError::config(&format!("toml::de::Error {}", err))
  }
}

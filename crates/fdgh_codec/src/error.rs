//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// The XBIN container around the payload is invalid
    #[error("malformed xbin container: {0}")]
    MalformedContainer(#[from] fdgh_xbin::error::Error),

    /// No candidate byte order produced a self-consistent parse
    #[error("unable to determine byte order ({0})")]
    UnknownEndianness(String),

    /// The FDGH payload is structurally inconsistent
    #[error("malformed fdgh data at payload offset {offset:#x}: {reason}")]
    MalformedBinary { offset: usize, reason: String },

    /// A read went past the end of the buffer
    #[error("read of {wanted} bytes at {offset:#x} exceeds buffer of {size} bytes")]
    OutOfBounds {
        offset: usize,
        wanted: usize,
        size: usize,
    },

    /// The document cannot be encoded
    #[error("invalid document at {path}: {reason}")]
    InvalidDocument { path: String, reason: String },

    /// The XML text could not be read or written
    #[error("xml error: {0}")]
    Xml(String),
}

impl Error {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Error::MalformedBinary {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Bounds failures of the primitive reader become [`Error::MalformedBinary`] once they
    /// surface from payload decoding.
    pub(crate) fn into_malformed(self) -> Self {
        match self {
            Error::OutOfBounds { offset, .. } => {
                let reason = self.to_string();
                Error::MalformedBinary { offset, reason }
            }
            other => other,
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;

//! Error handling for LayerSpeed
//!
//! Provides the error types shared by the workspace crates:
//! - Stream errors (chunked instruction stream handling)
//! - Processor errors (a chunk processor refused to run)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Chunked stream error type
///
/// Represents problems with the shape of an instruction stream handed to
/// the pipeline, as opposed to problems with its content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The stream contained no chunks at all
    #[error("Stream is empty")]
    Empty,

    /// The stream has no layer-boundary marker anywhere
    #[error("No layer markers found in stream ({chunks} chunks scanned)")]
    NoLayerMarkers {
        /// The number of chunks that were scanned.
        chunks: usize,
    },
}

/// Main error type for LayerSpeed
///
/// A unified error type used by the public APIs of the core crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Stream error
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// A processor in the pipeline failed
    #[error("Processor '{name}' error: {message}")]
    Processor {
        /// The name of the failing processor.
        name: String,
        /// The failure message.
        message: String,
    },

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Create a processor error
    pub fn processor(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Processor {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Check if this is a stream error
    pub fn is_stream_error(&self) -> bool {
        matches!(self, Error::Stream(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

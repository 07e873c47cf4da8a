//! Error types for the ShapeWire engine.

use shapewire_model::{ModelError, TranscodeError};
use shapewire_protocol::ProtocolError;
use shapewire_xml::XmlError;

/// Engine error type.
#[derive(Debug, thiserror::Error)]
pub enum ShapeWireError {
    /// The model document could not be loaded.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A value did not match its shape.
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    /// XML decoding or encoding failed.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// A protocol adapter failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The operation is not declared in the model.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// The operation declares no output shape.
    #[error("operation {0} has no output shape")]
    NoOutput(String),

    /// Reading a model file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
}

impl ShapeWireError {
    /// The transcoding error underneath, if any.
    #[must_use]
    pub fn as_transcode(&self) -> Option<&TranscodeError> {
        match self {
            Self::Transcode(e) => Some(e),
            Self::Xml(e) => e.as_transcode(),
            Self::Protocol(e) => e.as_transcode(),
            _ => None,
        }
    }
}

/// Convenience result type for engine operations.
pub type ShapeWireResult<T> = Result<T, ShapeWireError>;

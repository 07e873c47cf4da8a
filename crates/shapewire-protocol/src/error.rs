//! Error types for the protocol adapters.

use std::fmt;

use shapewire_model::{Protocol, TranscodeError};
use shapewire_xml::XmlError;

/// An error reported by the remote service in a non-success response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status of the response.
    pub status: http::StatusCode,
    /// Service error code (`Throttling`, `ResourceNotFoundException`).
    pub code: String,
    /// Human-readable message, empty when the body carried none.
    pub message: String,
    /// Request id, when the response carried one.
    pub request_id: Option<String>,
}

impl ApiError {
    /// An error with only a status, used when the body is empty or unreadable.
    #[must_use]
    pub fn from_status(status: http::StatusCode) -> Self {
        Self {
            status,
            code: status
                .canonical_reason()
                .unwrap_or("UnknownError")
                .replace(' ', ""),
            message: String::new(),
            request_id: None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.status.as_u16())?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Errors raised while building requests or decoding responses.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The operation is not declared in the shape set.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// The shape set does not declare a protocol.
    #[error("service model declares no protocol")]
    MissingProtocol,

    /// Metadata required by the protocol is absent.
    #[error("{protocol:?} requires service metadata {field}")]
    MissingMetadata {
        /// Protocol being used.
        protocol: Protocol,
        /// Missing metadata field.
        field: &'static str,
    },

    /// A URI template placeholder had no matching input member.
    #[error("no value for URI label {0}")]
    MissingUriLabel(String),

    /// A header value could not be represented.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The service answered with an error response.
    #[error("service error: {0}")]
    Api(ApiError),

    /// Shape-driven transcoding failed.
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    /// XML decoding or encoding failed.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// JSON was malformed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An HTTP message could not be assembled.
    #[error("invalid HTTP message: {0}")]
    Http(#[from] http::Error),
}

impl ProtocolError {
    /// The transcoding error underneath, if any.
    #[must_use]
    pub fn as_transcode(&self) -> Option<&TranscodeError> {
        match self {
            Self::Transcode(e) => Some(e),
            Self::Xml(e) => e.as_transcode(),
            _ => None,
        }
    }
}

/// Convenience result type for the protocol adapters.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

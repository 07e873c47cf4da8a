//! Error types for shape models and transcoding.

use crate::shape::{ShapeType, TimestampFormat};

/// Errors raised while loading or validating a shape model.
///
/// These are construction-time problems: once a [`ShapeSet`](crate::ShapeSet)
/// is built, every reference in it resolves.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The model document is not valid JSON for the expected layout.
    #[error("invalid model document: {0}")]
    Json(#[from] serde_json::Error),

    /// A member references a shape that does not exist.
    #[error("shape {shape} references unknown shape {target}")]
    UnknownTarget {
        /// Referencing shape.
        shape: String,
        /// Missing target.
        target: String,
    },

    /// A trait names a member that the structure does not declare.
    #[error("shape {shape} names unknown member {member}")]
    UnknownMember {
        /// Structure shape.
        shape: String,
        /// Missing member.
        member: String,
    },

    /// The model declares a shape type this engine does not transcode.
    #[error("shape {shape} has unsupported type {type_name}")]
    UnsupportedType {
        /// Offending shape.
        shape: String,
        /// Declared type name.
        type_name: String,
    },

    /// A list or map shape lacks its member/key/value reference.
    #[error("shape {shape} is missing its {part} reference")]
    MissingReference {
        /// Offending shape.
        shape: String,
        /// Which reference (`member`, `key`, `value`).
        part: &'static str,
    },

    /// A trait carries a value outside its vocabulary.
    #[error("shape {shape} has invalid {name} value {value}")]
    InvalidTrait {
        /// Offending shape.
        shape: String,
        /// Trait name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// An operation references a shape that does not exist.
    #[error("operation {operation} references unknown shape {shape}")]
    UnknownOperationShape {
        /// Operation name.
        operation: String,
        /// Missing shape.
        shape: String,
    },
}

/// Category of a [`TranscodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A boolean or number failed to parse.
    InvalidScalar,
    /// A blob was not valid base64.
    InvalidBlob,
    /// A timestamp did not match its format.
    InvalidTimestamp,
    /// A required member was absent.
    MissingRequiredField,
    /// A map entry had differing key and value counts.
    MapArityMismatch,
    /// A shape name did not resolve.
    UnknownShape,
    /// The wire value had the wrong structural type.
    TypeMismatch,
}

/// Errors raised while converting wire data into typed values.
///
/// Each variant carries the wire location at which it occurred (element,
/// attribute, or JSON key) and, where meaningful, the expected shape type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranscodeError {
    /// A boolean, integer, or float failed to parse.
    #[error("invalid {expected} value {value:?} at {location}: {reason}")]
    InvalidScalar {
        /// Wire location.
        location: String,
        /// Expected shape type.
        expected: ShapeType,
        /// Offending text.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// Blob text was not valid base64.
    #[error("invalid base64 blob at {location}: {reason}")]
    InvalidBlob {
        /// Wire location.
        location: String,
        /// Decoder message.
        reason: String,
    },

    /// Timestamp text did not match its format.
    #[error("invalid {format} timestamp {value:?} at {location}: {reason}")]
    InvalidTimestamp {
        /// Wire location.
        location: String,
        /// Expected format.
        format: TimestampFormat,
        /// Offending text.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// A required structure member was absent.
    #[error("missing required member {field} in {location}")]
    MissingRequiredField {
        /// Location of the structure.
        location: String,
        /// Missing member name.
        field: String,
    },

    /// A map entry held differing numbers of keys and values.
    #[error("map entry at {location} has {keys} keys but {values} values")]
    MapArityMismatch {
        /// Location of the entry.
        location: String,
        /// Number of key elements.
        keys: usize,
        /// Number of value elements.
        values: usize,
    },

    /// A shape reference did not resolve.
    #[error("unknown shape {name} at {location}")]
    UnknownShape {
        /// Where the reference was followed.
        location: String,
        /// Unresolved shape name.
        name: String,
    },

    /// The wire value had the wrong structural type.
    #[error("expected {expected} at {location}, found {found}")]
    TypeMismatch {
        /// Wire location.
        location: String,
        /// Expected shape type.
        expected: ShapeType,
        /// Description of what was found.
        found: String,
    },
}

impl TranscodeError {
    /// The error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidScalar { .. } => ErrorKind::InvalidScalar,
            Self::InvalidBlob { .. } => ErrorKind::InvalidBlob,
            Self::InvalidTimestamp { .. } => ErrorKind::InvalidTimestamp,
            Self::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            Self::MapArityMismatch { .. } => ErrorKind::MapArityMismatch,
            Self::UnknownShape { .. } => ErrorKind::UnknownShape,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
        }
    }

    /// The wire location at which the error occurred.
    #[must_use]
    pub fn location(&self) -> &str {
        match self {
            Self::InvalidScalar { location, .. }
            | Self::InvalidBlob { location, .. }
            | Self::InvalidTimestamp { location, .. }
            | Self::MissingRequiredField { location, .. }
            | Self::MapArityMismatch { location, .. }
            | Self::UnknownShape { location, .. }
            | Self::TypeMismatch { location, .. } => location,
        }
    }

    /// The shape type that was expected at the failing location.
    #[must_use]
    pub fn expected(&self) -> Option<ShapeType> {
        match self {
            Self::InvalidScalar { expected, .. } | Self::TypeMismatch { expected, .. } => {
                Some(*expected)
            }
            Self::InvalidBlob { .. } => Some(ShapeType::Blob),
            Self::InvalidTimestamp { .. } => Some(ShapeType::Timestamp),
            Self::MissingRequiredField { .. } => Some(ShapeType::Structure),
            Self::MapArityMismatch { .. } => Some(ShapeType::Map),
            Self::UnknownShape { .. } => None,
        }
    }
}

/// Convenience result type for transcoding.
pub type TranscodeResult<T> = Result<T, TranscodeError>;

//! XML error types.
//!
//! `XmlError` covers tokenizer failures, malformed text, and transcoding
//! failures raised while walking a decoded tree against a shape.

use std::io;

use shapewire_model::TranscodeError;

/// Errors that can occur while decoding, transcoding, or encoding XML.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An I/O error during XML writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// An error from quick-xml attribute handling.
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// An entity or character reference could not be resolved.
    #[error("XML escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// Names or character data were not valid UTF-8.
    #[error("invalid UTF-8 in XML: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Text content could not be decoded.
    #[error("failed to decode XML text: {0}")]
    Encoding(String),

    /// A required XML element was missing.
    #[error("missing required XML element: {0}")]
    MissingElement(String),

    /// The document ended before an element was closed.
    #[error("unexpected end of document inside element {0}")]
    UnclosedElement(String),

    /// The decoded tree did not match its shape.
    #[error(transparent)]
    Transcode(#[from] TranscodeError),
}

impl XmlError {
    /// The transcoding error, if this failure came from shape matching.
    #[must_use]
    pub fn as_transcode(&self) -> Option<&TranscodeError> {
        match self {
            Self::Transcode(e) => Some(e),
            _ => None,
        }
    }
}

//! XML transcoding for `ShapeWire`.
//!
//! Decoding is two passes: [`parse_document`] turns raw bytes into an
//! [`XmlNode`] tree without looking at any shape, then [`StructTranscoder`]
//! walks a [`ShapeModel`](shapewire_model::ShapeModel) against the tree to
//! produce a [`Value`](shapewire_model::Value). [`marshal`] goes the other way.
//!
//! # XML conventions
//!
//! - Lists are wrapped in `member` elements unless flattened
//! - Maps are wrapped in `entry` elements with `key` / `value` children unless
//!   flattened
//! - Blobs are base64, timestamps ISO 8601 unless the shape says otherwise
//! - Structure members may also be read from attributes of the same name

pub mod error;
pub mod marshal;
pub mod tree;
pub mod unmarshal;

pub use error::XmlError;
pub use marshal::{marshal, marshal_element};
pub use tree::{CharDataMode, DecodeOptions, XmlNode, parse_document};
pub use unmarshal::{
    StructTranscoder, UnmarshalOptions, scalar_from_text, unmarshal, unmarshal_tree,
};

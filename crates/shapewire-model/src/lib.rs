//! Shape model and typed values for `ShapeWire`.
//!
//! A service is described by a [`ShapeSet`]: named shapes (scalars, lists,
//! maps, structures) whose members refer to each other by name and carry wire
//! hints such as location names, flattening, and timestamp formats. Every
//! transcoder in the workspace walks a [`ShapeModel`] resolved from the set and
//! produces or consumes a [`Value`].
//!
//! # Key components
//!
//! - [`Shape`], [`MemberRef`], [`ShapeKind`] for describing shapes
//! - [`ShapeSet`] and [`ShapeSetBuilder`] for building a validated registry
//! - [`ShapeSet::from_json`] for loading AWS-style JSON model documents
//! - [`Value`] and [`FromValue`] for the typed value space
//! - [`codec`] for the scalar parse/format rules shared by every wire format

pub mod api;
pub mod codec;
pub mod error;
pub mod from_value;
pub mod set;
pub mod shape;
pub mod value;

pub use error::{ErrorKind, ModelError, TranscodeError, TranscodeResult};
pub use from_value::{FromValue, ValueError, field, required_field, structure_fields};
pub use set::{
    DEFAULT_ENTRY_NAME, DEFAULT_KEY_NAME, DEFAULT_MEMBER_NAME, DEFAULT_VALUE_NAME, Operation,
    Protocol, ServiceMetadata, ShapeModel, ShapeSet, ShapeSetBuilder,
};
pub use shape::{
    ListShape, Location, MapShape, MemberRef, ScalarKind, Shape, ShapeKind, ShapeType,
    StructureShape, TimestampFormat, XmlNamespace,
};
pub use value::{Fields, Value};

//! Conversion from [`Value`] into caller-defined Rust types.
//!
//! Hand-written record types implement [`FromValue`] by pulling their members
//! out of the structure map with [`field`] and [`required_field`].

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::shape::ShapeType;
use crate::value::{Fields, Value};

/// Errors converting a [`Value`] into a Rust type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The value had a different type than the target.
    #[error("expected {expected}, found {found}")]
    WrongType {
        /// Type the target expects.
        expected: ShapeType,
        /// Type of the value.
        found: ShapeType,
    },

    /// An integer did not fit the target type.
    #[error("integer {0} out of range")]
    OutOfRange(i64),

    /// A required member was absent.
    #[error("missing member {0}")]
    MissingField(String),

    /// A member failed to convert.
    #[error("member {field}: {source}")]
    Field {
        /// Member name.
        field: String,
        /// Underlying failure.
        #[source]
        source: Box<ValueError>,
    },
}

/// Build a Rust value from a typed [`Value`].
pub trait FromValue: Sized {
    /// Convert a borrowed value.
    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

/// Convert an optional member of a structure.
pub fn field<T: FromValue>(fields: &Fields, name: &str) -> Result<Option<T>, ValueError> {
    fields
        .get(name)
        .map(|v| {
            T::from_value(v).map_err(|e| ValueError::Field {
                field: name.to_owned(),
                source: Box::new(e),
            })
        })
        .transpose()
}

/// Convert a member that must be present.
pub fn required_field<T: FromValue>(fields: &Fields, name: &str) -> Result<T, ValueError> {
    field(fields, name)?.ok_or_else(|| ValueError::MissingField(name.to_owned()))
}

/// The member map of a structure value.
pub fn structure_fields(value: &Value) -> Result<&Fields, ValueError> {
    value.as_structure().ok_or_else(|| wrong(ShapeType::Structure, value))
}

fn wrong(expected: ShapeType, value: &Value) -> ValueError {
    ValueError::WrongType {
        expected,
        found: value.value_type(),
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value.as_bool().ok_or_else(|| wrong(ShapeType::Boolean, value))
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value.as_int().ok_or_else(|| wrong(ShapeType::Integer, value))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        let i = i64::from_value(value)?;
        i32::try_from(i).map_err(|_| ValueError::OutOfRange(i))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value.as_float().ok_or_else(|| wrong(ShapeType::Float, value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| wrong(ShapeType::String, value))
    }
}

impl FromValue for Bytes {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value.as_blob().cloned().ok_or_else(|| wrong(ShapeType::Blob, value))
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value
            .as_timestamp()
            .copied()
            .ok_or_else(|| wrong(ShapeType::Timestamp, value))
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value
            .as_list()
            .ok_or_else(|| wrong(ShapeType::List, value))?
            .iter()
            .map(T::from_value)
            .collect()
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value
            .as_map()
            .ok_or_else(|| wrong(ShapeType::Map, value))?
            .iter()
            .map(|(k, v)| Ok((k.clone(), T::from_value(v)?)))
            .collect()
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value
            .as_map()
            .ok_or_else(|| wrong(ShapeType::Map, value))?
            .iter()
            .map(|(k, v)| Ok((k.clone(), T::from_value(v)?)))
            .collect()
    }
}

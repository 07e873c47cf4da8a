//! The typed value space every transcoder produces and consumes.
//!
//! `Value` is a closed tagged union mirroring the shape kinds. Structure members
//! that were not present on the wire are simply absent from the member map,
//! which keeps "not sent" distinct from "sent empty".

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::codec;
use crate::shape::{ScalarKind, ShapeType, TimestampFormat};

/// Members of a structure value, keyed by declared member name.
pub type Fields = BTreeMap<String, Value>;

/// A typed value conforming to some shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Float scalar.
    Float(f64),
    /// String scalar.
    String(String),
    /// Blob scalar.
    Blob(Bytes),
    /// Timestamp scalar.
    Timestamp(DateTime<Utc>),
    /// List of values.
    List(Vec<Value>),
    /// String-keyed map of values.
    Map(BTreeMap<String, Value>),
    /// Structure; absent members have no entry.
    Structure(Fields),
}

impl Value {
    /// The zero value of a scalar kind.
    #[must_use]
    pub fn zero(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Boolean => Self::Bool(false),
            ScalarKind::Integer => Self::Int(0),
            ScalarKind::Float => Self::Float(0.0),
            ScalarKind::String => Self::String(String::new()),
            ScalarKind::Blob => Self::Blob(Bytes::new()),
            ScalarKind::Timestamp => Self::Timestamp(unix_epoch()),
        }
    }

    /// An empty structure.
    #[must_use]
    pub fn structure() -> Self {
        Self::Structure(Fields::new())
    }

    /// Build a structure from `(member, value)` pairs.
    #[must_use]
    pub fn structure_from<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Structure(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a list of strings.
    #[must_use]
    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(|s| Self::String(s.into())).collect())
    }

    /// The coarse type of this value.
    #[must_use]
    pub fn value_type(&self) -> ShapeType {
        match self {
            Self::Bool(_) => ShapeType::Boolean,
            Self::Int(_) => ShapeType::Integer,
            Self::Float(_) => ShapeType::Float,
            Self::String(_) => ShapeType::String,
            Self::Blob(_) => ShapeType::Blob,
            Self::Timestamp(_) => ShapeType::Timestamp,
            Self::List(_) => ShapeType::List,
            Self::Map(_) => ShapeType::Map,
            Self::Structure(_) => ShapeType::Structure,
        }
    }

    /// Returns the string if this is a `String` variant.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Int` variant.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float if this is a `Float` variant.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `Bool` variant.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the bytes if this is a `Blob` variant.
    #[must_use]
    pub fn as_blob(&self) -> Option<&Bytes> {
        match self {
            Self::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the timestamp if this is a `Timestamp` variant.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the items if this is a `List` variant.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the entries if this is a `Map` variant.
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the members if this is a `Structure` variant.
    #[must_use]
    pub fn as_structure(&self) -> Option<&Fields> {
        match self {
            Self::Structure(f) => Some(f),
            _ => None,
        }
    }

    /// Look up a structure member.
    #[must_use]
    pub fn get(&self, member: &str) -> Option<&Value> {
        self.as_structure().and_then(|f| f.get(member))
    }

    /// Follow a `/`-separated path of structure members, map keys, and list
    /// indices (`List/0/Foo`).
    #[must_use]
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |current, segment| match current {
                Self::Structure(f) | Self::Map(f) => f.get(segment),
                Self::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }

    /// Render a scalar as wire text; `None` for aggregates.
    #[must_use]
    pub fn to_text(&self, timestamp_format: TimestampFormat) -> Option<String> {
        match self {
            Self::Bool(b) => Some(if *b { "true" } else { "false" }.to_owned()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(codec::format_float(*f)),
            Self::String(s) => Some(s.clone()),
            Self::Blob(b) => Some(codec::encode_blob(b)),
            Self::Timestamp(t) => Some(codec::format_timestamp(t, timestamp_format)),
            Self::List(_) | Self::Map(_) | Self::Structure(_) => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Self::Blob(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Timestamp(t)
    }
}

/// JSON rendering used for display and debugging: blobs as base64, timestamps
/// as ISO 8601, structures and maps as objects.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Blob(b) => serializer.serialize_str(&codec::encode_blob(b)),
            Self::Timestamp(t) => {
                serializer.serialize_str(&codec::format_timestamp(t, TimestampFormat::Iso8601))
            }
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) | Self::Structure(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

fn unix_epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).single().unwrap_or_default()
}

//! Shape-driven transcoding between JSON documents and [`Value`]s.
//!
//! Members are keyed by their wire name. Blobs travel as base64 strings and
//! timestamps as epoch seconds unless the shape declares another format. JSON
//! `null` is treated as absent, and object keys the shape does not declare are
//! ignored.

use std::collections::BTreeMap;

use serde_json::{Map as JsonMap, Number, Value as Json};
use shapewire_model::{
    Fields, Location, ScalarKind, ShapeKind, ShapeModel, ShapeSet, TimestampFormat,
    TranscodeError, TranscodeResult, Value, codec,
};
use shapewire_xml::UnmarshalOptions;

use crate::error::ProtocolResult;

/// Walks a [`ShapeModel`] against JSON values.
#[derive(Debug, Clone, Copy)]
pub struct JsonTranscoder<'a> {
    set: &'a ShapeSet,
    options: UnmarshalOptions,
}

impl<'a> JsonTranscoder<'a> {
    /// A transcoder resolving member shapes from `set`.
    #[must_use]
    pub fn new(set: &'a ShapeSet, options: UnmarshalOptions) -> Self {
        Self { set, options }
    }

    /// Decode `json` against `model`; `None` for `null`.
    pub fn decode(&self, json: &Json, model: &ShapeModel<'a>) -> TranscodeResult<Option<Value>> {
        if json.is_null() {
            return Ok(None);
        }
        let value = match model.kind() {
            ShapeKind::Structure(_) => self.decode_structure(json, model)?,
            ShapeKind::List(_) => {
                let Json::Array(items) = json else {
                    return Err(model.mismatch(json_type(json)));
                };
                let item_model = self.set.list_item(model)?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.extend(self.decode(item, &item_model)?);
                }
                Value::List(out)
            }
            ShapeKind::Map(_) => {
                let Json::Object(entries) = json else {
                    return Err(model.mismatch(json_type(json)));
                };
                let (_, value_model) = self.set.map_entry(model)?;
                let mut out = BTreeMap::new();
                for (key, item) in entries {
                    if let Some(v) = self.decode(item, &value_model)? {
                        out.insert(key.clone(), v);
                    }
                }
                Value::Map(out)
            }
            ShapeKind::Scalar(kind) => decode_scalar(json, model, *kind)?,
        };
        Ok(Some(value))
    }

    fn decode_structure(&self, json: &Json, model: &ShapeModel<'a>) -> TranscodeResult<Value> {
        let Json::Object(object) = json else {
            return Err(model.mismatch(json_type(json)));
        };

        let mut fields = Fields::new();
        for (name, member) in model.members() {
            if member.location != Location::Body {
                continue;
            }
            let member_model = self.set.resolve(name, member)?;
            let Some(raw) = object.get(member_model.wire_name()) else {
                continue;
            };
            if let Some(v) = self.decode(raw, &member_model)? {
                fields.insert(name.to_owned(), v);
            }
        }

        if self.options.enforce_required {
            if let Some(missing) = model.required().iter().find(|r| !fields.contains_key(*r)) {
                return Err(TranscodeError::MissingRequiredField {
                    location: model.wire_name().to_owned(),
                    field: missing.clone(),
                });
            }
        }
        Ok(Value::Structure(fields))
    }

    /// Encode `value` against `model`.
    ///
    /// Structure fields that are not body members of the shape are left out.
    pub fn encode(&self, value: &Value, model: &ShapeModel<'a>) -> TranscodeResult<Json> {
        match (model.kind(), value) {
            (ShapeKind::Structure(_), Value::Structure(fields)) => {
                let mut object = JsonMap::new();
                for (name, member) in model.members() {
                    if member.location != Location::Body {
                        continue;
                    }
                    let Some(field) = fields.get(name) else {
                        continue;
                    };
                    let member_model = self.set.resolve(name, member)?;
                    object.insert(
                        member_model.wire_name().to_owned(),
                        self.encode(field, &member_model)?,
                    );
                }
                Ok(Json::Object(object))
            }
            (ShapeKind::List(_), Value::List(items)) => {
                let item_model = self.set.list_item(model)?;
                items
                    .iter()
                    .map(|item| self.encode(item, &item_model))
                    .collect::<TranscodeResult<Vec<_>>>()
                    .map(Json::Array)
            }
            (ShapeKind::Map(_), Value::Map(entries)) => {
                let (_, value_model) = self.set.map_entry(model)?;
                let mut object = JsonMap::new();
                for (key, item) in entries {
                    object.insert(key.clone(), self.encode(item, &value_model)?);
                }
                Ok(Json::Object(object))
            }
            (ShapeKind::Scalar(kind), _) => encode_scalar(value, model, *kind),
            _ => Err(model.mismatch(value.value_type().to_string())),
        }
    }
}

/// Decode a JSON body against `model`; an empty body is an empty structure.
pub fn decode_json(
    body: &[u8],
    set: &ShapeSet,
    model: &ShapeModel<'_>,
    options: UnmarshalOptions,
) -> ProtocolResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::structure());
    }
    let json: Json = serde_json::from_slice(body)?;
    let decoded = JsonTranscoder::new(set, options).decode(&json, model)?;
    Ok(decoded.unwrap_or_else(Value::structure))
}

/// Encode `value` as a JSON body.
pub fn encode_json(value: &Value, set: &ShapeSet, model: &ShapeModel<'_>) -> ProtocolResult<Vec<u8>> {
    let json = JsonTranscoder::new(set, UnmarshalOptions::default()).encode(value, model)?;
    Ok(serde_json::to_vec(&json)?)
}

fn decode_scalar(json: &Json, model: &ShapeModel<'_>, kind: ScalarKind) -> TranscodeResult<Value> {
    let location = model.wire_name();
    let invalid = |reason: String| TranscodeError::InvalidScalar {
        location: location.to_owned(),
        expected: model.shape_type(),
        value: json.to_string(),
        reason,
    };

    match (kind, json) {
        (ScalarKind::String, Json::String(s)) => Ok(Value::String(s.clone())),
        (ScalarKind::Boolean, Json::Bool(b)) => Ok(Value::Bool(*b)),
        (ScalarKind::Integer, Json::Number(n)) => n
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| invalid("not a 64-bit integer".to_owned())),
        (ScalarKind::Float, Json::Number(n)) => n
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| invalid("not a number".to_owned())),
        (ScalarKind::Float, Json::String(s)) => codec::parse_float(s).map(Value::Float).map_err(invalid),
        (ScalarKind::Blob, Json::String(s)) => codec::decode_blob(s).map(Value::Blob).map_err(|reason| {
            TranscodeError::InvalidBlob {
                location: location.to_owned(),
                reason,
            }
        }),
        (ScalarKind::Timestamp, Json::Number(n)) => {
            timestamp(n.to_string(), TimestampFormat::UnixTimestamp, location)
        }
        (ScalarKind::Timestamp, Json::String(s)) => timestamp(
            s.clone(),
            model.timestamp_format_or(TimestampFormat::UnixTimestamp),
            location,
        ),
        _ => Err(model.mismatch(json_type(json))),
    }
}

fn timestamp(text: String, format: TimestampFormat, location: &str) -> TranscodeResult<Value> {
    codec::parse_timestamp(&text, format)
        .map(Value::Timestamp)
        .map_err(|reason| TranscodeError::InvalidTimestamp {
            location: location.to_owned(),
            format,
            value: text,
            reason,
        })
}

fn encode_scalar(value: &Value, model: &ShapeModel<'_>, kind: ScalarKind) -> TranscodeResult<Json> {
    Ok(match (kind, value) {
        (ScalarKind::String, Value::String(s)) => Json::String(s.clone()),
        (ScalarKind::Boolean, Value::Bool(b)) => Json::Bool(*b),
        (ScalarKind::Integer, Value::Int(i)) => Json::Number((*i).into()),
        (ScalarKind::Float, Value::Float(f)) => {
            Number::from_f64(*f).map_or_else(|| Json::String(codec::format_float(*f)), Json::Number)
        }
        (ScalarKind::Blob, Value::Blob(b)) => Json::String(codec::encode_blob(b)),
        (ScalarKind::Timestamp, Value::Timestamp(t)) => {
            match model.timestamp_format_or(TimestampFormat::UnixTimestamp) {
                TimestampFormat::UnixTimestamp => {
                    let text = codec::format_timestamp(t, TimestampFormat::UnixTimestamp);
                    text.parse::<Number>().map_or(Json::String(text), Json::Number)
                }
                format => Json::String(codec::format_timestamp(t, format)),
            }
        }
        _ => return Err(model.mismatch(value.value_type().to_string())),
    })
}

fn json_type(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

//! Shape-driven coercion of command-line strings.
//!
//! Coercion is lenient: a leaf that does not parse becomes the zero value of
//! its kind and the failure is logged at debug level. Only a shape the set
//! cannot resolve is an error.

use std::collections::BTreeMap;

use bytes::Bytes;
use shapewire_model::codec::{parse_bool, parse_float, parse_int, parse_timestamp};
use shapewire_model::{
    Fields, MemberRef, ScalarKind, ShapeKind, ShapeModel, ShapeSet, TimestampFormat, TranscodeResult, Value,
};
use tracing::debug;

use crate::lexer::{CliValue, lex, map_literal, split_list, strip_brackets};

/// Resolves flat strings into [`Value`]s against a [`ShapeSet`].
#[derive(Debug, Clone, Copy)]
pub struct CliResolver<'a> {
    set: &'a ShapeSet,
}

impl<'a> CliResolver<'a> {
    /// Create a resolver over `set`.
    #[must_use]
    pub fn new(set: &'a ShapeSet) -> Self {
        Self { set }
    }

    /// Resolve `raw` against `model`.
    ///
    /// A scalar target is still split lexically: spaces or bare commas yield a
    /// list of coerced leaves, and a map literal stays one leaf. List targets
    /// have surrounding `[...]` stripped, map and structure targets `{...}`.
    pub fn resolve(&self, raw: &str, model: &ShapeModel<'a>) -> TranscodeResult<Value> {
        match model.kind() {
            ShapeKind::Scalar(kind) => Ok(scalar_leaves(raw, *kind, model)),
            ShapeKind::List(_) => self.list(strip_brackets(raw, '[', ']'), model),
            ShapeKind::Map(_) | ShapeKind::Structure(_) => {
                self.keyed(entries(strip_brackets(raw, '{', '}')), model)
            }
        }
    }

    /// Coerce an already split value against `model`.
    ///
    /// A list against a scalar shape yields a list of coerced leaves; a map
    /// against a scalar shape yields the zero value.
    pub fn coerce(&self, value: CliValue, model: &ShapeModel<'a>) -> TranscodeResult<Value> {
        match (value, model.kind()) {
            (CliValue::Scalar(raw), _) => self.resolve(&raw, model),
            (CliValue::List(items), ShapeKind::Scalar(_)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match self.coerce(item, model)? {
                        Value::List(nested) => out.extend(nested),
                        leaf => out.push(leaf),
                    }
                }
                Ok(Value::List(out))
            }
            (other, ShapeKind::Scalar(kind)) => {
                debug!(shape = model.name(), ?other, "non-scalar argument for scalar shape");
                Ok(Value::zero(*kind))
            }
            (CliValue::List(items), ShapeKind::List(_)) => {
                let item = self.set.list_item(model)?;
                let mut out = Vec::with_capacity(items.len());
                for value in items {
                    match (value, item.kind()) {
                        (CliValue::List(nested), ShapeKind::Scalar(_)) => {
                            for value in nested {
                                out.push(self.coerce(value, &item)?);
                            }
                        }
                        (value, _) => out.push(self.coerce(value, &item)?),
                    }
                }
                Ok(Value::List(out))
            }
            (value @ CliValue::Map(_), ShapeKind::List(_)) => {
                let item = self.set.list_item(model)?;
                Ok(Value::List(vec![self.coerce(value, &item)?]))
            }
            (value, ShapeKind::Map(_) | ShapeKind::Structure(_)) => {
                let pairs = match value {
                    CliValue::Map(pairs) => pairs,
                    CliValue::List(groups) => groups.into_iter().flat_map(cli_entries).collect(),
                    CliValue::Scalar(_) => Vec::new(),
                };
                self.keyed(pairs, model)
            }
        }
    }

    fn list(&self, body: &str, model: &ShapeModel<'a>) -> TranscodeResult<Value> {
        let item = self.set.list_item(model)?;
        let mut out = Vec::new();
        for raw in split_list(body) {
            if raw.is_empty() {
                continue;
            }
            match item.kind() {
                ShapeKind::Scalar(kind) => match lex(raw) {
                    CliValue::List(parts) => {
                        for part in parts {
                            if let CliValue::Scalar(s) = part {
                                out.push(coerce_scalar(&s, *kind, &item));
                            }
                        }
                    }
                    _ => out.push(coerce_scalar(raw, *kind, &item)),
                },
                _ => out.push(self.resolve(raw, &item)?),
            }
        }
        Ok(Value::List(out))
    }

    fn keyed(
        &self,
        pairs: Vec<(String, CliValue)>,
        model: &ShapeModel<'a>,
    ) -> TranscodeResult<Value> {
        match model.kind() {
            ShapeKind::Map(_) => {
                let (_, value_model) = self.set.map_entry(model)?;
                let mut map = BTreeMap::new();
                for (key, raw) in pairs {
                    map.insert(key, self.coerce(raw, &value_model)?);
                }
                Ok(Value::Map(map))
            }
            _ => {
                let mut fields = Fields::new();
                for (key, raw) in pairs {
                    let Some((name, member)) = find_member(model, &key) else {
                        debug!(shape = model.name(), key, "dropping unknown member");
                        continue;
                    };
                    let member_model = self.set.resolve(name, member)?;
                    fields.insert(name.to_owned(), self.coerce(raw, &member_model)?);
                }
                Ok(Value::Structure(fields))
            }
        }
    }
}

/// Resolve `raw` against `model` with a one-off [`CliResolver`].
pub fn resolve(raw: &str, set: &ShapeSet, model: &ShapeModel<'_>) -> TranscodeResult<Value> {
    CliResolver::new(set).resolve(raw, model)
}

fn scalar_leaves(raw: &str, kind: ScalarKind, model: &ShapeModel<'_>) -> Value {
    if raw.contains(' ') {
        let mut out = Vec::new();
        for token in raw.split(' ').filter(|token| !token.is_empty()) {
            match scalar_leaves(token, kind, model) {
                Value::List(nested) => out.extend(nested),
                leaf => out.push(leaf),
            }
        }
        return Value::List(out);
    }
    if raw.contains(',') && !raw.contains('=') {
        return Value::List(
            raw.split(',')
                .map(|item| coerce_scalar(item, kind, model))
                .collect(),
        );
    }
    coerce_scalar(raw, kind, model)
}

/// Coerce a leaf string to `kind`, falling back to the zero value.
#[must_use]
pub fn coerce_scalar(raw: &str, kind: ScalarKind, model: &ShapeModel<'_>) -> Value {
    let parsed = match kind {
        ScalarKind::String => return Value::String(raw.to_owned()),
        ScalarKind::Blob => return Value::Blob(Bytes::copy_from_slice(raw.as_bytes())),
        ScalarKind::Integer => parse_int(raw).map(Value::Int),
        ScalarKind::Float => parse_float(raw).map(Value::Float),
        ScalarKind::Boolean => parse_bool(raw).map(Value::Bool),
        ScalarKind::Timestamp => {
            let format = model.timestamp_format_or(TimestampFormat::Iso8601);
            parse_timestamp(raw, format).map(Value::Timestamp)
        }
    };
    parsed.unwrap_or_else(|error| {
        debug!(shape = model.name(), raw, %error, "using zero value for unparsable argument");
        Value::zero(kind)
    })
}

/// Space-separated groups each hold one map literal; all merge into one.
fn entries(raw: &str) -> Vec<(String, CliValue)> {
    raw.split(' ')
        .filter(|group| !group.is_empty())
        .flat_map(|group| cli_entries(CliValue::Scalar(group.to_owned())))
        .collect()
}

fn cli_entries(value: CliValue) -> Vec<(String, CliValue)> {
    match value {
        CliValue::Map(pairs) => pairs,
        CliValue::Scalar(raw) => map_literal(strip_brackets(&raw, '{', '}'))
            .into_iter()
            .map(|(k, v)| (k, CliValue::Scalar(v)))
            .collect(),
        CliValue::List(_) => Vec::new(),
    }
}

fn find_member<'a>(
    model: &ShapeModel<'a>,
    key: &str,
) -> Option<(&'a str, &'a MemberRef)> {
    model
        .members()
        .find(|(name, _)| *name == key)
        .or_else(|| model.members().find(|(name, _)| name.eq_ignore_ascii_case(key)))
}

//! Shape-driven transcoding of a wire tree into a typed [`Value`].
//!
//! [`StructTranscoder::transcode`] fills a value slot from one node, dispatching
//! on the shape kind. Slots start as `None` and are only allocated once a
//! matching node is seen, so members absent from the wire stay absent.

use std::collections::BTreeMap;

use shapewire_model::{
    Location, ScalarKind, ShapeKind, ShapeModel, ShapeSet, TranscodeError, TranscodeResult, Value,
    codec,
};

use crate::error::XmlError;
use crate::tree::{DecodeOptions, XmlNode, parse_document};

/// Options for [`StructTranscoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmarshalOptions {
    /// Fail when a structure lacks a member its shape marks required.
    pub enforce_required: bool,
}

impl Default for UnmarshalOptions {
    fn default() -> Self {
        Self {
            enforce_required: true,
        }
    }
}

/// Walks a [`ShapeModel`] against [`XmlNode`]s.
#[derive(Debug, Clone, Copy)]
pub struct StructTranscoder<'a> {
    set: &'a ShapeSet,
    options: UnmarshalOptions,
}

impl<'a> StructTranscoder<'a> {
    /// A transcoder resolving member shapes from `set`.
    #[must_use]
    pub fn new(set: &'a ShapeSet, options: UnmarshalOptions) -> Self {
        Self { set, options }
    }

    /// Decode `node` into `slot` according to `model`.
    ///
    /// Structures, lists, and maps already present in `slot` are extended, which
    /// is how flattened siblings accumulate into one value.
    pub fn transcode(
        &self,
        slot: &mut Option<Value>,
        node: &XmlNode,
        model: &ShapeModel<'a>,
    ) -> TranscodeResult<()> {
        match model.kind() {
            ShapeKind::Structure(_) => self.structure(slot, node, model),
            ShapeKind::List(_) => self.list(slot, node, model),
            ShapeKind::Map(_) => self.map(slot, node, model),
            ShapeKind::Scalar(kind) => {
                *slot = Some(scalar(node, model, *kind)?);
                Ok(())
            }
        }
    }

    fn structure(
        &self,
        slot: &mut Option<Value>,
        node: &XmlNode,
        model: &ShapeModel<'a>,
    ) -> TranscodeResult<()> {
        if let Some(wrapper) = model.result_wrapper() {
            let inner = model.clone().without_result_wrapper();
            // Repeated wrapper elements merge into one value.
            return match node.children(wrapper) {
                [] => self.structure(slot, node, &inner),
                targets => {
                    for target in targets {
                        self.structure(slot, target, &inner)?;
                    }
                    Ok(())
                }
            };
        }

        let value = slot.get_or_insert_with(Value::structure);
        let Value::Structure(fields) = value else {
            return Err(model.mismatch(value.value_type().to_string()));
        };

        if let Some(payload) = model.payload() {
            if let Some((name, member)) = model.members().find(|(n, _)| *n == payload) {
                let payload_model = self.set.resolve(name, member)?;
                if matches!(payload_model.kind(), ShapeKind::Structure(_)) {
                    let mut payload_slot = fields.remove(name);
                    self.transcode(&mut payload_slot, node, &payload_model)?;
                    if let Some(v) = payload_slot {
                        fields.insert(name.to_owned(), v);
                    }
                    return Ok(());
                }
            }
        }

        tracing::trace!(shape = %model.shape().name, element = node.name(), "decoding structure");

        for (name, member) in model.members() {
            if member.location != Location::Body {
                continue;
            }
            let member_model = self.set.resolve(name, member)?;
            let wire_name = member_model.wire_name();

            let synthetic;
            let matches: &[XmlNode] = match node.children(wire_name) {
                [] => match node.attribute(wire_name) {
                    Some(value) => {
                        synthetic = [XmlNode::text_node(wire_name, value)];
                        &synthetic[..]
                    }
                    None => &[],
                },
                found => found,
            };
            if matches.is_empty() {
                continue;
            }

            let mut field = fields.remove(name);
            for elem in matches {
                self.transcode(&mut field, elem, &member_model)?;
            }
            if let Some(v) = field {
                fields.insert(name.to_owned(), v);
            }
        }

        if self.options.enforce_required {
            if let Some(missing) = model.required().iter().find(|r| !fields.contains_key(*r)) {
                return Err(TranscodeError::MissingRequiredField {
                    location: node.name().to_owned(),
                    field: missing.clone(),
                });
            }
        }
        Ok(())
    }

    fn list(
        &self,
        slot: &mut Option<Value>,
        node: &XmlNode,
        model: &ShapeModel<'a>,
    ) -> TranscodeResult<()> {
        let item_model = self.set.list_item(model)?;

        if model.flattened() {
            let items = list_items(slot, model, 1)?;
            let mut item = None;
            self.transcode(&mut item, node, &item_model)?;
            items.extend(item);
            return Ok(());
        }

        let children = node.children(model.member_name());
        let items = list_items(slot, model, children.len())?;
        for child in children {
            let mut item = None;
            self.transcode(&mut item, child, &item_model)?;
            items.extend(item);
        }
        Ok(())
    }

    fn map(
        &self,
        slot: &mut Option<Value>,
        node: &XmlNode,
        model: &ShapeModel<'a>,
    ) -> TranscodeResult<()> {
        let value = slot.get_or_insert_with(|| Value::Map(BTreeMap::new()));
        let Value::Map(entries) = value else {
            return Err(model.mismatch(value.value_type().to_string()));
        };

        if model.flattened() {
            return self.map_entry(entries, node, model);
        }
        for entry in node.children(model.entry_name()) {
            self.map_entry(entries, entry, model)?;
        }
        Ok(())
    }

    fn map_entry(
        &self,
        entries: &mut BTreeMap<String, Value>,
        node: &XmlNode,
        model: &ShapeModel<'a>,
    ) -> TranscodeResult<()> {
        let (_, value_model) = self.set.map_entry(model)?;
        let keys = node.children(model.key_name());
        let values = node.children(model.value_name());
        if keys.len() != values.len() {
            return Err(TranscodeError::MapArityMismatch {
                location: node.name().to_owned(),
                keys: keys.len(),
                values: values.len(),
            });
        }

        for (key, value) in keys.iter().zip(values) {
            let mut decoded = None;
            self.transcode(&mut decoded, value, &value_model)?;
            if let Some(v) = decoded {
                entries.insert(key.text().to_owned(), v);
            }
        }
        Ok(())
    }
}

fn list_items<'v>(
    slot: &'v mut Option<Value>,
    model: &ShapeModel<'_>,
    capacity: usize,
) -> TranscodeResult<&'v mut Vec<Value>> {
    let value = slot.get_or_insert_with(|| Value::List(Vec::with_capacity(capacity)));
    match value {
        Value::List(items) => Ok(items),
        other => Err(model.mismatch(other.value_type().to_string())),
    }
}

/// Decode a scalar from a node's text.
pub(crate) fn scalar(node: &XmlNode, model: &ShapeModel<'_>, kind: ScalarKind) -> TranscodeResult<Value> {
    scalar_from_text(node.text(), node.name(), model, kind)
}

/// Decode scalar text found at `location`.
pub fn scalar_from_text(
    text: &str,
    location: &str,
    model: &ShapeModel<'_>,
    kind: ScalarKind,
) -> TranscodeResult<Value> {
    let invalid = |reason: String| TranscodeError::InvalidScalar {
        location: location.to_owned(),
        expected: model.shape_type(),
        value: text.to_owned(),
        reason,
    };

    Ok(match kind {
        ScalarKind::String => Value::String(text.to_owned()),
        ScalarKind::Boolean => Value::Bool(codec::parse_bool(text).map_err(invalid)?),
        ScalarKind::Integer => Value::Int(codec::parse_int(text).map_err(invalid)?),
        ScalarKind::Float => Value::Float(codec::parse_float(text).map_err(invalid)?),
        ScalarKind::Blob => Value::Blob(codec::decode_blob(text).map_err(|reason| {
            TranscodeError::InvalidBlob {
                location: location.to_owned(),
                reason,
            }
        })?),
        ScalarKind::Timestamp => {
            let format = model.timestamp_format();
            Value::Timestamp(codec::parse_timestamp(text, format).map_err(|reason| {
                TranscodeError::InvalidTimestamp {
                    location: location.to_owned(),
                    format,
                    value: text.to_owned(),
                    reason,
                }
            })?)
        }
    })
}

/// Decode every top-level element of a parsed document into one value.
pub fn unmarshal_tree(
    document: &XmlNode,
    set: &ShapeSet,
    model: &ShapeModel<'_>,
    options: UnmarshalOptions,
) -> Result<Value, XmlError> {
    let transcoder = StructTranscoder::new(set, options);
    let mut slot = None;
    for root in document.elements() {
        transcoder.transcode(&mut slot, root, model)?;
    }
    slot.ok_or_else(|| XmlError::MissingElement("root element".to_owned()))
}

/// Parse `xml` and decode it against `model`.
pub fn unmarshal(
    xml: &[u8],
    set: &ShapeSet,
    model: &ShapeModel<'_>,
    decode: &DecodeOptions,
    options: UnmarshalOptions,
) -> Result<Value, XmlError> {
    let document = parse_document(xml, decode)?;
    unmarshal_tree(&document, set, model, options)
}

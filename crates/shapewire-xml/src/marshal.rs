//! Shape-driven XML encoding of typed values.
//!
//! The encoder mirrors the transcoder's naming rules, so a structure written
//! with [`marshal`] decodes back to the same value.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use shapewire_model::{Location, ShapeKind, ShapeModel, ShapeSet, TranscodeError, Value};

use crate::error::XmlError;

/// Encode `value` as an XML document whose root element is named after
/// `model`, preceded by an XML declaration.
pub fn marshal(value: &Value, set: &ShapeSet, model: &ShapeModel<'_>) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(256);
    let mut writer = Writer::new(&mut buf);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Encoder { set }.element(&mut writer, model.wire_name(), value, model)?;
    Ok(buf)
}

/// Encode `value` as a single element named `name`, without a declaration.
pub fn marshal_element(
    name: &str,
    value: &Value,
    set: &ShapeSet,
    model: &ShapeModel<'_>,
) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(256);
    let mut writer = Writer::new(&mut buf);
    Encoder { set }.element(&mut writer, name, value, model)?;
    Ok(buf)
}

struct Encoder<'a> {
    set: &'a ShapeSet,
}

impl<'a> Encoder<'a> {
    fn element<W: Write>(
        &self,
        writer: &mut Writer<W>,
        name: &str,
        value: &Value,
        model: &ShapeModel<'a>,
    ) -> Result<(), XmlError> {
        match model.kind() {
            ShapeKind::Structure(_) => self.structure(writer, name, value, model),
            ShapeKind::List(_) => self.list(writer, name, value, model),
            ShapeKind::Map(_) => self.map(writer, name, value, model),
            ShapeKind::Scalar(_) => {
                let text = scalar_text(value, model)?;
                let mut start = BytesStart::new(name);
                if let Some(ns) = model.namespace() {
                    start.push_attribute((ns.attribute_name().as_str(), ns.uri.as_str()));
                }
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Text(BytesText::new(&text)))?;
                writer.write_event(Event::End(BytesEnd::new(name)))?;
                Ok(())
            }
        }
    }

    fn structure<W: Write>(
        &self,
        writer: &mut Writer<W>,
        name: &str,
        value: &Value,
        model: &ShapeModel<'a>,
    ) -> Result<(), XmlError> {
        let Value::Structure(fields) = value else {
            return Err(model.mismatch(value.value_type().to_string()).into());
        };

        if let Some(wrapper) = model.result_wrapper() {
            let inner = model.clone().without_result_wrapper();
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            self.structure(writer, wrapper, value, &inner)?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
            return Ok(());
        }

        if let Some(payload) = model.payload() {
            if let Some((member_name, member)) = model.members().find(|(n, _)| *n == payload) {
                let payload_model = self.set.resolve(member_name, member)?;
                if matches!(payload_model.kind(), ShapeKind::Structure(_)) {
                    let empty = Value::structure();
                    let inner = fields.get(member_name).unwrap_or(&empty);
                    return self.structure(writer, name, inner, &payload_model);
                }
            }
        }

        let mut start = BytesStart::new(name);
        if let Some(ns) = model.namespace() {
            start.push_attribute((ns.attribute_name().as_str(), ns.uri.as_str()));
        }
        let mut elements = Vec::new();
        for (member_name, member) in model.members() {
            if member.location != Location::Body {
                continue;
            }
            let Some(field) = fields.get(member_name) else {
                continue;
            };
            let member_model = self.set.resolve(member_name, member)?;
            if member_model.is_attribute() {
                let text = scalar_text(field, &member_model)?;
                start.push_attribute((member_model.wire_name(), text.as_str()));
            } else {
                elements.push((member_model, field));
            }
        }

        writer.write_event(Event::Start(start))?;
        for (member_model, field) in elements {
            self.element(writer, member_model.wire_name(), field, &member_model)?;
        }
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn list<W: Write>(
        &self,
        writer: &mut Writer<W>,
        name: &str,
        value: &Value,
        model: &ShapeModel<'a>,
    ) -> Result<(), XmlError> {
        let Value::List(items) = value else {
            return Err(model.mismatch(value.value_type().to_string()).into());
        };
        let item_model = self.set.list_item(model)?;

        if model.flattened() {
            for item in items {
                self.element(writer, name, item, &item_model)?;
            }
            return Ok(());
        }

        writer.write_event(Event::Start(BytesStart::new(name)))?;
        for item in items {
            self.element(writer, model.member_name(), item, &item_model)?;
        }
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn map<W: Write>(
        &self,
        writer: &mut Writer<W>,
        name: &str,
        value: &Value,
        model: &ShapeModel<'a>,
    ) -> Result<(), XmlError> {
        let Value::Map(entries) = value else {
            return Err(model.mismatch(value.value_type().to_string()).into());
        };
        let (_, value_model) = self.set.map_entry(model)?;
        let flattened = model.flattened();
        let entry_name = if flattened { name } else { model.entry_name() };

        if !flattened {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
        }
        for (key, entry) in entries {
            writer.write_event(Event::Start(BytesStart::new(entry_name)))?;
            writer
                .create_element(model.key_name())
                .write_text_content(BytesText::new(key))?;
            self.element(writer, model.value_name(), entry, &value_model)?;
            writer.write_event(Event::End(BytesEnd::new(entry_name)))?;
        }
        if !flattened {
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Ok(())
    }
}

/// Render a scalar value as element or attribute text.
fn scalar_text(value: &Value, model: &ShapeModel<'_>) -> Result<String, XmlError> {
    if value.value_type() != model.shape_type() {
        return Err(model.mismatch(value.value_type().to_string()).into());
    }
    value
        .to_text(model.timestamp_format())
        .ok_or_else(|| XmlError::from(TranscodeError::TypeMismatch {
            location: model.wire_name().to_owned(),
            expected: model.shape_type(),
            found: value.value_type().to_string(),
        }))
}

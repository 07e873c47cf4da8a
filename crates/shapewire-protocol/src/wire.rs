//! Scalar text shared by form parameters, headers, and URI labels.

use shapewire_model::{ScalarKind, ShapeModel, TimestampFormat, TranscodeResult, Value};

/// Render a scalar as text, checking it against the shape type.
///
/// `timestamps` applies when the shape declares no format of its own.
pub(crate) fn scalar_text(
    value: &Value,
    model: &ShapeModel<'_>,
    timestamps: TimestampFormat,
) -> TranscodeResult<String> {
    if value.value_type() != model.shape_type() {
        return Err(model.mismatch(value.value_type().to_string()));
    }
    value
        .to_text(model.timestamp_format_or(timestamps))
        .ok_or_else(|| model.mismatch(value.value_type().to_string()))
}

/// Parse scalar text found outside the body (a header or status line).
pub(crate) fn scalar_from_text(
    text: &str,
    location: &str,
    model: &ShapeModel<'_>,
    kind: ScalarKind,
    timestamps: TimestampFormat,
) -> TranscodeResult<Value> {
    if kind != ScalarKind::Timestamp {
        return shapewire_xml::scalar_from_text(text, location, model, kind);
    }
    let format = model.timestamp_format_or(timestamps);
    shapewire_model::codec::parse_timestamp(text, format)
        .map(Value::Timestamp)
        .map_err(|reason| shapewire_model::TranscodeError::InvalidTimestamp {
            location: location.to_owned(),
            format,
            value: text.to_owned(),
            reason,
        })
}

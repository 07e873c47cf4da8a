//! REST protocols: `rest-json` and `rest-xml`.
//!
//! Members are routed by their `location`: `uri` members fill `{Label}` and
//! greedy `{Label+}` placeholders of the request URI, `querystring` members
//! become query parameters, `header` members single headers, and `headers`
//! maps a family of headers sharing a prefix. `statusCode` members receive the
//! response status. Everything else travels in the body, unless the shape
//! names a `payload` member, which then is the whole body.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use shapewire_model::{
    Fields, Location, MemberRef, Protocol, ScalarKind, ShapeKind, ShapeModel, ShapeSet,
    TimestampFormat, TranscodeError, Value,
};
use shapewire_xml::{StructTranscoder, UnmarshalOptions, marshal, parse_document};
use tracing::debug;

use crate::error::{ProtocolError, ProtocolResult};
use crate::json::{decode_json, encode_json};
use crate::jsonrpc::{error_code, json_api_error};
use crate::query::xml_api_error;
use crate::wire::{scalar_from_text, scalar_text};
use crate::{AdapterOptions, DecodedResponse, ProtocolAdapter};

/// Characters left unescaped in a URI label.
const LABEL: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Greedy labels also keep `/`.
const GREEDY_LABEL: &AsciiSet = &LABEL.remove(b'/');

/// Request id headers, in lookup order.
const REQUEST_ID_HEADERS: [&str; 2] = ["x-amzn-requestid", "x-amz-request-id"];

/// Header naming the error code of a REST-JSON error response.
const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

/// Serialization of the non-located members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    /// JSON object keyed by wire name.
    Json,
    /// XML document rooted at the input shape's wire name.
    Xml,
}

impl BodyFormat {
    /// Content type of a structured body.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }
}

/// Adapter for the `rest-json` and `rest-xml` protocols.
#[derive(Debug, Clone, Copy)]
pub struct RestAdapter<'a> {
    set: &'a ShapeSet,
    options: AdapterOptions,
    format: BodyFormat,
}

impl<'a> RestAdapter<'a> {
    /// A REST adapter over `set` writing bodies as `format`.
    #[must_use]
    pub fn new(set: &'a ShapeSet, options: AdapterOptions, format: BodyFormat) -> Self {
        Self {
            set,
            options,
            format,
        }
    }

    fn encode_body(&self, value: &Value, model: &ShapeModel<'_>) -> ProtocolResult<Vec<u8>> {
        match self.format {
            BodyFormat::Json => encode_json(value, self.set, model),
            BodyFormat::Xml => Ok(marshal(value, self.set, model)?),
        }
    }

    /// Decode a body without required-member checks; located members are
    /// merged in afterwards and the check runs on the result.
    fn decode_body(&self, body: &[u8], model: &ShapeModel<'_>) -> ProtocolResult<Value> {
        let options = UnmarshalOptions {
            enforce_required: false,
        };
        match self.format {
            BodyFormat::Json => decode_json(body, self.set, model, options),
            BodyFormat::Xml => {
                let document = parse_document(body, &self.options.decode)?;
                let Some(root) = document.elements().next() else {
                    return Ok(Value::structure());
                };
                let mut slot = None;
                StructTranscoder::new(self.set, options).transcode(&mut slot, root, model)?;
                Ok(slot.unwrap_or_else(Value::structure))
            }
        }
    }

    fn error(&self, response: &http::Response<Bytes>) -> ProtocolError {
        let status = response.status();
        let mut error = match self.format {
            BodyFormat::Json => {
                let mut error = json_api_error(status, response.body());
                if let Some(code) = crate::header_text(response.headers(), ERROR_TYPE_HEADER) {
                    error.code = error_code(&code).to_owned();
                }
                error
            }
            BodyFormat::Xml => xml_api_error(status, response.body(), &self.options),
        };
        if error.request_id.is_none() {
            error.request_id = request_id(response.headers());
        }
        ProtocolError::Api(error)
    }
}

impl ProtocolAdapter for RestAdapter<'_> {
    fn protocol(&self) -> Protocol {
        match self.format {
            BodyFormat::Json => Protocol::RestJson,
            BodyFormat::Xml => Protocol::RestXml,
        }
    }

    fn build_request(
        &self,
        operation: &str,
        input: Option<&Value>,
    ) -> ProtocolResult<http::Request<Bytes>> {
        let op = crate::operation(self.set, operation)?;
        let method = http::Method::from_bytes(op.http_method.as_deref().unwrap_or("POST").as_bytes())
            .map_err(http::Error::from)?;
        let template = op.request_uri.as_deref().unwrap_or("/");
        let (mut path, static_query) = match template.split_once('?') {
            Some((path, query)) => (path.to_owned(), Some(query)),
            None => (template.to_owned(), None),
        };

        let mut query = Vec::new();
        let mut headers = HeaderMap::new();
        let mut body = Bytes::new();
        let mut structured = false;

        if let (Some(shape), Some(Value::Structure(fields))) = (op.input.as_deref(), input) {
            let model = self.set.root(shape)?;
            let mut body_fields = Fields::new();
            let mut payload = None;

            for (name, member) in model.members() {
                let Some(value) = fields.get(name) else {
                    continue;
                };
                let member_model = self.set.resolve(name, member)?;
                let wire_name = member_model.wire_name();
                match member.location {
                    Location::Uri => {
                        let text = scalar_text(value, &member_model, TimestampFormat::Iso8601)?;
                        path = path
                            .replace(
                                &format!("{{{wire_name}}}"),
                                &utf8_percent_encode(&text, LABEL).to_string(),
                            )
                            .replace(
                                &format!("{{{wire_name}+}}"),
                                &utf8_percent_encode(&text, GREEDY_LABEL).to_string(),
                            );
                    }
                    Location::QueryString => self.query_params(value, &member_model, &mut query)?,
                    Location::Header => {
                        let text = scalar_text(value, &member_model, TimestampFormat::Rfc822)?;
                        insert_header(&mut headers, wire_name, &text)?;
                    }
                    Location::Headers => {
                        let Value::Map(entries) = value else {
                            return Err(member_model.mismatch(value.value_type().to_string()).into());
                        };
                        let (_, value_model) = self.set.map_entry(&member_model)?;
                        for (key, item) in entries {
                            let text = scalar_text(item, &value_model, TimestampFormat::Rfc822)?;
                            insert_header(&mut headers, &format!("{wire_name}{key}"), &text)?;
                        }
                    }
                    Location::StatusCode => {}
                    Location::Body if model.payload() == Some(name) => {
                        payload = Some((member_model, value));
                    }
                    Location::Body => {
                        body_fields.insert(name.to_owned(), value.clone());
                    }
                }
            }

            if let Some((payload_model, value)) = payload {
                match (payload_model.kind(), value) {
                    (ShapeKind::Structure(_), _) => {
                        body = Bytes::from(self.encode_body(value, &payload_model)?);
                        structured = true;
                    }
                    (_, Value::Blob(bytes)) => body = bytes.clone(),
                    (_, Value::String(s)) => body = Bytes::from(s.clone()),
                    _ => {
                        body = Bytes::from(scalar_text(value, &payload_model, TimestampFormat::Iso8601)?);
                    }
                }
            } else if !body_fields.is_empty() {
                body = Bytes::from(self.encode_body(&Value::Structure(body_fields), &model)?);
                structured = true;
            }
        }

        if let Some(start) = path.find('{') {
            let label = path[start + 1..]
                .split('}')
                .next()
                .unwrap_or_default()
                .trim_end_matches('+');
            return Err(ProtocolError::MissingUriLabel(label.to_owned()));
        }

        let mut uri = path;
        query.sort_by(|a, b| a.0.cmp(&b.0));
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query)
            .finish();
        let query_string = match (static_query, encoded.is_empty()) {
            (Some(fixed), true) => fixed.to_owned(),
            (Some(fixed), false) => format!("{fixed}&{encoded}"),
            (None, _) => encoded,
        };
        if !query_string.is_empty() {
            uri.push('?');
            uri.push_str(&query_string);
        }

        debug!(operation = %op.name, %method, uri, "built rest request");
        let mut builder = http::Request::builder().method(method).uri(uri);
        if structured {
            builder = builder.header(http::header::CONTENT_TYPE, self.format.content_type());
        }
        if let Some(map) = builder.headers_mut() {
            map.extend(headers);
        }
        Ok(builder.body(body)?)
    }

    fn unmarshal_response(
        &self,
        operation: &str,
        response: &http::Response<Bytes>,
    ) -> ProtocolResult<DecodedResponse> {
        let op = crate::operation(self.set, operation)?;
        if !response.status().is_success() {
            return Err(self.error(response));
        }

        let request_id = request_id(response.headers());
        let Some(shape) = op.output.as_deref() else {
            return Ok(DecodedResponse {
                value: Value::structure(),
                request_id,
            });
        };
        let model = self.set.root(shape)?.without_result_wrapper();
        let body = response.body();
        let blank = body.iter().all(u8::is_ascii_whitespace);

        let mut fields = Fields::new();
        let payload = model
            .payload()
            .and_then(|payload| model.members().find(|(name, _)| *name == payload));
        if let Some((name, member)) = payload {
            let payload_model = self.set.resolve(name, member)?;
            let value = match payload_model.kind() {
                ShapeKind::Scalar(ScalarKind::Blob) => Some(Value::Blob(body.clone())),
                ShapeKind::Scalar(ScalarKind::String) => {
                    Some(Value::String(String::from_utf8_lossy(body).into_owned()))
                }
                _ if blank => None,
                _ => Some(self.decode_body(body, &payload_model)?),
            };
            if let Some(value) = value.filter(|_| !body.is_empty()) {
                fields.insert(name.to_owned(), value);
            }
        } else if !blank {
            if let Value::Structure(decoded) = self.decode_body(body, &model)? {
                fields = decoded;
            }
        }

        for (name, member) in model.members() {
            if let Some(value) = self.located_member(name, member, response)? {
                fields.insert(name.to_owned(), value);
            }
        }

        if self.options.unmarshal.enforce_required {
            if let Some(missing) = model.required().iter().find(|r| !fields.contains_key(*r)) {
                return Err(TranscodeError::MissingRequiredField {
                    location: model.wire_name().to_owned(),
                    field: missing.clone(),
                }
                .into());
            }
        }

        Ok(DecodedResponse {
            value: Value::Structure(fields),
            request_id,
        })
    }
}

impl<'a> RestAdapter<'a> {
    fn query_params(
        &self,
        value: &Value,
        model: &ShapeModel<'a>,
        query: &mut Vec<(String, String)>,
    ) -> ProtocolResult<()> {
        match value {
            Value::List(items) => {
                let item_model = self.set.list_item(model)?;
                for item in items {
                    let text = scalar_text(item, &item_model, TimestampFormat::Iso8601)?;
                    query.push((model.wire_name().to_owned(), text));
                }
            }
            Value::Map(entries) => {
                let (_, value_model) = self.set.map_entry(model)?;
                for (key, item) in entries {
                    let text = scalar_text(item, &value_model, TimestampFormat::Iso8601)?;
                    query.push((key.clone(), text));
                }
            }
            _ => {
                let text = scalar_text(value, model, TimestampFormat::Iso8601)?;
                query.push((model.wire_name().to_owned(), text));
            }
        }
        Ok(())
    }

    fn located_member(
        &self,
        name: &'a str,
        member: &'a MemberRef,
        response: &http::Response<Bytes>,
    ) -> ProtocolResult<Option<Value>> {
        match member.location {
            Location::Header => {
                let model = self.set.resolve(name, member)?;
                let wire_name = model.wire_name();
                let Some(text) = crate::header_text(response.headers(), wire_name) else {
                    return Ok(None);
                };
                let Some(kind) = model.scalar_kind() else {
                    debug!(member = name, "skipping non-scalar header member");
                    return Ok(None);
                };
                Ok(Some(scalar_from_text(
                    &text,
                    wire_name,
                    &model,
                    kind,
                    TimestampFormat::Rfc822,
                )?))
            }
            Location::Headers => {
                let model = self.set.resolve(name, member)?;
                let (_, value_model) = self.set.map_entry(&model)?;
                let Some(kind) = value_model.scalar_kind() else {
                    return Ok(None);
                };
                let prefix = model.wire_name().to_ascii_lowercase();
                let mut entries = std::collections::BTreeMap::new();
                for (header, value) in response.headers() {
                    let Some(key) = header.as_str().strip_prefix(prefix.as_str()) else {
                        continue;
                    };
                    let Ok(text) = value.to_str() else {
                        continue;
                    };
                    entries.insert(
                        key.to_owned(),
                        scalar_from_text(text, header.as_str(), &value_model, kind, TimestampFormat::Rfc822)?,
                    );
                }
                Ok((!entries.is_empty()).then_some(Value::Map(entries)))
            }
            Location::StatusCode => Ok(Some(Value::Int(i64::from(response.status().as_u16())))),
            Location::Body | Location::QueryString | Location::Uri => Ok(None),
        }
    }
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> ProtocolResult<()> {
    let invalid = |reason: String| ProtocolError::InvalidHeader {
        name: name.to_owned(),
        reason,
    };
    let header = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    headers.append(header, value);
    Ok(())
}

fn request_id(headers: &HeaderMap) -> Option<String> {
    REQUEST_ID_HEADERS
        .iter()
        .find_map(|name| crate::header_text(headers, name))
}

//! The query protocol: form-encoded requests and XML responses.
//!
//! Requests are `POST /` with an `application/x-www-form-urlencoded` body
//! carrying `Action`, `Version`, and the flattened input:
//!
//! ```text
//! Action=OperationName&ListArg.member.1=foo&MapArg.entry.1.key=k&Version=2014-01-01
//! ```
//!
//! Responses wrap the output in `<OperationNameResult>` inside the response
//! element, next to `<ResponseMetadata><RequestId>`. The EC2 dialect shares the
//! serializer with different naming rules; see [`crate::ec2query`].

use std::borrow::Cow;

use bytes::Bytes;
use shapewire_model::{
    Operation, Protocol, ShapeKind, ShapeModel, ShapeSet, TimestampFormat, TranscodeResult, Value,
};
use shapewire_xml::{StructTranscoder, XmlNode, parse_document};

use crate::error::{ApiError, ProtocolError, ProtocolResult};
use crate::wire::scalar_text;
use crate::{AdapterOptions, DecodedResponse, ProtocolAdapter};

/// Content type of query request bodies.
pub const CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Naming rules of a query-style protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryDialect {
    /// `Name.member.N` lists, `Name.entry.N.key` maps, `locationName` names.
    Query,
    /// `Name.N` lists, names from `queryName` or a capitalized `locationName`.
    Ec2,
}

/// Flattens a [`Value`] into `(name, value)` form parameters.
#[derive(Debug, Clone, Copy)]
pub struct QuerySerializer<'a> {
    set: &'a ShapeSet,
    dialect: QueryDialect,
}

impl<'a> QuerySerializer<'a> {
    /// A serializer for `dialect`.
    #[must_use]
    pub fn new(set: &'a ShapeSet, dialect: QueryDialect) -> Self {
        Self { set, dialect }
    }

    /// Append the parameters of `value` under `prefix` to `params`.
    pub fn serialize(
        &self,
        value: &Value,
        model: &ShapeModel<'a>,
        prefix: &str,
        params: &mut Vec<(String, String)>,
    ) -> TranscodeResult<()> {
        match (model.kind(), value) {
            (ShapeKind::Structure(_), Value::Structure(fields)) => {
                for (name, member) in model.members() {
                    let Some(field) = fields.get(name) else {
                        continue;
                    };
                    let member_model = self.set.resolve(name, member)?;
                    let key = join(prefix, &self.member_key(name, &member_model));
                    self.serialize(field, &member_model, &key, params)?;
                }
                Ok(())
            }
            (ShapeKind::List(_), Value::List(items)) => {
                if items.is_empty() {
                    if self.dialect == QueryDialect::Query {
                        params.push((prefix.to_owned(), String::new()));
                    }
                    return Ok(());
                }
                let base = match self.dialect {
                    QueryDialect::Query if !model.flattened() => join(prefix, model.member_name()),
                    _ => prefix.to_owned(),
                };
                let item_model = self.set.list_item(model)?;
                for (i, item) in items.iter().enumerate() {
                    self.serialize(item, &item_model, &join(&base, &(i + 1).to_string()), params)?;
                }
                Ok(())
            }
            (ShapeKind::Map(_), Value::Map(entries)) => {
                let base = if model.flattened() {
                    prefix.to_owned()
                } else {
                    join(prefix, model.entry_name())
                };
                let (_, value_model) = self.set.map_entry(model)?;
                for (i, (key, item)) in entries.iter().enumerate() {
                    let entry = join(&base, &(i + 1).to_string());
                    params.push((join(&entry, model.key_name()), key.clone()));
                    self.serialize(item, &value_model, &join(&entry, model.value_name()), params)?;
                }
                Ok(())
            }
            (ShapeKind::Scalar(_), _) => {
                let text = scalar_text(value, model, TimestampFormat::Iso8601)?;
                params.push((prefix.to_owned(), text));
                Ok(())
            }
            _ => Err(model.mismatch(value.value_type().to_string())),
        }
    }

    fn member_key(&self, name: &'a str, model: &ShapeModel<'a>) -> Cow<'a, str> {
        match self.dialect {
            QueryDialect::Query => {
                // Flattened lists repeat under the item's location name.
                let flat_name = match model.kind() {
                    ShapeKind::List(list) if model.flattened() => list.member.location_name.as_deref(),
                    _ => None,
                };
                Cow::Borrowed(flat_name.or(model.location_name()).unwrap_or(name))
            }
            QueryDialect::Ec2 => {
                if let Some(query_name) = model.query_name() {
                    Cow::Borrowed(query_name)
                } else if let Some(location_name) = model.location_name() {
                    Cow::Owned(capitalize(location_name))
                } else {
                    Cow::Borrowed(name)
                }
            }
        }
    }
}

/// Build the form body of `operation`, parameters sorted by name.
pub fn build_body(
    set: &ShapeSet,
    operation: &Operation,
    input: Option<&Value>,
    dialect: QueryDialect,
) -> ProtocolResult<String> {
    let version = set
        .metadata()
        .api_version
        .as_deref()
        .ok_or(ProtocolError::MissingMetadata {
            protocol: match dialect {
                QueryDialect::Query => Protocol::Query,
                QueryDialect::Ec2 => Protocol::Ec2Query,
            },
            field: "apiVersion",
        })?;

    let mut params = vec![
        ("Action".to_owned(), operation.name.clone()),
        ("Version".to_owned(), version.to_owned()),
    ];
    if let (Some(value), Some(shape)) = (input, operation.input.as_deref()) {
        let model = set.root(shape)?;
        QuerySerializer::new(set, dialect).serialize(value, &model, "", &mut params)?;
    }
    params.sort_by(|a, b| a.0.cmp(&b.0));

    tracing::debug!(operation = %operation.name, params = params.len(), "built query body");
    Ok(form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish())
}

/// Adapter for the `query` protocol.
#[derive(Debug, Clone, Copy)]
pub struct QueryAdapter<'a> {
    set: &'a ShapeSet,
    options: AdapterOptions,
    dialect: QueryDialect,
}

impl<'a> QueryAdapter<'a> {
    /// A query adapter over `set`.
    #[must_use]
    pub fn new(set: &'a ShapeSet, options: AdapterOptions) -> Self {
        Self::with_dialect(set, options, QueryDialect::Query)
    }

    pub(crate) fn with_dialect(
        set: &'a ShapeSet,
        options: AdapterOptions,
        dialect: QueryDialect,
    ) -> Self {
        Self {
            set,
            options,
            dialect,
        }
    }

    /// Decode a success response body for `operation`.
    pub fn decode_body(&self, operation: &Operation, body: &[u8]) -> ProtocolResult<DecodedResponse> {
        let document = parse_document(body, &self.options.decode)?;
        let Some(root) = document.elements().next() else {
            return Ok(DecodedResponse::empty());
        };

        let request_id = match self.dialect {
            QueryDialect::Query => root.find("ResponseMetadata/RequestId"),
            QueryDialect::Ec2 => root.child("requestId"),
        }
        .map(|node| node.text().to_owned());

        let Some(shape) = operation.output.as_deref() else {
            return Ok(DecodedResponse {
                value: Value::structure(),
                request_id,
            });
        };
        let model = match self.dialect {
            QueryDialect::Query => {
                let wrapper = operation
                    .result_wrapper
                    .clone()
                    .unwrap_or_else(|| format!("{}Result", operation.name));
                self.set.root(shape)?.with_result_wrapper(wrapper)
            }
            QueryDialect::Ec2 => self.set.root(shape)?.without_result_wrapper(),
        };

        let mut slot = None;
        StructTranscoder::new(self.set, self.options.unmarshal).transcode(&mut slot, root, &model)?;
        Ok(DecodedResponse {
            value: slot.unwrap_or_else(Value::structure),
            request_id,
        })
    }
}

impl ProtocolAdapter for QueryAdapter<'_> {
    fn protocol(&self) -> Protocol {
        match self.dialect {
            QueryDialect::Query => Protocol::Query,
            QueryDialect::Ec2 => Protocol::Ec2Query,
        }
    }

    fn build_request(
        &self,
        operation: &str,
        input: Option<&Value>,
    ) -> ProtocolResult<http::Request<Bytes>> {
        let op = crate::operation(self.set, operation)?;
        let body = build_body(self.set, op, input, self.dialect)?;
        Ok(http::Request::builder()
            .method(http::Method::POST)
            .uri("/")
            .header(http::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(Bytes::from(body))?)
    }

    fn unmarshal_response(
        &self,
        operation: &str,
        response: &http::Response<Bytes>,
    ) -> ProtocolResult<DecodedResponse> {
        let op = crate::operation(self.set, operation)?;
        if !response.status().is_success() {
            return Err(ProtocolError::Api(xml_api_error(
                response.status(),
                response.body(),
                &self.options,
            )));
        }
        self.decode_body(op, response.body())
    }
}

/// Decode an XML error document.
///
/// Understands `<ErrorResponse><Error>` (query), `<Response><Errors><Error>`
/// (EC2), and a bare `<Error>` root (REST-XML). Anything else falls back to
/// the status line.
pub fn xml_api_error(status: http::StatusCode, body: &[u8], options: &AdapterOptions) -> ApiError {
    let Ok(document) = parse_document(body, &options.decode) else {
        return ApiError::from_status(status);
    };
    let Some(root) = document.elements().next() else {
        return ApiError::from_status(status);
    };
    let error = match root.name() {
        "Error" => Some(root),
        "ErrorResponse" => root.child("Error"),
        "Response" => root.find("Errors/Error"),
        _ => None,
    };
    let Some(error) = error else {
        return ApiError::from_status(status);
    };

    let text = |node: Option<&XmlNode>| node.map(|n| n.text().to_owned());
    let mut api = ApiError::from_status(status);
    if let Some(code) = text(error.child("Code")) {
        api.code = code;
    }
    api.message = text(error.child("Message")).unwrap_or_default();
    api.request_id = text(root.child("RequestId"))
        .or_else(|| text(root.child("RequestID")))
        .or_else(|| text(error.child("RequestId")));
    api
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! Protocol adapters for `ShapeWire`.
//!
//! Each adapter binds the shape-driven transcoders to one AWS wire protocol:
//! it builds an [`http::Request`] from an operation's input [`Value`] and turns
//! an [`http::Response`] back into the output value or an [`ApiError`].
//!
//! | Protocol   | Request                          | Response          |
//! |------------|----------------------------------|-------------------|
//! | `query`    | form body, `Action` + `Version`  | XML with wrapper  |
//! | `ec2`      | form body, `Name.N` lists        | XML, no wrapper   |
//! | `json`     | JSON body, `X-Amz-Target`        | JSON              |
//! | `rest-json`| URI, query, headers, JSON body   | headers + JSON    |
//! | `rest-xml` | URI, query, headers, XML body    | headers + XML     |
//!
//! [`adapter_for`] picks the adapter named by the service metadata.

pub mod ec2query;
pub mod error;
pub mod json;
pub mod jsonrpc;
pub mod query;
pub mod rest;
mod wire;

use bytes::Bytes;
use shapewire_model::{Operation, Protocol, ShapeSet, Value};
use shapewire_xml::{DecodeOptions, UnmarshalOptions};

pub use ec2query::Ec2QueryAdapter;
pub use error::{ApiError, ProtocolError, ProtocolResult};
pub use json::{JsonTranscoder, decode_json, encode_json};
pub use jsonrpc::{JsonRpcAdapter, json_api_error};
pub use query::{QueryAdapter, QueryDialect, QuerySerializer, build_body, xml_api_error};
pub use rest::{BodyFormat, RestAdapter};

/// Decoder settings shared by every adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterOptions {
    /// XML tree construction.
    pub decode: DecodeOptions,
    /// Shape-driven decoding.
    pub unmarshal: UnmarshalOptions,
}

/// A decoded success response.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedResponse {
    /// The output structure; empty when the operation has no output.
    pub value: Value,
    /// Request id reported by the service.
    pub request_id: Option<String>,
}

impl DecodedResponse {
    /// An empty output without a request id.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            value: Value::structure(),
            request_id: None,
        }
    }
}

/// One wire protocol.
pub trait ProtocolAdapter {
    /// The protocol this adapter speaks.
    fn protocol(&self) -> Protocol;

    /// Build the HTTP request for `operation` carrying `input`.
    ///
    /// # Errors
    ///
    /// Fails for an unknown operation, a value that does not match the input
    /// shape, or metadata the protocol requires but the set lacks.
    fn build_request(
        &self,
        operation: &str,
        input: Option<&Value>,
    ) -> ProtocolResult<http::Request<Bytes>>;

    /// Decode the HTTP response of `operation`.
    ///
    /// # Errors
    ///
    /// Non-success statuses become [`ProtocolError::Api`]; malformed bodies
    /// surface the decoder error.
    fn unmarshal_response(
        &self,
        operation: &str,
        response: &http::Response<Bytes>,
    ) -> ProtocolResult<DecodedResponse>;
}

/// The adapter for the protocol declared in `set`'s metadata.
///
/// # Errors
///
/// Returns [`ProtocolError::MissingProtocol`] when the metadata names none.
pub fn adapter_for(
    set: &ShapeSet,
    options: AdapterOptions,
) -> ProtocolResult<Box<dyn ProtocolAdapter + '_>> {
    let protocol = set.metadata().protocol.ok_or(ProtocolError::MissingProtocol)?;
    tracing::debug!(?protocol, "selected protocol adapter");
    Ok(match protocol {
        Protocol::Query => Box::new(QueryAdapter::new(set, options)),
        Protocol::Ec2Query => Box::new(ec2query::adapter(set, options)),
        Protocol::JsonRpc => Box::new(JsonRpcAdapter::new(set, options)),
        Protocol::RestJson => Box::new(RestAdapter::new(set, options, BodyFormat::Json)),
        Protocol::RestXml => Box::new(RestAdapter::new(set, options, BodyFormat::Xml)),
    })
}

pub(crate) fn operation<'a>(set: &'a ShapeSet, name: &str) -> ProtocolResult<&'a Operation> {
    set.operation(name)
        .ok_or_else(|| ProtocolError::UnknownOperation(name.to_owned()))
}

pub(crate) fn header_text(headers: &http::HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name.to_ascii_lowercase().as_str())?;
    value.to_str().ok().map(|s| s.trim().to_owned())
}

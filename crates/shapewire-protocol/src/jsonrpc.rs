//! The JSON-RPC protocol.
//!
//! Every request is `POST /` with the operation named in a header and the
//! whole input as the JSON body:
//!
//! ```text
//! X-Amz-Target: DynamoDB_20120810.CreateTable
//! Content-Type: application/x-amz-json-1.0
//! ```

use bytes::Bytes;
use shapewire_model::{Protocol, ShapeSet, Value};

use crate::error::{ApiError, ProtocolError, ProtocolResult};
use crate::json::{decode_json, encode_json};
use crate::{AdapterOptions, DecodedResponse, ProtocolAdapter};

/// Header naming the target operation.
pub const TARGET_HEADER: &str = "x-amz-target";

/// Header carrying the request id of a response.
pub const REQUEST_ID_HEADER: &str = "x-amzn-requestid";

/// Body sent when the operation has no input.
const EMPTY_BODY: &[u8] = b"{}";

/// Adapter for the `json` protocol.
#[derive(Debug, Clone, Copy)]
pub struct JsonRpcAdapter<'a> {
    set: &'a ShapeSet,
    options: AdapterOptions,
}

impl<'a> JsonRpcAdapter<'a> {
    /// A JSON-RPC adapter over `set`.
    #[must_use]
    pub fn new(set: &'a ShapeSet, options: AdapterOptions) -> Self {
        Self { set, options }
    }
}

impl ProtocolAdapter for JsonRpcAdapter<'_> {
    fn protocol(&self) -> Protocol {
        Protocol::JsonRpc
    }

    fn build_request(
        &self,
        operation: &str,
        input: Option<&Value>,
    ) -> ProtocolResult<http::Request<Bytes>> {
        let op = crate::operation(self.set, operation)?;
        let body = match (input, op.input.as_deref()) {
            (Some(value), Some(shape)) => {
                Bytes::from(encode_json(value, self.set, &self.set.root(shape)?)?)
            }
            _ => Bytes::from_static(EMPTY_BODY),
        };

        let metadata = self.set.metadata();
        let mut builder = http::Request::builder().method(http::Method::POST).uri("/");
        if let Some(prefix) = metadata.target_prefix.as_deref().filter(|p| !p.is_empty()) {
            builder = builder.header(TARGET_HEADER, format!("{prefix}.{}", op.name));
        }
        if let Some(version) = metadata.json_version.as_deref().filter(|v| !v.is_empty()) {
            builder = builder.header(
                http::header::CONTENT_TYPE,
                format!("application/x-amz-json-{version}"),
            );
        }
        Ok(builder.body(body)?)
    }

    fn unmarshal_response(
        &self,
        operation: &str,
        response: &http::Response<Bytes>,
    ) -> ProtocolResult<DecodedResponse> {
        let op = crate::operation(self.set, operation)?;
        let request_id = crate::header_text(response.headers(), REQUEST_ID_HEADER);
        if !response.status().is_success() {
            let mut error = json_api_error(response.status(), response.body());
            error.request_id = request_id;
            return Err(ProtocolError::Api(error));
        }

        let value = match op.output.as_deref() {
            Some(shape) => decode_json(
                response.body(),
                self.set,
                &self.set.root(shape)?,
                self.options.unmarshal,
            )?,
            None => Value::structure(),
        };
        Ok(DecodedResponse { value, request_id })
    }
}

/// Decode a JSON error body (`{"__type": "...#Code", "message": "..."}`).
///
/// The code keeps only the part after the last `#`. An empty or malformed
/// body falls back to the status line.
#[must_use]
pub fn json_api_error(status: http::StatusCode, body: &[u8]) -> ApiError {
    let mut error = ApiError::from_status(status);
    let Ok(serde_json::Value::Object(object)) = serde_json::from_slice::<serde_json::Value>(body)
    else {
        return error;
    };

    let text = |key: &str| object.get(key).and_then(serde_json::Value::as_str);
    if let Some(code) = text("__type").or_else(|| text("code")) {
        error.code = error_code(code).to_owned();
    }
    if let Some(message) = text("message").or_else(|| text("Message")) {
        error.message = message.to_owned();
    }
    error
}

/// Strip a namespace (`aws.protocoltests#Code`) and any `:`-suffixed detail.
pub(crate) fn error_code(raw: &str) -> &str {
    let code = raw.rsplit_once('#').map_or(raw, |(_, code)| code);
    code.split_once(':').map_or(code, |(code, _)| code)
}

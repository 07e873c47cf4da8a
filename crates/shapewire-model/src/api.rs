//! Loader for JSON service model documents.
//!
//! The document layout is the one AWS publishes for its API models: a
//! `metadata` block, an `operations` map, and a `shapes` map whose entries
//! carry a `type` plus trait fields (`locationName`, `flattened`, ...).

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ModelError;
use crate::set::{Operation, Protocol, ServiceMetadata, ShapeSet};
use crate::shape::{
    ListShape, Location, MapShape, MemberRef, ScalarKind, Shape, ShapeKind, StructureShape,
    TimestampFormat, XmlNamespace,
};

/// Top-level model document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDocument {
    /// Service metadata.
    #[serde(default)]
    pub metadata: ApiMetadata,
    /// Operations keyed by name.
    #[serde(default)]
    pub operations: BTreeMap<String, ApiOperation>,
    /// Shapes keyed by name.
    #[serde(default)]
    pub shapes: BTreeMap<String, ApiShape>,
}

/// The `metadata` block.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetadata {
    /// Protocol name (`query`, `ec2`, `json`, `rest-json`, `rest-xml`).
    pub protocol: Option<String>,
    /// API version.
    pub api_version: Option<String>,
    /// JSON-RPC target prefix.
    pub target_prefix: Option<String>,
    /// JSON-RPC content type version.
    pub json_version: Option<String>,
    /// Response namespace.
    pub xml_namespace: Option<String>,
    /// Service-wide timestamp format.
    pub timestamp_format: Option<String>,
}

/// An entry of the `operations` map.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOperation {
    /// HTTP binding.
    pub http: Option<ApiHttp>,
    /// Input reference.
    pub input: Option<ApiRef>,
    /// Output reference, possibly with a result wrapper.
    pub output: Option<ApiRef>,
}

/// The `http` block of an operation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHttp {
    /// HTTP method.
    #[serde(default = "default_method")]
    pub method: String,
    /// Request URI template.
    #[serde(default = "default_request_uri")]
    pub request_uri: String,
}

fn default_method() -> String {
    "POST".to_owned()
}

fn default_request_uri() -> String {
    "/".to_owned()
}

/// Namespace trait: either a bare URI or `{prefix, uri}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiNamespace {
    /// Bare URI.
    Uri(String),
    /// Prefixed or unprefixed declaration.
    Declared {
        /// Namespace prefix.
        #[serde(default)]
        prefix: Option<String>,
        /// Namespace URI.
        uri: String,
    },
}

impl From<ApiNamespace> for XmlNamespace {
    fn from(ns: ApiNamespace) -> Self {
        match ns {
            ApiNamespace::Uri(uri) => Self::new(uri),
            ApiNamespace::Declared { prefix, uri } => Self {
                prefix: prefix.filter(|p| !p.is_empty()),
                uri,
            },
        }
    }
}

/// A reference from a member, list item, or map key/value to a shape.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRef {
    /// Target shape name.
    pub shape: String,
    /// REST location.
    pub location: Option<String>,
    /// Wire name override.
    pub location_name: Option<String>,
    /// EC2 query name override.
    pub query_name: Option<String>,
    /// Flattening override.
    pub flattened: Option<bool>,
    /// XML attribute flag.
    #[serde(default)]
    pub xml_attribute: bool,
    /// Namespace declaration.
    pub xml_namespace: Option<ApiNamespace>,
    /// Timestamp format override.
    pub timestamp_format: Option<String>,
    /// Output result wrapper (operations only).
    pub result_wrapper: Option<String>,
}

/// An entry of the `shapes` map.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiShape {
    /// Shape type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Structure members.
    #[serde(default)]
    pub members: BTreeMap<String, ApiRef>,
    /// List item reference.
    pub member: Option<ApiRef>,
    /// Map key reference.
    pub key: Option<ApiRef>,
    /// Map value reference.
    pub value: Option<ApiRef>,
    /// Required members.
    #[serde(default)]
    pub required: Vec<String>,
    /// Whether a list or map is flattened.
    #[serde(default)]
    pub flattened: bool,
    /// Shape-level wire name.
    pub location_name: Option<String>,
    /// Namespace declaration.
    pub xml_namespace: Option<ApiNamespace>,
    /// Payload member.
    pub payload: Option<String>,
    /// Shape-level timestamp format.
    pub timestamp_format: Option<String>,
}

impl ShapeSet {
    /// Parse and validate a JSON model document.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let doc: ApiDocument = serde_json::from_str(json)?;
        doc.into_shape_set()
    }

    /// Parse and validate a JSON model document from bytes.
    pub fn from_slice(json: &[u8]) -> Result<Self, ModelError> {
        let doc: ApiDocument = serde_json::from_slice(json)?;
        doc.into_shape_set()
    }
}

impl ApiDocument {
    /// Convert into a validated [`ShapeSet`].
    pub fn into_shape_set(self) -> Result<ShapeSet, ModelError> {
        let mut builder = ShapeSet::builder().metadata(convert_metadata(self.metadata)?);

        for (name, shape) in self.shapes {
            builder = builder.shape(convert_shape(name, shape)?);
        }

        for (name, op) in self.operations {
            let mut operation = Operation::new(name);
            if let Some(http) = op.http {
                operation = operation.with_http(http.method, http.request_uri);
            }
            if let Some(input) = op.input {
                operation = operation.with_input(input.shape);
            }
            if let Some(output) = op.output {
                if let Some(wrapper) = output.result_wrapper {
                    operation = operation.with_result_wrapper(wrapper);
                }
                operation = operation.with_output(output.shape);
            }
            builder = builder.operation(operation);
        }

        builder.build()
    }
}

fn convert_metadata(meta: ApiMetadata) -> Result<ServiceMetadata, ModelError> {
    let protocol = meta
        .protocol
        .map(|p| {
            Protocol::from_model_name(&p).ok_or(ModelError::InvalidTrait {
                shape: "metadata".to_owned(),
                name: "protocol",
                value: p,
            })
        })
        .transpose()?;
    Ok(ServiceMetadata {
        protocol,
        api_version: meta.api_version,
        target_prefix: meta.target_prefix,
        json_version: meta.json_version,
        xml_namespace: meta.xml_namespace,
        timestamp_format: timestamp_format("metadata", meta.timestamp_format)?,
    })
}

fn convert_shape(name: String, api: ApiShape) -> Result<Shape, ModelError> {
    let kind = match api.type_name.as_str() {
        "boolean" => ShapeKind::Scalar(ScalarKind::Boolean),
        "integer" | "long" | "short" | "byte" => ShapeKind::Scalar(ScalarKind::Integer),
        "float" | "double" => ShapeKind::Scalar(ScalarKind::Float),
        "string" | "character" | "enum" => ShapeKind::Scalar(ScalarKind::String),
        "blob" => ShapeKind::Scalar(ScalarKind::Blob),
        "timestamp" => ShapeKind::Scalar(ScalarKind::Timestamp),
        "list" => {
            let member = api.member.ok_or_else(|| missing(&name, "member"))?;
            ShapeKind::List(ListShape {
                member: convert_ref(&name, member)?,
                flattened: api.flattened,
            })
        }
        "map" => {
            let key = api.key.ok_or_else(|| missing(&name, "key"))?;
            let value = api.value.ok_or_else(|| missing(&name, "value"))?;
            ShapeKind::Map(MapShape {
                key: convert_ref(&name, key)?,
                value: convert_ref(&name, value)?,
                flattened: api.flattened,
                entry_name: None,
            })
        }
        "structure" => {
            let members = api
                .members
                .into_iter()
                .map(|(member, r)| Ok((member, convert_ref(&name, r)?)))
                .collect::<Result<Vec<_>, ModelError>>()?;
            ShapeKind::Structure(StructureShape {
                members,
                required: api.required,
                result_wrapper: None,
                payload: api.payload,
            })
        }
        other => {
            return Err(ModelError::UnsupportedType {
                shape: name,
                type_name: other.to_owned(),
            });
        }
    };

    let timestamp_format = timestamp_format(&name, api.timestamp_format)?;
    Ok(Shape {
        name,
        kind,
        location_name: api.location_name,
        xml_namespace: api.xml_namespace.map(XmlNamespace::from),
        timestamp_format,
    })
}

fn convert_ref(shape: &str, api: ApiRef) -> Result<MemberRef, ModelError> {
    let location = match api.location {
        Some(location) => Location::from_model_name(&location).ok_or(ModelError::InvalidTrait {
            shape: shape.to_owned(),
            name: "location",
            value: location,
        })?,
        None => Location::Body,
    };
    Ok(MemberRef {
        target: api.shape,
        location,
        location_name: api.location_name,
        query_name: api.query_name,
        flattened: api.flattened,
        xml_attribute: api.xml_attribute,
        xml_namespace: api.xml_namespace.map(XmlNamespace::from),
        timestamp_format: timestamp_format(shape, api.timestamp_format)?,
    })
}

fn timestamp_format(
    shape: &str,
    value: Option<String>,
) -> Result<Option<TimestampFormat>, ModelError> {
    value
        .map(|v| {
            TimestampFormat::from_model_name(&v).ok_or(ModelError::InvalidTrait {
                shape: shape.to_owned(),
                name: "timestampFormat",
                value: v,
            })
        })
        .transpose()
}

fn missing(shape: &str, part: &'static str) -> ModelError {
    ModelError::MissingReference {
        shape: shape.to_owned(),
        part,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"{
        "metadata": {
            "protocol": "query",
            "apiVersion": "2014-01-01",
            "xmlNamespace": "https://service.amazonaws.com/doc/2014-01-01/"
        },
        "operations": {
            "OperationName": {
                "http": {"method": "GET", "requestUri": "/things/{Foo}"},
                "input": {"shape": "InputShape"},
                "output": {"shape": "OutputShape", "resultWrapper": "OperationNameResult"}
            }
        },
        "shapes": {
            "InputShape": {
                "type": "structure",
                "members": {"Foo": {"shape": "StringType"}}
            },
            "OutputShape": {
                "type": "structure",
                "required": ["ListMember"],
                "members": {
                    "ListMember": {"shape": "ListShape", "locationName": "NamedList"},
                    "When": {"shape": "TStamp", "timestampFormat": "unixTimestamp"},
                    "Attrs": {"shape": "MapShape", "flattened": true}
                }
            },
            "ListShape": {"type": "list", "member": {"shape": "StringType", "locationName": "item"}},
            "MapShape": {
                "type": "map",
                "key": {"shape": "StringType", "locationName": "Name"},
                "value": {"shape": "StringType", "locationName": "Value"}
            },
            "StringType": {"type": "string"},
            "TStamp": {"type": "timestamp"}
        }
    }"#;

    #[test]
    fn test_should_load_model_document() {
        let set = ShapeSet::from_json(MODEL).expect("valid model");
        assert_eq!(set.metadata().protocol, Some(Protocol::Query));
        assert_eq!(set.metadata().api_version.as_deref(), Some("2014-01-01"));

        let op = set.operation("OperationName").expect("operation");
        assert_eq!(op.output.as_deref(), Some("OutputShape"));
        assert_eq!(op.result_wrapper.as_deref(), Some("OperationNameResult"));
        assert_eq!(op.http_method.as_deref(), Some("GET"));
        assert_eq!(op.request_uri.as_deref(), Some("/things/{Foo}"));

        let ShapeKind::Structure(out) = &set.get("OutputShape").expect("output").kind else {
            panic!("expected structure");
        };
        assert!(out.is_required("ListMember"));
        let list = out.member("ListMember").expect("list member");
        assert_eq!(list.location_name.as_deref(), Some("NamedList"));
        assert_eq!(
            out.member("When").and_then(|m| m.timestamp_format),
            Some(TimestampFormat::UnixTimestamp)
        );
        assert_eq!(out.member("Attrs").and_then(|m| m.flattened), Some(true));
    }

    #[test]
    fn test_should_reject_unsupported_type() {
        let err = ShapeSet::from_json(r#"{"shapes": {"U": {"type": "union"}}}"#)
            .expect_err("union unsupported");
        assert!(matches!(err, ModelError::UnsupportedType { ref type_name, .. } if type_name == "union"));
    }

    #[test]
    fn test_should_reject_list_without_member() {
        let err = ShapeSet::from_json(r#"{"shapes": {"L": {"type": "list"}}}"#)
            .expect_err("missing member");
        assert!(matches!(err, ModelError::MissingReference { part: "member", .. }));
    }

    #[test]
    fn test_should_reject_dangling_member_target() {
        let err = ShapeSet::from_json(
            r#"{"shapes": {"S": {"type": "structure", "members": {"A": {"shape": "Nope"}}}}}"#,
        )
        .expect_err("dangling target");
        assert!(matches!(err, ModelError::UnknownTarget { .. }));
    }

    #[test]
    fn test_should_reject_invalid_location() {
        let err = ShapeSet::from_json(
            r#"{"shapes": {
                "S": {"type": "string"},
                "T": {"type": "structure", "members": {"A": {"shape": "S", "location": "cookie"}}}
            }}"#,
        )
        .expect_err("invalid location");
        assert!(matches!(err, ModelError::InvalidTrait { name: "location", .. }));
    }

    #[test]
    fn test_should_parse_prefixed_namespace() {
        let set = ShapeSet::from_json(
            r#"{"shapes": {"S": {"type": "structure", "xmlNamespace": {"prefix": "xsi", "uri": "urn:x"}}}}"#,
        )
        .expect("namespace model");
        let ns = set.get("S").and_then(|s| s.xml_namespace.clone()).expect("namespace");
        assert_eq!(ns.attribute_name(), "xmlns:xsi");
    }

    #[test]
    fn test_should_reject_malformed_json() {
        let err = ShapeSet::from_json("{not json").expect_err("malformed");
        assert!(matches!(err, ModelError::Json(_)));
    }
}

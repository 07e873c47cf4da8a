//! Shape registry and member resolution.
//!
//! [`ShapeSet`] owns every shape of a service model. [`ShapeSet::resolve`] turns
//! a member reference into a [`ShapeModel`], the single resolved view the
//! transcoders dispatch on: target kind plus the effective wire name, flattening,
//! attribute flag, namespace, and timestamp format after applying defaults and
//! member-level overrides.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use crate::error::{ModelError, TranscodeError};
use crate::shape::{
    Location, MemberRef, ScalarKind, Shape, ShapeKind, ShapeType, TimestampFormat, XmlNamespace,
};

/// Default element name of unflattened list items.
pub const DEFAULT_MEMBER_NAME: &str = "member";
/// Default element name of unflattened map entries.
pub const DEFAULT_ENTRY_NAME: &str = "entry";
/// Default element name of map keys.
pub const DEFAULT_KEY_NAME: &str = "key";
/// Default element name of map values.
pub const DEFAULT_VALUE_NAME: &str = "value";

/// Wire protocol a service speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Form-encoded requests, XML responses with result wrappers.
    Query,
    /// EC2 flavor of the query protocol.
    Ec2Query,
    /// JSON bodies with an `X-Amz-Target` header.
    JsonRpc,
    /// REST routing with JSON bodies.
    RestJson,
    /// REST routing with XML bodies.
    RestXml,
}

impl Protocol {
    /// Parse the model spelling of a protocol.
    #[must_use]
    pub fn from_model_name(name: &str) -> Option<Self> {
        match name {
            "query" => Some(Self::Query),
            "ec2" => Some(Self::Ec2Query),
            "json" => Some(Self::JsonRpc),
            "rest-json" => Some(Self::RestJson),
            "rest-xml" => Some(Self::RestXml),
            _ => None,
        }
    }
}

/// Service-wide metadata from the model document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceMetadata {
    /// Wire protocol.
    pub protocol: Option<Protocol>,
    /// API version sent as `Version` by query protocols.
    pub api_version: Option<String>,
    /// Prefix of the JSON-RPC `X-Amz-Target` header.
    pub target_prefix: Option<String>,
    /// JSON-RPC content type version (`1.0`, `1.1`).
    pub json_version: Option<String>,
    /// Default XML namespace of response documents.
    pub xml_namespace: Option<String>,
    /// Service-wide timestamp format.
    pub timestamp_format: Option<TimestampFormat>,
}

/// An operation's input and output shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Operation name (e.g. `DescribeTable`).
    pub name: String,
    /// Input shape name.
    pub input: Option<String>,
    /// Output shape name.
    pub output: Option<String>,
    /// Result wrapper declared on the output reference.
    pub result_wrapper: Option<String>,
    /// HTTP method for REST protocols.
    pub http_method: Option<String>,
    /// Request URI template for REST protocols (`/{Bucket}/{Key+}`).
    pub request_uri: Option<String>,
}

impl Operation {
    /// An operation without input or output.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: None,
            output: None,
            result_wrapper: None,
            http_method: None,
            request_uri: None,
        }
    }

    /// Set the input shape.
    #[must_use]
    pub fn with_input(mut self, shape: impl Into<String>) -> Self {
        self.input = Some(shape.into());
        self
    }

    /// Set the output shape.
    #[must_use]
    pub fn with_output(mut self, shape: impl Into<String>) -> Self {
        self.output = Some(shape.into());
        self
    }

    /// Set the output result wrapper.
    #[must_use]
    pub fn with_result_wrapper(mut self, wrapper: impl Into<String>) -> Self {
        self.result_wrapper = Some(wrapper.into());
        self
    }

    /// Set the HTTP binding.
    #[must_use]
    pub fn with_http(mut self, method: impl Into<String>, request_uri: impl Into<String>) -> Self {
        self.http_method = Some(method.into());
        self.request_uri = Some(request_uri.into());
        self
    }
}

/// An immutable, validated registry of shapes.
#[derive(Debug, Clone, Default)]
pub struct ShapeSet {
    shapes: HashMap<String, Shape>,
    operations: BTreeMap<String, Operation>,
    metadata: ServiceMetadata,
}

impl ShapeSet {
    /// Start building a shape set.
    #[must_use]
    pub fn builder() -> ShapeSetBuilder {
        ShapeSetBuilder::default()
    }

    /// Look up a shape by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Shape> {
        self.shapes.get(name)
    }

    /// Look up an operation by name.
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    /// All operations, ordered by name.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    /// Service metadata.
    #[must_use]
    pub fn metadata(&self) -> &ServiceMetadata {
        &self.metadata
    }

    /// Number of shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether the set holds no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Resolve a top-level shape, such as an operation's output.
    pub fn root<'a>(&'a self, shape_name: &'a str) -> Result<ShapeModel<'a>, TranscodeError> {
        let shape = self.lookup(shape_name, shape_name)?;
        Ok(ShapeModel::new(shape_name, shape, None))
    }

    /// Resolve a member reference declared under `name`.
    pub fn resolve<'a>(
        &'a self,
        name: &'a str,
        member: &'a MemberRef,
    ) -> Result<ShapeModel<'a>, TranscodeError> {
        let shape = self.lookup(&member.target, name)?;
        Ok(ShapeModel::new(name, shape, Some(member)))
    }

    /// Resolve the item shape of a list model.
    pub fn list_item<'a>(&'a self, list: &ShapeModel<'a>) -> Result<ShapeModel<'a>, TranscodeError> {
        match &list.shape().kind {
            ShapeKind::List(l) => self.resolve(list.member_name(), &l.member),
            _ => Err(list.mismatch("a non-list shape")),
        }
    }

    /// Resolve the key and value shapes of a map model.
    pub fn map_entry<'a>(
        &'a self,
        map: &ShapeModel<'a>,
    ) -> Result<(ShapeModel<'a>, ShapeModel<'a>), TranscodeError> {
        match &map.shape().kind {
            ShapeKind::Map(m) => Ok((
                self.resolve(map.key_name(), &m.key)?,
                self.resolve(map.value_name(), &m.value)?,
            )),
            _ => Err(map.mismatch("a non-map shape")),
        }
    }

    fn lookup(&self, target: &str, location: &str) -> Result<&Shape, TranscodeError> {
        self.shapes
            .get(target)
            .ok_or_else(|| TranscodeError::UnknownShape {
                location: location.to_owned(),
                name: target.to_owned(),
            })
    }
}

/// Builder for [`ShapeSet`].
#[derive(Debug, Default)]
pub struct ShapeSetBuilder {
    shapes: HashMap<String, Shape>,
    operations: BTreeMap<String, Operation>,
    metadata: ServiceMetadata,
}

impl ShapeSetBuilder {
    /// Add the common scalar shapes (`String`, `Boolean`, `Integer`, `Long`,
    /// `Float`, `Double`, `Blob`, `Timestamp`).
    #[must_use]
    pub fn prelude(mut self) -> Self {
        for (name, kind) in [
            ("String", ScalarKind::String),
            ("Boolean", ScalarKind::Boolean),
            ("Integer", ScalarKind::Integer),
            ("Long", ScalarKind::Integer),
            ("Float", ScalarKind::Float),
            ("Double", ScalarKind::Float),
            ("Blob", ScalarKind::Blob),
            ("Timestamp", ScalarKind::Timestamp),
        ] {
            self.shapes
                .entry(name.to_owned())
                .or_insert_with(|| Shape::scalar(name, kind));
        }
        self
    }

    /// Add (or replace) a shape.
    #[must_use]
    pub fn shape(mut self, shape: Shape) -> Self {
        self.shapes.insert(shape.name.clone(), shape);
        self
    }

    /// Add (or replace) an operation.
    #[must_use]
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.insert(operation.name.clone(), operation);
        self
    }

    /// Set the service metadata.
    #[must_use]
    pub fn metadata(mut self, metadata: ServiceMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Validate every reference and freeze the set.
    pub fn build(self) -> Result<ShapeSet, ModelError> {
        for shape in self.shapes.values() {
            for member in shape.references() {
                if !self.shapes.contains_key(&member.target) {
                    return Err(ModelError::UnknownTarget {
                        shape: shape.name.clone(),
                        target: member.target.clone(),
                    });
                }
            }
            if let ShapeKind::Structure(s) = &shape.kind {
                let named = s.required.iter().chain(s.payload.iter());
                for member in named {
                    if s.member(member).is_none() {
                        return Err(ModelError::UnknownMember {
                            shape: shape.name.clone(),
                            member: member.clone(),
                        });
                    }
                }
            }
        }

        for op in self.operations.values() {
            for shape in op.input.iter().chain(op.output.iter()) {
                if !self.shapes.contains_key(shape) {
                    return Err(ModelError::UnknownOperationShape {
                        operation: op.name.clone(),
                        shape: shape.clone(),
                    });
                }
            }
        }

        tracing::debug!(
            shapes = self.shapes.len(),
            operations = self.operations.len(),
            "built shape set"
        );

        Ok(ShapeSet {
            shapes: self.shapes,
            operations: self.operations,
            metadata: self.metadata,
        })
    }
}

/// The resolved transcoding view of one value: its shape plus the hints of the
/// member that refers to it.
#[derive(Debug, Clone)]
pub struct ShapeModel<'a> {
    name: &'a str,
    shape: &'a Shape,
    member: Option<&'a MemberRef>,
    result_wrapper: Option<Cow<'a, str>>,
}

impl<'a> ShapeModel<'a> {
    fn new(name: &'a str, shape: &'a Shape, member: Option<&'a MemberRef>) -> Self {
        let result_wrapper = match &shape.kind {
            ShapeKind::Structure(s) => s.result_wrapper.as_deref().map(Cow::Borrowed),
            _ => None,
        };
        Self {
            name,
            shape,
            member,
            result_wrapper,
        }
    }

    /// Declared name of the member (or of the shape, at the root).
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The target shape.
    #[must_use]
    pub fn shape(&self) -> &'a Shape {
        self.shape
    }

    /// The target shape's kind.
    #[must_use]
    pub fn kind(&self) -> &'a ShapeKind {
        &self.shape.kind
    }

    /// The referring member, absent at the root.
    #[must_use]
    pub fn member_ref(&self) -> Option<&'a MemberRef> {
        self.member
    }

    /// Coarse shape type.
    #[must_use]
    pub fn shape_type(&self) -> ShapeType {
        self.shape.shape_type()
    }

    /// Scalar kind, if this is a scalar.
    #[must_use]
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.shape.kind {
            ShapeKind::Scalar(kind) => Some(kind),
            _ => None,
        }
    }

    /// Whether a list or map is flattened. The member hint wins over the shape.
    #[must_use]
    pub fn flattened(&self) -> bool {
        if let Some(flattened) = self.member.and_then(|m| m.flattened) {
            return flattened;
        }
        match &self.shape.kind {
            ShapeKind::List(l) => l.flattened,
            ShapeKind::Map(m) => m.flattened,
            ShapeKind::Scalar(_) | ShapeKind::Structure(_) => false,
        }
    }

    /// The element (or attribute, or JSON key) name of this value.
    ///
    /// Flattened lists repeat their item element at the parent level, so the
    /// list's member name is used when one is declared.
    #[must_use]
    pub fn wire_name(&self) -> &'a str {
        if self.flattened() {
            if let ShapeKind::List(l) = &self.shape.kind {
                if let Some(name) = l.member.location_name.as_deref() {
                    return name;
                }
            }
        }
        self.member
            .and_then(|m| m.location_name.as_deref())
            .or(self.shape.location_name.as_deref())
            .unwrap_or(self.name)
    }

    /// Name used by the EC2 query protocol.
    #[must_use]
    pub fn query_name(&self) -> Option<&'a str> {
        self.member.and_then(|m| m.query_name.as_deref())
    }

    /// Whether an explicit location name was declared on the member.
    #[must_use]
    pub fn location_name(&self) -> Option<&'a str> {
        self.member.and_then(|m| m.location_name.as_deref())
    }

    /// Element name of unflattened list items.
    #[must_use]
    pub fn member_name(&self) -> &'a str {
        match &self.shape.kind {
            ShapeKind::List(l) => l.member.location_name.as_deref().unwrap_or(DEFAULT_MEMBER_NAME),
            _ => DEFAULT_MEMBER_NAME,
        }
    }

    /// Element name of unflattened map entries.
    #[must_use]
    pub fn entry_name(&self) -> &'a str {
        match &self.shape.kind {
            ShapeKind::Map(m) => m.entry_name.as_deref().unwrap_or(DEFAULT_ENTRY_NAME),
            _ => DEFAULT_ENTRY_NAME,
        }
    }

    /// Element name of map keys.
    #[must_use]
    pub fn key_name(&self) -> &'a str {
        match &self.shape.kind {
            ShapeKind::Map(m) => m.key.location_name.as_deref().unwrap_or(DEFAULT_KEY_NAME),
            _ => DEFAULT_KEY_NAME,
        }
    }

    /// Element name of map values.
    #[must_use]
    pub fn value_name(&self) -> &'a str {
        match &self.shape.kind {
            ShapeKind::Map(m) => m.value.location_name.as_deref().unwrap_or(DEFAULT_VALUE_NAME),
            _ => DEFAULT_VALUE_NAME,
        }
    }

    /// Whether this value is carried in an XML attribute.
    #[must_use]
    pub fn is_attribute(&self) -> bool {
        self.member.is_some_and(|m| m.xml_attribute)
    }

    /// Namespace declared on this value's element.
    #[must_use]
    pub fn namespace(&self) -> Option<&'a XmlNamespace> {
        self.member
            .and_then(|m| m.xml_namespace.as_ref())
            .or(self.shape.xml_namespace.as_ref())
    }

    /// REST location of this value.
    #[must_use]
    pub fn location(&self) -> Location {
        self.member.map_or(Location::Body, |m| m.location)
    }

    /// Timestamp format, falling back to `default` when none is declared.
    #[must_use]
    pub fn timestamp_format_or(&self, default: TimestampFormat) -> TimestampFormat {
        self.member
            .and_then(|m| m.timestamp_format)
            .or(self.shape.timestamp_format)
            .unwrap_or(default)
    }

    /// Declared timestamp format, or ISO 8601.
    #[must_use]
    pub fn timestamp_format(&self) -> TimestampFormat {
        self.timestamp_format_or(TimestampFormat::Iso8601)
    }

    /// Outer element to unwrap before matching members.
    #[must_use]
    pub fn result_wrapper(&self) -> Option<&str> {
        self.result_wrapper.as_deref()
    }

    /// Override the result wrapper (query protocols derive it from the operation).
    #[must_use]
    pub fn with_result_wrapper(mut self, wrapper: impl Into<Cow<'a, str>>) -> Self {
        self.result_wrapper = Some(wrapper.into());
        self
    }

    /// The same model with the result wrapper cleared.
    #[must_use]
    pub fn without_result_wrapper(mut self) -> Self {
        self.result_wrapper = None;
        self
    }

    /// Structure members in declaration order; empty for other kinds.
    pub fn members(&self) -> impl Iterator<Item = (&'a str, &'a MemberRef)> + 'a {
        let members: &'a [(String, MemberRef)] = match &self.shape.kind {
            ShapeKind::Structure(s) => &s.members,
            _ => &[],
        };
        members.iter().map(|(name, member)| (name.as_str(), member))
    }

    /// Required structure members; empty for other kinds.
    #[must_use]
    pub fn required(&self) -> &'a [String] {
        match &self.shape.kind {
            ShapeKind::Structure(s) => &s.required,
            _ => &[],
        }
    }

    /// Payload member of a structure.
    #[must_use]
    pub fn payload(&self) -> Option<&'a str> {
        match &self.shape.kind {
            ShapeKind::Structure(s) => s.payload.as_deref(),
            _ => None,
        }
    }

    /// A [`TranscodeError::TypeMismatch`] for this value.
    #[must_use]
    pub fn mismatch(&self, found: impl Into<String>) -> TranscodeError {
        TranscodeError::TypeMismatch {
            location: self.wire_name().to_owned(),
            expected: self.shape_type(),
            found: found.into(),
        }
    }
}

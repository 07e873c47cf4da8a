//! Shape definitions: the static description of how a value is transcoded.
//!
//! A [`Shape`] is a named entry in a [`ShapeSet`](crate::ShapeSet). Members of
//! lists, maps, and structures point at their target shape by name through a
//! [`MemberRef`], which also carries the per-member wire hints (location name,
//! flattening, XML attribute, namespace, timestamp format). Referring to targets
//! by name is what makes self-referential structures expressible.

use std::fmt;

/// Scalar shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `true` / `false`.
    Boolean,
    /// Signed 64-bit integer (`integer`, `long`, `short`, `byte`).
    Integer,
    /// 64-bit float (`float`, `double`).
    Float,
    /// UTF-8 text (`string`, `character`, `enum`).
    String,
    /// Binary data, base64 on text wire formats.
    Blob,
    /// Point in time, encoded per [`TimestampFormat`].
    Timestamp,
}

/// Timestamp wire encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimestampFormat {
    /// `2015-01-25T08:00:00Z`.
    #[default]
    Iso8601,
    /// Seconds since the Unix epoch, optionally fractional.
    UnixTimestamp,
    /// `Sun, 25 Jan 2015 08:00:00 GMT`.
    Rfc822,
}

impl TimestampFormat {
    /// Parse the model spelling (`iso8601`, `unixTimestamp`, `rfc822`).
    #[must_use]
    pub fn from_model_name(name: &str) -> Option<Self> {
        match name {
            "iso8601" => Some(Self::Iso8601),
            "unixTimestamp" | "unix" => Some(Self::UnixTimestamp),
            "rfc822" => Some(Self::Rfc822),
            _ => None,
        }
    }

    /// The model spelling of this format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Iso8601 => "iso8601",
            Self::UnixTimestamp => "unixTimestamp",
            Self::Rfc822 => "rfc822",
        }
    }
}

impl fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a member lives in a REST message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Location {
    /// Inside the serialized body.
    #[default]
    Body,
    /// A single HTTP header.
    Header,
    /// All headers sharing a prefix, collected into a map.
    Headers,
    /// A query string parameter.
    QueryString,
    /// A label in the request URI.
    Uri,
    /// The HTTP status code of the response.
    StatusCode,
}

impl Location {
    /// Parse the model spelling of a location.
    #[must_use]
    pub fn from_model_name(name: &str) -> Option<Self> {
        match name {
            "header" => Some(Self::Header),
            "headers" => Some(Self::Headers),
            "querystring" => Some(Self::QueryString),
            "uri" => Some(Self::Uri),
            "statusCode" => Some(Self::StatusCode),
            "body" => Some(Self::Body),
            _ => None,
        }
    }
}

/// An XML namespace declaration attached at structure scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XmlNamespace {
    /// Namespace prefix; `None` declares the default namespace.
    pub prefix: Option<String>,
    /// Namespace URI.
    pub uri: String,
}

impl XmlNamespace {
    /// A default (`xmlns="..."`) namespace.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            prefix: None,
            uri: uri.into(),
        }
    }

    /// A prefixed (`xmlns:prefix="..."`) namespace.
    #[must_use]
    pub fn prefixed(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            uri: uri.into(),
        }
    }

    /// The attribute name used to declare this namespace.
    #[must_use]
    pub fn attribute_name(&self) -> String {
        match &self.prefix {
            Some(prefix) if !prefix.is_empty() => format!("xmlns:{prefix}"),
            _ => "xmlns".to_owned(),
        }
    }
}

/// A reference from a member (or list item, map key/value) to its target shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberRef {
    /// Name of the target shape in the owning [`ShapeSet`](crate::ShapeSet).
    pub target: String,
    /// REST location of this member.
    pub location: Location,
    /// Wire name override.
    pub location_name: Option<String>,
    /// EC2 query name override.
    pub query_name: Option<String>,
    /// Flattening override; `None` defers to the target shape.
    pub flattened: Option<bool>,
    /// Read from / written to an XML attribute instead of a child element.
    pub xml_attribute: bool,
    /// Namespace declared on this member's element.
    pub xml_namespace: Option<XmlNamespace>,
    /// Timestamp format override.
    pub timestamp_format: Option<TimestampFormat>,
}

impl MemberRef {
    /// Reference the shape named `target` with no hints.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Override the wire name.
    #[must_use]
    pub fn with_location_name(mut self, name: impl Into<String>) -> Self {
        self.location_name = Some(name.into());
        self
    }

    /// Override the EC2 query name.
    #[must_use]
    pub fn with_query_name(mut self, name: impl Into<String>) -> Self {
        self.query_name = Some(name.into());
        self
    }

    /// Route this member to a REST location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Force the flattening of a list or map member.
    #[must_use]
    pub fn flattened(mut self, flattened: bool) -> Self {
        self.flattened = Some(flattened);
        self
    }

    /// Mark this member as an XML attribute.
    #[must_use]
    pub fn xml_attribute(mut self) -> Self {
        self.xml_attribute = true;
        self
    }

    /// Declare a namespace on this member's element.
    #[must_use]
    pub fn with_namespace(mut self, namespace: XmlNamespace) -> Self {
        self.xml_namespace = Some(namespace);
        self
    }

    /// Override the timestamp format.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = Some(format);
        self
    }
}

/// A list shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListShape {
    /// Item reference; its `location_name` is the member name.
    pub member: MemberRef,
    /// Whether the items appear as repeated siblings without a wrapper.
    pub flattened: bool,
}

/// A map shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapShape {
    /// Key reference; its `location_name` is the key element name.
    pub key: MemberRef,
    /// Value reference; its `location_name` is the value element name.
    pub value: MemberRef,
    /// Whether the entries appear as repeated siblings without a wrapper.
    pub flattened: bool,
    /// Entry element name override for wrapped maps.
    pub entry_name: Option<String>,
}

/// A structure shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureShape {
    /// Members in declaration order.
    pub members: Vec<(String, MemberRef)>,
    /// Members that must be present once decoded.
    pub required: Vec<String>,
    /// Outer element to unwrap before matching members.
    pub result_wrapper: Option<String>,
    /// Member bound to the whole REST body.
    pub payload: Option<String>,
}

impl StructureShape {
    /// Find a member by its declared name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberRef> {
        self.members
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, member_ref)| member_ref)
    }

    /// Whether `name` is a required member.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// The closed set of shape kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeKind {
    /// A leaf value.
    Scalar(ScalarKind),
    /// An ordered sequence.
    List(ListShape),
    /// A string-keyed mapping.
    Map(MapShape),
    /// A record of named, optional members.
    Structure(StructureShape),
}

/// A named shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    /// Shape name, unique within its set.
    pub name: String,
    /// What kind of value this shape describes.
    pub kind: ShapeKind,
    /// Shape-level wire name, used when the referring member has none.
    pub location_name: Option<String>,
    /// Namespace declared at this shape's scope.
    pub xml_namespace: Option<XmlNamespace>,
    /// Shape-level timestamp format.
    pub timestamp_format: Option<TimestampFormat>,
}

impl Shape {
    fn with_kind(name: impl Into<String>, kind: ShapeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            location_name: None,
            xml_namespace: None,
            timestamp_format: None,
        }
    }

    /// A scalar shape.
    #[must_use]
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::with_kind(name, ShapeKind::Scalar(kind))
    }

    /// A wrapped list shape.
    #[must_use]
    pub fn list(name: impl Into<String>, member: MemberRef) -> Self {
        Self::with_kind(
            name,
            ShapeKind::List(ListShape {
                member,
                flattened: false,
            }),
        )
    }

    /// A wrapped map shape.
    #[must_use]
    pub fn map(name: impl Into<String>, key: MemberRef, value: MemberRef) -> Self {
        Self::with_kind(
            name,
            ShapeKind::Map(MapShape {
                key,
                value,
                flattened: false,
                entry_name: None,
            }),
        )
    }

    /// An empty structure shape.
    #[must_use]
    pub fn structure(name: impl Into<String>) -> Self {
        Self::with_kind(name, ShapeKind::Structure(StructureShape::default()))
    }

    /// Append a member to a structure. No-op for other kinds.
    #[must_use]
    pub fn with_member(mut self, name: impl Into<String>, member: MemberRef) -> Self {
        if let ShapeKind::Structure(s) = &mut self.kind {
            s.members.push((name.into(), member));
        }
        self
    }

    /// Mark a structure member as required. No-op for other kinds.
    #[must_use]
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        if let ShapeKind::Structure(s) = &mut self.kind {
            s.required.push(name.into());
        }
        self
    }

    /// Set a structure's result wrapper. No-op for other kinds.
    #[must_use]
    pub fn with_result_wrapper(mut self, wrapper: impl Into<String>) -> Self {
        if let ShapeKind::Structure(s) = &mut self.kind {
            s.result_wrapper = Some(wrapper.into());
        }
        self
    }

    /// Set a structure's payload member. No-op for other kinds.
    #[must_use]
    pub fn with_payload(mut self, member: impl Into<String>) -> Self {
        if let ShapeKind::Structure(s) = &mut self.kind {
            s.payload = Some(member.into());
        }
        self
    }

    /// Flatten a list or map. No-op for other kinds.
    #[must_use]
    pub fn flattened(mut self) -> Self {
        match &mut self.kind {
            ShapeKind::List(l) => l.flattened = true,
            ShapeKind::Map(m) => m.flattened = true,
            ShapeKind::Scalar(_) | ShapeKind::Structure(_) => {}
        }
        self
    }

    /// Override a wrapped map's entry element name. No-op for other kinds.
    #[must_use]
    pub fn with_entry_name(mut self, name: impl Into<String>) -> Self {
        if let ShapeKind::Map(m) = &mut self.kind {
            m.entry_name = Some(name.into());
        }
        self
    }

    /// Set the shape-level wire name.
    #[must_use]
    pub fn with_location_name(mut self, name: impl Into<String>) -> Self {
        self.location_name = Some(name.into());
        self
    }

    /// Declare a namespace at this shape's scope.
    #[must_use]
    pub fn with_namespace(mut self, namespace: XmlNamespace) -> Self {
        self.xml_namespace = Some(namespace);
        self
    }

    /// Set the shape-level timestamp format.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = Some(format);
        self
    }

    /// The coarse type of this shape, for diagnostics.
    #[must_use]
    pub fn shape_type(&self) -> ShapeType {
        ShapeType::of(&self.kind)
    }

    /// Every member reference this shape holds.
    pub(crate) fn references(&self) -> Vec<&MemberRef> {
        match &self.kind {
            ShapeKind::Scalar(_) => Vec::new(),
            ShapeKind::List(l) => vec![&l.member],
            ShapeKind::Map(m) => vec![&m.key, &m.value],
            ShapeKind::Structure(s) => s.members.iter().map(|(_, r)| r).collect(),
        }
    }
}

/// Coarse shape type, reported in errors as the "expected" kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    /// Boolean scalar.
    Boolean,
    /// Integer scalar.
    Integer,
    /// Float scalar.
    Float,
    /// String scalar.
    String,
    /// Blob scalar.
    Blob,
    /// Timestamp scalar.
    Timestamp,
    /// List.
    List,
    /// Map.
    Map,
    /// Structure.
    Structure,
}

impl ShapeType {
    /// The type of a shape kind.
    #[must_use]
    pub fn of(kind: &ShapeKind) -> Self {
        match kind {
            ShapeKind::Scalar(scalar) => Self::from(*scalar),
            ShapeKind::List(_) => Self::List,
            ShapeKind::Map(_) => Self::Map,
            ShapeKind::Structure(_) => Self::Structure,
        }
    }
}

impl From<ScalarKind> for ShapeType {
    fn from(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Boolean => Self::Boolean,
            ScalarKind::Integer => Self::Integer,
            ScalarKind::Float => Self::Float,
            ScalarKind::String => Self::String,
            ScalarKind::Blob => Self::Blob,
            ScalarKind::Timestamp => Self::Timestamp,
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Blob => "blob",
            Self::Timestamp => "timestamp",
            Self::List => "list",
            Self::Map => "map",
            Self::Structure => "structure",
        };
        f.write_str(s)
    }
}

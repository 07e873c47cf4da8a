//! Wire tree decoding: raw XML into an ordered, multi-valued element tree.
//!
//! [`parse_document`] makes a single forward pass over the token stream. Each
//! start tag opens a node, character data lands on the innermost open node, and
//! an end tag closes the innermost open node only when the local names match;
//! other end tags are ignored. Children are grouped by local name and keep their
//! document order within each group. The decoder knows nothing about shapes.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::Event;

use crate::error::XmlError;

/// How character data split by child elements or comments is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CharDataMode {
    /// Keep only the last contiguous run of character data.
    #[default]
    LastRun,
    /// Join every run in document order.
    Concatenate,
}

impl CharDataMode {
    /// Parse a configuration spelling (`last`, `concat`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "last" | "last_run" => Some(Self::LastRun),
            "concat" | "concatenate" => Some(Self::Concatenate),
            _ => None,
        }
    }
}

/// Options for [`parse_document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Character data handling.
    pub char_data: CharDataMode,
    /// Fail with [`XmlError::UnclosedElement`] when the document ends inside
    /// an element instead of returning what was built.
    pub strict_eof: bool,
}

/// One element of a decoded document.
///
/// The document itself is an unnamed node whose children are the top-level
/// elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    name: String,
    text: String,
    attributes: Vec<(String, String)>,
    children: BTreeMap<String, Vec<XmlNode>>,
}

impl XmlNode {
    /// An empty element with the given local name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A childless element holding only text, used to present an attribute
    /// value to the transcoder as if it were an element.
    #[must_use]
    pub fn text_node(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Append an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.push_child(child);
        self
    }

    /// Append a child element after any existing children of the same name.
    pub fn push_child(&mut self, child: XmlNode) {
        self.children.entry(child.name.clone()).or_default().push(child);
    }

    /// Local name; empty for the document node.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Character data.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attributes in document order, keyed by qualified name.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// The value of the first attribute whose local name is `local`.
    #[must_use]
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(qname, _)| local_part(qname) == local)
            .map(|(_, value)| value.as_str())
    }

    /// Children with the given local name, in document order.
    #[must_use]
    pub fn children(&self, name: &str) -> &[XmlNode] {
        self.children.get(name).map_or(&[], Vec::as_slice)
    }

    /// The first child with the given local name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children(name).first()
    }

    /// Follow a `/`-separated path of first children.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&XmlNode> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Distinct child names.
    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Every child element, grouped by name.
    pub fn elements(&self) -> impl Iterator<Item = &XmlNode> {
        self.children.values().flatten()
    }

    /// Whether the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

fn local_part(qname: &str) -> &str {
    qname.rsplit_once(':').map_or(qname, |(_, local)| local)
}

struct Frame {
    node: XmlNode,
    in_run: bool,
}

impl Frame {
    fn new(node: XmlNode) -> Self {
        Self {
            node,
            in_run: false,
        }
    }

    fn push_text(&mut self, text: &str, mode: CharDataMode) {
        if !self.in_run && mode == CharDataMode::LastRun {
            self.node.text.clear();
        }
        self.node.text.push_str(text);
        self.in_run = true;
    }
}

/// Decode a whole document into its wire tree.
///
/// The returned node is the unnamed document node; its children are the
/// top-level elements.
pub fn parse_document(xml: &[u8], options: &DecodeOptions) -> Result<XmlNode, XmlError> {
    let mut reader = Reader::from_reader(xml);
    let config = reader.config_mut();
    config.trim_text(false);
    config.expand_empty_elements = true;
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut stack = vec![Frame::new(XmlNode::default())];
    let mut elements: usize = 0;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                end_run(&mut stack);
                let local = e.local_name();
                let name = std::str::from_utf8(local.as_ref())?;
                let mut node = XmlNode::new(name);
                for attr in e.attributes() {
                    let attr = attr?;
                    let key = std::str::from_utf8(attr.key.as_ref())?;
                    let raw = std::str::from_utf8(&attr.value)?;
                    node.attributes
                        .push((key.to_owned(), unescape(raw)?.into_owned()));
                }
                stack.push(Frame::new(node));
                elements += 1;
            }
            Event::End(e) => {
                let closes_top = stack.len() > 1
                    && stack
                        .last()
                        .is_some_and(|top| top.node.name.as_bytes() == e.local_name().as_ref());
                if closes_top {
                    close_top(&mut stack);
                } else {
                    tracing::trace!(
                        name = %String::from_utf8_lossy(e.local_name().as_ref()),
                        "ignoring unmatched end tag"
                    );
                    end_run(&mut stack);
                }
            }
            Event::Text(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::Encoding(err.to_string()))?;
                let text = unescape(&decoded)?;
                push_text(&mut stack, &text, options.char_data);
            }
            Event::GeneralRef(e) => {
                let name = e
                    .decode()
                    .map_err(|err| XmlError::Encoding(err.to_string()))?;
                let reference = format!("&{name};");
                let resolved = unescape(&reference)?;
                push_text(&mut stack, &resolved, options.char_data);
            }
            Event::CData(e) => {
                end_run(&mut stack);
                let text = std::str::from_utf8(&e)?;
                push_text(&mut stack, text, options.char_data);
                end_run(&mut stack);
            }
            Event::Eof => break,
            _ => end_run(&mut stack),
        }
    }

    while stack.len() > 1 {
        if options.strict_eof {
            let name = stack.last().map(|f| f.node.name.clone()).unwrap_or_default();
            return Err(XmlError::UnclosedElement(name));
        }
        tracing::debug!(depth = stack.len() - 1, "document ended inside an open element");
        close_top(&mut stack);
    }

    tracing::trace!(elements, "decoded wire tree");
    Ok(stack.pop().map(|frame| frame.node).unwrap_or_default())
}

fn push_text(stack: &mut [Frame], text: &str, mode: CharDataMode) {
    if let Some(top) = stack.last_mut() {
        top.push_text(text, mode);
    }
}

fn end_run(stack: &mut [Frame]) {
    if let Some(top) = stack.last_mut() {
        top.in_run = false;
    }
}

fn close_top(stack: &mut Vec<Frame>) {
    if let Some(frame) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.node.push_child(frame.node);
            parent.in_run = false;
        }
    }
}

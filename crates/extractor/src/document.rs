use crate::error::{ExtractError, Result};
use roxmltree::{NodeType, ParsingOptions};
use std::fmt;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A parsed POM document.
///
/// Borrows the source text for its whole lifetime. Each extraction call owns
/// its own document; nothing is cached between calls.
pub struct PomDocument<'input> {
    inner: roxmltree::Document<'input>,
}

/// Parse XML text into a document.
///
/// DTDs are rejected outright, so no entity expansion or external fetch can
/// ever be triggered by the input.
pub fn parse(xml: &str) -> Result<PomDocument<'_>> {
    let options = ParsingOptions {
        allow_dtd: false,
        ..ParsingOptions::default()
    };

    let inner = roxmltree::Document::parse_with_options(xml, options)
        .map_err(|e| ExtractError::parse(e.to_string()))?;

    log::trace!("Parsed XML document ({} bytes)", xml.len());
    Ok(PomDocument { inner })
}

/// Parse XML from raw bytes (UTF-8, optional BOM).
pub fn parse_bytes(data: &[u8]) -> Result<PomDocument<'_>> {
    parse(decode_xml(data)?)
}

/// Decode raw POM bytes as UTF-8, dropping a leading BOM
pub fn decode_xml(data: &[u8]) -> Result<&str> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    std::str::from_utf8(data).map_err(|e| ExtractError::parse(format!("invalid UTF-8: {e}")))
}

impl<'input> PomDocument<'input> {
    /// The document root (parent of the root element)
    #[must_use]
    pub fn root(&self) -> MatchedNode<'_, 'input> {
        MatchedNode::node(self.inner.root())
    }

    /// Local name of the root element, `project` for a Maven POM
    #[must_use]
    pub fn root_element_name(&self) -> &str {
        self.inner.root_element().tag_name().name()
    }
}

impl fmt::Debug for PomDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PomDocument")
            .field("root_element", &self.root_element_name())
            .finish()
    }
}

/// XPath node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
}

#[derive(Clone, Copy)]
enum NodeRef<'a, 'input: 'a> {
    Node(roxmltree::Node<'a, 'input>),
    Attribute {
        owner: roxmltree::Node<'a, 'input>,
        index: usize,
    },
}

/// A node selected from a [`PomDocument`].
///
/// This is a borrowed handle; it never outlives the document it points into.
#[derive(Clone, Copy)]
pub struct MatchedNode<'a, 'input: 'a> {
    inner: NodeRef<'a, 'input>,
}

impl<'a, 'input: 'a> MatchedNode<'a, 'input> {
    pub(crate) fn node(node: roxmltree::Node<'a, 'input>) -> Self {
        Self {
            inner: NodeRef::Node(node),
        }
    }

    pub(crate) fn attribute(owner: roxmltree::Node<'a, 'input>, index: usize) -> Self {
        Self {
            inner: NodeRef::Attribute { owner, index },
        }
    }

    /// Underlying tree node, or `None` for attributes
    pub(crate) fn as_tree_node(&self) -> Option<roxmltree::Node<'a, 'input>> {
        match self.inner {
            NodeRef::Node(node) => Some(node),
            NodeRef::Attribute { .. } => None,
        }
    }

    /// Element that owns this attribute, or `None` for tree nodes
    pub(crate) fn attribute_owner(&self) -> Option<roxmltree::Node<'a, 'input>> {
        match self.inner {
            NodeRef::Node(_) => None,
            NodeRef::Attribute { owner, .. } => Some(owner),
        }
    }

    fn attr(&self) -> Option<roxmltree::Attribute<'a, 'input>> {
        match self.inner {
            NodeRef::Node(_) => None,
            NodeRef::Attribute { owner, index } => owner.attributes().nth(index),
        }
    }

    /// Position in document order. Attributes sort after their owner element
    /// and before its children.
    pub(crate) fn order_key(&self) -> (u32, usize) {
        match self.inner {
            NodeRef::Node(node) => (node.id().get(), 0),
            NodeRef::Attribute { owner, index } => (owner.id().get(), index + 1),
        }
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self.inner {
            NodeRef::Attribute { .. } => NodeKind::Attribute,
            NodeRef::Node(node) => match node.node_type() {
                NodeType::Root => NodeKind::Root,
                NodeType::Element => NodeKind::Element,
                NodeType::Text => NodeKind::Text,
                NodeType::Comment => NodeKind::Comment,
                NodeType::PI => NodeKind::ProcessingInstruction,
            },
        }
    }

    /// Local (unprefixed) name. Empty for root, text and comment nodes;
    /// the target for processing instructions.
    #[must_use]
    pub fn local_name(&self) -> &'a str {
        match self.inner {
            NodeRef::Attribute { .. } => self.attr().map_or("", |a| a.name()),
            NodeRef::Node(node) => match node.node_type() {
                NodeType::Element => node.tag_name().name(),
                NodeType::PI => node.pi().map_or("", |pi| pi.target),
                _ => "",
            },
        }
    }

    /// Namespace URI, empty when the node has none
    #[must_use]
    pub fn namespace_uri(&self) -> &'a str {
        match self.inner {
            NodeRef::Attribute { .. } => self.attr().and_then(|a| a.namespace()).unwrap_or(""),
            NodeRef::Node(node) if node.is_element() => node.tag_name().namespace().unwrap_or(""),
            NodeRef::Node(_) => "",
        }
    }

    /// Qualified name as written in the source (`prefix:local` or `local`)
    #[must_use]
    pub fn qualified_name(&self) -> String {
        let local = self.local_name();
        let namespace = self.namespace_uri();
        if namespace.is_empty() {
            return local.to_string();
        }

        let scope = match self.inner {
            NodeRef::Node(node) => node,
            NodeRef::Attribute { owner, .. } => owner,
        };
        match scope.lookup_prefix(namespace) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
            _ => local.to_string(),
        }
    }

    /// XPath string value: all descendant text for roots and elements, the
    /// raw value otherwise. Whitespace is kept exactly as in the source.
    #[must_use]
    pub fn text_content(&self) -> String {
        match self.inner {
            NodeRef::Attribute { .. } => self.attr().map(|a| a.value().to_string()).unwrap_or_default(),
            NodeRef::Node(node) => match node.node_type() {
                NodeType::Root | NodeType::Element => node
                    .descendants()
                    .filter(|n| n.is_text())
                    .filter_map(|n| n.text())
                    .collect(),
                NodeType::Text | NodeType::Comment => node.text().unwrap_or("").to_string(),
                NodeType::PI => node
                    .pi()
                    .and_then(|pi| pi.value)
                    .unwrap_or("")
                    .to_string(),
            },
        }
    }
}

impl PartialEq for MatchedNode<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}

impl Eq for MatchedNode<'_, '_> {}

impl fmt::Debug for MatchedNode<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchedNode")
            .field("kind", &self.kind())
            .field("name", &self.qualified_name())
            .finish()
    }
}

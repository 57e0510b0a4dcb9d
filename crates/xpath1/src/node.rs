//! The node type the engine actually traverses: a DOM node, or a namespace node
//! synthesised for the `namespace` axis.

use crate::datasource::{DataSourceNode, NodeType, QName};
use std::iter;

/// A namespace binding in scope on an element, surfaced as an XPath namespace node.
/// The default namespace has an empty `prefix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceNode<'a, N> {
    pub owner: N,
    pub prefix: &'a str,
    pub uri: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XPathNode<'a, N> {
    Node(N),
    Namespace(NamespaceNode<'a, N>),
}

impl<'a, N> From<N> for XPathNode<'a, N> {
    fn from(node: N) -> Self {
        XPathNode::Node(node)
    }
}

impl<'a, N: DataSourceNode<'a>> XPathNode<'a, N> {
    /// The underlying DOM node, or `None` for a namespace node.
    pub fn as_node(&self) -> Option<N> {
        match self {
            XPathNode::Node(n) => Some(*n),
            XPathNode::Namespace(_) => None,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            XPathNode::Node(n) => n.node_type(),
            XPathNode::Namespace(_) => NodeType::Namespace,
        }
    }

    /// The expanded name; for a namespace node the local part is its prefix.
    pub fn name(&self) -> Option<QName<'a>> {
        match self {
            XPathNode::Node(n) => n.name(),
            XPathNode::Namespace(ns) => Some(QName {
                prefix: None,
                local_part: ns.prefix,
            }),
        }
    }

    pub fn namespace_uri(&self) -> Option<&'a str> {
        match self {
            XPathNode::Node(n) => n.namespace_uri(),
            XPathNode::Namespace(_) => None,
        }
    }

    pub fn string_value(&self) -> String {
        match self {
            XPathNode::Node(n) => n.string_value(),
            XPathNode::Namespace(ns) => ns.uri.to_string(),
        }
    }

    pub fn parent(&self) -> Option<Self> {
        match self {
            XPathNode::Node(n) => n.parent().map(XPathNode::Node),
            XPathNode::Namespace(ns) => Some(XPathNode::Node(ns.owner)),
        }
    }

    pub fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XPathNode::Node(n) => Box::new(n.children().map(XPathNode::Node)),
            XPathNode::Namespace(_) => Box::new(iter::empty()),
        }
    }

    pub fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XPathNode::Node(n) if n.node_type() == NodeType::Element => {
                Box::new(n.attributes().map(XPathNode::Node))
            }
            _ => Box::new(iter::empty()),
        }
    }

    pub fn next_sibling(&self) -> Option<Self> {
        self.as_node()?.next_sibling().map(XPathNode::Node)
    }

    pub fn previous_sibling(&self) -> Option<Self> {
        self.as_node()?.previous_sibling().map(XPathNode::Node)
    }

    /// Attribute and namespace nodes hang off their element rather than being children.
    pub fn is_attached(&self) -> bool {
        matches!(self.node_type(), NodeType::Attribute | NodeType::Namespace)
    }
}

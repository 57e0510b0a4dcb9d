//! A `roxmltree` document exposed through the engine's node interface.
use htmlsync_xpath1::datasource::XML_NAMESPACE;
use htmlsync_xpath1::{DataSourceNode, NodeType, QName};
use roxmltree::{Node, ParsingOptions};
use std::ops::Range;

/// A parsed document whose nodes can be handed to the XPath engine.
pub struct HtmlDocument<'input> {
    doc: roxmltree::Document<'input>,
}

impl<'input> HtmlDocument<'input> {
    /// Parses well-formed markup. A leading `<!DOCTYPE html>` is accepted.
    pub fn parse(text: &'input str) -> Result<Self, roxmltree::Error> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(text, options)?;
        Ok(Self { doc })
    }

    /// The document node.
    pub fn root(&self) -> XmlNode<'_, '_> {
        XmlNode::Tree(self.doc.root())
    }

    pub fn source(&self) -> &'input str {
        self.doc.input_text()
    }
}

/// A node of the parsed tree, or one of an element's attributes.
///
/// `roxmltree` stores attributes as data on their element, so an attribute is addressed by
/// its owner and its index in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XmlNode<'a, 'input> {
    Tree(Node<'a, 'input>),
    Attribute { owner: Node<'a, 'input>, index: usize },
}

impl<'a, 'input> XmlNode<'a, 'input> {
    pub fn tree_node(&self) -> Option<Node<'a, 'input>> {
        match self {
            XmlNode::Tree(node) => Some(*node),
            XmlNode::Attribute { .. } => None,
        }
    }

    /// Byte range of the node in the source text. For an attribute this spans `name="value"`.
    pub fn text_range(&self) -> Range<usize> {
        match self {
            XmlNode::Tree(node) => node.range(),
            XmlNode::Attribute { owner, index } => owner
                .attributes()
                .nth(*index)
                .map(|attr| attr.range())
                .unwrap_or_else(|| owner.range()),
        }
    }

    /// The local name of an element.
    pub fn tag_name(&self) -> Option<&'input str> {
        match self {
            XmlNode::Tree(node) if node.is_element() => Some(node.tag_name().name()),
            _ => None,
        }
    }

    /// The value of an un-namespaced attribute of an element.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.tree_node()?.attribute(name)
    }
}

impl<'a> DataSourceNode<'a> for XmlNode<'a, 'a> {
    fn node_type(&self) -> NodeType {
        match self {
            XmlNode::Tree(node) => match node.node_type() {
                roxmltree::NodeType::Root => NodeType::Root,
                roxmltree::NodeType::Element => NodeType::Element,
                roxmltree::NodeType::PI => NodeType::ProcessingInstruction,
                roxmltree::NodeType::Comment => NodeType::Comment,
                // CDATA sections are merged into text by the parser.
                roxmltree::NodeType::Text => NodeType::Text,
            },
            XmlNode::Attribute { .. } => NodeType::Attribute,
        }
    }

    fn name(&self) -> Option<QName<'a>> {
        match self {
            XmlNode::Tree(node) if node.is_element() => {
                let tag = node.tag_name();
                Some(QName {
                    prefix: tag.namespace().and_then(|uri| node.lookup_prefix(uri)),
                    local_part: tag.name(),
                })
            }
            XmlNode::Tree(node) => node.pi().map(|pi| QName {
                prefix: None,
                local_part: pi.target,
            }),
            XmlNode::Attribute { owner, index } => {
                owner.attributes().nth(*index).map(|attr| QName {
                    prefix: attr.namespace().and_then(|uri| owner.lookup_prefix(uri)),
                    local_part: attr.name(),
                })
            }
        }
    }

    fn namespace_uri(&self) -> Option<&'a str> {
        match self {
            XmlNode::Tree(node) if node.is_element() => node.tag_name().namespace(),
            XmlNode::Tree(_) => None,
            XmlNode::Attribute { owner, index } => {
                owner.attributes().nth(*index).and_then(|attr| attr.namespace())
            }
        }
    }

    fn string_value(&self) -> String {
        match self {
            XmlNode::Tree(node) => match node.node_type() {
                roxmltree::NodeType::Root | roxmltree::NodeType::Element => node
                    .descendants()
                    .filter(|n| n.is_text())
                    .filter_map(|n| n.text())
                    .collect(),
                roxmltree::NodeType::PI => node
                    .pi()
                    .and_then(|pi| pi.value)
                    .unwrap_or_default()
                    .to_string(),
                roxmltree::NodeType::Comment | roxmltree::NodeType::Text => {
                    node.text().unwrap_or_default().to_string()
                }
            },
            XmlNode::Attribute { owner, index } => owner
                .attributes()
                .nth(*index)
                .map(|attr| attr.value().to_string())
                .unwrap_or_default(),
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Tree(node) if node.is_element() => {
                let owner = *node;
                let count = node.attributes().len();
                Box::new((0..count).map(move |index| XmlNode::Attribute { owner, index }))
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Tree(node) => Box::new(node.children().map(XmlNode::Tree)),
            XmlNode::Attribute { .. } => Box::new(std::iter::empty()),
        }
    }

    fn parent(&self) -> Option<Self> {
        match self {
            XmlNode::Tree(node) => node.parent().map(XmlNode::Tree),
            XmlNode::Attribute { owner, .. } => Some(XmlNode::Tree(*owner)),
        }
    }

    fn first_child(&self) -> Option<Self> {
        self.tree_node()?.first_child().map(XmlNode::Tree)
    }

    fn next_sibling(&self) -> Option<Self> {
        self.tree_node()?.next_sibling().map(XmlNode::Tree)
    }

    fn previous_sibling(&self) -> Option<Self> {
        self.tree_node()?.prev_sibling().map(XmlNode::Tree)
    }

    /// `roxmltree` records every in-scope binding on each element, so the bindings the
    /// element declares itself are the ones its parent does not already carry.
    fn namespace_declarations(&self) -> Vec<(Option<&'a str>, &'a str)> {
        let XmlNode::Tree(node) = self else {
            return Vec::new();
        };
        let inherited = node.parent_element();
        node.namespaces()
            .filter(|ns| ns.name() != Some("xml"))
            .filter(|ns| {
                inherited.and_then(|parent| parent.lookup_namespace_uri(ns.name()))
                    != Some(ns.uri())
            })
            .map(|ns| (ns.name(), ns.uri()))
            .collect()
    }

    /// roxmltree allocates node ids in document order.
    fn document_position(&self) -> Option<(usize, usize)> {
        match self {
            XmlNode::Tree(node) => Some((node.id().get_usize(), 0)),
            XmlNode::Attribute { owner, index } => Some((owner.id().get_usize(), index + 1)),
        }
    }

    fn element_by_id(&self, id: &str) -> Option<Self> {
        let XmlNode::Tree(node) = self else {
            return None;
        };
        node.document()
            .descendants()
            .find(|n| {
                n.attribute("id") == Some(id) || n.attribute((XML_NAMESPACE, "id")) == Some(id)
            })
            .map(XmlNode::Tree)
    }
}

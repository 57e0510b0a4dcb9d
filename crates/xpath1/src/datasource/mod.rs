//! Defines the core abstraction for a navigable, read-only document tree.
use std::fmt;
use std::hash::Hash;

/// The namespace URI permanently bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
/// The namespace URI of namespace declaration attributes.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// A qualified name, consisting of an optional prefix and a local part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    pub prefix: Option<&'a str>,
    pub local_part: &'a str,
}

impl fmt::Display for QName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local_part),
            None => f.write_str(self.local_part),
        }
    }
}

/// The type of a node in the document tree, aligned with the XPath 1.0 data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// The document node.
    Root,
    Element,
    Attribute,
    Text,
    CData,
    Comment,
    ProcessingInstruction,
    /// Only produced by the engine itself, for nodes on the `namespace` axis.
    Namespace,
}

/// The contract a DOM layer fulfils so the engine can walk its nodes.
///
/// Implementations are cheap handles (`Copy`) whose equality is node identity.
/// `'a` is the lifetime of the underlying document.
pub trait DataSourceNode<'a>: fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + 'a {
    /// The type of the node (Element, Text, Attribute, etc.).
    fn node_type(&self) -> NodeType;

    /// The qualified name of the node (e.g., `svg:rect`). Returns `None` for node
    /// types that do not have names, such as text or document nodes. For a processing-
    /// instruction, this is its target.
    fn name(&self) -> Option<QName<'a>>;

    /// The namespace URI of an element or attribute, if it has one.
    fn namespace_uri(&self) -> Option<&'a str> {
        None
    }

    /// The string value of the node, as defined by the XPath 1.0 `string()` function.
    /// - For a text or CDATA node, this is its content.
    /// - For an element or document, this is the concatenation of the string values of all
    ///   its descendant text nodes.
    /// - For an attribute, this is its value.
    /// - For a comment or processing instruction, this is its content.
    fn string_value(&self) -> String;

    /// An iterator over the attribute nodes of this node, in source order.
    /// Namespace declarations are not attributes for the purposes of the engine.
    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// An iterator over the child nodes of this node.
    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// The parent node. For an attribute, this is its owner element.
    fn parent(&self) -> Option<Self>;

    fn first_child(&self) -> Option<Self> {
        self.children().next()
    }

    /// The default rescans the parent's children on every call, which makes the sibling
    /// and `following` axes quadratic. Adapters with sibling links should override it.
    fn next_sibling(&self) -> Option<Self> {
        if self.node_type() == NodeType::Attribute {
            return None;
        }
        let parent = self.parent()?;
        let mut siblings = parent.children().skip_while(|child| child != self);
        siblings.next();
        siblings.next()
    }

    /// Rescans the parent's children like [`DataSourceNode::next_sibling`].
    fn previous_sibling(&self) -> Option<Self> {
        if self.node_type() == NodeType::Attribute {
            return None;
        }
        let parent = self.parent()?;
        let mut previous = None;
        for child in parent.children() {
            if child == *self {
                return previous;
            }
            previous = Some(child);
        }
        None
    }

    /// The namespace declarations made on this element itself, as `(prefix, uri)` pairs.
    /// The default namespace has no prefix; an empty URI undeclares it.
    fn namespace_declarations(&self) -> Vec<(Option<&'a str>, &'a str)> {
        Vec::new()
    }

    /// A fast path for `id()`, called on the document node. `None` falls back to a tree scan.
    fn element_by_id(&self, _id: &str) -> Option<Self> {
        None
    }

    /// A constant-time document-order key: an index that grows in document order across the
    /// tree nodes of one document (for an attribute, its owner's index), paired with the
    /// attribute's 1-based position on its owner (`0` for other nodes).
    /// Keys are only compared between nodes of the same document. `None` makes the engine
    /// order nodes by walking the tree.
    fn document_position(&self) -> Option<(usize, usize)> {
        None
    }
}

// Test utilities - publicly available for integration testing in downstream crates
pub mod tests {
    use super::*;
    use std::hash::Hasher;

    #[derive(Debug, Clone)]
    struct MockNodeData<'a> {
        node_type: NodeType,
        name: Option<QName<'a>>,
        namespace_uri: Option<&'a str>,
        value: String,
        children: Vec<usize>,
        attributes: Vec<usize>,
        namespaces: Vec<(Option<&'a str>, &'a str)>,
        parent: Option<usize>,
        /// Index in the parent's `children` or `attributes`.
        position: usize,
    }

    /// An in-memory tree, built bottom-up through the `add_*` methods.
    /// Node `0` is always the document node.
    #[derive(Debug)]
    pub struct MockTree<'a> {
        nodes: Vec<MockNodeData<'a>>,
        order_keys: bool,
    }

    /// A node handle that holds a reference to its tree so it can navigate itself.
    #[derive(Debug, Clone, Copy)]
    pub struct MockNode<'a> {
        pub id: usize,
        pub tree: &'a MockTree<'a>,
    }

    impl<'a> PartialEq for MockNode<'a> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id && std::ptr::eq(self.tree, other.tree)
        }
    }
    impl<'a> Eq for MockNode<'a> {}

    impl<'a> Hash for MockNode<'a> {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.id.hash(state);
            std::ptr::hash(self.tree, state);
        }
    }

    fn split_name(name: &str) -> QName<'_> {
        match name.split_once(':') {
            Some((prefix, local_part)) => QName {
                prefix: Some(prefix),
                local_part,
            },
            None => QName {
                prefix: None,
                local_part: name,
            },
        }
    }

    impl<'a> Default for MockTree<'a> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<'a> MockTree<'a> {
        pub fn new() -> Self {
            let document = MockNodeData {
                node_type: NodeType::Root,
                name: None,
                namespace_uri: None,
                value: String::new(),
                children: vec![],
                attributes: vec![],
                namespaces: vec![],
                parent: None,
                position: 0,
            };
            Self {
                nodes: vec![document],
                order_keys: false,
            }
        }

        pub fn node(&'a self, id: usize) -> MockNode<'a> {
            MockNode { id, tree: self }
        }

        pub fn root(&'a self) -> MockNode<'a> {
            self.node(0)
        }

        /// Makes nodes report `document_position` keys. Only valid for trees built in
        /// document order, where node ids grow along it.
        pub fn enable_order_keys(&mut self) {
            self.order_keys = true;
        }

        fn push(&mut self, parent: usize, data: MockNodeData<'a>, as_attribute: bool) -> usize {
            let id = self.nodes.len();
            let siblings = if as_attribute {
                &self.nodes[parent].attributes
            } else {
                &self.nodes[parent].children
            };
            let position = siblings.len();
            self.nodes.push(MockNodeData {
                parent: Some(parent),
                position,
                ..data
            });
            if as_attribute {
                self.nodes[parent].attributes.push(id);
            } else {
                self.nodes[parent].children.push(id);
            }
            id
        }

        fn leaf(node_type: NodeType, name: Option<QName<'a>>, value: &str) -> MockNodeData<'a> {
            MockNodeData {
                node_type,
                name,
                namespace_uri: None,
                value: value.to_string(),
                children: vec![],
                attributes: vec![],
                namespaces: vec![],
                parent: None,
                position: 0,
            }
        }

        pub fn add_element(&mut self, parent: usize, name: &'a str) -> usize {
            self.add_element_ns(parent, name, None)
        }

        pub fn add_element_ns(
            &mut self,
            parent: usize,
            name: &'a str,
            namespace_uri: Option<&'a str>,
        ) -> usize {
            let mut data = Self::leaf(NodeType::Element, Some(split_name(name)), "");
            data.namespace_uri = namespace_uri;
            self.push(parent, data, false)
        }

        pub fn add_attribute(&mut self, owner: usize, name: &'a str, value: &str) -> usize {
            let qname = split_name(name);
            let mut data = Self::leaf(NodeType::Attribute, Some(qname), value);
            if qname.prefix == Some("xml") {
                data.namespace_uri = Some(XML_NAMESPACE);
            }
            self.push(owner, data, true)
        }

        /// Records an `xmlns` (prefix `None`) or `xmlns:prefix` declaration on an element.
        pub fn declare_namespace(&mut self, element: usize, prefix: Option<&'a str>, uri: &'a str) {
            self.nodes[element].namespaces.push((prefix, uri));
        }

        pub fn add_text(&mut self, parent: usize, value: &str) -> usize {
            self.push(parent, Self::leaf(NodeType::Text, None, value), false)
        }

        pub fn add_cdata(&mut self, parent: usize, value: &str) -> usize {
            self.push(parent, Self::leaf(NodeType::CData, None, value), false)
        }

        pub fn add_comment(&mut self, parent: usize, value: &str) -> usize {
            self.push(parent, Self::leaf(NodeType::Comment, None, value), false)
        }

        pub fn add_processing_instruction(
            &mut self,
            parent: usize,
            target: &'a str,
            value: &str,
        ) -> usize {
            let name = Some(QName {
                prefix: None,
                local_part: target,
            });
            let data = Self::leaf(NodeType::ProcessingInstruction, name, value);
            self.push(parent, data, false)
        }

        fn collect_text(&self, id: usize, out: &mut String) {
            for &child in &self.nodes[id].children {
                let data = &self.nodes[child];
                match data.node_type {
                    NodeType::Text | NodeType::CData => out.push_str(&data.value),
                    NodeType::Element => self.collect_text(child, out),
                    _ => {}
                }
            }
        }
    }

    impl<'a> DataSourceNode<'a> for MockNode<'a> {
        fn node_type(&self) -> NodeType {
            self.tree.nodes[self.id].node_type
        }

        fn name(&self) -> Option<QName<'a>> {
            self.tree.nodes[self.id].name
        }

        fn namespace_uri(&self) -> Option<&'a str> {
            self.tree.nodes[self.id].namespace_uri
        }

        fn string_value(&self) -> String {
            match self.node_type() {
                NodeType::Root | NodeType::Element => {
                    let mut out = String::new();
                    self.tree.collect_text(self.id, &mut out);
                    out
                }
                _ => self.tree.nodes[self.id].value.clone(),
            }
        }

        fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(
                tree.nodes[self.id]
                    .attributes
                    .iter()
                    .map(move |&id| MockNode { id, tree }),
            )
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(
                tree.nodes[self.id]
                    .children
                    .iter()
                    .map(move |&id| MockNode { id, tree }),
            )
        }

        fn parent(&self) -> Option<Self> {
            self.tree.nodes[self.id].parent.map(|id| MockNode {
                id,
                tree: self.tree,
            })
        }

        fn document_position(&self) -> Option<(usize, usize)> {
            if !self.tree.order_keys {
                return None;
            }
            let data = &self.tree.nodes[self.id];
            match (data.node_type, data.parent) {
                (NodeType::Attribute, Some(owner)) => Some((owner, data.position + 1)),
                _ => Some((self.id, 0)),
            }
        }

        fn next_sibling(&self) -> Option<Self> {
            self.sibling_at(|position| position.checked_add(1))
        }

        fn previous_sibling(&self) -> Option<Self> {
            self.sibling_at(|position| position.checked_sub(1))
        }

        fn namespace_declarations(&self) -> Vec<(Option<&'a str>, &'a str)> {
            self.tree.nodes[self.id].namespaces.clone()
        }
    }

    impl<'a> MockNode<'a> {
        fn sibling_at(&self, step: impl Fn(usize) -> Option<usize>) -> Option<Self> {
            let data = &self.tree.nodes[self.id];
            if data.node_type == NodeType::Attribute {
                return None;
            }
            let parent = &self.tree.nodes[data.parent?];
            let id = *parent.children.get(step(data.position)?)?;
            Some(MockNode {
                id,
                tree: self.tree,
            })
        }
    }

    /// Creates a simple mock tree for testing:
    /// ```text
    /// <root>                                  <!-- document 0 -->
    ///   <para id="p1" xml:lang="en">Hello</para> <!-- id 1, attr 2&3, text 4 -->
    ///   <!-- comment node -->                 <!-- id 5 -->
    ///   <div/>                                <!-- id 6 -->
    ///   <?pi-target pi-value?>                <!-- id 7 -->
    ///   <para>World</para>                    <!-- id 8, text 9 -->
    /// ```
    pub fn create_test_tree<'a>() -> MockTree<'a> {
        let mut tree = MockTree::new();
        let para = tree.add_element(0, "para");
        tree.add_attribute(para, "id", "p1");
        tree.add_attribute(para, "xml:lang", "en");
        tree.add_text(para, "Hello");
        tree.add_comment(0, " comment node ");
        tree.add_element(0, "div");
        tree.add_processing_instruction(0, "pi-target", "pi-value");
        let para = tree.add_element(0, "para");
        tree.add_text(para, "World");
        tree
    }

    /// A small HTML-shaped document used by path, predicate and axis tests:
    /// ```text
    /// <html>                                  <!-- 1 -->
    ///   <body>                                <!-- 2 -->
    ///     <ul>                                <!-- 3 -->
    ///       <li class="a">one</li>            <!-- 4, attr 5, text 6 -->
    ///       <li class="b">two</li>            <!-- 7, attr 8, text 9 -->
    ///       <li>three</li>                    <!-- 10, text 11 -->
    ///     </ul>
    ///     <div class="y"/>                    <!-- 12, attr 13 -->
    ///     <div class="x">tail</div>           <!-- 14, attr 15, text 16 -->
    ///   </body>
    /// </html>
    /// ```
    pub fn create_html_tree<'a>() -> MockTree<'a> {
        let mut tree = MockTree::new();
        let html = tree.add_element(0, "html");
        let body = tree.add_element(html, "body");
        let ul = tree.add_element(body, "ul");
        for (class, text) in [(Some("a"), "one"), (Some("b"), "two"), (None, "three")] {
            let li = tree.add_element(ul, "li");
            if let Some(class) = class {
                tree.add_attribute(li, "class", class);
            }
            tree.add_text(li, text);
        }
        let div = tree.add_element(body, "div");
        tree.add_attribute(div, "class", "y");
        let div = tree.add_element(body, "div");
        tree.add_attribute(div, "class", "x");
        tree.add_text(div, "tail");
        tree
    }

    #[cfg(test)]
    mod mock_tests {
        use super::*;

        #[test]
        fn siblings_follow_child_positions() {
            let tree = create_test_tree();
            let comment = tree.node(5);
            assert_eq!(comment.previous_sibling(), Some(tree.node(1)));
            assert_eq!(comment.next_sibling(), Some(tree.node(6)));
            assert_eq!(tree.node(8).next_sibling(), None);
            assert_eq!(tree.node(1).previous_sibling(), None);
        }

        #[test]
        fn attributes_have_no_siblings_but_a_parent() {
            let tree = create_test_tree();
            let id_attr = tree.node(2);
            assert_eq!(id_attr.next_sibling(), None);
            assert_eq!(id_attr.parent(), Some(tree.node(1)));
        }

        #[test]
        fn element_string_value_concatenates_descendant_text() {
            let tree = create_html_tree();
            assert_eq!(tree.node(3).string_value(), "onetwothree");
            assert_eq!(tree.root().string_value(), "onetwothreetail");
            assert_eq!(tree.node(5).string_value(), "a");
        }

        #[test]
        fn xml_prefixed_attribute_is_in_xml_namespace() {
            let tree = create_test_tree();
            assert_eq!(tree.node(3).namespace_uri(), Some(XML_NAMESPACE));
            assert_eq!(tree.node(2).namespace_uri(), None);
        }
    }
}

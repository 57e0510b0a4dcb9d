//! Contains pure functions for collecting nodes along each XPath axis.
//!
//! Every collector appends in the axis' own order: document order for forward axes,
//! nearest-first for reverse ones. An optional virtual root bounds the upward and
//! sideways axes as if it had no parent.

use crate::ast::Axis;
use crate::datasource::{DataSourceNode, NodeType, XML_NAMESPACE};
use crate::node::{NamespaceNode, XPathNode};

/// Collects the nodes on `axis` from `node`, in axis order.
pub fn collect<'a, N: DataSourceNode<'a>>(
    axis: Axis,
    node: XPathNode<'a, N>,
    virtual_root: Option<N>,
) -> Vec<XPathNode<'a, N>> {
    let mut results = Vec::new();
    match axis {
        Axis::SelfAxis => results.push(node),
        Axis::Child => collect_child_nodes(node, &mut results),
        Axis::Attribute => collect_attribute_nodes(node, &mut results),
        Axis::Namespace => collect_namespace_nodes(node, &mut results),
        Axis::Descendant => collect_descendant_nodes(node, &mut results),
        Axis::DescendantOrSelf => {
            results.push(node);
            collect_descendant_nodes(node, &mut results);
        }
        Axis::Parent => collect_parent_nodes(node, virtual_root, &mut results),
        Axis::Ancestor => collect_ancestor_nodes(node, virtual_root, &mut results),
        Axis::AncestorOrSelf => {
            results.push(node);
            collect_ancestor_nodes(node, virtual_root, &mut results);
        }
        Axis::FollowingSibling => collect_following_sibling_nodes(node, virtual_root, &mut results),
        Axis::PrecedingSibling => collect_preceding_sibling_nodes(node, virtual_root, &mut results),
        Axis::Following => collect_following_nodes(node, virtual_root, &mut results),
        Axis::Preceding => collect_preceding_nodes(node, virtual_root, &mut results),
    }
    results
}

fn is_boundary<'a, N: DataSourceNode<'a>>(node: XPathNode<'a, N>, virtual_root: Option<N>) -> bool {
    virtual_root.is_some_and(|root| node == XPathNode::Node(root))
}

pub fn collect_child_nodes<'a, N: DataSourceNode<'a>>(
    node: XPathNode<'a, N>,
    results: &mut Vec<XPathNode<'a, N>>,
) {
    results.extend(node.children());
}

pub fn collect_attribute_nodes<'a, N: DataSourceNode<'a>>(
    node: XPathNode<'a, N>,
    results: &mut Vec<XPathNode<'a, N>>,
) {
    results.extend(node.attributes());
}

/// The namespace bindings in scope on an element: `xml` first, then declarations from the
/// element outwards. The nearest declaration of a prefix wins; an empty URI unbinds it.
pub fn collect_namespace_nodes<'a, N: DataSourceNode<'a>>(
    node: XPathNode<'a, N>,
    results: &mut Vec<XPathNode<'a, N>>,
) {
    let Some(owner) = node.as_node().filter(|n| n.node_type() == NodeType::Element) else {
        return;
    };
    results.push(XPathNode::Namespace(NamespaceNode {
        owner,
        prefix: "xml",
        uri: XML_NAMESPACE,
    }));
    let mut seen = vec!["xml"];
    let mut current = Some(owner);
    while let Some(element) = current {
        if element.node_type() != NodeType::Element {
            break;
        }
        for (prefix, uri) in element.namespace_declarations() {
            let prefix = prefix.unwrap_or("");
            if seen.contains(&prefix) {
                continue;
            }
            seen.push(prefix);
            if !uri.is_empty() {
                results.push(XPathNode::Namespace(NamespaceNode { owner, prefix, uri }));
            }
        }
        current = element.parent();
    }
}

/// Pre-order, so the output is already in document order.
pub fn collect_descendant_nodes<'a, N: DataSourceNode<'a>>(
    node: XPathNode<'a, N>,
    results: &mut Vec<XPathNode<'a, N>>,
) {
    let mut stack: Vec<XPathNode<'a, N>> = node.children().collect();
    stack.reverse();
    while let Some(current) = stack.pop() {
        results.push(current);
        let start = stack.len();
        stack.extend(current.children());
        stack[start..].reverse();
    }
}

pub fn collect_parent_nodes<'a, N: DataSourceNode<'a>>(
    node: XPathNode<'a, N>,
    virtual_root: Option<N>,
    results: &mut Vec<XPathNode<'a, N>>,
) {
    if is_boundary(node, virtual_root) {
        return;
    }
    if let Some(parent) = node.parent() {
        results.push(parent);
    }
}

pub fn collect_ancestor_nodes<'a, N: DataSourceNode<'a>>(
    node: XPathNode<'a, N>,
    virtual_root: Option<N>,
    results: &mut Vec<XPathNode<'a, N>>,
) {
    let mut current = node;
    while !is_boundary(current, virtual_root) {
        let Some(parent) = current.parent() else {
            break;
        };
        results.push(parent);
        current = parent;
    }
}

pub fn collect_following_sibling_nodes<'a, N: DataSourceNode<'a>>(
    node: XPathNode<'a, N>,
    virtual_root: Option<N>,
    results: &mut Vec<XPathNode<'a, N>>,
) {
    if node.is_attached() || is_boundary(node, virtual_root) {
        return;
    }
    let mut current = node.next_sibling();
    while let Some(sibling) = current {
        results.push(sibling);
        current = sibling.next_sibling();
    }
}

pub fn collect_preceding_sibling_nodes<'a, N: DataSourceNode<'a>>(
    node: XPathNode<'a, N>,
    virtual_root: Option<N>,
    results: &mut Vec<XPathNode<'a, N>>,
) {
    if node.is_attached() || is_boundary(node, virtual_root) {
        return;
    }
    let mut current = node.previous_sibling();
    while let Some(sibling) = current {
        results.push(sibling);
        current = sibling.previous_sibling();
    }
}

/// Everything after `node` in document order, excluding its descendants. For an attribute
/// or namespace node that starts with its owner's descendants.
pub fn collect_following_nodes<'a, N: DataSourceNode<'a>>(
    node: XPathNode<'a, N>,
    virtual_root: Option<N>,
    results: &mut Vec<XPathNode<'a, N>>,
) {
    let mut current = node;
    if node.is_attached() {
        let Some(owner) = node.parent() else {
            return;
        };
        collect_descendant_nodes(owner, results);
        current = owner;
    }
    while !is_boundary(current, virtual_root) {
        let mut sibling = current.next_sibling();
        while let Some(s) = sibling {
            results.push(s);
            collect_descendant_nodes(s, results);
            sibling = s.next_sibling();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
}

/// Everything before `node` in document order, excluding its ancestors, nearest first.
pub fn collect_preceding_nodes<'a, N: DataSourceNode<'a>>(
    node: XPathNode<'a, N>,
    virtual_root: Option<N>,
    results: &mut Vec<XPathNode<'a, N>>,
) {
    let mut current = node;
    if node.is_attached() {
        match node.parent() {
            Some(owner) => current = owner,
            None => return,
        }
    }
    while !is_boundary(current, virtual_root) {
        let Some(parent) = current.parent() else {
            break;
        };
        let siblings: Vec<_> = parent.children().take_while(|c| *c != current).collect();
        for sibling in siblings.into_iter().rev() {
            let mut subtree = vec![sibling];
            collect_descendant_nodes(sibling, &mut subtree);
            results.extend(subtree.into_iter().rev());
        }
        current = parent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::{MockNode, MockTree, create_html_tree, create_test_tree};

    fn ids<'a>(nodes: &[XPathNode<'a, MockNode<'a>>]) -> Vec<usize> {
        nodes
            .iter()
            .map(|n| n.as_node().map(|m| m.id).unwrap_or(usize::MAX))
            .collect()
    }

    fn node<'a>(tree: &'a MockTree<'a>, id: usize) -> XPathNode<'a, MockNode<'a>> {
        XPathNode::Node(tree.node(id))
    }

    #[test]
    fn test_collect_child() {
        let tree = create_test_tree();
        let results = collect(Axis::Child, node(&tree, 0), None);
        assert_eq!(ids(&results), vec![1, 5, 6, 7, 8]);
        // Attributes are not children.
        assert_eq!(ids(&collect(Axis::Child, node(&tree, 1), None)), vec![4]);
    }

    #[test]
    fn test_collect_attribute_only_on_elements() {
        let tree = create_test_tree();
        assert_eq!(ids(&collect(Axis::Attribute, node(&tree, 1), None)), vec![2, 3]);
        assert!(collect(Axis::Attribute, node(&tree, 0), None).is_empty());
        assert!(collect(Axis::Attribute, node(&tree, 2), None).is_empty());
    }

    #[test]
    fn test_collect_descendant_in_document_order() {
        let tree = create_html_tree();
        let results = collect(Axis::Descendant, node(&tree, 2), None);
        assert_eq!(ids(&results), vec![3, 4, 6, 7, 9, 10, 11, 12, 14, 16]);
        let results = collect(Axis::DescendantOrSelf, node(&tree, 3), None);
        assert_eq!(ids(&results), vec![3, 4, 6, 7, 9, 10, 11]);
    }

    #[test]
    fn test_collect_ancestor_nearest_first() {
        let tree = create_html_tree();
        assert_eq!(ids(&collect(Axis::Ancestor, node(&tree, 6), None)), vec![4, 3, 2, 1, 0]);
        assert_eq!(
            ids(&collect(Axis::AncestorOrSelf, node(&tree, 5), None)),
            vec![5, 4, 3, 2, 1, 0]
        );
        assert_eq!(ids(&collect(Axis::Parent, node(&tree, 13), None)), vec![12]);
        assert!(collect(Axis::Parent, node(&tree, 0), None).is_empty());
    }

    #[test]
    fn test_collect_siblings() {
        let tree = create_test_tree();
        assert_eq!(
            ids(&collect(Axis::FollowingSibling, node(&tree, 1), None)),
            vec![5, 6, 7, 8]
        );
        assert_eq!(
            ids(&collect(Axis::PrecedingSibling, node(&tree, 8), None)),
            vec![7, 6, 5, 1]
        );
        // Attributes have no siblings.
        assert!(collect(Axis::FollowingSibling, node(&tree, 2), None).is_empty());
        assert!(collect(Axis::PrecedingSibling, node(&tree, 3), None).is_empty());
    }

    #[test]
    fn test_collect_following() {
        let tree = create_html_tree();
        // From the first li's text: the other items, then the divs.
        assert_eq!(
            ids(&collect(Axis::Following, node(&tree, 6), None)),
            vec![7, 9, 10, 11, 12, 14, 16]
        );
        // From an attribute: the owner's descendants come first.
        assert_eq!(
            ids(&collect(Axis::Following, node(&tree, 5), None)),
            vec![6, 7, 9, 10, 11, 12, 14, 16]
        );
    }

    #[test]
    fn test_collect_preceding_excludes_ancestors() {
        let tree = create_html_tree();
        assert_eq!(
            ids(&collect(Axis::Preceding, node(&tree, 12), None)),
            vec![11, 10, 9, 7, 6, 4, 3]
        );
        assert_eq!(ids(&collect(Axis::Preceding, node(&tree, 8), None)), vec![6, 4]);
    }

    #[test]
    fn test_virtual_root_bounds_upward_axes() {
        let tree = create_html_tree();
        let ul = Some(tree.node(3));
        assert_eq!(ids(&collect(Axis::Ancestor, node(&tree, 6), ul)), vec![4, 3]);
        assert!(collect(Axis::Parent, node(&tree, 3), ul).is_empty());
        assert!(collect(Axis::FollowingSibling, node(&tree, 3), ul).is_empty());
        assert_eq!(ids(&collect(Axis::Following, node(&tree, 6), ul)), vec![7, 9, 10, 11]);
        assert_eq!(ids(&collect(Axis::Preceding, node(&tree, 10), ul)), vec![9, 7, 6, 4]);
    }

    #[test]
    fn test_collect_namespace_nodes() {
        let mut tree = MockTree::new();
        let outer = tree.add_element(0, "outer");
        tree.declare_namespace(outer, Some("a"), "urn:a");
        tree.declare_namespace(outer, None, "urn:default");
        let inner = tree.add_element(outer, "inner");
        tree.declare_namespace(inner, Some("a"), "urn:a2");
        tree.declare_namespace(inner, None, "");
        let text = tree.add_text(inner, "x");

        let results = collect(Axis::Namespace, node(&tree, inner), None);
        let bindings: Vec<(String, String)> = results
            .iter()
            .map(|n| {
                let prefix = n.name().map(|q| q.local_part).unwrap_or_default();
                (prefix.to_string(), n.string_value())
            })
            .collect();
        assert_eq!(
            bindings,
            vec![
                ("xml".to_string(), XML_NAMESPACE.to_string()),
                ("a".to_string(), "urn:a2".to_string()),
            ]
        );
        assert!(results.iter().all(|n| n.parent() == Some(node(&tree, inner))));
        assert!(collect(Axis::Namespace, node(&tree, text), None).is_empty());
    }
}

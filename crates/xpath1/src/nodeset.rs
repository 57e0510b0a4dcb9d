//! Node-sets: insertion-ordered, identity-deduplicated collections that sort themselves
//! into document order lazily through an AVL tree kept in an index arena.

use crate::datasource::DataSourceNode;
use crate::node::XPathNode;
use log::warn;
use once_cell::unsync::OnceCell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Three-way document-order comparison.
///
/// Nodes whose adapter supplies [`DataSourceNode::document_position`] compare by key.
/// Otherwise depths are equalised by walking parent links (an attribute's parent is its
/// owner), then both chains climb until they share a parent. Siblings under that parent are
/// ordered namespace nodes first, then attributes, then children, each by position.
pub fn document_order<'a, N: DataSourceNode<'a>>(
    a: &XPathNode<'a, N>,
    b: &XPathNode<'a, N>,
) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    if let (Some(key_a), Some(key_b)) = (order_key(a), order_key(b)) {
        return key_a.cmp(&key_b);
    }

    let depth_a = depth(a);
    let depth_b = depth(b);
    let (mut x, mut y) = (*a, *b);
    for _ in depth_b..depth_a {
        if let Some(p) = x.parent() {
            x = p;
        }
    }
    for _ in depth_a..depth_b {
        if let Some(p) = y.parent() {
            y = p;
        }
    }
    if x == y {
        // One is an ancestor of the other; the ancestor comes first.
        return depth_a.cmp(&depth_b);
    }

    loop {
        match (x.parent(), y.parent()) {
            (Some(px), Some(py)) if px == py => return sibling_order(&px, &x, &y),
            (Some(px), Some(py)) => {
                x = px;
                y = py;
            }
            _ => {
                // x and y are now the roots of their trees.
                warn!("ordering nodes from disconnected trees: {:?} and {:?}", a, b);
                return tree_identity(&x).cmp(&tree_identity(&y));
            }
        }
    }
}

/// `(pre-order index, rank, attribute position, namespace prefix)`. Rank 0 is the node
/// itself, 1 its namespace nodes and 2 its attributes, so the owner element comes first.
fn order_key<'a, N: DataSourceNode<'a>>(
    node: &XPathNode<'a, N>,
) -> Option<(usize, u8, usize, &'a str)> {
    match node {
        XPathNode::Node(n) => {
            let (index, attribute) = n.document_position()?;
            let rank = if attribute == 0 { 0 } else { 2 };
            Some((index, rank, attribute, ""))
        }
        XPathNode::Namespace(ns) => {
            let (index, _) = ns.owner.document_position()?;
            Some((index, 1, 0, ns.prefix))
        }
    }
}

/// A stable per-tree key so that nodes of unrelated trees still order consistently.
fn tree_identity<'a, N: DataSourceNode<'a>>(root: &XPathNode<'a, N>) -> u64 {
    let mut hasher = DefaultHasher::new();
    root.hash(&mut hasher);
    hasher.finish()
}

fn depth<'a, N: DataSourceNode<'a>>(node: &XPathNode<'a, N>) -> usize {
    let mut depth = 0;
    let mut current = node.parent();
    while let Some(p) = current {
        depth += 1;
        current = p.parent();
    }
    depth
}

fn attachment_rank<'a, N: DataSourceNode<'a>>(node: &XPathNode<'a, N>) -> u8 {
    match node {
        XPathNode::Namespace(_) => 0,
        XPathNode::Node(_) if node.is_attached() => 1,
        XPathNode::Node(_) => 2,
    }
}

fn sibling_order<'a, N: DataSourceNode<'a>>(
    parent: &XPathNode<'a, N>,
    x: &XPathNode<'a, N>,
    y: &XPathNode<'a, N>,
) -> Ordering {
    let (rank_x, rank_y) = (attachment_rank(x), attachment_rank(y));
    if rank_x != rank_y {
        return rank_x.cmp(&rank_y);
    }
    if let (XPathNode::Namespace(nx), XPathNode::Namespace(ny)) = (x, y) {
        return nx.prefix.cmp(ny.prefix);
    }
    let (Some(owner), Some(xn), Some(yn)) = (parent.as_node(), x.as_node(), y.as_node()) else {
        return Ordering::Equal;
    };
    let is_either = |sibling: &N| *sibling == xn || *sibling == yn;
    let first = if rank_x == 1 {
        owner.attributes().find(is_either)
    } else {
        owner.children().find(is_either)
    };
    match first {
        Some(sibling) if sibling == xn => Ordering::Less,
        Some(_) => Ordering::Greater,
        None => Ordering::Equal,
    }
}

#[derive(Debug, Clone)]
struct OrderSlot {
    item: usize,
    left: Option<usize>,
    right: Option<usize>,
    height: i32,
}

/// An AVL tree whose nodes live in `slots` and refer to each other by index.
/// Each slot's `item` indexes the owning node-set's insertion-ordered node list.
#[derive(Debug, Clone, Default)]
struct OrderTree {
    slots: Vec<OrderSlot>,
    root: Option<usize>,
}

impl OrderTree {
    fn build(len: usize, mut cmp: impl FnMut(usize, usize) -> Ordering) -> Self {
        let mut tree = OrderTree {
            slots: Vec::with_capacity(len),
            root: None,
        };
        for item in 0..len {
            tree.root = Some(tree.insert_at(tree.root, item, &mut cmp));
        }
        tree
    }

    fn height(&self, at: Option<usize>) -> i32 {
        at.map_or(0, |i| self.slots[i].height)
    }

    fn balance(&self, i: usize) -> i32 {
        self.height(self.slots[i].left) - self.height(self.slots[i].right)
    }

    fn update_height(&mut self, i: usize) {
        let height = 1 + self
            .height(self.slots[i].left)
            .max(self.height(self.slots[i].right));
        self.slots[i].height = height;
    }

    fn insert_at(
        &mut self,
        at: Option<usize>,
        item: usize,
        cmp: &mut impl FnMut(usize, usize) -> Ordering,
    ) -> usize {
        let Some(i) = at else {
            self.slots.push(OrderSlot {
                item,
                left: None,
                right: None,
                height: 1,
            });
            return self.slots.len() - 1;
        };
        match cmp(item, self.slots[i].item) {
            Ordering::Less => {
                let left = self.insert_at(self.slots[i].left, item, cmp);
                self.slots[i].left = Some(left);
            }
            // Members are already distinct, so a tie keeps insertion order.
            Ordering::Greater | Ordering::Equal => {
                let right = self.insert_at(self.slots[i].right, item, cmp);
                self.slots[i].right = Some(right);
            }
        }
        self.rebalance(i)
    }

    fn rotate_right(&mut self, i: usize) -> usize {
        let Some(pivot) = self.slots[i].left else {
            return i;
        };
        self.slots[i].left = self.slots[pivot].right;
        self.slots[pivot].right = Some(i);
        self.update_height(i);
        self.update_height(pivot);
        pivot
    }

    fn rotate_left(&mut self, i: usize) -> usize {
        let Some(pivot) = self.slots[i].right else {
            return i;
        };
        self.slots[i].right = self.slots[pivot].left;
        self.slots[pivot].left = Some(i);
        self.update_height(i);
        self.update_height(pivot);
        pivot
    }

    fn rebalance(&mut self, i: usize) -> usize {
        self.update_height(i);
        let balance = self.balance(i);
        if balance > 1 {
            if let Some(left) = self.slots[i].left.filter(|&l| self.balance(l) < 0) {
                let rotated = self.rotate_left(left);
                self.slots[i].left = Some(rotated);
            }
            return self.rotate_right(i);
        }
        if balance < -1 {
            if let Some(right) = self.slots[i].right.filter(|&r| self.balance(r) > 0) {
                let rotated = self.rotate_right(right);
                self.slots[i].right = Some(rotated);
            }
            return self.rotate_left(i);
        }
        i
    }

    fn in_order(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.slots.len());
        let mut stack = Vec::new();
        let mut current = self.root;
        while current.is_some() || !stack.is_empty() {
            while let Some(i) = current {
                stack.push(i);
                current = self.slots[i].left;
            }
            if let Some(i) = stack.pop() {
                out.push(self.slots[i].item);
                current = self.slots[i].right;
            }
        }
        out
    }

    fn leftmost(&self) -> Option<usize> {
        let mut current = self.root?;
        while let Some(left) = self.slots[current].left {
            current = left;
        }
        Some(self.slots[current].item)
    }
}

/// An XPath node-set. Membership is by node identity; iteration is either in insertion
/// order (cheap) or in document order (sorted on first request after a change).
#[derive(Debug, Clone)]
pub struct NodeSet<'a, N> {
    nodes: Vec<XPathNode<'a, N>>,
    members: HashSet<XPathNode<'a, N>>,
    order: OnceCell<OrderTree>,
}

impl<'a, N: DataSourceNode<'a>> Default for NodeSet<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, N: DataSourceNode<'a>> NodeSet<'a, N> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            members: HashSet::new(),
            order: OnceCell::new(),
        }
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = N>) -> Self {
        let mut set = Self::new();
        set.extend(nodes.into_iter().map(XPathNode::Node));
        set
    }

    /// Adds a node unless it is already a member. Returns whether it was added.
    pub fn add(&mut self, node: XPathNode<'a, N>) -> bool {
        if !self.members.insert(node) {
            return false;
        }
        self.nodes.push(node);
        self.order = OnceCell::new();
        true
    }

    pub fn extend(&mut self, nodes: impl IntoIterator<Item = XPathNode<'a, N>>) {
        for node in nodes {
            self.add(node);
        }
    }

    /// Merges another node-set into this one.
    pub fn union(&mut self, other: &NodeSet<'a, N>) {
        self.extend(other.nodes.iter().copied());
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: &XPathNode<'a, N>) -> bool {
        self.members.contains(node)
    }

    /// The members in insertion order.
    pub fn unsorted(&self) -> &[XPathNode<'a, N>] {
        &self.nodes
    }

    fn order_tree(&self) -> &OrderTree {
        self.order.get_or_init(|| {
            let nodes = &self.nodes;
            OrderTree::build(nodes.len(), |a, b| document_order(&nodes[a], &nodes[b]))
        })
    }

    /// The members in document order.
    pub fn to_sorted(&self) -> Vec<XPathNode<'a, N>> {
        self.order_tree()
            .in_order()
            .into_iter()
            .map(|i| self.nodes[i])
            .collect()
    }

    /// The first member in document order.
    pub fn first(&self) -> Option<XPathNode<'a, N>> {
        match self.nodes.len() {
            0 => None,
            1 => Some(self.nodes[0]),
            _ => self.order_tree().leftmost().map(|i| self.nodes[i]),
        }
    }

    /// String-value of the first node in document order, or the empty string.
    pub fn string_value(&self) -> String {
        self.first().map(|n| n.string_value()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::{MockNode, create_html_tree, create_test_tree};
    use crate::node::NamespaceNode;

    fn n<'a>(tree: &'a crate::datasource::tests::MockTree<'a>, id: usize) -> XPathNode<'a, MockNode<'a>> {
        XPathNode::Node(tree.node(id))
    }

    #[test]
    fn test_add_is_idempotent() {
        let tree = create_test_tree();
        let mut set = NodeSet::new();
        assert!(set.add(n(&tree, 1)));
        assert!(!set.add(n(&tree, 1)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.unsorted(), &[n(&tree, 1)]);
    }

    #[test]
    fn test_sorted_follows_document_order() {
        let tree = create_html_tree();
        let mut set = NodeSet::new();
        for id in [16, 2, 13, 7, 0, 12, 5, 4, 11, 14, 9, 1] {
            set.add(n(&tree, id));
        }
        let sorted: Vec<usize> = set
            .to_sorted()
            .iter()
            .filter_map(|x| x.as_node())
            .map(|x| x.id)
            .collect();
        assert_eq!(sorted, vec![0, 1, 2, 4, 5, 7, 9, 11, 12, 13, 14, 16]);
        assert_eq!(set.first(), Some(n(&tree, 0)));
    }

    #[test]
    fn test_adding_invalidates_order() {
        let tree = create_html_tree();
        let mut set = NodeSet::new();
        set.add(n(&tree, 14));
        set.add(n(&tree, 12));
        assert_eq!(set.first(), Some(n(&tree, 12)));
        set.add(n(&tree, 4));
        assert_eq!(set.first(), Some(n(&tree, 4)));
        assert_eq!(set.to_sorted().len(), 3);
    }

    #[test]
    fn test_attributes_sort_before_children() {
        let tree = create_test_tree();
        // para(1) has attributes 2, 3 and text child 4
        let (para, id, lang, text) = (n(&tree, 1), n(&tree, 2), n(&tree, 3), n(&tree, 4));
        assert_eq!(document_order(&para, &id), Ordering::Less);
        assert_eq!(document_order(&id, &lang), Ordering::Less);
        assert_eq!(document_order(&lang, &text), Ordering::Less);
        assert_eq!(document_order(&text, &id), Ordering::Greater);
        // text of the first para precedes the comment that follows it
        assert_eq!(document_order(&text, &n(&tree, 5)), Ordering::Less);
    }

    #[test]
    fn test_namespace_nodes_sort_between_owner_and_attributes() {
        let tree = create_test_tree();
        let para = tree.node(1);
        let ns = XPathNode::Namespace(NamespaceNode {
            owner: para,
            prefix: "xml",
            uri: crate::datasource::XML_NAMESPACE,
        });
        assert_eq!(document_order(&XPathNode::Node(para), &ns), Ordering::Less);
        assert_eq!(document_order(&ns, &n(&tree, 2)), Ordering::Less);
    }

    #[test]
    fn test_large_reverse_insertion_stays_balanced() {
        let mut tree = crate::datasource::tests::MockTree::new();
        let mut ids = Vec::new();
        for _ in 0..200 {
            ids.push(tree.add_element(0, "item"));
        }
        let mut set = NodeSet::new();
        for &id in ids.iter().rev() {
            set.add(XPathNode::Node(tree.node(id)));
        }
        let sorted: Vec<usize> = set
            .to_sorted()
            .iter()
            .filter_map(|x| x.as_node())
            .map(|x| x.id)
            .collect();
        assert_eq!(sorted, ids);
        let order = set.order_tree();
        // An AVL tree of 200 nodes is at most 1.44 * log2(201) high.
        assert!(order.height(order.root) <= 11);
    }

    #[test]
    fn test_order_keys_agree_with_tree_walk() {
        let walked = create_html_tree();
        let mut keyed = create_html_tree();
        keyed.enable_order_keys();
        let ids: Vec<usize> = (0..=16).collect();
        for &x in &ids {
            for &y in &ids {
                assert_eq!(
                    document_order(&n(&keyed, x), &n(&keyed, y)),
                    document_order(&n(&walked, x), &n(&walked, y)),
                    "nodes {x} and {y}"
                );
            }
        }
        let li = keyed.node(4);
        let ns = XPathNode::Namespace(NamespaceNode {
            owner: li,
            prefix: "xml",
            uri: crate::datasource::XML_NAMESPACE,
        });
        assert_eq!(document_order(&XPathNode::Node(li), &ns), Ordering::Less);
        assert_eq!(document_order(&ns, &n(&keyed, 5)), Ordering::Less);
        assert_eq!(document_order(&n(&keyed, 5), &n(&keyed, 6)), Ordering::Less);
    }

    #[test]
    fn test_disconnected_trees_order_consistently() {
        let first = create_html_tree();
        let second = create_html_tree();
        let (a, b) = (n(&first, 4), n(&second, 4));
        let forward = document_order(&a, &b);
        assert_ne!(forward, Ordering::Equal);
        assert_eq!(document_order(&b, &a), forward.reverse());

        let mut set = NodeSet::new();
        for node in [n(&second, 7), a, b, n(&first, 7)] {
            set.add(node);
        }
        let sorted = set.to_sorted();
        assert_eq!(sorted.len(), 4);
        // Each tree's nodes stay together and in document order.
        let trees: Vec<bool> = sorted
            .iter()
            .filter_map(|x| x.as_node())
            .map(|x| std::ptr::eq(x.tree, &first))
            .collect();
        assert!(trees == [true, true, false, false] || trees == [false, false, true, true]);
        let ids: Vec<usize> = sorted.iter().filter_map(|x| x.as_node()).map(|x| x.id).collect();
        assert_eq!(ids, vec![4, 7, 4, 7]);
    }

    #[test]
    fn test_union_merges_without_duplicates() {
        let tree = create_html_tree();
        let mut a = NodeSet::from_nodes([tree.node(4), tree.node(7)]);
        let b = NodeSet::from_nodes([tree.node(7), tree.node(10)]);
        a.union(&b);
        assert_eq!(a.len(), 3);
    }
}

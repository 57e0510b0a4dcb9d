//! Evaluation context and the pluggable namespace, function and variable resolvers.

use crate::datasource::{DataSourceNode, NodeType, XML_NAMESPACE, XMLNS_NAMESPACE};
use crate::error::XPathError;
use crate::node::XPathNode;
use crate::value::XPathValue;
use std::collections::HashMap;

/// Maps a namespace prefix, as seen from `node`, to a namespace URI.
pub trait NamespaceResolver<'a, N: DataSourceNode<'a>> {
    fn lookup_namespace_uri(&self, prefix: &str, node: &XPathNode<'a, N>) -> Option<String>;
}

/// A function callable from expressions. Custom functions receive their arguments
/// already evaluated.
pub trait XPathFunction<'a, N: DataSourceNode<'a>> {
    fn call(
        &self,
        ctx: &EvaluationContext<'a, '_, N>,
        args: Vec<XPathValue<'a, N>>,
    ) -> Result<XPathValue<'a, N>, XPathError>;
}

impl<'a, N, F> XPathFunction<'a, N> for F
where
    N: DataSourceNode<'a>,
    F: Fn(
        &EvaluationContext<'a, '_, N>,
        Vec<XPathValue<'a, N>>,
    ) -> Result<XPathValue<'a, N>, XPathError>,
{
    fn call(
        &self,
        ctx: &EvaluationContext<'a, '_, N>,
        args: Vec<XPathValue<'a, N>>,
    ) -> Result<XPathValue<'a, N>, XPathError> {
        self(ctx, args)
    }
}

/// Looks up custom functions by local name and namespace URI.
pub trait FunctionResolver<'a, N: DataSourceNode<'a>> {
    fn get_function(
        &self,
        local_name: &str,
        namespace_uri: Option<&str>,
    ) -> Option<&dyn XPathFunction<'a, N>>;
}

/// Looks up variable values by local name and namespace URI.
pub trait VariableResolver<'a, N: DataSourceNode<'a>> {
    fn get_variable(&self, local_name: &str, namespace_uri: Option<&str>)
    -> Option<XPathValue<'a, N>>;
}

/// Resolves prefixes from the `xmlns` declarations in scope at the node, plus the two
/// reserved `xml` and `xmlns` prefixes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeNamespaceResolver;

impl<'a, N: DataSourceNode<'a>> NamespaceResolver<'a, N> for NodeNamespaceResolver {
    fn lookup_namespace_uri(&self, prefix: &str, node: &XPathNode<'a, N>) -> Option<String> {
        match prefix {
            "xml" => return Some(XML_NAMESPACE.to_string()),
            "xmlns" => return Some(XMLNS_NAMESPACE.to_string()),
            _ => {}
        }
        let mut current = match node.node_type() {
            NodeType::Root => node
                .children()
                .find(|c| c.node_type() == NodeType::Element)
                .and_then(|c| c.as_node()),
            NodeType::Element => node.as_node(),
            _ => node.parent().and_then(|p| p.as_node()),
        };
        while let Some(element) = current {
            if element.node_type() == NodeType::Element {
                let declared = element
                    .namespace_declarations()
                    .into_iter()
                    .find(|(p, _)| p.unwrap_or("") == prefix);
                if let Some((_, uri)) = declared {
                    return (!uri.is_empty()).then(|| uri.to_string());
                }
            }
            current = element.parent();
        }
        None
    }
}

/// Resolves prefixes from a fixed map, then from the node's own declarations.
#[derive(Debug, Clone, Default)]
pub struct MapNamespaceResolver(pub HashMap<String, String>);

impl<'a, N: DataSourceNode<'a>> NamespaceResolver<'a, N> for MapNamespaceResolver {
    fn lookup_namespace_uri(&self, prefix: &str, node: &XPathNode<'a, N>) -> Option<String> {
        self.0
            .get(prefix)
            .cloned()
            .or_else(|| NodeNamespaceResolver.lookup_namespace_uri(prefix, node))
    }
}

/// Resolves prefixes with a closure.
pub struct FnNamespaceResolver<F>(pub F);

impl<'a, N, F> NamespaceResolver<'a, N> for FnNamespaceResolver<F>
where
    N: DataSourceNode<'a>,
    F: Fn(&str) -> Option<String>,
{
    fn lookup_namespace_uri(&self, prefix: &str, _node: &XPathNode<'a, N>) -> Option<String> {
        (self.0)(prefix)
    }
}

/// Custom functions keyed by namespace URI and local name.
pub struct FunctionRegistry<'a, N: DataSourceNode<'a>> {
    functions: HashMap<(Option<String>, String), Box<dyn XPathFunction<'a, N> + 'a>>,
}

impl<'a, N: DataSourceNode<'a>> Default for FunctionRegistry<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, N: DataSourceNode<'a>> FunctionRegistry<'a, N> {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Registers a function callable without a prefix.
    pub fn register<F>(&mut self, name: &str, function: F)
    where
        F: Fn(
                &EvaluationContext<'a, '_, N>,
                Vec<XPathValue<'a, N>>,
            ) -> Result<XPathValue<'a, N>, XPathError>
            + 'a,
    {
        self.functions
            .insert((None, name.to_string()), Box::new(function));
    }

    /// Registers a function callable as `prefix:name` for a prefix bound to `namespace_uri`.
    pub fn register_ns<F>(&mut self, namespace_uri: &str, name: &str, function: F)
    where
        F: Fn(
                &EvaluationContext<'a, '_, N>,
                Vec<XPathValue<'a, N>>,
            ) -> Result<XPathValue<'a, N>, XPathError>
            + 'a,
    {
        self.functions.insert(
            (Some(namespace_uri.to_string()), name.to_string()),
            Box::new(function),
        );
    }
}

impl<'a, N: DataSourceNode<'a>> FunctionResolver<'a, N> for FunctionRegistry<'a, N> {
    fn get_function(
        &self,
        local_name: &str,
        namespace_uri: Option<&str>,
    ) -> Option<&dyn XPathFunction<'a, N>> {
        self.functions
            .get(&(namespace_uri.map(str::to_string), local_name.to_string()))
            .map(|f| f.as_ref() as &dyn XPathFunction<'a, N>)
    }
}

/// Variables keyed by name. Namespaced variables use the `{uri}local` form.
impl<'a, N: DataSourceNode<'a>> VariableResolver<'a, N> for HashMap<String, XPathValue<'a, N>> {
    fn get_variable(
        &self,
        local_name: &str,
        namespace_uri: Option<&str>,
    ) -> Option<XPathValue<'a, N>> {
        let value = match namespace_uri {
            Some(uri) => self.get(&format!("{{{uri}}}{local_name}")),
            None => self.get(local_name),
        };
        value.cloned()
    }
}

/// Resolves variables with a closure taking the local name and namespace URI.
pub struct FnVariableResolver<F>(pub F);

impl<'a, N, F> VariableResolver<'a, N> for FnVariableResolver<F>
where
    N: DataSourceNode<'a>,
    F: Fn(&str, Option<&str>) -> Option<XPathValue<'a, N>>,
{
    fn get_variable(
        &self,
        local_name: &str,
        namespace_uri: Option<&str>,
    ) -> Option<XPathValue<'a, N>> {
        (self.0)(local_name, namespace_uri)
    }
}

/// Knows no functions and no variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyResolver;

impl<'a, N: DataSourceNode<'a>> FunctionResolver<'a, N> for EmptyResolver {
    fn get_function(&self, _: &str, _: Option<&str>) -> Option<&dyn XPathFunction<'a, N>> {
        None
    }
}

impl<'a, N: DataSourceNode<'a>> VariableResolver<'a, N> for EmptyResolver {
    fn get_variable(&self, _: &str, _: Option<&str>) -> Option<XPathValue<'a, N>> {
        None
    }
}

/// A container for all state needed during expression evaluation.
/// `'a` is the lifetime of the underlying document.
/// `'d` is the lifetime of the resolvers the context borrows.
///
/// Contexts are never mutated: predicates and nested paths evaluate against a copy made
/// with [`EvaluationContext::with_node`].
pub struct EvaluationContext<'a, 'd, N: DataSourceNode<'a>> {
    pub context_node: XPathNode<'a, N>,
    pub context_position: usize, // 1-based index
    pub context_size: usize,
    /// The node the whole expression is evaluated against; QName prefixes resolve here.
    pub expression_node: XPathNode<'a, N>,
    pub namespaces: &'d dyn NamespaceResolver<'a, N>,
    pub functions: &'d dyn FunctionResolver<'a, N>,
    pub variables: &'d dyn VariableResolver<'a, N>,
    pub case_insensitive: bool,
    pub allow_any_namespace_for_no_prefix: bool,
    /// Stands in for the document root for absolute paths and bounds the upward axes.
    pub virtual_root: Option<N>,
}

impl<'a, 'd, N: DataSourceNode<'a>> Clone for EvaluationContext<'a, 'd, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, 'd, N: DataSourceNode<'a>> Copy for EvaluationContext<'a, 'd, N> {}

impl<'a, 'd, N: DataSourceNode<'a>> EvaluationContext<'a, 'd, N> {
    /// A context at `node` with the default resolvers and no custom functions or variables.
    pub fn new(node: N) -> Self {
        let node = XPathNode::Node(node);
        Self {
            context_node: node,
            context_position: 1,
            context_size: 1,
            expression_node: node,
            namespaces: &NodeNamespaceResolver,
            functions: &EmptyResolver,
            variables: &EmptyResolver,
            case_insensitive: false,
            allow_any_namespace_for_no_prefix: false,
            virtual_root: None,
        }
    }

    /// A copy focused on another node, as used for each candidate of a predicate.
    pub fn with_node(&self, node: XPathNode<'a, N>, position: usize, size: usize) -> Self {
        Self {
            context_node: node,
            context_position: position,
            context_size: size,
            ..*self
        }
    }

    /// Resolves a namespace prefix against the expression's context node.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<String, XPathError> {
        self.namespaces
            .lookup_namespace_uri(prefix, &self.expression_node)
            .ok_or_else(|| XPathError::UnresolvedPrefix(prefix.to_string()))
    }

    /// Splits a lexical QName into its namespace URI (if prefixed) and local part.
    pub fn resolve_qname<'q>(&self, qname: &'q str) -> Result<(Option<String>, &'q str), XPathError> {
        match qname.split_once(':') {
            Some((prefix, local)) => Ok((Some(self.resolve_prefix(prefix)?), local)),
            None => Ok((None, qname)),
        }
    }

    /// The node absolute paths start from.
    pub fn root(&self) -> XPathNode<'a, N> {
        if let Some(root) = self.virtual_root {
            return XPathNode::Node(root);
        }
        let mut current = self.context_node;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// The real document root, ignoring any virtual root.
    pub fn document(&self) -> XPathNode<'a, N> {
        let mut current = self.context_node;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }
}

//! The public entry point: compiled expressions and the options they evaluate with.

use crate::ast::Expression;
use crate::context::{
    EmptyResolver, EvaluationContext, FnNamespaceResolver, FnVariableResolver, FunctionRegistry,
    FunctionResolver, MapNamespaceResolver, NamespaceResolver, NodeNamespaceResolver,
    VariableResolver,
};
use crate::datasource::DataSourceNode;
use crate::engine;
use crate::error::XPathError;
use crate::node::XPathNode;
use crate::nodeset::NodeSet;
use crate::parser::parse_expression;
use crate::value::XPathValue;
use log::debug;
use std::collections::HashMap;
use std::fmt;

/// Compiles an expression. Fails with [`XPathError::Syntax`] on malformed input.
pub fn parse(source: &str) -> Result<XPathExpression, XPathError> {
    XPathExpression::new(source)
}

/// A parsed expression, reusable across documents and evaluations.
#[derive(Debug, Clone, PartialEq)]
pub struct XPathExpression {
    source: String,
    expression: Expression,
}

/// The kind of result a caller asks [`XPathExpression::evaluate_as`] for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    /// Whatever the expression naturally produces; node-sets come back in document order.
    Any,
    Number,
    String,
    Boolean,
    UnorderedNodes,
    OrderedNodes,
    AnyUnorderedNode,
    FirstOrderedNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XPathResult<'a, N> {
    Number(f64),
    String(String),
    Boolean(bool),
    Nodes(Vec<XPathNode<'a, N>>),
    Node(Option<XPathNode<'a, N>>),
}

impl XPathExpression {
    pub fn new(source: &str) -> Result<Self, XPathError> {
        let expression = parse_expression(source)?;
        Ok(Self {
            source: source.to_string(),
            expression,
        })
    }

    /// The text the expression was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn evaluate<'a, N: DataSourceNode<'a>>(
        &self,
        options: &EvaluationOptions<'a, '_, N>,
    ) -> Result<XPathValue<'a, N>, XPathError> {
        debug!("Evaluating '{}' at {:?}", self.source, options.node);
        engine::evaluate(&self.expression, &options.context())
    }

    pub fn evaluate_as<'a, N: DataSourceNode<'a>>(
        &self,
        options: &EvaluationOptions<'a, '_, N>,
        result_type: ResultType,
    ) -> Result<XPathResult<'a, N>, XPathError> {
        let value = self.evaluate(options)?;
        let result = match result_type {
            ResultType::Any => match value {
                XPathValue::NodeSet(nodes) => XPathResult::Nodes(nodes.to_sorted()),
                XPathValue::String(s) => XPathResult::String(s),
                XPathValue::Number(n) => XPathResult::Number(n),
                XPathValue::Boolean(b) => XPathResult::Boolean(b),
            },
            ResultType::Number => XPathResult::Number(value.to_number()),
            ResultType::String => XPathResult::String(value.to_string()),
            ResultType::Boolean => XPathResult::Boolean(value.to_bool()),
            ResultType::UnorderedNodes => {
                XPathResult::Nodes(value.into_node_set()?.unsorted().to_vec())
            }
            ResultType::OrderedNodes => XPathResult::Nodes(value.into_node_set()?.to_sorted()),
            ResultType::AnyUnorderedNode => {
                XPathResult::Node(value.into_node_set()?.unsorted().first().copied())
            }
            ResultType::FirstOrderedNode => XPathResult::Node(value.into_node_set()?.first()),
        };
        Ok(result)
    }

    pub fn evaluate_string<'a, N: DataSourceNode<'a>>(
        &self,
        options: &EvaluationOptions<'a, '_, N>,
    ) -> Result<String, XPathError> {
        Ok(self.evaluate(options)?.to_string())
    }

    pub fn evaluate_number<'a, N: DataSourceNode<'a>>(
        &self,
        options: &EvaluationOptions<'a, '_, N>,
    ) -> Result<f64, XPathError> {
        Ok(self.evaluate(options)?.to_number())
    }

    pub fn evaluate_boolean<'a, N: DataSourceNode<'a>>(
        &self,
        options: &EvaluationOptions<'a, '_, N>,
    ) -> Result<bool, XPathError> {
        Ok(self.evaluate(options)?.to_bool())
    }

    pub fn evaluate_node_set<'a, N: DataSourceNode<'a>>(
        &self,
        options: &EvaluationOptions<'a, '_, N>,
    ) -> Result<NodeSet<'a, N>, XPathError> {
        self.evaluate(options)?.into_node_set()
    }

    /// All selected nodes in document order.
    pub fn select<'a, N: DataSourceNode<'a>>(
        &self,
        options: &EvaluationOptions<'a, '_, N>,
    ) -> Result<Vec<XPathNode<'a, N>>, XPathError> {
        Ok(self.evaluate_node_set(options)?.to_sorted())
    }

    /// The first selected node in document order.
    pub fn select1<'a, N: DataSourceNode<'a>>(
        &self,
        options: &EvaluationOptions<'a, '_, N>,
    ) -> Result<Option<XPathNode<'a, N>>, XPathError> {
        Ok(self.evaluate_node_set(options)?.first())
    }
}

impl fmt::Display for XPathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// Everything an evaluation needs besides the expression: the context node, the
/// resolvers and the HTML switches. `'o` bounds any borrowed resolver state.
pub struct EvaluationOptions<'a, 'o, N: DataSourceNode<'a>> {
    node: N,
    namespaces: Box<dyn NamespaceResolver<'a, N> + 'o>,
    functions: Box<dyn FunctionResolver<'a, N> + 'o>,
    variables: Box<dyn VariableResolver<'a, N> + 'o>,
    is_html: bool,
    /// `None` until set explicitly; falls back to `is_html`.
    case_insensitive: Option<bool>,
    allow_any_namespace_for_no_prefix: Option<bool>,
    virtual_root: Option<N>,
}

impl<'a, 'o, N: DataSourceNode<'a>> EvaluationOptions<'a, 'o, N>
where
    'a: 'o,
{
    pub fn new(node: N) -> Self {
        Self {
            node,
            namespaces: Box::new(NodeNamespaceResolver),
            functions: Box::new(EmptyResolver),
            variables: Box::new(EmptyResolver),
            is_html: false,
            case_insensitive: None,
            allow_any_namespace_for_no_prefix: None,
            virtual_root: None,
        }
    }

    /// Fixed prefix bindings; prefixes not in the map resolve against the document.
    pub fn namespaces(mut self, namespaces: HashMap<String, String>) -> Self {
        self.namespaces = Box::new(MapNamespaceResolver(namespaces));
        self
    }

    pub fn namespace_fn<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'o,
    {
        self.namespaces = Box::new(FnNamespaceResolver(lookup));
        self
    }

    pub fn namespace_resolver(mut self, resolver: impl NamespaceResolver<'a, N> + 'o) -> Self {
        self.namespaces = Box::new(resolver);
        self
    }

    pub fn functions(mut self, registry: FunctionRegistry<'a, N>) -> Self {
        self.functions = Box::new(registry);
        self
    }

    pub fn function_resolver(mut self, resolver: impl FunctionResolver<'a, N> + 'o) -> Self {
        self.functions = Box::new(resolver);
        self
    }

    /// Variables by name; namespaced ones are keyed `{uri}local`.
    pub fn variables(mut self, variables: HashMap<String, XPathValue<'a, N>>) -> Self {
        self.variables = Box::new(variables);
        self
    }

    pub fn variable_fn<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> Option<XPathValue<'a, N>> + 'o,
    {
        self.variables = Box::new(FnVariableResolver(lookup));
        self
    }

    pub fn variable_resolver(mut self, resolver: impl VariableResolver<'a, N> + 'o) -> Self {
        self.variables = Box::new(resolver);
        self
    }

    /// Case-insensitive local names, and unprefixed tests match any namespace. Either
    /// default can still be overridden with its own setter, in any order.
    pub fn is_html(mut self, is_html: bool) -> Self {
        self.is_html = is_html;
        self
    }

    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = Some(case_insensitive);
        self
    }

    pub fn allow_any_namespace_for_no_prefix(mut self, allow: bool) -> Self {
        self.allow_any_namespace_for_no_prefix = Some(allow);
        self
    }

    /// Treats `root` as the document root for absolute paths and upward axes.
    pub fn virtual_root(mut self, root: N) -> Self {
        self.virtual_root = Some(root);
        self
    }
}

impl<'a, 'o, N: DataSourceNode<'a>> EvaluationOptions<'a, 'o, N> {
    /// The top-level context these options describe.
    pub fn context(&self) -> EvaluationContext<'a, '_, N> {
        let node = XPathNode::Node(self.node);
        EvaluationContext {
            context_node: node,
            context_position: 1,
            context_size: 1,
            expression_node: node,
            namespaces: self.namespaces.as_ref(),
            functions: self.functions.as_ref(),
            variables: self.variables.as_ref(),
            case_insensitive: self.case_insensitive.unwrap_or(self.is_html),
            allow_any_namespace_for_no_prefix: self
                .allow_any_namespace_for_no_prefix
                .unwrap_or(self.is_html),
            virtual_root: self.virtual_root,
        }
    }
}

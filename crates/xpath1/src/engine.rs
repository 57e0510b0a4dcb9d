//! The evaluation engine for executing a parsed XPath AST against a generic `DataSourceNode`.

use crate::ast::{
    Axis, BinaryOperator, Expression, LocationPath, NodeTest, NodeTypeTest, PathExpr, Step,
    UnaryOperator,
};
use crate::context::EvaluationContext;
use crate::datasource::{DataSourceNode, NodeType};
use crate::error::XPathError;
use crate::node::XPathNode;
use crate::nodeset::NodeSet;
use crate::value::XPathValue;
use crate::{axes, functions, operators};
use log::trace;

/// Evaluates a compiled expression and returns a concrete `XPathValue`.
pub fn evaluate<'a, N: DataSourceNode<'a>>(
    expr: &Expression,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::LocationPath(path) => {
            let start = if path.is_absolute {
                e_ctx.root()
            } else {
                e_ctx.context_node
            };
            let nodes = evaluate_location_path(path, vec![start], e_ctx)?;
            Ok(XPathValue::NodeSet(nodes))
        }
        Expression::Path(path) => evaluate_path_expr(path, e_ctx),
        Expression::Variable(name) => {
            let (namespace_uri, local_name) = e_ctx.resolve_qname(name)?;
            e_ctx
                .variables
                .get_variable(local_name, namespace_uri.as_deref())
                .ok_or_else(|| XPathError::UndeclaredVariable(name.clone()))
        }
        Expression::FunctionCall { name, args } => functions::call_function(name, args, e_ctx),
        Expression::BinaryOp { left, op, right } => match op {
            // The right operand is only evaluated when the left one does not decide.
            BinaryOperator::Or => Ok(XPathValue::Boolean(
                evaluate(left, e_ctx)?.to_bool() || evaluate(right, e_ctx)?.to_bool(),
            )),
            BinaryOperator::And => Ok(XPathValue::Boolean(
                evaluate(left, e_ctx)?.to_bool() && evaluate(right, e_ctx)?.to_bool(),
            )),
            BinaryOperator::Union => {
                let mut nodes = evaluate(left, e_ctx)?.into_node_set()?;
                let other = evaluate(right, e_ctx)?.into_node_set()?;
                nodes.union(&other);
                Ok(XPathValue::NodeSet(nodes))
            }
            _ => {
                let left_val = evaluate(left, e_ctx)?;
                let right_val = evaluate(right, e_ctx)?;
                operators::evaluate(*op, left_val, right_val)
            }
        },
        Expression::UnaryOp { op, expr } => {
            let val = evaluate(expr, e_ctx)?;
            match op {
                UnaryOperator::Minus => Ok(XPathValue::Number(-val.to_number())),
            }
        }
    }
}

/// `filter[predicates]/path`. A bare filter passes its value through untouched.
fn evaluate_path_expr<'a, N: DataSourceNode<'a>>(
    path: &PathExpr,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    let value = evaluate(&path.filter, e_ctx)?;
    if path.predicates.is_empty() && path.location_path.is_none() {
        return Ok(value);
    }
    let nodes = match value {
        XPathValue::NodeSet(nodes) => nodes.to_sorted(),
        _ => {
            return Err(XPathError::Type(
                "Path expression filter must evaluate to a node-set if predicates or location path are used"
                    .to_string(),
            ));
        }
    };
    let filtered = apply_predicates(nodes, &path.predicates, e_ctx)?;
    let result = match &path.location_path {
        Some(location_path) => evaluate_location_path(location_path, filtered, e_ctx)?,
        None => {
            let mut set = NodeSet::new();
            set.extend(filtered);
            set
        }
    };
    Ok(XPathValue::NodeSet(result))
}

/// Applies each step in turn to the node-set the previous one produced.
fn evaluate_location_path<'a, N: DataSourceNode<'a>>(
    path: &LocationPath,
    start: Vec<XPathNode<'a, N>>,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<NodeSet<'a, N>, XPathError> {
    let mut current = NodeSet::new();
    current.extend(start);
    for step in &path.steps {
        current = evaluate_step(step, current.unsorted(), e_ctx)?;
    }
    Ok(current)
}

/// Evaluates a single step: axis collection, node test, then predicates, per context node.
fn evaluate_step<'a, N: DataSourceNode<'a>>(
    step: &Step,
    context_nodes: &[XPathNode<'a, N>],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<NodeSet<'a, N>, XPathError> {
    let namespace_uri = match &step.node_test {
        NodeTest::PrefixWildcard(prefix)
        | NodeTest::Name {
            prefix: Some(prefix),
            ..
        } => Some(e_ctx.resolve_prefix(prefix)?),
        _ => None,
    };

    let mut result = NodeSet::new();
    for &node in context_nodes {
        let candidates: Vec<_> = axes::collect(step.axis, node, e_ctx.virtual_root)
            .into_iter()
            .filter(|candidate| {
                matches_node_test(
                    candidate,
                    &step.node_test,
                    step.axis,
                    namespace_uri.as_deref(),
                    e_ctx,
                )
            })
            .collect();
        result.extend(apply_predicates(candidates, &step.predicates, e_ctx)?);
    }
    trace!("{} selected {} node(s)", step, result.len());
    Ok(result)
}

/// Filters nodes by a `NodeTest`. `namespace_uri` is the test's prefix, already resolved.
fn matches_node_test<'a, N: DataSourceNode<'a>>(
    node: &XPathNode<'a, N>,
    test: &NodeTest,
    axis: Axis,
    namespace_uri: Option<&str>,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> bool {
    let principal = axis.principal_node_type();
    match test {
        NodeTest::NodeType(NodeTypeTest::Node) => true,
        NodeTest::NodeType(NodeTypeTest::Text) => {
            matches!(node.node_type(), NodeType::Text | NodeType::CData)
        }
        NodeTest::NodeType(NodeTypeTest::Comment) => node.node_type() == NodeType::Comment,
        NodeTest::NodeType(NodeTypeTest::ProcessingInstruction(target)) => {
            node.node_type() == NodeType::ProcessingInstruction
                && target.as_ref().is_none_or(|target| {
                    node.name().is_some_and(|q| q.local_part == target.as_str())
                })
        }
        NodeTest::Wildcard => node.node_type() == principal,
        NodeTest::PrefixWildcard(_) => {
            node.node_type() == principal && node.namespace_uri() == namespace_uri
        }
        NodeTest::Name { prefix, local } => {
            if node.node_type() != principal {
                return false;
            }
            let Some(name) = node.name() else {
                return false;
            };
            let same_local = if e_ctx.case_insensitive {
                name.local_part.to_lowercase() == local.to_lowercase()
            } else {
                name.local_part == local.as_str()
            };
            if !same_local {
                return false;
            }
            match prefix {
                Some(_) => node.namespace_uri() == namespace_uri,
                None => {
                    node.namespace_uri().is_none_or(str::is_empty)
                        || (e_ctx.allow_any_namespace_for_no_prefix && name.prefix.is_none())
                }
            }
        }
    }
}

/// Filters nodes through each predicate in turn. Every stage numbers positions against the
/// nodes the previous stage kept.
fn apply_predicates<'a, N: DataSourceNode<'a>>(
    nodes: Vec<XPathNode<'a, N>>,
    predicates: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<XPathNode<'a, N>>, XPathError> {
    let mut current = nodes;
    for predicate in predicates {
        let context_size = current.len();
        let mut kept = Vec::with_capacity(context_size);
        for (i, node) in current.into_iter().enumerate() {
            let predicate_ctx = e_ctx.with_node(node, i + 1, context_size);
            let keep = match evaluate(predicate, &predicate_ctx)? {
                XPathValue::Number(n) => n == (i + 1) as f64,
                other => other.to_bool(),
            };
            if keep {
                kept.push(node);
            }
        }
        current = kept;
    }
    Ok(current)
}

//! Comparison and arithmetic over already-evaluated operands.
//! `or`, `and` and `|` never reach this module; the engine handles them itself.

use crate::ast::BinaryOperator;
use crate::datasource::DataSourceNode;
use crate::error::XPathError;
use crate::nodeset::NodeSet;
use crate::value::{XPathValue, string_to_number};

/// Applies an equality, relational or arithmetic operator.
pub fn evaluate<'a, N: DataSourceNode<'a>>(
    op: BinaryOperator,
    left: XPathValue<'a, N>,
    right: XPathValue<'a, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    let result = match op {
        BinaryOperator::Equals
        | BinaryOperator::NotEquals
        | BinaryOperator::LessThan
        | BinaryOperator::LessThanOrEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanOrEqual => XPathValue::Boolean(compare(op, &left, &right)),
        BinaryOperator::Plus => XPathValue::Number(left.to_number() + right.to_number()),
        BinaryOperator::Minus => XPathValue::Number(left.to_number() - right.to_number()),
        BinaryOperator::Multiply => XPathValue::Number(left.to_number() * right.to_number()),
        BinaryOperator::Divide => XPathValue::Number(left.to_number() / right.to_number()),
        BinaryOperator::Modulo => XPathValue::Number(left.to_number() % right.to_number()),
        BinaryOperator::Or | BinaryOperator::And | BinaryOperator::Union => {
            return Err(XPathError::Type(format!(
                "Operator '{}' cannot be applied to evaluated operands",
                op.symbol()
            )));
        }
    };
    Ok(result)
}

/// One side of a comparison once node-sets have been broken into their members.
enum Scalar<'s> {
    String(&'s str),
    Number(f64),
    Boolean(bool),
}

fn scalar_of<'s, 'a, N: DataSourceNode<'a>>(value: &'s XPathValue<'a, N>) -> Option<Scalar<'s>> {
    match value {
        XPathValue::String(s) => Some(Scalar::String(s)),
        XPathValue::Number(n) => Some(Scalar::Number(*n)),
        XPathValue::Boolean(b) => Some(Scalar::Boolean(*b)),
        XPathValue::NodeSet(_) => None,
    }
}

/// The XPath 1.0 comparison matrix. Node-set operands compare existentially.
pub fn compare<'a, N: DataSourceNode<'a>>(
    op: BinaryOperator,
    left: &XPathValue<'a, N>,
    right: &XPathValue<'a, N>,
) -> bool {
    match (left, right) {
        (XPathValue::NodeSet(l), XPathValue::NodeSet(r)) => {
            let right_strings: Vec<String> =
                r.unsorted().iter().map(|n| n.string_value()).collect();
            l.unsorted().iter().any(|ln| {
                let ls = ln.string_value();
                right_strings
                    .iter()
                    .any(|rs| compare_scalars(op, &Scalar::String(&ls), &Scalar::String(rs)))
            })
        }
        (XPathValue::NodeSet(nodes), other) => match scalar_of(other) {
            Some(scalar) => compare_node_set(op, nodes, &scalar, false),
            None => false,
        },
        (other, XPathValue::NodeSet(nodes)) => match scalar_of(other) {
            Some(scalar) => compare_node_set(op, nodes, &scalar, true),
            None => false,
        },
        _ => match (scalar_of(left), scalar_of(right)) {
            (Some(l), Some(r)) => compare_scalars(op, &l, &r),
            _ => false,
        },
    }
}

/// Compares every member of `nodes` against `scalar`; `swapped` keeps the operand order
/// when the node-set was written on the right.
fn compare_node_set<'a, N: DataSourceNode<'a>>(
    op: BinaryOperator,
    nodes: &NodeSet<'a, N>,
    scalar: &Scalar<'_>,
    swapped: bool,
) -> bool {
    let ordered = |node_side: Scalar<'_>| {
        if swapped {
            compare_scalars(op, scalar, &node_side)
        } else {
            compare_scalars(op, &node_side, scalar)
        }
    };
    match scalar {
        Scalar::Boolean(_) => ordered(Scalar::Boolean(!nodes.is_empty())),
        Scalar::Number(_) => nodes
            .unsorted()
            .iter()
            .any(|n| ordered(Scalar::Number(string_to_number(&n.string_value())))),
        Scalar::String(_) => nodes.unsorted().iter().any(|n| {
            let value = n.string_value();
            ordered(Scalar::String(&value))
        }),
    }
}

fn scalar_to_number(scalar: &Scalar<'_>) -> f64 {
    match scalar {
        Scalar::String(s) => string_to_number(s),
        Scalar::Number(n) => *n,
        Scalar::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
    }
}

fn scalar_to_bool(scalar: &Scalar<'_>) -> bool {
    match scalar {
        Scalar::String(s) => !s.is_empty(),
        Scalar::Number(n) => *n != 0.0 && !n.is_nan(),
        Scalar::Boolean(b) => *b,
    }
}

fn compare_scalars(op: BinaryOperator, left: &Scalar<'_>, right: &Scalar<'_>) -> bool {
    match op {
        BinaryOperator::Equals | BinaryOperator::NotEquals => {
            let equal = match (left, right) {
                (Scalar::Boolean(_), _) | (_, Scalar::Boolean(_)) => {
                    scalar_to_bool(left) == scalar_to_bool(right)
                }
                (Scalar::Number(_), _) | (_, Scalar::Number(_)) => {
                    scalar_to_number(left) == scalar_to_number(right)
                }
                (Scalar::String(l), Scalar::String(r)) => l == r,
            };
            if op == BinaryOperator::Equals {
                equal
            } else {
                !equal
            }
        }
        _ => {
            let (l, r) = (scalar_to_number(left), scalar_to_number(right));
            match op {
                BinaryOperator::LessThan => l < r,
                BinaryOperator::LessThanOrEqual => l <= r,
                BinaryOperator::GreaterThan => l > r,
                BinaryOperator::GreaterThanOrEqual => l >= r,
                _ => false,
            }
        }
    }
}

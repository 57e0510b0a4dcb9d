//! The four XPath value kinds and the conversions between them.

use crate::datasource::DataSourceNode;
use crate::error::XPathError;
use crate::node::XPathNode;
use crate::nodeset::NodeSet;
use nom::branch::alt;
use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, opt, recognize};
use nom::{IResult, Parser};
use std::fmt;

/// Represents the possible result types of an XPath expression evaluation.
#[derive(Debug, Clone)]
pub enum XPathValue<'a, N> {
    NodeSet(NodeSet<'a, N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, N: DataSourceNode<'a>> XPathValue<'a, N> {
    /// A node-set value holding the given DOM nodes.
    pub fn from_nodes(nodes: impl IntoIterator<Item = N>) -> Self {
        XPathValue::NodeSet(NodeSet::from_nodes(nodes))
    }

    /// Coerces the XPath value to a boolean as per XPath 1.0 rules.
    pub fn to_bool(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::Boolean(b) => *b,
        }
    }

    /// Coerces the XPath value to a number as per XPath 1.0 rules.
    pub fn to_number(&self) -> f64 {
        match self {
            XPathValue::Number(n) => *n,
            XPathValue::String(s) => string_to_number(s),
            XPathValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            XPathValue::NodeSet(nodes) => string_to_number(&nodes.string_value()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            XPathValue::NodeSet(_) => "node-set",
            XPathValue::String(_) => "string",
            XPathValue::Number(_) => "number",
            XPathValue::Boolean(_) => "boolean",
        }
    }

    /// Unwraps a node-set, failing with a type error for any scalar.
    pub fn into_node_set(self) -> Result<NodeSet<'a, N>, XPathError> {
        match self {
            XPathValue::NodeSet(nodes) => Ok(nodes),
            other => Err(XPathError::Type(format!(
                "Cannot convert {} to node-set",
                other.type_name()
            ))),
        }
    }

    /// The nodes of a node-set value in document order; empty for scalars.
    pub fn sorted_nodes(&self) -> Vec<XPathNode<'a, N>> {
        match self {
            XPathValue::NodeSet(nodes) => nodes.to_sorted(),
            _ => Vec::new(),
        }
    }
}

impl<'a, N: DataSourceNode<'a>> fmt::Display for XPathValue<'a, N> {
    /// Coerces the XPath value to a string as per XPath 1.0 rules.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XPathValue::NodeSet(nodes) => f.write_str(&nodes.string_value()),
            XPathValue::String(s) => f.write_str(s),
            XPathValue::Number(n) => f.write_str(&number_to_string(*n)),
            XPathValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

pub(crate) fn is_xpath_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn numeric_literal(input: &str) -> IResult<&str, &str> {
    recognize((
        opt(char('-')),
        alt((
            recognize((digit1, opt((char('.'), digit1)))),
            recognize((char('.'), digit1)),
        )),
    ))
    .parse(input)
}

/// Parses a string as an XPath number: optional whitespace, an optional minus sign,
/// digits with at most one decimal point (at least one digit after it), optional
/// whitespace. Anything else is `NaN`.
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_xpath_whitespace);
    match all_consuming(numeric_literal).parse(trimmed) {
        Ok((_, text)) => text.parse().unwrap_or(f64::NAN),
        Err(_) => f64::NAN,
    }
}

/// Formats a number per the XPath `string()` rules: integers without a fraction, never
/// exponent notation, `NaN`/`Infinity`/`-Infinity` by name, and negative zero as `0`.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

//! Function call dispatch and the built-in XPath 1.0 function library.
//!
//! Built-in functions receive their argument expressions unevaluated and evaluate them
//! as needed; custom functions registered through a `FunctionResolver` receive values.

use crate::ast::Expression;
use crate::context::EvaluationContext;
use crate::datasource::{DataSourceNode, NodeType, XML_NAMESPACE};
use crate::engine::evaluate;
use crate::error::XPathError;
use crate::node::XPathNode;
use crate::nodeset::NodeSet;
use crate::value::{XPathValue, is_xpath_whitespace, string_to_number};
use std::collections::HashSet;

/// Resolves `name` and calls it. Custom functions shadow built-ins; only unprefixed
/// names reach the built-in library.
pub fn call_function<'a, N: DataSourceNode<'a>>(
    name: &str,
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    let (namespace_uri, local_name) = e_ctx.resolve_qname(name)?;
    if let Some(function) = e_ctx
        .functions
        .get_function(local_name, namespace_uri.as_deref())
    {
        let values = args
            .iter()
            .map(|arg| evaluate(arg, e_ctx))
            .collect::<Result<Vec<_>, _>>()?;
        return function.call(e_ctx, values);
    }
    if namespace_uri.is_none() {
        if let Some(result) = standard_function(local_name, args, e_ctx) {
            return result;
        }
    }
    Err(XPathError::UnknownFunction(name.to_string()))
}

/// Dispatches to a built-in implementation, or `None` for a name outside the library.
fn standard_function<'a, N: DataSourceNode<'a>>(
    name: &str,
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Option<Result<XPathValue<'a, N>, XPathError>> {
    let result = match name {
        // Node-Set
        "last" => func_last(args, e_ctx),
        "position" => func_position(args, e_ctx),
        "count" => func_count(args, e_ctx),
        "id" => func_id(args, e_ctx),
        "local-name" => func_local_name(args, e_ctx),
        "namespace-uri" => func_namespace_uri(args, e_ctx),
        "name" => func_name(args, e_ctx),

        // String
        "string" => func_string(args, e_ctx),
        "concat" => func_concat(args, e_ctx),
        "starts-with" => func_starts_with(args, e_ctx),
        "contains" => func_contains(args, e_ctx),
        "substring-before" => func_substring_before(args, e_ctx),
        "substring-after" => func_substring_after(args, e_ctx),
        "substring" => func_substring(args, e_ctx),
        "string-length" => func_string_length(args, e_ctx),
        "normalize-space" => func_normalize_space(args, e_ctx),
        "translate" => func_translate(args, e_ctx),

        // Boolean
        "boolean" => func_boolean(args, e_ctx),
        "not" => func_not(args, e_ctx),
        "true" => func_true(args),
        "false" => func_false(args),
        "lang" => func_lang(args, e_ctx),

        // Number
        "number" => func_number(args, e_ctx),
        "sum" => func_sum(args, e_ctx),
        "floor" => func_floor(args, e_ctx),
        "ceiling" => func_ceiling(args, e_ctx),
        "round" => func_round(args, e_ctx),
        _ => return None,
    };
    Some(result)
}

// --- Argument helpers ---

/// Fails unless `min <= args.len() <= max`. `usize::MAX` means no upper bound.
fn check_arity(
    function: &str,
    args: &[Expression],
    min: usize,
    max: usize,
) -> Result<(), XPathError> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let message = match (min, max) {
        (1, 1) => "Expected 1 argument".to_string(),
        (min, usize::MAX) => format!("Expected at least {min} arguments"),
        (min, max) if min == max => format!("Expected {min} arguments"),
        (min, max) => format!("Expected {min} or {max} arguments"),
    };
    Err(XPathError::function(function, message))
}

fn string_arg<'a, N: DataSourceNode<'a>>(
    arg: &Expression,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<String, XPathError> {
    Ok(evaluate(arg, e_ctx)?.to_string())
}

fn number_arg<'a, N: DataSourceNode<'a>>(
    arg: &Expression,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<f64, XPathError> {
    Ok(evaluate(arg, e_ctx)?.to_number())
}

fn node_set_arg<'a, N: DataSourceNode<'a>>(
    function: &str,
    arg: &Expression,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<NodeSet<'a, N>, XPathError> {
    match evaluate(arg, e_ctx)? {
        XPathValue::NodeSet(nodes) => Ok(nodes),
        other => Err(XPathError::function(
            function,
            format!("Argument must be a node-set, got {}", other.type_name()),
        )),
    }
}

/// The string argument, or the context node's string-value when it is omitted.
fn string_or_context<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<String, XPathError> {
    match args.first() {
        Some(arg) => string_arg(arg, e_ctx),
        None => Ok(e_ctx.context_node.string_value()),
    }
}

/// The first node of the node-set argument in document order, or the context node.
fn node_or_context<'a, N: DataSourceNode<'a>>(
    function: &str,
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Option<XPathNode<'a, N>>, XPathError> {
    match args.first() {
        Some(arg) => Ok(node_set_arg(function, arg, e_ctx)?.first()),
        None => Ok(Some(e_ctx.context_node)),
    }
}

// --- Node-Set Functions ---

fn func_last<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("last", args, 0, 0)?;
    Ok(XPathValue::Number(e_ctx.context_size as f64))
}

fn func_position<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("position", args, 0, 0)?;
    Ok(XPathValue::Number(e_ctx.context_position as f64))
}

fn func_count<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("count", args, 1, 1)?;
    let nodes = node_set_arg("count", &args[0], e_ctx)?;
    Ok(XPathValue::Number(nodes.len() as f64))
}

fn func_id<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("id", args, 1, 1)?;
    let id_string = match evaluate(&args[0], e_ctx)? {
        XPathValue::NodeSet(nodes) => nodes
            .unsorted()
            .iter()
            .map(|n| n.string_value())
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    };
    let mut remaining: HashSet<&str> = id_string
        .split(is_xpath_whitespace)
        .filter(|s| !s.is_empty())
        .collect();

    let mut results = NodeSet::new();
    let Some(document) = e_ctx.document().as_node() else {
        return Ok(XPathValue::NodeSet(results));
    };
    remaining.retain(|id| match document.element_by_id(id) {
        Some(element) => {
            results.add(XPathNode::Node(element));
            false
        }
        None => true,
    });
    if remaining.is_empty() {
        return Ok(XPathValue::NodeSet(results));
    }

    let mut stack: Vec<N> = document.children().collect();
    while let Some(node) = stack.pop() {
        if node.node_type() == NodeType::Element {
            for attr in node.attributes() {
                if let Some(q_name) = attr.name() {
                    let is_id_attr = (q_name.prefix == Some("xml") || q_name.prefix.is_none())
                        && q_name.local_part == "id";
                    if is_id_attr && remaining.contains(attr.string_value().as_str()) {
                        results.add(XPathNode::Node(node));
                    }
                }
            }
        }
        stack.extend(node.children());
    }
    Ok(XPathValue::NodeSet(results))
}

fn func_local_name<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("local-name", args, 0, 1)?;
    let name = node_or_context("local-name", args, e_ctx)?
        .and_then(|n| n.name().map(|q| q.local_part.to_string()))
        .unwrap_or_default();
    Ok(XPathValue::String(name))
}

fn func_namespace_uri<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("namespace-uri", args, 0, 1)?;
    let uri = node_or_context("namespace-uri", args, e_ctx)?
        .and_then(|n| n.namespace_uri())
        .unwrap_or_default();
    Ok(XPathValue::String(uri.to_string()))
}

fn func_name<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("name", args, 0, 1)?;
    let name = node_or_context("name", args, e_ctx)?
        .and_then(|n| n.name().map(|q| q.to_string()))
        .unwrap_or_default();
    Ok(XPathValue::String(name))
}

// --- String Functions ---

fn func_string<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("string", args, 0, 1)?;
    Ok(XPathValue::String(string_or_context(args, e_ctx)?))
}

fn func_concat<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("concat", args, 2, usize::MAX)?;
    let mut result = String::new();
    for arg in args {
        result.push_str(&string_arg(arg, e_ctx)?);
    }
    Ok(XPathValue::String(result))
}

fn func_starts_with<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("starts-with", args, 2, 2)?;
    let s1 = string_arg(&args[0], e_ctx)?;
    let s2 = string_arg(&args[1], e_ctx)?;
    Ok(XPathValue::Boolean(s1.starts_with(&s2)))
}

fn func_contains<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("contains", args, 2, 2)?;
    let s1 = string_arg(&args[0], e_ctx)?;
    let s2 = string_arg(&args[1], e_ctx)?;
    Ok(XPathValue::Boolean(s1.contains(&s2)))
}

fn func_substring_before<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("substring-before", args, 2, 2)?;
    let s1 = string_arg(&args[0], e_ctx)?;
    let s2 = string_arg(&args[1], e_ctx)?;
    let before = s1.find(&s2).map(|index| &s1[..index]).unwrap_or("");
    Ok(XPathValue::String(before.to_string()))
}

fn func_substring_after<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("substring-after", args, 2, 2)?;
    let s1 = string_arg(&args[0], e_ctx)?;
    let s2 = string_arg(&args[1], e_ctx)?;
    let after = s1
        .find(&s2)
        .map(|index| &s1[index + s2.len()..])
        .unwrap_or("");
    Ok(XPathValue::String(after.to_string()))
}

/// `floor(n + 0.5)`, except that NaN, infinities and zeros pass through and
/// `[-0.5, 0)` rounds to negative zero.
fn xpath_round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() || n == 0.0 {
        n
    } else if (-0.5..0.0).contains(&n) {
        -0.0
    } else {
        (n + 0.5).floor()
    }
}

fn func_substring<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("substring", args, 2, 3)?;
    let s = string_arg(&args[0], e_ctx)?;
    let first = xpath_round(number_arg(&args[1], e_ctx)?);
    let last = match args.get(2) {
        Some(length) => first + xpath_round(number_arg(length, e_ctx)?),
        None => f64::INFINITY,
    };

    // Positions are 1-based; NaN bounds select nothing.
    let result = s
        .chars()
        .enumerate()
        .filter(|(i, _)| {
            let pos = (i + 1) as f64;
            pos >= first && pos < last
        })
        .map(|(_, c)| c)
        .collect::<String>();
    Ok(XPathValue::String(result))
}

fn func_string_length<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("string-length", args, 0, 1)?;
    let s = string_or_context(args, e_ctx)?;
    Ok(XPathValue::Number(s.chars().count() as f64))
}

fn func_normalize_space<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("normalize-space", args, 0, 1)?;
    let s = string_or_context(args, e_ctx)?;
    let normalized = s
        .split(is_xpath_whitespace)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(XPathValue::String(normalized))
}

fn func_translate<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("translate", args, 3, 3)?;
    let source_str = string_arg(&args[0], e_ctx)?;
    let from_str: Vec<char> = string_arg(&args[1], e_ctx)?.chars().collect();
    let to_str: Vec<char> = string_arg(&args[2], e_ctx)?.chars().collect();
    let result = source_str
        .chars()
        .filter_map(|c| match from_str.iter().position(|&fc| fc == c) {
            Some(pos) => to_str.get(pos).copied(),
            None => Some(c),
        })
        .collect::<String>();
    Ok(XPathValue::String(result))
}

// --- Boolean Functions ---

fn func_boolean<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("boolean", args, 1, 1)?;
    Ok(XPathValue::Boolean(evaluate(&args[0], e_ctx)?.to_bool()))
}

fn func_not<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("not", args, 1, 1)?;
    Ok(XPathValue::Boolean(!evaluate(&args[0], e_ctx)?.to_bool()))
}

fn func_true<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("true", args, 0, 0)?;
    Ok(XPathValue::Boolean(true))
}

fn func_false<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("false", args, 0, 0)?;
    Ok(XPathValue::Boolean(false))
}

/// True if the nearest `xml:lang` in scope equals the argument or starts with it followed
/// by `-`. The comparison is case-sensitive.
fn func_lang<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("lang", args, 1, 1)?;
    let test_lang = string_arg(&args[0], e_ctx)?;

    let mut current = match e_ctx.context_node.node_type() {
        NodeType::Element => e_ctx.context_node.as_node(),
        _ => e_ctx.context_node.parent().and_then(|p| p.as_node()),
    };
    while let Some(node) = current {
        let declared = node.attributes().find(|attr| {
            attr.name().is_some_and(|name| {
                name.local_part == "lang"
                    && (name.prefix == Some("xml") || attr.namespace_uri() == Some(XML_NAMESPACE))
            })
        });
        if let Some(attr) = declared {
            let node_lang = attr.string_value();
            let matched = node_lang
                .strip_prefix(test_lang.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'));
            return Ok(XPathValue::Boolean(matched));
        }
        current = node.parent();
    }
    Ok(XPathValue::Boolean(false))
}

// --- Number Functions ---

fn func_number<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("number", args, 0, 1)?;
    let n = match args.first() {
        Some(arg) => number_arg(arg, e_ctx)?,
        None => string_to_number(&e_ctx.context_node.string_value()),
    };
    Ok(XPathValue::Number(n))
}

fn func_sum<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("sum", args, 1, 1)?;
    let sum = node_set_arg("sum", &args[0], e_ctx)?
        .unsorted()
        .iter()
        .map(|node| string_to_number(&node.string_value()))
        .sum();
    Ok(XPathValue::Number(sum))
}

fn func_floor<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("floor", args, 1, 1)?;
    Ok(XPathValue::Number(number_arg(&args[0], e_ctx)?.floor()))
}

fn func_ceiling<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("ceiling", args, 1, 1)?;
    Ok(XPathValue::Number(number_arg(&args[0], e_ctx)?.ceil()))
}

fn func_round<'a, N: DataSourceNode<'a>>(
    args: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<'a, N>, XPathError> {
    check_arity("round", args, 1, 1)?;
    Ok(XPathValue::Number(xpath_round(number_arg(&args[0], e_ctx)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FunctionRegistry, MapNamespaceResolver};
    use crate::datasource::tests::{MockNode, MockTree, create_html_tree, create_test_tree};
    use crate::parser::parse_expression;
    use std::collections::HashMap;

    // --- Test Setup ---

    // Holds the tree reference and hands out contexts positioned on a given node.
    struct TestSetup<'a> {
        tree: &'a MockTree<'a>,
    }

    impl<'a> TestSetup<'a> {
        fn new(tree: &'a MockTree<'a>) -> Self {
            TestSetup { tree }
        }

        fn context(
            &self,
            node_id: usize,
            pos: usize,
            size: usize,
        ) -> EvaluationContext<'a, 'a, MockNode<'a>> {
            let node = self.tree.node(node_id);
            EvaluationContext::new(node).with_node(XPathNode::Node(node), pos, size)
        }
    }

    fn try_eval<'a>(
        expr: &str,
        e_ctx: &EvaluationContext<'a, '_, MockNode<'a>>,
    ) -> Result<XPathValue<'a, MockNode<'a>>, XPathError> {
        evaluate(&parse_expression(expr).unwrap(), e_ctx)
    }

    fn eval_func<'a>(
        expr: &str,
        e_ctx: &EvaluationContext<'a, '_, MockNode<'a>>,
    ) -> XPathValue<'a, MockNode<'a>> {
        try_eval(expr, e_ctx).unwrap()
    }

    fn ids<'a>(value: &XPathValue<'a, MockNode<'a>>) -> Vec<usize> {
        value
            .sorted_nodes()
            .iter()
            .filter_map(|n| n.as_node())
            .map(|n| n.id)
            .collect()
    }

    // --- String Function Tests ---

    #[test]
    fn test_func_concat() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx = setup.context(0, 1, 1);
        assert_eq!(eval_func("concat('a', 'b', 'c')", &e_ctx).to_string(), "abc");
        assert_eq!(
            eval_func("concat('Hello', ' ', 'World', 42)", &e_ctx).to_string(),
            "Hello World42"
        );
    }

    #[test]
    fn test_func_starts_with_and_contains() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx = setup.context(0, 1, 1);
        assert!(eval_func("starts-with('abcdef', 'abc')", &e_ctx).to_bool());
        assert!(!eval_func("starts-with('abcdef', 'def')", &e_ctx).to_bool());
        assert!(eval_func("contains('abcdef', 'cde')", &e_ctx).to_bool());
        assert!(eval_func("contains('abc', '')", &e_ctx).to_bool());
    }

    #[test]
    fn test_func_substring_before_after() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx = setup.context(0, 1, 1);
        assert_eq!(eval_func("substring-before('1999/04/01', '/')", &e_ctx).to_string(), "1999");
        assert_eq!(eval_func("substring-after('1999/04/01', '/')", &e_ctx).to_string(), "04/01");
        assert_eq!(eval_func("substring-after('abc', 'x')", &e_ctx).to_string(), "");
    }

    #[test]
    fn test_func_substring() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx = setup.context(0, 1, 1);
        assert_eq!(eval_func("substring('12345', 2, 3)", &e_ctx).to_string(), "234");
        assert_eq!(eval_func("substring('12345', 2)", &e_ctx).to_string(), "2345");
        assert_eq!(eval_func("substring('12345', 0, 3)", &e_ctx).to_string(), "12");
        assert_eq!(eval_func("substring('12345', 1.5, 2.6)", &e_ctx).to_string(), "234");
        assert_eq!(eval_func("substring('12345', 0 div 0, 3)", &e_ctx).to_string(), "");
        assert_eq!(eval_func("substring('12345', -42, 1 div 0)", &e_ctx).to_string(), "12345");
        assert_eq!(
            eval_func("substring('12345', -1 div 0, 1 div 0)", &e_ctx).to_string(),
            ""
        );
    }

    #[test]
    fn test_func_string_length() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx_para = setup.context(1, 1, 1);
        assert_eq!(eval_func("string-length()", &e_ctx_para).to_number(), 5.0);
        assert_eq!(eval_func("string-length('four')", &e_ctx_para).to_number(), 4.0);
        assert_eq!(eval_func("string-length('\u{e9}t\u{e9}')", &e_ctx_para).to_number(), 3.0);
    }

    #[test]
    fn test_func_normalize_space() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx = setup.context(0, 1, 1);
        assert_eq!(
            eval_func("normalize-space('  leading \n and   \t trailing  ')", &e_ctx).to_string(),
            "leading and trailing"
        );
    }

    #[test]
    fn test_func_translate() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx = setup.context(0, 1, 1);
        assert_eq!(eval_func("translate('BAR', 'ABC', 'abc')", &e_ctx).to_string(), "baR");
        assert_eq!(eval_func("translate('--aaa--', 'abc-', 'ABC')", &e_ctx).to_string(), "AAA");
        assert_eq!(eval_func("translate('aba', 'aa', 'xy')", &e_ctx).to_string(), "xbx");
    }

    #[test]
    fn test_func_string_formats_numbers() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx = setup.context(0, 1, 1);
        assert_eq!(eval_func("string(2.0)", &e_ctx).to_string(), "2");
        assert_eq!(eval_func("string(-0.25)", &e_ctx).to_string(), "-0.25");
        assert_eq!(eval_func("string(1 div 0)", &e_ctx).to_string(), "Infinity");
        assert_eq!(eval_func("string(-0)", &e_ctx).to_string(), "0");
        assert_eq!(eval_func("string(1 = 1)", &e_ctx).to_string(), "true");
        assert_eq!(eval_func("string(para)", &e_ctx).to_string(), "Hello");
    }

    // --- Boolean Function Tests ---

    #[test]
    fn test_func_boolean_and_not() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx = setup.context(0, 1, 1);
        assert!(!eval_func("not(true())", &e_ctx).to_bool());
        assert!(eval_func("not(0)", &e_ctx).to_bool());
        assert!(eval_func("not('')", &e_ctx).to_bool());
        assert!(eval_func("boolean(para)", &e_ctx).to_bool());
        assert!(!eval_func("boolean(missing)", &e_ctx).to_bool());
        assert!(!eval_func("boolean(0 div 0)", &e_ctx).to_bool());
    }

    #[test]
    fn test_func_lang() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx_text = setup.context(4, 1, 1); // "Hello", inside para with xml:lang="en"
        let e_ctx_div = setup.context(6, 1, 1);

        assert!(eval_func("lang('en')", &e_ctx_text).to_bool());
        assert!(!eval_func("lang('en-GB')", &e_ctx_text).to_bool());
        assert!(!eval_func("lang('EN')", &e_ctx_text).to_bool());
        assert!(!eval_func("lang('en')", &e_ctx_div).to_bool());

        let mut tree = MockTree::new();
        let outer = tree.add_element(0, "outer");
        tree.add_attribute(outer, "xml:lang", "en-US");
        let inner = tree.add_element(outer, "inner");
        let setup = TestSetup::new(&tree);
        assert!(eval_func("lang('en')", &setup.context(inner, 1, 1)).to_bool());
        assert!(!eval_func("lang('e')", &setup.context(inner, 1, 1)).to_bool());
    }

    // --- Number Function Tests ---

    #[test]
    fn test_func_number_and_sum() {
        let mut tree = MockTree::new();
        let list = tree.add_element(0, "list");
        for value in ["1", " 2.5 ", "3"] {
            let item = tree.add_element(list, "n");
            tree.add_text(item, value);
        }
        let setup = TestSetup::new(&tree);
        let e_ctx = setup.context(0, 1, 1);
        assert_eq!(eval_func("sum(//n)", &e_ctx).to_number(), 6.5);
        assert_eq!(eval_func("number(//n[2])", &e_ctx).to_number(), 2.5);
        assert!(eval_func("number('1e3')", &e_ctx).to_number().is_nan());
        assert!(eval_func("sum(list)", &e_ctx).to_number().is_nan());
        assert_eq!(eval_func("number(true())", &e_ctx).to_number(), 1.0);
    }

    #[test]
    fn test_func_round() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx = setup.context(0, 1, 1);
        assert_eq!(eval_func("round(2.5)", &e_ctx).to_number(), 3.0);
        assert_eq!(eval_func("round(2.4)", &e_ctx).to_number(), 2.0);
        assert_eq!(eval_func("round(-2.5)", &e_ctx).to_number(), -2.0);
        assert_eq!(eval_func("round(-2.6)", &e_ctx).to_number(), -3.0);
        let negative_zero = eval_func("round(-0.2)", &e_ctx).to_number();
        assert!(negative_zero == 0.0 && negative_zero.is_sign_negative());
        assert_eq!(eval_func("floor(-1.5)", &e_ctx).to_number(), -2.0);
        assert_eq!(eval_func("ceiling(1.2)", &e_ctx).to_number(), 2.0);
    }

    // --- Node-Set Function Tests ---

    #[test]
    fn test_func_last_and_position() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        // The 2nd node in a context of 5 nodes
        let e_ctx = setup.context(1, 2, 5);
        assert_eq!(eval_func("last()", &e_ctx).to_number(), 5.0);
        assert_eq!(eval_func("position()", &e_ctx).to_number(), 2.0);
    }

    #[test]
    fn test_func_count() {
        let tree = create_html_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx = setup.context(0, 1, 1);
        assert_eq!(eval_func("count(//li)", &e_ctx).to_number(), 3.0);
        assert_eq!(eval_func("count(//li/@class)", &e_ctx).to_number(), 2.0);
        let err = try_eval("count('li')", &e_ctx).unwrap_err();
        assert!(matches!(err, XPathError::FunctionError { ref function, .. } if function == "count()"));
    }

    #[test]
    fn test_func_local_name_and_name() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx_para = setup.context(1, 1, 1);
        let e_ctx_text = setup.context(4, 1, 1);

        assert_eq!(eval_func("local-name()", &e_ctx_para).to_string(), "para");
        assert_eq!(eval_func("local-name()", &e_ctx_text).to_string(), "");
        assert_eq!(eval_func("name(@*[2])", &e_ctx_para).to_string(), "xml:lang");
        assert_eq!(eval_func("local-name(@*[2])", &e_ctx_para).to_string(), "lang");
        assert_eq!(
            eval_func("namespace-uri(@*[2])", &e_ctx_para).to_string(),
            XML_NAMESPACE
        );
        assert_eq!(eval_func("name(/missing)", &e_ctx_para).to_string(), "");
        assert_eq!(eval_func("local-name(/processing-instruction())", &e_ctx_para).to_string(), "pi-target");
    }

    #[test]
    fn test_namespace_nodes_through_functions() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx = setup.context(1, 1, 1);
        assert_eq!(eval_func("name(namespace::*)", &e_ctx).to_string(), "xml");
        assert_eq!(eval_func("string(namespace::xml)", &e_ctx).to_string(), XML_NAMESPACE);
        assert_eq!(eval_func("namespace-uri(namespace::xml)", &e_ctx).to_string(), "");
    }

    #[test]
    fn test_func_id() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx = setup.context(6, 1, 1);
        assert_eq!(ids(&eval_func("id('p1')", &e_ctx)), vec![1]);
        assert_eq!(ids(&eval_func("id(' nothing p1 ')", &e_ctx)), vec![1]);
        assert_eq!(ids(&eval_func("id(/para/@id)", &e_ctx)), vec![1]);
        assert!(ids(&eval_func("id('p2')", &e_ctx)).is_empty());
    }

    #[test]
    fn test_arity_errors_name_the_function() {
        let tree = create_test_tree();
        let setup = TestSetup::new(&tree);
        let e_ctx = setup.context(0, 1, 1);
        assert_eq!(
            try_eval("concat('a')", &e_ctx).unwrap_err(),
            XPathError::FunctionError {
                function: "concat()".to_string(),
                message: "Expected at least 2 arguments".to_string(),
            }
        );
        assert_eq!(
            try_eval("true(1)", &e_ctx).unwrap_err(),
            XPathError::FunctionError {
                function: "true()".to_string(),
                message: "Expected 0 arguments".to_string(),
            }
        );
        assert_eq!(
            try_eval("substring('a')", &e_ctx).unwrap_err(),
            XPathError::FunctionError {
                function: "substring()".to_string(),
                message: "Expected 2 or 3 arguments".to_string(),
            }
        );
        assert_eq!(
            try_eval("not()", &e_ctx).unwrap_err(),
            XPathError::FunctionError {
                function: "not()".to_string(),
                message: "Expected 1 argument".to_string(),
            }
        );
    }

    // --- Custom Functions ---

    #[test]
    fn test_custom_functions() {
        let tree = create_html_tree();
        let mut registry: FunctionRegistry<MockNode> = FunctionRegistry::new();
        registry.register("double", |_ctx, args| {
            let n = args.first().map(|v| v.to_number()).unwrap_or(f64::NAN);
            Ok(XPathValue::Number(n * 2.0))
        });
        registry.register("count", |_ctx, _args| Ok(XPathValue::Number(42.0)));
        registry.register_ns("urn:ext", "upper", |_ctx, args| {
            let s = args.first().map(|v| v.to_string()).unwrap_or_default();
            Ok(XPathValue::String(s.to_uppercase()))
        });
        registry.register_ns("urn:ext", "here", |ctx, _args| {
            Ok(XPathValue::NodeSet(NodeSet::from_nodes(ctx.context_node.as_node())))
        });
        let resolver = MapNamespaceResolver(HashMap::from([(
            "ext".to_string(),
            "urn:ext".to_string(),
        )]));

        let mut e_ctx = EvaluationContext::new(tree.root());
        e_ctx.functions = &registry;
        e_ctx.namespaces = &resolver;

        assert_eq!(eval_func("double(count(//li))", &e_ctx).to_number(), 84.0);
        assert_eq!(eval_func("ext:upper(//li[2])", &e_ctx).to_string(), "TWO");
        assert_eq!(ids(&eval_func("//li[ext:here() = 'three']", &e_ctx)), vec![10]);
        assert_eq!(
            try_eval("ext:missing()", &e_ctx).unwrap_err(),
            XPathError::UnknownFunction("ext:missing".to_string())
        );
        assert_eq!(
            try_eval("nope:upper('a')", &e_ctx).unwrap_err(),
            XPathError::UnresolvedPrefix("nope".to_string())
        );
    }
}

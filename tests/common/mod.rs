pub mod fixtures;

use htmlsync::XmlNode;
use htmlsync::xpath::{EvaluationOptions, XPathExpression};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Options as the host uses them: HTML leniency on, no resolvers.
pub fn html_options<'a>(node: XmlNode<'a, 'a>) -> EvaluationOptions<'a, 'a, XmlNode<'a, 'a>> {
    EvaluationOptions::new(node).is_html(true)
}

pub fn eval_string<'a>(
    expression: &str,
    node: XmlNode<'a, 'a>,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(XPathExpression::new(expression)?.evaluate_string(&html_options(node))?)
}

pub fn eval_number<'a>(
    expression: &str,
    node: XmlNode<'a, 'a>,
) -> Result<f64, Box<dyn std::error::Error>> {
    Ok(XPathExpression::new(expression)?.evaluate_number(&html_options(node))?)
}

pub fn eval_boolean<'a>(
    expression: &str,
    node: XmlNode<'a, 'a>,
) -> Result<bool, Box<dyn std::error::Error>> {
    Ok(XPathExpression::new(expression)?.evaluate_boolean(&html_options(node))?)
}

/// Source offsets of the nodes, which grow with document order.
pub fn starts(nodes: &[XmlNode<'_, '_>]) -> Vec<usize> {
    nodes.iter().map(|n| n.text_range().start).collect()
}

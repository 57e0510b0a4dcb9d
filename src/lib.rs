//! Resolves the XPath locations recorded for DOM mutations back to nodes of a parsed document.
//!
//! Lookups run with HTML leniency: element names match case-insensitively and an
//! un-prefixed name test matches elements in any namespace.

pub mod dom;
pub mod error;

pub use dom::{HtmlDocument, XmlNode};
pub use error::SyncError;
pub use htmlsync_xpath1 as xpath;

use htmlsync_xpath1::{EvaluationOptions, XPathExpression};
use log::debug;

/// The first node `expression` selects from `node`, in document order.
pub fn select1<'a>(
    expression: &str,
    node: XmlNode<'a, 'a>,
) -> Result<Option<XmlNode<'a, 'a>>, SyncError> {
    let compiled = XPathExpression::new(expression)?;
    let options = EvaluationOptions::new(node).is_html(true);
    let found = compiled.select1(&options)?.and_then(|n| n.as_node());
    debug!("select1 {} -> {:?}", compiled, found.map(|n| n.text_range()));
    Ok(found)
}

/// Every node `expression` selects from `node`, in document order.
/// Namespace nodes have no counterpart in the document and are skipped.
pub fn select<'a>(
    expression: &str,
    node: XmlNode<'a, 'a>,
) -> Result<Vec<XmlNode<'a, 'a>>, SyncError> {
    let compiled = XPathExpression::new(expression)?;
    let options = EvaluationOptions::new(node).is_html(true);
    let found: Vec<_> = compiled
        .select(&options)?
        .into_iter()
        .filter_map(|n| n.as_node())
        .collect();
    debug!("select {} -> {} nodes", compiled, found.len());
    Ok(found)
}

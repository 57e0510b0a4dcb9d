use htmlsync_xpath1::XPathError;
use thiserror::Error;

/// Everything that can go wrong while locating a node.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Markup parsing failed: {0}")]
    Parse(#[from] roxmltree::Error),

    #[error("XPath failed: {0}")]
    XPath(#[from] XPathError),
}

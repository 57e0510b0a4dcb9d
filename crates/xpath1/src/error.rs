use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum XPathError {
    /// The expression text was rejected by the tokenizer or the parser.
    #[error("XPath syntax error in '{expression}' at {position}: {message}")]
    Syntax {
        expression: String,
        position: usize,
        message: String,
    },

    #[error("Type error: {0}")]
    Type(String),

    #[error("Cannot resolve QName prefix '{0}'")]
    UnresolvedPrefix(String),

    #[error("Unknown function {0}")]
    UnknownFunction(String),

    #[error("Undeclared variable: ${0}")]
    UndeclaredVariable(String),

    #[error("Function '{function}' error: {message}")]
    FunctionError { function: String, message: String },
}

impl XPathError {
    pub(crate) fn syntax(expression: &str, position: usize, message: impl Into<String>) -> Self {
        XPathError::Syntax {
            expression: expression.to_string(),
            position,
            message: message.into(),
        }
    }

    pub(crate) fn function(function: &str, message: impl Into<String>) -> Self {
        XPathError::FunctionError {
            function: format!("{function}()"),
            message: message.into(),
        }
    }
}

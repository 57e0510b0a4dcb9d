pub mod ast;
pub mod axes;
pub mod context;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod expression;
pub mod functions;
pub mod lexer;
pub mod node;
pub mod nodeset;
pub mod operators;
pub mod parser;
pub mod tables;
pub mod value;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, Step};
pub use context::{
    EvaluationContext, FunctionRegistry, FunctionResolver, NamespaceResolver, VariableResolver,
    XPathFunction,
};
pub use datasource::{DataSourceNode, NodeType, QName};
pub use engine::evaluate;
pub use expression::{EvaluationOptions, ResultType, XPathExpression, XPathResult, parse};
pub use node::XPathNode;
pub use nodeset::NodeSet;
pub use value::XPathValue;

// Re-export test utilities for integration testing in downstream crates
pub use datasource::tests;
pub use error::XPathError;
pub use parser::parse_expression;

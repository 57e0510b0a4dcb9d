//! A table-driven shift-reduce parser for XPath 1.0 expressions.

use crate::ast::{
    Axis, BinaryOperator, Expression, LocationPath, NodeTest, NodeTypeTest, PathExpr, Step,
    UnaryOperator,
};
use crate::error::XPathError;
use crate::lexer::{Token, TokenKind, tokenize};
use crate::tables::{self, Action, PRODUCTIONS};
use crate::value::string_to_number;
use log::{debug, trace};

/// A value on the parse stack: a shifted token or a reduced nonterminal.
#[derive(Debug)]
enum Symbol<'s> {
    Token(Token<'s>),
    Expr(Expression),
    /// A filter expression that may still receive predicates or a trailing path.
    Filter(PathExpr),
    Path(LocationPath),
    Step(Step),
    Axis(Axis),
    Test(NodeTest),
    List(Vec<Expression>),
}

/// The right-hand side symbols of a production, consumed left to right.
struct Rhs<'s>(std::vec::IntoIter<Symbol<'s>>);

macro_rules! take {
    ($name:ident, $variant:ident, $ty:ty) => {
        fn $name(&mut self) -> Result<$ty, String> {
            match self.next()? {
                Symbol::$variant(v) => Ok(v),
                other => Err(format!(
                    "expected {} but found {:?}",
                    stringify!($variant),
                    other
                )),
            }
        }
    };
}

impl<'s> Rhs<'s> {
    fn next(&mut self) -> Result<Symbol<'s>, String> {
        self.0
            .next()
            .ok_or_else(|| "production is missing a symbol".to_string())
    }

    fn skip(&mut self) -> Result<(), String> {
        self.next().map(|_| ())
    }

    take!(token, Token, Token<'s>);
    take!(expr, Expr, Expression);
    take!(filter, Filter, PathExpr);
    take!(path, Path, LocationPath);
    take!(step, Step, Step);
    take!(axis, Axis, Axis);
    take!(test, Test, NodeTest);
    take!(list, List, Vec<Expression>);
}

fn binary(mut rhs: Rhs<'_>, op: BinaryOperator) -> Result<Symbol<'_>, String> {
    let left = rhs.expr()?;
    rhs.skip()?;
    let right = rhs.expr()?;
    Ok(Symbol::Expr(Expression::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }))
}

fn node_type_test(name: &str) -> Result<NodeTest, String> {
    Ok(NodeTest::NodeType(match name {
        "comment" => NodeTypeTest::Comment,
        "text" => NodeTypeTest::Text,
        "node" => NodeTypeTest::Node,
        "processing-instruction" => NodeTypeTest::ProcessingInstruction(None),
        other => return Err(format!("'{other}' is not a node type")),
    }))
}

/// Builds the value of production `production` from its right-hand side.
fn reduce(production: usize, symbols: Vec<Symbol<'_>>) -> Result<Symbol<'_>, String> {
    use BinaryOperator::*;
    let mut rhs = Rhs(symbols.into_iter());
    let symbol = match production {
        3 => return binary(rhs, Or),
        5 => return binary(rhs, And),
        7 => return binary(rhs, Equals),
        8 => return binary(rhs, NotEquals),
        10 => return binary(rhs, LessThan),
        11 => return binary(rhs, GreaterThan),
        12 => return binary(rhs, LessThanOrEqual),
        13 => return binary(rhs, GreaterThanOrEqual),
        15 => return binary(rhs, Plus),
        16 => return binary(rhs, Minus),
        18 => return binary(rhs, Multiply),
        19 => return binary(rhs, Divide),
        20 => return binary(rhs, Modulo),
        24 => return binary(rhs, Union),
        22 => {
            rhs.skip()?;
            Symbol::Expr(Expression::UnaryOp {
                op: UnaryOperator::Minus,
                expr: Box::new(rhs.expr()?),
            })
        }
        // PathExpr -> LocationPath
        25 => Symbol::Expr(Expression::LocationPath(rhs.path()?)),
        // PathExpr -> FilterExpr
        26 => {
            let filter = rhs.filter()?;
            if filter.predicates.is_empty() && filter.location_path.is_none() {
                Symbol::Expr(*filter.filter)
            } else {
                Symbol::Expr(Expression::Path(filter))
            }
        }
        // PathExpr -> FilterExpr '/' RelativeLocationPath
        // PathExpr -> FilterExpr '//' RelativeLocationPath
        27 | 28 => {
            let mut filter = rhs.filter()?;
            rhs.skip()?;
            let mut path = rhs.path()?;
            if production == 28 {
                path.steps.insert(0, Step::descendant_or_self_node());
            }
            filter.location_path = Some(path);
            Symbol::Expr(Expression::Path(filter))
        }
        // FilterExpr -> PrimaryExpr
        29 => Symbol::Filter(PathExpr {
            filter: Box::new(rhs.expr()?),
            predicates: Vec::new(),
            location_path: None,
        }),
        // FilterExpr -> FilterExpr Predicate
        30 => {
            let mut filter = rhs.filter()?;
            filter.predicates.push(rhs.expr()?);
            Symbol::Filter(filter)
        }
        // PrimaryExpr -> '(' Expr ')'
        32 => {
            rhs.skip()?;
            Symbol::Expr(rhs.expr()?)
        }
        33 => Symbol::Expr(Expression::Literal(rhs.token()?.text.to_string())),
        34 => Symbol::Expr(Expression::Number(string_to_number(rhs.token()?.text))),
        // FunctionCall -> FUNCTIONNAME '(' ')'
        36 => Symbol::Expr(Expression::FunctionCall {
            name: rhs.token()?.text.to_string(),
            args: Vec::new(),
        }),
        // FunctionCall -> FUNCTIONNAME '(' Arguments ')'
        37 => {
            let name = rhs.token()?.text.to_string();
            rhs.skip()?;
            Symbol::Expr(Expression::FunctionCall {
                name,
                args: rhs.list()?,
            })
        }
        // Arguments -> Argument | Argument ',' Arguments
        38 => Symbol::List(vec![rhs.expr()?]),
        39 => {
            let first = rhs.expr()?;
            rhs.skip()?;
            let mut rest = rhs.list()?;
            rest.insert(0, first);
            Symbol::List(rest)
        }
        // AbsoluteLocationPath -> '/'
        43 => Symbol::Path(LocationPath {
            is_absolute: true,
            steps: Vec::new(),
        }),
        // AbsoluteLocationPath -> '/' RelativeLocationPath
        44 => {
            rhs.skip()?;
            let mut path = rhs.path()?;
            path.is_absolute = true;
            Symbol::Path(path)
        }
        // RelativeLocationPath -> Step
        46 => Symbol::Path(LocationPath {
            is_absolute: false,
            steps: vec![rhs.step()?],
        }),
        // RelativeLocationPath -> RelativeLocationPath '/' Step
        47 => {
            let mut path = rhs.path()?;
            rhs.skip()?;
            path.steps.push(rhs.step()?);
            Symbol::Path(path)
        }
        // Step -> AxisSpecifier NodeTest [Predicates]
        49 | 51 => {
            let mut step = Step::new(rhs.axis()?, rhs.test()?);
            if production == 51 {
                step.predicates = rhs.list()?;
            }
            Symbol::Step(step)
        }
        // Step -> NodeTest [Predicates]
        50 | 52 => {
            let mut step = Step::new(Axis::Child, rhs.test()?);
            if production == 52 {
                step.predicates = rhs.list()?;
            }
            Symbol::Step(step)
        }
        // Predicates -> Predicate | Predicate Predicates
        54 => Symbol::List(vec![rhs.expr()?]),
        55 => {
            let first = rhs.expr()?;
            let mut rest = rhs.list()?;
            rest.insert(0, first);
            Symbol::List(rest)
        }
        // AxisSpecifier -> AXISNAME '::'
        56 => {
            let name = rhs.token()?.text;
            Symbol::Axis(Axis::from_name(name).ok_or_else(|| format!("Unknown axis '{name}'"))?)
        }
        // AxisSpecifier -> '@'
        57 => Symbol::Axis(Axis::Attribute),
        // NodeTest -> NODETYPE '(' ')'
        59 => Symbol::Test(node_type_test(rhs.token()?.text)?),
        // NodeTest -> PROCESSINGINSTRUCTIONWITHLITERAL '(' Literal ')'
        60 => {
            rhs.skip()?;
            rhs.skip()?;
            let target = rhs.token()?.text.to_string();
            Symbol::Test(NodeTest::NodeType(NodeTypeTest::ProcessingInstruction(
                Some(target),
            )))
        }
        // Predicate -> '[' PredicateExpr ']'
        61 => {
            rhs.skip()?;
            Symbol::Expr(rhs.expr()?)
        }
        // AbbreviatedAbsoluteLocationPath -> '//' RelativeLocationPath
        63 => {
            rhs.skip()?;
            let mut path = rhs.path()?;
            path.is_absolute = true;
            path.steps.insert(0, Step::descendant_or_self_node());
            Symbol::Path(path)
        }
        // AbbreviatedRelativeLocationPath -> RelativeLocationPath '//' Step
        64 => {
            let mut path = rhs.path()?;
            rhs.skip()?;
            path.steps.push(Step::descendant_or_self_node());
            path.steps.push(rhs.step()?);
            Symbol::Path(path)
        }
        65 => Symbol::Step(Step::new(
            Axis::SelfAxis,
            NodeTest::NodeType(NodeTypeTest::Node),
        )),
        66 => Symbol::Step(Step::new(
            Axis::Parent,
            NodeTest::NodeType(NodeTypeTest::Node),
        )),
        // VariableReference -> '$' QNAME
        67 => {
            rhs.skip()?;
            Symbol::Expr(Expression::Variable(rhs.token()?.text.to_string()))
        }
        68 => Symbol::Test(NodeTest::Wildcard),
        69 => {
            let text = rhs.token()?.text;
            let prefix = text.strip_suffix(":*").unwrap_or(text);
            Symbol::Test(NodeTest::PrefixWildcard(prefix.to_string()))
        }
        70 => {
            let text = rhs.token()?.text;
            let test = match text.split_once(':') {
                Some((prefix, local)) => NodeTest::Name {
                    prefix: Some(prefix.to_string()),
                    local: local.to_string(),
                },
                None => NodeTest::Name {
                    prefix: None,
                    local: text.to_string(),
                },
            };
            Symbol::Test(test)
        }
        // Every other production passes its single right-hand value through.
        _ => rhs.next()?,
    };
    Ok(symbol)
}

/// Parses an XPath 1.0 expression string into an `Expression` AST.
pub fn parse_expression(source: &str) -> Result<Expression, XPathError> {
    let tokens = tokenize(source)?;
    let mut states: Vec<usize> = vec![0];
    let mut values: Vec<Symbol<'_>> = Vec::new();
    let mut index = 0;

    loop {
        let Some(&token) = tokens.get(index) else {
            return Err(XPathError::syntax(source, source.len(), "Unexpected end of expression"));
        };
        let state = states.last().copied().unwrap_or_default();
        match tables::action(state, token.kind.column()) {
            Action::Shift(next) => {
                trace!("shift {:?} -> state {}", token.kind, next);
                values.push(Symbol::Token(token));
                states.push(next);
                index += 1;
            }
            Action::Reduce(production) => {
                let (lhs, len) = PRODUCTIONS[production];
                let len = usize::from(len);
                let split = values.len().checked_sub(len).ok_or_else(|| {
                    XPathError::syntax(source, token.position, "Parser stack underflow")
                })?;
                let rhs = values.split_off(split);
                states.truncate(states.len() - len);
                trace!("reduce by production {}", production);
                let value = reduce(production, rhs)
                    .map_err(|message| XPathError::syntax(source, token.position, message))?;
                let from = states.last().copied().unwrap_or_default();
                let next = tables::goto(from, lhs).ok_or_else(|| {
                    XPathError::syntax(source, token.position, "XPath parse error")
                })?;
                values.push(value);
                states.push(next);
            }
            Action::Accept => {
                return match values.pop() {
                    Some(Symbol::Expr(expr)) => {
                        debug!("parsed {:?} as {}", source, expr);
                        Ok(expr)
                    }
                    _ => Err(XPathError::syntax(source, 0, "XPath parse error")),
                };
            }
            Action::Error => {
                let message = if token.kind == TokenKind::Eof {
                    "Unexpected end of expression".to_string()
                } else {
                    format!("Unexpected token '{}'", token.text)
                };
                return Err(XPathError::syntax(source, token.position, message));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_test(local: &str) -> NodeTest {
        NodeTest::Name {
            prefix: None,
            local: local.to_string(),
        }
    }

    fn child(local: &str) -> Step {
        Step::new(Axis::Child, name_test(local))
    }

    #[test]
    fn test_parse_absolute_path() {
        let expr = parse_expression("/html/body").unwrap();
        assert_eq!(
            expr,
            Expression::LocationPath(LocationPath {
                is_absolute: true,
                steps: vec![child("html"), child("body")],
            })
        );
        assert_eq!(
            parse_expression("/").unwrap(),
            Expression::LocationPath(LocationPath {
                is_absolute: true,
                steps: vec![],
            })
        );
    }

    #[test]
    fn test_parse_abbreviations() {
        let expr = parse_expression("//item/..").unwrap();
        assert_eq!(
            expr.to_string(),
            "/descendant-or-self::node()/child::item/parent::node()"
        );
        let expr = parse_expression("a//@id").unwrap();
        assert_eq!(
            expr.to_string(),
            "child::a/descendant-or-self::node()/attribute::id"
        );
        assert_eq!(parse_expression(".").unwrap().to_string(), "self::node()");
    }

    #[test]
    fn test_parse_precedence() {
        let expr = parse_expression("1 + 2 * 3 = 7 or false()").unwrap();
        assert_eq!(expr.to_string(), "(((1 + (2 * 3)) = 7) or false())");
        let expr = parse_expression("-a | b").unwrap();
        assert_eq!(expr.to_string(), "-(child::a | child::b)");
        let expr = parse_expression("8 div 2 mod 3").unwrap();
        assert_eq!(expr.to_string(), "((8 div 2) mod 3)");
    }

    #[test]
    fn test_parse_predicates_and_axes() {
        let expr = parse_expression("ancestor-or-self::div[@class='x'][2]").unwrap();
        let Expression::LocationPath(path) = expr else {
            panic!("Expected a location path");
        };
        let step = &path.steps[0];
        assert_eq!(step.axis, Axis::AncestorOrSelf);
        assert_eq!(step.node_test, name_test("div"));
        assert_eq!(step.predicates.len(), 2);
        assert_eq!(step.predicates[1], Expression::Number(2.0));
    }

    #[test]
    fn test_parse_filter_expressions() {
        let expr = parse_expression("(//item)[2]").unwrap();
        let Expression::Path(path) = expr else {
            panic!("Expected a filter path");
        };
        assert!(path.filter.is_location_path());
        assert_eq!(path.predicates, vec![Expression::Number(2.0)]);
        assert!(path.location_path.is_none());

        let expr = parse_expression("$nodes//a").unwrap();
        assert_eq!(
            expr.to_string(),
            "($nodes)/descendant-or-self::node()/child::a"
        );

        // A bare primary expression is not wrapped.
        assert_eq!(parse_expression("'x'").unwrap(), Expression::Literal("x".into()));
    }

    #[test]
    fn test_parse_function_calls_and_node_tests() {
        let expr = parse_expression("concat('a', 'b', 'c')").unwrap();
        let Expression::FunctionCall { name, args } = expr else {
            panic!("Expected a function call");
        };
        assert_eq!(name, "concat");
        assert_eq!(args.len(), 3);

        assert_eq!(
            parse_expression("processing-instruction('php')").unwrap().to_string(),
            "child::processing-instruction('php')"
        );
        assert_eq!(
            parse_expression("svg:*/svg:rect/text()").unwrap().to_string(),
            "child::svg:*/child::svg:rect/child::text()"
        );
        assert_eq!(parse_expression("last()").unwrap().to_string(), "last()");
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["//div[", "1 +", "a/", "()", "foo::bar", "f(1,)", "@"] {
            let result = parse_expression(bad);
            assert!(
                matches!(result, Err(XPathError::Syntax { .. })),
                "{bad} should not parse"
            );
        }
    }
}

use crate::{
    introspect,
    ops::{self, EvaluationError, UnsupportedOperation},
    Builtins,
};
use ordered_float::OrderedFloat;
use smol_str::SmolStr;
use std::{
    borrow::Borrow,
    collections::{HashMap, HashSet},
    fmt::{self, Display, Formatter},
    hash::Hash,
    ops::{Add, Div, Mul, Neg, Rem, Sub},
};

/// An algebraic expression tree.
///
/// Every node exclusively owns its children and nothing is ever mutated after
/// construction, so operations always produce a new tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Number(f64),
    Variable(SmolStr),
    /// Apply a named builtin function to an argument.
    Apply {
        function: Function,
        argument: Box<Expression>,
    },
    Negative(Box<Expression>),
    AbsoluteValue(Box<Expression>),
    SquareRoot(Box<Expression>),
    /// The sum of zero or more terms.
    Sum(Vec<Expression>),
    Difference {
        minuend: Box<Expression>,
        subtrahend: Box<Expression>,
    },
    Product {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Quotient {
        numerator: Box<Expression>,
        denominator: Box<Expression>,
    },
    Power {
        base: Box<Expression>,
        exponent: Box<Expression>,
    },
    Modulo {
        dividend: Box<Expression>,
        divisor: Box<Expression>,
    },
}

/// A reference to a unary function, by name.
///
/// A [`Function`] is not an [`Expression`] in its own right, it only appears
/// as the function half of an [`Expression::Apply`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Function {
    pub name: SmolStr,
}

impl Function {
    pub fn named<S: Into<SmolStr>>(name: S) -> Self {
        Function { name: name.into() }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The different kinds of node that may appear in an expression tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    Number,
    Variable,
    Function,
    Apply,
    Negative,
    AbsoluteValue,
    SquareRoot,
    Sum,
    Difference,
    Product,
    Quotient,
    Power,
    Modulo,
}

impl Display for ExpressionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpressionKind::Number => "number",
            ExpressionKind::Variable => "variable",
            ExpressionKind::Function => "function",
            ExpressionKind::Apply => "function application",
            ExpressionKind::Negative => "negative",
            ExpressionKind::AbsoluteValue => "absolute value",
            ExpressionKind::SquareRoot => "square root",
            ExpressionKind::Sum => "sum",
            ExpressionKind::Difference => "difference",
            ExpressionKind::Product => "product",
            ExpressionKind::Quotient => "quotient",
            ExpressionKind::Power => "power",
            ExpressionKind::Modulo => "modulo",
        };

        f.write_str(name)
    }
}

impl Expression {
    pub fn number(value: f64) -> Self { Expression::Number(value) }

    pub fn variable<S: Into<SmolStr>>(name: S) -> Self {
        Expression::Variable(name.into())
    }

    pub fn apply(function: Function, argument: Expression) -> Self {
        Expression::Apply {
            function,
            argument: Box::new(argument),
        }
    }

    pub fn negative(expr: Expression) -> Self {
        Expression::Negative(Box::new(expr))
    }

    pub fn absolute_value(expr: Expression) -> Self {
        Expression::AbsoluteValue(Box::new(expr))
    }

    pub fn square_root(expr: Expression) -> Self {
        Expression::SquareRoot(Box::new(expr))
    }

    pub fn sum<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = Expression>,
    {
        Expression::Sum(terms.into_iter().collect())
    }

    pub fn difference(minuend: Expression, subtrahend: Expression) -> Self {
        Expression::Difference {
            minuend: Box::new(minuend),
            subtrahend: Box::new(subtrahend),
        }
    }

    pub fn product(left: Expression, right: Expression) -> Self {
        Expression::Product {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Multiply several factors together, nesting them as left-associative
    /// binary [`Expression::Product`]s.
    ///
    /// The empty product is `1`.
    pub fn product_of<I>(factors: I) -> Self
    where
        I: IntoIterator<Item = Expression>,
    {
        let mut factors = factors.into_iter();

        match factors.next() {
            Some(first) => factors.fold(first, Expression::product),
            None => Expression::Number(1.0),
        }
    }

    pub fn quotient(numerator: Expression, denominator: Expression) -> Self {
        Expression::Quotient {
            numerator: Box::new(numerator),
            denominator: Box::new(denominator),
        }
    }

    pub fn power(base: Expression, exponent: Expression) -> Self {
        Expression::Power {
            base: Box::new(base),
            exponent: Box::new(exponent),
        }
    }

    pub fn modulo(dividend: Expression, divisor: Expression) -> Self {
        Expression::Modulo {
            dividend: Box::new(dividend),
            divisor: Box::new(divisor),
        }
    }

    pub fn kind(&self) -> ExpressionKind {
        match self {
            Expression::Number(_) => ExpressionKind::Number,
            Expression::Variable(_) => ExpressionKind::Variable,
            Expression::Apply { .. } => ExpressionKind::Apply,
            Expression::Negative(_) => ExpressionKind::Negative,
            Expression::AbsoluteValue(_) => ExpressionKind::AbsoluteValue,
            Expression::SquareRoot(_) => ExpressionKind::SquareRoot,
            Expression::Sum(_) => ExpressionKind::Sum,
            Expression::Difference { .. } => ExpressionKind::Difference,
            Expression::Product { .. } => ExpressionKind::Product,
            Expression::Quotient { .. } => ExpressionKind::Quotient,
            Expression::Power { .. } => ExpressionKind::Power,
            Expression::Modulo { .. } => ExpressionKind::Modulo,
        }
    }

    /// The immediate sub-expressions of this node, in left-to-right order.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Number(_) | Expression::Variable(_) => Vec::new(),
            Expression::Apply { argument, .. } => vec![&**argument],
            Expression::Negative(inner)
            | Expression::AbsoluteValue(inner)
            | Expression::SquareRoot(inner) => vec![&**inner],
            Expression::Sum(terms) => terms.iter().collect(),
            Expression::Difference {
                minuend: left,
                subtrahend: right,
            }
            | Expression::Product { left, right }
            | Expression::Quotient {
                numerator: left,
                denominator: right,
            }
            | Expression::Power {
                base: left,
                exponent: right,
            }
            | Expression::Modulo {
                dividend: left,
                divisor: right,
            } => vec![&**left, &**right],
        }
    }

    /// Visit every node in the tree, parents before their children.
    pub fn iter(&self) -> Nodes<'_> { Nodes { stack: vec![self] } }

    /// Every variable referenced by this expression, possibly with
    /// duplicates.
    pub fn variables(&self) -> impl Iterator<Item = &SmolStr> + '_ {
        self.iter().filter_map(|node| match node {
            Expression::Variable(name) => Some(name),
            _ => None,
        })
    }

    /// Every [`Function`] applied somewhere in this expression, possibly
    /// with duplicates.
    pub fn functions(&self) -> impl Iterator<Item = &Function> + '_ {
        self.iter().filter_map(|node| match node {
            Expression::Apply { function, .. } => Some(function),
            _ => None,
        })
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Sum(terms) if terms.is_empty() => ATOM,
            Expression::Sum(_) | Expression::Difference { .. } => ADDITIVE,
            Expression::Product { .. }
            | Expression::Quotient { .. }
            | Expression::Modulo { .. } => MULTIPLICATIVE,
            Expression::Negative(_) => PREFIX,
            Expression::Number(n) if n.is_sign_negative() => PREFIX,
            Expression::Power { .. } => EXPONENT,
            Expression::Number(_)
            | Expression::Variable(_)
            | Expression::Apply { .. }
            | Expression::AbsoluteValue(_)
            | Expression::SquareRoot(_) => ATOM,
        }
    }
}

/// A pre-order iterator over the nodes in an [`Expression`] tree.
#[derive(Debug, Clone)]
pub struct Nodes<'a> {
    stack: Vec<&'a Expression>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Expression;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // push in reverse so the leftmost child is visited first
        self.stack.extend(node.children().into_iter().rev());
        Some(node)
    }
}

impl<'a> IntoIterator for &'a Expression {
    type IntoIter = Nodes<'a>;
    type Item = &'a Expression;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Expression { Expression::Number(value) }
}

// define some operator overloads to make constructing an expression easier.

impl Add for Expression {
    type Output = Expression;

    fn add(self, rhs: Expression) -> Expression {
        Expression::Sum(vec![self, rhs])
    }
}

impl Sub for Expression {
    type Output = Expression;

    fn sub(self, rhs: Expression) -> Expression {
        Expression::difference(self, rhs)
    }
}

impl Mul for Expression {
    type Output = Expression;

    fn mul(self, rhs: Expression) -> Expression {
        Expression::product(self, rhs)
    }
}

impl Div for Expression {
    type Output = Expression;

    fn div(self, rhs: Expression) -> Expression {
        Expression::quotient(self, rhs)
    }
}

impl Rem for Expression {
    type Output = Expression;

    fn rem(self, rhs: Expression) -> Expression {
        Expression::modulo(self, rhs)
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Self::Output { Expression::negative(self) }
}

// shortcuts for the operations in `ops` and `introspect`, using the builtin
// functions

impl Expression {
    /// Evaluate this expression, looking variables up in `bindings`.
    pub fn evaluate<K>(
        &self,
        bindings: &HashMap<K, f64>,
    ) -> Result<f64, EvaluationError>
    where
        K: Borrow<str> + Hash + Eq,
    {
        ops::evaluate(self, |name| bindings.get(name).copied(), &Builtins)
    }

    pub fn expand(&self) -> Result<Expression, UnsupportedOperation> {
        ops::expand(self)
    }

    pub fn derivative(
        &self,
        variable: &str,
    ) -> Result<Expression, UnsupportedOperation> {
        ops::derivative(self, variable)
    }

    pub fn distinct_variables(&self) -> HashSet<SmolStr> {
        introspect::distinct_variables(self)
    }

    pub fn distinct_numbers(&self) -> HashSet<OrderedFloat<f64>> {
        introspect::distinct_numbers(self)
    }

    pub fn distinct_functions(&self) -> HashSet<SmolStr> {
        introspect::distinct_functions(self)
    }

    pub fn contains(&self, variable: &str) -> bool {
        introspect::contains(self, variable)
    }

    pub fn contains_kind(&self, kind: ExpressionKind) -> bool {
        introspect::contains_kind(self, kind)
    }
}

const ADDITIVE: u8 = 1;
const MULTIPLICATIVE: u8 = 2;
const PREFIX: u8 = 3;
const EXPONENT: u8 = 4;
const ATOM: u8 = 5;

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Number(value) => write!(f, "{}", value),
            Expression::Variable(name) => write!(f, "{}", name),
            Expression::Apply { function, argument } => {
                write!(f, "{}({})", function, argument)
            },
            Expression::Negative(inner) => {
                write!(f, "-")?;
                write_operand(inner, PREFIX, false, f)
            },
            Expression::AbsoluteValue(inner) => write!(f, "|{}|", inner),
            Expression::SquareRoot(inner) => write!(f, "sqrt({})", inner),
            Expression::Sum(terms) if terms.is_empty() => write!(f, "0"),
            Expression::Sum(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write_operand(term, ADDITIVE, false, f)?;
                }
                Ok(())
            },
            Expression::Difference {
                minuend,
                subtrahend,
            } => write_binary(minuend, " - ", subtrahend, ADDITIVE, f),
            Expression::Product { left, right } => {
                write_binary(left, "*", right, MULTIPLICATIVE, f)
            },
            Expression::Quotient {
                numerator,
                denominator,
            } => write_binary(numerator, "/", denominator, MULTIPLICATIVE, f),
            Expression::Modulo { dividend, divisor } => {
                write_binary(dividend, " % ", divisor, MULTIPLICATIVE, f)
            },
            Expression::Power { base, exponent } => {
                // exponentiation is right-associative
                write_operand(base, EXPONENT, true, f)?;
                write!(f, "^")?;
                write_operand(exponent, EXPONENT, false, f)
            },
        }
    }
}

/// Write a left-associative binary operation.
fn write_binary(
    left: &Expression,
    op: &str,
    right: &Expression,
    precedence: u8,
    f: &mut Formatter<'_>,
) -> fmt::Result {
    write_operand(left, precedence, false, f)?;
    write!(f, "{}", op)?;
    write_operand(right, precedence, true, f)
}

fn write_operand(
    expr: &Expression,
    parent_precedence: u8,
    strict: bool,
    f: &mut Formatter<'_>,
) -> fmt::Result {
    let needs_parens = if strict {
        expr.precedence() <= parent_precedence
    } else {
        expr.precedence() < parent_precedence
    };

    if needs_parens {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

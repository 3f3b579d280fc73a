//! [`Expression`] operations.

use crate::{builtins::Context, Expression, ExpressionKind};
use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("The variable \"{name}\" is not bound to a value")]
    UnboundVariable { name: SmolStr },
    #[error("Unknown function \"{name}\"")]
    UnknownFunction { name: SmolStr },
    #[error("\"{name}\" expects {expected} arguments but was given {found}")]
    WrongArity {
        name: SmolStr,
        expected: usize,
        found: usize,
    },
}

/// The structural operations which aren't defined for every kind of
/// [`Expression`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Expand,
    Differentiate,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Expand => write!(f, "expansion"),
            Operation::Differentiate => write!(f, "differentiation"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("No {operation} rule for {kind} expressions")]
pub struct UnsupportedOperation {
    pub operation: Operation,
    pub kind: ExpressionKind,
}

impl UnsupportedOperation {
    fn new(operation: Operation, kind: ExpressionKind) -> Self {
        debug!(%operation, %kind, "Unsupported operation");
        UnsupportedOperation { operation, kind }
    }
}

/// Evaluate an [`Expression`] to a number, using `lookup_variable` to get the
/// value bound to each variable.
///
/// Arithmetic follows the usual floating-point rules, so things like division
/// by zero give infinity or NaN rather than an error.
pub fn evaluate<F, C>(
    expr: &Expression,
    lookup_variable: F,
    ctx: &C,
) -> Result<f64, EvaluationError>
where
    F: Fn(&str) -> Option<f64>,
    C: Context,
{
    evaluate_with(expr, &lookup_variable, ctx)
}

fn evaluate_with<F, C>(
    expr: &Expression,
    lookup_variable: &F,
    ctx: &C,
) -> Result<f64, EvaluationError>
where
    F: Fn(&str) -> Option<f64>,
    C: Context,
{
    let eval = |e: &Expression| evaluate_with(e, lookup_variable, ctx);

    let value = match expr {
        Expression::Number(value) => *value,
        Expression::Variable(name) => match lookup_variable(name.as_str()) {
            Some(value) => value,
            None => {
                debug!(%name, "Unbound variable");
                return Err(EvaluationError::UnboundVariable {
                    name: name.clone(),
                });
            },
        },
        Expression::Apply { function, argument } => {
            ctx.evaluate_function(&function.name, eval(argument)?)?
        },
        Expression::Negative(inner) => -eval(inner)?,
        Expression::AbsoluteValue(inner) => eval(inner)?.abs(),
        Expression::SquareRoot(inner) => eval(inner)?.sqrt(),
        Expression::Sum(terms) => {
            let mut total = 0.0;
            for term in terms {
                total += eval(term)?;
            }
            total
        },
        Expression::Difference {
            minuend,
            subtrahend,
        } => eval(minuend)? - eval(subtrahend)?,
        Expression::Product { left, right } => eval(left)? * eval(right)?,
        Expression::Quotient {
            numerator,
            denominator,
        } => eval(numerator)? / eval(denominator)?,
        Expression::Power { base, exponent } => {
            eval(base)?.powf(eval(exponent)?)
        },
        Expression::Modulo { dividend, divisor } => {
            floored_modulo(eval(dividend)?, eval(divisor)?)
        },
    };

    Ok(value)
}

/// The remainder of `dividend / divisor`, taking the sign of the divisor.
fn floored_modulo(dividend: f64, divisor: f64) -> f64 {
    let remainder = dividend % divisor;

    if remainder != 0.0 && (remainder < 0.0) != (divisor < 0.0) {
        remainder + divisor
    } else {
        remainder
    }
}

/// Distribute products, quotients and powers over any sums they contain.
///
/// This does a single distribution step at each node and won't collect like
/// terms or otherwise simplify the result.
pub fn expand(expr: &Expression) -> Result<Expression, UnsupportedOperation> {
    let expanded = match expr {
        Expression::Number(_) | Expression::Variable(_) => expr.clone(),
        Expression::Apply { function, argument } => {
            Expression::apply(function.clone(), expand(argument)?)
        },
        Expression::Negative(inner) => Expression::negative(expand(inner)?),
        Expression::AbsoluteValue(inner) => {
            Expression::absolute_value(expand(inner)?)
        },
        Expression::SquareRoot(inner) => {
            Expression::square_root(expand(inner)?)
        },
        Expression::Sum(terms) => Expression::Sum(expand_all(terms)?),
        Expression::Difference {
            minuend,
            subtrahend,
        } => Expression::difference(expand(minuend)?, expand(subtrahend)?),
        Expression::Product { left, right } => {
            distribute(left, right, Expression::product)?
        },
        Expression::Quotient {
            numerator,
            denominator,
        } => distribute(numerator, denominator, Expression::quotient)?,
        Expression::Power { base, exponent } => expand_power(base, exponent)?,
        Expression::Modulo { .. } => {
            return Err(UnsupportedOperation::new(
                Operation::Expand,
                ExpressionKind::Modulo,
            ))
        },
    };

    Ok(expanded)
}

fn expand_all(
    terms: &[Expression],
) -> Result<Vec<Expression>, UnsupportedOperation> {
    terms.iter().map(expand).collect()
}

/// Expand a binary operation, distributing it over whichever operand turns
/// out to be a sum (checking the left operand first).
fn distribute<F>(
    left: &Expression,
    right: &Expression,
    op: F,
) -> Result<Expression, UnsupportedOperation>
where
    F: Fn(Expression, Expression) -> Expression,
{
    let expanded_left = expand(left)?;
    let expanded_right = expand(right)?;

    if let Expression::Sum(terms) = expanded_left {
        trace!(terms = terms.len(), "Distributing over the left operand");
        let distributed = terms
            .into_iter()
            .map(|term| expand(&op(term, right.clone())))
            .collect::<Result<_, _>>()?;
        return Ok(Expression::Sum(distributed));
    }

    if let Expression::Sum(terms) = expanded_right {
        trace!(terms = terms.len(), "Distributing over the right operand");
        let distributed = terms
            .into_iter()
            .map(|term| expand(&op(left.clone(), term)))
            .collect::<Result<_, _>>()?;
        return Ok(Expression::Sum(distributed));
    }

    Ok(op(expanded_left, expanded_right))
}

fn expand_power(
    base: &Expression,
    exponent: &Expression,
) -> Result<Expression, UnsupportedOperation> {
    let expanded_base = expand(base)?;
    let expanded_exponent = expand(exponent)?;

    // (a + b)^n => a^n + b^n
    if let Expression::Sum(terms) = expanded_base {
        trace!(terms = terms.len(), "Distributing a power over its base");
        let distributed = terms
            .into_iter()
            .map(|term| expand(&Expression::power(term, exponent.clone())))
            .collect::<Result<_, _>>()?;
        return Ok(Expression::Sum(distributed));
    }

    // x^(a + b) => x^a * x^b
    if let Expression::Sum(terms) = expanded_exponent {
        trace!(terms = terms.len(), "Distributing a power over its exponent");
        let factors = terms
            .into_iter()
            .map(|term| expand(&Expression::power(base.clone(), term)))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Expression::product_of(factors));
    }

    Ok(Expression::power(expanded_base, expanded_exponent))
}

/// Calculate an [`Expression`]'s derivative with respect to a particular
/// variable.
///
/// The result is not simplified in any way.
pub fn derivative(
    expr: &Expression,
    variable: &str,
) -> Result<Expression, UnsupportedOperation> {
    let got = match expr {
        Expression::Number(_) => Expression::Number(0.0),
        Expression::Variable(name) => {
            if name.as_str() == variable {
                Expression::Number(1.0)
            } else {
                Expression::Number(0.0)
            }
        },
        Expression::Sum(terms) => Expression::Sum(
            terms
                .iter()
                .map(|term| derivative(term, variable))
                .collect::<Result<_, _>>()?,
        ),
        Expression::Difference {
            minuend,
            subtrahend,
        } => Expression::difference(
            derivative(minuend, variable)?,
            derivative(subtrahend, variable)?,
        ),
        Expression::Negative(inner) => {
            Expression::negative(derivative(inner, variable)?)
        },
        Expression::Product { left, right } => {
            // The product rule
            let d_left = derivative(left, variable)?;
            let d_right = derivative(right, variable)?;
            let left = Expression::clone(left);
            let right = Expression::clone(right);

            Expression::Sum(vec![left * d_right, d_left * right])
        },
        Expression::Quotient {
            numerator,
            denominator,
        } => {
            // The quotient rule
            let d_numerator = derivative(numerator, variable)?;
            let d_denominator = derivative(denominator, variable)?;
            let numerator = Expression::clone(numerator);
            let denominator = Expression::clone(denominator);

            (d_numerator * denominator.clone() - numerator * d_denominator)
                / Expression::power(denominator, Expression::Number(2.0))
        },
        Expression::Power { base, exponent } => {
            // The power rule, n * b^(n - 1) * b', which only holds when the
            // exponent is constant with respect to the variable
            let d_base = derivative(base, variable)?;
            let base = Expression::clone(base);
            let exponent = Expression::clone(exponent);
            let reduced = Expression::power(
                base,
                exponent.clone() - Expression::Number(1.0),
            );

            Expression::product_of(vec![exponent, reduced, d_base])
        },
        Expression::Apply { .. }
        | Expression::AbsoluteValue(_)
        | Expression::SquareRoot(_)
        | Expression::Modulo { .. } => {
            return Err(UnsupportedOperation::new(
                Operation::Differentiate,
                expr.kind(),
            ))
        },
    };

    Ok(got)
}

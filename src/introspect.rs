//! Asking questions about the contents of an [`Expression`] tree.

use crate::{Expression, ExpressionKind, Function};
use ordered_float::OrderedFloat;
use smol_str::SmolStr;
use std::{any::Any, collections::HashSet};
use thiserror::Error;
use tracing::debug;

/// The names of all variables used in an expression.
pub fn distinct_variables(expr: &Expression) -> HashSet<SmolStr> {
    expr.variables().cloned().collect()
}

/// Every numeric literal in an expression.
///
/// Literals are compared by value, so `0.0` and `-0.0` count as the same
/// number, as do all NaNs.
pub fn distinct_numbers(expr: &Expression) -> HashSet<OrderedFloat<f64>> {
    expr.iter()
        .filter_map(|node| match node {
            Expression::Number(value) => Some(OrderedFloat(*value)),
            _ => None,
        })
        .collect()
}

/// The names of all functions applied somewhere in an expression.
pub fn distinct_functions(expr: &Expression) -> HashSet<SmolStr> {
    expr.functions().map(|f| f.name.clone()).collect()
}

/// Does this expression reference a particular variable?
pub fn contains(expr: &Expression, variable: &str) -> bool {
    expr.variables().any(|name| name.as_str() == variable)
}

/// Check whether any node in the tree (including the root) is a particular
/// kind of expression.
///
/// Searching for [`ExpressionKind::Function`] matches the function half of
/// any [`Expression::Apply`].
pub fn contains_kind(expr: &Expression, kind: ExpressionKind) -> bool {
    expr.iter().any(|node| match node {
        Expression::Apply { .. } if kind == ExpressionKind::Function => true,
        other => other.kind() == kind,
    })
}

/// The dynamically typed version of [`contains_kind()`], for when the thing
/// being searched may not be an [`Expression`] at all.
///
/// A bare [`Function`] only ever contains [`ExpressionKind::Function`].
pub fn search(
    value: &dyn Any,
    kind: ExpressionKind,
) -> Result<bool, UsageError> {
    if let Some(expr) = value.downcast_ref::<Expression>() {
        Ok(contains_kind(expr, kind))
    } else if value.is::<Function>() {
        Ok(kind == ExpressionKind::Function)
    } else {
        debug!(%kind, "Tried to search something that isn't an expression");
        Err(UsageError { searching_for: kind })
    }
}

/// A combinator search was given something other than an [`Expression`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("Can only search an expression for a {searching_for}")]
pub struct UsageError {
    pub searching_for: ExpressionKind,
}

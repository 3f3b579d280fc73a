//! Algebraic expression trees and the symbolic operations you can do with
//! them.
//!
//! An [`Expression`] is built up from its constructors (or the `+`, `-`, `*`,
//! `/`, `%` operators) and can then be evaluated, expanded, differentiated or
//! inspected.
//!
//! ```rust
//! use expressions::{Expression, Function};
//! use std::collections::HashMap;
//!
//! let x = Expression::variable("x");
//! // sin(x) + x^2
//! let expr = Expression::apply(Function::named("sin"), x.clone())
//!     + Expression::power(x, Expression::number(2.0));
//!
//! let mut bindings = HashMap::new();
//! bindings.insert("x", 0.0);
//! assert_eq!(expr.evaluate(&bindings).unwrap(), 0.0);
//!
//! assert!(expr.contains("x"));
//! assert!(expr.derivative("x").is_err(), "sin() can't be differentiated");
//! ```

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod builtins;
mod expr;
pub mod introspect;
pub mod ops;
#[cfg(test)]
mod proptests;

pub use builtins::{Builtins, Context};
pub use expr::{Expression, ExpressionKind, Function, Nodes};
pub use introspect::UsageError;
pub use ops::{EvaluationError, Operation, UnsupportedOperation};

/// Any of the errors this crate can produce.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedOperation),
    #[error(transparent)]
    Usage(#[from] UsageError),
}

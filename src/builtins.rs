//! Resolving the functions used by [`Expression::Apply`].
//!
//! [`Expression::Apply`]: crate::Expression::Apply

use crate::ops::EvaluationError;
use tracing::debug;

/// Contextual information used when evaluating an [`Expression`].
///
/// [`Expression`]: crate::Expression
pub trait Context {
    /// Apply the function called `name` to a single argument.
    fn evaluate_function(
        &self,
        name: &str,
        argument: f64,
    ) -> Result<f64, EvaluationError>;
}

impl<C: Context + ?Sized> Context for &C {
    fn evaluate_function(
        &self,
        name: &str,
        argument: f64,
    ) -> Result<f64, EvaluationError> {
        (**self).evaluate_function(name, argument)
    }
}

/// The set of builtin functions.
///
/// Trigonometric functions work in radians, `ln` is the natural logarithm
/// and `log` is base 10.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Builtins;

impl Builtins {
    /// The name of every function this registry knows about.
    pub const FUNCTIONS: &'static [&'static str] = &[
        "sin", "cos", "tan", "asin", "acos", "atan", "atan2", "sinh", "cosh",
        "tanh", "asinh", "acosh", "atanh", "exp", "ln", "log", "sqrt", "abs",
        "ceil", "floor",
    ];

    pub fn is_registered(name: &str) -> bool {
        Builtins::FUNCTIONS.contains(&name)
    }
}

impl Context for Builtins {
    fn evaluate_function(
        &self,
        name: &str,
        argument: f64,
    ) -> Result<f64, EvaluationError> {
        match name {
            "sin" => Ok(argument.sin()),
            "cos" => Ok(argument.cos()),
            "tan" => Ok(argument.tan()),
            "asin" => Ok(argument.asin()),
            "acos" => Ok(argument.acos()),
            "atan" => Ok(argument.atan()),
            "sinh" => Ok(argument.sinh()),
            "cosh" => Ok(argument.cosh()),
            "tanh" => Ok(argument.tanh()),
            "asinh" => Ok(argument.asinh()),
            "acosh" => Ok(argument.acosh()),
            "atanh" => Ok(argument.atanh()),
            "exp" => Ok(argument.exp()),
            "ln" => Ok(argument.ln()),
            "log" => Ok(argument.log10()),
            "sqrt" => Ok(argument.sqrt()),
            "abs" => Ok(argument.abs()),
            "ceil" => Ok(argument.ceil()),
            "floor" => Ok(argument.floor()),
            // a function application only ever carries one argument
            "atan2" => {
                debug!(name, "Applied a binary function to one argument");
                Err(EvaluationError::WrongArity {
                    name: name.into(),
                    expected: 2,
                    found: 1,
                })
            },
            _ => {
                debug!(name, "Unknown function");
                Err(EvaluationError::UnknownFunction { name: name.into() })
            },
        }
    }
}

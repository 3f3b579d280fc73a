//! Property-based tests for the expression operations.

use crate::{Expression, Function};
use proptest::prelude::*;
use std::collections::HashMap;

fn no_bindings() -> HashMap<&'static str, f64> { HashMap::new() }

fn bind(pairs: &[(&'static str, f64)]) -> HashMap<&'static str, f64> {
    pairs.iter().copied().collect()
}

fn value() -> impl Strategy<Value = f64> { -1000.0..1000.0 }

fn non_zero() -> impl Strategy<Value = f64> {
    prop_oneof![-1000.0..-0.001, 0.001..1000.0]
}

fn leaf() -> impl Strategy<Value = Expression> {
    prop_oneof![
        (-3.0..3.0).prop_map(Expression::number),
        prop_oneof![Just("x"), Just("y")].prop_map(Expression::variable),
    ]
}

/// Arbitrary expressions over `x` and `y` which only use sums, differences,
/// products and negation, the operations where distributing is exact.
fn polynomial() -> impl Strategy<Value = Expression> {
    leaf().prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4)
                .prop_map(Expression::sum),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Expression::difference(l, r)),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Expression::product(l, r)),
            inner.prop_map(Expression::negative),
        ]
    })
}

/// Like [`polynomial()`], but also raising things to small positive integer
/// powers.
fn polynomial_with_powers() -> impl Strategy<Value = Expression> {
    leaf().prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4)
                .prop_map(Expression::sum),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Expression::difference(l, r)),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Expression::product(l, r)),
            inner.clone().prop_map(Expression::negative),
            (inner, 1_u8..3).prop_map(|(base, n)| {
                Expression::power(base, Expression::number(f64::from(n)))
            }),
        ]
    })
}

fn close_enough(left: f64, right: f64) -> bool {
    let scale = left.abs().max(right.abs()).max(1.0);
    (left - right).abs() <= scale * 1e-9
}

proptest! {
    #[test]
    fn sum_of_two_numbers(a in value(), b in value()) {
        let expr = Expression::number(a) + Expression::number(b);
        prop_assert_eq!(expr.evaluate(&no_bindings()), Ok(a + b));
    }

    #[test]
    fn difference_of_two_numbers(a in value(), b in value()) {
        let expr = Expression::number(a) - Expression::number(b);
        prop_assert_eq!(expr.evaluate(&no_bindings()), Ok(a - b));
    }

    #[test]
    fn product_of_two_numbers(a in value(), b in value()) {
        let expr = Expression::number(a) * Expression::number(b);
        prop_assert_eq!(expr.evaluate(&no_bindings()), Ok(a * b));
    }

    #[test]
    fn quotient_of_two_numbers(a in value(), b in non_zero()) {
        let expr = Expression::number(a) / Expression::number(b);
        prop_assert_eq!(expr.evaluate(&no_bindings()), Ok(a / b));
    }

    #[test]
    fn power_of_two_numbers(a in 0.0..100.0, b in -3.0..3.0) {
        let expr =
            Expression::power(Expression::number(a), Expression::number(b));
        prop_assert_eq!(expr.evaluate(&no_bindings()), Ok(a.powf(b)));
    }

    #[test]
    fn modulo_of_two_numbers(a in value(), b in non_zero()) {
        let expr = Expression::number(a) % Expression::number(b);
        let got = expr.evaluate(&no_bindings()).unwrap();

        // the remainder is smaller than the divisor and has the same sign
        prop_assert!(got.abs() <= b.abs());
        prop_assert!(got == 0.0 || got.signum() == b.signum());
        // and differs from the dividend by a whole number of divisors
        let quotient = (a - got) / b;
        prop_assert!((quotient - quotient.round()).abs() < 1e-6);
    }

    #[test]
    fn variables_evaluate_to_their_binding(x in value()) {
        let expr = Expression::variable("x");
        prop_assert_eq!(expr.evaluate(&bind(&[("x", x)])), Ok(x));
    }

    #[test]
    fn square_roots_match_the_builtin_function(a in 0.0..1e6) {
        let sqrt =
            Expression::apply(Function::named("sqrt"), Expression::number(a));
        let root = Expression::square_root(Expression::number(a));

        prop_assert_eq!(sqrt.evaluate(&no_bindings()), Ok(a.sqrt()));
        prop_assert_eq!(root.evaluate(&no_bindings()), Ok(a.sqrt()));
    }

    #[test]
    fn product_rule_agrees_with_power_rule(x in value()) {
        let var = Expression::variable("x");
        let squared = Expression::power(var.clone(), Expression::number(2.0));
        let product = var.clone() * var;
        let bindings = bind(&[("x", x)]);

        let from_power =
            squared.derivative("x").unwrap().evaluate(&bindings).unwrap();
        let from_product =
            product.derivative("x").unwrap().evaluate(&bindings).unwrap();

        prop_assert!(close_enough(from_power, 2.0 * x));
        prop_assert!(close_enough(from_product, 2.0 * x));
    }

    #[test]
    fn expansion_preserves_the_value(
        expr in polynomial(),
        x in -3.0..3.0,
        y in -3.0..3.0,
    ) {
        let bindings = bind(&[("x", x), ("y", y)]);
        let expanded = expr.expand().unwrap();

        let original = expr.evaluate(&bindings).unwrap();
        let got = expanded.evaluate(&bindings).unwrap();

        prop_assert!(close_enough(got, original), "{} != {}", expanded, expr);
    }

    #[test]
    fn expansion_keeps_the_variables(expr in polynomial()) {
        let expanded = expr.expand().unwrap();

        for variable in expanded.distinct_variables() {
            prop_assert!(expr.contains(&variable));
        }
    }

    #[test]
    fn derivative_matches_a_finite_difference(
        expr in polynomial_with_powers(),
        x in -2.0..2.0,
        y in -2.0..2.0,
    ) {
        const H: f64 = 1e-5;
        let at =
            |x: f64| expr.evaluate(&bind(&[("x", x), ("y", y)])).unwrap();
        let numeric = (at(x + H) - at(x - H)) / (2.0 * H);

        let symbolic = expr
            .derivative("x")
            .unwrap()
            .evaluate(&bind(&[("x", x), ("y", y)]))
            .unwrap();

        let tolerance = 1e-3 * numeric.abs().max(symbolic.abs()).max(1.0);
        prop_assert!((numeric - symbolic).abs() <= tolerance);
    }

    #[test]
    fn differentiating_never_adds_variables(expr in polynomial_with_powers()) {
        let derivative = expr.derivative("x").unwrap();
        let original = expr.distinct_variables();

        prop_assert!(derivative.distinct_variables().is_subset(&original));
    }

    #[test]
    fn every_node_is_found_by_a_kind_search(expr in polynomial_with_powers()) {
        for node in &expr {
            prop_assert!(expr.contains_kind(node.kind()));
        }
    }
}

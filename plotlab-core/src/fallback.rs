//! The textual-substitution fallback evaluator.
//!
//! Last stage of the resolution pipeline: when the strict engine rejects an
//! expression (matrix-semantics operators, stray syntax), this evaluator
//! rewrites the text per element and constant-folds it with a restricted
//! arithmetic evaluator — an empty-symbol [`MathEngine`], so only the four
//! operator families, the builtin function set, and constants are reachable.
//! There is no general evaluation surface beyond that.
//!
//! Two paths:
//!
//! - **array path** — taken when the text mentions `sin(`, `cos(`, or
//!   `sqrt(` and references an array variable: the expression is mapped over
//!   that array's indices, substituting the array variable per element,
//!   sibling arrays by index, and scalars (including the loop time `t`)
//!   literally;
//! - **scalar path** — substitute scalar variables and fold once.
//!
//! Terminal default is scalar `0`; this module never fails.

use plotlab_graphics::types::Scalar;

use crate::expr::MathEngine;
use crate::types::Value;
use crate::variables::Environment;

/// Function markers that signal a presumably-elementwise array expression.
const ARRAY_MARKERS: [&str; 3] = ["sin(", "cos(", "sqrt("];

/// Evaluate by textual substitution. Never fails.
#[must_use]
pub fn evaluate(expr: &str, env: &Environment) -> Value {
    if ARRAY_MARKERS.iter().any(|m| expr.contains(m)) {
        return evaluate_array_expression(expr, env);
    }
    evaluate_scalar_expression(expr, env)
}

// ---------------------------------------------------------------------------
// Array path
// ---------------------------------------------------------------------------

fn evaluate_array_expression(expr: &str, env: &Environment) -> Value {
    let Some((array_name, array)) = find_array_variable(expr, env) else {
        return Value::Scalar(0.0);
    };

    let t = env.scalar("t").unwrap_or(0.0);
    let folder = MathEngine::new();

    let mapped = array
        .iter()
        .enumerate()
        .map(|(idx, &element)| {
            let mut local = strip_elementwise_dots(expr);
            local = substitute_word(&local, "t", &number_text(t));
            local = substitute_word(&local, array_name, &number_text(element));

            for (name, value) in env.iter() {
                if name == array_name || name == "t" {
                    continue;
                }
                let replacement = match value {
                    Value::Array(v) => number_text(v.get(idx).copied().unwrap_or(0.0)),
                    Value::Scalar(v) => number_text(*v),
                };
                local = substitute_word(&local, name, &replacement);
            }

            fold_scalar(&folder, &local).unwrap_or(0.0)
        })
        .collect();

    Value::Array(mapped)
}

/// Pick the array variable the expression refers to.
///
/// Candidates are non-empty array bindings whose name occurs in the text at
/// identifier boundaries. With several candidates the longest name wins
/// (ties broken alphabetically) so the choice does not depend on map order.
fn find_array_variable<'e>(expr: &str, env: &'e Environment) -> Option<(&'e str, &'e [Scalar])> {
    let mut best: Option<(&str, &[Scalar])> = None;
    for (name, value) in env.iter() {
        let Value::Array(v) = value else { continue };
        if v.is_empty() || !contains_word(expr, name) {
            continue;
        }
        let better = match best {
            None => true,
            Some((bn, _)) => {
                name.len() > bn.len() || (name.len() == bn.len() && name < bn)
            }
        };
        if better {
            best = Some((name, v.as_slice()));
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Scalar path
// ---------------------------------------------------------------------------

fn evaluate_scalar_expression(expr: &str, env: &Environment) -> Value {
    let mut local = strip_elementwise_dots(expr);
    for (name, value) in env.iter() {
        if let Value::Scalar(v) = value {
            local = substitute_word(&local, name, &number_text(*v));
        }
    }

    match fold_scalar(&MathEngine::new(), &local) {
        Some(v) if !v.is_nan() => Value::Scalar(v),
        _ => Value::Scalar(0.0),
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Fold a substituted expression down to one scalar.
fn fold_scalar(folder: &MathEngine, text: &str) -> Option<Scalar> {
    folder.evaluate(text).ok()?.as_scalar()
}

/// Render a number so it reparses to the same bits. Parenthesized so that
/// negative values keep their sign under operator precedence.
fn number_text(v: Scalar) -> String {
    format!("({v})")
}

/// Turn elementwise operators into their scalar forms (`.*` → `*`, ...).
fn strip_elementwise_dots(text: &str) -> String {
    text.replace(".*", "*").replace("./", "/").replace(".^", "^")
}

const fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Whether `name` occurs in `text` at identifier boundaries.
fn contains_word(text: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let bytes = text.as_bytes();
    let nb = name.as_bytes();
    let mut i = 0;
    while i + nb.len() <= bytes.len() {
        if &bytes[i..i + nb.len()] == nb
            && (i == 0 || !is_word_byte(bytes[i - 1]))
            && (i + nb.len() == bytes.len() || !is_word_byte(bytes[i + nb.len()]))
        {
            return true;
        }
        i += 1;
    }
    false
}

/// Replace identifier-boundary occurrences of `name` with `replacement`.
fn substitute_word(text: &str, name: &str, replacement: &str) -> String {
    if name.is_empty() {
        return text.to_owned();
    }
    let bytes = text.as_bytes();
    let nb = name.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        if i + nb.len() <= bytes.len()
            && &bytes[i..i + nb.len()] == nb
            && (i == 0 || !is_word_byte(bytes[i - 1]))
            && (i + nb.len() == bytes.len() || !is_word_byte(bytes[i + nb.len()]))
        {
            out.extend_from_slice(replacement.as_bytes());
            i += nb.len();
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_substitution_respects_boundaries() {
        assert_eq!(substitute_word("r + r_base", "r", "(2)"), "(2) + r_base");
        assert_eq!(
            substitute_word("r_base + r", "r_base", "(7)"),
            "(7) + r"
        );
        assert_eq!(substitute_word("tr + rt", "r", "(1)"), "tr + rt");
        assert_eq!(substitute_word("r'", "r", "(3)"), "(3)'");
    }

    #[test]
    fn contains_word_respects_boundaries() {
        assert!(contains_word("sin(i/1000)", "i"));
        assert!(!contains_word("sin(idx)", "i"));
        assert!(contains_word("theta + t", "t"));
        assert!(!contains_word("theta", "t"));
    }

    #[test]
    fn strip_dots() {
        assert_eq!(strip_elementwise_dots("a .* b ./ c .^ 2"), "a * b / c ^ 2");
    }

    #[test]
    fn scalar_path_substitutes_and_folds() {
        let mut env = Environment::new();
        env.set("t", Value::Scalar(2.0));
        assert_eq!(evaluate("t * 3 + 1", &env), Value::Scalar(7.0));
    }

    #[test]
    fn scalar_path_defaults_to_zero() {
        let env = Environment::new();
        assert_eq!(evaluate("q + 1", &env), Value::Scalar(0.0));
        assert_eq!(evaluate("%%%", &env), Value::Scalar(0.0));
    }

    #[test]
    fn array_path_maps_over_elements() {
        let mut env = Environment::new();
        env.set("a", Value::Array(vec![0.0, 9.0]));
        let v = evaluate("sqrt(a)", &env);
        assert_eq!(v, Value::Array(vec![0.0, 3.0]));
    }

    #[test]
    fn array_path_uses_time_variable() {
        let mut env = Environment::new();
        env.set("a", Value::Array(vec![1.0, 2.0]));
        env.set("t", Value::Scalar(0.0));
        // sin(t) = 0, so the result is just the elements.
        let v = evaluate("a + sin(t) .* a", &env);
        assert_eq!(v, Value::Array(vec![1.0, 2.0]));
    }

    #[test]
    fn array_path_substitutes_sibling_arrays_by_index() {
        let mut env = Environment::new();
        env.set("a", Value::Array(vec![1.0, 2.0, 3.0]));
        env.set("b", Value::Array(vec![10.0, 20.0, 30.0]));
        // `a * b` was rejected by the strict engine (matrix multiply);
        // here it maps per index.
        let v = evaluate("sin(0) + a * b", &env);
        assert_eq!(v, Value::Array(vec![10.0, 40.0, 90.0]));
    }

    #[test]
    fn array_path_short_sibling_reads_zero() {
        let mut env = Environment::new();
        env.set("a", Value::Array(vec![1.0, 2.0, 3.0]));
        env.set("b", Value::Array(vec![5.0]));
        let v = evaluate("cos(0) * a + b", &env);
        assert_eq!(v, Value::Array(vec![6.0, 2.0, 3.0]));
    }

    #[test]
    fn array_path_without_array_reference_is_zero() {
        let mut env = Environment::new();
        env.set("s", Value::Scalar(4.0));
        assert_eq!(evaluate("sqrt(s)", &env), Value::Scalar(0.0));
    }

    #[test]
    fn array_path_prefers_longest_name() {
        let mut env = Environment::new();
        env.set("r", Value::Array(vec![1.0]));
        env.set("r_base", Value::Array(vec![2.0, 3.0]));
        let (name, _) = find_array_variable("sin(r_base)", &env).expect("candidate");
        assert_eq!(name, "r_base");
    }

    #[test]
    fn array_path_handles_transpose_mark() {
        let mut env = Environment::new();
        env.set("i", Value::Array(vec![0.0, 1.0]));
        env.set("t", Value::Scalar(0.0));
        let v = evaluate("sin(i'/1000 + t)", &env);
        let out = v.to_vec();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], 0.0);
        assert!((out[1] - (0.001f64).sin()).abs() < 1e-12);
    }

    #[test]
    fn bad_per_element_text_yields_zero_element() {
        let mut env = Environment::new();
        env.set("a", Value::Array(vec![1.0, 2.0]));
        // `unknown` stays unresolved in every element.
        let v = evaluate("sin(a) + unknown", &env);
        assert_eq!(v, Value::Array(vec![0.0, 0.0]));
    }

    #[test]
    fn negative_substitution_keeps_precedence() {
        let mut env = Environment::new();
        env.set("s", Value::Scalar(-1.5));
        // (-1.5)^2 = 2.25; without parentheses this would fold to -2.25.
        assert_eq!(evaluate("s^2", &env), Value::Scalar(2.25));
    }
}

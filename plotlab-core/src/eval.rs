//! The expression-resolution pipeline.
//!
//! `evaluate` is the single entry point statement execution uses for every
//! right-hand side. It is an ordered fallback chain — each stage either
//! produces a value or hands the text to the next stage — terminating in a
//! defined default. It never fails:
//!
//! 1. exact variable-name lookup;
//! 2. pure numeric literal (decimal or exponential notation);
//! 3. `start:end` range syntax;
//! 4. the strict math engine ([`crate::expr`]);
//! 5. the textual-substitution fallback ([`crate::fallback`]), whose own
//!    terminal default is scalar `0`.

use plotlab_graphics::types::Scalar;

use crate::expr::MathEngine;
use crate::fallback;
use crate::types::Value;
use crate::variables::Environment;

/// Length of the range produced when the `end` of `start:end` names a
/// variable that is absent or not numeric.
const DEFAULT_RANGE_END: Scalar = 10_000.0;

/// Evaluate an expression against the environment. Never fails.
#[must_use]
pub fn evaluate(expression: &str, env: &Environment, engine: &MathEngine) -> Value {
    let expr = expression.trim();

    if let Some(v) = env.get(expr) {
        return v.clone();
    }

    if let Some(v) = parse_literal(expr) {
        return Value::Scalar(v);
    }

    if let Some(v) = parse_range(expr, env) {
        return v;
    }

    match engine.evaluate(expr) {
        Ok(v) => v,
        Err(err) => {
            log::debug!("strict evaluation of `{expr}` failed ({err}); using fallback");
            fallback::evaluate(expr, env)
        }
    }
}

// ---------------------------------------------------------------------------
// Stage 2: numeric literals
// ---------------------------------------------------------------------------

/// Parse a pure numeric literal: digits and dots, optionally followed by an
/// exponent part. Signs are not literals here — they go through the engine.
fn parse_literal(expr: &str) -> Option<Scalar> {
    let bytes = expr.as_bytes();
    if bytes.is_empty() {
        return None;
    }

    let mantissa_end = bytes
        .iter()
        .position(|b| !(b.is_ascii_digit() || *b == b'.'))
        .unwrap_or(bytes.len());
    if mantissa_end == 0 {
        return None;
    }

    let rest = &bytes[mantissa_end..];
    let is_plain = rest.is_empty();
    let is_exponential = matches!(rest.first(), Some(b'e' | b'E'))
        && {
            let digits = match rest.get(1) {
                Some(b'+' | b'-') => &rest[2..],
                _ => &rest[1..],
            };
            !digits.is_empty() && digits.iter().all(u8::is_ascii_digit)
        };

    if is_plain || is_exponential {
        expr.parse().ok()
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Stage 3: range syntax
// ---------------------------------------------------------------------------

/// Parse `start:end` where `start` is an integer literal and `end` is a
/// word (integer literal or variable name). Produces the dense ascending
/// integer sequence from `start` to `end` inclusive.
fn parse_range(expr: &str, env: &Environment) -> Option<Value> {
    let (start_text, end_text) = expr.split_once(':')?;
    if start_text.is_empty()
        || end_text.is_empty()
        || !start_text.bytes().all(|b| b.is_ascii_digit())
        || !end_text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
    {
        return None;
    }

    let start: Scalar = start_text.parse().ok()?;
    let end = env
        .scalar(end_text)
        .filter(|v| v.is_finite())
        .or_else(|| parse_leading_int(end_text))
        .unwrap_or(DEFAULT_RANGE_END);

    Some(Value::Array(make_range(start, end)))
}

/// The integer prefix of a word, `parseInt`-style (`"5x"` → 5).
fn parse_leading_int(word: &str) -> Option<Scalar> {
    let digits: String = word.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Dense inclusive integer sequence; empty when `end < start`.
fn make_range(start: Scalar, end: Scalar) -> Vec<Scalar> {
    let mut out = Vec::new();
    let mut j = start;
    while j <= end {
        out.push(j);
        j += 1.0;
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

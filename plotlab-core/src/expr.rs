//! The strict math-expression engine.
//!
//! A direct-interpretation recursive-descent evaluator: expressions are
//! evaluated as they are parsed, with no intermediate AST. The engine keeps
//! its own symbol table, mirrored from the variable environment on every
//! assignment, so expression evaluation sees exactly the bindings the
//! interpreter has made.
//!
//! # Operator semantics
//!
//! | Operator        | Scalars | Scalar–array | Array–array            |
//! |-----------------|---------|--------------|------------------------|
//! | `+`, `-`        | yes     | broadcast    | elementwise, same len  |
//! | `.*`, `./`, `.^`| yes     | broadcast    | elementwise, same len  |
//! | `*`             | yes     | broadcast    | rejected (matrix)      |
//! | `/`             | yes     | array/scalar | rejected (matrix)      |
//! | `^`             | yes     | rejected     | rejected (matrix)      |
//!
//! Matrix-semantics rejections are deliberate: the language subset has no
//! matrix algebra, and a rejection here is what routes the expression into
//! the textual fallback evaluator.
//!
//! Unary minus binds tighter than `+`/`-` but looser than `^`, so `-2^2`
//! is `-4`. Postfix `'` (transpose) is a no-op on vectors and scalars.

use std::collections::HashMap;

use plotlab_graphics::types::Scalar;

use crate::error::{EngineError, ErrorKind, EvalResult};
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};
use crate::types::Value;

// ---------------------------------------------------------------------------
// Math engine
// ---------------------------------------------------------------------------

/// The strict expression evaluator with its mirrored symbol table.
#[derive(Debug, Default)]
pub struct MathEngine {
    symbols: HashMap<String, Value>,
}

impl MathEngine {
    /// Create an engine with an empty symbol table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            symbols: HashMap::new(),
        }
    }

    /// Mirror a variable binding into the symbol table.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.symbols.insert(name.into(), value);
    }

    /// Look up a mirrored symbol.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.symbols.get(name)
    }

    /// Evaluate an expression against the mirrored symbols.
    pub fn evaluate(&self, source: &str) -> EvalResult<Value> {
        let tokens = Scanner::tokenize(source)?;
        let mut eval = Evaluator {
            tokens,
            pos: 0,
            symbols: &self.symbols,
        };
        let value = eval.expression()?;
        if eval.cur() == &TokenKind::Eof {
            Ok(value)
        } else {
            Err(EngineError::new(
                ErrorKind::UnexpectedToken,
                format!("trailing input after expression in `{source}`"),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Builtin functions and constants
// ---------------------------------------------------------------------------

/// Resolve a builtin unary function by name.
fn builtin_function(name: &str) -> Option<fn(Scalar) -> Scalar> {
    Some(match name {
        "sin" => Scalar::sin,
        "cos" => Scalar::cos,
        "sqrt" => Scalar::sqrt,
        "tan" => Scalar::tan,
        "abs" => Scalar::abs,
        "exp" => Scalar::exp,
        "log" => Scalar::ln,
        "floor" => Scalar::floor,
        "ceil" => Scalar::ceil,
        "round" => Scalar::round,
        _ => return None,
    })
}

/// Resolve a builtin constant by name.
fn builtin_constant(name: &str) -> Option<Scalar> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "Inf" | "inf" => Some(Scalar::INFINITY),
        "NaN" | "nan" => Some(Scalar::NAN),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Direct evaluator
// ---------------------------------------------------------------------------

struct Evaluator<'a> {
    tokens: Vec<Token>,
    pos: usize,
    symbols: &'a HashMap<String, Value>,
}

impl Evaluator<'_> {
    fn cur(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map_or(&TokenKind::Eof, |t| &t.kind)
    }

    fn bump(&mut self) -> TokenKind {
        let kind = self.cur().clone();
        self.pos += 1;
        kind
    }

    /// `expression := term (('+' | '-') term)*`
    fn expression(&mut self) -> EvalResult<Value> {
        let mut lhs = self.term()?;
        loop {
            match self.cur() {
                TokenKind::Plus => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    lhs = elementwise(&lhs, &rhs, "+", |a, b| a + b)?;
                }
                TokenKind::Minus => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    lhs = elementwise(&lhs, &rhs, "-", |a, b| a - b)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    /// `term := factor (('*' | '/' | '.*' | './') factor)*`
    fn term(&mut self) -> EvalResult<Value> {
        let mut lhs = self.factor()?;
        loop {
            match self.cur() {
                TokenKind::Star => {
                    self.pos += 1;
                    let rhs = self.factor()?;
                    lhs = matrix_multiply(&lhs, &rhs)?;
                }
                TokenKind::Slash => {
                    self.pos += 1;
                    let rhs = self.factor()?;
                    lhs = matrix_divide(&lhs, &rhs)?;
                }
                TokenKind::DotStar => {
                    self.pos += 1;
                    let rhs = self.factor()?;
                    lhs = elementwise(&lhs, &rhs, ".*", |a, b| a * b)?;
                }
                TokenKind::DotSlash => {
                    self.pos += 1;
                    let rhs = self.factor()?;
                    lhs = elementwise(&lhs, &rhs, "./", |a, b| a / b)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    /// `factor := ('-' | '+') factor | power`
    fn factor(&mut self) -> EvalResult<Value> {
        match self.cur() {
            TokenKind::Minus => {
                self.pos += 1;
                let v = self.factor()?;
                Ok(v.map(|x| -x))
            }
            TokenKind::Plus => {
                self.pos += 1;
                self.factor()
            }
            _ => self.power(),
        }
    }

    /// `power := postfix (('^' | '.^') factor)?` — right-associative via
    /// the recursive `factor` on the exponent, which also admits a signed
    /// exponent (`2^-3`).
    fn power(&mut self) -> EvalResult<Value> {
        let base = self.postfix()?;
        match self.cur() {
            TokenKind::Caret => {
                self.pos += 1;
                let exp = self.factor()?;
                matrix_power(&base, &exp)
            }
            TokenKind::DotCaret => {
                self.pos += 1;
                let exp = self.factor()?;
                elementwise(&base, &exp, ".^", Scalar::powf)
            }
            _ => Ok(base),
        }
    }

    /// `postfix := primary "'"*` — transpose is a no-op on vectors.
    fn postfix(&mut self) -> EvalResult<Value> {
        let v = self.primary()?;
        while self.cur() == &TokenKind::Quote {
            self.pos += 1;
        }
        Ok(v)
    }

    /// `primary := Number | Ident | Ident '(' expression ')' | '(' expression ')'`
    fn primary(&mut self) -> EvalResult<Value> {
        match self.bump() {
            TokenKind::Number(v) => Ok(Value::Scalar(v)),
            TokenKind::Ident(name) => {
                if self.cur() == &TokenKind::LParen {
                    if let Some(f) = builtin_function(&name) {
                        self.pos += 1;
                        let arg = self.expression()?;
                        self.expect_rparen(&name)?;
                        return Ok(arg.map(f));
                    }
                    // Indexing or an unknown call — not in the subset.
                    return Err(EngineError::new(
                        ErrorKind::UnexpectedToken,
                        format!("`{name}(` is neither a known function nor valid here"),
                    ));
                }
                if let Some(v) = self.symbols.get(&name) {
                    return Ok(v.clone());
                }
                if let Some(c) = builtin_constant(&name) {
                    return Ok(Value::Scalar(c));
                }
                Err(EngineError::new(
                    ErrorKind::UnknownIdentifier,
                    format!("`{name}` is not defined"),
                ))
            }
            TokenKind::LParen => {
                let v = self.expression()?;
                self.expect_rparen("(")?;
                Ok(v)
            }
            other => Err(EngineError::new(
                ErrorKind::UnexpectedToken,
                format!("unexpected token {other:?}"),
            )),
        }
    }

    fn expect_rparen(&mut self, what: &str) -> EvalResult<()> {
        if self.cur() == &TokenKind::RParen {
            self.pos += 1;
            Ok(())
        } else {
            Err(EngineError::new(
                ErrorKind::UnexpectedToken,
                format!("missing `)` after `{what}`"),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Operator application
// ---------------------------------------------------------------------------

/// Elementwise binary application with scalar broadcasting.
fn elementwise(
    lhs: &Value,
    rhs: &Value,
    op: &str,
    f: impl Fn(Scalar, Scalar) -> Scalar,
) -> EvalResult<Value> {
    match (lhs, rhs) {
        (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(f(*a, *b))),
        (Value::Scalar(a), Value::Array(b)) => {
            Ok(Value::Array(b.iter().map(|&x| f(*a, x)).collect()))
        }
        (Value::Array(a), Value::Scalar(b)) => {
            Ok(Value::Array(a.iter().map(|&x| f(x, *b)).collect()))
        }
        (Value::Array(a), Value::Array(b)) => {
            if a.len() == b.len() {
                Ok(Value::Array(
                    a.iter().zip(b.iter()).map(|(&x, &y)| f(x, y)).collect(),
                ))
            } else {
                Err(EngineError::new(
                    ErrorKind::LengthMismatch,
                    format!("`{op}` operands have lengths {} and {}", a.len(), b.len()),
                ))
            }
        }
    }
}

/// Plain `*`: scalar product or scalar–array broadcast. Two array operands
/// would be matrix multiplication, which the subset rejects.
fn matrix_multiply(lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    if lhs.is_array() && rhs.is_array() {
        return Err(EngineError::new(
            ErrorKind::MatrixOperand,
            "`*` between arrays is matrix multiplication; use `.*`",
        ));
    }
    elementwise(lhs, rhs, "*", |a, b| a * b)
}

/// Plain `/`: scalar quotient or array/scalar broadcast. A divisor array
/// would require a matrix inverse, which the subset rejects.
fn matrix_divide(lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    if rhs.is_array() {
        return Err(EngineError::new(
            ErrorKind::MatrixOperand,
            "`/` by an array is matrix division; use `./`",
        ));
    }
    elementwise(lhs, rhs, "/", |a, b| a / b)
}

/// Plain `^`: scalars only. Any array operand would be matrix power.
fn matrix_power(lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    if lhs.is_array() || rhs.is_array() {
        return Err(EngineError::new(
            ErrorKind::MatrixOperand,
            "`^` with an array operand is matrix power; use `.^`",
        ));
    }
    elementwise(lhs, rhs, "^", Scalar::powf)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str) -> Value {
        MathEngine::new().evaluate(src).expect(src)
    }

    fn eval_with(engine: &MathEngine, src: &str) -> Value {
        engine.evaluate(src).expect(src)
    }

    #[test]
    fn scalar_arithmetic() {
        assert_eq!(eval("3 + 4"), Value::Scalar(7.0));
        assert_eq!(eval("10 - 2 - 3"), Value::Scalar(5.0));
        assert_eq!(eval("2 * 3 + 4"), Value::Scalar(10.0));
        assert_eq!(eval("2 + 3 * 4"), Value::Scalar(14.0));
        assert_eq!(eval("8 / 4 / 2"), Value::Scalar(1.0));
        assert_eq!(eval("(2 + 3) * 4"), Value::Scalar(20.0));
    }

    #[test]
    fn power_binds_tighter_than_unary_minus() {
        assert_eq!(eval("-2^2"), Value::Scalar(-4.0));
        assert_eq!(eval("(-2)^2"), Value::Scalar(4.0));
        assert_eq!(eval("2^-3"), Value::Scalar(0.125));
    }

    #[test]
    fn constants() {
        assert_eq!(eval("pi"), Value::Scalar(std::f64::consts::PI));
        assert_eq!(eval("Inf"), Value::Scalar(f64::INFINITY));
        assert!(eval("NaN").as_scalar().expect("scalar").is_nan());
    }

    #[test]
    fn functions_on_scalars() {
        assert_eq!(eval("sin(0)"), Value::Scalar(0.0));
        assert_eq!(eval("sqrt(9)"), Value::Scalar(3.0));
        assert_eq!(eval("abs(-5)"), Value::Scalar(5.0));
        assert_eq!(eval("floor(2.7)"), Value::Scalar(2.0));
        assert_eq!(eval("ceil(2.1)"), Value::Scalar(3.0));
        assert_eq!(eval("round(2.5)"), Value::Scalar(3.0));
        assert_eq!(eval("exp(0)"), Value::Scalar(1.0));
        assert_eq!(eval("log(1)"), Value::Scalar(0.0));
    }

    #[test]
    fn functions_broadcast_over_arrays() {
        let mut engine = MathEngine::new();
        engine.set("a", Value::Array(vec![0.0, 9.0, 16.0]));
        assert_eq!(
            eval_with(&engine, "sqrt(a)"),
            Value::Array(vec![0.0, 3.0, 4.0])
        );
    }

    #[test]
    fn symbols_resolve() {
        let mut engine = MathEngine::new();
        engine.set("x", Value::Scalar(5.0));
        assert_eq!(eval_with(&engine, "x * 2"), Value::Scalar(10.0));
    }

    #[test]
    fn unknown_identifier_errors() {
        let err = MathEngine::new().evaluate("q + 1").expect_err("unknown");
        assert_eq!(err.kind, ErrorKind::UnknownIdentifier);
    }

    #[test]
    fn scalar_array_broadcast() {
        let mut engine = MathEngine::new();
        engine.set("a", Value::Array(vec![1.0, 2.0, 3.0]));
        assert_eq!(
            eval_with(&engine, "a + 10"),
            Value::Array(vec![11.0, 12.0, 13.0])
        );
        assert_eq!(
            eval_with(&engine, "2 * a"),
            Value::Array(vec![2.0, 4.0, 6.0])
        );
        assert_eq!(
            eval_with(&engine, "a / 2"),
            Value::Array(vec![0.5, 1.0, 1.5])
        );
    }

    #[test]
    fn elementwise_array_array() {
        let mut engine = MathEngine::new();
        engine.set("a", Value::Array(vec![1.0, 2.0, 3.0]));
        engine.set("b", Value::Array(vec![4.0, 5.0, 6.0]));
        assert_eq!(
            eval_with(&engine, "a .* b"),
            Value::Array(vec![4.0, 10.0, 18.0])
        );
        assert_eq!(
            eval_with(&engine, "a + b"),
            Value::Array(vec![5.0, 7.0, 9.0])
        );
        assert_eq!(
            eval_with(&engine, "b ./ a"),
            Value::Array(vec![4.0, 2.5, 2.0])
        );
        assert_eq!(
            eval_with(&engine, "a .^ 2"),
            Value::Array(vec![1.0, 4.0, 9.0])
        );
    }

    #[test]
    fn matrix_operators_reject_arrays() {
        let mut engine = MathEngine::new();
        engine.set("a", Value::Array(vec![1.0, 2.0]));
        engine.set("b", Value::Array(vec![3.0, 4.0]));
        assert_eq!(
            engine.evaluate("a * b").expect_err("mul").kind,
            ErrorKind::MatrixOperand
        );
        assert_eq!(
            engine.evaluate("1 / a").expect_err("div").kind,
            ErrorKind::MatrixOperand
        );
        assert_eq!(
            engine.evaluate("a ^ 2").expect_err("pow").kind,
            ErrorKind::MatrixOperand
        );
    }

    #[test]
    fn length_mismatch_rejected() {
        let mut engine = MathEngine::new();
        engine.set("a", Value::Array(vec![1.0, 2.0]));
        engine.set("b", Value::Array(vec![1.0, 2.0, 3.0]));
        assert_eq!(
            engine.evaluate("a + b").expect_err("mismatch").kind,
            ErrorKind::LengthMismatch
        );
        assert_eq!(
            engine.evaluate("a .* b").expect_err("mismatch").kind,
            ErrorKind::LengthMismatch
        );
    }

    #[test]
    fn transpose_is_vector_noop() {
        let mut engine = MathEngine::new();
        engine.set("i", Value::Array(vec![1.0, 2.0]));
        assert_eq!(eval_with(&engine, "i'"), Value::Array(vec![1.0, 2.0]));
        assert_eq!(
            eval_with(&engine, "i' / 2"),
            Value::Array(vec![0.5, 1.0])
        );
        assert_eq!(eval("5'"), Value::Scalar(5.0));
    }

    #[test]
    fn demo_script_expressions() {
        // Shapes from the galaxy-spiral demo program.
        let mut engine = MathEngine::new();
        engine.set("i", Value::Array(vec![1.0, 2.0, 3.0, 4.0]));
        engine.set("t", Value::Scalar(0.5));

        let r_base = eval_with(&engine, "sqrt(i) * 1.5");
        assert_eq!(r_base.len(), 4);
        engine.set("r_base", r_base);

        let theta = eval_with(&engine, "i * (137.5 * pi / 180)");
        assert_eq!(theta.len(), 4);

        let r = eval_with(&engine, "r_base + 10 .* sin(r_base ./ 20 - t * 3)");
        assert_eq!(r.len(), 4);

        let c = eval_with(&engine, "sin(i' / 1000 + t) * 0.5 + 0.5");
        assert_eq!(c.len(), 4);
        for v in c.to_vec() {
            assert!((0.0..=1.0).contains(&v), "normalized CData, got {v}");
        }
    }

    #[test]
    fn trailing_input_rejected() {
        let err = MathEngine::new().evaluate("1 2").expect_err("trailing");
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
    }

    #[test]
    fn empty_input_rejected() {
        assert!(MathEngine::new().evaluate("").is_err());
    }

    #[test]
    fn determinism_is_bit_exact() {
        let mut engine = MathEngine::new();
        engine.set("t", Value::Scalar(1.234_567_89));
        let a = eval_with(&engine, "sin(t)").as_scalar().expect("scalar");
        let b = eval_with(&engine, "sin(t)").as_scalar().expect("scalar");
        assert_eq!(a.to_bits(), b.to_bits(), "same env must give same bits");
    }
}

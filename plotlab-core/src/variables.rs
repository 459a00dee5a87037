//! Variable storage for the interpreter.
//!
//! A flat name → [`Value`] map with last-write-wins semantics. The
//! environment lives exactly as long as one `execute` run; a fresh run
//! replaces it wholesale.

use std::collections::HashMap;

use crate::types::Value;

/// The variable environment for one interpreter run.
#[derive(Debug, Default)]
pub struct Environment {
    vars: HashMap<String, Value>,
}

impl Environment {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    /// Bind `name` to `value`, replacing any previous binding.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// Look up a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Whether a variable is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// The scalar value of `name`, if it is bound to a scalar.
    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_scalar)
    }

    /// Iterate over all bindings (order unspecified).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variable is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_roundtrip() {
        let mut env = Environment::new();
        env.set("x", Value::Scalar(5.0));
        assert_eq!(env.get("x"), Some(&Value::Scalar(5.0)));
        assert!(env.contains("x"));
        assert!(!env.contains("y"));
    }

    #[test]
    fn last_write_wins() {
        let mut env = Environment::new();
        env.set("x", Value::Scalar(1.0));
        env.set("x", Value::Array(vec![1.0, 2.0]));
        assert_eq!(env.get("x"), Some(&Value::Array(vec![1.0, 2.0])));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn scalar_accessor_ignores_arrays() {
        let mut env = Environment::new();
        env.set("a", Value::Array(vec![1.0]));
        env.set("s", Value::Scalar(2.0));
        assert_eq!(env.scalar("a"), None);
        assert_eq!(env.scalar("s"), Some(2.0));
        assert_eq!(env.scalar("missing"), None);
    }
}

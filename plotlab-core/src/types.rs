//! Runtime value types for the script interpreter.
//!
//! Every expression evaluates to a [`Value`]: either a scalar or a dense
//! one-dimensional array of doubles. There is no matrix type — the language
//! subset only ever broadcasts over vectors.

use std::fmt;

use plotlab_graphics::types::Scalar;

/// A script value: scalar or dense 1-D array.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Array(Vec<Scalar>),
}

impl Value {
    /// Try to extract a scalar.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<Scalar> {
        if let Self::Scalar(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    /// Try to borrow the array payload.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Scalar]> {
        if let Self::Array(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Whether this is an array value.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Number of elements (1 for a scalar).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Array(v) => v.len(),
        }
    }

    /// Whether this is an empty array.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Array(v) if v.is_empty())
    }

    /// Coerce to a plain vector: a scalar becomes a one-element vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Scalar> {
        match self {
            Self::Scalar(v) => vec![*v],
            Self::Array(v) => v.clone(),
        }
    }

    /// Apply a function to every element, preserving shape.
    #[must_use]
    pub fn map(&self, f: impl Fn(Scalar) -> Scalar) -> Self {
        match self {
            Self::Scalar(v) => Self::Scalar(f(*v)),
            Self::Array(v) => Self::Array(v.iter().copied().map(f).collect()),
        }
    }
}

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vec<Scalar>> for Value {
    fn from(v: Vec<Scalar>) -> Self {
        Self::Array(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::Array(v) => {
                write!(f, "[")?;
                for (i, e) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Error types for the `plotlab` parser and interpreter.
//!
//! The public contract never raises: parse anomalies are dropped or
//! defaulted, evaluation anomalies resolve through the fallback chain, and
//! statement failures are per-statement no-ops. Internally, however, every
//! stage boundary is an explicit `Result` carrying one of these errors, and
//! recovered failures are appended to the context's diagnostics list so
//! hosts can inspect what was swallowed.

use std::fmt;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational message.
    Info,
    /// Recovered anomaly (execution continued).
    Warning,
    /// Error (a statement or stage was abandoned).
    Error,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// An error produced by the `plotlab` scanner, evaluator, or interpreter.
#[derive(Debug, Clone)]
pub struct EngineError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Severity.
    pub severity: Severity,
}

impl EngineError {
    /// Create a new error with the default `Error` severity.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// Set severity.
    #[must_use]
    pub const fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for EngineError {}

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Categories of errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // -- Scan errors --
    /// Invalid character in an expression.
    InvalidCharacter,

    // -- Parse errors --
    /// Unexpected token in an expression.
    UnexpectedToken,

    // -- Evaluation errors --
    /// Identifier bound to no variable, function, or constant.
    UnknownIdentifier,
    /// Elementwise operands of different lengths.
    LengthMismatch,
    /// Plain (matrix-semantics) operator applied to array operands.
    MatrixOperand,

    // -- Statement errors --
    /// Property assignment on a handle that was never created.
    UnknownHandle,
    /// Property name not understood by any handle.
    UnknownProperty,

    // -- Internal --
    /// Internal error (should not happen).
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCharacter => write!(f, "invalid character"),
            Self::UnexpectedToken => write!(f, "unexpected token"),
            Self::UnknownIdentifier => write!(f, "unknown identifier"),
            Self::LengthMismatch => write!(f, "length mismatch"),
            Self::MatrixOperand => write!(f, "matrix operand"),
            Self::UnknownHandle => write!(f, "unknown handle"),
            Self::UnknownProperty => write!(f, "unknown property"),
            Self::Internal => write!(f, "internal error"),
        }
    }
}

/// Convenience type alias for results using [`EngineError`].
pub type EvalResult<T> = Result<T, EngineError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// ABOUTME: Error types for the RPAL standardizer, flattener, and CSE machine

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RpalError {
    #[error("Syntax error: {0}")]
    SyntaxError(String),

    #[error("Standardization error: {0}")]
    StandardizationError(String),

    #[error("Unbound identifier: {0}")]
    UnboundIdentifier(String),

    #[error("Invalid application: {0}")]
    InvalidApplication(String),

    #[error("Type error in {function}: {message}")]
    TypeError { function: String, message: String },

    #[error("Arity mismatch in {function}: expected {expected}, got {actual}")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("Index error: {0}")]
    IndexError(String),

    #[error("Division by zero")]
    DivByZero,

    #[error("Invalid control state: {0}")]
    InvalidControl(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl RpalError {
    pub fn type_error(function: &str, message: impl Into<String>) -> Self {
        RpalError::TypeError {
            function: function.to_string(),
            message: message.into(),
        }
    }

    pub fn arity_mismatch(function: &str, expected: usize, actual: usize) -> Self {
        RpalError::ArityMismatch {
            function: function.to_string(),
            expected,
            actual,
        }
    }
}

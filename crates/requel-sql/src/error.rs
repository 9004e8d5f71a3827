//! Error types for requel-sql

use thiserror::Error;

/// The result type for requel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while lexing, parsing, or editing SQL
#[derive(Debug, Error)]
pub enum Error {
    /// Error during character scanning or lexeme classification:
    /// unterminated string, identifier, block comment, or dollar-quote
    #[error("Lexical error at line {line}, column {column}: {message}")]
    Lexical {
        message: String,
        line: usize,
        column: usize,
    },

    /// A token did not match what the grammar required at that position
    #[error("Syntax error: expected {expected}, found {found}")]
    Syntax { expected: String, found: String },

    /// A recognized grammar shape that this parser does not implement,
    /// distinguished from malformed input
    #[error("Unsupported construct: {construct}")]
    Unsupported { construct: String },

    /// An edit or fold operation targeted a column or constraint that is
    /// absent from the working table definition
    #[error("Structural error: {0}")]
    Structural(String),

    /// Internal error (should not happen in normal usage)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a lexical error
    pub fn lexical(message: impl Into<String>, line: usize, column: usize) -> Self {
        Error::Lexical {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a syntax error naming the expected and offending tokens
    pub fn syntax(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::Syntax {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a syntax error for a required token missing at end of input
    pub fn end_of_input(expected: impl Into<String>) -> Self {
        Error::Syntax {
            expected: expected.into(),
            found: "end of input".to_string(),
        }
    }

    /// Create an unsupported-construct error
    pub fn unsupported(construct: impl Into<String>) -> Self {
        Error::Unsupported {
            construct: construct.into(),
        }
    }

    /// Create a structural error
    pub fn structural(message: impl Into<String>) -> Self {
        Error::Structural(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }
}

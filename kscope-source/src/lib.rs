//! Source code representation and error management.

/// Represents source code.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    /// Original source code.
    pub content: &'a str,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        Self { content }
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

/// A compile time error.
///
/// Only the message is carried. There is no source position and the first error aborts the run.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Grammar violation (unexpected token, missing delimiter, missing clause).
    #[error("{0}")]
    Parse(String),
    /// Unknown identifier or function, or a scope rule violation such as writing a constant.
    #[error("{0}")]
    Resolution(String),
    /// Operand mismatch, unsupported operator or missing return.
    #[error("{0}")]
    Type(String),
    /// The IR library rejected a request or the finished module failed verification.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CompileError {
    pub fn parse(message: impl ToString) -> Self {
        Self::Parse(message.to_string())
    }

    pub fn resolution(message: impl ToString) -> Self {
        Self::Resolution(message.to_string())
    }

    pub fn ty(message: impl ToString) -> Self {
        Self::Type(message.to_string())
    }

    pub fn internal(message: impl ToString) -> Self {
        Self::Internal(message.to_string())
    }

    /// Returns the message without any category.
    pub fn message(&self) -> &str {
        match self {
            Self::Parse(message)
            | Self::Resolution(message)
            | Self::Type(message)
            | Self::Internal(message) => message,
        }
    }
}

/// Result alias used by every compilation stage.
pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_message_only() {
        let err = CompileError::resolution("could not identify var: x");
        assert_eq!(err.to_string(), "could not identify var: x");
        assert_eq!(err.message(), "could not identify var: x");
    }

    #[test]
    fn internal_errors_are_tagged() {
        let err = CompileError::internal("bad terminator");
        assert_eq!(err.to_string(), "internal error: bad terminator");
        assert_eq!(err.message(), "bad terminator");
    }

    #[test]
    fn source_from_str() {
        let source: Source = "def".into();
        assert_eq!(source.content, "def");
    }
}

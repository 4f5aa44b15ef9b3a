// ABOUTME: Error types for lexing, parsing, and evaluation failures

use thiserror::Error;

/// Unified error type for every stage of the interpreter pipeline.
///
/// No error is recovered inside the core; all propagate up to the CLI
/// driver, which is the only place they are reported and turned into a
/// process exit code.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpreterError {
    #[error("lex error: {0}")]
    Lex(String),

    #[error("lex error: invalid escape sequence: {0}")]
    InvalidEscape(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("arity error: {function} expects {expected} argument{}, got {actual}", if *.expected == 1 { "" } else { "s" })]
    Arity {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("loop overflow: exceeded {0} iterations")]
    LoopOverflow(usize),
}

impl InterpreterError {
    pub fn lex(message: impl Into<String>) -> Self {
        InterpreterError::Lex(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        InterpreterError::Parse(message.into())
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        InterpreterError::Type(message.into())
    }

    pub fn arity(function: impl Into<String>, expected: usize, actual: usize) -> Self {
        InterpreterError::Arity {
            function: function.into(),
            expected,
            actual,
        }
    }

    /// Process exit code the CLI driver should use for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            InterpreterError::Lex(_)
            | InterpreterError::InvalidEscape(_)
            | InterpreterError::Parse(_) => 1,
            InterpreterError::Type(_)
            | InterpreterError::Arity { .. }
            | InterpreterError::LoopOverflow(_) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_message_pluralizes() {
        let one = InterpreterError::arity("f", 1, 0);
        assert_eq!(one.to_string(), "arity error: f expects 1 argument, got 0");

        let many = InterpreterError::arity("f", 2, 3);
        assert_eq!(
            many.to_string(),
            "arity error: f expects 2 arguments, got 3"
        );
    }

    #[test]
    fn exit_codes_split_parse_from_runtime() {
        assert_eq!(InterpreterError::parse("x").exit_code(), 1);
        assert_eq!(InterpreterError::type_error("x").exit_code(), 2);
    }
}

//! Syntax error types
//!
//! Messages are the user-facing text; the offset is carried separately so a
//! front end can place a caret under the offending token.

use crate::lexical::LexerError;
use crate::logging::{codes, Code};

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lexical(#[from] LexerError),

    #[error("Expecting identifier, found {found}")]
    ExpectingIdentifier { found: String, offset: usize },

    #[error("Unmatched parenthesis")]
    UnmatchedParenthesis { offset: usize },

    #[error("Formula ended unexpectedly")]
    UnexpectedEnd { offset: usize },

    #[error("Unexpected token {found}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("',' or ')' expected, found {found}")]
    MalformedArgumentList { found: String, offset: usize },

    #[error("Expecting operator but found {found}")]
    ExpectingOperator { found: String, offset: usize },

    #[error("Formula is nested too deeply")]
    MaxRecursionDepth { offset: usize },
}

impl SyntaxError {
    pub fn expecting_identifier(found: impl ToString, offset: usize) -> Self {
        Self::ExpectingIdentifier {
            found: found.to_string(),
            offset,
        }
    }

    pub fn unexpected_token(found: impl ToString, offset: usize) -> Self {
        Self::UnexpectedToken {
            found: found.to_string(),
            offset,
        }
    }

    pub fn malformed_argument_list(found: impl ToString, offset: usize) -> Self {
        Self::MalformedArgumentList {
            found: found.to_string(),
            offset,
        }
    }

    pub fn expecting_operator(found: impl ToString, offset: usize) -> Self {
        Self::ExpectingOperator {
            found: found.to_string(),
            offset,
        }
    }

    /// Character offset the error refers to
    pub fn offset(&self) -> usize {
        match self {
            Self::Lexical(error) => error.offset(),
            Self::ExpectingIdentifier { offset, .. }
            | Self::UnmatchedParenthesis { offset }
            | Self::UnexpectedEnd { offset }
            | Self::UnexpectedToken { offset, .. }
            | Self::MalformedArgumentList { offset, .. }
            | Self::ExpectingOperator { offset, .. }
            | Self::MaxRecursionDepth { offset } => *offset,
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::Lexical(error) => error.error_code(),
            Self::ExpectingIdentifier { .. } => codes::syntax::EXPECTING_IDENTIFIER,
            Self::UnmatchedParenthesis { .. } => codes::syntax::UNMATCHED_PARENTHESIS,
            Self::UnexpectedEnd { .. } => codes::syntax::UNEXPECTED_END,
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::MalformedArgumentList { .. } => codes::syntax::MALFORMED_ARGUMENT_LIST,
            Self::ExpectingOperator { .. } => codes::syntax::TRAILING_INPUT,
            Self::MaxRecursionDepth { .. } => codes::syntax::MAX_RECURSION_DEPTH,
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, Self::Lexical(_))
    }

    /// Check if this error requires halting processing
    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SyntaxError::UnexpectedEnd { offset: 3 }.error_code().as_str(),
            "E041"
        );
        assert_eq!(
            SyntaxError::unexpected_token(")", 0).error_code().as_str(),
            "E050"
        );
        assert_eq!(
            SyntaxError::expecting_operator("2", 2).error_code().as_str(),
            "E040"
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            SyntaxError::malformed_argument_list("3", 5).to_string(),
            "',' or ')' expected, found 3"
        );
        assert_eq!(
            SyntaxError::expecting_identifier("end-of-line", 2).to_string(),
            "Expecting identifier, found end-of-line"
        );
    }

    #[test]
    fn test_lexical_errors_keep_their_offset_and_code() {
        let error: SyntaxError = LexerError::InvalidExponent { offset: 7 }.into();
        assert!(error.is_lexical());
        assert_eq!(error.offset(), 7);
        assert_eq!(error.error_code().as_str(), "E023");
        assert_eq!(error.to_string(), "Invalid exponent");
    }

    #[test]
    fn test_depth_error_requires_halt() {
        assert!(SyntaxError::MaxRecursionDepth { offset: 0 }.requires_halt());
        assert!(!SyntaxError::UnmatchedParenthesis { offset: 0 }.requires_halt());
    }
}

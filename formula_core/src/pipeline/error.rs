use serde::{Deserialize, Serialize};
use std::fmt;

use crate::evaluation::EvalError;
use crate::lexical::LexerError;
use crate::logging::Code;
use crate::syntax::SyntaxError;

/// Failure classification reported to hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Type,
    Binding,
    Runtime,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Lexical => "lexical",
            ErrorKind::Syntax => "syntax",
            ErrorKind::Type => "type",
            ErrorKind::Binding => "binding",
            ErrorKind::Runtime => "runtime",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Any failure from compiling or evaluating a formula
///
/// Displays as the bare message; use [`FormulaError::offset`] to place a
/// caret.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Evaluation(#[from] EvalError),
}

impl From<LexerError> for FormulaError {
    fn from(error: LexerError) -> Self {
        Self::Syntax(SyntaxError::Lexical(error))
    }
}

impl FormulaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax(error) if error.is_lexical() => ErrorKind::Lexical,
            Self::Syntax(_) => ErrorKind::Syntax,
            Self::Evaluation(error) => error.kind(),
        }
    }

    /// Character offset into the formula, when one is known
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Syntax(error) => Some(error.offset()),
            Self::Evaluation(error) => error.offset(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Syntax(error) => error.error_code(),
            Self::Evaluation(error) => error.error_code(),
        }
    }
}

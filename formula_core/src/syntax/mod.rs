//! Syntax analysis - formula text to expression tree
//!
//! The parser pulls tokens lazily through [`crate::tokens::TokenStream`], so
//! a lexical error surfaces at the point the parser first needs the
//! offending token.

mod error;
mod parser;

pub use error::{SyntaxError, SyntaxResult};
pub use parser::FormulaParser;

use crate::config::ParserPreferences;
use crate::evaluation::Node;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};

/// Parse with the default parser preferences
pub fn parse(input: &str) -> SyntaxResult<Node> {
    parse_with(input, &ParserPreferences::default())
}

/// Parse with explicit preferences
pub fn parse_with(input: &str, preferences: &ParserPreferences) -> SyntaxResult<Node> {
    log_debug!("Starting syntax analysis",
        "length" => input.chars().count(),
        "max_depth" => preferences.effective_max_depth()
    );

    let result = FormulaParser::new(input, preferences).parse();

    match &result {
        Ok(_) => {
            log_success!(
                codes::success::PARSE_COMPLETE,
                "Syntax analysis completed successfully"
            );
        }
        Err(error) => {
            log_error!(error.error_code(), "Syntax analysis failed",
                "error" => error,
                "offset" => error.offset()
            );
        }
    }

    result
}

/// Module version
pub const VERSION: &str = "1.0.0";

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_entry_points() {
        assert!(parse("1 + 1").is_ok());
        let preferences = ParserPreferences { max_depth: 2 };
        assert!(parse_with("(1)", &preferences).is_ok());
        assert_matches!(
            parse_with("((1))", &preferences),
            Err(SyntaxError::MaxRecursionDepth { offset: 2 })
        );
    }

    #[test]
    fn test_preferences_cannot_exceed_hard_limit() {
        use crate::config::compile_time::syntax::MAX_PARSE_DEPTH;
        let preferences = ParserPreferences { max_depth: usize::MAX };
        assert_eq!(preferences.effective_max_depth(), MAX_PARSE_DEPTH);
        let nested = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        assert!(parse_with(&nested, &preferences).is_ok());
    }
}

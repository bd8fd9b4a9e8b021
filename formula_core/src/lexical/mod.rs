//! Lexical analysis for formula text
//!
//! The parser drives the lexer lazily through [`crate::tokens::TokenStream`];
//! [`tokenize`] scans a whole formula eagerly for tooling and diagnostics.

pub mod analyzer;

use crate::logging::codes;
use crate::tokens::SpannedToken;
use crate::{log_error, log_success};

pub use analyzer::{is_identifier_part, is_identifier_start, LexerError, LexicalAnalyzer, LexicalMetrics};

/// Scan a complete formula, including the trailing `Eof` token
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, LexerError> {
    let mut analyzer = LexicalAnalyzer::new(input);
    let mut tokens = Vec::new();

    loop {
        match analyzer.next_token() {
            Ok(token) => {
                let done = token.value.is_eof();
                tokens.push(token);
                if done {
                    break;
                }
            }
            Err(error) => {
                log_error!(error.error_code(), &error.to_string(),
                    "offset" => error.offset()
                );
                return Err(error);
            }
        }
    }

    log_success!(
        codes::success::TOKENIZATION_COMPLETE,
        "Tokenization completed",
        "tokens" => analyzer.metrics().total_tokens,
        "identifiers" => analyzer.metrics().identifier_tokens
    );

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::Token;

    #[test]
    fn test_tokenize_includes_eof() {
        let tokens = tokenize("1 + x").unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[3].value, Token::Eof);
    }

    #[test]
    fn test_tokenize_empty_input() {
        let tokens = tokenize("   ").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].span.start(), 3);
    }

    #[test]
    fn test_tokenize_error() {
        let err = tokenize("a # b").unwrap_err();
        assert_eq!(err.offset(), 2);
    }
}

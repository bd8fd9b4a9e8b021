//! Core lexical analyzer
//!
//! Pull-based: the parser asks for one token at a time through the
//! lookahead buffer, so a lexical failure surfaces exactly when the parser
//! reaches the offending input.

use crate::config::constants::compile_time::lexical::MAX_FORMULA_LENGTH;
use crate::logging::codes;
use crate::tokens::token::{classify_word, RelationalOperator, SpannedToken, Token};
use crate::utils::{Span, Spanned};
use unicode_general_category::{get_general_category, GeneralCategory};

/// Lexical analysis errors. Offsets are character offsets into the formula.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character {character} in formula")]
    InvalidCharacter { character: char, offset: usize },

    #[error("String constants must end with a double quote")]
    UnterminatedString { offset: usize },

    #[error("Character constant must contain exactly one character")]
    InvalidCharacterLiteral { offset: usize },

    #[error("Invalid number {text}")]
    InvalidNumber { text: String, offset: usize },

    #[error("Invalid exponent")]
    InvalidExponent { offset: usize },

    #[error("Formula exceeds maximum length of {max} characters")]
    FormulaTooLong { length: usize, max: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::InvalidCharacterLiteral { .. } => {
                codes::lexical::INVALID_CHARACTER_LITERAL
            }
            LexerError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexerError::InvalidExponent { .. } => codes::lexical::INVALID_EXPONENT,
            LexerError::FormulaTooLong { .. } => codes::lexical::FORMULA_TOO_LONG,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            LexerError::InvalidCharacter { offset, .. }
            | LexerError::UnterminatedString { offset }
            | LexerError::InvalidCharacterLiteral { offset }
            | LexerError::InvalidNumber { offset, .. }
            | LexerError::InvalidExponent { offset } => *offset,
            LexerError::FormulaTooLong { max, .. } => *max,
        }
    }
}

/// Token counts gathered while scanning
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub identifier_tokens: usize,
    pub literal_tokens: usize,
    pub operator_tokens: usize,
}

impl LexicalMetrics {
    fn record_token(&mut self, token: &Token) {
        match token {
            Token::Eof => return,
            Token::Identifier(_) => self.identifier_tokens += 1,
            token if token.is_literal() => self.literal_tokens += 1,
            Token::Comma | Token::Dot | Token::LeftParen | Token::RightParen => {}
            _ => self.operator_tokens += 1,
        }
        self.total_tokens += 1;
    }
}

/// Scanner over formula text
pub struct LexicalAnalyzer<'a> {
    source: &'a str,
    chars: Vec<char>,
    position: usize,
    metrics: LexicalMetrics,
}

impl<'a> LexicalAnalyzer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            position: 0,
            metrics: LexicalMetrics::default(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    fn peek_at(&self, distance: usize) -> Option<char> {
        self.chars.get(self.position + distance).copied()
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.position += 1;
        }
    }

    fn token(&mut self, token: Token, start: usize) -> SpannedToken {
        self.metrics.record_token(&token);
        Spanned::new(token, Span::new(start, self.position))
    }

    /// Scan the next token. Once input is exhausted every call returns a
    /// zero-length `Eof` token at the end offset.
    pub fn next_token(&mut self) -> Result<SpannedToken, LexerError> {
        if self.chars.len() > MAX_FORMULA_LENGTH {
            return Err(LexerError::FormulaTooLong {
                length: self.chars.len(),
                max: MAX_FORMULA_LENGTH,
            });
        }

        self.skip_whitespace();
        let start = self.position;

        let Some(c) = self.peek() else {
            return Ok(self.token(Token::Eof, start));
        };

        let simple = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '\\' => Some(Token::Backslash),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            '&' => Some(Token::Ampersand),
            '=' => Some(Token::Relational(RelationalOperator::Equal)),
            _ => None,
        };
        if let Some(token) = simple {
            self.advance();
            return Ok(self.token(token, start));
        }

        match c {
            '<' => {
                self.advance();
                let op = match self.peek() {
                    Some('=') => {
                        self.advance();
                        RelationalOperator::LessOrEqual
                    }
                    Some('>') => {
                        self.advance();
                        RelationalOperator::NotEqual
                    }
                    _ => RelationalOperator::Less,
                };
                Ok(self.token(Token::Relational(op), start))
            }
            '>' => {
                self.advance();
                let op = if self.peek() == Some('=') {
                    self.advance();
                    RelationalOperator::GreaterOrEqual
                } else {
                    RelationalOperator::Greater
                };
                Ok(self.token(Token::Relational(op), start))
            }
            '.' if !matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) => {
                self.advance();
                Ok(self.token(Token::Dot, start))
            }
            '"' => self.scan_string(start),
            c if c.is_ascii_digit() || c == '.' => self.scan_number(start),
            c if is_identifier_start(c) => Ok(self.scan_word(start)),
            other => Err(LexerError::InvalidCharacter {
                character: other,
                offset: start,
            }),
        }
    }

    /// `"..."` is text, `"x"c` is a character. There is no escape syntax.
    fn scan_string(&mut self, start: usize) -> Result<SpannedToken, LexerError> {
        self.advance();
        let mut body = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(LexerError::UnterminatedString {
                        offset: self.position,
                    })
                }
                Some('"') => break,
                Some(c) => {
                    body.push(c);
                    self.advance();
                }
            }
        }
        self.advance();

        if self.peek() == Some('c') {
            let mut chars = body.chars();
            let (Some(single), None) = (chars.next(), chars.next()) else {
                return Err(LexerError::InvalidCharacterLiteral {
                    offset: self.position,
                });
            };
            self.advance();
            return Ok(self.token(Token::Char(single), start));
        }

        Ok(self.token(Token::Text(body), start))
    }

    fn take_digits(&mut self, text: &mut String) {
        while let Some(d) = self.peek().filter(char::is_ascii_digit) {
            text.push(d);
            self.advance();
        }
    }

    fn scan_number(&mut self, start: usize) -> Result<SpannedToken, LexerError> {
        let mut text = String::new();
        self.take_digits(&mut text);

        if !matches!(self.peek(), Some('.') | Some('e')) {
            return match text.parse::<i32>() {
                Ok(value) => Ok(self.token(Token::Integer(value), start)),
                Err(_) => Err(LexerError::InvalidNumber {
                    text,
                    offset: self.position,
                }),
            };
        }

        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) {
            self.advance();
            text.push('.');
            self.take_digits(&mut text);
        }

        if self.peek() == Some('e') {
            self.advance();
            text.push('e');
            if let Some(sign @ ('+' | '-')) = self.peek() {
                self.advance();
                text.push(sign);
            }
            if !matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                return Err(LexerError::InvalidExponent {
                    offset: self.position,
                });
            }
            self.take_digits(&mut text);
        }

        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(self.token(Token::Double(value), start)),
            _ => Err(LexerError::InvalidNumber {
                text,
                offset: self.position,
            }),
        }
    }

    fn scan_word(&mut self, start: usize) -> SpannedToken {
        let mut word = String::new();
        while let Some(c) = self.peek().filter(|c| is_identifier_part(*c)) {
            word.push(c);
            self.advance();
        }
        let token = classify_word(&word);
        self.token(token, start)
    }
}

/// Letters and letter-numbers may start an identifier
pub fn is_identifier_start(c: char) -> bool {
    use GeneralCategory::*;
    matches!(
        get_general_category(c),
        UppercaseLetter | LowercaseLetter | TitlecaseLetter | ModifierLetter | OtherLetter
            | LetterNumber
    )
}

/// Identifier continuation: start characters plus connector punctuation,
/// decimal digits, combining marks and format characters
pub fn is_identifier_part(c: char) -> bool {
    use GeneralCategory::*;
    is_identifier_start(c)
        || matches!(
            get_general_category(c),
            ConnectorPunctuation | DecimalNumber | NonspacingMark | SpacingMark | Format
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::Keyword;
    use assert_matches::assert_matches;

    fn scan(input: &str) -> Vec<SpannedToken> {
        let mut lexer = LexicalAnalyzer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            let done = token.value.is_eof();
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn kinds(input: &str) -> Vec<Token> {
        scan(input).into_iter().map(|t| t.value).collect()
    }

    fn scan_error(input: &str) -> LexerError {
        let mut lexer = LexicalAnalyzer::new(input);
        loop {
            match lexer.next_token() {
                Ok(token) if token.value.is_eof() => panic!("expected a lexical error"),
                Ok(_) => continue,
                Err(err) => return err,
            }
        }
    }

    #[test]
    fn test_single_character_tokens() {
        assert_eq!(
            kinds("+ - * / \\ , ( ) & ="),
            vec![
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::Backslash,
                Token::Comma,
                Token::LeftParen,
                Token::RightParen,
                Token::Ampersand,
                Token::Relational(RelationalOperator::Equal),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_relational_operators() {
        assert_eq!(
            kinds("< <= <> > >="),
            vec![
                Token::Relational(RelationalOperator::Less),
                Token::Relational(RelationalOperator::LessOrEqual),
                Token::Relational(RelationalOperator::NotEqual),
                Token::Relational(RelationalOperator::Greater),
                Token::Relational(RelationalOperator::GreaterOrEqual),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_offsets_skip_whitespace() {
        let tokens = scan("  ab \t+  12");
        assert_eq!(tokens[0].span, Span::new(2, 4));
        assert_eq!(tokens[1].span, Span::new(6, 7));
        assert_eq!(tokens[2].span, Span::new(9, 11));
        assert_eq!(tokens[3].span, Span::point(11));
    }

    #[test]
    fn test_integer_and_double_literals() {
        assert_eq!(kinds("42")[0], Token::Integer(42));
        assert_eq!(kinds("2.5")[0], Token::Double(2.5));
        assert_eq!(kinds(".5")[0], Token::Double(0.5));
        assert_eq!(kinds("1e3")[0], Token::Double(1000.0));
        assert_eq!(kinds("1.5e-2")[0], Token::Double(0.015));
        assert_eq!(kinds("2e+1")[0], Token::Double(20.0));
    }

    #[test]
    fn test_trailing_dot_is_member_access() {
        assert_eq!(kinds("1."), vec![Token::Double(1.0), Token::Dot, Token::Eof]);
        assert_eq!(
            kinds("a.b"),
            vec![
                Token::Identifier("a".into()),
                Token::Dot,
                Token::Identifier("b".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_integer_overflow_is_invalid_number() {
        let err = scan_error("99999999999");
        assert_eq!(err.to_string(), "Invalid number 99999999999");
        assert_eq!(err.offset(), 11);
        assert_eq!(err.error_code().as_str(), "E022");
    }

    #[test]
    fn test_invalid_exponent() {
        assert_matches!(scan_error("1e"), LexerError::InvalidExponent { offset: 2 });
        assert_matches!(scan_error("1e+"), LexerError::InvalidExponent { offset: 3 });
        assert_matches!(scan_error("1ex"), LexerError::InvalidExponent { offset: 2 });
    }

    #[test]
    fn test_string_literals() {
        let tokens = scan("\"hello world\"");
        assert_eq!(tokens[0].value, Token::Text("hello world".into()));
        assert_eq!(tokens[0].span, Span::new(0, 13));
        assert_eq!(kinds("\"\"")[0], Token::Text(String::new()));
    }

    #[test]
    fn test_character_literal() {
        let tokens = scan("\"x\"c");
        assert_eq!(tokens[0].value, Token::Char('x'));
        assert_eq!(tokens[0].span, Span::new(0, 4));
    }

    #[test]
    fn test_character_literal_length() {
        let err = scan_error("\"xy\"c");
        assert_eq!(
            err.to_string(),
            "Character constant must contain exactly one character"
        );
        assert_eq!(err.offset(), 4);
    }

    #[test]
    fn test_unterminated_string() {
        let err = scan_error("\"abc");
        assert_matches!(err, LexerError::UnterminatedString { offset: 4 });
        assert_eq!(err.to_string(), "String constants must end with a double quote");
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("a AND b or c Xor NOT d mod e Is Nothing True"),
            vec![
                Token::Identifier("a".into()),
                Token::Keyword(Keyword::And),
                Token::Identifier("b".into()),
                Token::Keyword(Keyword::Or),
                Token::Identifier("c".into()),
                Token::Keyword(Keyword::Xor),
                Token::Keyword(Keyword::Not),
                Token::Identifier("d".into()),
                Token::Keyword(Keyword::Mod),
                Token::Identifier("e".into()),
                Token::Relational(RelationalOperator::Is),
                Token::Nothing,
                Token::Boolean(true),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unicode_identifiers() {
        assert_eq!(kinds("größe_2")[0], Token::Identifier("größe_2".into()));
        assert_eq!(kinds("日付")[0], Token::Identifier("日付".into()));
    }

    #[test]
    fn test_identifier_characters_follow_general_category() {
        // Nonspacing mark (Mn) continues an identifier
        assert_eq!(
            kinds("a\u{0E47}")[0],
            Token::Identifier("a\u{0E47}".into())
        );

        // Other number (No) is not a digit
        assert_matches!(
            scan_error("x\u{00B2}"),
            LexerError::InvalidCharacter {
                character: '\u{00B2}',
                offset: 1
            }
        );

        // Spacing mark (Mc) may continue but not start
        assert_matches!(
            scan_error("\u{0903}a"),
            LexerError::InvalidCharacter {
                character: '\u{0903}',
                offset: 0
            }
        );
        assert_eq!(
            kinds("a\u{0903}")[0],
            Token::Identifier("a\u{0903}".into())
        );
    }

    #[test]
    fn test_identifier_cannot_start_with_underscore() {
        let err = scan_error("_x");
        assert_eq!(err.to_string(), "Invalid character _ in formula");
        assert_eq!(err.offset(), 0);
    }

    #[test]
    fn test_invalid_character() {
        let err = scan_error("1 + $");
        assert_matches!(
            err,
            LexerError::InvalidCharacter {
                character: '$',
                offset: 4
            }
        );
        assert_eq!(err.error_code().as_str(), "E020");
    }

    #[test]
    fn test_eof_is_repeatable() {
        let mut lexer = LexicalAnalyzer::new("x ");
        lexer.next_token().unwrap();
        for _ in 0..3 {
            let eof = lexer.next_token().unwrap();
            assert!(eof.value.is_eof());
            assert_eq!(eof.span, Span::point(2));
        }
    }

    #[test]
    fn test_metrics() {
        let mut lexer = LexicalAnalyzer::new("f(a, 2) + \"s\"");
        while !lexer.next_token().unwrap().value.is_eof() {}
        let metrics = lexer.metrics();
        assert_eq!(metrics.identifier_tokens, 2);
        assert_eq!(metrics.literal_tokens, 2);
        assert_eq!(metrics.operator_tokens, 1);
        assert_eq!(metrics.total_tokens, 8);
    }
}

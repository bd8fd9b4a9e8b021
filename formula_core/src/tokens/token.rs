//! Formula tokens

use crate::types::value::format_double;
use crate::utils::Spanned;
use std::fmt;

/// A token with span information
pub type SpannedToken = Spanned<Token>;

/// Word operators recognized case-insensitively by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    And,
    Or,
    Xor,
    Not,
    Mod,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::Xor => "XOR",
            Keyword::Not => "NOT",
            Keyword::Mod => "MOD",
        }
    }
}

/// Relational operators, including the identity operator `Is`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationalOperator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Is,
}

impl RelationalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationalOperator::Equal => "=",
            RelationalOperator::NotEqual => "<>",
            RelationalOperator::Less => "<",
            RelationalOperator::LessOrEqual => "<=",
            RelationalOperator::Greater => ">",
            RelationalOperator::GreaterOrEqual => ">=",
            RelationalOperator::Is => "is",
        }
    }

    /// Map a three-way comparison onto this operator's truth value
    pub fn holds(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            RelationalOperator::Equal => ordering == Equal,
            RelationalOperator::NotEqual => ordering != Equal,
            RelationalOperator::Less => ordering == Less,
            RelationalOperator::LessOrEqual => ordering != Greater,
            RelationalOperator::Greater => ordering == Greater,
            RelationalOperator::GreaterOrEqual => ordering != Less,
            RelationalOperator::Is => ordering == Equal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Integer(i32),
    Double(f64),
    Text(String),
    Char(char),
    Boolean(bool),
    Nothing,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Backslash,
    Ampersand,
    Relational(RelationalOperator),
    Keyword(Keyword),

    // Punctuation
    Comma,
    Dot,
    LeftParen,
    RightParen,

    Identifier(String),
    Eof,
}

impl Token {
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Token::Integer(_)
                | Token::Double(_)
                | Token::Text(_)
                | Token::Char(_)
                | Token::Boolean(_)
                | Token::Nothing
        )
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, Token::Keyword(k) if *k == keyword)
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_relational(&self) -> Option<RelationalOperator> {
        match self {
            Token::Relational(op) => Some(*op),
            _ => None,
        }
    }
}

/// Classify a scanned word as keyword, literal keyword, or identifier
pub fn classify_word(word: &str) -> Token {
    match word.to_lowercase().as_str() {
        "true" => Token::Boolean(true),
        "false" => Token::Boolean(false),
        "nothing" => Token::Nothing,
        "is" => Token::Relational(RelationalOperator::Is),
        "and" => Token::Keyword(Keyword::And),
        "or" => Token::Keyword(Keyword::Or),
        "xor" => Token::Keyword(Keyword::Xor),
        "not" => Token::Keyword(Keyword::Not),
        "mod" => Token::Keyword(Keyword::Mod),
        _ => Token::Identifier(word.to_string()),
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Integer(value) => write!(f, "{}", value),
            Token::Double(value) => write!(f, "{}", format_double(*value)),
            Token::Text(value) => write!(f, "\"{}\"", value),
            Token::Char(value) => write!(f, "\"{}\"c", value),
            Token::Boolean(true) => write!(f, "True"),
            Token::Boolean(false) => write!(f, "False"),
            Token::Nothing => write!(f, "Nothing"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Backslash => write!(f, "\\"),
            Token::Ampersand => write!(f, "&"),
            Token::Relational(op) => write!(f, "{}", op.as_str()),
            Token::Keyword(keyword) => write!(f, "{}", keyword.as_str()),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Eof => write!(f, "end-of-line"),
        }
    }
}

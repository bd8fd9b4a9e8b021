//! Lookahead buffer over the lexer
//!
//! Tokens are pulled from the lexer on demand and buffered in order, so the
//! parser can peek any distance ahead without re-lexing.

use crate::lexical::{LexerError, LexicalAnalyzer};
use crate::tokens::token::{SpannedToken, Token};
use std::collections::VecDeque;

pub struct TokenStream<'a> {
    lexer: LexicalAnalyzer<'a>,
    buffer: VecDeque<SpannedToken>,
}

impl<'a> TokenStream<'a> {
    pub fn new(lexer: LexicalAnalyzer<'a>) -> Self {
        Self {
            lexer,
            buffer: VecDeque::new(),
        }
    }

    pub fn from_source(input: &'a str) -> Self {
        Self::new(LexicalAnalyzer::new(input))
    }

    fn fill(&mut self, count: usize) -> Result<(), LexerError> {
        while self.buffer.len() < count {
            let token = self.lexer.next_token()?;
            self.buffer.push_back(token);
        }
        Ok(())
    }

    /// Consume and return the next token
    pub fn read(&mut self) -> Result<SpannedToken, LexerError> {
        match self.buffer.pop_front() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        }
    }

    /// Peek `n` tokens ahead without consuming (0 is the next token)
    pub fn lookahead(&mut self, n: usize) -> Result<&SpannedToken, LexerError> {
        self.fill(n + 1)?;
        // fill guarantees the slot exists
        Ok(&self.buffer[n])
    }

    /// Peek at the next token's kind
    pub fn peek(&mut self) -> Result<&Token, LexerError> {
        Ok(&self.lookahead(0)?.value)
    }

    /// Number of tokens pulled from the lexer but not yet consumed
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

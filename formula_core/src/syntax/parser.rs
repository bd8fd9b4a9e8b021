//! Recursive descent parser, one method per precedence level
//!
//! Lowest to highest: `Or`/`Xor`, `And`, `Not`, one relational operator,
//! `&`, `+`/`-`, `Mod`, `\`, `*`/`/`, unary sign, then a factor with an
//! optional chain of `.member` suffixes.

use crate::config::ParserPreferences;
use crate::evaluation::{FunctionCall, Member, Node, NodeKind, Operands};
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::tokens::{Keyword, SpannedToken, Token, TokenStream};
use crate::types::Value;

pub struct FormulaParser<'a> {
    tokens: TokenStream<'a>,
    depth: usize,
    max_depth: usize,
}

impl<'a> FormulaParser<'a> {
    pub fn new(input: &'a str, preferences: &ParserPreferences) -> Self {
        Self {
            tokens: TokenStream::from_source(input),
            depth: 0,
            max_depth: preferences.effective_max_depth(),
        }
    }

    /// Parse one complete expression followed by end of input
    pub fn parse(&mut self) -> SyntaxResult<Node> {
        let node = self.parse_expression()?;
        let next = self.tokens.lookahead(0)?;
        if !next.value.is_eof() {
            return Err(SyntaxError::expecting_operator(&next.value, next.span.start()));
        }
        Ok(node)
    }

    fn peek(&mut self) -> SyntaxResult<&Token> {
        Ok(self.tokens.peek()?)
    }

    fn read(&mut self) -> SyntaxResult<SpannedToken> {
        Ok(self.tokens.read()?)
    }

    /// Full sub-expression; every nesting level passes through here
    fn parse_expression(&mut self) -> SyntaxResult<Node> {
        if self.depth >= self.max_depth {
            let offset = self.tokens.lookahead(0)?.span.start();
            return Err(SyntaxError::MaxRecursionDepth { offset });
        }
        self.depth += 1;
        let result = self.parse_or();
        self.depth -= 1;
        result
    }

    fn parse_or(&mut self) -> SyntaxResult<Node> {
        let mut left = self.parse_and()?;
        loop {
            let build: fn(Operands) -> NodeKind = match self.peek()? {
                Token::Keyword(Keyword::Or) => NodeKind::Or,
                Token::Keyword(Keyword::Xor) => NodeKind::Xor,
                _ => return Ok(left),
            };
            let operator = self.read()?;
            let right = self.parse_and()?;
            left = Node::new(build(Operands::new(left, right)), operator.span.start());
        }
    }

    fn parse_and(&mut self) -> SyntaxResult<Node> {
        let mut left = self.parse_not()?;
        while self.peek()?.is_keyword(Keyword::And) {
            let operator = self.read()?;
            let right = self.parse_not()?;
            left = Node::new(
                NodeKind::And(Operands::new(left, right)),
                operator.span.start(),
            );
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> SyntaxResult<Node> {
        if self.peek()?.is_keyword(Keyword::Not) {
            let operator = self.read()?;
            let operand = self.parse_comparison()?;
            return Ok(Node::new(
                NodeKind::Not(Box::new(operand)),
                operator.span.start(),
            ));
        }
        self.parse_comparison()
    }

    /// At most one relational operator; `a = b = c` is left to fail at the
    /// top level
    fn parse_comparison(&mut self) -> SyntaxResult<Node> {
        let left = self.parse_concat()?;
        let Some(operator) = self.peek()?.as_relational() else {
            return Ok(left);
        };
        let token = self.read()?;
        let right = self.parse_concat()?;
        Ok(Node::new(
            NodeKind::Comparison {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            },
            token.span.start(),
        ))
    }

    fn parse_concat(&mut self) -> SyntaxResult<Node> {
        let mut left = self.parse_sum()?;
        while matches!(self.peek()?, Token::Ampersand) {
            let operator = self.read()?;
            let right = self.parse_sum()?;
            left = Node::new(
                NodeKind::Concatenation(Operands::new(left, right)),
                operator.span.start(),
            );
        }
        Ok(left)
    }

    fn parse_sum(&mut self) -> SyntaxResult<Node> {
        let mut left = self.parse_mod()?;
        loop {
            let build: fn(Operands) -> NodeKind = match self.peek()? {
                Token::Plus => NodeKind::Addition,
                Token::Minus => NodeKind::Subtraction,
                _ => return Ok(left),
            };
            let operator = self.read()?;
            let right = self.parse_mod()?;
            left = Node::new(build(Operands::new(left, right)), operator.span.start());
        }
    }

    fn parse_mod(&mut self) -> SyntaxResult<Node> {
        let mut left = self.parse_integer_division()?;
        while self.peek()?.is_keyword(Keyword::Mod) {
            let operator = self.read()?;
            let right = self.parse_integer_division()?;
            left = Node::new(
                NodeKind::Mod(Operands::new(left, right)),
                operator.span.start(),
            );
        }
        Ok(left)
    }

    fn parse_integer_division(&mut self) -> SyntaxResult<Node> {
        let mut left = self.parse_term()?;
        while matches!(self.peek()?, Token::Backslash) {
            let operator = self.read()?;
            let right = self.parse_term()?;
            left = Node::new(
                NodeKind::IntegerDivision(Operands::new(left, right)),
                operator.span.start(),
            );
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> SyntaxResult<Node> {
        let mut left = self.parse_signed()?;
        loop {
            let build: fn(Operands) -> NodeKind = match self.peek()? {
                Token::Star => NodeKind::Multiplication,
                Token::Slash => NodeKind::Division,
                _ => return Ok(left),
            };
            let operator = self.read()?;
            let right = self.parse_signed()?;
            left = Node::new(build(Operands::new(left, right)), operator.span.start());
        }
    }

    fn parse_signed(&mut self) -> SyntaxResult<Node> {
        match self.peek()? {
            Token::Plus => {
                self.read()?;
                self.parse_factor_with_suffix()
            }
            Token::Minus => {
                let sign = self.read()?;
                let operand = self.parse_factor_with_suffix()?;
                Ok(Node::new(
                    NodeKind::Negation(Box::new(operand)),
                    sign.span.start(),
                ))
            }
            _ => self.parse_factor_with_suffix(),
        }
    }

    fn parse_factor_with_suffix(&mut self) -> SyntaxResult<Node> {
        let is_nothing = matches!(self.peek()?, Token::Nothing);
        let mut target = self.parse_factor()?;
        if is_nothing {
            return Ok(target);
        }
        while matches!(self.peek()?, Token::Dot) {
            let dot = self.read()?;
            let (name, arguments, _) = self.parse_name()?;
            let member = match arguments {
                Some(arguments) => Member::Method(FunctionCall::new(name, arguments)),
                None => Member::property(name),
            };
            target = Node::new(
                NodeKind::Dot {
                    target: Box::new(target),
                    member,
                },
                dot.span.start(),
            );
        }
        Ok(target)
    }

    fn parse_factor(&mut self) -> SyntaxResult<Node> {
        if self.peek()?.as_identifier().is_some() {
            return self.parse_identifier_or_function();
        }
        let token = self.read()?;
        let offset = token.span.start();
        let value = match token.value {
            Token::Integer(i) => Value::Integer(i),
            Token::Double(d) => Value::Double(d),
            Token::Text(text) => Value::Text(text),
            Token::Char(c) => Value::Char(c),
            Token::Boolean(b) => Value::Boolean(b),
            Token::Nothing => Value::Nothing,
            Token::LeftParen => {
                let inner = self.parse_expression()?;
                let close = self.read()?;
                if !matches!(close.value, Token::RightParen) {
                    return Err(SyntaxError::UnmatchedParenthesis {
                        offset: close.span.start(),
                    });
                }
                return Ok(inner);
            }
            Token::Eof => return Err(SyntaxError::UnexpectedEnd { offset }),
            other => return Err(SyntaxError::unexpected_token(other, offset)),
        };
        Ok(Node::constant(value, offset))
    }

    fn parse_identifier_or_function(&mut self) -> SyntaxResult<Node> {
        let (name, arguments, offset) = self.parse_name()?;
        Ok(match arguments {
            Some(arguments) => Node::function_call(name, arguments, offset),
            None => Node::identifier(name, offset),
        })
    }

    /// An identifier, with its argument list when one follows
    fn parse_name(&mut self) -> SyntaxResult<(String, Option<Vec<Node>>, usize)> {
        let token = self.read()?;
        let offset = token.span.start();
        let name = match token.value {
            Token::Identifier(name) => name,
            other => return Err(SyntaxError::expecting_identifier(other, offset)),
        };
        if matches!(self.peek()?, Token::LeftParen) {
            let arguments = self.parse_argument_list()?;
            return Ok((name, Some(arguments), offset));
        }
        Ok((name, None, offset))
    }

    fn parse_argument_list(&mut self) -> SyntaxResult<Vec<Node>> {
        self.read()?; // (
        let mut arguments = Vec::new();
        if matches!(self.peek()?, Token::RightParen) {
            self.read()?;
            return Ok(arguments);
        }
        loop {
            arguments.push(self.parse_expression()?);
            let token = self.read()?;
            match token.value {
                Token::RightParen => return Ok(arguments),
                Token::Comma => continue,
                other => {
                    return Err(SyntaxError::malformed_argument_list(
                        other,
                        token.span.start(),
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn parse(input: &str) -> SyntaxResult<Node> {
        FormulaParser::new(input, &ParserPreferences { max_depth: 64 }).parse()
    }

    fn shape(input: &str) -> String {
        parse(input).unwrap().to_string()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(shape("1 + 2 * 3"), "1 + (2 * 3)");
        assert_eq!(shape("1 * 2 + 3"), "(1 * 2) + 3");
        assert_eq!(shape("a Or b And c"), "a Or (b And c)");
        assert_eq!(shape("1 + 2 & 3"), "(1 + 2) & 3");
        assert_eq!(shape("7 Mod 4 \\ 2"), "7 Mod (4 \\ 2)");
        assert_eq!(shape("Not a = b"), "Not (a = b)");
        assert_eq!(shape("1 - 2 - 3"), "(1 - 2) - 3");
    }

    #[test]
    fn test_unary_sign() {
        assert_eq!(shape("+5"), "5");
        assert_eq!(shape("-5 * 2"), "(-5) * 2");
        assert_matches!(
            parse("- -5"),
            Err(SyntaxError::UnexpectedToken { offset: 2, .. })
        );
    }

    #[test]
    fn test_suffix_chains() {
        assert_eq!(shape("Now.AddDays(1).Year"), "Now.AddDays(1).Year");
        let tree = parse("a.b.c").unwrap();
        assert_eq!(tree.offset, 3);
        assert_matches!(
            parse("Nothing.x"),
            Err(SyntaxError::ExpectingOperator { offset: 7, .. })
        );
        // `.1` scans as a number, leaving two operands side by side
        assert_matches!(
            parse("a.1"),
            Err(SyntaxError::ExpectingOperator { offset: 1, .. })
        );
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(shape("f()"), "f()");
        assert_eq!(shape("Max(1, 2 + 3)"), "Max(1, 2 + 3)");
        assert_matches!(
            parse("f(1 2)"),
            Err(SyntaxError::MalformedArgumentList { offset: 4, .. })
        );
        assert_matches!(parse("f(1,"), Err(SyntaxError::UnexpectedEnd { offset: 4 }));
    }

    #[test]
    fn test_parse_failures() {
        assert_matches!(parse("1 +"), Err(SyntaxError::UnexpectedEnd { offset: 3 }));
        assert_matches!(
            parse("(1 + 2"),
            Err(SyntaxError::UnmatchedParenthesis { offset: 6 })
        );
        assert_matches!(
            parse("1 2"),
            Err(SyntaxError::ExpectingOperator { offset: 2, .. })
        );
        assert_matches!(
            parse("a = b = c"),
            Err(SyntaxError::ExpectingOperator { offset: 6, .. })
        );
        assert_matches!(parse(")"), Err(SyntaxError::UnexpectedToken { offset: 0, .. }));
        assert_matches!(parse(""), Err(SyntaxError::UnexpectedEnd { offset: 0 }));
        assert_matches!(parse("1 # 2"), Err(SyntaxError::Lexical(_)));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            parse("1 2").unwrap_err().to_string(),
            "Expecting operator but found 2"
        );
        assert_eq!(
            parse("1 +").unwrap_err().to_string(),
            "Formula ended unexpectedly"
        );
        assert_eq!(
            parse("a.(").unwrap_err().to_string(),
            "Expecting identifier, found ("
        );
    }

    #[test]
    fn test_depth_limit() {
        let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert!(parse(&shallow).is_ok());

        let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_matches!(parse(&deep), Err(SyntaxError::MaxRecursionDepth { .. }));

        let nested_calls = format!("{}1{}", "f(".repeat(100), ")".repeat(100));
        assert_matches!(
            parse(&nested_calls),
            Err(SyntaxError::MaxRecursionDepth { .. })
        );
    }

    #[test]
    fn test_offsets() {
        let tree = parse("  x + 1").unwrap();
        assert_eq!(tree.offset, 4);
        assert_eq!(tree.children()[0].offset, 2);
    }
}

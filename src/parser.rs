use thiserror::Error;

use crate::ast::{Expr, Literal};
use crate::token::{Token, TokenType};

/// How deep groupings and unary operators may nest before parsing gives up.
pub const MAX_NESTING_DEPTH: usize = 128;

#[derive(Debug, Error, PartialEq)]
pub enum ParserError {
    #[error("{} {message}", location(.token))]
    UnexpectedToken { token: Token, message: String },
    #[error("{} {message}", location(.token))]
    MissingExpectedToken { token: Token, message: String },
    #[error("{} Expression nests deeper than {limit} levels.", location(.token))]
    RecursionLimitExceeded { token: Token, limit: usize },
}

impl ParserError {
    pub fn token(&self) -> &Token {
        match self {
            ParserError::UnexpectedToken { token, .. }
            | ParserError::MissingExpectedToken { token, .. }
            | ParserError::RecursionLimitExceeded { token, .. } => token,
        }
    }
}

fn location(token: &Token) -> String {
    match token.r#type {
        TokenType::EOF => format!("[line {}] Error at end:", token.line),
        _ => format!("[line {}] Error at '{}':", token.line, token.lexeme),
    }
}

/// Recursive descent over the expression grammar, one method per precedence level:
///
/// ```text
/// expression → equality
/// equality   → comparison ( ( "!=" | "==" ) comparison )*
/// comparison → term ( ( ">" | ">=" | "<" | "<=" ) term )*
/// term       → factor ( ( "-" | "+" ) factor )*
/// factor     → unary ( ( "/" | "*" ) unary )*
/// unary      → ( "!" | "-" ) unary | primary
/// primary    → NUMBER | STRING | "true" | "false" | "nil" | "(" expression ")"
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Parser {
        if tokens.last().map(|t| t.r#type) != Some(TokenType::EOF) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenType::EOF, "", None, line));
        }
        Parser {
            tokens,
            current: 0,
            depth: 0,
            max_depth: MAX_NESTING_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Parser {
        self.max_depth = max_depth;
        self
    }

    /// Parse a single expression spanning the whole input.
    pub fn parse(&mut self) -> Result<Expr, ParserError> {
        let expr = self.expression()?;
        if !self.is_at_end() {
            return Err(ParserError::UnexpectedToken {
                token: self.peek().clone(),
                message: "Expect end of expression.".to_string(),
            });
        }
        Ok(expr)
    }

    /// Parse `;`-separated expressions (the last `;` is optional).
    /// After an error the parser skips to the next statement boundary and carries on, so every
    /// error in the input is reported.
    pub fn parse_program(&mut self) -> Result<Vec<Expr>, Vec<ParserError>> {
        let mut expressions = vec![];
        let mut errors = vec![];
        while !self.is_at_end() {
            match self.expression_statement() {
                Ok(expr) => expressions.push(expr),
                Err(error) => {
                    errors.push(error);
                    self.synchronize();
                }
            }
        }
        if errors.is_empty() {
            Ok(expressions)
        } else {
            Err(errors)
        }
    }

    fn expression_statement(&mut self) -> Result<Expr, ParserError> {
        let expr = self.expression()?;
        if !self.match_current(&[TokenType::Semicolon]) && !self.is_at_end() {
            return Err(ParserError::MissingExpectedToken {
                token: self.peek().clone(),
                message: "Expect ';' after expression.".to_string(),
            });
        }
        Ok(expr)
    }

    fn expression(&mut self) -> Result<Expr, ParserError> {
        self.equality()
    }

    fn equality(&mut self) -> Result<Expr, ParserError> {
        let mut expr = self.comparison()?;
        while self.match_current(&[TokenType::BangEqual, TokenType::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParserError> {
        let mut expr = self.term()?;
        while self.match_current(&[
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Less,
            TokenType::LessEqual,
        ]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParserError> {
        let mut expr = self.factor()?;
        while self.match_current(&[TokenType::Plus, TokenType::Minus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ParserError> {
        let mut expr = self.unary()?;
        while self.match_current(&[TokenType::Slash, TokenType::Star]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParserError> {
        if self.match_current(&[TokenType::Bang, TokenType::Minus]) {
            let operator = self.previous().clone();
            let right = self.nested(Self::unary)?;
            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParserError> {
        if self.match_current(&[TokenType::False]) {
            return Ok(Expr::Literal(Literal::False));
        }
        if self.match_current(&[TokenType::True]) {
            return Ok(Expr::Literal(Literal::True));
        }
        if self.match_current(&[TokenType::Nil]) {
            return Ok(Expr::Literal(Literal::Nil));
        }
        if self.match_current(&[TokenType::Number, TokenType::String]) {
            let token = self.previous().clone();
            return match token.literal.clone() {
                Some(literal) => Ok(Expr::Literal(literal)),
                None => Err(ParserError::UnexpectedToken {
                    token,
                    message: "Expect literal value.".to_string(),
                }),
            };
        }
        if self.match_current(&[TokenType::LeftParen]) {
            return self.nested(|parser| {
                let expr = parser.expression()?;
                parser.consume(TokenType::RightParen, "Expect ')' after expression.")?;
                Ok(Expr::Grouping(Box::new(expr)))
            });
        }
        Err(ParserError::UnexpectedToken {
            token: self.peek().clone(),
            message: "Expect expression.".to_string(),
        })
    }

    /// Run `rule` one nesting level deeper, failing once `max_depth` is reached.
    fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Parser) -> Result<T, ParserError>,
    ) -> Result<T, ParserError> {
        if self.depth >= self.max_depth {
            return Err(ParserError::RecursionLimitExceeded {
                token: self.peek().clone(),
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    /// Discard tokens until just past a `;` or right before a keyword that starts a statement.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().r#type == TokenType::Semicolon {
                return;
            }
            match self.peek().r#type {
                TokenType::Class
                | TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// advances only if the current token is one of `token_types`.
    fn match_current(&mut self, token_types: &[TokenType]) -> bool {
        if token_types.iter().any(|&t| self.check(t)) {
            self.advance();
            return true;
        }
        false
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<&Token, ParserError> {
        if self.check(token_type) {
            return Ok(self.advance());
        }
        Err(ParserError::MissingExpectedToken {
            token: self.peek().clone(),
            message: message.to_string(),
        })
    }

    fn check(&self, token_type: TokenType) -> bool {
        !self.is_at_end() && self.peek().r#type == token_type
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().r#type == TokenType::EOF
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        // before the first advance there is no previous token, fall back to the current one.
        &self.tokens[self.current.saturating_sub(1)]
    }
}

use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

use crate::ast::Literal;
use crate::token::{Token, TokenType};

static KEYWORDS: phf::Map<&'static str, TokenType> = phf::phf_map! {
    "and" => TokenType::And,
    "class" => TokenType::Class,
    "else" => TokenType::Else,
    "false" => TokenType::False,
    "fun" => TokenType::Fun,
    "for" => TokenType::For,
    "if" => TokenType::If,
    "nil" => TokenType::Nil,
    "or" => TokenType::Or,
    "print" => TokenType::Print,
    "return" => TokenType::Return,
    "super" => TokenType::Super,
    "this" => TokenType::This,
    "true" => TokenType::True,
    "var" => TokenType::Var,
    "while" => TokenType::While,
};

/// public interface for tokenizing.
/// Lexical errors go to `error_reporter` and never stop the scan: the returned tokens always end
/// with a single EOF token.
pub fn tokenize(source: &str, error_reporter: impl FnMut(ScanningError)) -> Vec<Token> {
    let mut scanner = Scanner::new(source, error_reporter);
    scanner.scan_tokens();
    scanner.tokens
}

struct Scanner<'a, F: FnMut(ScanningError)> {
    source: &'a str,
    char_iter: Peekable<Chars<'a>>,
    tokens: Vec<Token>,
    error_reporter: F,

    // byte offsets into source
    current_lexeme_start: usize,
    current: usize,
    line: usize,
}

#[derive(Debug, Error, PartialEq)]
pub enum ScanningError {
    #[error("Unexpected character.")]
    UnexpectedCharacter { line: usize, character: char },
    #[error("Unterminated string.")]
    UnterminatedString { line: usize, string_start: String },
    #[error("Unterminated block comment.")]
    UnterminatedBlockComment { line: usize, comment_start: String },
    #[error("Invalid number '{lexeme}'.")]
    InvalidNumber { line: usize, lexeme: String },
}

impl ScanningError {
    /// line the offending lexeme started on.
    pub fn line(&self) -> usize {
        match self {
            ScanningError::UnexpectedCharacter { line, .. }
            | ScanningError::UnterminatedString { line, .. }
            | ScanningError::UnterminatedBlockComment { line, .. }
            | ScanningError::InvalidNumber { line, .. } => *line,
        }
    }
}

impl<'a, F: FnMut(ScanningError)> Scanner<'a, F> {
    fn new(source: &'a str, error_reporter: F) -> Scanner<'a, F> {
        Scanner {
            source,
            char_iter: source.chars().peekable(),
            tokens: vec![],
            error_reporter,
            current_lexeme_start: 0,
            current: 0,
            line: 1,
        }
    }

    fn scan_tokens(&mut self) {
        while !self.is_at_end() {
            if let Err(scanning_error) = self.scan_token() {
                (self.error_reporter)(scanning_error)
            }
        }
        self.tokens.push(Token::new(TokenType::EOF, "", None, self.line));
    }

    fn scan_token(&mut self) -> Result<(), ScanningError> {
        self.current_lexeme_start = self.current;
        let Some(c) = self.advance() else {
            return Ok(());
        };
        let maybe_token_type = match c {
            '(' => Some(TokenType::LeftParen),
            ')' => Some(TokenType::RightParen),
            '{' => Some(TokenType::LeftBrace),
            '}' => Some(TokenType::RightBrace),
            ',' => Some(TokenType::Comma),
            '.' => Some(TokenType::Dot),
            '-' => Some(TokenType::Minus),
            '+' => Some(TokenType::Plus),
            ';' => Some(TokenType::Semicolon),
            '*' => Some(TokenType::Star),
            '!' => match self.match_one('=') {
                true => Some(TokenType::BangEqual),
                false => Some(TokenType::Bang),
            },
            '=' => match self.match_one('=') {
                true => Some(TokenType::EqualEqual),
                false => Some(TokenType::Equal),
            },
            '<' => match self.match_one('=') {
                true => Some(TokenType::LessEqual),
                false => Some(TokenType::Less),
            },
            '>' => match self.match_one('=') {
                true => Some(TokenType::GreaterEqual),
                false => Some(TokenType::Greater),
            },
            '/' => {
                if self.match_one('*') {
                    self.consume_block_comment()?;
                    None
                } else if self.match_one('/') {
                    while self.peek_one().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                    None
                } else {
                    Some(TokenType::Slash)
                }
            }
            ' ' | '\r' | '\t' => None,
            '\n' => {
                self.line += 1;
                None
            }
            '"' => {
                let literal = self.consume_if_match_string()?;
                self.add_literal_token(TokenType::String, literal);
                None
            }
            c if is_digit(&c) => {
                let literal = self.consume_if_match_number()?;
                self.add_literal_token(TokenType::Number, literal);
                None
            }
            c if is_alpha(&c) => Some(self.consume_if_match_identifier()),
            _ => {
                return Err(ScanningError::UnexpectedCharacter {
                    line: self.line,
                    character: c,
                });
            }
        };

        if let Some(token_type) = maybe_token_type {
            self.add_token(token_type);
        }
        Ok(())
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn match_one(&mut self, expected: char) -> bool {
        if self.peek_one() != Some(expected) {
            return false;
        }
        self.advance();
        true
    }

    fn advance(&mut self) -> Option<char> {
        let current_char = self.char_iter.next()?;
        self.current += current_char.len_utf8();
        Some(current_char)
    }

    fn add_token(&mut self, token_type: TokenType) {
        self.push_token(token_type, None);
    }

    fn add_literal_token(&mut self, token_type: TokenType, literal: Literal) {
        self.push_token(token_type, Some(literal));
    }

    fn push_token(&mut self, token_type: TokenType, literal: Option<Literal>) {
        // offsets always sit on char boundaries since they only move by len_utf8.
        let text = &self.source[self.current_lexeme_start..self.current];
        self.tokens.push(Token::new(token_type, text, literal, self.line));
    }

    /// like advance but does not consume the character. 1 lookahead.
    fn peek_one(&mut self) -> Option<char> {
        self.char_iter.peek().copied()
    }

    /// 2 lookahead
    fn peek_two(&self) -> Option<char> {
        self.source[self.current..].chars().nth(1)
    }

    fn consume_if_match_string(&mut self) -> Result<Literal, ScanningError> {
        let start_line = self.line;
        while let Some(c) = self.peek_one() {
            if c == '"' {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.peek_one().is_none() {
            return Err(ScanningError::UnterminatedString {
                line: start_line,
                string_start: self.source[self.current_lexeme_start..self.current].to_string(),
            });
        }

        // consume closing quote
        self.advance();

        let value = &self.source[self.current_lexeme_start + 1..self.current - 1];
        Ok(Literal::String(value.to_string()))
    }

    fn consume_if_match_number(&mut self) -> Result<Literal, ScanningError> {
        while self.peek_one().is_some_and(|c| is_digit(&c)) {
            self.advance();
        }

        // "123." is a number followed by a dot.
        if self.peek_one() == Some('.') && self.peek_two().is_some_and(|c| is_digit(&c)) {
            self.advance();
            while self.peek_one().is_some_and(|c| is_digit(&c)) {
                self.advance();
            }
        }

        let lexeme = &self.source[self.current_lexeme_start..self.current];
        lexeme
            .parse::<f64>()
            .map(Literal::Number)
            .map_err(|_| ScanningError::InvalidNumber {
                line: self.line,
                lexeme: lexeme.to_string(),
            })
    }

    fn consume_if_match_identifier(&mut self) -> TokenType {
        while self.peek_one().is_some_and(|c| is_alphanumeric(&c)) {
            self.advance();
        }

        let lexeme = &self.source[self.current_lexeme_start..self.current];
        KEYWORDS
            .get(lexeme)
            .copied()
            .unwrap_or(TokenType::Identifier)
    }

    /// Block comments nest: every `/*` opens a level and every `*/` closes one.
    /// Called with the opening `/*` already consumed.
    fn consume_block_comment(&mut self) -> Result<(), ScanningError> {
        let start_line = self.line;
        let mut level: usize = 1;
        while level > 0 {
            match (self.peek_one(), self.peek_two()) {
                (None, _) => {
                    return Err(ScanningError::UnterminatedBlockComment {
                        line: start_line,
                        comment_start: self.source[self.current_lexeme_start..self.current]
                            .to_string(),
                    });
                }
                (Some('/'), Some('*')) => {
                    level += 1;
                    self.advance();
                    self.advance();
                }
                (Some('*'), Some('/')) => {
                    level -= 1;
                    self.advance();
                    self.advance();
                }
                (Some(c), _) => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    self.advance();
                }
            }
        }
        Ok(())
    }
}

fn is_digit(c: &char) -> bool {
    c.is_ascii_digit()
}
fn is_alpha(c: &char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}
fn is_alphanumeric(c: &char) -> bool {
    is_digit(c) || is_alpha(c)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::ast::Literal;
    use crate::scanner::{tokenize, Scanner, ScanningError};
    use crate::test_helpers::{token_types, tokenize_with_errors};
    use crate::token::{Token, TokenType};

    #[test]
    fn test_scanning_regular_tokens() {
        let mut scanner = Scanner::new("{,.}", |_err: ScanningError| ());
        scanner.scan_tokens();
        assert_eq!(
            scanner.tokens,
            vec![
                Token::new(TokenType::LeftBrace, "{", None, 1),
                Token::new(TokenType::Comma, ",", None, 1),
                Token::new(TokenType::Dot, ".", None, 1),
                Token::new(TokenType::RightBrace, "}", None, 1),
                Token::new(TokenType::EOF, "", None, 1),
            ]
        )
    }

    #[test]
    fn test_scanning_multiple_character_operator() {
        let mut scanner = Scanner::new(">=", |_err: ScanningError| ());
        scanner.scan_tokens();
        assert_eq!(
            scanner.tokens,
            vec![
                Token::new(TokenType::GreaterEqual, ">=", None, 1),
                Token::new(TokenType::EOF, "", None, 1),
            ]
        )
    }

    #[test]
    fn test_maximal_munch() {
        assert_eq!(
            token_types("!= ! = == <= < >= > ="),
            vec![
                TokenType::BangEqual,
                TokenType::Bang,
                TokenType::Equal,
                TokenType::EqualEqual,
                TokenType::LessEqual,
                TokenType::Less,
                TokenType::GreaterEqual,
                TokenType::Greater,
                TokenType::Equal,
                TokenType::EOF,
            ]
        );
        // no whitespace needed between operators
        assert_eq!(
            token_types("!==="),
            vec![TokenType::BangEqual, TokenType::EqualEqual, TokenType::EOF]
        );
    }

    #[test]
    fn test_scanner_handles_strings() {
        let mut scanner = Scanner::new("\"hello\"", |err: ScanningError| panic!("{err:?}"));
        scanner.scan_tokens();
        assert_eq!(scanner.tokens.len(), 2);
        assert_eq!(
            scanner.tokens[0],
            Token::new(
                TokenType::String,
                "\"hello\"",
                Some(Literal::String("hello".to_string())),
                1
            )
        );
    }

    #[test]
    fn test_string_multiple_lines() {
        let tokens = tokenize("var a = \"a string \n with newlines in it\"", |err| {
            panic!("{err:?}")
        });
        assert_eq!(tokens.len(), 5);
        assert_eq!(
            tokens[3],
            Token::new(
                TokenType::String,
                "\"a string \n with newlines in it\"",
                Some(Literal::String("a string \n with newlines in it".to_string())),
                2
            )
        );
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = tokenize_with_errors("\"abc");
        assert_eq!(tokens, vec![Token::new(TokenType::EOF, "", None, 1)]);
        assert_eq!(
            errors,
            vec![ScanningError::UnterminatedString {
                line: 1,
                string_start: "\"abc".to_string()
            }]
        );
    }

    #[test]
    fn test_unterminated_string_reports_opening_line() {
        let (tokens, errors) = tokenize_with_errors("1\n\"abc\ndef\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line(), 2);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1], Token::new(TokenType::EOF, "", None, 4));
    }

    #[test]
    fn test_scanner_handles_numbers() {
        let mut scanner = Scanner::new("1.2", |err: ScanningError| panic!("{err:?}"));
        scanner.scan_tokens();
        assert_eq!(scanner.tokens.len(), 2);
        assert_eq!(
            scanner.tokens[0],
            Token::new(TokenType::Number, "1.2", Some(Literal::Number(1.2)), 1)
        );
    }

    #[test]
    fn test_scanner_handles_numbers_2() {
        let mut scanner = Scanner::new("1.some", |err: ScanningError| panic!("{err:?}"));
        scanner.scan_tokens();
        assert_eq!(scanner.tokens.len(), 4);
        assert_eq!(
            scanner.tokens[0],
            Token::new(TokenType::Number, "1", Some(Literal::Number(1.0)), 1)
        );
        assert_eq!(scanner.tokens[1], Token::new(TokenType::Dot, ".", None, 1));
        assert_eq!(
            scanner.tokens[2],
            Token::new(TokenType::Identifier, "some", None, 1)
        );
    }

    #[test]
    fn test_trailing_dot_is_not_part_of_number() {
        let tokens = tokenize("123.", |err| panic!("{err:?}"));
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenType::Number, "123", Some(Literal::Number(123.0)), 1),
                Token::new(TokenType::Dot, ".", None, 1),
                Token::new(TokenType::EOF, "", None, 1),
            ]
        );
    }

    #[test]
    fn test_pretending_to_handle_non_ascii() {
        let tokens = tokenize("// 🤩 this is all a _façade_", |err| panic!("{err:?}"));
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_line_comment_stops_at_newline() {
        let tokens = tokenize("// comment\n+", |err| panic!("{err:?}"));
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenType::Plus, "+", None, 2),
                Token::new(TokenType::EOF, "", None, 2),
            ]
        );
    }

    #[test]
    fn test_block_comments() {
        let tokens = tokenize("/* here's a block comment \n with newlines in it */", |err| {
            panic!("{err:?}")
        });
        assert_eq!(tokens, vec![Token::new(TokenType::EOF, "", None, 2)]);
    }

    #[test]
    fn test_nested_block_comments() {
        let tokens = tokenize("1 /* outer /* inner \n /* deeper */ */ still outer */ 2", |err| {
            panic!("{err:?}")
        });
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenType::Number, "1", Some(Literal::Number(1.0)), 1),
                Token::new(TokenType::Number, "2", Some(Literal::Number(2.0)), 2),
                Token::new(TokenType::EOF, "", None, 2),
            ]
        );
    }

    #[test]
    fn test_unbalanced_block_comment() {
        let (tokens, errors) = tokenize_with_errors("+\n/* a /* b */\n c");
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenType::Plus, "+", None, 1),
                Token::new(TokenType::EOF, "", None, 3),
            ]
        );
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ScanningError::UnterminatedBlockComment { line: 2, .. }
        ));
    }

    #[test]
    fn test_slash_is_division_when_not_a_comment() {
        assert_eq!(
            token_types("4 / 2"),
            vec![
                TokenType::Number,
                TokenType::Slash,
                TokenType::Number,
                TokenType::EOF
            ]
        );
    }

    #[test]
    fn test_identifier_with_digit() {
        let tokens = tokenize("a_0", |err| panic!("{err:?}"));
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenType::Identifier, "a_0", None, 1),
                Token::new(TokenType::EOF, "", None, 1),
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let tokens = tokenize("classic", |err| panic!("{err:?}"));
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenType::Identifier, "classic", None, 1),
                Token::new(TokenType::EOF, "", None, 1),
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            token_types("and class else false fun for if nil or print return super this true var while _x"),
            vec![
                TokenType::And,
                TokenType::Class,
                TokenType::Else,
                TokenType::False,
                TokenType::Fun,
                TokenType::For,
                TokenType::If,
                TokenType::Nil,
                TokenType::Or,
                TokenType::Print,
                TokenType::Return,
                TokenType::Super,
                TokenType::This,
                TokenType::True,
                TokenType::Var,
                TokenType::While,
                TokenType::Identifier,
                TokenType::EOF,
            ]
        );
    }

    #[test]
    fn test_unexpected_characters_do_not_stop_the_scan() {
        let (tokens, errors) = tokenize_with_errors("1 @ 2\n# é");
        assert_eq!(
            tokens.iter().map(|t| t.r#type).collect::<Vec<_>>(),
            vec![TokenType::Number, TokenType::Number, TokenType::EOF]
        );
        assert_eq!(
            errors,
            vec![
                ScanningError::UnexpectedCharacter {
                    line: 1,
                    character: '@'
                },
                ScanningError::UnexpectedCharacter {
                    line: 2,
                    character: '#'
                },
                ScanningError::UnexpectedCharacter {
                    line: 2,
                    character: 'é'
                },
            ]
        );
    }

    #[test]
    fn test_always_ends_with_a_single_eof() {
        for source in ["", "@@@", "\"open", "/* open", "1 + ", "\n\n\n"] {
            let (tokens, _errors) = tokenize_with_errors(source);
            let eof_count = tokens.iter().filter(|t| t.r#type == TokenType::EOF).count();
            assert_eq!(eof_count, 1, "source: {source:?}");
            assert_eq!(tokens.last().map(|t| t.r#type), Some(TokenType::EOF));
        }
    }
}

use crate::ast::Expr;
use crate::parser::{Parser, ParserError};
use crate::scanner::{tokenize, ScanningError};
use crate::token::{Token, TokenType};

#[allow(dead_code)]
pub fn parse_expr(code: &str) -> Result<Expr, ParserError> {
    let tokens = tokenize(code, |error| panic!("{}", error));
    let mut parser = Parser::new(tokens);
    parser.parse()
}

#[allow(dead_code)]
pub fn parse_program(code: &str) -> Result<Vec<Expr>, Vec<ParserError>> {
    let tokens = tokenize(code, |error| panic!("{}", error));
    let mut parser = Parser::new(tokens);
    parser.parse_program()
}

/// scan without failing on lexical errors, collecting them instead.
#[allow(dead_code)]
pub fn tokenize_with_errors(code: &str) -> (Vec<Token>, Vec<ScanningError>) {
    let mut errors = vec![];
    let tokens = tokenize(code, |error| errors.push(error));
    (tokens, errors)
}

#[allow(dead_code)]
pub fn token_types(code: &str) -> Vec<TokenType> {
    tokenize(code, |error| panic!("{}", error))
        .into_iter()
        .map(|token| token.r#type)
        .collect()
}

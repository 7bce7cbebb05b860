//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords and identifiers
//! - Numeric literals (integers and floats)
//! - Operators and punctuation
//! - Comments
//! - Error cases

use super::{lexer::tokenize, tokens::TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.rem".to_string()))
        .unwrap()
        .iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    let source = "var const fn def extern return if else while do break continue class static new self parent nil true false using when default assert echo".to_string();
    let tokens = tokenize(source, Some("test.rem".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Var);
    assert_eq!(tokens[1].kind, TokenKind::Const);
    assert_eq!(tokens[2].kind, TokenKind::Fn);
    assert_eq!(tokens[3].kind, TokenKind::Def);
    assert_eq!(tokens[4].kind, TokenKind::Extern);
    assert_eq!(tokens[5].kind, TokenKind::Return);
    assert_eq!(tokens[6].kind, TokenKind::If);
    assert_eq!(tokens[7].kind, TokenKind::Else);
    assert_eq!(tokens[8].kind, TokenKind::While);
    assert_eq!(tokens[9].kind, TokenKind::Do);
    assert_eq!(tokens[10].kind, TokenKind::Break);
    assert_eq!(tokens[11].kind, TokenKind::Continue);
    assert_eq!(tokens[12].kind, TokenKind::Class);
    assert_eq!(tokens[13].kind, TokenKind::Static);
    assert_eq!(tokens[14].kind, TokenKind::New);
    assert_eq!(tokens[15].kind, TokenKind::SelfKw);
    assert_eq!(tokens[16].kind, TokenKind::Parent);
    assert_eq!(tokens[17].kind, TokenKind::Nil);
    assert_eq!(tokens[18].kind, TokenKind::True);
    assert_eq!(tokens[19].kind, TokenKind::False);
    assert_eq!(tokens[20].kind, TokenKind::Using);
    assert_eq!(tokens[21].kind, TokenKind::When);
    assert_eq!(tokens[22].kind, TokenKind::Default);
    assert_eq!(tokens[23].kind, TokenKind::Assert);
    assert_eq!(tokens[24].kind, TokenKind::Echo);
    assert_eq!(tokens[25].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo bar baz_123 _underscore CamelCase variable".to_string();
    let tokens = tokenize(source, Some("test.rem".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[1].value, "bar");
    assert_eq!(tokens[2].value, "baz_123");
    assert_eq!(tokens[3].value, "_underscore");
    assert_eq!(tokens[4].value, "CamelCase");
    // Keywords only match whole words.
    assert_eq!(tokens[5].kind, TokenKind::Identifier);
    assert_eq!(tokens[5].value, "variable");
    assert_eq!(tokens[6].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_numbers() {
    let source = "42 3.14 0 100.5".to_string();
    let tokens = tokenize(source, Some("test.rem".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].value, "0");
    assert_eq!(tokens[3].value, "100.5");
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_decorator() {
    let tokens = tokenize("@new(x)".to_string(), None).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Decorator);
    assert_eq!(tokens[0].value, "@new");
    assert_eq!(tokens[1].kind, TokenKind::OpenParen);
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("+ - * / % == != < > <= >= = && || and or"),
        vec![
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LessEquals,
            TokenKind::GreaterEquals,
            TokenKind::Assignment,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_bitwise_operators() {
    assert_eq!(
        kinds("& | ^ ~ << >>"),
        vec![
            TokenKind::Ampersand,
            TokenKind::Pipe,
            TokenKind::Caret,
            TokenKind::Tilde,
            TokenKind::ShiftLeft,
            TokenKind::ShiftRight,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_punctuation() {
    assert_eq!(
        kinds("( ) { } [ ] . , ; : -> ... ?"),
        vec![
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::Dot,
            TokenKind::Comma,
            TokenKind::Semicolon,
            TokenKind::Colon,
            TokenKind::Arrow,
            TokenKind::Ellipsis,
            TokenKind::Question,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_compound_operators() {
    assert_eq!(
        kinds("++ -- += -= *= /= %="),
        vec![
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
            TokenKind::PlusEquals,
            TokenKind::MinusEquals,
            TokenKind::StarEquals,
            TokenKind::SlashEquals,
            TokenKind::PercentEquals,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_without_whitespace() {
    assert_eq!(
        kinds("a.b<<=c"),
        vec![
            TokenKind::Identifier,
            TokenKind::Dot,
            TokenKind::Identifier,
            TokenKind::ShiftLeft,
            TokenKind::Assignment,
            TokenKind::Identifier,
            TokenKind::EOF,
        ]
    );
    assert_eq!(
        kinds("x++-1"),
        vec![
            TokenKind::Identifier,
            TokenKind::PlusPlus,
            TokenKind::Dash,
            TokenKind::Number,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_comments() {
    let source = "var x = 5 // trailing comment\n# line comment\nvar y = 10".to_string();
    let tokens = tokenize(source, Some("test.rem".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Var);
    assert_eq!(tokens[1].value, "x");
    assert_eq!(tokens[2].kind, TokenKind::Assignment);
    assert_eq!(tokens[3].value, "5");
    assert_eq!(tokens[4].kind, TokenKind::Var);
    assert_eq!(tokens[5].value, "y");
    assert_eq!(tokens[6].kind, TokenKind::Assignment);
    assert_eq!(tokens[7].value, "10");
    assert_eq!(tokens[8].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_function_declaration() {
    let source = "fn add(a: i32, b: i32) -> i32 { return a + b; }".to_string();
    let tokens = tokenize(source, Some("test.rem".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Fn);
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].value, "add");
    assert_eq!(tokens[2].kind, TokenKind::OpenParen);
    assert_eq!(tokens[3].value, "a");
    assert_eq!(tokens[4].kind, TokenKind::Colon);
    assert_eq!(tokens[5].value, "i32");
}

#[test]
fn test_token_spans() {
    let tokens = tokenize("var abc = 1".to_string(), Some("test.rem".to_string())).unwrap();

    assert_eq!(tokens[1].span.start.0, 4);
    assert_eq!(tokens[1].span.end.0, 7);
    assert_eq!(*tokens[1].span.start.1, "test.rem");
    assert_eq!(tokens[4].kind, TokenKind::EOF);
    assert_eq!(tokens[4].span.start.0, 11);
}

#[test]
fn test_tokenize_unrecognized_token() {
    let result = tokenize("var x = $".to_string(), Some("test.rem".to_string()));

    let error = result.unwrap_err();
    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().0, 8);
}

#[test]
fn test_tokenize_non_ascii_is_rejected() {
    let result = tokenize("var é = 1".to_string(), None);

    assert!(result.is_err());
}

#[test]
fn test_tokenize_empty_source() {
    assert_eq!(kinds(""), vec![TokenKind::EOF]);
    assert_eq!(kinds("   \n\t "), vec![TokenKind::EOF]);
}

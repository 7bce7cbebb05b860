//! Type parsing implementation.
//!
//! This module handles parsing of type annotations and type expressions.
//! It supports:
//!
//! - Named types (builtins and classes)
//! - Array types, written `[]T`
//! - Map types, written `[K]V`
//!
//! Every type form starts with a distinct token, so only NUD handlers are
//! needed; nesting falls out of the handlers recursing into `parse_type`.

use std::collections::HashMap;

use crate::{
    ast::types::{TypeExpr, TypeExprKind},
    errors::errors::Error,
    lexer::tokens::TokenKind,
    Span,
};

use super::parser::Parser;

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<TypeExpr, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Initializes the type parsing lookup tables.
///
/// # Arguments
///
/// * `parser` - Mutable reference to the parser to initialize
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::OpenBracket, parse_bracket_type);
}

/// Parses a type expression starting at the current token.
pub fn parse_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    let token_kind = parser.current_token_kind();
    match parser.get_type_nud_lookup().get(&token_kind) {
        Some(nud_fn) => {
            let nud_fn = *nud_fn;
            nud_fn(parser)
        }
        None => Err(parser.unexpected_detailed("expected a type")),
    }
}

/// Whether the current token can start a type expression.
pub fn starts_type(parser: &Parser) -> bool {
    parser
        .get_type_nud_lookup()
        .contains_key(&parser.current_token_kind())
}

/// A `void` type standing in for an omitted annotation.
pub fn void_type(parser: &mut Parser, span: Span) -> TypeExpr {
    TypeExpr {
        id: parser.advance_id(),
        span,
        kind: TypeExprKind::Void,
    }
}

pub fn parse_symbol_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    Ok(TypeExpr {
        id: parser.advance_id(),
        span: token.span,
        kind: TypeExprKind::Id(token.value),
    })
}

pub fn parse_bracket_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    let start = parser.expect(TokenKind::OpenBracket)?.span.start;

    let key = if parser.current_token_kind() == TokenKind::CloseBracket {
        None
    } else {
        Some(parse_type(parser)?)
    };
    parser.expect(TokenKind::CloseBracket)?;

    let element = parse_type(parser)?;
    let kind = match key {
        None => TypeExprKind::Array(Box::new(element)),
        Some(key) => TypeExprKind::Map {
            key: Box::new(key),
            value: Box::new(element),
        },
    };

    Ok(TypeExpr {
        id: parser.advance_id(),
        span: parser.span_from(start),
        kind,
    })
}

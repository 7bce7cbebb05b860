//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct and parsing functions.
//! The parser uses a Pratt parser approach with NUD/LED handlers for
//! expression parsing and specialized functions for statement parsing.
//!
//! It maintains lookup tables for:
//! - Statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix and postfix expressions
//! - Binding powers for operator precedence
//! - Type parsing handlers

use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{
        ast::NodeId,
        expressions::{Expr, ExprKind},
        statements::BlockStmt,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::parse_stmt,
    types::{create_token_type_lookups, TypeNUDHandler, TypeNUDLookup},
};

/// The main parser structure that maintains parsing state.
///
/// This struct holds the token stream and maintains lookup tables for
/// parsing statements, expressions, and types. It tracks the current
/// position in the token stream and provides methods for token consumption.
pub struct Parser {
    /// The list of tokens to parse, always terminated by EOF
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// The name of the source file being parsed
    file: Rc<String>,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for infix binding powers (precedence)
    binding_power_lookup: BPLookup,
    /// Lookup table for type null denotation handlers
    type_nud_lookup: TypeNUDLookup,
    /// Counter for generating unique node ids
    current_id: u32,
}

impl Parser {
    /// Creates a new Parser instance.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Vector of tokens to parse
    /// * `file` - Reference-counted string containing the source file name
    pub fn new(mut tokens: Vec<Token>, file: Rc<String>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let end = tokens
                .last()
                .map(|token| token.span.end.clone())
                .unwrap_or_else(|| Position(0, Rc::clone(&file)));
            tokens.push(Token {
                kind: TokenKind::EOF,
                value: String::from("EOF"),
                span: Span {
                    start: end.clone(),
                    end,
                },
            });
        }

        Parser {
            tokens,
            pos: 0,
            file,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
            current_id: NodeId::FIRST_PARSED,
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    /// Returns the kind of the token after the current one.
    pub fn peek_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::EOF)
    }

    /// Advances to the next token and returns the previous token.
    ///
    /// The parser never moves past the EOF token.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos;
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        let token = self.current_token();
        if token.kind != expected_kind {
            return Err(error.unwrap_or_else(|| self.unexpected()));
        }

        Ok(self.advance().clone())
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Consumes the current token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current_token_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skips optional statement terminators.
    pub fn skip_semicolons(&mut self) {
        while self.eat(TokenKind::Semicolon) {}
    }

    /// An `UnexpectedToken` error for the current token.
    pub fn unexpected(&self) -> Error {
        let token = self.current_token();
        let error = if token.kind == TokenKind::EOF {
            ErrorImpl::UnexpectedEndOfFile
        } else {
            ErrorImpl::UnexpectedToken {
                token: token.value.clone(),
            }
        };
        Error::new(error, self.get_position())
    }

    /// An `UnexpectedTokenDetailed` error for the current token.
    pub fn unexpected_detailed(&self, message: &str) -> Error {
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: self.current_token().value.clone(),
                message: String::from(message),
            },
            self.get_position(),
        )
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// Returns a reference to the statement lookup table.
    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Returns a reference to the binding power lookup table.
    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    /// Returns a reference to the type NUD lookup table.
    pub fn get_type_nud_lookup(&self) -> &TypeNUDLookup {
        &self.type_nud_lookup
    }

    /// Registers a left denotation (infix) handler for a token.
    ///
    /// # Arguments
    ///
    /// * `kind` - The token kind to register
    /// * `binding_power` - The precedence/binding power for this operator
    /// * `led_fn` - The handler function for this infix operator
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    ///
    /// Prefix handlers leave the binding power table alone, so a token may be
    /// both a prefix and an infix operator (`-`, `(`, `[`).
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Registers a type null denotation handler.
    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }

    /// Hands out the next node id.
    pub fn advance_id(&mut self) -> NodeId {
        let id = self.current_id;
        self.current_id += 1;
        NodeId(id)
    }

    /// Returns the start of the current token.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }

    /// Returns the end of the last consumed token.
    pub fn previous_end(&self) -> Position {
        match self.pos.checked_sub(1) {
            Some(index) => self.tokens[index].span.end.clone(),
            None => Position(0, Rc::clone(&self.file)),
        }
    }

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: Position) -> Span {
        Span {
            start,
            end: self.previous_end(),
        }
    }

    /// Builds an expression node with a fresh id.
    pub fn make_expr(&mut self, span: Span, kind: ExprKind) -> Expr {
        Expr::new(self.advance_id(), span, kind)
    }

    /// Copies an expression tree with fresh ids, keeping every span.
    ///
    /// Used by desugarings that need the same operand twice, such as
    /// `x += 1` becoming `x = x + 1`.
    pub fn rebuild_expr(&mut self, expr: &Expr) -> Expr {
        let kind = match &expr.kind {
            ExprKind::Nil => ExprKind::Nil,
            ExprKind::Boolean(value) => ExprKind::Boolean(*value),
            ExprKind::Int32(value) => ExprKind::Int32(*value),
            ExprKind::Int64(value) => ExprKind::Int64(*value),
            ExprKind::Float64(value) => ExprKind::Float64(*value),
            ExprKind::Identifier(name) => ExprKind::Identifier(name.clone()),
            ExprKind::SelfExpr => ExprKind::SelfExpr,
            ExprKind::Parent => ExprKind::Parent,
            ExprKind::Unary { operator, operand } => ExprKind::Unary {
                operator: *operator,
                operand: Box::new(self.rebuild_expr(operand)),
            },
            ExprKind::Binary {
                left,
                operator,
                right,
            } => ExprKind::Binary {
                left: Box::new(self.rebuild_expr(left)),
                operator: *operator,
                right: Box::new(self.rebuild_expr(right)),
            },
            ExprKind::Logical {
                left,
                operator,
                right,
            } => ExprKind::Logical {
                left: Box::new(self.rebuild_expr(left)),
                operator: *operator,
                right: Box::new(self.rebuild_expr(right)),
            },
            ExprKind::Grouping(inner) => ExprKind::Grouping(Box::new(self.rebuild_expr(inner))),
            ExprKind::Condition {
                condition,
                truthy,
                falsy,
            } => ExprKind::Condition {
                condition: Box::new(self.rebuild_expr(condition)),
                truthy: Box::new(self.rebuild_expr(truthy)),
                falsy: Box::new(self.rebuild_expr(falsy)),
            },
            ExprKind::Call { callee, arguments } => ExprKind::Call {
                callee: Box::new(self.rebuild_expr(callee)),
                arguments: arguments.iter().map(|arg| self.rebuild_expr(arg)).collect(),
            },
            ExprKind::Get { object, name } => ExprKind::Get {
                object: Box::new(self.rebuild_expr(object)),
                name: name.clone(),
            },
            ExprKind::Set {
                object,
                name,
                value,
            } => ExprKind::Set {
                object: Box::new(self.rebuild_expr(object)),
                name: name.clone(),
                value: Box::new(self.rebuild_expr(value)),
            },
            ExprKind::Index { callee, argument } => ExprKind::Index {
                callee: Box::new(self.rebuild_expr(callee)),
                argument: Box::new(self.rebuild_expr(argument)),
            },
            ExprKind::Array(items) => {
                ExprKind::Array(items.iter().map(|item| self.rebuild_expr(item)).collect())
            }
            ExprKind::Dict(entries) => ExprKind::Dict(
                entries
                    .iter()
                    .map(|(key, value)| (self.rebuild_expr(key), self.rebuild_expr(value)))
                    .collect(),
            ),
            ExprKind::New(class) => ExprKind::New(Box::new(self.rebuild_expr(class))),
            ExprKind::Assign { target, value } => ExprKind::Assign {
                target: Box::new(self.rebuild_expr(target)),
                value: Box::new(self.rebuild_expr(value)),
            },
        };

        self.make_expr(expr.span.clone(), kind)
    }
}

/// Parses a stream of tokens into an Abstract Syntax Tree.
///
/// This is the main entry point for parsing. It creates a parser instance,
/// initializes all lookup tables, and parses all statements until EOF.
///
/// # Returns
///
/// A tuple containing:
/// - The Parser instance (with state after parsing)
/// - Result containing either the root BlockStmt or the first Error
pub fn parse(tokens: Vec<Token>, file: Rc<String>) -> (Parser, Result<BlockStmt, Error>) {
    let mut parser = Parser::new(tokens, Rc::clone(&file));
    create_token_lookups(&mut parser);
    create_token_type_lookups(&mut parser);

    let mut body = vec![];

    parser.skip_semicolons();
    while parser.has_tokens() {
        match parse_stmt(&mut parser) {
            Ok(stmt) => body.push(stmt),
            Err(error) => return (parser, Err(error)),
        }
        parser.skip_semicolons();
    }

    let block = Ok(BlockStmt {
        body,
        id: parser.advance_id(),
        span: Span {
            start: Position(0, Rc::clone(&file)),
            end: parser.get_position(),
        },
    });

    (parser, block)
}

use crate::{
    ast::{
        ast::NodeId,
        expressions::Expr,
        statements::{
            BlockStmt, ClassDeclStmt, FnDeclStmt, FunctionKind, PropertyDecl, Stmt, StmtKind,
            TypedName, UsingCase, UsingStmt, VarDeclStmt, CONSTRUCTOR_NAME,
        },
        types::TypeExpr,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Position, Span,
};

use super::{
    parser::Parser,
    types::{parse_type, starts_type, void_type},
};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let stmt_fn = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied();
    if let Some(stmt_fn) = stmt_fn {
        return stmt_fn(parser);
    }

    let expr = parse_expr(parser, BindingPower::Default)?;

    Ok(Stmt {
        id: parser.advance_id(),
        span: expr.span.clone(),
        kind: StmtKind::Expression(expr),
    })
}

/// Parses `name [: T] [= value]`, shared by variables and properties.
fn parse_binding(
    parser: &mut Parser,
    is_constant: bool,
) -> Result<(TypedName, Option<Expr>), Error> {
    let error = parser.unexpected_detailed("expected identifier during variable declaration");
    let name_token = parser.expect_error(TokenKind::Identifier, Some(error))?;

    let ty = if parser.eat(TokenKind::Colon) {
        Some(parse_type(parser)?)
    } else {
        None
    };

    let name = TypedName {
        id: parser.advance_id(),
        span: parser.span_from(name_token.span.start.clone()),
        name: name_token.value.clone(),
        ty,
    };

    let value = if parser.eat(TokenKind::Assignment) {
        Some(parse_expr(parser, BindingPower::Comma)?)
    } else {
        None
    };

    if is_constant && value.is_none() {
        return Err(Error::new(
            ErrorImpl::ConstantWithoutValue {
                name: name_token.value,
            },
            parser.get_position(),
        ));
    }
    if name.ty.is_none() && value.is_none() {
        return Err(Error::new(
            ErrorImpl::ExpectedExplicitValue,
            parser.get_position(),
        ));
    }

    Ok((name, value))
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start_token = parser.advance().clone();
    let is_constant = start_token.kind == TokenKind::Const;

    let mut declarations = vec![];
    loop {
        let start = parser.get_position();
        let (name, value) = parse_binding(parser, is_constant)?;
        declarations.push(VarDeclStmt {
            id: parser.advance_id(),
            span: parser.span_from(start),
            name,
            value,
            is_constant,
        });

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    let span = parser.span_from(start_token.span.start);
    if declarations.len() == 1 {
        if let Some(declaration) = declarations.pop() {
            return Ok(Stmt {
                id: declaration.id,
                span,
                kind: StmtKind::Var(declaration),
            });
        }
    }

    Ok(Stmt {
        id: parser.advance_id(),
        span,
        kind: StmtKind::VarList(declarations),
    })
}

/// Parses `(params)`, returning the parameters and whether the last one is
/// variadic.
fn parse_parameters(parser: &mut Parser) -> Result<(Vec<TypedName>, bool), Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut parameters: Vec<TypedName> = vec![];
    let mut is_variadic = false;

    while parser.current_token_kind() != TokenKind::CloseParen {
        if is_variadic {
            let name = parameters
                .last()
                .map(|parameter| parameter.name.clone())
                .unwrap_or_default();
            return Err(Error::new(
                ErrorImpl::VariadicNotLast { name },
                parser.get_position(),
            ));
        }

        let start = parser.get_position();
        is_variadic = parser.eat(TokenKind::Ellipsis);

        let error = parser.unexpected_detailed("expected a parameter name");
        let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;
        parser.expect(TokenKind::Colon)?;
        let ty = parse_type(parser)?;

        parameters.push(TypedName {
            id: parser.advance_id(),
            span: parser.span_from(start),
            name,
            ty: Some(ty),
        });

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    Ok((parameters, is_variadic))
}

/// Parses `[->] [T]`; an omitted return type means `void`.
fn parse_return_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    if parser.eat(TokenKind::Arrow) || starts_type(parser) {
        return parse_type(parser);
    }

    let position = parser.previous_end();
    Ok(void_type(
        parser,
        Span {
            start: position.clone(),
            end: position,
        },
    ))
}

/// Parses everything after a function's name.
fn parse_function_tail(
    parser: &mut Parser,
    start: Position,
    name: String,
    kind: FunctionKind,
) -> Result<FnDeclStmt, Error> {
    let (parameters, is_variadic) = parse_parameters(parser)?;
    let return_type = parse_return_type(parser)?;

    let body = if kind == FunctionKind::Extern {
        None
    } else {
        Some(parse_block(parser)?)
    };

    Ok(FnDeclStmt {
        id: parser.advance_id(),
        span: parser.span_from(start),
        name,
        parameters,
        return_type,
        body,
        is_variadic,
        kind,
    })
}

fn function_stmt(function: FnDeclStmt) -> Stmt {
    Stmt {
        id: function.id,
        span: function.span.clone(),
        kind: StmtKind::Function(function),
    }
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let error = parser.unexpected_detailed("expected a function name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    let function = parse_function_tail(parser, start, name, FunctionKind::Function)?;
    Ok(function_stmt(function))
}

pub fn parse_extern_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.expect(TokenKind::Extern)?.span.start;

    if !parser.eat(TokenKind::Fn) && !parser.eat(TokenKind::Def) {
        return Err(parser.unexpected_detailed("expected 'fn' after 'extern'"));
    }

    let error = parser.unexpected_detailed("expected a function name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    let function = parse_function_tail(parser, start, name, FunctionKind::Extern)?;
    Ok(function_stmt(function))
}

/// Parses one property or method inside a class body.
fn parse_class_member(parser: &mut Parser, class: &mut ClassDeclStmt) -> Result<(), Error> {
    let start = parser.get_position();
    let is_static = parser.eat(TokenKind::Static);

    match parser.current_token_kind() {
        TokenKind::Var | TokenKind::Const => {
            let is_constant = parser.advance().kind == TokenKind::Const;
            let (name, value) = parse_binding(parser, is_constant)?;
            class.properties.push(PropertyDecl {
                id: parser.advance_id(),
                span: parser.span_from(start),
                name,
                value,
                is_static,
                is_constant,
            });
        }
        _ => {
            if !parser.eat(TokenKind::Fn) {
                parser.eat(TokenKind::Def);
            }

            let name_token = parser.current_token().clone();
            let kind = match name_token.kind {
                TokenKind::Identifier => FunctionKind::Method { is_static },
                TokenKind::Decorator if name_token.value == CONSTRUCTOR_NAME && !is_static => {
                    FunctionKind::Constructor
                }
                _ => return Err(parser.unexpected_detailed("expected a class member")),
            };
            parser.advance();

            let method = parse_function_tail(parser, start, name_token.value, kind)?;
            class.methods.push(method);
        }
    }

    Ok(())
}

pub fn parse_class_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.expect(TokenKind::Class)?.span.start;

    let error = parser.unexpected_detailed("expected a class name");
    let name_token = parser.expect_error(TokenKind::Identifier, Some(error))?;

    let superclass = if parser.eat(TokenKind::Less) {
        Some(parse_type(parser)?)
    } else {
        None
    };

    let mut class = ClassDeclStmt {
        id: NodeId::ROOT,
        span: name_token.span.clone(),
        name: name_token.value.clone(),
        superclass,
        properties: vec![],
        methods: vec![],
    };

    parser.expect(TokenKind::OpenCurly)?;
    parser.skip_semicolons();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        parse_class_member(parser, &mut class)?;
        parser.skip_semicolons();
    }
    parser.expect(TokenKind::CloseCurly)?;

    if !class.methods.iter().any(FnDeclStmt::is_constructor) {
        let return_type = void_type(parser, name_token.span.clone());
        let body = BlockStmt {
            id: parser.advance_id(),
            span: name_token.span.clone(),
            body: vec![],
        };
        class.methods.push(FnDeclStmt {
            id: parser.advance_id(),
            span: name_token.span.clone(),
            name: String::from(CONSTRUCTOR_NAME),
            parameters: vec![],
            return_type,
            body: Some(body),
            is_variadic: false,
            kind: FunctionKind::Constructor,
        });
    }

    class.id = parser.advance_id();
    class.span = parser.span_from(start);

    Ok(Stmt {
        id: class.id,
        span: class.span.clone(),
        kind: StmtKind::Class(class),
    })
}

pub fn parse_block(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let mut body = vec![];
    parser.skip_semicolons();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(parser.unexpected());
        }
        body.push(parse_stmt(parser)?);
        parser.skip_semicolons();
    }
    parser.expect(TokenKind::CloseCurly)?;

    Ok(BlockStmt {
        id: parser.advance_id(),
        span: parser.span_from(start),
        body,
    })
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let block = parse_block(parser)?;

    Ok(Stmt {
        id: block.id,
        span: block.span.clone(),
        kind: StmtKind::Block(block),
    })
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_branch = Box::new(parse_stmt(parser)?);

    parser.skip_semicolons();
    let else_branch = if parser.eat(TokenKind::Else) {
        Some(Box::new(parse_stmt(parser)?))
    } else {
        None
    };

    Ok(Stmt {
        id: parser.advance_id(),
        span: parser.span_from(start),
        kind: StmtKind::If {
            condition,
            then_branch,
            else_branch,
        },
    })
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = Box::new(parse_stmt(parser)?);

    Ok(Stmt {
        id: parser.advance_id(),
        span: parser.span_from(start),
        kind: StmtKind::While { condition, body },
    })
}

pub fn parse_do_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let body = Box::new(parse_stmt(parser)?);
    parser.skip_semicolons();
    parser.expect(TokenKind::While)?;
    let condition = parse_expr(parser, BindingPower::Default)?;

    Ok(Stmt {
        id: parser.advance_id(),
        span: parser.span_from(start),
        kind: StmtKind::DoWhile { body, condition },
    })
}

pub fn parse_loop_control_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let token = parser.advance().clone();
    let kind = if token.kind == TokenKind::Break {
        StmtKind::Break
    } else {
        StmtKind::Continue
    };

    Ok(Stmt {
        id: parser.advance_id(),
        span: token.span,
        kind,
    })
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let value = match parser.current_token_kind() {
        TokenKind::CloseCurly | TokenKind::Semicolon | TokenKind::EOF => None,
        _ => Some(parse_expr(parser, BindingPower::Default)?),
    };

    Ok(Stmt {
        id: parser.advance_id(),
        span: parser.span_from(start),
        kind: StmtKind::Return(value),
    })
}

pub fn parse_assert_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Comma)?;
    let message = if parser.eat(TokenKind::Comma) {
        Some(parse_expr(parser, BindingPower::Comma)?)
    } else {
        None
    };

    Ok(Stmt {
        id: parser.advance_id(),
        span: parser.span_from(start),
        kind: StmtKind::Assert { condition, message },
    })
}

pub fn parse_echo_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();
    let value = parse_expr(parser, BindingPower::Default)?;

    Ok(Stmt {
        id: parser.advance_id(),
        span: parser.span_from(start),
        kind: StmtKind::Echo(value),
    })
}

pub fn parse_using_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();
    let subject = parse_expr(parser, BindingPower::Default)?;

    let mut cases = vec![];
    let mut default = None;

    parser.expect(TokenKind::OpenCurly)?;
    parser.skip_semicolons();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        match parser.current_token_kind() {
            TokenKind::When => {
                parser.advance();
                let mut labels = vec![parse_expr(parser, BindingPower::Comma)?];
                while parser.eat(TokenKind::Comma) {
                    labels.push(parse_expr(parser, BindingPower::Comma)?);
                }
                let body = Box::new(parse_stmt(parser)?);
                cases.push(UsingCase { labels, body });
            }
            TokenKind::Default if default.is_none() => {
                parser.advance();
                default = Some(Box::new(parse_stmt(parser)?));
            }
            _ => return Err(parser.unexpected_detailed("expected 'when' or 'default'")),
        }
        parser.skip_semicolons();
    }
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Stmt {
        id: parser.advance_id(),
        span: parser.span_from(start),
        kind: StmtKind::Using(UsingStmt {
            subject,
            cases,
            default,
        }),
    })
}

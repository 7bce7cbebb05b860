use crate::{
    ast::expressions::{BinaryOp, Expr, ExprKind, LogicalOp, UnaryOp},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud_fn = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud_fn) => *nud_fn,
        None => return Err(parser.unexpected()),
    };

    let mut left = nud_fn(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if next_bp <= bp {
            break;
        }

        let led_fn = match parser.get_led_lookup().get(&token_kind) {
            Some(led_fn) => *led_fn,
            None => return Err(parser.unexpected()),
        };
        left = led_fn(parser, left, next_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance().clone();

    let kind = match token.kind {
        TokenKind::Number => parse_number(&token.value)
            .ok_or_else(|| {
                Error::new(
                    ErrorImpl::NumberParseError {
                        token: token.value.clone(),
                    },
                    token.span.start.clone(),
                )
            })?,
        TokenKind::Identifier => ExprKind::Identifier(token.value.clone()),
        TokenKind::True => ExprKind::Boolean(true),
        TokenKind::False => ExprKind::Boolean(false),
        TokenKind::Nil => ExprKind::Nil,
        TokenKind::SelfKw => ExprKind::SelfExpr,
        TokenKind::Parent => ExprKind::Parent,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span.start,
            ))
        }
    };

    Ok(parser.make_expr(token.span, kind))
}

/// Integers are `i32` when they fit and `i64` otherwise.
fn parse_number(value: &str) -> Option<ExprKind> {
    if value.contains('.') {
        return value.parse().ok().map(ExprKind::Float64);
    }

    if let Ok(value) = value.parse::<i32>() {
        return Some(ExprKind::Int32(value));
    }
    value.parse::<i64>().ok().map(ExprKind::Int64)
}

fn binary_operator(kind: TokenKind) -> Option<BinaryOp> {
    let operator = match kind {
        TokenKind::Plus | TokenKind::PlusEquals | TokenKind::PlusPlus => BinaryOp::Add,
        TokenKind::Dash | TokenKind::MinusEquals | TokenKind::MinusMinus => BinaryOp::Subtract,
        TokenKind::Star | TokenKind::StarEquals => BinaryOp::Multiply,
        TokenKind::Slash | TokenKind::SlashEquals => BinaryOp::Divide,
        TokenKind::Percent | TokenKind::PercentEquals => BinaryOp::Modulo,
        TokenKind::Ampersand => BinaryOp::BitAnd,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::ShiftLeft => BinaryOp::ShiftLeft,
        TokenKind::ShiftRight => BinaryOp::ShiftRight,
        _ => return None,
    };
    Some(operator)
}

fn logical_operator(kind: TokenKind) -> Option<LogicalOp> {
    let operator = match kind {
        TokenKind::And => LogicalOp::And,
        TokenKind::Or => LogicalOp::Or,
        TokenKind::Equals => LogicalOp::Equal,
        TokenKind::NotEquals => LogicalOp::NotEqual,
        TokenKind::Less => LogicalOp::Less,
        TokenKind::LessEquals => LogicalOp::LessEqual,
        TokenKind::Greater => LogicalOp::Greater,
        TokenKind::GreaterEquals => LogicalOp::GreaterEqual,
        _ => return None,
    };
    Some(operator)
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = binary_operator(operator_token.kind).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value.clone(),
            },
            operator_token.span.start.clone(),
        )
    })?;

    let right = parse_expr(parser, bp)?;
    let span = left.span.to(&right.span);

    Ok(parser.make_expr(
        span,
        ExprKind::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        },
    ))
}

pub fn parse_logical_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = logical_operator(operator_token.kind).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value.clone(),
            },
            operator_token.span.start.clone(),
        )
    })?;

    let right = parse_expr(parser, bp)?;
    let span = left.span.to(&right.span);

    Ok(parser.make_expr(
        span,
        ExprKind::Logical {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        },
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = match operator_token.kind {
        TokenKind::Dash => UnaryOp::Negate,
        TokenKind::Not => UnaryOp::Not,
        TokenKind::Tilde => UnaryOp::BitNot,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.span.start,
            ))
        }
    };

    let operand = parse_expr(parser, BindingPower::Unary)?;
    let span = operator_token.span.to(&operand.span);

    Ok(parser.make_expr(
        span,
        ExprKind::Unary {
            operator,
            operand: Box::new(operand),
        },
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::OpenParen)?.span.start;
    let inner = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    let span = parser.span_from(start);
    Ok(parser.make_expr(span, ExprKind::Grouping(Box::new(inner))))
}

/// Builds `target = value`, or a `Set` when the target is a field access.
fn make_assignment(parser: &mut Parser, target: Expr, value: Expr) -> Expr {
    let span = target.span.to(&value.span);
    let kind = match target.kind {
        ExprKind::Get { object, name } => ExprKind::Set {
            object,
            name,
            value: Box::new(value),
        },
        _ => ExprKind::Assign {
            target: Box::new(target),
            value: Box::new(value),
        },
    };
    parser.make_expr(span, kind)
}

pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let value = parse_expr(parser, BindingPower::Comma)?;

    if operator_token.kind == TokenKind::Assignment {
        return Ok(make_assignment(parser, left, value));
    }

    let operator = binary_operator(operator_token.kind).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value.clone(),
            },
            operator_token.span.start.clone(),
        )
    })?;

    // x op= e  =>  x = x op e
    let current = parser.rebuild_expr(&left);
    let span = current.span.to(&value.span);
    let combined = parser.make_expr(
        span,
        ExprKind::Binary {
            left: Box::new(current),
            operator,
            right: Box::new(value),
        },
    );
    Ok(make_assignment(parser, left, combined))
}

pub fn parse_postfix_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = if operator_token.kind == TokenKind::PlusPlus {
        BinaryOp::Add
    } else {
        BinaryOp::Subtract
    };

    // x++  =>  x = x + 1
    let current = parser.rebuild_expr(&left);
    let one = parser.make_expr(operator_token.span.clone(), ExprKind::Int32(1));
    let span = current.span.to(&operator_token.span);
    let combined = parser.make_expr(
        span,
        ExprKind::Binary {
            left: Box::new(current),
            operator,
            right: Box::new(one),
        },
    );
    Ok(make_assignment(parser, left, combined))
}

pub fn parse_conditional_expr(
    parser: &mut Parser,
    condition: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    parser.expect(TokenKind::Question)?;
    let truthy = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Colon)?;
    let falsy = parse_expr(parser, BindingPower::Assignment)?;

    let span = condition.span.to(&falsy.span);
    Ok(parser.make_expr(
        span,
        ExprKind::Condition {
            condition: Box::new(condition),
            truthy: Box::new(truthy),
            falsy: Box::new(falsy),
        },
    ))
}

/// Parses `expr, expr, ...` up to (and including) `close`.
fn parse_arguments(parser: &mut Parser, close: TokenKind) -> Result<Vec<Expr>, Error> {
    let mut arguments = vec![];

    while parser.current_token_kind() != close {
        arguments.push(parse_expr(parser, BindingPower::Comma)?);

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }
    parser.expect(close)?;

    Ok(arguments)
}

pub fn parse_call_expr(parser: &mut Parser, callee: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let arguments = parse_arguments(parser, TokenKind::CloseParen)?;

    let span = parser.span_from(callee.span.start.clone());
    Ok(parser.make_expr(
        span,
        ExprKind::Call {
            callee: Box::new(callee),
            arguments,
        },
    ))
}

pub fn parse_index_expr(parser: &mut Parser, callee: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    let argument = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    let span = parser.span_from(callee.span.start.clone());
    Ok(parser.make_expr(
        span,
        ExprKind::Index {
            callee: Box::new(callee),
            argument: Box::new(argument),
        },
    ))
}

pub fn parse_member_expr(parser: &mut Parser, object: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.expect(TokenKind::Dot)?;
    let name = parser.expect_error(
        TokenKind::Identifier,
        Some(parser.unexpected_detailed("expected a member name")),
    )?;

    let span = object.span.to(&name.span);
    Ok(parser.make_expr(
        span,
        ExprKind::Get {
            object: Box::new(object),
            name: name.value,
        },
    ))
}

pub fn parse_array_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::OpenBracket)?.span.start;
    let items = parse_arguments(parser, TokenKind::CloseBracket)?;

    let span = parser.span_from(start);
    Ok(parser.make_expr(span, ExprKind::Array(items)))
}

pub fn parse_dict_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;
    let mut entries = vec![];

    while parser.current_token_kind() != TokenKind::CloseCurly {
        let key = parse_expr(parser, BindingPower::Conditional)?;
        parser.expect(TokenKind::Colon)?;
        let value = parse_expr(parser, BindingPower::Comma)?;
        entries.push((key, value));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }
    parser.expect(TokenKind::CloseCurly)?;

    let span = parser.span_from(start);
    Ok(parser.make_expr(span, ExprKind::Dict(entries)))
}

pub fn parse_new_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::New)?.span.start;
    let class_name = parser.expect_error(
        TokenKind::Identifier,
        Some(parser.unexpected_detailed("expected a class name after 'new'")),
    )?;

    let class = parser.make_expr(
        class_name.span.clone(),
        ExprKind::Identifier(class_name.value),
    );
    let callee = parser.make_expr(class_name.span, ExprKind::New(Box::new(class)));

    parser.expect(TokenKind::OpenParen)?;
    let arguments = parse_arguments(parser, TokenKind::CloseParen)?;

    let span: Span = parser.span_from(start);
    Ok(parser.make_expr(
        span,
        ExprKind::Call {
            callee: Box::new(callee),
            arguments,
        },
    ))
}

use crate::{
    ast::{
        ast::NodeId,
        expressions::{BinaryOp, Expr, ExprKind, LogicalOp, UnaryOp},
        statements::CONSTRUCTOR_NAME,
    },
    errors::diagnostics::SemanticError,
    scope::scope::{DeclKind, DeclarationContext},
    solver::solver::{Attr, AttrKey, RuleBuilder, RuleContext, Solver, Value},
    types::types::{DefType, MemberKind, Type},
    Span,
};

use super::type_checker::{Context, Inference, TypeChecker};

/// Registers a rule copying attribute `from` into `to`.
pub(crate) fn copy_attr(builder: RuleBuilder<'_>, from: AttrKey, to: AttrKey) {
    builder.outputs([to]).inputs([from]).by(|ctx| {
        if let Some(value) = ctx.get(0).cloned() {
            ctx.set(0, value);
        }
    });
}

/// Parameter type expected at argument position `index`.
fn parameter_type(def: &DefType, index: usize) -> Option<&Type> {
    if def.is_variadic && index + 1 >= def.parameters.len() {
        def.parameters.last()
    } else {
        def.parameters.get(index)
    }
}

fn set_type(solver: &mut Solver, id: NodeId, ty: Type) {
    solver.set_attr(id, Attr::Type, Value::Type(ty));
}

/// Binds an identifier to a declaration found in scope and makes its type
/// follow the declaration's.
fn bind_identifier(solver: &mut Solver, id: NodeId, span: Span, found: DeclarationContext) {
    let declaration = found.declaration.id;
    solver.set_attr(id, Attr::Ast, Value::Decl(found.declaration));
    solver.set_attr(id, Attr::Scope, Value::Scope(found.scope));
    copy_attr(
        solver.rule(span),
        AttrKey::new(declaration, Attr::Type),
        AttrKey::new(id, Attr::Type),
    );
}

pub fn check_expr(checker: &mut TypeChecker, expr: &Expr, context: &Context) {
    let id = expr.id;
    let span = expr.span.clone();

    match &expr.kind {
        ExprKind::Nil => set_type(&mut checker.solver, id, Type::Nil),
        ExprKind::Boolean(_) => set_type(&mut checker.solver, id, Type::Bool),
        ExprKind::Int32(_) => set_type(&mut checker.solver, id, Type::I32),
        ExprKind::Int64(_) => set_type(&mut checker.solver, id, Type::I64),
        ExprKind::Float64(_) => set_type(&mut checker.solver, id, Type::F64),
        ExprKind::Identifier(name) => check_identifier(checker, expr, name, context),
        ExprKind::Unary { operator, operand } => {
            check_expr(checker, operand, &context.plain());
            check_unary(checker, expr, *operator, operand);
        }
        ExprKind::Binary {
            left,
            operator,
            right,
        } => {
            check_expr(checker, left, &context.plain());
            check_expr(checker, right, &context.plain());
            check_binary(checker, expr, *operator, left, right);
        }
        ExprKind::Logical {
            left,
            operator,
            right,
        } => {
            check_expr(checker, left, &context.plain());
            check_expr(checker, right, &context.plain());
            check_logical(checker, expr, *operator, left, right);
        }
        ExprKind::Grouping(inner) => {
            check_expr(checker, inner, &context.plain());
            copy_attr(
                checker.solver.rule(span),
                AttrKey::new(inner.id, Attr::Type),
                AttrKey::new(id, Attr::Type),
            );
        }
        ExprKind::Condition {
            condition,
            truthy,
            falsy,
        } => {
            check_expr(checker, condition, &context.plain());
            check_expr(checker, truthy, &context.plain());
            check_expr(checker, falsy, &context.plain());
            check_condition(checker, expr, condition, truthy, falsy);
        }
        ExprKind::Call { callee, arguments } => {
            check_expr(checker, callee, &context.plain());
            for (index, argument) in arguments.iter().enumerate() {
                let inference = Inference::Parameter {
                    callee: callee.id,
                    index,
                };
                check_expr(checker, argument, &context.with_inference(Some(inference)));
            }
            check_call(checker, expr, callee, arguments);
        }
        ExprKind::Get { object, name } => {
            check_expr(checker, object, &context.plain());
            check_get(checker, expr, object, name);
        }
        ExprKind::Set {
            object,
            name,
            value,
        } => {
            check_expr(checker, object, &context.plain());
            check_expr(checker, value, &context.plain());
            check_set(checker, expr, object, name, value);
        }
        ExprKind::Index { callee, argument } => {
            check_expr(checker, callee, &context.plain());
            check_expr(checker, argument, &context.plain());
            check_index(checker, expr, callee, argument);
        }
        ExprKind::Array(items) => {
            if items.is_empty() {
                check_empty_literal(checker, expr, context, true);
                return;
            }

            for item in items {
                check_expr(checker, item, &context.plain());
            }

            let elements: Vec<(NodeId, Span)> =
                items.iter().map(|item| (item.id, item.span.clone())).collect();
            let length = items.len() as u64;
            checker
                .solver
                .rule(span)
                .output(id, Attr::Type)
                .inputs(elements.iter().map(|(item, _)| AttrKey::new(*item, Attr::Type)))
                .by(move |ctx| {
                    let types: Vec<Type> = (0..elements.len()).map(|i| ctx.get_type(i)).collect();
                    let spans: Vec<Span> = elements.into_iter().map(|(_, span)| span).collect();
                    match unify(ctx, &types, &spans) {
                        Some(element) => ctx.set(0, Type::array(element, length)),
                        None => ctx.set(0, Type::Error),
                    }
                });
        }
        ExprKind::Dict(entries) => {
            if entries.is_empty() {
                check_empty_literal(checker, expr, context, false);
                return;
            }

            for (key, value) in entries {
                check_expr(checker, key, &context.plain());
                check_expr(checker, value, &context.plain());
            }

            let keys: Vec<(NodeId, Span)> = entries
                .iter()
                .map(|(key, _)| (key.id, key.span.clone()))
                .collect();
            let values: Vec<(NodeId, Span)> = entries
                .iter()
                .map(|(_, value)| (value.id, value.span.clone()))
                .collect();

            checker
                .solver
                .rule(span)
                .output(id, Attr::Type)
                .inputs(keys.iter().map(|(key, _)| AttrKey::new(*key, Attr::Type)))
                .inputs(values.iter().map(|(value, _)| AttrKey::new(*value, Attr::Type)))
                .by(move |ctx| {
                    let count = keys.len();
                    let key_types: Vec<Type> = (0..count).map(|i| ctx.get_type(i)).collect();
                    let value_types: Vec<Type> =
                        (count..count * 2).map(|i| ctx.get_type(i)).collect();
                    let key_spans: Vec<Span> = keys.into_iter().map(|(_, span)| span).collect();
                    let value_spans: Vec<Span> =
                        values.into_iter().map(|(_, span)| span).collect();

                    let key = unify(ctx, &key_types, &key_spans);
                    let value = unify(ctx, &value_types, &value_spans);
                    match (key, value) {
                        (Some(key), Some(value)) => ctx.set(0, Type::mapped(key, value)),
                        _ => ctx.set(0, Type::Error),
                    }
                });
        }
        ExprKind::New(class) => {
            check_expr(checker, class, &context.plain());
            check_new(checker, expr, class);
        }
        ExprKind::SelfExpr => check_receiver(checker, expr, context, false),
        ExprKind::Parent => check_receiver(checker, expr, context, true),
        ExprKind::Assign { target, value } => check_assign(checker, expr, target, value, context),
    }
}

fn check_identifier(checker: &mut TypeChecker, expr: &Expr, name: &str, context: &Context) {
    let id = expr.id;

    if let Some(found) = context.scope.lookup(name) {
        bind_identifier(&mut checker.solver, id, expr.span.clone(), found);
        return;
    }

    // Not declared yet: functions and classes may be declared further down,
    // variables may not.
    let name = name.to_string();
    let scope = context.scope.clone();
    checker
        .solver
        .rule(expr.span.clone())
        .output(id, Attr::Type)
        .output(id, Attr::Ast)
        .output(id, Attr::Scope)
        .by(move |ctx| {
            let span = ctx.span().clone();
            match scope.lookup(&name) {
                None => ctx.error(SemanticError::UnresolvedName { name }, span),
                Some(found)
                    if matches!(
                        found.declaration.kind,
                        DeclKind::Variable { .. } | DeclKind::Parameter
                    ) =>
                {
                    ctx.set(1, Value::Decl(found.declaration));
                    ctx.set(2, Value::Scope(found.scope));
                    ctx.error_for(
                        SemanticError::UsedBeforeDeclaration { name },
                        span,
                        &[AttrKey::new(id, Attr::Type)],
                    );
                }
                Some(found) => {
                    let declaration = found.declaration.id;
                    ctx.set(1, Value::Decl(found.declaration));
                    ctx.set(2, Value::Scope(found.scope));
                    copy_attr(
                        ctx.rule(span),
                        AttrKey::new(declaration, Attr::Type),
                        AttrKey::new(id, Attr::Type),
                    );
                }
            }
        });
}

fn check_unary(checker: &mut TypeChecker, expr: &Expr, operator: UnaryOp, operand: &Expr) {
    checker
        .solver
        .rule(expr.span.clone())
        .output(expr.id, Attr::Type)
        .input(operand.id, Attr::Type)
        .by(move |ctx| {
            let operand = ctx.get_type(0);
            if operand.is_error() {
                ctx.set(0, Type::Error);
                return;
            }

            let span = ctx.span().clone();
            match operator {
                UnaryOp::Negate => {
                    if !operand.is_numeric() {
                        ctx.report(
                            SemanticError::CannotNegate {
                                operand: operand.to_string(),
                            },
                            span,
                        );
                    }
                    ctx.set(0, operand);
                }
                UnaryOp::Not => {
                    if !operand.is_boolean() {
                        ctx.report(
                            SemanticError::InvalidUnary {
                                operator: operator.to_string(),
                                operand: operand.to_string(),
                            },
                            span,
                        );
                    }
                    ctx.set(0, Type::Bool);
                }
                UnaryOp::BitNot => {
                    if !operand.is_integer() {
                        ctx.report(
                            SemanticError::InvalidUnary {
                                operator: operator.to_string(),
                                operand: operand.to_string(),
                            },
                            span,
                        );
                    }
                    ctx.set(0, operand);
                }
            }
        });
}

fn check_binary(checker: &mut TypeChecker, expr: &Expr, operator: BinaryOp, left: &Expr, right: &Expr) {
    checker
        .solver
        .rule(expr.span.clone())
        .output(expr.id, Attr::Type)
        .input(left.id, Attr::Type)
        .input(right.id, Attr::Type)
        .by(move |ctx| {
            let left = ctx.get_type(0);
            let right = ctx.get_type(1);
            if left.is_error() || right.is_error() {
                ctx.set(0, Type::Error);
                return;
            }

            let span = ctx.span().clone();
            let mismatch = |left: &Type, right: &Type| {
                let (symbol, left, right) =
                    (operator.to_string(), left.to_string(), right.to_string());
                if operator.is_bitwise() {
                    SemanticError::InvalidBitwise {
                        operator: symbol,
                        left,
                        right,
                    }
                } else {
                    SemanticError::InvalidArithmetic {
                        operator: symbol,
                        left,
                        right,
                    }
                }
            };

            if !left.is_numeric() || !right.is_numeric() {
                ctx.error(mismatch(&left, &right), span);
                return;
            }

            let result = Type::max(&left, &right);
            if operator.is_bitwise() && result.is_float() {
                ctx.report(mismatch(&left, &right), span);
            }
            ctx.set(0, result);
        });
}

fn check_logical(
    checker: &mut TypeChecker,
    expr: &Expr,
    operator: LogicalOp,
    left: &Expr,
    right: &Expr,
) {
    let spans = [left.span.clone(), right.span.clone()];

    checker
        .solver
        .rule(expr.span.clone())
        .output(expr.id, Attr::Type)
        .input(left.id, Attr::Type)
        .input(right.id, Attr::Type)
        .by(move |ctx| {
            let left = ctx.get_type(0);
            let right = ctx.get_type(1);

            if operator.is_connective() {
                for (ty, span) in [left, right].into_iter().zip(spans) {
                    if !ty.is_boolean() && !ty.is_error() {
                        let found = ty.to_string();
                        ctx.report(SemanticError::NonBooleanLogic { found }, span);
                    }
                }
            } else if !left.is_comparable_to(&right) {
                let span = ctx.span().clone();
                ctx.report(
                    SemanticError::IncomparableTypes {
                        left: left.to_string(),
                        right: right.to_string(),
                    },
                    span,
                );
            }

            ctx.set(0, Type::Bool);
        });
}

fn check_condition(
    checker: &mut TypeChecker,
    expr: &Expr,
    condition: &Expr,
    truthy: &Expr,
    falsy: &Expr,
) {
    let condition_span = condition.span.clone();

    checker
        .solver
        .rule(expr.span.clone())
        .output(expr.id, Attr::Type)
        .input(condition.id, Attr::Type)
        .input(truthy.id, Attr::Type)
        .input(falsy.id, Attr::Type)
        .by(move |ctx| {
            let condition = ctx.get_type(0);
            let truthy = ctx.get_type(1);
            let falsy = ctx.get_type(2);
            let span = ctx.span().clone();

            if !condition.is_boolean() && !condition.is_error() {
                ctx.report(
                    SemanticError::NonBooleanCondition {
                        construct: String::from("Conditional"),
                        found: condition.to_string(),
                    },
                    condition_span,
                );
            }

            if truthy.is_error() || falsy.is_error() {
                ctx.set(0, Type::Error);
            } else if truthy.is_nil() && falsy.is_nil() {
                ctx.error(SemanticError::NilConditionBranches, span);
            } else if truthy.is_nil() {
                ctx.set(0, falsy);
            } else if falsy.is_nil() || truthy == falsy {
                ctx.set(0, truthy);
            } else {
                ctx.error(
                    SemanticError::IncompatibleBranches {
                        truthy: truthy.to_string(),
                        falsy: falsy.to_string(),
                    },
                    span,
                );
            }
        });
}

fn check_call(checker: &mut TypeChecker, expr: &Expr, callee: &Expr, arguments: &[Expr]) {
    let spans: Vec<Span> = arguments.iter().map(|argument| argument.span.clone()).collect();

    checker
        .solver
        .rule(expr.span.clone())
        .output(expr.id, Attr::Type)
        .input(callee.id, Attr::Type)
        .inputs(
            arguments
                .iter()
                .map(|argument| AttrKey::new(argument.id, Attr::Type)),
        )
        .by(move |ctx| {
            let span = ctx.span().clone();
            let def = match ctx.get_type(0) {
                Type::Def(def) => def,
                Type::Error => {
                    ctx.set(0, Type::Error);
                    return;
                }
                other => {
                    let found = other.to_string();
                    ctx.error(SemanticError::NotCallable { found }, span);
                    return;
                }
            };

            let expected = def.parameters.len();
            let received = spans.len();
            if def.is_variadic {
                let minimum = expected.saturating_sub(1);
                if received < minimum {
                    ctx.report(
                        SemanticError::VariadicArgumentCount { minimum, received },
                        span,
                    );
                }
            } else if received != expected {
                ctx.report(SemanticError::ArgumentCount { expected, received }, span);
            }

            for (index, argument_span) in spans.into_iter().enumerate() {
                let argument = ctx.get_type(index + 1);
                let Some(parameter) = parameter_type(&def, index) else {
                    continue;
                };
                if !argument.is_assignable_to(parameter) {
                    ctx.report(
                        SemanticError::IncompatibleArgument {
                            index: index + 1,
                            expected: parameter.to_string(),
                            found: argument.to_string(),
                        },
                        argument_span,
                    );
                }
            }

            ctx.set(0, *def.return_type);
        });
}

fn check_get(checker: &mut TypeChecker, expr: &Expr, object: &Expr, name: &str) {
    let id = expr.id;
    let name = name.to_string();

    checker
        .solver
        .rule(expr.span.clone())
        .output(id, Attr::Type)
        .input(object.id, Attr::Type)
        .by(move |ctx| {
            let span = ctx.span().clone();
            match ctx.get_type(0) {
                Type::Error => ctx.set(0, Type::Error),
                Type::Array(_) if name == "length" => ctx.set(0, Type::I32),
                Type::Array(_) => ctx.error(SemanticError::UnknownArrayField { name }, span),
                Type::Class(class) => match class.find_member(&name) {
                    Some((_, member)) => {
                        let member = member.node;
                        copy_attr(
                            ctx.rule(span),
                            AttrKey::new(member, Attr::Type),
                            AttrKey::new(id, Attr::Type),
                        );
                    }
                    None => ctx.error(
                        SemanticError::UnknownMember {
                            class: class.name.clone(),
                            name,
                        },
                        span,
                    ),
                },
                other => ctx.error(
                    SemanticError::InvalidFieldAccess {
                        name,
                        found: other.to_string(),
                    },
                    span,
                ),
            }
        });
}

fn check_set(checker: &mut TypeChecker, expr: &Expr, object: &Expr, name: &str, value: &Expr) {
    let id = expr.id;
    let name = name.to_string();

    checker
        .solver
        .rule(expr.span.clone())
        .output(id, Attr::Type)
        .input(object.id, Attr::Type)
        .input(value.id, Attr::Type)
        .by(move |ctx| {
            let span = ctx.span().clone();
            let value = ctx.get_type(1);

            match ctx.get_type(0) {
                Type::Error => ctx.set(0, Type::Error),
                Type::Array(_) if name == "length" => {
                    ctx.error(SemanticError::AssignToArrayLength, span)
                }
                Type::Array(_) => ctx.error(SemanticError::UnknownArrayField { name }, span),
                Type::Class(class) => {
                    let Some((_, member)) = class.find_member(&name) else {
                        let class = class.name.clone();
                        ctx.error(SemanticError::UnknownMember { class, name }, span);
                        return;
                    };

                    match member.kind {
                        MemberKind::Method { .. } => {
                            ctx.error(SemanticError::InvalidAssignmentTarget, span);
                            return;
                        }
                        MemberKind::Property {
                            is_constant: true, ..
                        } => {
                            ctx.report(SemanticError::AssignToConstantField { name }, span.clone());
                        }
                        MemberKind::Property { .. } => {}
                    }

                    let member = member.node;
                    ctx.rule(span)
                        .output(id, Attr::Type)
                        .input(member, Attr::Type)
                        .by(move |ctx| {
                            let field = ctx.get_type(0);
                            if !value.is_assignable_to(&field) {
                                let span = ctx.span().clone();
                                ctx.report(
                                    SemanticError::IncompatibleAssignment {
                                        expected: field.to_string(),
                                        found: value.to_string(),
                                    },
                                    span,
                                );
                            }
                            ctx.set(0, field);
                        });
                }
                other => ctx.error(
                    SemanticError::InvalidFieldAccess {
                        name,
                        found: other.to_string(),
                    },
                    span,
                ),
            }
        });
}

fn check_index(checker: &mut TypeChecker, expr: &Expr, callee: &Expr, argument: &Expr) {
    let argument_span = argument.span.clone();

    checker
        .solver
        .rule(expr.span.clone())
        .output(expr.id, Attr::Type)
        .input(callee.id, Attr::Type)
        .input(argument.id, Attr::Type)
        .by(move |ctx| {
            let argument = ctx.get_type(1);

            match ctx.get_type(0) {
                Type::Error => ctx.set(0, Type::Error),
                Type::Array(array) => {
                    if !argument.is_integer() && !argument.is_error() {
                        ctx.report(
                            SemanticError::NonIntegerIndex {
                                found: argument.to_string(),
                            },
                            argument_span,
                        );
                    }
                    ctx.set(0, *array.element);
                }
                Type::Mapped(mapped) => {
                    if !argument.is_assignable_to(&mapped.key) {
                        ctx.report(
                            SemanticError::IncompatibleKey {
                                expected: mapped.key.to_string(),
                                found: argument.to_string(),
                            },
                            argument_span,
                        );
                    }
                    ctx.set(0, *mapped.value);
                }
                other => {
                    let span = ctx.span().clone();
                    let found = other.to_string();
                    ctx.error(SemanticError::NotIndexable { found }, span);
                }
            }
        });
}

/// Folds element types into their common type, reporting the first element
/// that cannot take part. `None` when unification failed.
fn unify(
    ctx: &mut RuleContext<'_>,
    types: &[Type],
    spans: &[Span],
) -> Option<Type> {
    let mut common: Option<Type> = None;

    for (ty, span) in types.iter().zip(spans) {
        if ty.is_error() {
            return None;
        }
        if ty.is_void() || ty.is_nil() {
            ctx.report(
                SemanticError::InvalidElementType {
                    found: ty.to_string(),
                },
                span.clone(),
            );
            return None;
        }

        common = match common {
            None => Some(ty.clone()),
            Some(current) => match Type::common_type(&current, ty) {
                Some(unified) => Some(unified),
                None => {
                    ctx.report(
                        SemanticError::NoCommonType {
                            left: current.to_string(),
                            right: ty.to_string(),
                        },
                        span.clone(),
                    );
                    return None;
                }
            },
        };
    }

    common
}

/// Types `[]` and `{}` from the surrounding declaration or call.
fn check_empty_literal(checker: &mut TypeChecker, expr: &Expr, context: &Context, is_array: bool) {
    let id = expr.id;
    let literal = if is_array { "array" } else { "dictionary" };

    match context.inference {
        None => {
            checker.solver.report(
                SemanticError::EmptyLiteralInference {
                    literal: literal.to_string(),
                },
                expr.span.clone(),
            );
            checker.solver.poison(AttrKey::new(id, Attr::Type));
        }
        Some(Inference::Attr(key)) => {
            checker
                .solver
                .rule(expr.span.clone())
                .output(id, Attr::Type)
                .inputs([key])
                .by(move |ctx| {
                    let ty = ctx.get_type(0);
                    accept_inferred(ctx, ty, is_array);
                });
        }
        Some(Inference::Parameter { callee, index }) => {
            checker
                .solver
                .rule(expr.span.clone())
                .output(id, Attr::Type)
                .input(callee, Attr::Type)
                .by(move |ctx| {
                    let ty = match ctx.get_type(0) {
                        Type::Def(def) => parameter_type(&def, index).cloned().unwrap_or(Type::Void),
                        // The call itself reports a non-callable callee.
                        _ => Type::Error,
                    };
                    accept_inferred(ctx, ty, is_array);
                });
        }
    }
}

fn accept_inferred(ctx: &mut RuleContext<'_>, ty: Type, is_array: bool) {
    let fits = match &ty {
        Type::Error => true,
        Type::Array(_) => is_array,
        Type::Mapped(_) => !is_array,
        _ => false,
    };

    if fits {
        ctx.set(0, ty);
    } else {
        let span = ctx.span().clone();
        let literal = String::from(if is_array { "array" } else { "dictionary" });
        ctx.error(SemanticError::EmptyLiteralInference { literal }, span);
    }
}

fn check_new(checker: &mut TypeChecker, expr: &Expr, class: &Expr) {
    let id = expr.id;

    checker
        .solver
        .rule(expr.span.clone())
        .output(id, Attr::Type)
        .input(class.id, Attr::Ast)
        .by(move |ctx| {
            let span = ctx.span().clone();
            let Some(declaration) = ctx.get_decl(0) else {
                ctx.set(0, Type::Error);
                return;
            };

            if declaration.kind != DeclKind::Class {
                let found = declaration.kind.to_string();
                ctx.error(SemanticError::NotAClass { found }, span);
                return;
            }

            ctx.rule(span)
                .output(id, Attr::Type)
                .input(declaration.id, Attr::Declared)
                .by(move |ctx| {
                    let constructor = match ctx.get_type(0) {
                        Type::Class(class) => class
                            .find_member(CONSTRUCTOR_NAME)
                            .map(|(_, member)| member.node),
                        _ => None,
                    };

                    match constructor {
                        Some(constructor) => {
                            let span = ctx.span().clone();
                            copy_attr(
                                ctx.rule(span),
                                AttrKey::new(constructor, Attr::Type),
                                AttrKey::new(id, Attr::Type),
                            );
                        }
                        None => ctx.set(0, Type::Error),
                    }
                });
        });
}

/// `self` and `parent`.
fn check_receiver(checker: &mut TypeChecker, expr: &Expr, context: &Context, is_parent: bool) {
    let id = expr.id;
    let receiver = if is_parent { "parent" } else { "self" };

    let class = match (&context.function, &context.class) {
        (Some(function), Some(class)) if function.has_receiver() => class.id,
        _ => {
            checker.solver.report(
                SemanticError::ReceiverOutsideMethod {
                    receiver: receiver.to_string(),
                },
                expr.span.clone(),
            );
            checker.solver.poison(AttrKey::new(id, Attr::Type));
            return;
        }
    };

    checker
        .solver
        .rule(expr.span.clone())
        .output(id, Attr::Type)
        .input(class, Attr::Declared)
        .by(move |ctx| {
            let class = match ctx.get_type(0) {
                Type::Class(class) => class,
                _ => {
                    ctx.set(0, Type::Error);
                    return;
                }
            };

            if !is_parent {
                ctx.set(0, Type::Class(class));
                return;
            }

            match &class.superclass {
                Some(superclass) => ctx.set(0, Type::Class(superclass.clone())),
                None => {
                    let span = ctx.span().clone();
                    let class = class.name.clone();
                    ctx.error(SemanticError::NoParentClass { class }, span);
                }
            }
        });
}

fn check_assign(checker: &mut TypeChecker, expr: &Expr, target: &Expr, value: &Expr, context: &Context) {
    let id = expr.id;
    let inference = Inference::Attr(AttrKey::new(target.id, Attr::Type));

    let target_name = match &target.kind {
        ExprKind::Identifier(name) => Some(name.clone()),
        ExprKind::Index { .. } => None,
        ExprKind::SelfExpr | ExprKind::Parent => {
            let receiver = if matches!(target.kind, ExprKind::Parent) {
                "parent"
            } else {
                "self"
            };
            checker.solver.report(
                SemanticError::AssignToReceiver {
                    receiver: receiver.to_string(),
                },
                target.span.clone(),
            );
            check_expr(checker, target, &context.plain());
            check_expr(checker, value, &context.plain());
            checker.solver.poison(AttrKey::new(id, Attr::Type));
            return;
        }
        _ => {
            checker
                .solver
                .report(SemanticError::InvalidAssignmentTarget, target.span.clone());
            check_expr(checker, target, &context.plain());
            check_expr(checker, value, &context.plain());
            checker.solver.poison(AttrKey::new(id, Attr::Type));
            return;
        }
    };

    check_expr(checker, target, &context.plain());
    check_expr(checker, value, &context.with_inference(Some(inference)));

    let mut builder = checker
        .solver
        .rule(expr.span.clone())
        .output(id, Attr::Type)
        .input(target.id, Attr::Type)
        .input(value.id, Attr::Type);
    if target_name.is_some() {
        builder = builder.input(target.id, Attr::Ast);
    }

    builder.by(move |ctx| {
        let target = ctx.get_type(0);
        let value = ctx.get_type(1);
        let span = ctx.span().clone();

        if let (Some(name), Some(declaration)) = (target_name, ctx.get_decl(2)) {
            if declaration.kind == (DeclKind::Variable { constant: true }) {
                ctx.report(SemanticError::AssignToConstant { name }, span.clone());
            }
        }

        if !value.is_assignable_to(&target) {
            ctx.report(
                SemanticError::IncompatibleAssignment {
                    expected: target.to_string(),
                    found: value.to_string(),
                },
                span,
            );
        }

        ctx.set(0, target);
    });
}

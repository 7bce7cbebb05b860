use std::rc::Rc;

use tracing::debug;

use crate::{
    ast::{
        ast::NodeId,
        expressions::Expr,
        statements::{
            BlockStmt, ClassDeclStmt, FnDeclStmt, FunctionKind, PropertyDecl, Stmt, StmtKind,
            UsingStmt, VarDeclStmt,
        },
        types::TypeExpr,
    },
    errors::diagnostics::SemanticError,
    scope::scope::{DeclKind, Declaration, Scope},
    solver::solver::{Attr, AttrKey, Value},
    types::types::{ClassMember, ClassType, MemberKind, Type},
    Span,
};

use super::{
    expr::{check_expr, copy_attr},
    type_checker::{ClassContext, Context, FunctionContext, Inference, TypeChecker},
    type_expr::check_type_expr,
};

/// The `returns` attribute a statement contributes, if it is a return
/// container.
fn returns_key(stmt: &Stmt) -> Option<AttrKey> {
    if stmt.is_return_container() {
        Some(AttrKey::new(stmt.id, Attr::Returns))
    } else {
        None
    }
}

fn set_returns(checker: &mut TypeChecker, id: NodeId, returns: bool) {
    checker
        .solver
        .set_attr(id, Attr::Returns, Value::Bool(returns));
}

/// `returns` of `id` is the conjunction of `branches`; a branch that is not a
/// return container never returns.
fn returns_all(checker: &mut TypeChecker, id: NodeId, span: Span, branches: &[&Stmt]) {
    let keys: Option<Vec<AttrKey>> = branches.iter().map(|stmt| returns_key(stmt)).collect();

    match keys {
        Some(keys) => {
            let count = keys.len();
            checker
                .solver
                .rule(span)
                .output(id, Attr::Returns)
                .inputs(keys)
                .by(move |ctx| {
                    let returns = (0..count).all(|i| ctx.get_bool(i));
                    ctx.set(0, returns);
                });
        }
        None => set_returns(checker, id, false),
    }
}

/// Requires a boolean condition.
fn check_condition(checker: &mut TypeChecker, condition: &Expr, construct: &'static str) {
    checker
        .solver
        .rule(condition.span.clone())
        .input(condition.id, Attr::Type)
        .by(move |ctx| {
            let ty = ctx.get_type(0);
            if !ty.is_boolean() && !ty.is_error() {
                let span = ctx.span().clone();
                ctx.report(
                    SemanticError::NonBooleanCondition {
                        construct: construct.to_string(),
                        found: ty.to_string(),
                    },
                    span,
                );
            }
        });
}

pub fn check_stmt(checker: &mut TypeChecker, stmt: &Stmt, context: &Context) {
    let id = stmt.id;
    let span = stmt.span.clone();

    match &stmt.kind {
        StmtKind::Expression(expr) => check_expr(checker, expr, &context.plain()),
        StmtKind::Echo(value) => {
            check_expr(checker, value, &context.plain());
            checker
                .solver
                .rule(span)
                .input(value.id, Attr::Type)
                .by(|ctx| {
                    if ctx.get_type(0).is_void() {
                        let span = ctx.span().clone();
                        ctx.report(SemanticError::VoidEcho, span);
                    }
                });
        }
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            check_expr(checker, condition, &context.plain());
            check_condition(checker, condition, "If statement");
            check_stmt(checker, then_branch, context);

            match else_branch {
                Some(else_branch) => {
                    check_stmt(checker, else_branch, context);
                    returns_all(checker, id, span, &[&**then_branch, &**else_branch]);
                }
                None => set_returns(checker, id, false),
            }
        }
        StmtKind::While { condition, body } => {
            check_expr(checker, condition, &context.plain());
            check_condition(checker, condition, "While statement");
            check_stmt(checker, body, &context.in_loop());

            // Only `while true` can be relied on to never fall through.
            if condition.is_true_literal() {
                returns_all(checker, id, span, &[&**body]);
            } else {
                set_returns(checker, id, false);
            }
        }
        StmtKind::DoWhile { body, condition } => {
            check_stmt(checker, body, &context.in_loop());
            check_expr(checker, condition, &context.plain());
            check_condition(checker, condition, "Do-While statement");
            returns_all(checker, id, span, &[&**body]);
        }
        StmtKind::Break | StmtKind::Continue => {
            if !context.in_loop {
                let keyword = if matches!(stmt.kind, StmtKind::Break) {
                    "break"
                } else {
                    "continue"
                };
                checker.solver.report(
                    SemanticError::LoopControlOutsideLoop {
                        keyword: keyword.to_string(),
                    },
                    span,
                );
            }
        }
        StmtKind::Return(value) => check_return(checker, stmt, value.as_ref(), context),
        StmtKind::Assert { condition, message } => {
            check_expr(checker, condition, &context.plain());
            if let Some(message) = message {
                check_expr(checker, message, &context.plain());
            }

            checker
                .solver
                .rule(condition.span.clone())
                .input(condition.id, Attr::Type)
                .by(|ctx| {
                    let ty = ctx.get_type(0);
                    if !ty.is_boolean() && !ty.is_error() {
                        let span = ctx.span().clone();
                        let found = ty.to_string();
                        ctx.report(SemanticError::NonBooleanAssert { found }, span);
                    }
                });
        }
        StmtKind::Using(using) => check_using(checker, id, span, using, context),
        StmtKind::Block(block) => check_block(checker, block, context),
        StmtKind::Var(declaration) => check_var(checker, declaration, context),
        StmtKind::VarList(declarations) => {
            for declaration in declarations {
                check_var(checker, declaration, context);
            }
        }
        StmtKind::Function(function) => {
            let declaration = Declaration {
                id: function.id,
                name: function.name.clone(),
                kind: DeclKind::Function,
                span: function.span.clone(),
            };
            context.scope.declare(declaration);
            check_function(checker, function, context);
        }
        StmtKind::Class(class) => check_class(checker, class, context),
    }
}

/// Walks the statements of `block` in `context` and derives the block's
/// `returns` from its return containers.
pub fn check_block_body(checker: &mut TypeChecker, block: &BlockStmt, context: &Context) {
    for stmt in block.iter() {
        check_stmt(checker, stmt, context);
    }

    let keys: Vec<AttrKey> = block.iter().filter_map(returns_key).collect();
    let count = keys.len();
    checker
        .solver
        .rule(block.span.clone())
        .output(block.id, Attr::Returns)
        .inputs(keys)
        .by(move |ctx| {
            let returns = (0..count).any(|i| ctx.get_bool(i));
            ctx.set(0, returns);
        });
}

/// A block gets its own scope, so its declarations are not visible after it.
pub fn check_block(checker: &mut TypeChecker, block: &BlockStmt, context: &Context) {
    let scope = Scope::new(block.id, Some(context.scope.clone()));
    checker
        .solver
        .set_attr(block.id, Attr::Scope, Value::Scope(scope.clone()));

    check_block_body(checker, block, &context.with_scope(scope));
}

fn check_var(checker: &mut TypeChecker, declaration: &VarDeclStmt, context: &Context) {
    let id = declaration.id;
    let name = declaration.name.name.clone();

    if let Some(ty) = &declaration.name.ty {
        check_type_expr(checker, ty, context);
    }

    if let Some(value) = &declaration.value {
        let inference = declaration
            .name
            .ty
            .as_ref()
            .map(|ty| Inference::Attr(AttrKey::new(ty.id, Attr::Value)));
        check_expr(checker, value, &context.with_inference(inference));
    }

    // Declared after the initializer: `var a = a` does not see itself.
    context.scope.declare(Declaration {
        id,
        name: name.clone(),
        kind: DeclKind::Variable {
            constant: declaration.is_constant,
        },
        span: declaration.name.span.clone(),
    });

    check_initializer(
        checker,
        id,
        name,
        declaration.span.clone(),
        declaration.name.ty.as_ref(),
        declaration.value.as_ref(),
        true,
    );
}

/// Types a variable or property from its annotation and initializer.
///
/// Variables may additionally narrow integer collections, which is recorded
/// as a `cast`/`cast-key` hint instead of an error.
fn check_initializer(
    checker: &mut TypeChecker,
    id: NodeId,
    name: String,
    span: Span,
    ty: Option<&TypeExpr>,
    value: Option<&Expr>,
    allow_casts: bool,
) {
    match (ty, value) {
        (Some(ty), None) => copy_attr(
            checker.solver.rule(span),
            AttrKey::new(ty.id, Attr::Value),
            AttrKey::new(id, Attr::Type),
        ),
        (None, Some(value)) => {
            checker
                .solver
                .rule(span)
                .output(id, Attr::Type)
                .input(value.id, Attr::Type)
                .by(move |ctx| {
                    let found = ctx.get_type(0);
                    if found.is_void() {
                        let span = ctx.span().clone();
                        ctx.error(
                            SemanticError::IncompatibleInitializer {
                                name,
                                expected: String::from("a value"),
                                found: found.to_string(),
                            },
                            span,
                        );
                        return;
                    }
                    ctx.set(0, found);
                });
        }
        (Some(ty), Some(value)) => {
            checker
                .solver
                .rule(span)
                .output(id, Attr::Type)
                .input(ty.id, Attr::Value)
                .input(value.id, Attr::Type)
                .by(move |ctx| {
                    let expected = ctx.get_type(0);
                    let found = ctx.get_type(1);

                    let cast = match (&expected, &found) {
                        (Type::Array(to), Type::Array(from))
                            if allow_casts
                                && from.element.is_integer()
                                && to.element.is_numeric()
                                && to.element != from.element =>
                        {
                            Some((Attr::Cast, (*to.element).clone()))
                        }
                        (Type::Mapped(to), Type::Mapped(from))
                            if allow_casts
                                && from.key.is_integer()
                                && to.key.is_numeric()
                                && to.key != from.key
                                && from.value.is_assignable_to(&to.value) =>
                        {
                            Some((Attr::CastKey, (*to.key).clone()))
                        }
                        _ => None,
                    };

                    if let Some((attr, target)) = cast {
                        ctx.set_attr(id, attr, target);
                        ctx.set(0, expected);
                        return;
                    }

                    if !found.is_assignable_to(&expected) {
                        let span = ctx.span().clone();
                        ctx.report(
                            SemanticError::IncompatibleInitializer {
                                name,
                                expected: expected.to_string(),
                                found: found.to_string(),
                            },
                            span,
                        );
                    }
                    ctx.set(0, expected);
                });
        }
        // The parser rejects declarations with neither.
        (None, None) => {
            checker.solver.poison(AttrKey::new(id, Attr::Type));
        }
    }
}

fn check_return(checker: &mut TypeChecker, stmt: &Stmt, value: Option<&Expr>, context: &Context) {
    set_returns(checker, stmt.id, true);

    let function = context.function.clone();
    if let Some(value) = value {
        let inference = function
            .as_ref()
            .map(|function| Inference::Attr(AttrKey::new(function.return_type, Attr::Value)));
        check_expr(checker, value, &context.with_inference(inference));
    }

    let has_value = value.is_some();
    let Some(function) = function else {
        // Top-level code behaves like a void function.
        if has_value {
            checker
                .solver
                .report(SemanticError::ReturnValueInVoid, stmt.span.clone());
        }
        return;
    };

    if function.kind == FunctionKind::Constructor {
        if has_value {
            checker
                .solver
                .report(SemanticError::ReturnValueInConstructor, stmt.span.clone());
        }
        return;
    }

    let mut builder = checker
        .solver
        .rule(stmt.span.clone())
        .input(function.return_type, Attr::Value);
    if let Some(value) = value {
        builder = builder.input(value.id, Attr::Type);
    }

    builder.by(move |ctx| {
        let expected = ctx.get_type(0);
        let span = ctx.span().clone();

        if expected.is_error() {
            return;
        }

        match (expected.is_void(), has_value) {
            (true, true) => ctx.report(SemanticError::ReturnValueInVoid, span),
            (false, false) => ctx.report(SemanticError::MissingReturnValue, span),
            (true, false) => {}
            (false, true) => {
                let found = ctx.get_type(1);
                if !found.is_assignable_to(&expected) {
                    ctx.report(
                        SemanticError::IncompatibleReturn {
                            expected: expected.to_string(),
                            found: found.to_string(),
                        },
                        span,
                    );
                }
            }
        }
    });
}

fn check_using(checker: &mut TypeChecker, id: NodeId, span: Span, using: &UsingStmt, context: &Context) {
    check_expr(checker, &using.subject, &context.plain());

    for case in using.cases.iter() {
        for label in case.labels.iter() {
            check_expr(checker, label, &context.plain());

            checker
                .solver
                .rule(label.span.clone())
                .input(using.subject.id, Attr::Type)
                .input(label.id, Attr::Type)
                .by(|ctx| {
                    let subject = ctx.get_type(0);
                    let label = ctx.get_type(1);
                    if !label.is_comparable_to(&subject) {
                        let span = ctx.span().clone();
                        ctx.report(
                            SemanticError::IncomparableCase {
                                subject: subject.to_string(),
                                found: label.to_string(),
                            },
                            span,
                        );
                    }
                });
        }
        check_stmt(checker, &case.body, context);
    }

    match &using.default {
        Some(default) => {
            check_stmt(checker, default, context);

            let mut bodies: Vec<&Stmt> = using.cases.iter().map(|case| case.body.as_ref()).collect();
            bodies.push(default);
            returns_all(checker, id, span, &bodies);
        }
        None => set_returns(checker, id, false),
    }
}

/// Function, method or constructor declaration. The caller declares the name.
fn check_function(checker: &mut TypeChecker, function: &FnDeclStmt, context: &Context) {
    debug!(name = %function.name, id = %function.id, "checking function");

    let id = function.id;
    let scope = Scope::new(id, Some(context.scope.clone()));
    checker
        .solver
        .set_attr(id, Attr::Scope, Value::Scope(scope.clone()));

    let last = function.parameters.len().saturating_sub(1);
    for (index, parameter) in function.parameters.iter().enumerate() {
        let Some(ty) = &parameter.ty else {
            checker.solver.poison(AttrKey::new(parameter.id, Attr::Type));
            continue;
        };
        check_type_expr(checker, ty, context);

        // Inside the body a variadic parameter holds every trailing argument.
        let is_rest = function.is_variadic && index == last;
        checker
            .solver
            .rule(parameter.span.clone())
            .output(parameter.id, Attr::Type)
            .input(ty.id, Attr::Value)
            .by(move |ctx| {
                let ty = ctx.get_type(0);
                if is_rest {
                    ctx.set(0, Type::array(ty, 0));
                } else {
                    ctx.set(0, ty);
                }
            });

        scope.declare(Declaration {
            id: parameter.id,
            name: parameter.name.clone(),
            kind: DeclKind::Parameter,
            span: parameter.span.clone(),
        });
    }

    check_type_expr(checker, &function.return_type, context);
    check_signature(checker, function, context);

    let Some(body) = &function.body else {
        return;
    };

    let body_context = Context {
        scope,
        function: Some(FunctionContext {
            id,
            name: function.name.clone(),
            return_type: function.return_type.id,
            kind: function.kind,
        }),
        class: context.class.clone(),
        inference: None,
        in_loop: false,
    };
    check_block(checker, body, &body_context);

    if function.is_constructor() {
        return;
    }

    let name = function.name.clone();
    checker
        .solver
        .rule(function.span.clone())
        .input(function.return_type.id, Attr::Value)
        .input(body.id, Attr::Returns)
        .by(move |ctx| {
            let return_type = ctx.get_type(0);
            let returns = ctx.get_bool(1);

            if !return_type.is_void() && !return_type.is_error() && !returns {
                let span = ctx.span().clone();
                ctx.report(SemanticError::MissingReturn { name }, span);
            }
        });
}

/// Computes the `Def` type of a function from its annotations.
fn check_signature(checker: &mut TypeChecker, function: &FnDeclStmt, context: &Context) {
    let id = function.id;
    let is_variadic = function.is_variadic;
    let parameter_types: Vec<AttrKey> = function
        .parameters
        .iter()
        .filter_map(|parameter| parameter.ty.as_ref())
        .map(|ty| AttrKey::new(ty.id, Attr::Value))
        .collect();
    let count = parameter_types.len();

    let mut builder = checker
        .solver
        .rule(function.span.clone())
        .output(id, Attr::Type)
        .inputs(parameter_types)
        .input(function.return_type.id, Attr::Value);

    // A constructor returns an instance of its class.
    let class = match (&context.class, function.is_constructor()) {
        (Some(class), true) => {
            builder = builder.input(class.id, Attr::Declared);
            true
        }
        _ => false,
    };

    builder.by(move |ctx| {
        let parameters: Vec<Type> = (0..count).map(|i| ctx.get_type(i)).collect();
        let mut return_type = ctx.get_type(count);

        if class {
            if !return_type.is_void() && !return_type.is_error() {
                let span = ctx.span().clone();
                let found = return_type.to_string();
                ctx.report(SemanticError::ConstructorReturnType { found }, span);
            }
            return_type = ctx.get_type(count + 1);
        }

        ctx.set(0, Type::def(return_type, parameters, is_variadic));
    });
}

fn check_property(checker: &mut TypeChecker, property: &PropertyDecl, context: &Context) {
    if let Some(ty) = &property.name.ty {
        check_type_expr(checker, ty, context);
    }

    if let Some(value) = &property.value {
        let inference = property
            .name
            .ty
            .as_ref()
            .map(|ty| Inference::Attr(AttrKey::new(ty.id, Attr::Value)));
        check_expr(checker, value, &context.with_inference(inference));
    }

    check_initializer(
        checker,
        property.id,
        property.name.name.clone(),
        property.span.clone(),
        property.name.ty.as_ref(),
        property.value.as_ref(),
        false,
    );
}

fn check_class(checker: &mut TypeChecker, class: &ClassDeclStmt, context: &Context) {
    debug!(name = %class.name, id = %class.id, "checking class");

    let id = class.id;
    context.scope.declare(Declaration {
        id,
        name: class.name.clone(),
        kind: DeclKind::Class,
        span: class.span.clone(),
    });
    checker
        .solver
        .set_attr(id, Attr::Type, Value::Type(Type::Type));

    let scope = Scope::new(id, Some(context.scope.clone()));
    checker
        .solver
        .set_attr(id, Attr::Scope, Value::Scope(scope.clone()));

    if let Some(superclass) = &class.superclass {
        check_type_expr(checker, superclass, context);
    }
    check_class_type(checker, class);

    let class_context = Context {
        scope: scope.clone(),
        function: None,
        class: Some(ClassContext {
            id,
            name: class.name.clone(),
        }),
        inference: None,
        in_loop: false,
    };

    for property in class.properties.iter() {
        check_property(checker, property, &class_context);
    }

    for method in class.methods.iter() {
        scope.declare(Declaration {
            id: method.id,
            name: method.name.clone(),
            kind: DeclKind::Method,
            span: method.span.clone(),
        });
    }
    for method in class.methods.iter() {
        check_function(checker, method, &class_context);
    }
}

/// Builds the `declared` class type once the superclass is known.
fn check_class_type(checker: &mut TypeChecker, class: &ClassDeclStmt) {
    let id = class.id;
    let name = class.name.clone();

    let mut members: Vec<ClassMember> = class
        .properties
        .iter()
        .map(|property| ClassMember {
            name: property.name.name.clone(),
            node: property.id,
            kind: MemberKind::Property {
                is_static: property.is_static,
                is_constant: property.is_constant,
            },
        })
        .collect();
    members.extend(class.methods.iter().map(|method| ClassMember {
        name: method.name.clone(),
        node: method.id,
        kind: MemberKind::Method {
            is_static: matches!(method.kind, FunctionKind::Method { is_static: true }),
        },
    }));

    let mut builder = checker
        .solver
        .rule(class.span.clone())
        .output(id, Attr::Declared);
    let superclass_span = class.superclass.as_ref().map(|superclass| superclass.span.clone());
    if let Some(superclass) = &class.superclass {
        builder = builder.input(superclass.id, Attr::Value);
    }

    builder.by(move |ctx| {
        let superclass = match (superclass_span, ctx.get_type(0)) {
            (None, _) | (Some(_), Type::Error) => None,
            (Some(_), Type::Class(superclass)) => Some(superclass),
            (Some(span), other) => {
                ctx.report(
                    SemanticError::InvalidSuperclass {
                        class: name.clone(),
                        found: other.to_string(),
                    },
                    span,
                );
                None
            }
        };

        let class = ClassType {
            id,
            name,
            superclass,
            members,
        };
        ctx.set(0, Type::Class(Rc::new(class)));
    });
}

//! Resolution of type expressions to [`Type`] values.
//!
//! Type names are always resolved by a deferred rule: classes may be used
//! before their declaration.

use crate::{
    ast::types::{TypeExpr, TypeExprKind},
    errors::diagnostics::SemanticError,
    solver::solver::{Attr, Value},
    types::types::Type,
};

use super::type_checker::{Context, TypeChecker};

pub fn check_type_expr(checker: &mut TypeChecker, ty: &TypeExpr, context: &Context) {
    match &ty.kind {
        TypeExprKind::Id(name) => {
            let id = ty.id;
            let name = name.clone();
            let scope = context.scope.clone();

            checker
                .solver
                .rule(ty.span.clone())
                .output(id, Attr::Value)
                .output(id, Attr::Ast)
                .output(id, Attr::Scope)
                .by(move |ctx| {
                    let Some(found) = scope.lookup(&name) else {
                        let span = ctx.span().clone();
                        ctx.error(SemanticError::UnresolvedType { name }, span);
                        return;
                    };

                    if !found.declaration.kind.is_type_declaration() {
                        let span = ctx.span().clone();
                        let kind = found.declaration.kind.to_string();
                        ctx.error(SemanticError::NotATypeDeclaration { name, kind }, span);
                        return;
                    }

                    let declaration = found.declaration.id;
                    ctx.set(1, Value::Decl(found.declaration));
                    ctx.set(2, Value::Scope(found.scope));

                    let span = ctx.span().clone();
                    ctx.rule(span)
                        .output(id, Attr::Value)
                        .input(declaration, Attr::Declared)
                        .by(|ctx| {
                            let declared = ctx.get_type(0);
                            ctx.set(0, declared);
                        });
                });
        }
        TypeExprKind::Array(element) => {
            check_type_expr(checker, element, context);

            checker
                .solver
                .rule(ty.span.clone())
                .output(ty.id, Attr::Value)
                .input(element.id, Attr::Value)
                .by(|ctx| {
                    let element = ctx.get_type(0);
                    ctx.set(0, Type::array(element, 0));
                });
        }
        TypeExprKind::Map { key, value } => {
            check_type_expr(checker, key, context);
            check_type_expr(checker, value, context);

            checker
                .solver
                .rule(ty.span.clone())
                .output(ty.id, Attr::Value)
                .input(key.id, Attr::Value)
                .input(value.id, Attr::Value)
                .by(|ctx| {
                    let mapped = Type::mapped(ctx.get_type(0), ctx.get_type(1));
                    ctx.set(0, mapped);
                });
        }
        TypeExprKind::Void => {
            checker
                .solver
                .set_attr(ty.id, Attr::Value, Value::Type(Type::Void));
        }
    }
}

//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Variable declarations
//! - Function and class declarations
//! - Expressions and operator precedence
//! - Desugaring of compound assignment and increments
//! - Control flow statements
//! - Parse errors

use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::parser::parse;
use crate::{
    ast::{
        expressions::{BinaryOp, Expr, ExprKind, LogicalOp, UnaryOp},
        statements::{BlockStmt, FunctionKind, Stmt, StmtKind, CONSTRUCTOR_NAME},
        types::TypeExprKind,
    },
    errors::errors::Error,
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<BlockStmt, Error> {
    let tokens = tokenize(source.to_string(), Some("test.rem".to_string())).unwrap();
    let (_, result) = parse(tokens, Rc::new("test.rem".to_string()));
    result
}

fn parse_ok(source: &str) -> BlockStmt {
    parse_source(source).unwrap()
}

fn first_stmt(source: &str) -> Stmt {
    parse_ok(source).body.into_iter().next().unwrap()
}

fn first_expr(source: &str) -> Expr {
    match first_stmt(source).kind {
        StmtKind::Expression(expr) => expr,
        other => panic!("expected an expression statement, got {:?}", other),
    }
}

fn error_name(source: &str) -> String {
    parse_source(source).unwrap_err().get_error_name().to_string()
}

#[test]
fn test_parse_variable_declaration() {
    let stmt = first_stmt("var x: i32 = 42");

    match stmt.kind {
        StmtKind::Var(declaration) => {
            assert_eq!(declaration.id, stmt.id);
            assert_eq!(declaration.name.name, "x");
            assert!(!declaration.is_constant);
            assert_eq!(
                declaration.name.ty.map(|ty| ty.kind),
                Some(TypeExprKind::Id("i32".to_string()))
            );
            assert_eq!(declaration.value.map(|value| value.kind), Some(ExprKind::Int32(42)));
        }
        other => panic!("expected a var declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_var_list() {
    let stmt = first_stmt("var a = 1, b: f64 = 2.5");

    match stmt.kind {
        StmtKind::VarList(declarations) => {
            assert_eq!(declarations.len(), 2);
            assert_eq!(declarations[0].name.name, "a");
            assert_eq!(declarations[1].name.name, "b");
            assert_eq!(
                declarations[1].value.as_ref().map(|value| value.kind.clone()),
                Some(ExprKind::Float64(2.5))
            );
        }
        other => panic!("expected a var list, got {:?}", other),
    }
}

#[test]
fn test_parse_const_declaration() {
    match first_stmt("const PI = 3.14").kind {
        StmtKind::Var(declaration) => assert!(declaration.is_constant),
        other => panic!("expected a const declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_declaration_errors() {
    assert_eq!(error_name("const c: i32"), "ConstantWithoutValue");
    assert_eq!(error_name("var a"), "ExpectedExplicitValue");
    assert_eq!(error_name("var 1 = 2"), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_number_literals() {
    assert_eq!(first_expr("7").kind, ExprKind::Int32(7));
    assert_eq!(first_expr("3000000000").kind, ExprKind::Int64(3_000_000_000));
    assert_eq!(first_expr("1.5").kind, ExprKind::Float64(1.5));
    assert_eq!(error_name("99999999999999999999"), "NumberParseError");
}

#[test]
fn test_parse_precedence() {
    // 1 + 2 * 3  =>  1 + (2 * 3)
    match first_expr("1 + 2 * 3").kind {
        ExprKind::Binary {
            left,
            operator,
            right,
        } => {
            assert_eq!(operator, BinaryOp::Add);
            assert_eq!(left.kind, ExprKind::Int32(1));
            assert!(matches!(
                right.kind,
                ExprKind::Binary {
                    operator: BinaryOp::Multiply,
                    ..
                }
            ));
        }
        other => panic!("expected a binary expression, got {:?}", other),
    }
}

#[test]
fn test_parse_left_associativity() {
    // 1 - 2 - 3  =>  (1 - 2) - 3
    match first_expr("1 - 2 - 3").kind {
        ExprKind::Binary { left, right, .. } => {
            assert!(matches!(left.kind, ExprKind::Binary { .. }));
            assert_eq!(right.kind, ExprKind::Int32(3));
        }
        other => panic!("expected a binary expression, got {:?}", other),
    }
}

#[test]
fn test_parse_logical_and_comparison() {
    match first_expr("a < b and c or d").kind {
        ExprKind::Logical { left, operator, .. } => {
            assert_eq!(operator, LogicalOp::Or);
            match left.kind {
                ExprKind::Logical { left, operator, .. } => {
                    assert_eq!(operator, LogicalOp::And);
                    assert!(matches!(
                        left.kind,
                        ExprKind::Logical {
                            operator: LogicalOp::Less,
                            ..
                        }
                    ));
                }
                other => panic!("expected 'and', got {:?}", other),
            }
        }
        other => panic!("expected 'or', got {:?}", other),
    }
}

#[test]
fn test_parse_unary() {
    match first_expr("-x * 2").kind {
        ExprKind::Binary { left, .. } => assert!(matches!(
            left.kind,
            ExprKind::Unary {
                operator: UnaryOp::Negate,
                ..
            }
        )),
        other => panic!("expected a binary expression, got {:?}", other),
    }
    assert!(matches!(
        first_expr("!done").kind,
        ExprKind::Unary {
            operator: UnaryOp::Not,
            ..
        }
    ));
    assert!(matches!(
        first_expr("~mask").kind,
        ExprKind::Unary {
            operator: UnaryOp::BitNot,
            ..
        }
    ));
}

#[test]
fn test_parse_assignment_is_right_associative() {
    match first_expr("a = b = 1").kind {
        ExprKind::Assign { target, value } => {
            assert_eq!(target.kind, ExprKind::Identifier("a".to_string()));
            assert!(matches!(value.kind, ExprKind::Assign { .. }));
        }
        other => panic!("expected an assignment, got {:?}", other),
    }
}

#[test]
fn test_parse_field_assignment_is_set() {
    match first_expr("p.x = 3").kind {
        ExprKind::Set { object, name, value } => {
            assert_eq!(object.kind, ExprKind::Identifier("p".to_string()));
            assert_eq!(name, "x");
            assert_eq!(value.kind, ExprKind::Int32(3));
        }
        other => panic!("expected a set, got {:?}", other),
    }
}

#[test]
fn test_parse_increment_desugars() {
    let expr = first_expr("x++");

    match expr.kind {
        ExprKind::Assign { target, value } => {
            assert_eq!(target.kind, ExprKind::Identifier("x".to_string()));
            match value.kind {
                ExprKind::Binary {
                    left,
                    operator,
                    right,
                } => {
                    assert_eq!(operator, BinaryOp::Add);
                    assert_eq!(left.kind, ExprKind::Identifier("x".to_string()));
                    // Same span, fresh identity.
                    assert_eq!(left.span, target.span);
                    assert_ne!(left.id, target.id);
                    assert_eq!(right.kind, ExprKind::Int32(1));
                }
                other => panic!("expected a binary expression, got {:?}", other),
            }
        }
        other => panic!("expected an assignment, got {:?}", other),
    }
}

#[test]
fn test_parse_compound_assignment_desugars() {
    match first_expr("o.count *= 2").kind {
        ExprKind::Set { name, value, .. } => {
            assert_eq!(name, "count");
            match value.kind {
                ExprKind::Binary { left, operator, .. } => {
                    assert_eq!(operator, BinaryOp::Multiply);
                    assert!(matches!(left.kind, ExprKind::Get { .. }));
                }
                other => panic!("expected a binary expression, got {:?}", other),
            }
        }
        other => panic!("expected a set, got {:?}", other),
    }
}

#[test]
fn test_parse_conditional() {
    match first_expr("a ? 1 : b ? 2 : 3").kind {
        ExprKind::Condition { truthy, falsy, .. } => {
            assert_eq!(truthy.kind, ExprKind::Int32(1));
            assert!(matches!(falsy.kind, ExprKind::Condition { .. }));
        }
        other => panic!("expected a conditional, got {:?}", other),
    }
}

#[test]
fn test_parse_call_index_and_member() {
    match first_expr("f(1, 2)[0].length").kind {
        ExprKind::Get { object, name } => {
            assert_eq!(name, "length");
            match object.kind {
                ExprKind::Index { callee, argument } => {
                    assert_eq!(argument.kind, ExprKind::Int32(0));
                    match callee.kind {
                        ExprKind::Call { arguments, .. } => assert_eq!(arguments.len(), 2),
                        other => panic!("expected a call, got {:?}", other),
                    }
                }
                other => panic!("expected an index, got {:?}", other),
            }
        }
        other => panic!("expected a member access, got {:?}", other),
    }
}

#[test]
fn test_parse_array_and_dict_literals() {
    match first_expr("[1, 2, 3]").kind {
        ExprKind::Array(items) => assert_eq!(items.len(), 3),
        other => panic!("expected an array, got {:?}", other),
    }
    match first_expr("[]").kind {
        ExprKind::Array(items) => assert!(items.is_empty()),
        other => panic!("expected an array, got {:?}", other),
    }

    let stmt = first_stmt("var d = {1: 2.0, 3: 4.0}");
    match stmt.kind {
        StmtKind::Var(declaration) => match declaration.value.map(|value| value.kind) {
            Some(ExprKind::Dict(entries)) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[1].0.kind, ExprKind::Int32(3));
            }
            other => panic!("expected a dict, got {:?}", other),
        },
        other => panic!("expected a var declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_new_expression() {
    let expr = first_expr("new Point(1, 2)");

    match expr.kind {
        ExprKind::Call { callee, arguments } => {
            assert_eq!(arguments.len(), 2);
            match callee.kind {
                ExprKind::New(class) => {
                    assert_eq!(class.kind, ExprKind::Identifier("Point".to_string()));
                    assert_eq!(class.span, callee.span);
                }
                other => panic!("expected new, got {:?}", other),
            }
        }
        other => panic!("expected a call, got {:?}", other),
    }
}

#[test]
fn test_parse_function_declaration() {
    let stmt = first_stmt("fn add(a: i32, b: i32) -> i32 { return a + b; }");

    match stmt.kind {
        StmtKind::Function(function) => {
            assert_eq!(function.id, stmt.id);
            assert_eq!(function.name, "add");
            assert_eq!(function.parameters.len(), 2);
            assert_eq!(function.kind, FunctionKind::Function);
            assert!(!function.is_variadic);
            assert_eq!(function.return_type.kind, TypeExprKind::Id("i32".to_string()));
            assert_eq!(function.body.map(|body| body.body.len()), Some(1));
        }
        other => panic!("expected a function, got {:?}", other),
    }
}

#[test]
fn test_parse_function_return_type_forms() {
    for source in ["def f() i32 { return 1 }", "fn f() -> i32 { return 1 }"] {
        match first_stmt(source).kind {
            StmtKind::Function(function) => {
                assert_eq!(function.return_type.kind, TypeExprKind::Id("i32".to_string()))
            }
            other => panic!("expected a function, got {:?}", other),
        }
    }

    match first_stmt("fn f() { }").kind {
        StmtKind::Function(function) => assert_eq!(function.return_type.kind, TypeExprKind::Void),
        other => panic!("expected a function, got {:?}", other),
    }
}

#[test]
fn test_parse_variadic_parameters() {
    match first_stmt("fn sum(first: i32, ...rest: i32) -> i32 { return first }").kind {
        StmtKind::Function(function) => {
            assert!(function.is_variadic);
            assert_eq!(function.parameters[1].name, "rest");
        }
        other => panic!("expected a function, got {:?}", other),
    }

    assert_eq!(error_name("fn f(...a: i32, b: i32) { }"), "VariadicNotLast");
}

#[test]
fn test_parse_extern_declaration() {
    match first_stmt("extern fn puts(value: i32) -> i32").kind {
        StmtKind::Function(function) => {
            assert_eq!(function.kind, FunctionKind::Extern);
            assert!(function.body.is_none());
        }
        other => panic!("expected an extern function, got {:?}", other),
    }
}

#[test]
fn test_parse_type_expressions() {
    match first_stmt("var m: [i32][]f64 = {}").kind {
        StmtKind::Var(declaration) => match declaration.name.ty.map(|ty| ty.kind) {
            Some(TypeExprKind::Map { key, value }) => {
                assert_eq!(key.kind, TypeExprKind::Id("i32".to_string()));
                assert!(matches!(value.kind, TypeExprKind::Array(_)));
            }
            other => panic!("expected a map type, got {:?}", other),
        },
        other => panic!("expected a var declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_class_declaration() {
    let source = "class Dog < Animal {
        var name: i32 = 0
        static const legs: i32 = 4
        fn bark() -> i32 { return 1 }
        static speak() { }
    }";

    match first_stmt(source).kind {
        StmtKind::Class(class) => {
            assert_eq!(class.name, "Dog");
            assert_eq!(
                class.superclass.map(|ty| ty.kind),
                Some(TypeExprKind::Id("Animal".to_string()))
            );
            assert_eq!(class.properties.len(), 2);
            assert!(class.properties[1].is_static);
            assert!(class.properties[1].is_constant);

            // A default constructor is added after the written methods.
            assert_eq!(class.methods.len(), 3);
            assert_eq!(class.methods[0].kind, FunctionKind::Method { is_static: false });
            assert_eq!(class.methods[1].kind, FunctionKind::Method { is_static: true });
            assert_eq!(class.methods[2].name, CONSTRUCTOR_NAME);
            assert!(class.methods[2].is_constructor());
        }
        other => panic!("expected a class, got {:?}", other),
    }
}

#[test]
fn test_parse_explicit_constructor() {
    match first_stmt("class P { var x: i32 = 0; @new(x: i32) { self.x = x } }").kind {
        StmtKind::Class(class) => {
            assert_eq!(class.methods.len(), 1);
            assert!(class.methods[0].is_constructor());
            assert_eq!(class.methods[0].parameters.len(), 1);
        }
        other => panic!("expected a class, got {:?}", other),
    }
}

#[test]
fn test_parse_if_else_statement() {
    let stmt = first_stmt("if x > 0 { return 1 } else { return 2 }");

    match stmt.kind {
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            assert!(matches!(then_branch.kind, StmtKind::Block(_)));
            assert!(else_branch.is_some());
        }
        other => panic!("expected an if statement, got {:?}", other),
    }
}

#[test]
fn test_parse_loops() {
    assert!(matches!(
        first_stmt("while x < 10 { x = x + 1; }").kind,
        StmtKind::While { .. }
    ));
    assert!(matches!(
        first_stmt("do { x++ } while x < 10").kind,
        StmtKind::DoWhile { .. }
    ));
    match first_stmt("while true { break; continue }").kind {
        StmtKind::While { condition, body } => {
            assert!(condition.is_true_literal());
            match body.kind {
                StmtKind::Block(block) => {
                    assert!(matches!(block.body[0].kind, StmtKind::Break));
                    assert!(matches!(block.body[1].kind, StmtKind::Continue));
                }
                other => panic!("expected a block, got {:?}", other),
            }
        }
        other => panic!("expected a while loop, got {:?}", other),
    }
}

#[test]
fn test_parse_return_forms() {
    match first_stmt("fn f() { return }").kind {
        StmtKind::Function(function) => {
            let body = function.body.unwrap();
            assert!(matches!(body.body[0].kind, StmtKind::Return(None)));
        }
        other => panic!("expected a function, got {:?}", other),
    }
}

#[test]
fn test_parse_assert_echo_and_using() {
    assert!(matches!(
        first_stmt("assert x == 1, 2").kind,
        StmtKind::Assert {
            message: Some(_),
            ..
        }
    ));
    assert!(matches!(first_stmt("echo 1 + 2").kind, StmtKind::Echo(_)));

    match first_stmt("using x { when 1, 2 echo 1 when 3 { } default echo 0 }").kind {
        StmtKind::Using(using) => {
            assert_eq!(using.cases.len(), 2);
            assert_eq!(using.cases[0].labels.len(), 2);
            assert!(using.default.is_some());
        }
        other => panic!("expected a using statement, got {:?}", other),
    }
}

#[test]
fn test_parse_optional_semicolons() {
    let block = parse_ok(";; var a = 1;; var b = 2\nvar c = 3;");
    assert_eq!(block.body.len(), 3);
}

#[test]
fn test_parse_node_ids_are_unique() {
    let block = parse_ok("var a = 1 + 2; fn f(x: i32) -> i32 { return x }");

    let mut ids = vec![block.id];
    for stmt in block.iter() {
        ids.push(stmt.id);
        match &stmt.kind {
            StmtKind::Var(declaration) => {
                ids.push(declaration.name.id);
                if let Some(value) = &declaration.value {
                    ids.push(value.id);
                }
            }
            StmtKind::Function(function) => {
                ids.push(function.return_type.id);
                ids.extend(function.parameters.iter().map(|parameter| parameter.id));
            }
            _ => {}
        }
    }

    let count = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), count);
    assert!(ids.iter().all(|id| id.0 >= 1024));
}

#[test]
fn test_parse_errors() {
    assert_eq!(error_name("var a = (1 + 2"), "UnexpectedEndOfFile");
    assert_eq!(error_name("fn (a: i32) { }"), "UnexpectedTokenDetailed");
    assert_eq!(error_name("1 +"), "UnexpectedEndOfFile");
    assert_eq!(error_name(")"), "UnexpectedToken");
}

#[test]
fn test_parse_empty_source() {
    assert!(parse_ok("").body.is_empty());
}

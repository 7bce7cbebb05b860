//! Unit tests for scopes.

use pretty_assertions::assert_eq;

use crate::{ast::ast::NodeId, Span};

use super::scope::{DeclKind, Declaration, Scope, BUILTINS};

fn variable(id: u32, name: &str) -> Declaration {
    Declaration {
        id: NodeId(id),
        name: name.to_string(),
        kind: DeclKind::Variable { constant: false },
        span: Span::null(),
    }
}

#[test]
fn test_root_scope_holds_builtins() {
    let root = Scope::root();

    assert_eq!(root.owner, NodeId::ROOT);
    assert_eq!(root.len(), BUILTINS.len());

    let i32_decl = root.lookup_local("i32").unwrap();
    assert_eq!(i32_decl.kind, DeclKind::BuiltinType);
    assert!(i32_decl.kind.is_type_declaration());

    let nil = root.lookup_local("nil").unwrap();
    assert_eq!(nil.kind, DeclKind::BuiltinConstant);
    assert!(!nil.kind.is_type_declaration());
}

#[test]
fn test_builtin_ids_are_reserved() {
    for builtin in BUILTINS.iter() {
        assert!(builtin.id.0 > 0);
        assert!(builtin.id.0 < NodeId::FIRST_PARSED);
    }
}

#[test]
fn test_declare_is_last_write_wins() {
    let scope = Scope::new(NodeId(1024), None);

    scope.declare(variable(1025, "a"));
    scope.declare(variable(1030, "a"));

    assert_eq!(scope.len(), 1);
    assert_eq!(scope.lookup_local("a").unwrap().id, NodeId(1030));
}

#[test]
fn test_lookup_walks_parents() {
    let root = Scope::root();
    let outer = Scope::new(NodeId(1024), Some(root.clone()));
    let inner = Scope::new(NodeId(1040), Some(outer.clone()));

    outer.declare(variable(1025, "a"));

    let found = inner.lookup("a").unwrap();
    assert_eq!(found.declaration.id, NodeId(1025));
    assert_eq!(found.scope, outer);

    let builtin = inner.lookup("bool").unwrap();
    assert_eq!(builtin.scope, root);

    assert!(inner.lookup("missing").is_none());
    assert!(inner.lookup_local("a").is_none());
    assert_eq!(inner.depth(), 2);
}

#[test]
fn test_inner_declaration_hides_outer() {
    let outer = Scope::new(NodeId(1024), None);
    let inner = Scope::new(NodeId(1040), Some(outer.clone()));

    outer.declare(variable(1025, "a"));
    inner.declare(variable(1041, "a"));

    assert_eq!(inner.lookup("a").unwrap().declaration.id, NodeId(1041));
    assert_eq!(outer.lookup("a").unwrap().declaration.id, NodeId(1025));
}

#[test]
fn test_scope_handles_compare_by_owner() {
    let a = Scope::new(NodeId(1024), None);
    let b = Scope::new(NodeId(1024), None);
    let c = Scope::new(NodeId(1025), None);

    assert_eq!(a, b);
    assert!(a != c);
}

#[test]
fn test_decl_kind_display() {
    assert_eq!(DeclKind::Variable { constant: false }.to_string(), "variable");
    assert_eq!(DeclKind::Variable { constant: true }.to_string(), "constant");
    assert_eq!(DeclKind::Function.to_string(), "function");
}

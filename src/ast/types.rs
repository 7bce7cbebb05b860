//! Type expressions as written in source.
//!
//! These are syntax only; the analyzer resolves each one to a
//! [`crate::types::Type`] stored in the node's `value` attribute.

use crate::Span;

use super::ast::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub id: NodeId,
    pub span: Span,
    pub kind: TypeExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    /// A named type: a builtin or a class.
    Id(String),
    /// `[]T`
    Array(Box<TypeExpr>),
    /// `[K]V`
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// Stands in for an omitted return type.
    Void,
}

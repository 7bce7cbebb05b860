use std::fmt::Display;

use crate::Span;

/// Stable identity of a syntax node, used as the node half of an attribute key.
///
/// The parser hands out ids starting at 1024; lower values are reserved for
/// the root scope (0) and the builtin declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Owner of the root scope.
    pub const ROOT: NodeId = NodeId(0);
    /// First id available to parsed nodes.
    pub const FIRST_PARSED: u32 = 1024;
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Common accessors shared by every node family.
pub trait Node {
    fn id(&self) -> NodeId;
    fn span(&self) -> &Span;
}

macro_rules! impl_node {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Node for $ty {
                fn id(&self) -> NodeId {
                    self.id
                }
                fn span(&self) -> &Span {
                    &self.span
                }
            }
        )*
    };
}

impl_node!(
    super::expressions::Expr,
    super::statements::Stmt,
    super::statements::BlockStmt,
    super::statements::VarDeclStmt,
    super::statements::FnDeclStmt,
    super::statements::ClassDeclStmt,
    super::statements::PropertyDecl,
    super::statements::TypedName,
    super::types::TypeExpr,
);

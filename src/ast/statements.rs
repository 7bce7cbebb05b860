use std::slice::Iter;

use crate::Span;

use super::{ast::NodeId, expressions::Expr, types::TypeExpr};

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub id: NodeId,
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expression(Expr),
    Echo(Expr),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    Assert {
        condition: Expr,
        message: Option<Expr>,
    },
    Using(UsingStmt),
    // The variants below share their id with the wrapping `Stmt`.
    Block(BlockStmt),
    Var(VarDeclStmt),
    VarList(Vec<VarDeclStmt>),
    Function(FnDeclStmt),
    Class(ClassDeclStmt),
}

impl Stmt {
    /// Statements whose `returns` attribute feeds the enclosing block.
    pub fn is_return_container(&self) -> bool {
        matches!(
            self.kind,
            StmtKind::Block(_)
                | StmtKind::If { .. }
                | StmtKind::Return(_)
                | StmtKind::While { .. }
                | StmtKind::DoWhile { .. }
                | StmtKind::Using(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub id: NodeId,
    pub span: Span,
    pub body: Vec<Stmt>,
}

impl BlockStmt {
    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.body.iter()
    }
}

/// A name with an optional type annotation: a parameter or the left side of
/// a `var` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedName {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
    pub ty: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclStmt {
    pub id: NodeId,
    pub span: Span,
    pub name: TypedName,
    pub value: Option<Expr>,
    pub is_constant: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Function,
    Extern,
    Method { is_static: bool },
    Constructor,
}

/// Name the parser gives every class constructor.
pub const CONSTRUCTOR_NAME: &str = "@new";

#[derive(Debug, Clone, PartialEq)]
pub struct FnDeclStmt {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
    pub parameters: Vec<TypedName>,
    pub return_type: TypeExpr,
    /// `None` only for `extern` declarations.
    pub body: Option<BlockStmt>,
    pub is_variadic: bool,
    pub kind: FunctionKind,
}

impl FnDeclStmt {
    pub fn is_constructor(&self) -> bool {
        self.kind == FunctionKind::Constructor
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: TypedName,
    pub value: Option<Expr>,
    pub is_static: bool,
    pub is_constant: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclStmt {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
    pub superclass: Option<TypeExpr>,
    pub properties: Vec<PropertyDecl>,
    pub methods: Vec<FnDeclStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsingCase {
    pub labels: Vec<Expr>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsingStmt {
    pub subject: Expr,
    pub cases: Vec<UsingCase>,
    pub default: Option<Box<Stmt>>,
}

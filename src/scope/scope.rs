use std::{cell::RefCell, fmt::Display, rc::Rc};

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::{ast::ast::NodeId, types::types::TypeKind, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    BuiltinType,
    BuiltinConstant,
    Variable { constant: bool },
    Parameter,
    Function,
    Method,
    Class,
}

impl DeclKind {
    /// Whether a name with this kind may appear where a type is expected.
    pub fn is_type_declaration(&self) -> bool {
        matches!(self, DeclKind::BuiltinType | DeclKind::Class)
    }
}

impl Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DeclKind::BuiltinType => "builtin type",
            DeclKind::BuiltinConstant => "builtin constant",
            DeclKind::Variable { constant: true } => "constant",
            DeclKind::Variable { constant: false } => "variable",
            DeclKind::Parameter => "parameter",
            DeclKind::Function => "function",
            DeclKind::Method => "method",
            DeclKind::Class => "class",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Declaration {
    /// The declaring node; its `type` attribute is the type of the name.
    pub id: NodeId,
    pub name: String,
    pub kind: DeclKind,
    pub span: Span,
}

#[derive(Debug)]
pub struct Scope {
    pub owner: NodeId,
    parent: Option<ScopeRef>,
    declarations: RefCell<FxHashMap<String, Declaration>>,
}

/// Shared handle to a scope.
///
/// Handles compare by owning node, so re-analysing a tree produces scopes
/// equal to the ones of the previous run.
#[derive(Debug, Clone)]
pub struct ScopeRef(Rc<Scope>);

impl PartialEq for ScopeRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.owner == other.0.owner
    }
}

impl Eq for ScopeRef {}

impl std::ops::Deref for ScopeRef {
    type Target = Scope;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Result of a successful lookup: the declaration and the scope holding it.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationContext {
    pub scope: ScopeRef,
    pub declaration: Declaration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    /// A type name; the kind is the type it denotes.
    Type(TypeKind),
    /// A literal name; the kind is its value's type.
    Constant(TypeKind),
}

pub struct Builtin {
    pub name: &'static str,
    pub id: NodeId,
    pub kind: BuiltinKind,
}

lazy_static! {
    pub static ref BUILTINS: Vec<Builtin> = {
        let table = [
            ("bool", BuiltinKind::Type(TypeKind::Bool)),
            ("i8", BuiltinKind::Type(TypeKind::I8)),
            ("i16", BuiltinKind::Type(TypeKind::I16)),
            ("i32", BuiltinKind::Type(TypeKind::I32)),
            ("i64", BuiltinKind::Type(TypeKind::I64)),
            ("i128", BuiltinKind::Type(TypeKind::I128)),
            ("f32", BuiltinKind::Type(TypeKind::F32)),
            ("f64", BuiltinKind::Type(TypeKind::F64)),
            ("f128", BuiltinKind::Type(TypeKind::F128)),
            ("void", BuiltinKind::Type(TypeKind::Void)),
            ("type", BuiltinKind::Type(TypeKind::Type)),
            ("true", BuiltinKind::Constant(TypeKind::Bool)),
            ("false", BuiltinKind::Constant(TypeKind::Bool)),
            ("nil", BuiltinKind::Constant(TypeKind::Nil)),
        ];

        table
            .into_iter()
            .enumerate()
            .map(|(i, (name, kind))| Builtin {
                name,
                id: NodeId(i as u32 + 1),
                kind,
            })
            .collect()
    };
}

impl Scope {
    pub fn new(owner: NodeId, parent: Option<ScopeRef>) -> ScopeRef {
        ScopeRef(Rc::new(Scope {
            owner,
            parent,
            declarations: RefCell::new(FxHashMap::default()),
        }))
    }

    /// The root scope, owned by [`NodeId::ROOT`], holding every builtin name.
    pub fn root() -> ScopeRef {
        let root = Scope::new(NodeId::ROOT, None);

        for builtin in BUILTINS.iter() {
            let kind = match builtin.kind {
                BuiltinKind::Type(_) => DeclKind::BuiltinType,
                BuiltinKind::Constant(_) => DeclKind::BuiltinConstant,
            };
            root.declare(Declaration {
                id: builtin.id,
                name: builtin.name.to_string(),
                kind,
                span: Span::null(),
            });
        }

        root
    }

    pub fn parent(&self) -> Option<&ScopeRef> {
        self.parent.as_ref()
    }

    /// Adds a declaration, replacing any previous one of the same name in
    /// this scope.
    pub fn declare(&self, declaration: Declaration) {
        self.declarations
            .borrow_mut()
            .insert(declaration.name.clone(), declaration);
    }

    pub fn lookup_local(&self, name: &str) -> Option<Declaration> {
        self.declarations.borrow().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.declarations.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.borrow().is_empty()
    }
}

impl ScopeRef {
    /// Walks from this scope out to the root and returns the first match.
    pub fn lookup(&self, name: &str) -> Option<DeclarationContext> {
        let mut current = Some(self);

        while let Some(scope) = current {
            if let Some(declaration) = scope.lookup_local(name) {
                return Some(DeclarationContext {
                    scope: scope.clone(),
                    declaration,
                });
            }
            current = scope.parent();
        }

        None
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(scope) = current {
            depth += 1;
            current = scope.parent();
        }
        depth
    }
}

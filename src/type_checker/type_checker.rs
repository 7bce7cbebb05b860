use tracing::debug;

use crate::{
    ast::{
        ast::NodeId,
        statements::{BlockStmt, FunctionKind},
    },
    errors::diagnostics::Diagnostic,
    scope::scope::{BuiltinKind, Scope, ScopeRef, BUILTINS},
    solver::solver::{Attr, AttrKey, Solver, SolverConfig, Value},
    types::types::Type,
};

use super::stmt::check_block_body;

/// The function or method whose body is being walked.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionContext {
    pub id: NodeId,
    pub name: String,
    /// Type expression holding the declared return type.
    pub return_type: NodeId,
    pub kind: FunctionKind,
}

impl FunctionContext {
    /// Whether `self` and `parent` are available.
    pub fn has_receiver(&self) -> bool {
        matches!(
            self.kind,
            FunctionKind::Method { is_static: false } | FunctionKind::Constructor
        )
    }
}

/// The class whose body is being walked.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassContext {
    pub id: NodeId,
    pub name: String,
}

/// Where an empty collection literal takes its type from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Inference {
    /// The type held by an attribute, e.g. a declared variable type.
    Attr(AttrKey),
    /// Parameter `index` of the function type of `callee`.
    Parameter { callee: NodeId, index: usize },
}

/// State handed down the traversal.
///
/// A visitor that needs a different scope or enclosing declaration builds a
/// new context for its children rather than mutating this one.
#[derive(Debug, Clone)]
pub struct Context {
    pub scope: ScopeRef,
    pub function: Option<FunctionContext>,
    pub class: Option<ClassContext>,
    pub inference: Option<Inference>,
    pub in_loop: bool,
}

impl Context {
    pub fn new(scope: ScopeRef) -> Self {
        Context {
            scope,
            function: None,
            class: None,
            inference: None,
            in_loop: false,
        }
    }

    pub fn with_scope(&self, scope: ScopeRef) -> Self {
        Context {
            scope,
            inference: None,
            ..self.clone()
        }
    }

    pub fn with_inference(&self, inference: Option<Inference>) -> Self {
        Context {
            inference,
            ..self.clone()
        }
    }

    /// Context for a child that has no inference hint of its own.
    pub fn plain(&self) -> Self {
        self.with_inference(None)
    }

    pub fn in_loop(&self) -> Self {
        Context {
            in_loop: true,
            inference: None,
            ..self.clone()
        }
    }
}

/// Semantic analyzer: walks a tree once, registering rules with the solver,
/// then runs the solver to a fixpoint.
pub struct TypeChecker {
    pub(crate) solver: Solver,
}

impl Default for TypeChecker {
    fn default() -> Self {
        TypeChecker::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Self {
        TypeChecker {
            solver: Solver::new(config),
        }
    }

    /// Analyzes `root`, annotating its nodes.
    ///
    /// Running this again on the same tree leaves every attribute unchanged
    /// and adds no diagnostics.
    pub fn analyze(&mut self, root: &BlockStmt) {
        let scope = Scope::root();
        self.stamp_builtins();

        debug!(statements = root.body.len(), "analysis started");

        // Top-level declarations live in the root scope itself.
        let context = Context::new(scope.clone());
        self.solver
            .set_attr(root.id, Attr::Scope, Value::Scope(scope));
        check_block_body(self, root, &context);

        self.solver.run();

        debug!(
            attributes = self.solver.len(),
            diagnostics = self.solver.diagnostics().len(),
            "analysis finished"
        );
    }

    fn stamp_builtins(&mut self) {
        for builtin in BUILTINS.iter() {
            match builtin.kind {
                BuiltinKind::Type(kind) => {
                    let declared = Type::primitive(kind).unwrap_or(Type::Error);
                    self.solver
                        .set_attr(builtin.id, Attr::Type, Value::Type(Type::Type));
                    self.solver
                        .set_attr(builtin.id, Attr::Declared, Value::Type(declared));
                }
                BuiltinKind::Constant(kind) => {
                    let ty = Type::primitive(kind).unwrap_or(Type::Error);
                    self.solver.set_attr(builtin.id, Attr::Type, Value::Type(ty));
                }
            }
        }
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    pub fn attribute(&self, node: NodeId, attr: Attr) -> Option<&Value> {
        self.solver.get_attr(node, attr)
    }

    /// The `type` attribute of `node`, if it was resolved.
    pub fn type_of(&self, node: NodeId) -> Option<Type> {
        self.attribute(node, Attr::Type)
            .and_then(Value::as_type)
            .cloned()
    }

    /// The `value` attribute of a type expression.
    pub fn value_of(&self, node: NodeId) -> Option<Type> {
        self.attribute(node, Attr::Value)
            .and_then(Value::as_type)
            .cloned()
    }

    pub fn returns(&self, node: NodeId) -> Option<bool> {
        self.attribute(node, Attr::Returns).and_then(Value::as_bool)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.solver.diagnostics()
    }
}

/// Analyzes a parsed program, returning the annotated state and every
/// diagnostic found.
pub fn type_check(root: &BlockStmt) -> (TypeChecker, Vec<Diagnostic>) {
    let mut checker = TypeChecker::new();
    checker.analyze(root);
    let diagnostics = checker.diagnostics().to_vec();
    (checker, diagnostics)
}

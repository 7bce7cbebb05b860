use std::{collections::VecDeque, fmt::Display};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::{
    ast::ast::NodeId,
    errors::diagnostics::{Diagnostic, SemanticError},
    scope::scope::{Declaration, ScopeRef},
    types::types::Type,
    Span,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attr {
    /// Type of an expression or declaration.
    Type,
    /// Resolved type of a type expression.
    Value,
    /// Type denoted by a type declaration.
    Declared,
    /// Whether a statement always returns.
    Returns,
    Scope,
    /// Declaration an identifier resolves to.
    Ast,
    /// Element type a `var` initializer must be converted to.
    Cast,
    /// Key type a `var` initializer must be converted to.
    CastKey,
}

impl Display for Attr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Attr::Type => "type",
            Attr::Value => "value",
            Attr::Declared => "declared",
            Attr::Returns => "returns",
            Attr::Scope => "scope",
            Attr::Ast => "ast",
            Attr::Cast => "cast",
            Attr::CastKey => "cast-key",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttrKey {
    pub node: NodeId,
    pub attr: Attr,
}

impl AttrKey {
    pub fn new(node: NodeId, attr: Attr) -> Self {
        AttrKey { node, attr }
    }
}

impl Display for AttrKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.node, self.attr)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Type(Type),
    Bool(bool),
    Scope(ScopeRef),
    Decl(Declaration),
    /// Stand-in for attributes without a meaningful error value.
    Poison,
}

impl Value {
    /// The value handed to dependents of an attribute whose rule failed.
    pub fn poison(attr: Attr) -> Value {
        match attr {
            Attr::Type | Attr::Value | Attr::Declared | Attr::Cast | Attr::CastKey => {
                Value::Type(Type::Error)
            }
            Attr::Returns => Value::Bool(true),
            Attr::Scope | Attr::Ast => Value::Poison,
        }
    }

    pub fn as_type(&self) -> Option<&Type> {
        match self {
            Value::Type(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_scope(&self) -> Option<&ScopeRef> {
        match self {
            Value::Scope(scope) => Some(scope),
            _ => None,
        }
    }

    pub fn as_decl(&self) -> Option<&Declaration> {
        match self {
            Value::Decl(declaration) => Some(declaration),
            _ => None,
        }
    }
}

impl From<Type> for Value {
    fn from(ty: Type) -> Self {
        Value::Type(ty)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Upper bound on rule executions in a single `run`.
    pub max_rule_runs: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_rule_runs: 1_000_000,
        }
    }
}

type Compute = Box<dyn FnOnce(&mut RuleContext)>;

struct Rule {
    span: Span,
    outputs: Vec<AttrKey>,
    inputs: Vec<AttrKey>,
    /// Inputs not yet available.
    missing: usize,
    compute: Option<Compute>,
}

pub struct Solver {
    config: SolverConfig,
    attributes: FxHashMap<AttrKey, Value>,
    poisoned: FxHashSet<AttrKey>,
    rules: Vec<Rule>,
    /// Rules blocked on each unavailable attribute.
    waiting: FxHashMap<AttrKey, Vec<usize>>,
    ready: VecDeque<usize>,
    diagnostics: Vec<Diagnostic>,
    reported: FxHashSet<Diagnostic>,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new(SolverConfig::default())
    }
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Solver {
            config,
            attributes: FxHashMap::default(),
            poisoned: FxHashSet::default(),
            rules: vec![],
            waiting: FxHashMap::default(),
            ready: VecDeque::new(),
            diagnostics: vec![],
            reported: FxHashSet::default(),
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn get(&self, key: AttrKey) -> Option<&Value> {
        self.attributes.get(&key)
    }

    pub fn get_attr(&self, node: NodeId, attr: Attr) -> Option<&Value> {
        self.get(AttrKey::new(node, attr))
    }

    pub fn is_set(&self, key: AttrKey) -> bool {
        self.attributes.contains_key(&key)
    }

    pub fn is_poisoned(&self, key: AttrKey) -> bool {
        self.poisoned.contains(&key)
    }

    /// Stores an attribute and wakes up the rules waiting on it.
    ///
    /// Writing the value an attribute already holds is a no-op, and writes
    /// to a poisoned attribute are dropped.
    ///
    /// # Panics
    ///
    /// Panics if the attribute already holds a different value.
    pub fn set(&mut self, key: AttrKey, value: Value) {
        if let Some(existing) = self.attributes.get(&key) {
            if self.poisoned.contains(&key) || *existing == value {
                return;
            }
            panic!(
                "attribute {} set twice: {:?} then {:?}",
                key, existing, value
            );
        }

        trace!(attribute = %key, "attribute set");
        self.attributes.insert(key, value);

        if let Some(blocked) = self.waiting.remove(&key) {
            for index in blocked {
                let rule = &mut self.rules[index];
                rule.missing -= 1;
                if rule.missing == 0 {
                    self.ready.push_back(index);
                }
            }
        }
    }

    pub fn set_attr(&mut self, node: NodeId, attr: Attr, value: Value) {
        self.set(AttrKey::new(node, attr), value);
    }

    /// Stores the poison value for `key` unless it is already set.
    pub fn poison(&mut self, key: AttrKey) {
        if self.attributes.contains_key(&key) {
            return;
        }
        self.poisoned.insert(key);
        self.set(key, Value::poison(key.attr));
    }

    /// Records a diagnostic; a diagnostic equal to an earlier one is dropped.
    pub fn report(&mut self, error: SemanticError, span: Span) {
        let diagnostic = Diagnostic::new(error, span);
        if self.reported.insert(diagnostic.clone()) {
            debug!(error = %diagnostic, "diagnostic recorded");
            self.diagnostics.push(diagnostic);
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn rule(&mut self, span: Span) -> RuleBuilder<'_> {
        RuleBuilder {
            solver: self,
            span,
            outputs: vec![],
            inputs: vec![],
        }
    }

    fn register(&mut self, span: Span, outputs: Vec<AttrKey>, inputs: Vec<AttrKey>, compute: Compute) {
        let index = self.rules.len();
        let mut missing = 0;

        for input in inputs.iter() {
            if !self.attributes.contains_key(input) {
                missing += 1;
                self.waiting.entry(*input).or_default().push(index);
            }
        }

        self.rules.push(Rule {
            span,
            outputs,
            inputs,
            missing,
            compute: Some(compute),
        });

        if missing == 0 {
            self.ready.push_back(index);
        }
    }

    /// Number of registered rules that have not run.
    pub fn pending_rules(&self) -> usize {
        self.rules
            .iter()
            .filter(|rule| rule.compute.is_some())
            .count()
    }

    /// Runs ready rules until none is left, then reports every rule still
    /// waiting as an unresolved dependency.
    pub fn run(&mut self) {
        debug!(
            rules = self.rules.len(),
            ready = self.ready.len(),
            "solver run started"
        );

        let mut runs = 0;
        let mut exhausted = false;

        while let Some(index) = self.ready.pop_front() {
            if runs == self.config.max_rule_runs {
                self.ready.push_front(index);
                exhausted = true;
                break;
            }

            let Some(compute) = self.rules[index].compute.take() else {
                continue;
            };
            runs += 1;

            let rule = &self.rules[index];
            trace!(
                rule = index,
                outputs = ?rule.outputs,
                "running rule"
            );

            let mut context = RuleContext {
                span: rule.span.clone(),
                outputs: rule.outputs.clone(),
                inputs: rule.inputs.clone(),
                solver: self,
            };
            compute(&mut context);
        }

        if exhausted {
            let limit = self.config.max_rule_runs;
            self.report(SemanticError::RuleBudgetExhausted { limit }, Span::null());
        }

        self.report_unresolved(exhausted);

        debug!(
            runs,
            remaining = self.pending_rules(),
            diagnostics = self.diagnostics.len(),
            "solver run finished"
        );
    }

    /// Reports every rule that never ran. Rules stranded in the ready queue
    /// by an exhausted budget have no missing inputs, so the budget is named
    /// instead.
    fn report_unresolved(&mut self, exhausted: bool) {
        let mut unresolved = vec![];

        for rule in self.rules.iter().filter(|rule| rule.compute.is_some()) {
            let mut missing: Vec<String> = rule
                .inputs
                .iter()
                .filter(|input| !self.attributes.contains_key(input))
                .map(|input| input.to_string())
                .collect();

            if missing.is_empty() {
                if !exhausted {
                    continue;
                }
                missing.push("rule budget".to_string());
            }

            let outputs: Vec<String> = rule.outputs.iter().map(|key| key.to_string()).collect();
            unresolved.push((
                SemanticError::UnresolvedDependency {
                    outputs: outputs.join(", "),
                    missing: missing.join(", "),
                },
                rule.span.clone(),
            ));
        }

        for (error, span) in unresolved {
            self.report(error, span);
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&AttrKey, &Value)> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Collects the outputs and inputs of a rule before registering it.
pub struct RuleBuilder<'a> {
    solver: &'a mut Solver,
    span: Span,
    outputs: Vec<AttrKey>,
    inputs: Vec<AttrKey>,
}

impl<'a> RuleBuilder<'a> {
    pub fn output(mut self, node: NodeId, attr: Attr) -> Self {
        self.outputs.push(AttrKey::new(node, attr));
        self
    }

    pub fn outputs(mut self, keys: impl IntoIterator<Item = AttrKey>) -> Self {
        self.outputs.extend(keys);
        self
    }

    pub fn input(mut self, node: NodeId, attr: Attr) -> Self {
        self.inputs.push(AttrKey::new(node, attr));
        self
    }

    pub fn inputs(mut self, keys: impl IntoIterator<Item = AttrKey>) -> Self {
        self.inputs.extend(keys);
        self
    }

    /// Registers the rule with its compute function.
    pub fn by<F>(self, compute: F)
    where
        F: FnOnce(&mut RuleContext) + 'static,
    {
        self.solver
            .register(self.span, self.outputs, self.inputs, Box::new(compute));
    }
}

/// View of the solver handed to a running rule.
///
/// Inputs and outputs are addressed by their position in the rule's
/// declaration.
pub struct RuleContext<'a> {
    span: Span,
    outputs: Vec<AttrKey>,
    inputs: Vec<AttrKey>,
    solver: &'a mut Solver,
}

impl<'a> RuleContext<'a> {
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.inputs
            .get(index)
            .and_then(|key| self.solver.get(*key))
    }

    /// Input `index` as a type; [`Type::Error`] if it holds anything else.
    pub fn get_type(&self, index: usize) -> Type {
        self.get(index)
            .and_then(Value::as_type)
            .cloned()
            .unwrap_or(Type::Error)
    }

    /// Input `index` as a flag; poisoned or non-boolean inputs read as `true`.
    pub fn get_bool(&self, index: usize) -> bool {
        self.get(index).and_then(Value::as_bool).unwrap_or(true)
    }

    pub fn get_decl(&self, index: usize) -> Option<Declaration> {
        self.get(index).and_then(Value::as_decl).cloned()
    }

    pub fn get_scope(&self, index: usize) -> Option<ScopeRef> {
        self.get(index).and_then(Value::as_scope).cloned()
    }

    /// Sets output `index`.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) {
        if let Some(key) = self.outputs.get(index).copied() {
            self.solver.set(key, value.into());
        }
    }

    pub fn set_attr(&mut self, node: NodeId, attr: Attr, value: impl Into<Value>) {
        self.solver.set_attr(node, attr, value.into());
    }

    pub fn is_set(&self, node: NodeId, attr: Attr) -> bool {
        self.solver.is_set(AttrKey::new(node, attr))
    }

    /// Records a diagnostic without poisoning anything; the rule is expected
    /// to still produce its outputs.
    pub fn report(&mut self, error: SemanticError, span: Span) {
        self.solver.report(error, span);
    }

    /// Records a diagnostic and poisons every output not yet set.
    pub fn error(&mut self, error: SemanticError, span: Span) {
        self.solver.report(error, span);
        for key in self.outputs.clone() {
            self.solver.poison(key);
        }
    }

    /// Records a diagnostic and poisons the given attributes if unset.
    pub fn error_for(&mut self, error: SemanticError, span: Span, keys: &[AttrKey]) {
        self.solver.report(error, span);
        for key in keys {
            self.solver.poison(*key);
        }
    }

    /// Registers a rule from inside a running one.
    pub fn rule(&mut self, span: Span) -> RuleBuilder<'_> {
        self.solver.rule(span)
    }
}

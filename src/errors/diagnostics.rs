use std::fmt::Display;

use thiserror::Error;

use crate::{get_line_at_position, Span};

use super::errors::{self, ErrorTip};

/// Broad classes of semantic failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Unresolved,
    TypeMismatch,
    Flow,
    Structural,
    /// A rule whose inputs never became available.
    Engine,
}

impl Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCategory::Unresolved => "unresolved",
            ErrorCategory::TypeMismatch => "type mismatch",
            ErrorCategory::Flow => "flow",
            ErrorCategory::Structural => "structural",
            ErrorCategory::Engine => "engine",
        };
        write!(f, "{}", name)
    }
}

/// Semantic errors. Types are carried pre-rendered so diagnostics stay plain
/// values.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SemanticError {
    // Operators
    #[error("Invalid arithmetic operation {operator} on type {left} and {right}")]
    InvalidArithmetic {
        operator: String,
        left: String,
        right: String,
    },
    #[error("Invalid bitwise operation {operator} on type {left} and {right}")]
    InvalidBitwise {
        operator: String,
        left: String,
        right: String,
    },
    #[error("Invalid operation '{operator}' on value of type {operand}")]
    InvalidUnary { operator: String, operand: String },
    #[error("Cannot negate value of type: {operand}")]
    CannotNegate { operand: String },
    #[error("Attempting to perform binary logic on non-boolean type: {found}")]
    NonBooleanLogic { found: String },
    #[error("Comparison on incomparable types {left} and {right}")]
    IncomparableTypes { left: String, right: String },

    // Conditions
    #[error("{construct} with a non-boolean condition of type: {found}")]
    NonBooleanCondition { construct: String, found: String },
    #[error("Both sides of a conditional operation cannot evaluate to nil")]
    NilConditionBranches,
    #[error("Incompatible evaluation results for truth and false condition: {truthy} and {falsy}")]
    IncompatibleBranches { truthy: String, falsy: String },

    // Names
    #[error("Could not resolve: {name}")]
    UnresolvedName { name: String },
    #[error("Variable used before declaration: {name}")]
    UsedBeforeDeclaration { name: String },
    #[error("Cannot resolve type '{name}'")]
    UnresolvedType { name: String },
    #[error("{name} did not resolve to a type declaration but to a {kind}")]
    NotATypeDeclaration { name: String, kind: String },

    // Assignment
    #[error("Trying to assign to an non-lvalue expression")]
    InvalidAssignmentTarget,
    #[error("Trying to assign a value of type {found} to an lvalue of type {expected}")]
    IncompatibleAssignment { expected: String, found: String },
    #[error("Cannot assign to constant `{name}`")]
    AssignToConstant { name: String },
    #[error("Cannot assign to `{receiver}`")]
    AssignToReceiver { receiver: String },

    // Calls
    #[error("Trying to call a non-function value of type {found}")]
    NotCallable { found: String },
    #[error("Expected {expected} arguments, received {received}")]
    ArgumentCount { expected: usize, received: usize },
    #[error("Expected at least {minimum} arguments, received {received}")]
    VariadicArgumentCount { minimum: usize, received: usize },
    #[error("Incompatible argument {index}: expected {expected} but got {found}")]
    IncompatibleArgument {
        index: usize,
        expected: String,
        found: String,
    },

    // Literals
    #[error("Cannot infer the type of an empty {literal} literal")]
    EmptyLiteralInference { literal: String },
    #[error("Invalid element type {found} in collection literal")]
    InvalidElementType { found: String },
    #[error("No common type between {left} and {right}")]
    NoCommonType { left: String, right: String },

    // Members
    #[error("Arrays have no field `{name}`")]
    UnknownArrayField { name: String },
    #[error("Class {class} has no member `{name}`")]
    UnknownMember { class: String, name: String },
    #[error("Cannot access field `{name}` on value of type {found}")]
    InvalidFieldAccess { name: String, found: String },
    #[error("Cannot assign to constant field `{name}`")]
    AssignToConstantField { name: String },
    #[error("Cannot assign to the length of an array")]
    AssignToArrayLength,

    // Indexing
    #[error("Indexing an array using a non-Int-valued expression of type {found}")]
    NonIntegerIndex { found: String },
    #[error("Trying to index a non-array expression of type {found}")]
    NotIndexable { found: String },
    #[error("Incompatible key type: expected {expected} but got {found}")]
    IncompatibleKey { expected: String, found: String },

    // Declarations and returns
    #[error("Incompatible initializer type provided for variable `{name}`: expected {expected} but got {found}")]
    IncompatibleInitializer {
        name: String,
        expected: String,
        found: String,
    },
    #[error("Missing return in function `{name}`")]
    MissingReturn { name: String },
    #[error("Return with value in a void function")]
    ReturnValueInVoid,
    #[error("Return without value in a function with a return type")]
    MissingReturnValue,
    #[error("Incompatible return type, expected {expected} but got {found}")]
    IncompatibleReturn { expected: String, found: String },
    #[error("Return with value in a constructor")]
    ReturnValueInConstructor,
    #[error("Constructors must return void, found {found}")]
    ConstructorReturnType { found: String },

    // Classes
    #[error("Superclass of {class} must be a class, found {found}")]
    InvalidSuperclass { class: String, found: String },
    #[error("Cannot instantiate a value of type {found}")]
    NotAClass { found: String },
    #[error("`{receiver}` used outside of an instance method")]
    ReceiverOutsideMethod { receiver: String },
    #[error("Class {class} has no parent class")]
    NoParentClass { class: String },

    // Other statements
    #[error("Assert statement with non-boolean expression of type {found}")]
    NonBooleanAssert { found: String },
    #[error("Cannot echo a value of type void")]
    VoidEcho,
    #[error("`{keyword}` outside of a loop")]
    LoopControlOutsideLoop { keyword: String },
    #[error("Case label of type {found} is not comparable with {subject}")]
    IncomparableCase { subject: String, found: String },

    // Engine
    #[error("Unresolved dependency: {outputs} waiting on {missing}")]
    UnresolvedDependency { outputs: String, missing: String },
    #[error("Rule budget of {limit} runs exhausted")]
    RuleBudgetExhausted { limit: usize },
}

impl SemanticError {
    pub fn name(&self) -> &'static str {
        match self {
            SemanticError::InvalidArithmetic { .. } => "InvalidArithmetic",
            SemanticError::InvalidBitwise { .. } => "InvalidBitwise",
            SemanticError::InvalidUnary { .. } => "InvalidUnary",
            SemanticError::CannotNegate { .. } => "CannotNegate",
            SemanticError::NonBooleanLogic { .. } => "NonBooleanLogic",
            SemanticError::IncomparableTypes { .. } => "IncomparableTypes",
            SemanticError::NonBooleanCondition { .. } => "NonBooleanCondition",
            SemanticError::NilConditionBranches => "NilConditionBranches",
            SemanticError::IncompatibleBranches { .. } => "IncompatibleBranches",
            SemanticError::UnresolvedName { .. } => "UnresolvedName",
            SemanticError::UsedBeforeDeclaration { .. } => "UsedBeforeDeclaration",
            SemanticError::UnresolvedType { .. } => "UnresolvedType",
            SemanticError::NotATypeDeclaration { .. } => "NotATypeDeclaration",
            SemanticError::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            SemanticError::IncompatibleAssignment { .. } => "IncompatibleAssignment",
            SemanticError::AssignToConstant { .. } => "AssignToConstant",
            SemanticError::AssignToReceiver { .. } => "AssignToReceiver",
            SemanticError::NotCallable { .. } => "NotCallable",
            SemanticError::ArgumentCount { .. } => "ArgumentCount",
            SemanticError::VariadicArgumentCount { .. } => "VariadicArgumentCount",
            SemanticError::IncompatibleArgument { .. } => "IncompatibleArgument",
            SemanticError::EmptyLiteralInference { .. } => "EmptyLiteralInference",
            SemanticError::InvalidElementType { .. } => "InvalidElementType",
            SemanticError::NoCommonType { .. } => "NoCommonType",
            SemanticError::UnknownArrayField { .. } => "UnknownArrayField",
            SemanticError::UnknownMember { .. } => "UnknownMember",
            SemanticError::InvalidFieldAccess { .. } => "InvalidFieldAccess",
            SemanticError::AssignToConstantField { .. } => "AssignToConstantField",
            SemanticError::AssignToArrayLength => "AssignToArrayLength",
            SemanticError::NonIntegerIndex { .. } => "NonIntegerIndex",
            SemanticError::NotIndexable { .. } => "NotIndexable",
            SemanticError::IncompatibleKey { .. } => "IncompatibleKey",
            SemanticError::IncompatibleInitializer { .. } => "IncompatibleInitializer",
            SemanticError::MissingReturn { .. } => "MissingReturn",
            SemanticError::ReturnValueInVoid => "ReturnValueInVoid",
            SemanticError::MissingReturnValue => "MissingReturnValue",
            SemanticError::IncompatibleReturn { .. } => "IncompatibleReturn",
            SemanticError::ReturnValueInConstructor => "ReturnValueInConstructor",
            SemanticError::ConstructorReturnType { .. } => "ConstructorReturnType",
            SemanticError::InvalidSuperclass { .. } => "InvalidSuperclass",
            SemanticError::NotAClass { .. } => "NotAClass",
            SemanticError::ReceiverOutsideMethod { .. } => "ReceiverOutsideMethod",
            SemanticError::NoParentClass { .. } => "NoParentClass",
            SemanticError::NonBooleanAssert { .. } => "NonBooleanAssert",
            SemanticError::VoidEcho => "VoidEcho",
            SemanticError::LoopControlOutsideLoop { .. } => "LoopControlOutsideLoop",
            SemanticError::IncomparableCase { .. } => "IncomparableCase",
            SemanticError::UnresolvedDependency { .. } => "UnresolvedDependency",
            SemanticError::RuleBudgetExhausted { .. } => "RuleBudgetExhausted",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SemanticError::UnresolvedName { .. }
            | SemanticError::UsedBeforeDeclaration { .. }
            | SemanticError::UnresolvedType { .. }
            | SemanticError::NotATypeDeclaration { .. } => ErrorCategory::Unresolved,

            SemanticError::MissingReturn { .. }
            | SemanticError::ReturnValueInVoid
            | SemanticError::MissingReturnValue
            | SemanticError::ReturnValueInConstructor
            | SemanticError::LoopControlOutsideLoop { .. } => ErrorCategory::Flow,

            SemanticError::InvalidAssignmentTarget
            | SemanticError::AssignToConstant { .. }
            | SemanticError::AssignToReceiver { .. }
            | SemanticError::ArgumentCount { .. }
            | SemanticError::VariadicArgumentCount { .. }
            | SemanticError::UnknownArrayField { .. }
            | SemanticError::UnknownMember { .. }
            | SemanticError::InvalidFieldAccess { .. }
            | SemanticError::AssignToConstantField { .. }
            | SemanticError::AssignToArrayLength
            | SemanticError::ReceiverOutsideMethod { .. }
            | SemanticError::NoParentClass { .. } => ErrorCategory::Structural,

            SemanticError::UnresolvedDependency { .. }
            | SemanticError::RuleBudgetExhausted { .. } => ErrorCategory::Engine,

            _ => ErrorCategory::TypeMismatch,
        }
    }
}

/// A semantic error attributed to the span of its primary node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub error: SemanticError,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(error: SemanticError, span: Span) -> Self {
        Diagnostic { error, span }
    }

    pub fn category(&self) -> ErrorCategory {
        self.error.category()
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error.name(), self.error)
    }
}

/// Renders a diagnostic with its location and a caret under the offending
/// column:
///
/// ```text
/// Error: UnresolvedName (Could not resolve: b)
/// -> main.rem:1:9
///   |
/// 1 | var a = b
///   | --------^
/// ```
pub fn render_diagnostic(diagnostic: &Diagnostic, source: &str, path: &str) -> String {
    let header = format!("Error: {} ({})", diagnostic.error.name(), diagnostic.error);
    render_excerpt(header, source, path, diagnostic.span.start.0)
}

/// Renders a lexer or parser error in the same layout as diagnostics.
pub fn render_error(error: &errors::Error, source: &str, path: &str) -> String {
    let header = match error.get_tip() {
        ErrorTip::None => format!("Error: {}", error.get_error_name()),
        tip => format!("Error: {} ({})", error.get_error_name(), tip),
    };
    render_excerpt(header, source, path, error.get_position().0)
}

pub fn render_diagnostics(diagnostics: &[Diagnostic], source: &str, path: &str) -> String {
    diagnostics
        .iter()
        .map(|diagnostic| render_diagnostic(diagnostic, source, path))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_excerpt(header: String, source: &str, path: &str, offset: u32) -> String {
    let Some((line, line_text, line_pos)) = get_line_at_position(source, offset) else {
        return format!("{}\n-> {}\n", header, path);
    };

    let line_str = line.to_string();
    let padding = line_str.len() + 2;

    let removed_whitespace = line_text.len() - line_text.trim_start_matches(' ').len();
    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    let mut output = String::new();
    output.push_str(&format!("{}\n", header));
    output.push_str(&format!("-> {}:{}:{}\n", path, line, line_pos + 1));
    output.push_str(&format!("{:>padding$}\n", "|"));
    output.push_str(&format!("{} | {}\n", line_str, line_text.trim()));
    output.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    output
}

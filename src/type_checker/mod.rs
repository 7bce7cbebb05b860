//! Semantic analysis.
//!
//! The checker walks the tree once. Every fact it cannot establish on the
//! spot, such as a forward reference or a type that depends on another
//! declaration, becomes a rule; the solver then runs the rules to a fixpoint.

pub mod expr;
pub mod stmt;
pub mod type_checker;
pub mod type_expr;

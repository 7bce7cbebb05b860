//! Attribute store and rule engine.
//!
//! Attributes are single-assignment facts keyed by node and attribute kind.
//! Rules declare the attributes they read and write; the solver runs a rule
//! once every input exists, and rules may register further rules while
//! running. Rules still waiting when no more progress is possible are
//! reported as unresolved dependencies.

pub mod solver;

//! Lexical scopes and declarations.
//!
//! A scope maps names to the nodes that declare them and falls back to its
//! parent on lookup. The root scope holds the builtin type and literal names.

pub mod scope;

#[cfg(test)]
mod tests;

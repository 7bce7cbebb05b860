//! The type lattice of the language.
//!
//! This module defines the closed set of type values the analyzer computes:
//!
//! - Primitive types (`bool`, `i8`..`i128`, `f32`..`f128`, `void`, `nil`)
//! - Composite types (arrays, maps, function signatures, classes)
//! - The `type` meta-type of type-valued declarations
//! - A poison type used for error containment
//!
//! Types are ordered by [`TypeKind`], which drives numeric promotion, and
//! related by a directed assignability relation.

pub mod types;

#[cfg(test)]
mod tests;

//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the pipeline:
//!
//! - Lexer and parser errors with source position information
//! - Semantic errors collected as diagnostics by the analyzer
//! - Error formatting with a source excerpt and caret

pub mod diagnostics;
pub mod errors;

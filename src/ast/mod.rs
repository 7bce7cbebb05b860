/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Node identities and the shared node plumbing
/// - expressions: Expression variants and operators
/// - statements: Statement variants and declaration records
/// - types: Type expressions as written in source
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;

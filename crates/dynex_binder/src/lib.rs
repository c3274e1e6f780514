//! dynex_binder: Symbol tables and scope chains.
//!
//! A symbol table is built once per compile call from the declared
//! parameters plus the keyword literals `true`, `false` and `null`. The scope
//! chain stacks child tables for the nested lambdas of aggregate arguments.

mod scope;
mod symbol;

pub use scope::ScopeChain;
pub use symbol::{KeywordLiteral, Symbol, SymbolKind, SymbolTable, IMPLICIT_PARAMETER_NAME};

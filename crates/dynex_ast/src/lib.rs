//! dynex_ast: Syntax tree definitions for the expression language.
//!
//! This module defines the token/node `SyntaxKind` enum and the arena-allocated
//! expression nodes the parser produces.

pub mod generated;
pub mod node;
pub mod syntax_kind;

// Re-export key types
pub use node::*;
pub use syntax_kind::{SyntaxKind, TokenClass};

//! dynex_core: Core utilities shared by every stage of the expression compiler.
//!
//! Provides the source span types used to attach positions to tokens,
//! syntax nodes, resolved nodes and diagnostics.

pub mod text;

// Re-export commonly used types
pub use text::{TextPos, TextSpan};

//! dynex_parser: Recursive descent parser for the expression language.
//!
//! Parses the scanner's token stream into an arena-allocated expression tree,
//! and splits ordering specifications into per-clause ranges.

mod ordering;
mod parser;
pub mod precedence;

pub use ordering::{split_ordering_clauses, OrderingSegment, SortDirection};
pub use parser::Parser;

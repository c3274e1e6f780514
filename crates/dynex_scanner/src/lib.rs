//! dynex_scanner: Tokenizer for expression text.
//!
//! Converts expression text into tokens in a single forward pass:
//! - Decimal and hexadecimal integers with `U`/`L`/`UL` suffixes
//! - Reals with fraction, exponent and `F`/`D`/`M` suffixes
//! - Quoted string and character literals with quote doubling
//! - Unicode identifiers and case-insensitive keywords
//! - Operators and punctuation

mod char_codes;
mod scanner;
mod token;

pub use scanner::{tokenize, Scanner, ScannerState, Tokens};
pub use token::TokenInfo;

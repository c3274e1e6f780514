//! Token information produced by the scanner.

use dynex_ast::syntax_kind::{SyntaxKind, TokenClass};
use dynex_core::text::TextSpan;

/// Information about a scanned token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    /// The kind of token.
    pub kind: SyntaxKind,
    /// Start position in the expression text.
    pub pos: u32,
    /// End position in the expression text (exclusive).
    pub end: u32,
    /// The text of the token. Literal contents are unquoted and unescaped.
    pub text: String,
}

impl TokenInfo {
    pub fn new(kind: SyntaxKind, pos: u32, end: u32) -> Self {
        Self {
            kind,
            pos,
            end,
            text: String::new(),
        }
    }

    pub fn with_text(mut self, text: String) -> Self {
        self.text = text;
        self
    }

    #[inline]
    pub fn class(&self) -> TokenClass {
        self.kind.token_class()
    }

    #[inline]
    pub fn span(&self) -> TextSpan {
        TextSpan::from_bounds(self.pos, self.end)
    }

    /// The length of this token in characters.
    pub fn len(&self) -> u32 {
        self.end - self.pos
    }

    /// Whether this token has zero length.
    pub fn is_empty(&self) -> bool {
        self.pos == self.end
    }
}

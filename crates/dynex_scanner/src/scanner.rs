//! The expression scanner.
//!
//! Converts expression text into a stream of tokens that the parser consumes.
//! Positions are character offsets into the full text, even when scanning a
//! sub-range of it.

use crate::char_codes::*;
use crate::token::TokenInfo;
use dynex_ast::syntax_kind::SyntaxKind;
use dynex_core::text::TextSpan;
use dynex_diagnostics::{messages, LexError};

/// Saved scanner state for lookahead.
pub struct ScannerState {
    pub pos: usize,
    pub token_start: usize,
    pub token: SyntaxKind,
    pub token_value: String,
}

/// The scanner converts expression text into tokens.
pub struct Scanner {
    /// The full expression text.
    text: Vec<char>,
    /// Current position in the text.
    pos: usize,
    /// Scanning stops here (exclusive).
    end: usize,
    /// Start of the current token (after leading whitespace).
    token_start: usize,
    /// The current token kind.
    token: SyntaxKind,
    /// The text of the current token.
    token_value: String,
}

impl Scanner {
    /// Create a new scanner for the given expression text.
    pub fn new(text: &str) -> Self {
        let text: Vec<char> = text.chars().collect();
        let end = text.len();
        Self {
            text,
            pos: 0,
            end,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_value: String::new(),
        }
    }

    /// Create a scanner over the character range `start..end` of `text`.
    /// Token positions remain relative to the start of `text`.
    pub fn with_range(text: &str, start: usize, end: usize) -> Self {
        let mut scanner = Self::new(text);
        scanner.end = end.min(scanner.text.len());
        scanner.pos = start.min(scanner.end);
        scanner.token_start = scanner.pos;
        scanner
    }

    /// Look ahead: save state, call f, restore state and return the result.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let state = self.save_state();
        let result = f(self);
        self.restore_state(state);
        result
    }

    /// Get the current token kind.
    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Get the current token's text value.
    #[inline]
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    /// Get the start position of the current token.
    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Get the current position (end of current token).
    #[inline]
    pub fn token_end(&self) -> usize {
        self.pos
    }

    /// The current token exactly as written, quotes and suffixes included.
    pub fn token_text(&self) -> String {
        self.chars_to_string(self.token_start, self.pos)
    }

    #[inline]
    pub fn token_span(&self) -> TextSpan {
        TextSpan::from_bounds(self.token_start as u32, self.pos as u32)
    }

    /// Get a TokenInfo for the current token.
    pub fn token_info(&self) -> TokenInfo {
        TokenInfo {
            kind: self.token,
            pos: self.token_start as u32,
            end: self.pos as u32,
            text: self.token_value.clone(),
        }
    }

    /// Save the full scanner state for lookahead.
    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
            token_value: self.token_value.clone(),
        }
    }

    /// Restore the full scanner state from a saved state.
    pub fn restore_state(&mut self, state: ScannerState) {
        self.pos = state.pos;
        self.token_start = state.token_start;
        self.token = state.token;
        self.token_value = state.token_value;
    }

    // ========================================================================
    // Character access
    // ========================================================================

    #[inline]
    fn current_char(&self) -> Option<char> {
        if self.pos < self.end {
            Some(self.text[self.pos])
        } else {
            None
        }
    }

    /// Look at the character at position pos + offset.
    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        let index = self.pos + offset;
        if index < self.end {
            Some(self.text[index])
        } else {
            None
        }
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.end
    }

    fn chars_to_string(&self, start: usize, end: usize) -> String {
        self.text[start..end].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if !is_white_space(ch) {
                break;
            }
            self.pos += 1;
        }
    }

    fn error(&self, message: &dynex_diagnostics::DiagnosticMessage, args: &[&str]) -> LexError {
        LexError::new(
            message,
            args,
            TextSpan::from_bounds(self.token_start as u32, self.pos.max(self.token_start) as u32),
        )
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> Result<SyntaxKind, LexError> {
        self.token_value.clear();
        self.skip_whitespace();
        self.token_start = self.pos;

        let Some(ch) = self.current_char() else {
            self.token = SyntaxKind::EndOfFileToken;
            return Ok(self.token);
        };

        self.token = match ch {
            '(' => self.single(SyntaxKind::OpenParenToken),
            ')' => self.single(SyntaxKind::CloseParenToken),
            '{' => self.single(SyntaxKind::OpenBraceToken),
            '}' => self.single(SyntaxKind::CloseBraceToken),
            '[' => self.single(SyntaxKind::OpenBracketToken),
            ']' => self.single(SyntaxKind::CloseBracketToken),
            ',' => self.single(SyntaxKind::CommaToken),
            '.' => self.single(SyntaxKind::DotToken),
            ':' => self.single(SyntaxKind::ColonToken),
            '+' => self.single(SyntaxKind::PlusToken),
            '-' => self.single(SyntaxKind::MinusToken),
            '*' => self.single(SyntaxKind::AsteriskToken),
            '/' => self.single(SyntaxKind::SlashToken),
            '%' => self.single(SyntaxKind::PercentToken),
            '?' => self.scan_pair('?', SyntaxKind::QuestionQuestionToken, SyntaxKind::QuestionToken),
            '!' => self.scan_pair('=', SyntaxKind::ExclamationEqualsToken, SyntaxKind::ExclamationToken),
            '=' => self.scan_pair('=', SyntaxKind::EqualsEqualsToken, SyntaxKind::EqualsToken),
            '>' => self.scan_pair('=', SyntaxKind::GreaterThanEqualsToken, SyntaxKind::GreaterThanToken),
            '<' => self.scan_less_than(),
            '&' => self.scan_doubled('&', SyntaxKind::AmpersandAmpersandToken)?,
            '|' => self.scan_doubled('|', SyntaxKind::BarBarToken)?,
            '"' => self.scan_quoted('"', SyntaxKind::StringLiteral)?,
            '\'' => self.scan_quoted('\'', SyntaxKind::CharLiteral)?,
            c if is_digit(c) => self.scan_number()?,
            c if is_identifier_start(c) => self.scan_identifier(),
            c => {
                self.pos += 1;
                return Err(self.error(&messages::INVALID_CHARACTER, &[&c.to_string()]));
            }
        };
        Ok(self.token)
    }

    #[inline]
    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        kind
    }

    /// Scan a one-character operator that becomes `long` when followed by `next`.
    fn scan_pair(&mut self, next: char, long: SyntaxKind, short: SyntaxKind) -> SyntaxKind {
        if self.char_at(1) == Some(next) {
            self.pos += 2;
            long
        } else {
            self.pos += 1;
            short
        }
    }

    fn scan_less_than(&mut self) -> SyntaxKind {
        match self.char_at(1) {
            Some('=') => {
                self.pos += 2;
                SyntaxKind::LessThanEqualsToken
            }
            Some('>') => {
                self.pos += 2;
                SyntaxKind::LessThanGreaterThanToken
            }
            _ => self.single(SyntaxKind::LessThanToken),
        }
    }

    /// `&&` and `||` have no single-character form.
    fn scan_doubled(&mut self, ch: char, kind: SyntaxKind) -> Result<SyntaxKind, LexError> {
        if self.char_at(1) == Some(ch) {
            self.pos += 2;
            Ok(kind)
        } else {
            self.pos += 1;
            Err(self.error(&messages::INVALID_CHARACTER, &[&ch.to_string()]))
        }
    }

    /// Scan a quoted literal. A doubled quote stands for one quote character.
    fn scan_quoted(&mut self, quote: char, kind: SyntaxKind) -> Result<SyntaxKind, LexError> {
        self.pos += 1; // skip opening quote
        let mut result = String::new();
        loop {
            let Some(ch) = self.current_char() else {
                return Err(self.error(&messages::UNTERMINATED_STRING_LITERAL, &[]));
            };
            self.pos += 1;
            if ch == quote {
                if self.current_char() == Some(quote) {
                    result.push(quote);
                    self.pos += 1;
                    continue;
                }
                break;
            }
            result.push(ch);
        }
        self.token_value = result;
        Ok(kind)
    }

    fn scan_digits(&mut self) -> usize {
        let start = self.pos;
        while self.current_char().is_some_and(is_digit) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn scan_number(&mut self) -> Result<SyntaxKind, LexError> {
        let start = self.pos;

        if self.current_char() == Some('0') && matches!(self.char_at(1), Some('x') | Some('X')) {
            self.pos += 2;
            let digits_start = self.pos;
            while self.current_char().is_some_and(is_hex_digit) {
                self.pos += 1;
            }
            if self.pos == digits_start {
                return Err(self.error(&messages::HEXADECIMAL_DIGIT_EXPECTED, &[]));
            }
            self.scan_integer_suffix();
            self.token_value = self.chars_to_string(start, self.pos);
            return Ok(SyntaxKind::IntegerLiteral);
        }

        self.scan_digits();
        let mut kind = SyntaxKind::IntegerLiteral;

        // A fraction needs a digit after the dot; `1.ToString()` is member access.
        if self.current_char() == Some('.') && self.char_at(1).is_some_and(is_digit) {
            self.pos += 1;
            self.scan_digits();
            kind = SyntaxKind::RealLiteral;
        }

        if let Some('e') | Some('E') = self.current_char() {
            self.pos += 1;
            if let Some('+') | Some('-') = self.current_char() {
                self.pos += 1;
            }
            if self.scan_digits() == 0 {
                return Err(self.error(&messages::DIGIT_EXPECTED, &[]));
            }
            kind = SyntaxKind::RealLiteral;
        }

        if self.current_char().is_some_and(is_real_suffix) {
            self.pos += 1;
            kind = SyntaxKind::RealLiteral;
        } else if kind == SyntaxKind::IntegerLiteral {
            self.scan_integer_suffix();
        }

        self.token_value = self.chars_to_string(start, self.pos);
        Ok(kind)
    }

    /// Consume `U`, `L`, `UL` or `LU` in any case.
    fn scan_integer_suffix(&mut self) {
        if let Some(first) = self.current_char().filter(|c| is_integer_suffix(*c)) {
            self.pos += 1;
            if let Some(second) = self.current_char().filter(|c| is_integer_suffix(*c)) {
                if !second.eq_ignore_ascii_case(&first) {
                    self.pos += 1;
                }
            }
        }
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        while self.current_char().is_some_and(is_identifier_part) {
            self.pos += 1;
        }
        let text = self.chars_to_string(start, self.pos);

        // Check if it's a keyword
        let kind = SyntaxKind::from_keyword(&text).unwrap_or(SyntaxKind::Identifier);
        self.token_value = text;
        kind
    }
}

/// A lazy token stream over expression text, ending with `EndOfFileToken`.
/// Iteration stops after the end token or the first error.
pub struct Tokens {
    scanner: Scanner,
    done: bool,
}

/// Tokenize expression text.
pub fn tokenize(text: &str) -> Tokens {
    Tokens {
        scanner: Scanner::new(text),
        done: false,
    }
}

impl Iterator for Tokens {
    type Item = Result<TokenInfo, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.scanner.scan() {
            Ok(kind) => {
                if kind == SyntaxKind::EndOfFileToken {
                    self.done = true;
                }
                Some(Ok(self.scanner.token_info()))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(text: &str) -> Vec<SyntaxKind> {
        let mut scanner = Scanner::new(text);
        let mut kinds = Vec::new();
        loop {
            let kind = scanner.scan().unwrap();
            kinds.push(kind);
            if kind == SyntaxKind::EndOfFileToken {
                break;
            }
        }
        kinds
    }

    #[test]
    fn test_scan_simple_expression() {
        let kinds = scan_all("x + 1");
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::PlusToken,
                SyntaxKind::IntegerLiteral,
                SyntaxKind::EndOfFileToken
            ]
        );
    }

    #[test]
    fn test_look_ahead_restores_state() {
        let mut scanner = Scanner::new("a.b");
        scanner.scan().unwrap();
        let next = scanner.look_ahead(|s| s.scan().unwrap());
        assert_eq!(next, SyntaxKind::DotToken);
        assert_eq!(scanner.token(), SyntaxKind::Identifier);
        assert_eq!(scanner.token_value(), "a");
    }

    #[test]
    fn test_range_keeps_absolute_positions() {
        let mut scanner = Scanner::with_range("Name asc, Value desc", 10, 15);
        assert_eq!(scanner.scan().unwrap(), SyntaxKind::Identifier);
        assert_eq!(scanner.token_value(), "Value");
        assert_eq!(scanner.token_start(), 10);
        assert_eq!(scanner.scan().unwrap(), SyntaxKind::EndOfFileToken);
    }
}

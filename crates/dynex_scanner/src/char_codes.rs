//! Character classification used by the scanner.

/// Check if a character is whitespace between tokens.
#[inline]
pub fn is_white_space(ch: char) -> bool {
    ch.is_whitespace() || ch == '\u{FEFF}'
}

/// Check if a character is a decimal digit.
#[inline]
pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Check if a character is a hex digit.
#[inline]
pub fn is_hex_digit(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

/// Check if a character can start an identifier.
#[inline]
pub fn is_identifier_start(ch: char) -> bool {
    ch == '_'
        || ch.is_ascii_alphabetic()
        || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_start(ch))
}

/// Check if a character can continue an identifier.
#[inline]
pub fn is_identifier_part(ch: char) -> bool {
    ch == '_'
        || ch.is_ascii_alphanumeric()
        || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_continue(ch))
}

/// Check if a character is an integer literal suffix letter.
#[inline]
pub fn is_integer_suffix(ch: char) -> bool {
    matches!(ch, 'u' | 'U' | 'l' | 'L')
}

/// Check if a character is a real literal suffix letter.
#[inline]
pub fn is_real_suffix(ch: char) -> bool {
    matches!(ch, 'f' | 'F' | 'd' | 'D' | 'm' | 'M')
}

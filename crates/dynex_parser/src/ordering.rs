//! Splitting of ordering specifications such as `"Name, Age desc"`.
//!
//! The text is cut on top-level commas and each clause loses its trailing
//! direction keyword. The remaining ranges are handed to [`crate::Parser`]
//! one by one, so positions are character offsets into the whole text.

use dynex_core::text::TextSpan;
use dynex_diagnostics::{messages, SyntaxError};

/// Sort direction of one ordering clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn from_keyword(word: &str) -> Option<SortDirection> {
        match word.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

/// The expression range of one clause, direction keyword excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderingSegment {
    /// First character of the expression.
    pub start: usize,
    /// One past the last character of the expression.
    pub end: usize,
    pub direction: SortDirection,
}

impl OrderingSegment {
    pub fn span(&self) -> TextSpan {
        TextSpan::from_bounds(self.start as u32, self.end as u32)
    }
}

/// Split `text` into ordering clauses.
///
/// Commas nested in `()`, `[]`, `{}` or inside quoted literals do not split.
/// A clause may end in `asc`, `ascending`, `desc` or `descending` (any case)
/// separated by whitespace; a clause that is only such a word is an
/// expression naming a member.
pub fn split_ordering_clauses(text: &str) -> Result<Vec<OrderingSegment>, SyntaxError> {
    let chars: Vec<char> = text.chars().collect();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut clause_start = 0;

    for (i, &ch) in chars.iter().enumerate() {
        if let Some(q) = quote {
            // A doubled quote closes and immediately reopens the literal.
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                segments.push(make_segment(&chars, clause_start, i, segments.len())?);
                clause_start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(make_segment(&chars, clause_start, chars.len(), segments.len())?);
    Ok(segments)
}

fn make_segment(chars: &[char], start: usize, end: usize, index: usize) -> Result<OrderingSegment, SyntaxError> {
    let (start, end) = trim(chars, start, end);
    if start == end {
        let ordinal = (index + 1).to_string();
        return Err(SyntaxError::new(
            &messages::EMPTY_ORDERING_CLAUSE,
            &[&ordinal],
            TextSpan::empty(start as u32),
        ));
    }

    let mut word_start = end;
    while word_start > start && is_word_char(chars[word_start - 1]) {
        word_start -= 1;
    }
    let word: String = chars[word_start..end].iter().collect();
    if let Some(direction) = SortDirection::from_keyword(&word) {
        if word_start > start && chars[word_start - 1].is_whitespace() {
            let (start, end) = trim(chars, start, word_start);
            return Ok(OrderingSegment { start, end, direction });
        }
    }
    Ok(OrderingSegment { start, end, direction: SortDirection::Ascending })
}

fn trim(chars: &[char], mut start: usize, mut end: usize) -> (usize, usize) {
    while start < end && chars[start].is_whitespace() {
        start += 1;
    }
    while end > start && chars[end - 1].is_whitespace() {
        end -= 1;
    }
    (start, end)
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clauses(text: &str) -> Vec<(String, SortDirection)> {
        let chars: Vec<char> = text.chars().collect();
        split_ordering_clauses(text)
            .unwrap()
            .into_iter()
            .map(|s| (chars[s.start..s.end].iter().collect(), s.direction))
            .collect()
    }

    #[test]
    fn test_single_clause_defaults_to_ascending() {
        assert_eq!(clauses("Name"), vec![("Name".to_string(), SortDirection::Ascending)]);
    }

    #[test]
    fn test_direction_keywords() {
        assert_eq!(
            clauses("A asc, B DESC,C Descending , D ascending"),
            vec![
                ("A".to_string(), SortDirection::Ascending),
                ("B".to_string(), SortDirection::Descending),
                ("C".to_string(), SortDirection::Descending),
                ("D".to_string(), SortDirection::Ascending),
            ]
        );
    }

    #[test]
    fn test_nested_commas_do_not_split() {
        assert_eq!(
            clauses("iif(A, B, C) desc, Items[0, 1], \"x,y\" + Name"),
            vec![
                ("iif(A, B, C)".to_string(), SortDirection::Descending),
                ("Items[0, 1]".to_string(), SortDirection::Ascending),
                ("\"x,y\" + Name".to_string(), SortDirection::Ascending),
            ]
        );
    }

    #[test]
    fn test_doubled_quote_stays_inside_literal() {
        assert_eq!(clauses("'a''b,c' desc").len(), 1);
    }

    #[test]
    fn test_direction_word_alone_is_an_expression() {
        assert_eq!(clauses("desc"), vec![("desc".to_string(), SortDirection::Ascending)]);
        assert_eq!(clauses("Desc desc"), vec![("Desc".to_string(), SortDirection::Descending)]);
    }

    #[test]
    fn test_direction_must_be_whitespace_separated() {
        assert_eq!(clauses("it.desc"), vec![("it.desc".to_string(), SortDirection::Ascending)]);
        assert_eq!(clauses("Xdesc"), vec![("Xdesc".to_string(), SortDirection::Ascending)]);
    }

    #[test]
    fn test_positions_are_absolute() {
        let segments = split_ordering_clauses("A,  B desc").unwrap();
        assert_eq!(segments[1].start, 4);
        assert_eq!(segments[1].end, 5);
    }

    #[test]
    fn test_empty_clause_is_an_error() {
        let err = split_ordering_clauses("A,,B").unwrap_err();
        assert_eq!(err.code, 2010);
        assert_eq!(err.message, "Ordering clause 2 is empty.");

        let err = split_ordering_clauses("A, ").unwrap_err();
        assert_eq!(err.code, 2010);
        assert!(split_ordering_clauses("").is_err());
    }
}

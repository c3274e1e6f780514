//! Operator precedence for binary operators.

use dynex_ast::syntax_kind::SyntaxKind;

/// Operator precedence levels, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum OperatorPrecedence {
    Lowest = 0,
    Conditional = 1,
    NullCoalescing = 2,
    LogicalOr = 3,
    LogicalAnd = 4,
    Equality = 5,
    Relational = 6,
    Additive = 7,
    Multiplicative = 8,
    Unary = 9,
    Primary = 10,
    Invalid = 255,
}

/// Get the binary operator precedence for a given token kind.
pub fn get_binary_operator_precedence(kind: SyntaxKind) -> OperatorPrecedence {
    match kind {
        SyntaxKind::QuestionQuestionToken => OperatorPrecedence::NullCoalescing,
        SyntaxKind::BarBarToken | SyntaxKind::OrKeyword => OperatorPrecedence::LogicalOr,
        SyntaxKind::AmpersandAmpersandToken | SyntaxKind::AndKeyword => {
            OperatorPrecedence::LogicalAnd
        }
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::EqualsToken
        | SyntaxKind::ExclamationEqualsToken
        | SyntaxKind::LessThanGreaterThanToken => OperatorPrecedence::Equality,
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken
        | SyntaxKind::InKeyword => OperatorPrecedence::Relational,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => OperatorPrecedence::Additive,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => {
            OperatorPrecedence::Multiplicative
        }
        _ => OperatorPrecedence::Invalid,
    }
}

/// The minimum precedence for the right operand of `kind`.
/// `??` is right-associative; every other binary operator is left-associative.
pub fn right_operand_precedence(kind: SyntaxKind, precedence: OperatorPrecedence) -> OperatorPrecedence {
    if kind == SyntaxKind::QuestionQuestionToken {
        OperatorPrecedence::Conditional
    } else {
        precedence
    }
}

/// Map keyword and alias operators onto their canonical token.
pub fn normalize_binary_operator(kind: SyntaxKind) -> SyntaxKind {
    match kind {
        SyntaxKind::AndKeyword => SyntaxKind::AmpersandAmpersandToken,
        SyntaxKind::OrKeyword => SyntaxKind::BarBarToken,
        SyntaxKind::EqualsToken => SyntaxKind::EqualsEqualsToken,
        SyntaxKind::LessThanGreaterThanToken => SyntaxKind::ExclamationEqualsToken,
        other => other,
    }
}

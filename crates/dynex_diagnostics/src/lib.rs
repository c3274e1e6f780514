//! dynex_diagnostics: Error kinds and diagnostic messages.
//!
//! Every failure of the expression compiler is one of four kinds: a malformed
//! token, a grammar violation, a semantic (binding) error, or a failure while
//! synthesizing a dynamic record type. Each carries a stable numeric code, a
//! formatted message and the span of the offending text. Message texts live in
//! the [`messages`] table as templates with `{0}`, `{1}` placeholders.

use dynex_core::text::TextSpan;
use std::fmt;

/// The stage of compilation a diagnostic originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Lex,
    Syntax,
    Bind,
    RecordSynthesis,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Lex => write!(f, "lex error"),
            DiagnosticCategory::Syntax => write!(f, "syntax error"),
            DiagnosticCategory::Bind => write!(f, "bind error"),
            DiagnosticCategory::RecordSynthesis => write!(f, "record synthesis error"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code (e.g., 1001, 3004).
    pub code: u32,
    /// The category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

macro_rules! compile_error_type {
    ($(#[$meta:meta])* $name:ident, $category:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        #[error("{message} (at index {})", .span.start)]
        pub struct $name {
            /// The diagnostic code.
            pub code: u32,
            /// The formatted message text.
            pub message: String,
            /// Where in the expression text the error was detected.
            pub span: TextSpan,
        }

        impl $name {
            pub const CATEGORY: DiagnosticCategory = $category;

            /// Create an error from a message template and its arguments.
            pub fn new(message: &DiagnosticMessage, args: &[&str], span: TextSpan) -> Self {
                debug_assert_eq!(message.category, Self::CATEGORY);
                Self {
                    code: message.code,
                    message: format_message(message.message, args),
                    span,
                }
            }
        }

        impl miette::Diagnostic for $name {
            fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
                Some(Box::new(format!("DX{}", self.code)))
            }

            fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
                let span: miette::SourceSpan =
                    (self.span.start as usize, self.span.length as usize).into();
                Some(Box::new(std::iter::once(miette::LabeledSpan::new_with_span(
                    Some(Self::CATEGORY.to_string()),
                    span,
                ))))
            }
        }
    };
}

compile_error_type!(
    /// A malformed token: unterminated literal or illegal character.
    LexError,
    DiagnosticCategory::Lex
);

compile_error_type!(
    /// A grammar violation: unexpected token, unmatched bracket, empty ordering clause.
    SyntaxError,
    DiagnosticCategory::Syntax
);

compile_error_type!(
    /// A semantic failure: unresolved name, ambiguous overload, type mismatch.
    BindError,
    DiagnosticCategory::Bind
);

compile_error_type!(
    /// Materializing a dynamic record type failed.
    RecordSynthesisError,
    DiagnosticCategory::RecordSynthesis
);

/// The single structured failure returned by every compile entry point.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum ParseFailure {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    RecordSynthesis(#[from] RecordSynthesisError),
}

impl ParseFailure {
    pub fn category(&self) -> DiagnosticCategory {
        match self {
            ParseFailure::Lex(_) => DiagnosticCategory::Lex,
            ParseFailure::Syntax(_) => DiagnosticCategory::Syntax,
            ParseFailure::Bind(_) => DiagnosticCategory::Bind,
            ParseFailure::RecordSynthesis(_) => DiagnosticCategory::RecordSynthesis,
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            ParseFailure::Lex(e) => e.code,
            ParseFailure::Syntax(e) => e.code,
            ParseFailure::Bind(e) => e.code,
            ParseFailure::RecordSynthesis(e) => e.code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseFailure::Lex(e) => &e.message,
            ParseFailure::Syntax(e) => &e.message,
            ParseFailure::Bind(e) => &e.message,
            ParseFailure::RecordSynthesis(e) => &e.message,
        }
    }

    pub fn span(&self) -> TextSpan {
        match self {
            ParseFailure::Lex(e) => e.span,
            ParseFailure::Syntax(e) => e.span,
            ParseFailure::Bind(e) => e.span,
            ParseFailure::RecordSynthesis(e) => e.span,
        }
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Lex, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Lex, message: $msg }
        };
        ($code:expr, Syntax, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Syntax, message: $msg }
        };
        ($code:expr, Bind, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Bind, message: $msg }
        };
        ($code:expr, RecordSynthesis, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::RecordSynthesis, message: $msg }
        };
    }

    // ========================================================================
    // Scanner errors (1000-1099)
    // ========================================================================
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1001, Lex, "Unterminated string literal.");
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1002, Lex, "Invalid character '{0}'.");
    pub const DIGIT_EXPECTED: DiagnosticMessage = diag!(1003, Lex, "Digit expected.");
    pub const HEXADECIMAL_DIGIT_EXPECTED: DiagnosticMessage = diag!(1004, Lex, "Hexadecimal digit expected.");

    // ========================================================================
    // Parser errors (2000-2099)
    // ========================================================================
    pub const _0_EXPECTED: DiagnosticMessage = diag!(2001, Syntax, "'{0}' expected.");
    pub const EXPRESSION_EXPECTED: DiagnosticMessage = diag!(2002, Syntax, "Expression expected.");
    pub const UNEXPECTED_TOKEN: DiagnosticMessage = diag!(2003, Syntax, "Syntax error: unexpected '{0}'.");
    pub const IDENTIFIER_EXPECTED: DiagnosticMessage = diag!(2004, Syntax, "Identifier expected.");
    pub const CHARACTER_LITERAL_MUST_CONTAIN_ONE_CHARACTER: DiagnosticMessage = diag!(2005, Syntax, "Character literal must contain exactly one character.");
    pub const INVALID_INTEGER_LITERAL: DiagnosticMessage = diag!(2006, Syntax, "Invalid integer literal '{0}'.");
    pub const INVALID_REAL_LITERAL: DiagnosticMessage = diag!(2007, Syntax, "Invalid real literal '{0}'.");
    pub const EXPRESSION_IS_MISSING_AN_AS_CLAUSE: DiagnosticMessage = diag!(2008, Syntax, "Expression is missing an 'as' clause.");
    pub const EXPRESSION_NESTED_TOO_DEEPLY: DiagnosticMessage = diag!(2009, Syntax, "Expression is nested more than {0} levels deep.");
    pub const EMPTY_ORDERING_CLAUSE: DiagnosticMessage = diag!(2010, Syntax, "Ordering clause {0} is empty.");
    pub const ONLY_NAMED_METHODS_CAN_BE_INVOKED: DiagnosticMessage = diag!(2011, Syntax, "Only named methods, delegates and conversions can be invoked.");

    // ========================================================================
    // Binder errors (3000-3099)
    // ========================================================================
    pub const UNKNOWN_IDENTIFIER: DiagnosticMessage = diag!(3001, Bind, "Unknown identifier '{0}'.");
    pub const NO_IMPLICIT_PARAMETER: DiagnosticMessage = diag!(3002, Bind, "No implicit parameter 'it' is available when {0} parameters are declared.");
    pub const DUPLICATE_IDENTIFIER: DiagnosticMessage = diag!(3003, Bind, "The identifier '{0}' was defined more than once.");
    pub const NO_PROPERTY_OR_FIELD: DiagnosticMessage = diag!(3004, Bind, "No property or field '{0}' exists in type '{1}'.");
    pub const NO_APPLICABLE_METHOD: DiagnosticMessage = diag!(3005, Bind, "No applicable method '{0}' exists in type '{1}'.");
    pub const AMBIGUOUS_METHOD_INVOCATION: DiagnosticMessage = diag!(3006, Bind, "Ambiguous invocation of method '{0}' in type '{1}'.");
    pub const NO_APPLICABLE_AGGREGATE: DiagnosticMessage = diag!(3007, Bind, "No applicable aggregate method '{0}' exists for '{1}'.");
    pub const INCOMPATIBLE_OPERAND_TYPES: DiagnosticMessage = diag!(3008, Bind, "Operator '{0}' incompatible with operand types '{1}' and '{2}'.");
    pub const INCOMPATIBLE_OPERAND_TYPE: DiagnosticMessage = diag!(3009, Bind, "Operator '{0}' incompatible with operand type '{1}'.");
    pub const BOOLEAN_EXPRESSION_EXPECTED: DiagnosticMessage = diag!(3010, Bind, "Expression of type 'Boolean' expected, found '{0}'.");
    pub const NEITHER_TYPE_CONVERTS: DiagnosticMessage = diag!(3011, Bind, "Neither of the types '{0}' and '{1}' converts to the other.");
    pub const NO_APPLICABLE_INDEXER: DiagnosticMessage = diag!(3012, Bind, "No applicable indexer exists in type '{0}'.");
    pub const CANNOT_CONVERT: DiagnosticMessage = diag!(3013, Bind, "A value of type '{0}' cannot be converted to type '{1}'.");
    pub const EXPRESSION_TYPE_MISMATCH: DiagnosticMessage = diag!(3014, Bind, "Expression of type '{0}' expected, found '{1}'.");
    pub const VOID_LAMBDA_REQUIRES_CALL: DiagnosticMessage = diag!(3015, Bind, "A lambda returning 'Void' requires a method call body, found an expression of type '{0}'.");
    pub const NO_STATIC_MEMBER: DiagnosticMessage = diag!(3016, Bind, "Type '{0}' has no static member '{1}'.");
    pub const COALESCE_REQUIRES_NULLABLE: DiagnosticMessage = diag!(3017, Bind, "Operator '??' requires a nullable or reference left operand, found '{0}'.");
    pub const DELEGATE_ARGUMENT_COUNT: DiagnosticMessage = diag!(3018, Bind, "Delegate '{0}' expects {1} arguments but {2} were supplied.");
    pub const VOID_VALUE_NOT_ALLOWED: DiagnosticMessage = diag!(3019, Bind, "An expression of type 'Void' cannot be used as a value.");
    pub const NO_BEST_ARRAY_TYPE: DiagnosticMessage = diag!(3020, Bind, "No best element type found for array initializer with '{0}' and '{1}'.");
    pub const DELEGATE_PARAMETER_COUNT: DiagnosticMessage = diag!(3021, Bind, "Delegate '{0}' declares {1} parameters but {2} were supplied.");
    pub const IIF_REQUIRES_THREE_ARGUMENTS: DiagnosticMessage = diag!(3022, Bind, "The 'iif' function requires three arguments.");
    pub const CONVERSION_REQUIRES_ONE_ARGUMENT: DiagnosticMessage = diag!(3023, Bind, "A conversion to '{0}' requires exactly one argument.");

    // ========================================================================
    // Record synthesis errors (4000-4099)
    // ========================================================================
    pub const INVALID_PROPERTY_NAME: DiagnosticMessage = diag!(4001, RecordSynthesis, "'{0}' is not a valid property name.");
    pub const DUPLICATE_PROPERTY_NAME: DiagnosticMessage = diag!(4002, RecordSynthesis, "Property '{0}' is declared more than once in a record signature.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn test_format_message() {
        assert_eq!(
            format_message("No property or field '{0}' exists in type '{1}'.", &["Foo", "Outer"]),
            "No property or field 'Foo' exists in type 'Outer'."
        );
        assert_eq!(format_message("Expression expected.", &[]), "Expression expected.");
    }

    #[test]
    fn test_error_display_includes_position() {
        let err = BindError::new(&messages::UNKNOWN_IDENTIFIER, &["Foo"], TextSpan::new(4, 3));
        assert_eq!(err.code, 3001);
        assert_eq!(err.to_string(), "Unknown identifier 'Foo'. (at index 4)");
    }

    #[test]
    fn test_parse_failure_accessors() {
        let failure: ParseFailure =
            SyntaxError::new(&messages::EXPRESSION_EXPECTED, &[], TextSpan::new(9, 0)).into();
        assert_eq!(failure.category(), DiagnosticCategory::Syntax);
        assert_eq!(failure.code(), 2002);
        assert_eq!(failure.message(), "Expression expected.");
        assert_eq!(failure.span(), TextSpan::new(9, 0));
    }

    #[test]
    fn test_miette_code_and_label() {
        let err = LexError::new(&messages::UNTERMINATED_STRING_LITERAL, &[], TextSpan::new(2, 5));
        assert_eq!(err.code().map(|c| c.to_string()), Some("DX1001".to_string()));
        let labels: Vec<_> = err.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 2);
        assert_eq!(labels[0].len(), 5);
    }
}

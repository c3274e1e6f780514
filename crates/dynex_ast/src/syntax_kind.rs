//! SyntaxKind enum - all token and node kinds of the expression language.

/// The kind of a syntax token or node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    Unknown = 0,
    EndOfFileToken,

    // Literals
    IntegerLiteral,
    RealLiteral,
    StringLiteral,
    CharLiteral,

    // Identifiers
    Identifier,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    DotToken,
    CommaToken,
    QuestionToken,
    ColonToken,
    // Operators
    LessThanToken,
    GreaterThanToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    EqualsToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    LessThanGreaterThanToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    PercentToken,
    ExclamationToken,
    AmpersandAmpersandToken,
    BarBarToken,
    QuestionQuestionToken,

    // Keywords (matched case-insensitively)
    AndKeyword,
    AsKeyword,
    FalseKeyword,
    IifKeyword,
    InKeyword,
    ItKeyword,
    NewKeyword,
    NotKeyword,
    NullKeyword,
    OrKeyword,
    TrueKeyword,

    // ========================================================================
    // Nodes
    // ========================================================================
    LiteralExpression,
    IdentifierExpression,
    TypeReference,
    MemberAccessExpression,
    IndexExpression,
    CallExpression,
    ConversionExpression,
    PrefixUnaryExpression,
    BinaryExpression,
    ConditionalExpression,
    MembershipExpression,
    NewObjectExpression,
    NewArrayExpression,
}

/// The coarse class of a token, as exposed to callers of the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Identifier,
    IntLiteral,
    RealLiteral,
    StringLiteral,
    CharLiteral,
    Operator,
    Punctuation,
    End,
}

impl SyntaxKind {
    pub const FIRST_PUNCTUATION: SyntaxKind = SyntaxKind::OpenBraceToken;
    pub const LAST_PUNCTUATION: SyntaxKind = SyntaxKind::ColonToken;
    pub const FIRST_OPERATOR: SyntaxKind = SyntaxKind::LessThanToken;
    pub const LAST_OPERATOR: SyntaxKind = SyntaxKind::QuestionQuestionToken;
    pub const FIRST_KEYWORD: SyntaxKind = SyntaxKind::AndKeyword;
    pub const LAST_KEYWORD: SyntaxKind = SyntaxKind::TrueKeyword;
    pub const FIRST_NODE: SyntaxKind = SyntaxKind::LiteralExpression;

    /// Whether this kind represents a keyword.
    #[inline]
    pub fn is_keyword(self) -> bool {
        let v = self as u16;
        v >= SyntaxKind::FIRST_KEYWORD as u16 && v <= SyntaxKind::LAST_KEYWORD as u16
    }

    /// Whether this kind represents a punctuation token.
    #[inline]
    pub fn is_punctuation(self) -> bool {
        let v = self as u16;
        v >= SyntaxKind::FIRST_PUNCTUATION as u16 && v <= SyntaxKind::LAST_PUNCTUATION as u16
    }

    /// Whether this kind represents an operator token.
    #[inline]
    pub fn is_operator(self) -> bool {
        let v = self as u16;
        v >= SyntaxKind::FIRST_OPERATOR as u16 && v <= SyntaxKind::LAST_OPERATOR as u16
    }

    /// Whether this kind represents a literal token.
    #[inline]
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::IntegerLiteral
                | SyntaxKind::RealLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::CharLiteral
        )
    }

    /// Whether this kind can name a member or projected property.
    /// Keywords qualify so that `it.New` and `x as In` stay expressible.
    #[inline]
    pub fn is_identifier_or_keyword(self) -> bool {
        self == SyntaxKind::Identifier || self.is_keyword()
    }

    #[inline]
    pub fn is_node(self) -> bool {
        self as u16 >= SyntaxKind::FIRST_NODE as u16
    }

    /// The token class of this kind.
    pub fn token_class(self) -> TokenClass {
        match self {
            SyntaxKind::IntegerLiteral => TokenClass::IntLiteral,
            SyntaxKind::RealLiteral => TokenClass::RealLiteral,
            SyntaxKind::StringLiteral => TokenClass::StringLiteral,
            SyntaxKind::CharLiteral => TokenClass::CharLiteral,
            SyntaxKind::EndOfFileToken => TokenClass::End,
            k if k == SyntaxKind::Identifier || k.is_keyword() => TokenClass::Identifier,
            k if k.is_operator() => TokenClass::Operator,
            _ => TokenClass::Punctuation,
        }
    }

    /// Get the canonical text of a keyword.
    pub fn keyword_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::AndKeyword => Some("and"),
            SyntaxKind::AsKeyword => Some("as"),
            SyntaxKind::FalseKeyword => Some("false"),
            SyntaxKind::IifKeyword => Some("iif"),
            SyntaxKind::InKeyword => Some("in"),
            SyntaxKind::ItKeyword => Some("it"),
            SyntaxKind::NewKeyword => Some("new"),
            SyntaxKind::NotKeyword => Some("not"),
            SyntaxKind::NullKeyword => Some("null"),
            SyntaxKind::OrKeyword => Some("or"),
            SyntaxKind::TrueKeyword => Some("true"),
            _ => None,
        }
    }

    /// Look up a keyword from its text, ignoring ASCII case.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        if text.len() > 5 {
            return None;
        }
        match text.to_ascii_lowercase().as_str() {
            "and" => Some(SyntaxKind::AndKeyword),
            "as" => Some(SyntaxKind::AsKeyword),
            "false" => Some(SyntaxKind::FalseKeyword),
            "iif" => Some(SyntaxKind::IifKeyword),
            "in" => Some(SyntaxKind::InKeyword),
            "it" => Some(SyntaxKind::ItKeyword),
            "new" => Some(SyntaxKind::NewKeyword),
            "not" => Some(SyntaxKind::NotKeyword),
            "null" => Some(SyntaxKind::NullKeyword),
            "or" => Some(SyntaxKind::OrKeyword),
            "true" => Some(SyntaxKind::TrueKeyword),
            _ => None,
        }
    }

    /// Get the text of a punctuation or operator token.
    pub fn punctuation_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::OpenBraceToken => Some("{"),
            SyntaxKind::CloseBraceToken => Some("}"),
            SyntaxKind::OpenParenToken => Some("("),
            SyntaxKind::CloseParenToken => Some(")"),
            SyntaxKind::OpenBracketToken => Some("["),
            SyntaxKind::CloseBracketToken => Some("]"),
            SyntaxKind::DotToken => Some("."),
            SyntaxKind::CommaToken => Some(","),
            SyntaxKind::QuestionToken => Some("?"),
            SyntaxKind::ColonToken => Some(":"),
            SyntaxKind::LessThanToken => Some("<"),
            SyntaxKind::GreaterThanToken => Some(">"),
            SyntaxKind::LessThanEqualsToken => Some("<="),
            SyntaxKind::GreaterThanEqualsToken => Some(">="),
            SyntaxKind::EqualsToken => Some("="),
            SyntaxKind::EqualsEqualsToken => Some("=="),
            SyntaxKind::ExclamationEqualsToken => Some("!="),
            SyntaxKind::LessThanGreaterThanToken => Some("<>"),
            SyntaxKind::PlusToken => Some("+"),
            SyntaxKind::MinusToken => Some("-"),
            SyntaxKind::AsteriskToken => Some("*"),
            SyntaxKind::SlashToken => Some("/"),
            SyntaxKind::PercentToken => Some("%"),
            SyntaxKind::ExclamationToken => Some("!"),
            SyntaxKind::AmpersandAmpersandToken => Some("&&"),
            SyntaxKind::BarBarToken => Some("||"),
            SyntaxKind::QuestionQuestionToken => Some("??"),
            _ => None,
        }
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(text) = self.punctuation_text() {
            write!(f, "{}", text)
        } else if let Some(text) = self.keyword_text() {
            write!(f, "{}", text)
        } else {
            match self {
                SyntaxKind::EndOfFileToken => write!(f, "end of expression"),
                SyntaxKind::Identifier => write!(f, "identifier"),
                _ => write!(f, "{:?}", self),
            }
        }
    }
}

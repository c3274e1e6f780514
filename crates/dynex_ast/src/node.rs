//! Syntax tree node definitions.
//!
//! Nodes are allocated in a per-parse arena and reference their children via
//! arena references. Text (names, literal contents) is arena-allocated as
//! well, so no node owns heap memory and the whole tree is freed with the arena.

use crate::syntax_kind::SyntaxKind;
use dynex_core::text::TextSpan;
use dynex_types::KnownType;

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Common data shared by all nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeData {
    /// The kind of this node.
    pub kind: SyntaxKind,
    /// Position in the expression text.
    pub span: TextSpan,
}

impl NodeData {
    pub fn new(kind: SyntaxKind, pos: u32, end: u32) -> Self {
        Self {
            kind,
            span: TextSpan::from_bounds(pos, end),
        }
    }
}

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, PartialEq)]
pub enum Expression<'a> {
    Literal(Literal<'a>),
    Identifier(Identifier<'a>),
    TypeReference(TypeReference<'a>),
    MemberAccess(MemberAccessExpression<'a>),
    Index(IndexExpression<'a>),
    Call(CallExpression<'a>),
    Conversion(ConversionExpression<'a>),
    PrefixUnary(PrefixUnaryExpression<'a>),
    Binary(BinaryExpression<'a>),
    Conditional(ConditionalExpression<'a>),
    Membership(MembershipExpression<'a>),
    NewObject(NewObjectExpression<'a>),
    NewArray(NewArrayExpression<'a>),
}

// -- Literals --

/// Suffix of an integer literal (`10U`, `10L`, `10UL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IntegerSuffix {
    #[default]
    None,
    Unsigned,
    Long,
    UnsignedLong,
}

/// Suffix of a real literal (`1.5F`, `1.5D`, `1.5M`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RealSuffix {
    #[default]
    None,
    Single,
    Double,
    Decimal,
}

/// The decoded value of a literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue<'a> {
    /// Magnitude plus sign; a folded `-` sets `negative`.
    Integer {
        magnitude: u64,
        negative: bool,
        suffix: IntegerSuffix,
    },
    Real {
        value: f64,
        suffix: RealSuffix,
    },
    String(&'a str),
    Char(char),
    True,
    False,
    Null,
}

#[derive(Debug, PartialEq)]
pub struct Literal<'a> {
    pub data: NodeData,
    pub value: LiteralValue<'a>,
    /// The literal as written, including any folded sign.
    pub text: &'a str,
}

// -- Names --

/// A bare name. Also used for the implicit parameter `it`.
#[derive(Debug, PartialEq)]
pub struct Identifier<'a> {
    pub data: NodeData,
    pub name: &'a str,
}

/// A predefined type name used as a value: the target of a conversion,
/// static member access or typed array initializer.
#[derive(Debug, PartialEq)]
pub struct TypeReference<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub known: KnownType,
}

// -- Postfix forms --

#[derive(Debug, PartialEq)]
pub struct MemberAccessExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub name: &'a str,
    pub name_span: TextSpan,
}

#[derive(Debug, PartialEq)]
pub struct IndexExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub arguments: NodeList<'a, Expression<'a>>,
}

/// A named invocation. Without a target the name is resolved against the
/// implicit parameter, a delegate parameter or `iif`.
#[derive(Debug, PartialEq)]
pub struct CallExpression<'a> {
    pub data: NodeData,
    pub target: Option<&'a Expression<'a>>,
    pub name: &'a str,
    pub name_span: TextSpan,
    pub arguments: NodeList<'a, Expression<'a>>,
}

/// `T(args)` where `T` is a predefined type name.
#[derive(Debug, PartialEq)]
pub struct ConversionExpression<'a> {
    pub data: NodeData,
    pub target_type: TypeReference<'a>,
    pub arguments: NodeList<'a, Expression<'a>>,
}

// -- Operators --

/// `-x`, `!x` or `not x`. `not` is normalized to `ExclamationToken`.
#[derive(Debug, PartialEq)]
pub struct PrefixUnaryExpression<'a> {
    pub data: NodeData,
    pub operator: SyntaxKind,
    pub operand: &'a Expression<'a>,
}

/// A binary operation. Keyword and alias operators are normalized:
/// `and` to `&&`, `or` to `||`, `=` to `==`, `<>` to `!=`.
#[derive(Debug, PartialEq)]
pub struct BinaryExpression<'a> {
    pub data: NodeData,
    pub left: &'a Expression<'a>,
    pub operator: SyntaxKind,
    pub right: &'a Expression<'a>,
}

#[derive(Debug, PartialEq)]
pub struct ConditionalExpression<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub when_true: &'a Expression<'a>,
    pub when_false: &'a Expression<'a>,
}

/// The right-hand side of `in`.
#[derive(Debug, PartialEq)]
pub enum MembershipCandidates<'a> {
    /// `x in (1, 2, 3)`
    List(NodeList<'a, Expression<'a>>),
    /// `x in Items`
    Source(&'a Expression<'a>),
}

#[derive(Debug, PartialEq)]
pub struct MembershipExpression<'a> {
    pub data: NodeData,
    pub operand: &'a Expression<'a>,
    pub candidates: MembershipCandidates<'a>,
}

// -- Construction --

/// One `Name: expr` / `expr as Name` entry of a projection.
#[derive(Debug, PartialEq)]
pub struct ProjectionProperty<'a> {
    pub name: &'a str,
    pub name_span: TextSpan,
    pub expression: Expression<'a>,
}

/// `new {A: x, B}` or `new (x as A, B)`.
#[derive(Debug, PartialEq)]
pub struct NewObjectExpression<'a> {
    pub data: NodeData,
    pub properties: NodeList<'a, ProjectionProperty<'a>>,
}

/// `new[] {..}`, `new T[] {..}` or `new T {..}`.
#[derive(Debug, PartialEq)]
pub struct NewArrayExpression<'a> {
    pub data: NodeData,
    pub element_type: Option<TypeReference<'a>>,
    pub elements: NodeList<'a, Expression<'a>>,
}

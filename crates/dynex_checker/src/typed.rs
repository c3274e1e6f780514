//! The resolved expression tree produced by the checker.
//!
//! Every node carries its result type. Implicit conversions are explicit
//! `Convert` nodes, so an executor never has to re-derive typing rules.

use dynex_core::text::TextSpan;
use dynex_types::{ParameterDeclaration, PrimitiveType, Type};
use std::fmt;

/// A literal or folded constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Null,
    Boolean(bool),
    Char(char),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Double(f64),
    /// Decimals are carried at double precision.
    Decimal(f64),
    String(String),
}

impl ConstantValue {
    /// The natural type of this constant. `Null` has the null type.
    pub fn natural_type(&self) -> Type {
        let primitive = match self {
            ConstantValue::Null => return Type::Null,
            ConstantValue::Boolean(_) => PrimitiveType::Boolean,
            ConstantValue::Char(_) => PrimitiveType::Char,
            ConstantValue::SByte(_) => PrimitiveType::SByte,
            ConstantValue::Byte(_) => PrimitiveType::Byte,
            ConstantValue::Int16(_) => PrimitiveType::Int16,
            ConstantValue::UInt16(_) => PrimitiveType::UInt16,
            ConstantValue::Int32(_) => PrimitiveType::Int32,
            ConstantValue::UInt32(_) => PrimitiveType::UInt32,
            ConstantValue::Int64(_) => PrimitiveType::Int64,
            ConstantValue::UInt64(_) => PrimitiveType::UInt64,
            ConstantValue::Single(_) => PrimitiveType::Single,
            ConstantValue::Double(_) => PrimitiveType::Double,
            ConstantValue::Decimal(_) => PrimitiveType::Decimal,
            ConstantValue::String(_) => PrimitiveType::String,
        };
        Type::Primitive(primitive)
    }

    /// The value as a signed 128-bit integer, for integral constants.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            ConstantValue::SByte(v) => Some(v.into()),
            ConstantValue::Byte(v) => Some(v.into()),
            ConstantValue::Int16(v) => Some(v.into()),
            ConstantValue::UInt16(v) => Some(v.into()),
            ConstantValue::Int32(v) => Some(v.into()),
            ConstantValue::UInt32(v) => Some(v.into()),
            ConstantValue::Int64(v) => Some(v.into()),
            ConstantValue::UInt64(v) => Some(v.into()),
            _ => None,
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Null => f.write_str("null"),
            ConstantValue::Boolean(v) => write!(f, "{}", v),
            ConstantValue::Char(v) => write!(f, "'{}'", v),
            ConstantValue::SByte(v) => write!(f, "{}", v),
            ConstantValue::Byte(v) => write!(f, "{}", v),
            ConstantValue::Int16(v) => write!(f, "{}", v),
            ConstantValue::UInt16(v) => write!(f, "{}", v),
            ConstantValue::Int32(v) => write!(f, "{}", v),
            ConstantValue::UInt32(v) => write!(f, "{}", v),
            ConstantValue::Int64(v) => write!(f, "{}", v),
            ConstantValue::UInt64(v) => write!(f, "{}", v),
            ConstantValue::Single(v) => write!(f, "{}", v),
            ConstantValue::Double(v) => write!(f, "{}", v),
            ConstantValue::Decimal(v) => write!(f, "{}", v),
            ConstantValue::String(v) => write!(f, "{:?}", v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    /// `+` with a string operand.
    Concat,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    AndAlso,
    OrElse,
}

impl BinaryOperator {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessThanOrEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterThanOrEqual
        )
    }
}

/// Built-in methods, properties and static functions executed without a
/// host object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    ToString,
    Equals,
    GetHashCode,
    StringLength,
    StringContains,
    StringStartsWith,
    StringEndsWith,
    StringIndexOf,
    StringSubstring,
    StringToUpper,
    StringToLower,
    StringTrim,
    StringIsNullOrEmpty,
    ArrayLength,
    NullableHasValue,
    NullableValue,
    MathAbs,
    MathMin,
    MathMax,
    MathFloor,
    MathCeiling,
    MathRound,
}

/// The sequence extension methods callable on any enumerable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregate {
    Any,
    All,
    Count,
    Sum,
    Average,
    Min,
    Max,
    Where,
    Select,
    OrderBy,
    OrderByDescending,
    First,
    FirstOrDefault,
    Take,
    Skip,
    Contains,
}

impl Aggregate {
    pub fn from_name(name: &str) -> Option<Aggregate> {
        Some(match name {
            "Any" => Aggregate::Any,
            "All" => Aggregate::All,
            "Count" => Aggregate::Count,
            "Sum" => Aggregate::Sum,
            "Average" => Aggregate::Average,
            "Min" => Aggregate::Min,
            "Max" => Aggregate::Max,
            "Where" => Aggregate::Where,
            "Select" => Aggregate::Select,
            "OrderBy" => Aggregate::OrderBy,
            "OrderByDescending" => Aggregate::OrderByDescending,
            "First" => Aggregate::First,
            "FirstOrDefault" => Aggregate::FirstOrDefault,
            "Take" => Aggregate::Take,
            "Skip" => Aggregate::Skip,
            "Contains" => Aggregate::Contains,
            _ => return None,
        })
    }
}

/// The argument of an aggregate call.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateArgument {
    /// A predicate or selector bound with the element as `it`.
    Lambda(Box<TypedExpr>),
    /// A plain value evaluated in the enclosing scope (`Take(3)`, `Contains(x)`).
    Value(Box<TypedExpr>),
}

/// The right-hand side of a resolved `in`.
#[derive(Debug, Clone, PartialEq)]
pub enum MembershipSource {
    List(Vec<TypedExpr>),
    Sequence(Box<TypedExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Constant(ConstantValue),
    /// A lambda parameter, by the name an executor binds it under.
    Parameter { name: String },
    /// A property or field of a host object or record.
    Member { target: Box<TypedExpr>, name: String },
    Index { target: Box<TypedExpr>, arguments: Vec<TypedExpr> },
    /// A host method.
    Call { target: Box<TypedExpr>, method: String, arguments: Vec<TypedExpr> },
    Intrinsic { intrinsic: Intrinsic, target: Option<Box<TypedExpr>>, arguments: Vec<TypedExpr> },
    Aggregate { aggregate: Aggregate, source: Box<TypedExpr>, argument: Option<AggregateArgument> },
    /// Conversion of the operand to this node's type.
    Convert { operand: Box<TypedExpr> },
    Unary { operator: UnaryOperator, operand: Box<TypedExpr> },
    Binary { operator: BinaryOperator, left: Box<TypedExpr>, right: Box<TypedExpr> },
    Conditional { condition: Box<TypedExpr>, when_true: Box<TypedExpr>, when_false: Box<TypedExpr> },
    Coalesce { left: Box<TypedExpr>, right: Box<TypedExpr> },
    Membership { operand: Box<TypedExpr>, source: MembershipSource },
    /// Property values in signature order; the record is this node's type.
    NewRecord { values: Vec<TypedExpr> },
    NewArray { elements: Vec<TypedExpr> },
    /// Invocation of a delegate-typed parameter.
    Invoke { delegate: Box<TypedExpr>, arguments: Vec<TypedExpr> },
}

/// A resolved expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub kind: ExprKind,
    pub ty: Type,
    pub span: TextSpan,
}

impl TypedExpr {
    pub fn new(kind: ExprKind, ty: Type, span: TextSpan) -> Self {
        Self { kind, ty, span }
    }

    pub fn constant(value: ConstantValue, span: TextSpan) -> Self {
        let ty = value.natural_type();
        Self::new(ExprKind::Constant(value), ty, span)
    }

    pub fn is_null_constant(&self) -> bool {
        matches!(self.kind, ExprKind::Constant(ConstantValue::Null))
    }

    /// Whether discarding this node's value still leaves a meaningful effect.
    pub fn is_call_shaped(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Call { .. } | ExprKind::Intrinsic { .. } | ExprKind::Aggregate { .. } | ExprKind::Invoke { .. }
        )
    }

    /// Wrap in a conversion to `ty`, or return unchanged when already of that type.
    /// A `null` constant is retyped rather than wrapped.
    pub fn convert_to(self, ty: &Type) -> TypedExpr {
        if self.ty == *ty {
            return self;
        }
        let span = self.span;
        if self.is_null_constant() {
            return TypedExpr::new(ExprKind::Constant(ConstantValue::Null), ty.clone(), span);
        }
        TypedExpr::new(ExprKind::Convert { operand: Box::new(self) }, ty.clone(), span)
    }

    /// Total number of nodes in this tree.
    pub fn node_count(&self) -> usize {
        fn sum(items: &[TypedExpr]) -> usize {
            items.iter().map(TypedExpr::node_count).sum()
        }
        1 + match &self.kind {
            ExprKind::Constant(_) | ExprKind::Parameter { .. } => 0,
            ExprKind::Member { target, .. } => target.node_count(),
            ExprKind::Index { target, arguments } | ExprKind::Call { target, arguments, .. } => {
                target.node_count() + sum(arguments)
            }
            ExprKind::Intrinsic { target, arguments, .. } => {
                target.as_ref().map_or(0, |t| t.node_count()) + sum(arguments)
            }
            ExprKind::Aggregate { source, argument, .. } => {
                source.node_count()
                    + match argument {
                        Some(AggregateArgument::Lambda(e) | AggregateArgument::Value(e)) => e.node_count(),
                        None => 0,
                    }
            }
            ExprKind::Convert { operand } | ExprKind::Unary { operand, .. } => operand.node_count(),
            ExprKind::Binary { left, right, .. } | ExprKind::Coalesce { left, right } => {
                left.node_count() + right.node_count()
            }
            ExprKind::Conditional { condition, when_true, when_false } => {
                condition.node_count() + when_true.node_count() + when_false.node_count()
            }
            ExprKind::Membership { operand, source } => {
                operand.node_count()
                    + match source {
                        MembershipSource::List(items) => sum(items),
                        MembershipSource::Sequence(e) => e.node_count(),
                    }
            }
            ExprKind::NewRecord { values } => sum(values),
            ExprKind::NewArray { elements } => sum(elements),
            ExprKind::Invoke { delegate, arguments } => delegate.node_count() + sum(arguments),
        }
    }
}

/// A resolved body together with the parameters it is a function of.
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpression {
    pub parameters: Vec<ParameterDeclaration>,
    pub body: TypedExpr,
    /// `Void` when the body's value is discarded.
    pub return_type: Type,
    /// Always a `Type::Delegate`.
    pub delegate_type: Type,
}

//! dynex_checker: Resolves parsed expressions into typed expression trees.
//!
//! Names are bound against the declared parameters, the implicit `it` and
//! the host type model; operators, calls and aggregates are typed, overloads
//! are chosen, and implicit conversions become explicit nodes.

mod aggregates;
mod checker;
mod intrinsics;
mod overload;
mod typed;

pub use aggregates::aggregate_result;
pub use checker::{assignment_cost, coerce, Checker};
pub use intrinsics::IntrinsicMethod;
pub use overload::{resolve_overload, OverloadResolution};
pub use typed::{
    Aggregate, AggregateArgument, BinaryOperator, ConstantValue, ExprKind, Intrinsic, LambdaExpression,
    MembershipSource, TypedExpr, UnaryOperator,
};

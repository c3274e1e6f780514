//! Sequence aggregates: `Items.Any(Price > 10)`, `Lines.Sum(Quantity)`.
//!
//! Predicate and selector arguments are bound in a child scope whose `it` is
//! the element; plain value arguments (`Take(3)`) see the enclosing scope.

use crate::checker::{bind_error, convert_checked, lift, CheckResult, Checker};
use crate::typed::{Aggregate, AggregateArgument, ExprKind, TypedExpr};
use dynex_ast::node::Expression;
use dynex_core::text::TextSpan;
use dynex_diagnostics::messages;
use dynex_types::{PrimitiveType, Type};

impl Checker<'_, '_> {
    pub(crate) fn bind_aggregate(
        &mut self,
        source: TypedExpr,
        element: Type,
        aggregate: Aggregate,
        name: &str,
        arguments: &[Expression<'_>],
        span: TextSpan,
    ) -> CheckResult<TypedExpr> {
        let source_type = source.ty.to_string();
        let no_match = || bind_error(&messages::NO_APPLICABLE_AGGREGATE, &[name, &source_type], span);

        let (argument, ty) = match (aggregate, arguments) {
            (Aggregate::Any, []) => (None, Type::BOOLEAN),
            (Aggregate::Count, []) => (None, Type::INT32),
            (Aggregate::First | Aggregate::FirstOrDefault, []) => (None, element),

            (
                Aggregate::Any | Aggregate::All | Aggregate::Count | Aggregate::Where | Aggregate::First
                | Aggregate::FirstOrDefault,
                [predicate],
            ) => {
                let body = self.bind_lambda_body(&element, predicate)?;
                if body.ty != Type::BOOLEAN {
                    return Err(bind_error(
                        &messages::BOOLEAN_EXPRESSION_EXPECTED,
                        &[&body.ty.to_string()],
                        body.span,
                    ));
                }
                let ty = match aggregate {
                    Aggregate::Any | Aggregate::All => Type::BOOLEAN,
                    Aggregate::Count => Type::INT32,
                    Aggregate::Where => Type::sequence(element),
                    _ => element,
                };
                (Some(AggregateArgument::Lambda(Box::new(body))), ty)
            }

            (Aggregate::Select, [selector]) => {
                let body = self.bind_lambda_body(&element, selector)?;
                let ty = Type::sequence(body.ty.clone());
                (Some(AggregateArgument::Lambda(Box::new(body))), ty)
            }
            (Aggregate::OrderBy | Aggregate::OrderByDescending, [selector]) => {
                let body = self.bind_lambda_body(&element, selector)?;
                (Some(AggregateArgument::Lambda(Box::new(body))), Type::sequence(element))
            }

            (Aggregate::Sum | Aggregate::Average | Aggregate::Min | Aggregate::Max, []) => {
                let ty = aggregate_result(aggregate, &element).ok_or_else(no_match)?;
                (None, ty)
            }
            (Aggregate::Sum | Aggregate::Average | Aggregate::Min | Aggregate::Max, [selector]) => {
                let body = self.bind_lambda_body(&element, selector)?;
                let ty = aggregate_result(aggregate, &body.ty).ok_or_else(no_match)?;
                let body = match accumulator_type(aggregate, &body.ty) {
                    Some(input) => body.convert_to(&input),
                    None => body,
                };
                (Some(AggregateArgument::Lambda(Box::new(body))), ty)
            }

            (Aggregate::Take | Aggregate::Skip, [count]) => {
                let count = self.check_value(count)?;
                let count = convert_checked(count, &Type::INT32)?;
                (Some(AggregateArgument::Value(Box::new(count))), Type::sequence(element))
            }
            (Aggregate::Contains, [value]) => {
                let value = self.check_value(value)?;
                let value = convert_checked(value, &element)?;
                (Some(AggregateArgument::Value(Box::new(value))), Type::BOOLEAN)
            }

            _ => return Err(no_match()),
        };

        tracing::trace!(aggregate = name, result = %ty, "bound aggregate");
        Ok(TypedExpr::new(
            ExprKind::Aggregate { aggregate, source: Box::new(source), argument },
            ty,
            span,
        ))
    }

    fn bind_lambda_body(&mut self, element: &Type, body: &Expression<'_>) -> CheckResult<TypedExpr> {
        self.scopes.push_element_scope(element.clone());
        let result = self.check_value(body);
        self.scopes.pop();
        result
    }
}

/// The type values are accumulated in by `Sum` and `Average`: small integral
/// types in `Int32`, `UInt32` in `Int64`, `UInt64` in `Single`.
fn accumulator_type(aggregate: Aggregate, value: &Type) -> Option<Type> {
    use PrimitiveType::*;
    if !matches!(aggregate, Aggregate::Sum | Aggregate::Average) {
        return None;
    }
    let accumulator = match value.primitive()? {
        SByte | Byte | Int16 | UInt16 | Int32 => Int32,
        UInt32 | Int64 => Int64,
        UInt64 | Single => Single,
        Double => Double,
        Decimal => Decimal,
        _ => return None,
    };
    Some(lift(accumulator, value.is_nullable()))
}

/// Result type of a numeric aggregate over values of type `value`.
pub fn aggregate_result(aggregate: Aggregate, value: &Type) -> Option<Type> {
    match aggregate {
        Aggregate::Sum => accumulator_type(aggregate, value),
        Aggregate::Average => {
            let accumulator = accumulator_type(aggregate, value)?;
            Some(match accumulator.primitive() {
                Some(PrimitiveType::Int32 | PrimitiveType::Int64) => {
                    lift(PrimitiveType::Double, value.is_nullable())
                }
                _ => accumulator,
            })
        }
        Aggregate::Min | Aggregate::Max => is_orderable(value).then(|| value.clone()),
        _ => None,
    }
}

fn is_orderable(ty: &Type) -> bool {
    ty.primitive()
        .is_some_and(|p| p.is_numeric() || matches!(p, PrimitiveType::Char | PrimitiveType::String | PrimitiveType::Boolean))
}

//! Assembly of a resolved body and its parameters into a [`LambdaExpression`].

use dynex_checker::{coerce, LambdaExpression, TypedExpr};
use dynex_core::text::TextSpan;
use dynex_diagnostics::{messages, BindError};
use dynex_types::{DelegateSignature, ParameterDeclaration, Type};

/// What the assembled lambda must return.
#[derive(Debug, Clone, Copy)]
pub enum ReturnTarget<'s> {
    /// Whatever the body produces: `Func<.., R>`, or `Action<..>` for a `Void` body.
    Inferred,
    /// A required result type. `Void` discards the body's value.
    Type(&'s Type),
    /// A delegate shape; the lambda takes on the delegate's type.
    Delegate(&'s DelegateSignature),
}

/// Wrap `body` as a function of `parameters`.
///
/// The body is converted to the target's return type when they differ. A
/// `Void` target accepts only a call-shaped body (or one that is already
/// `Void`); any other body is rejected.
pub fn assemble(
    parameters: Vec<ParameterDeclaration>,
    body: TypedExpr,
    target: ReturnTarget<'_>,
) -> Result<LambdaExpression, BindError> {
    match target {
        ReturnTarget::Inferred => {
            let return_type = body.ty.clone();
            let delegate_type = Type::delegate(DelegateSignature::anonymous(parameters.clone(), return_type.clone()));
            Ok(LambdaExpression { parameters, body, return_type, delegate_type })
        }
        ReturnTarget::Type(result) => {
            let body = convert_body(body, result)?;
            let delegate_type = Type::delegate(DelegateSignature::anonymous(parameters.clone(), result.clone()));
            Ok(LambdaExpression { parameters, body, return_type: result.clone(), delegate_type })
        }
        ReturnTarget::Delegate(signature) => {
            check_parameters(signature, &parameters)?;
            let body = convert_body(body, &signature.return_type)?;
            Ok(LambdaExpression {
                parameters,
                body,
                return_type: signature.return_type.clone(),
                delegate_type: Type::delegate(signature.clone()),
            })
        }
    }
}

/// Parameters supplied alongside a delegate must match its declared count and types.
fn check_parameters(signature: &DelegateSignature, parameters: &[ParameterDeclaration]) -> Result<(), BindError> {
    if signature.parameters.len() != parameters.len() {
        return Err(BindError::new(
            &messages::DELEGATE_PARAMETER_COUNT,
            &[
                &signature.to_string(),
                &signature.parameters.len().to_string(),
                &parameters.len().to_string(),
            ],
            TextSpan::empty(0),
        ));
    }
    for (declared, supplied) in signature.parameters.iter().zip(parameters) {
        if declared.ty != supplied.ty {
            return Err(BindError::new(
                &messages::CANNOT_CONVERT,
                &[&declared.ty.to_string(), &supplied.ty.to_string()],
                TextSpan::empty(0),
            ));
        }
    }
    Ok(())
}

fn convert_body(body: TypedExpr, target: &Type) -> Result<TypedExpr, BindError> {
    if target.is_void() {
        if body.ty.is_void() || body.is_call_shaped() {
            return Ok(body);
        }
        return Err(BindError::new(
            &messages::VOID_LAMBDA_REQUIRES_CALL,
            &[&body.ty.to_string()],
            body.span,
        ));
    }
    if body.ty.is_void() {
        return Err(BindError::new(
            &messages::EXPRESSION_TYPE_MISMATCH,
            &[&target.to_string(), "Void"],
            body.span,
        ));
    }
    coerce(body, target).map_err(|body| {
        BindError::new(
            &messages::EXPRESSION_TYPE_MISMATCH,
            &[&target.to_string(), &body.ty.to_string()],
            body.span,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynex_checker::{ConstantValue, ExprKind};

    fn one() -> TypedExpr {
        TypedExpr::constant(ConstantValue::Int32(1), TextSpan::new(0, 1))
    }

    #[test]
    fn test_inferred_delegate_type() {
        let lambda = assemble(vec![ParameterDeclaration::new("x", Type::INT32)], one(), ReturnTarget::Inferred).unwrap();
        assert_eq!(lambda.return_type, Type::INT32);
        assert_eq!(lambda.delegate_type.to_string(), "Func<Int32, Int32>");
    }

    #[test]
    fn test_result_type_inserts_conversion() {
        let lambda = assemble(vec![], one(), ReturnTarget::Type(&Type::INT64)).unwrap();
        assert_eq!(lambda.body.ty, Type::INT64);
        assert!(matches!(lambda.body.kind, ExprKind::Convert { .. }));
    }

    #[test]
    fn test_result_type_mismatch() {
        let err = assemble(vec![], one(), ReturnTarget::Type(&Type::STRING)).unwrap_err();
        assert_eq!(err.code, 3014);
        assert_eq!(err.message, "Expression of type 'String' expected, found 'Int32'.");
    }

    #[test]
    fn test_void_target_rejects_plain_value() {
        let err = assemble(vec![], one(), ReturnTarget::Type(&Type::Void)).unwrap_err();
        assert_eq!(err.code, 3015);
    }

    #[test]
    fn test_delegate_parameter_count() {
        let signature = DelegateSignature::named("Handler", vec![ParameterDeclaration::new("a", Type::INT32)], Type::INT32);
        let err = assemble(vec![], one(), ReturnTarget::Delegate(&signature)).unwrap_err();
        assert_eq!(err.code, 3021);
        assert_eq!(err.message, "Delegate 'Handler' declares 1 parameters but 0 were supplied.");
    }
}

//! Resolution of syntax trees into typed expression trees.
//!
//! The checker walks a parsed [`Expression`] once, resolving every name
//! against the scope chain and the host type model, picking overloads and
//! making every implicit conversion explicit. The first error aborts.

use crate::intrinsics;
use crate::overload::{resolve_overload, OverloadResolution};
use crate::typed::{
    Aggregate, BinaryOperator, ConstantValue, ExprKind, MembershipSource, TypedExpr, UnaryOperator,
};
use dynex_ast::node::*;
use dynex_ast::syntax_kind::SyntaxKind;
use dynex_binder::{KeywordLiteral, ScopeChain, Symbol, SymbolKind, SymbolTable, IMPLICIT_PARAMETER_NAME};
use dynex_core::text::TextSpan;
use dynex_diagnostics::{messages, BindError, DiagnosticMessage, ParseFailure, SyntaxError};
use dynex_options::ParserOptions;
use dynex_types::{
    conversion_cost, find_numeric_promotion, is_explicitly_convertible, is_implicitly_convertible,
    DynamicProperty, IndexerSignature, PrimitiveType, PropertySignature, RecordCache, Type,
};
use std::sync::Arc;

pub(crate) type CheckResult<T> = Result<T, ParseFailure>;

pub(crate) fn bind_error(message: &DiagnosticMessage, args: &[&str], span: TextSpan) -> ParseFailure {
    BindError::new(message, args, span).into()
}

/// Resolves parsed expressions against declared parameters and host types.
pub struct Checker<'t, 'c> {
    pub(crate) scopes: ScopeChain<'t>,
    records: &'c RecordCache,
    options: &'t ParserOptions,
}

impl<'t, 'c> Checker<'t, 'c> {
    pub fn new(symbols: &'t SymbolTable, records: &'c RecordCache, options: &'t ParserOptions) -> Self {
        Self {
            scopes: ScopeChain::new(symbols),
            records,
            options,
        }
    }

    /// Resolve a complete expression. Only the outermost node may be `Void`.
    pub fn check(&mut self, expression: &Expression<'_>) -> CheckResult<TypedExpr> {
        self.check_expression(expression)
    }

    fn check_expression(&mut self, expression: &Expression<'_>) -> CheckResult<TypedExpr> {
        match expression {
            Expression::Literal(literal) => check_literal(literal),
            Expression::Identifier(identifier) => self.check_identifier(identifier),
            Expression::TypeReference(reference) => match self.shadowing_target(reference.name, reference.data.span) {
                Some(it) => bind_member(it, reference.name, reference.data.span),
                None => Err(SyntaxError::new(
                    &messages::_0_EXPECTED,
                    &["("],
                    TextSpan::empty(reference.data.span.end()),
                )
                .into()),
            },
            Expression::MemberAccess(access) => self.check_member_access(access),
            Expression::Index(index) => self.check_index(index),
            Expression::Call(call) => self.check_call(call),
            Expression::Conversion(conversion) => self.check_conversion(conversion),
            Expression::PrefixUnary(unary) => self.check_unary(unary),
            Expression::Binary(binary) => self.check_binary(binary),
            Expression::Conditional(conditional) => self.bind_conditional(
                conditional.condition,
                conditional.when_true,
                conditional.when_false,
                conditional.data.span,
            ),
            Expression::Membership(membership) => self.check_membership(membership),
            Expression::NewObject(new_object) => self.check_new_object(new_object),
            Expression::NewArray(new_array) => self.check_new_array(new_array),
        }
    }

    /// Resolve an operand. Operands must produce a value.
    pub(crate) fn check_value(&mut self, expression: &Expression<'_>) -> CheckResult<TypedExpr> {
        let typed = self.check_expression(expression)?;
        if typed.ty.is_void() {
            return Err(bind_error(&messages::VOID_VALUE_NOT_ALLOWED, &[], typed.span));
        }
        Ok(typed)
    }

    fn check_arguments(&mut self, arguments: &[Expression<'_>]) -> CheckResult<Vec<TypedExpr>> {
        let mut typed = Vec::with_capacity(arguments.len());
        for argument in arguments {
            typed.push(self.check_value(argument)?);
        }
        Ok(typed)
    }

    // ========================================================================
    // Names and members
    // ========================================================================

    fn check_identifier(&self, identifier: &Identifier<'_>) -> CheckResult<TypedExpr> {
        let span = identifier.data.span;
        if identifier.name == IMPLICIT_PARAMETER_NAME {
            let it = self.scopes.resolve_implicit(span)?;
            return Ok(parameter_reference(it, span));
        }
        if let Some(symbol) = self.scopes.lookup(identifier.name) {
            return Ok(match symbol.kind {
                SymbolKind::Keyword(keyword) => TypedExpr::constant(keyword_constant(keyword), span),
                SymbolKind::Parameter { .. } => parameter_reference(symbol, span),
            });
        }
        match self.implicit_target(span) {
            Some(it) => bind_member(it, identifier.name, span),
            None => Err(bind_error(&messages::UNKNOWN_IDENTIFIER, &[identifier.name], span)),
        }
    }

    /// The innermost `it`, when bare names may resolve against it.
    fn implicit_target(&self, span: TextSpan) -> Option<TypedExpr> {
        if !self.options.implicit_member_access {
            return None;
        }
        self.scopes
            .implicit_parameter()
            .map(|it| parameter_reference(it, span))
    }

    /// The innermost `it` when one of its members is named like a predefined
    /// type; the member then shadows the type.
    fn shadowing_target(&self, name: &str, span: TextSpan) -> Option<TypedExpr> {
        self.implicit_target(span)
            .filter(|it| it.ty.member(name).is_some() || !it.ty.methods(name).is_empty())
    }

    fn check_member_access(&mut self, access: &MemberAccessExpression<'_>) -> CheckResult<TypedExpr> {
        let span = access.data.span;
        if let Expression::TypeReference(owner) = access.expression {
            if let Some(it) = self.shadowing_target(owner.name, owner.data.span) {
                let target = bind_member(it, owner.name, owner.data.span)?;
                return bind_member(target, access.name, span);
            }
            return intrinsics::static_constant(owner.known, access.name)
                .map(|value| TypedExpr::constant(value, span))
                .ok_or_else(|| {
                    bind_error(
                        &messages::NO_STATIC_MEMBER,
                        &[owner.known.name(), access.name],
                        access.name_span,
                    )
                });
        }
        let target = self.check_value(access.expression)?;
        bind_member(target, access.name, span)
    }

    fn check_index(&mut self, index: &IndexExpression<'_>) -> CheckResult<TypedExpr> {
        let span = index.data.span;
        let target = self.check_value(index.expression)?;
        let arguments = self.check_arguments(index.arguments)?;

        let by_position = |return_type: Type| IndexerSignature {
            parameters: vec![Type::INT32],
            return_type,
        };
        let indexers = match &target.ty {
            Type::Array(element) => vec![by_position(element.as_ref().clone())],
            Type::Primitive(PrimitiveType::String) => vec![by_position(Type::CHAR)],
            Type::Class(class) => class.descriptor().indexers(),
            _ => Vec::new(),
        };
        let candidates: Vec<&[Type]> = indexers.iter().map(|i| i.parameters.as_slice()).collect();
        let owner = target.ty.to_string();
        let indexer = match select_overload(&candidates, &arguments) {
            OverloadResolution::Found(i) => &indexers[i],
            OverloadResolution::NoneApplicable => {
                return Err(bind_error(&messages::NO_APPLICABLE_INDEXER, &[&owner], span))
            }
            OverloadResolution::Ambiguous => {
                return Err(bind_error(&messages::AMBIGUOUS_METHOD_INVOCATION, &["this[]", &owner], span))
            }
        };
        let arguments = convert_arguments(arguments, &indexer.parameters);
        Ok(TypedExpr::new(
            ExprKind::Index { target: Box::new(target), arguments },
            indexer.return_type.clone(),
            span,
        ))
    }

    // ========================================================================
    // Calls
    // ========================================================================

    fn check_call(&mut self, call: &CallExpression<'_>) -> CheckResult<TypedExpr> {
        match call.target {
            None if call.name == "iif" => {
                let [condition, when_true, when_false] = call.arguments else {
                    return Err(bind_error(&messages::IIF_REQUIRES_THREE_ARGUMENTS, &[], call.data.span));
                };
                self.bind_conditional(condition, when_true, when_false, call.data.span)
            }
            None => self.check_unqualified_call(call),
            Some(Expression::TypeReference(owner)) => match self.shadowing_target(owner.name, owner.data.span) {
                Some(it) => {
                    let target = bind_member(it, owner.name, owner.data.span)?;
                    self.bind_method_call(target, call.name, call.arguments, call.data.span)
                }
                None => self.check_static_call(owner, call),
            },
            Some(target) => {
                let target = self.check_value(target)?;
                self.bind_method_call(target, call.name, call.arguments, call.data.span)
            }
        }
    }

    /// `Name(args)`: a delegate parameter, or a method of the implicit `it`.
    fn check_unqualified_call(&mut self, call: &CallExpression<'_>) -> CheckResult<TypedExpr> {
        let span = call.data.span;
        if let Some(symbol) = self.scopes.lookup(call.name).filter(|s| s.is_parameter()) {
            let delegate = parameter_reference(symbol, call.name_span);
            return self.bind_invoke(delegate, call.name, call.arguments, span);
        }
        match self.implicit_target(call.name_span) {
            Some(it) => self.bind_method_call(it, call.name, call.arguments, span),
            None => Err(bind_error(&messages::UNKNOWN_IDENTIFIER, &[call.name], call.name_span)),
        }
    }

    fn bind_invoke(
        &mut self,
        delegate: TypedExpr,
        name: &str,
        arguments: &[Expression<'_>],
        span: TextSpan,
    ) -> CheckResult<TypedExpr> {
        let Type::Delegate(signature) = &delegate.ty else {
            return Err(bind_error(
                &messages::NO_APPLICABLE_METHOD,
                &[name, &delegate.ty.to_string()],
                span,
            ));
        };
        let signature = Arc::clone(signature);
        if arguments.len() != signature.parameters.len() {
            return Err(bind_error(
                &messages::DELEGATE_ARGUMENT_COUNT,
                &[
                    &signature.to_string(),
                    &signature.parameters.len().to_string(),
                    &arguments.len().to_string(),
                ],
                span,
            ));
        }
        let mut converted = Vec::with_capacity(arguments.len());
        for (argument, parameter) in arguments.iter().zip(&signature.parameters) {
            let typed = self.check_value(argument)?;
            converted.push(convert_checked(typed, &parameter.ty)?);
        }
        Ok(TypedExpr::new(
            ExprKind::Invoke { delegate: Box::new(delegate), arguments: converted },
            signature.return_type.clone(),
            span,
        ))
    }

    /// `target.name(args)`: an aggregate over a sequence, a host method, or a
    /// built-in method, in that order.
    pub(crate) fn bind_method_call(
        &mut self,
        target: TypedExpr,
        name: &str,
        arguments: &[Expression<'_>],
        span: TextSpan,
    ) -> CheckResult<TypedExpr> {
        if let (Some(element), Some(aggregate)) = (target.ty.element_type(), Aggregate::from_name(name)) {
            return self.bind_aggregate(target, element, aggregate, name, arguments, span);
        }

        let arguments = self.check_arguments(arguments)?;
        let owner = target.ty.to_string();

        let methods = target.ty.methods(name);
        if !methods.is_empty() {
            let candidates: Vec<&[Type]> = methods.iter().map(|m| m.parameters.as_slice()).collect();
            let method = &methods[pick(select_overload(&candidates, &arguments), name, &owner, span)?];
            let arguments = convert_arguments(arguments, &method.parameters);
            return Ok(TypedExpr::new(
                ExprKind::Call { target: Box::new(target), method: name.to_string(), arguments },
                method.return_type.clone(),
                span,
            ));
        }

        let builtins = intrinsics::instance_methods(&target.ty, name);
        let candidates: Vec<&[Type]> = builtins.iter().map(|m| m.parameters.as_slice()).collect();
        let builtin = &builtins[pick(select_overload(&candidates, &arguments), name, &owner, span)?];
        let arguments = convert_arguments(arguments, &builtin.parameters);
        Ok(TypedExpr::new(
            ExprKind::Intrinsic { intrinsic: builtin.intrinsic, target: Some(Box::new(target)), arguments },
            builtin.return_type.clone(),
            span,
        ))
    }

    fn check_static_call(&mut self, owner: &TypeReference<'_>, call: &CallExpression<'_>) -> CheckResult<TypedExpr> {
        let span = call.data.span;
        let builtins = intrinsics::static_methods(owner.known, call.name);
        if builtins.is_empty() {
            return Err(bind_error(
                &messages::NO_STATIC_MEMBER,
                &[owner.known.name(), call.name],
                call.name_span,
            ));
        }
        let arguments = self.check_arguments(call.arguments)?;
        let candidates: Vec<&[Type]> = builtins.iter().map(|m| m.parameters.as_slice()).collect();
        let builtin = &builtins[pick(select_overload(&candidates, &arguments), call.name, owner.known.name(), span)?];
        let arguments = convert_arguments(arguments, &builtin.parameters);
        Ok(TypedExpr::new(
            ExprKind::Intrinsic { intrinsic: builtin.intrinsic, target: None, arguments },
            builtin.return_type.clone(),
            span,
        ))
    }

    /// `T(x)`: an explicit conversion to a predefined type.
    fn check_conversion(&mut self, conversion: &ConversionExpression<'_>) -> CheckResult<TypedExpr> {
        let span = conversion.data.span;
        let reference = &conversion.target_type;
        if let Some(it) = self.shadowing_target(reference.name, reference.data.span) {
            return self.bind_method_call(it, reference.name, conversion.arguments, span);
        }
        let name = conversion.target_type.known.name();
        let Some(target) = conversion.target_type.known.as_type() else {
            return Err(bind_error(&messages::NO_APPLICABLE_METHOD, &[name, name], span));
        };
        let [argument] = conversion.arguments else {
            return Err(bind_error(&messages::CONVERSION_REQUIRES_ONE_ARGUMENT, &[name], span));
        };
        let operand = self.check_value(argument)?;
        if !is_explicitly_convertible(&operand.ty, &target) && assignment_cost(&operand, &target).is_none() {
            return Err(bind_error(
                &messages::CANNOT_CONVERT,
                &[&operand.ty.to_string(), &target.to_string()],
                span,
            ));
        }
        let mut converted = operand.convert_to(&target);
        converted.span = span;
        Ok(converted)
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn check_unary(&mut self, unary: &PrefixUnaryExpression<'_>) -> CheckResult<TypedExpr> {
        let span = unary.data.span;
        let operand = self.check_value(unary.operand)?;
        let (operator, ty) = match unary.operator {
            SyntaxKind::MinusToken => (UnaryOperator::Negate, negation_type(&operand.ty)),
            _ => (UnaryOperator::Not, operand.ty.is_boolean().then(|| operand.ty.clone())),
        };
        let Some(ty) = ty else {
            return Err(bind_error(
                &messages::INCOMPATIBLE_OPERAND_TYPE,
                &[&unary.operator.to_string(), &operand.ty.to_string()],
                span,
            ));
        };
        let operand = operand.convert_to(&ty);
        Ok(TypedExpr::new(ExprKind::Unary { operator, operand: Box::new(operand) }, ty, span))
    }

    fn check_binary(&mut self, binary: &BinaryExpression<'_>) -> CheckResult<TypedExpr> {
        let span = binary.data.span;
        let left = self.check_value(binary.left)?;
        let right = self.check_value(binary.right)?;
        let incompatible = |left: &TypedExpr, right: &TypedExpr| {
            bind_error(
                &messages::INCOMPATIBLE_OPERAND_TYPES,
                &[&binary.operator.to_string(), &left.ty.to_string(), &right.ty.to_string()],
                span,
            )
        };

        if binary.operator == SyntaxKind::QuestionQuestionToken {
            return bind_coalesce(left, right, span);
        }
        let Some(operator) = binary_operator(binary.operator) else {
            return Err(incompatible(&left, &right));
        };

        let (operand_type, result_type) = match operator {
            BinaryOperator::AndAlso | BinaryOperator::OrElse => {
                if !left.ty.is_boolean() || !right.ty.is_boolean() {
                    return Err(incompatible(&left, &right));
                }
                let ty = lift(PrimitiveType::Boolean, left.ty.is_nullable() || right.ty.is_nullable());
                (ty.clone(), ty)
            }
            BinaryOperator::Equal | BinaryOperator::NotEqual => {
                let common = equality_type(&left, &right).ok_or_else(|| incompatible(&left, &right))?;
                (common, Type::BOOLEAN)
            }
            op if op.is_comparison() => {
                let common = find_numeric_promotion(&left.ty, &right.ty, false)
                    .or_else(|| (left.ty.is_string() && right.ty.is_string()).then_some(Type::STRING))
                    .ok_or_else(|| incompatible(&left, &right))?;
                (common, Type::BOOLEAN)
            }
            BinaryOperator::Add
                if self.options.string_concatenation && (left.ty.is_string() || right.ty.is_string()) =>
            {
                let node = ExprKind::Binary {
                    operator: BinaryOperator::Concat,
                    left: Box::new(left),
                    right: Box::new(right),
                };
                return Ok(TypedExpr::new(node, Type::STRING, span));
            }
            _ => {
                let common = find_numeric_promotion(&left.ty, &right.ty, true)
                    .ok_or_else(|| incompatible(&left, &right))?;
                (common.clone(), common)
            }
        };

        let node = ExprKind::Binary {
            operator,
            left: Box::new(left.convert_to(&operand_type)),
            right: Box::new(right.convert_to(&operand_type)),
        };
        Ok(TypedExpr::new(node, result_type, span))
    }

    /// `c ? a : b` and `iif(c, a, b)`.
    fn bind_conditional(
        &mut self,
        condition: &Expression<'_>,
        when_true: &Expression<'_>,
        when_false: &Expression<'_>,
        span: TextSpan,
    ) -> CheckResult<TypedExpr> {
        let condition = self.check_value(condition)?;
        if condition.ty != Type::BOOLEAN {
            return Err(bind_error(
                &messages::BOOLEAN_EXPRESSION_EXPECTED,
                &[&condition.ty.to_string()],
                condition.span,
            ));
        }
        let when_true = self.check_value(when_true)?;
        let when_false = self.check_value(when_false)?;
        let Some(ty) = unify(&when_true.ty, &when_false).or_else(|| unify(&when_false.ty, &when_true)) else {
            return Err(bind_error(
                &messages::NEITHER_TYPE_CONVERTS,
                &[&when_true.ty.to_string(), &when_false.ty.to_string()],
                span,
            ));
        };
        let node = ExprKind::Conditional {
            condition: Box::new(condition),
            when_true: Box::new(when_true.convert_to(&ty)),
            when_false: Box::new(when_false.convert_to(&ty)),
        };
        Ok(TypedExpr::new(node, ty, span))
    }

    fn check_membership(&mut self, membership: &MembershipExpression<'_>) -> CheckResult<TypedExpr> {
        let span = membership.data.span;
        let operand = self.check_value(membership.operand)?;
        let incompatible = |operand: &TypedExpr, other: &Type| {
            bind_error(
                &messages::INCOMPATIBLE_OPERAND_TYPES,
                &["in", &operand.ty.to_string(), &other.to_string()],
                span,
            )
        };

        let (operand, source) = match &membership.candidates {
            MembershipCandidates::List(items) => {
                let mut common = operand.ty.clone();
                let mut candidates = Vec::with_capacity(items.len());
                for item in items.iter() {
                    let candidate = self.check_value(item)?;
                    common = unify(&common, &candidate).ok_or_else(|| incompatible(&operand, &candidate.ty))?;
                    candidates.push(candidate);
                }
                let candidates = candidates.into_iter().map(|c| c.convert_to(&common)).collect();
                (operand.convert_to(&common), MembershipSource::List(candidates))
            }
            MembershipCandidates::Source(source) => {
                let source = self.check_value(source)?;
                match source.ty.element_type() {
                    Some(element) if assignment_cost(&operand, &element).is_some() => {
                        (operand.convert_to(&element), MembershipSource::Sequence(Box::new(source)))
                    }
                    _ => return Err(incompatible(&operand, &source.ty)),
                }
            }
        };
        Ok(TypedExpr::new(
            ExprKind::Membership { operand: Box::new(operand), source },
            Type::BOOLEAN,
            span,
        ))
    }

    // ========================================================================
    // Construction
    // ========================================================================

    fn check_new_object(&mut self, new_object: &NewObjectExpression<'_>) -> CheckResult<TypedExpr> {
        let span = new_object.data.span;
        let mut values = Vec::with_capacity(new_object.properties.len());
        let mut properties = Vec::with_capacity(new_object.properties.len());
        for property in new_object.properties.iter() {
            let mut value = self.check_value(&property.expression)?;
            if value.ty == Type::Null {
                value = value.convert_to(&Type::OBJECT);
            }
            properties.push(DynamicProperty::new(property.name, value.ty.clone()));
            values.push(value);
        }
        let record = self
            .records
            .get_or_create(PropertySignature::new(properties))
            .map_err(|mut error| {
                error.span = span;
                ParseFailure::from(error)
            })?;
        Ok(TypedExpr::new(ExprKind::NewRecord { values }, Type::record(record), span))
    }

    fn check_new_array(&mut self, new_array: &NewArrayExpression<'_>) -> CheckResult<TypedExpr> {
        let span = new_array.data.span;
        let elements = self.check_arguments(new_array.elements)?;
        let element_type = match &new_array.element_type {
            Some(reference) => reference.known.as_type().ok_or_else(|| {
                bind_error(&messages::UNKNOWN_IDENTIFIER, &[reference.name], reference.data.span)
            })?,
            None => best_element_type(&elements)?,
        };
        let mut converted = Vec::with_capacity(elements.len());
        for element in elements {
            converted.push(convert_checked(element, &element_type)?);
        }
        Ok(TypedExpr::new(
            ExprKind::NewArray { elements: converted },
            Type::array(element_type),
            span,
        ))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parameter_reference(symbol: &Symbol, span: TextSpan) -> TypedExpr {
    TypedExpr::new(
        ExprKind::Parameter { name: symbol.env_name().to_string() },
        symbol.ty.clone(),
        span,
    )
}

fn keyword_constant(keyword: KeywordLiteral) -> ConstantValue {
    match keyword {
        KeywordLiteral::True => ConstantValue::Boolean(true),
        KeywordLiteral::False => ConstantValue::Boolean(false),
        KeywordLiteral::Null => ConstantValue::Null,
    }
}

fn check_literal(literal: &Literal<'_>) -> CheckResult<TypedExpr> {
    let span = literal.data.span;
    let value = match literal.value {
        LiteralValue::Integer { magnitude, negative, suffix } => integer_constant(magnitude, negative, suffix)
            .ok_or_else(|| SyntaxError::new(&messages::INVALID_INTEGER_LITERAL, &[literal.text], span))?,
        LiteralValue::Real { value, suffix } => match suffix {
            RealSuffix::Single => {
                let single = value as f32;
                if !single.is_finite() {
                    return Err(SyntaxError::new(&messages::INVALID_REAL_LITERAL, &[literal.text], span).into());
                }
                ConstantValue::Single(single)
            }
            RealSuffix::Decimal => ConstantValue::Decimal(value),
            RealSuffix::None | RealSuffix::Double => ConstantValue::Double(value),
        },
        LiteralValue::String(text) => ConstantValue::String(text.to_string()),
        LiteralValue::Char(c) => ConstantValue::Char(c),
        LiteralValue::True => ConstantValue::Boolean(true),
        LiteralValue::False => ConstantValue::Boolean(false),
        LiteralValue::Null => ConstantValue::Null,
    };
    Ok(TypedExpr::constant(value, span))
}

/// Type an integer literal: the first of `Int32, UInt32, Int64, UInt64` (as
/// narrowed by the suffix) that holds the value. A folded sign only fits the
/// signed types.
fn integer_constant(magnitude: u64, negative: bool, suffix: IntegerSuffix) -> Option<ConstantValue> {
    const INT32_MAX: u64 = i32::MAX as u64;
    const UINT32_MAX: u64 = u32::MAX as u64;
    const INT64_MAX: u64 = i64::MAX as u64;

    if negative {
        return match suffix {
            IntegerSuffix::None if magnitude <= INT32_MAX + 1 => {
                Some(ConstantValue::Int32((magnitude as i64).wrapping_neg() as i32))
            }
            IntegerSuffix::None | IntegerSuffix::Long if magnitude <= INT64_MAX + 1 => {
                Some(ConstantValue::Int64((magnitude as i64).wrapping_neg()))
            }
            _ => None,
        };
    }

    let value = match suffix {
        IntegerSuffix::None if magnitude <= INT32_MAX => ConstantValue::Int32(magnitude as i32),
        IntegerSuffix::None | IntegerSuffix::Unsigned if magnitude <= UINT32_MAX => {
            ConstantValue::UInt32(magnitude as u32)
        }
        IntegerSuffix::None | IntegerSuffix::Long if magnitude <= INT64_MAX => ConstantValue::Int64(magnitude as i64),
        _ => ConstantValue::UInt64(magnitude),
    };
    Some(value)
}

fn bind_member(target: TypedExpr, name: &str, span: TextSpan) -> CheckResult<TypedExpr> {
    if let Some(member) = target.ty.member(name) {
        return Ok(TypedExpr::new(
            ExprKind::Member { target: Box::new(target), name: name.to_string() },
            member.ty,
            span,
        ));
    }
    if let Some((intrinsic, ty)) = intrinsics::instance_property(&target.ty, name) {
        return Ok(TypedExpr::new(
            ExprKind::Intrinsic { intrinsic, target: Some(Box::new(target)), arguments: Vec::new() },
            ty,
            span,
        ));
    }
    Err(bind_error(
        &messages::NO_PROPERTY_OR_FIELD,
        &[name, &target.ty.to_string()],
        span,
    ))
}

fn bind_coalesce(left: TypedExpr, right: TypedExpr, span: TextSpan) -> CheckResult<TypedExpr> {
    let ty = if left.ty == Type::Null {
        right.ty.clone()
    } else {
        if !left.ty.accepts_null() {
            return Err(bind_error(
                &messages::COALESCE_REQUIRES_NULLABLE,
                &[&left.ty.to_string()],
                left.span,
            ));
        }
        let underlying = left.ty.non_nullable();
        if assignment_cost(&right, &underlying).is_some() {
            underlying
        } else if assignment_cost(&right, &left.ty).is_some() {
            left.ty.clone()
        } else {
            return Err(bind_error(
                &messages::INCOMPATIBLE_OPERAND_TYPES,
                &["??", &left.ty.to_string(), &right.ty.to_string()],
                span,
            ));
        }
    };
    let left = if left.ty == Type::Null { left.convert_to(&ty) } else { left };
    let right = right.convert_to(&ty);
    Ok(TypedExpr::new(
        ExprKind::Coalesce { left: Box::new(left), right: Box::new(right) },
        ty,
        span,
    ))
}

fn binary_operator(kind: SyntaxKind) -> Option<BinaryOperator> {
    Some(match kind {
        SyntaxKind::PlusToken => BinaryOperator::Add,
        SyntaxKind::MinusToken => BinaryOperator::Subtract,
        SyntaxKind::AsteriskToken => BinaryOperator::Multiply,
        SyntaxKind::SlashToken => BinaryOperator::Divide,
        SyntaxKind::PercentToken => BinaryOperator::Modulo,
        SyntaxKind::EqualsEqualsToken => BinaryOperator::Equal,
        SyntaxKind::ExclamationEqualsToken => BinaryOperator::NotEqual,
        SyntaxKind::LessThanToken => BinaryOperator::LessThan,
        SyntaxKind::LessThanEqualsToken => BinaryOperator::LessThanOrEqual,
        SyntaxKind::GreaterThanToken => BinaryOperator::GreaterThan,
        SyntaxKind::GreaterThanEqualsToken => BinaryOperator::GreaterThanOrEqual,
        SyntaxKind::AmpersandAmpersandToken => BinaryOperator::AndAlso,
        SyntaxKind::BarBarToken => BinaryOperator::OrElse,
        _ => return None,
    })
}

pub(crate) fn lift(primitive: PrimitiveType, nullable: bool) -> Type {
    if nullable {
        Type::Nullable(primitive)
    } else {
        Type::Primitive(primitive)
    }
}

/// Result type of unary minus: small integral types promote to `Int32`,
/// `UInt32` to `Int64`. `UInt64` has no negation.
fn negation_type(ty: &Type) -> Option<Type> {
    use PrimitiveType::*;
    let promoted = match ty.primitive()? {
        SByte | Byte | Int16 | UInt16 | Char | Int32 => Int32,
        UInt32 | Int64 => Int64,
        p @ (Single | Double | Decimal) => p,
        _ => return None,
    };
    Some(lift(promoted, ty.is_nullable()))
}

/// Operand type of `==`/`!=`.
fn equality_type(left: &TypedExpr, right: &TypedExpr) -> Option<Type> {
    if let Some(promoted) = find_numeric_promotion(&left.ty, &right.ty, false) {
        return Some(promoted);
    }
    if left.ty == right.ty {
        return Some(left.ty.clone());
    }
    match (&left.ty, &right.ty) {
        (Type::Null, other) | (other, Type::Null) => return other.to_nullable(),
        _ => {}
    }
    if assignment_cost(right, &left.ty).is_some() {
        return Some(left.ty.clone());
    }
    if assignment_cost(left, &right.ty).is_some() {
        return Some(right.ty.clone());
    }
    None
}

/// The type both `current` and `next` convert to, if any.
pub(crate) fn unify(current: &Type, next: &TypedExpr) -> Option<Type> {
    if *current == next.ty {
        return Some(current.clone());
    }
    match (current, &next.ty) {
        (Type::Null, other) | (other, Type::Null) => return other.to_nullable(),
        _ => {}
    }
    if let Some(promoted) = find_numeric_promotion(current, &next.ty, false) {
        return Some(promoted);
    }
    if assignment_cost(next, current).is_some() {
        return Some(current.clone());
    }
    if is_implicitly_convertible(current, &next.ty) {
        return Some(next.ty.clone());
    }
    None
}

/// Element type of an untyped `new[] {..}`. Empty and all-null arrays are `Object[]`.
fn best_element_type(elements: &[TypedExpr]) -> CheckResult<Type> {
    let Some((first, rest)) = elements.split_first() else {
        return Ok(Type::OBJECT);
    };
    let mut best = first.ty.clone();
    for element in rest {
        best = unify(&best, element).ok_or_else(|| {
            bind_error(
                &messages::NO_BEST_ARRAY_TYPE,
                &[&best.to_string(), &element.ty.to_string()],
                element.span,
            )
        })?;
    }
    Ok(if best == Type::Null { Type::OBJECT } else { best })
}

/// Conversions needed to pass `expr` where `target` is expected. An integer
/// constant that fits the target's range converts to any integral type.
pub fn assignment_cost(expr: &TypedExpr, target: &Type) -> Option<u32> {
    conversion_cost(&expr.ty, target).or_else(|| constant_fits(expr, target).then_some(1))
}

fn constant_fits(expr: &TypedExpr, target: &Type) -> bool {
    let ExprKind::Constant(value) = &expr.kind else {
        return false;
    };
    let (Some(value), Some(primitive)) = (value.as_integer(), target.primitive()) else {
        return false;
    };
    let (min, max): (i128, i128) = match primitive {
        PrimitiveType::SByte => (i8::MIN.into(), i8::MAX.into()),
        PrimitiveType::Byte => (0, u8::MAX.into()),
        PrimitiveType::Int16 => (i16::MIN.into(), i16::MAX.into()),
        PrimitiveType::UInt16 => (0, u16::MAX.into()),
        PrimitiveType::Int32 => (i32::MIN.into(), i32::MAX.into()),
        PrimitiveType::UInt32 => (0, u32::MAX.into()),
        PrimitiveType::Int64 => (i64::MIN.into(), i64::MAX.into()),
        PrimitiveType::UInt64 => (0, u64::MAX.into()),
        _ => return false,
    };
    (min..=max).contains(&value)
}

/// Convert `expr` to `target` if it is assignable; otherwise hand it back.
pub fn coerce(expr: TypedExpr, target: &Type) -> Result<TypedExpr, TypedExpr> {
    if assignment_cost(&expr, target).is_some() {
        Ok(expr.convert_to(target))
    } else {
        Err(expr)
    }
}

pub(crate) fn convert_checked(expr: TypedExpr, target: &Type) -> CheckResult<TypedExpr> {
    coerce(expr, target).map_err(|expr| {
        bind_error(
            &messages::CANNOT_CONVERT,
            &[&expr.ty.to_string(), &target.to_string()],
            expr.span,
        )
    })
}

fn select_overload(candidates: &[&[Type]], arguments: &[TypedExpr]) -> OverloadResolution {
    let types: Vec<Type> = arguments.iter().map(|a| a.ty.clone()).collect();
    resolve_overload(candidates, &types, |i, parameter| assignment_cost(&arguments[i], parameter))
}

fn pick(resolution: OverloadResolution, name: &str, owner: &str, span: TextSpan) -> CheckResult<usize> {
    match resolution {
        OverloadResolution::Found(index) => Ok(index),
        OverloadResolution::NoneApplicable => {
            Err(bind_error(&messages::NO_APPLICABLE_METHOD, &[name, owner], span))
        }
        OverloadResolution::Ambiguous => {
            Err(bind_error(&messages::AMBIGUOUS_METHOD_INVOCATION, &[name, owner], span))
        }
    }
}

/// Convert arguments already known to be assignable to their parameters.
fn convert_arguments(arguments: Vec<TypedExpr>, parameters: &[Type]) -> Vec<TypedExpr> {
    arguments
        .into_iter()
        .zip(parameters)
        .map(|(argument, parameter)| argument.convert_to(parameter))
        .collect()
}

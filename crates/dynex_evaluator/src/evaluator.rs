//! The tree-walking interpreter.

use crate::value::{RecordValue, Value};
use crate::{sort, EvalError};
use dynex_binder::IMPLICIT_PARAMETER_NAME;
use dynex_checker::{
    Aggregate, AggregateArgument, BinaryOperator, ExprKind, Intrinsic, LambdaExpression, MembershipSource,
    TypedExpr, UnaryOperator,
};
use dynex_types::{PrimitiveType, Type};
use rustc_hash::FxHasher;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

type EvalResult<T = Value> = Result<T, EvalError>;

/// Invoke `lambda` once with `arguments`.
pub fn evaluate(lambda: &LambdaExpression, arguments: &[Value]) -> EvalResult {
    Evaluator::new().invoke(lambda, arguments)
}

/// Evaluates typed trees against a stack of parameter bindings.
///
/// Nested aggregate lambdas push their element as `it` and pop it again, so
/// an inner `it` shadows the outer one while named parameters stay visible.
#[derive(Debug, Default)]
pub struct Evaluator {
    environment: Vec<(String, Value)>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `arguments` to the lambda's parameters and evaluate its body.
    /// A `Void` lambda evaluates its body for effect and yields `Null`.
    pub fn invoke(&mut self, lambda: &LambdaExpression, arguments: &[Value]) -> EvalResult {
        if lambda.parameters.len() != arguments.len() {
            return Err(EvalError::ArgumentCount { expected: lambda.parameters.len(), found: arguments.len() });
        }
        let base = self.environment.len();
        for (parameter, argument) in lambda.parameters.iter().zip(arguments) {
            let name = if parameter.is_unnamed() { IMPLICIT_PARAMETER_NAME } else { parameter.name.as_str() };
            self.environment.push((name.to_string(), argument.clone()));
        }
        let result = self.evaluate(&lambda.body);
        self.environment.truncate(base);
        if lambda.return_type.is_void() {
            result.map(|_| Value::Null)
        } else {
            result
        }
    }

    pub fn evaluate(&mut self, expr: &TypedExpr) -> EvalResult {
        match &expr.kind {
            ExprKind::Constant(constant) => Ok(constant.into()),
            ExprKind::Parameter { name } => self.lookup(name),
            ExprKind::Member { target, name } => {
                let target = self.evaluate(target)?;
                member(&target, name)
            }
            ExprKind::Index { target, arguments } => {
                let target = self.evaluate(target)?;
                let arguments = self.evaluate_all(arguments)?;
                index(&target, &arguments)
            }
            ExprKind::Call { target, method, arguments } => {
                let target = self.evaluate(target)?;
                let arguments = self.evaluate_all(arguments)?;
                match target {
                    Value::Object(object) => object.call(method, &arguments),
                    Value::Null => Err(EvalError::NullReference(format!("call to '{}'", method))),
                    other => Err(EvalError::MissingMethod { type_name: other.type_name(), method: method.clone() }),
                }
            }
            ExprKind::Intrinsic { intrinsic, target, arguments } => {
                let target = match target {
                    Some(target) => Some(self.evaluate(target)?),
                    None => None,
                };
                let arguments = self.evaluate_all(arguments)?;
                intrinsic_call(*intrinsic, target, &arguments)
            }
            ExprKind::Aggregate { aggregate, source, argument } => {
                let source = self.evaluate(source)?;
                self.aggregate(*aggregate, source, argument.as_ref(), &expr.ty)
            }
            ExprKind::Convert { operand } => {
                let value = self.evaluate(operand)?;
                convert(value, &expr.ty)
            }
            ExprKind::Unary { operator, operand } => {
                let value = self.evaluate(operand)?;
                unary(*operator, value)
            }
            ExprKind::Binary { operator, left, right } => self.binary(*operator, left, right),
            ExprKind::Conditional { condition, when_true, when_false } => {
                if self.condition(condition)? {
                    self.evaluate(when_true)
                } else {
                    self.evaluate(when_false)
                }
            }
            ExprKind::Coalesce { left, right } => match self.evaluate(left)? {
                Value::Null => self.evaluate(right),
                value => Ok(value),
            },
            ExprKind::Membership { operand, source } => {
                let value = self.evaluate(operand)?;
                let found = match source {
                    MembershipSource::List(items) => {
                        let mut found = false;
                        for item in items {
                            if value.equals(&self.evaluate(item)?) {
                                found = true;
                                break;
                            }
                        }
                        found
                    }
                    MembershipSource::Sequence(sequence) => {
                        let sequence = self.evaluate(sequence)?;
                        elements(&sequence)?.iter().any(|item| value.equals(item))
                    }
                };
                Ok(Value::Boolean(found))
            }
            ExprKind::NewRecord { values } => {
                let Type::Record(record) = &expr.ty else {
                    return Err(type_mismatch("record", &expr.ty));
                };
                let values = self.evaluate_all(values)?;
                Ok(Value::Record(RecordValue::new(record.record().clone(), values)?))
            }
            ExprKind::NewArray { elements } => Ok(Value::list(self.evaluate_all(elements)?)),
            ExprKind::Invoke { delegate, arguments } => {
                let delegate = self.evaluate(delegate)?;
                let arguments = self.evaluate_all(arguments)?;
                match delegate {
                    Value::Function(function) => function.call(&arguments),
                    Value::Null => Err(EvalError::NullReference("delegate invocation".to_string())),
                    other => Err(EvalError::TypeMismatch { expected: "Function".to_string(), found: other.type_name() }),
                }
            }
        }
    }

    fn lookup(&self, name: &str) -> EvalResult {
        self.environment
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| EvalError::UnboundParameter(name.to_string()))
    }

    fn evaluate_all(&mut self, exprs: &[TypedExpr]) -> EvalResult<Vec<Value>> {
        exprs.iter().map(|e| self.evaluate(e)).collect()
    }

    fn condition(&mut self, expr: &TypedExpr) -> EvalResult<bool> {
        match self.evaluate(expr)? {
            Value::Boolean(b) => Ok(b),
            Value::Null => Err(EvalError::NullReference("condition".to_string())),
            other => Err(EvalError::TypeMismatch { expected: "Boolean".to_string(), found: other.type_name() }),
        }
    }

    /// Evaluate `body` with `element` bound as `it`.
    pub(crate) fn with_element(&mut self, element: &Value, body: &TypedExpr) -> EvalResult {
        self.environment.push((IMPLICIT_PARAMETER_NAME.to_string(), element.clone()));
        let result = self.evaluate(body);
        self.environment.pop();
        result
    }

    fn binary(&mut self, operator: BinaryOperator, left: &TypedExpr, right: &TypedExpr) -> EvalResult {
        match operator {
            BinaryOperator::AndAlso => {
                let left = self.evaluate(left)?;
                if left.as_bool() == Some(false) {
                    return Ok(left);
                }
                let right = self.evaluate(right)?;
                Ok(match (left, right) {
                    (_, Value::Boolean(false)) => Value::Boolean(false),
                    (Value::Boolean(true), right) => right,
                    _ => Value::Null,
                })
            }
            BinaryOperator::OrElse => {
                let left = self.evaluate(left)?;
                if left.as_bool() == Some(true) {
                    return Ok(left);
                }
                let right = self.evaluate(right)?;
                Ok(match (left, right) {
                    (_, Value::Boolean(true)) => Value::Boolean(true),
                    (Value::Boolean(false), right) => right,
                    _ => Value::Null,
                })
            }
            _ => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(operator, &left, &right)
            }
        }
    }

    fn aggregate(
        &mut self,
        aggregate: Aggregate,
        source: Value,
        argument: Option<&AggregateArgument>,
        result_type: &Type,
    ) -> EvalResult {
        let items = elements(&source)?;
        let lambda = match argument {
            Some(AggregateArgument::Lambda(body)) => Some(body.as_ref()),
            _ => None,
        };
        let value_argument = match argument {
            Some(AggregateArgument::Value(value)) => Some(self.evaluate(value)?),
            _ => None,
        };

        match aggregate {
            Aggregate::Any => match lambda {
                None => Ok(Value::Boolean(!items.is_empty())),
                Some(predicate) => {
                    for item in &items {
                        if self.test(item, predicate)? {
                            return Ok(Value::Boolean(true));
                        }
                    }
                    Ok(Value::Boolean(false))
                }
            },
            Aggregate::All => {
                for item in &items {
                    if !self.test_some(item, lambda)? {
                        return Ok(Value::Boolean(false));
                    }
                }
                Ok(Value::Boolean(true))
            }
            Aggregate::Count => {
                let mut count = 0i32;
                for item in &items {
                    if self.test_some(item, lambda)? {
                        count += 1;
                    }
                }
                Ok(Value::Int32(count))
            }
            Aggregate::Where => {
                let mut kept = Vec::new();
                for item in items {
                    if self.test_some(&item, lambda)? {
                        kept.push(item);
                    }
                }
                Ok(Value::list(kept))
            }
            Aggregate::Select => {
                let selected = self.project(&items, lambda)?;
                Ok(Value::list(selected))
            }
            Aggregate::OrderBy | Aggregate::OrderByDescending => {
                let keys = self.project(&items, lambda)?;
                let mut keyed: Vec<(Value, Value)> = keys.into_iter().zip(items).collect();
                keyed.sort_by(|(a, _), (b, _)| {
                    let ordering = sort::compare_keys(a, b);
                    if aggregate == Aggregate::OrderByDescending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                });
                Ok(Value::list(keyed.into_iter().map(|(_, item)| item)))
            }
            Aggregate::First | Aggregate::FirstOrDefault => {
                for item in items {
                    if self.test_some(&item, lambda)? {
                        return Ok(item);
                    }
                }
                if aggregate == Aggregate::First {
                    Err(EvalError::EmptySequence)
                } else {
                    Ok(default_value(result_type))
                }
            }
            Aggregate::Take | Aggregate::Skip => {
                let count = value_argument
                    .as_ref()
                    .and_then(Value::as_integer)
                    .unwrap_or(0)
                    .clamp(0, items.len() as i128) as usize;
                let slice = if aggregate == Aggregate::Take { &items[..count] } else { &items[count..] };
                Ok(Value::list(slice.iter().cloned()))
            }
            Aggregate::Contains => {
                let needle = value_argument.unwrap_or(Value::Null);
                Ok(Value::Boolean(items.iter().any(|item| item.equals(&needle))))
            }
            Aggregate::Sum | Aggregate::Average => {
                let values = self.project(&items, lambda)?;
                let target = result_type.non_nullable();
                let mut total = convert(Value::Int32(0), &target)?;
                let mut count = 0usize;
                for value in values {
                    if value.is_null() {
                        continue;
                    }
                    total = binary(BinaryOperator::Add, &total, &convert(value, &target)?)?;
                    count += 1;
                }
                if aggregate == Aggregate::Sum {
                    return Ok(total);
                }
                if count == 0 {
                    return if result_type.is_nullable() { Ok(Value::Null) } else { Err(EvalError::EmptySequence) };
                }
                let count = convert(Value::Int64(count as i64), &target)?;
                binary(BinaryOperator::Divide, &total, &count)
            }
            Aggregate::Min | Aggregate::Max => {
                let values = self.project(&items, lambda)?;
                let mut best: Option<Value> = None;
                for value in values.into_iter().filter(|v| !v.is_null()) {
                    let replace = match &best {
                        None => true,
                        Some(current) => {
                            let ordering = value.compare(current).unwrap_or(Ordering::Equal);
                            if aggregate == Aggregate::Min {
                                ordering == Ordering::Less
                            } else {
                                ordering == Ordering::Greater
                            }
                        }
                    };
                    if replace {
                        best = Some(value);
                    }
                }
                match best {
                    Some(value) => Ok(value),
                    None if result_type.accepts_null() => Ok(Value::Null),
                    None => Err(EvalError::EmptySequence),
                }
            }
        }
    }

    fn test(&mut self, item: &Value, predicate: &TypedExpr) -> EvalResult<bool> {
        match self.with_element(item, predicate)? {
            Value::Boolean(b) => Ok(b),
            other => Err(EvalError::TypeMismatch { expected: "Boolean".to_string(), found: other.type_name() }),
        }
    }

    fn test_some(&mut self, item: &Value, predicate: Option<&TypedExpr>) -> EvalResult<bool> {
        match predicate {
            Some(predicate) => self.test(item, predicate),
            None => Ok(true),
        }
    }

    fn project(&mut self, items: &[Value], selector: Option<&TypedExpr>) -> EvalResult<Vec<Value>> {
        match selector {
            Some(selector) => items.iter().map(|item| self.with_element(item, selector)).collect(),
            None => Ok(items.to_vec()),
        }
    }
}

fn type_mismatch(expected: &str, found: &Type) -> EvalError {
    EvalError::TypeMismatch { expected: expected.to_string(), found: found.to_string() }
}

/// The elements of an array, sequence or enumerable host object.
fn elements(source: &Value) -> EvalResult<Vec<Value>> {
    match source {
        Value::List(items) => Ok(items.to_vec()),
        Value::Object(object) => object
            .elements()
            .ok_or_else(|| EvalError::TypeMismatch { expected: "sequence".to_string(), found: source.type_name() }),
        Value::Null => Err(EvalError::NullReference("sequence".to_string())),
        other => Err(EvalError::TypeMismatch { expected: "sequence".to_string(), found: other.type_name() }),
    }
}

fn member(target: &Value, name: &str) -> EvalResult {
    let missing = || EvalError::MissingMember { type_name: target.type_name(), member: name.to_string() };
    match target {
        Value::Record(record) => record.get(name).cloned().ok_or_else(missing),
        Value::Object(object) => object.get(name).ok_or_else(missing),
        Value::Null => Err(EvalError::NullReference(format!("access to '{}'", name))),
        _ => Err(missing()),
    }
}

fn index(target: &Value, arguments: &[Value]) -> EvalResult {
    let position = |length: usize| -> EvalResult<usize> {
        let index = match arguments {
            [single] => single.as_integer(),
            _ => None,
        }
        .ok_or_else(|| EvalError::ArgumentCount { expected: 1, found: arguments.len() })?;
        usize::try_from(index)
            .ok()
            .filter(|&i| i < length)
            .ok_or(EvalError::IndexOutOfRange { index, length })
    };
    match target {
        Value::List(items) => Ok(items[position(items.len())?].clone()),
        Value::String(s) => {
            let length = s.chars().count();
            let i = position(length)?;
            s.chars().nth(i).map(Value::Char).ok_or(EvalError::IndexOutOfRange { index: i as i128, length })
        }
        Value::Object(object) => object.index(arguments),
        Value::Null => Err(EvalError::NullReference("indexer".to_string())),
        other => Err(EvalError::NotIndexable(other.type_name())),
    }
}

/// The value a `FirstOrDefault` over an empty sequence yields.
fn default_value(ty: &Type) -> Value {
    match ty {
        Type::Primitive(PrimitiveType::Boolean) => Value::Boolean(false),
        Type::Primitive(PrimitiveType::Char) => Value::Char('\0'),
        Type::Primitive(p) if p.is_numeric() => convert(Value::Int32(0), ty).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Convert `value` to `target`. Numeric conversions truncate and wrap the
/// way an unchecked cast does; non-numeric targets pass the value through.
pub(crate) fn convert(value: Value, target: &Type) -> EvalResult {
    let primitive = match target {
        Type::Primitive(p) => *p,
        Type::Nullable(p) => {
            if value.is_null() {
                return Ok(Value::Null);
            }
            *p
        }
        _ => return Ok(value),
    };
    if !(primitive.is_numeric() || primitive == PrimitiveType::Char) {
        return Ok(value);
    }
    if value.is_null() {
        return Err(EvalError::NullReference(format!("conversion to '{}'", target)));
    }

    macro_rules! cast {
        ($variant:ident, $ty:ty) => {
            match (value.as_integer(), value.as_f64()) {
                (Some(i), _) => Value::$variant(i as $ty),
                (None, Some(f)) => Value::$variant(f as $ty),
                _ => return Err(type_mismatch(primitive.name(), &Type::OBJECT)),
            }
        };
    }

    Ok(match primitive {
        PrimitiveType::SByte => cast!(SByte, i8),
        PrimitiveType::Byte => cast!(Byte, u8),
        PrimitiveType::Int16 => cast!(Int16, i16),
        PrimitiveType::UInt16 => cast!(UInt16, u16),
        PrimitiveType::Int32 => cast!(Int32, i32),
        PrimitiveType::UInt32 => cast!(UInt32, u32),
        PrimitiveType::Int64 => cast!(Int64, i64),
        PrimitiveType::UInt64 => cast!(UInt64, u64),
        PrimitiveType::Single => cast!(Single, f32),
        PrimitiveType::Double => cast!(Double, f64),
        PrimitiveType::Decimal => cast!(Decimal, f64),
        PrimitiveType::Char => {
            let code = value.as_integer().or_else(|| value.as_f64().map(|f| f as i128));
            let code = code.ok_or_else(|| type_mismatch("Char", &Type::OBJECT))?;
            Value::Char(char::from_u32(code as u16 as u32).unwrap_or(char::REPLACEMENT_CHARACTER))
        }
        _ => value,
    })
}

fn unary(operator: UnaryOperator, value: Value) -> EvalResult {
    Ok(match (operator, value) {
        (_, Value::Null) => Value::Null,
        (UnaryOperator::Not, Value::Boolean(b)) => Value::Boolean(!b),
        (UnaryOperator::Negate, Value::Int32(v)) => Value::Int32(v.wrapping_neg()),
        (UnaryOperator::Negate, Value::Int64(v)) => Value::Int64(v.wrapping_neg()),
        (UnaryOperator::Negate, Value::Single(v)) => Value::Single(-v),
        (UnaryOperator::Negate, Value::Double(v)) => Value::Double(-v),
        (UnaryOperator::Negate, Value::Decimal(v)) => Value::Decimal(-v),
        (_, other) => {
            return Err(EvalError::TypeMismatch { expected: "numeric or Boolean".to_string(), found: other.type_name() })
        }
    })
}

macro_rules! integer_arithmetic {
    ($operator:expr, $a:expr, $b:expr) => {
        match $operator {
            BinaryOperator::Add => $a.wrapping_add($b),
            BinaryOperator::Subtract => $a.wrapping_sub($b),
            BinaryOperator::Multiply => $a.wrapping_mul($b),
            BinaryOperator::Divide if $b == 0 => return Err(EvalError::DivideByZero),
            BinaryOperator::Divide => $a.wrapping_div($b),
            BinaryOperator::Modulo if $b == 0 => return Err(EvalError::DivideByZero),
            BinaryOperator::Modulo => $a.wrapping_rem($b),
            _ => return Err(EvalError::TypeMismatch { expected: "arithmetic operator".to_string(), found: format!("{:?}", $operator) }),
        }
    };
}

macro_rules! float_arithmetic {
    ($operator:expr, $a:expr, $b:expr) => {
        match $operator {
            BinaryOperator::Add => $a + $b,
            BinaryOperator::Subtract => $a - $b,
            BinaryOperator::Multiply => $a * $b,
            BinaryOperator::Divide => $a / $b,
            BinaryOperator::Modulo => $a % $b,
            _ => return Err(EvalError::TypeMismatch { expected: "arithmetic operator".to_string(), found: format!("{:?}", $operator) }),
        }
    };
}

/// Apply a non-short-circuit binary operator to evaluated operands. Operands
/// have already been converted to a common type.
fn binary(operator: BinaryOperator, left: &Value, right: &Value) -> EvalResult {
    use Value::*;
    match operator {
        BinaryOperator::Concat => return Ok(Value::string(format!("{}{}", left, right))),
        BinaryOperator::Equal => return Ok(Boolean(left.equals(right))),
        BinaryOperator::NotEqual => return Ok(Boolean(!left.equals(right))),
        op if op.is_comparison() => {
            let Some(ordering) = left.compare(right) else {
                return Ok(Boolean(false));
            };
            return Ok(Boolean(match op {
                BinaryOperator::LessThan => ordering == Ordering::Less,
                BinaryOperator::LessThanOrEqual => ordering != Ordering::Greater,
                BinaryOperator::GreaterThan => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }));
        }
        _ => {}
    }

    Ok(match (left, right) {
        (Null, _) | (_, Null) => Null,
        (Int32(a), Int32(b)) => Int32(integer_arithmetic!(operator, *a, *b)),
        (UInt32(a), UInt32(b)) => UInt32(integer_arithmetic!(operator, *a, *b)),
        (Int64(a), Int64(b)) => Int64(integer_arithmetic!(operator, *a, *b)),
        (UInt64(a), UInt64(b)) => UInt64(integer_arithmetic!(operator, *a, *b)),
        (Single(a), Single(b)) => Single(float_arithmetic!(operator, *a, *b)),
        (Double(a), Double(b)) => Double(float_arithmetic!(operator, *a, *b)),
        (Decimal(_), Decimal(b)) if *b == 0.0 && matches!(operator, BinaryOperator::Divide | BinaryOperator::Modulo) => {
            return Err(EvalError::DivideByZero)
        }
        (Decimal(a), Decimal(b)) => Decimal(float_arithmetic!(operator, *a, *b)),
        (a, b) => {
            return Err(EvalError::TypeMismatch { expected: a.type_name(), found: b.type_name() });
        }
    })
}

fn null_target(intrinsic: Intrinsic) -> EvalError {
    EvalError::NullReference(format!("{:?}", intrinsic))
}

fn string_argument(arguments: &[Value], i: usize) -> EvalResult<&str> {
    match arguments.get(i) {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Null) => Err(EvalError::NullReference("string argument".to_string())),
        Some(other) => Err(EvalError::TypeMismatch { expected: "String".to_string(), found: other.type_name() }),
        None => Err(EvalError::ArgumentCount { expected: i + 1, found: arguments.len() }),
    }
}

fn integer_argument(arguments: &[Value], i: usize) -> EvalResult<i128> {
    arguments
        .get(i)
        .and_then(Value::as_integer)
        .ok_or(EvalError::ArgumentCount { expected: i + 1, found: arguments.len() })
}

/// Character index of the first occurrence of `needle`, or -1.
fn char_index_of(haystack: &str, needle: &str) -> i32 {
    haystack
        .find(needle)
        .map_or(-1, |byte| haystack[..byte].chars().count() as i32)
}

fn intrinsic_call(intrinsic: Intrinsic, target: Option<Value>, arguments: &[Value]) -> EvalResult {
    let target = target.unwrap_or(Value::Null);
    let text = || -> EvalResult<&str> { target.as_str().ok_or_else(|| null_target(intrinsic)) };

    Ok(match intrinsic {
        Intrinsic::ToString if target.is_null() => return Err(null_target(intrinsic)),
        Intrinsic::ToString => Value::string(target.to_string()),
        Intrinsic::Equals if target.is_null() => return Err(null_target(intrinsic)),
        Intrinsic::Equals => Value::Boolean(arguments.first().is_some_and(|a| target.equals(a))),
        Intrinsic::GetHashCode => {
            let mut hasher = FxHasher::default();
            target.to_string().hash(&mut hasher);
            Value::Int32(hasher.finish() as i32)
        }
        Intrinsic::StringLength => Value::Int32(text()?.chars().count() as i32),
        Intrinsic::StringContains => Value::Boolean(text()?.contains(string_argument(arguments, 0)?)),
        Intrinsic::StringStartsWith => Value::Boolean(text()?.starts_with(string_argument(arguments, 0)?)),
        Intrinsic::StringEndsWith => Value::Boolean(text()?.ends_with(string_argument(arguments, 0)?)),
        Intrinsic::StringIndexOf => {
            let haystack = text()?;
            match arguments.first() {
                Some(Value::Char(c)) => Value::Int32(char_index_of(haystack, c.encode_utf8(&mut [0; 4]))),
                _ => Value::Int32(char_index_of(haystack, string_argument(arguments, 0)?)),
            }
        }
        Intrinsic::StringSubstring => {
            let chars: Vec<char> = text()?.chars().collect();
            let start = integer_argument(arguments, 0)?;
            let length = match arguments.len() {
                1 => chars.len() as i128 - start,
                _ => integer_argument(arguments, 1)?,
            };
            if start < 0 || length < 0 || start + length > chars.len() as i128 {
                return Err(EvalError::ArgumentOutOfRange("Substring".to_string()));
            }
            let (start, end) = (start as usize, (start + length) as usize);
            Value::string(chars[start..end].iter().collect::<String>())
        }
        Intrinsic::StringToUpper => Value::string(text()?.to_uppercase()),
        Intrinsic::StringToLower => Value::string(text()?.to_lowercase()),
        Intrinsic::StringTrim => Value::string(text()?.trim()),
        Intrinsic::StringIsNullOrEmpty => match arguments.first() {
            None | Some(Value::Null) => Value::Boolean(true),
            Some(value) => Value::Boolean(value.as_str().is_some_and(str::is_empty)),
        },
        Intrinsic::ArrayLength => match &target {
            Value::List(items) => Value::Int32(items.len() as i32),
            _ => return Err(null_target(intrinsic)),
        },
        Intrinsic::NullableHasValue => Value::Boolean(!target.is_null()),
        Intrinsic::NullableValue if target.is_null() => return Err(null_target(intrinsic)),
        Intrinsic::NullableValue => target,
        Intrinsic::MathAbs => match arguments.first() {
            Some(Value::SByte(v)) => Value::SByte(v.wrapping_abs()),
            Some(Value::Int16(v)) => Value::Int16(v.wrapping_abs()),
            Some(Value::Int32(v)) => Value::Int32(v.wrapping_abs()),
            Some(Value::Int64(v)) => Value::Int64(v.wrapping_abs()),
            Some(Value::Single(v)) => Value::Single(v.abs()),
            Some(Value::Double(v)) => Value::Double(v.abs()),
            Some(Value::Decimal(v)) => Value::Decimal(v.abs()),
            _ => return Err(EvalError::ArgumentCount { expected: 1, found: arguments.len() }),
        },
        Intrinsic::MathMin | Intrinsic::MathMax => match arguments {
            [a, b] => {
                let ordering = a.compare(b).unwrap_or(Ordering::Equal);
                let pick_a = if intrinsic == Intrinsic::MathMin { ordering != Ordering::Greater } else { ordering != Ordering::Less };
                if pick_a { a.clone() } else { b.clone() }
            }
            _ => return Err(EvalError::ArgumentCount { expected: 2, found: arguments.len() }),
        },
        Intrinsic::MathFloor | Intrinsic::MathCeiling | Intrinsic::MathRound => {
            let round = |v: f64| match intrinsic {
                Intrinsic::MathFloor => v.floor(),
                Intrinsic::MathCeiling => v.ceil(),
                _ => round_half_even(v),
            };
            match arguments.first() {
                Some(Value::Double(v)) => Value::Double(round(*v)),
                Some(Value::Decimal(v)) => Value::Decimal(round(*v)),
                _ => return Err(EvalError::ArgumentCount { expected: 1, found: arguments.len() }),
            }
        }
    })
}

/// Round to the nearest integer, ties to even.
fn round_half_even(v: f64) -> f64 {
    let rounded = v.round();
    if (v - v.trunc()).abs() == 0.5 {
        2.0 * (v / 2.0).round()
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_numeric() {
        assert_eq!(convert(Value::Int32(-1), &Type::INT64).unwrap(), Value::Int64(-1));
        assert!(matches!(convert(Value::Double(2.9), &Type::INT32).unwrap(), Value::Int32(2)));
        assert!(matches!(
            convert(Value::Int32(300), &Type::Primitive(PrimitiveType::Byte)).unwrap(),
            Value::Byte(44)
        ));
        assert!(matches!(convert(Value::Int32(65), &Type::CHAR).unwrap(), Value::Char('A')));
        assert!(convert(Value::Null, &Type::INT32).is_err());
        assert!(convert(Value::Null, &Type::Nullable(PrimitiveType::Int32)).unwrap().is_null());
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(binary(BinaryOperator::Add, &Value::Int32(i32::MAX), &Value::Int32(1)).unwrap(), Value::Int32(i32::MIN));
        assert_eq!(binary(BinaryOperator::Divide, &Value::Int32(7), &Value::Int32(2)).unwrap(), Value::Int32(3));
        assert_eq!(
            binary(BinaryOperator::Modulo, &Value::Int32(1), &Value::Int32(0)).unwrap_err(),
            EvalError::DivideByZero
        );
        assert!(binary(BinaryOperator::Add, &Value::Null, &Value::Int32(1)).unwrap().is_null());
    }

    #[test]
    fn test_lifted_comparison_with_null_is_false() {
        assert_eq!(binary(BinaryOperator::LessThan, &Value::Null, &Value::Int32(1)).unwrap(), Value::Boolean(false));
        assert_eq!(binary(BinaryOperator::Equal, &Value::Null, &Value::Null).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(2.5), 2.0);
        assert_eq!(round_half_even(3.5), 4.0);
        assert_eq!(round_half_even(-2.5), -2.0);
        assert_eq!(round_half_even(2.4), 2.0);
    }

    #[test]
    fn test_substring_bounds() {
        let target = Some(Value::from("hello"));
        let ok = intrinsic_call(Intrinsic::StringSubstring, target.clone(), &[Value::Int32(1), Value::Int32(3)]).unwrap();
        assert_eq!(ok, Value::from("ell"));
        let err = intrinsic_call(Intrinsic::StringSubstring, target, &[Value::Int32(4), Value::Int32(3)]).unwrap_err();
        assert_eq!(err, EvalError::ArgumentOutOfRange("Substring".to_string()));
    }
}

//! Implicit and explicit conversion rules, and binary numeric promotion.
//!
//! Numeric widening follows the CLR table, with one extension: `Single` and
//! `Double` widen to `Decimal` so that mixed `Double`/`Decimal` arithmetic has
//! a promoted type.

use crate::types::{PrimitiveType, Type};

/// Candidate result types for binary numeric promotion, narrowest first.
const PROMOTION_CANDIDATES: [PrimitiveType; 7] = [
    PrimitiveType::Int32,
    PrimitiveType::UInt32,
    PrimitiveType::Int64,
    PrimitiveType::UInt64,
    PrimitiveType::Single,
    PrimitiveType::Double,
    PrimitiveType::Decimal,
];

/// Whether a primitive widens to another without loss of range.
pub fn primitive_widens(from: PrimitiveType, to: PrimitiveType) -> bool {
    use PrimitiveType::*;
    if from == to || to == Object {
        return true;
    }
    match from {
        SByte => matches!(to, Int16 | Int32 | Int64 | Single | Double | Decimal),
        Byte => matches!(
            to,
            Int16 | UInt16 | Int32 | UInt32 | Int64 | UInt64 | Single | Double | Decimal
        ),
        Int16 => matches!(to, Int32 | Int64 | Single | Double | Decimal),
        UInt16 => matches!(to, Int32 | UInt32 | Int64 | UInt64 | Single | Double | Decimal),
        Int32 => matches!(to, Int64 | Single | Double | Decimal),
        UInt32 => matches!(to, Int64 | UInt64 | Single | Double | Decimal),
        Int64 | UInt64 => matches!(to, Single | Double | Decimal),
        Char => matches!(
            to,
            UInt16 | Int32 | UInt32 | Int64 | UInt64 | Single | Double | Decimal
        ),
        Single => matches!(to, Double | Decimal),
        Double => to == Decimal,
        _ => false,
    }
}

/// Whether a value of `from` can be used where `to` is expected without an
/// explicit conversion.
pub fn is_implicitly_convertible(from: &Type, to: &Type) -> bool {
    if from == to {
        return true;
    }
    match (from, to) {
        (Type::Void, _) | (_, Type::Void) => false,
        (_, Type::Primitive(PrimitiveType::Object)) => true,
        (Type::Null, target) => target.accepts_null(),
        (Type::Primitive(a), Type::Primitive(b)) => primitive_widens(*a, *b),
        (Type::Primitive(a), Type::Nullable(b)) | (Type::Nullable(a), Type::Nullable(b)) => {
            a.is_value_type() && primitive_widens(*a, *b)
        }
        (Type::Array(e), Type::Sequence(t)) | (Type::Sequence(e), Type::Sequence(t)) => {
            is_reference_conversion(e, t)
        }
        (Type::Array(e), Type::Array(t)) => e.accepts_null() && is_reference_conversion(e, t),
        (Type::Class(_), _) => {
            if let (Some(element), Type::Sequence(t)) = (from.element_type(), to) {
                if is_reference_conversion(&element, t) {
                    return true;
                }
            }
            is_base_of(to, from)
        }
        _ => false,
    }
}

/// Identity, boxing to Object, or a derived-to-base class conversion.
fn is_reference_conversion(from: &Type, to: &Type) -> bool {
    from == to
        || (from.accepts_null() && *to == Type::OBJECT)
        || (matches!(from, Type::Class(_)) && is_base_of(to, from))
}

/// Whether `base` appears in the base chain of `derived`.
fn is_base_of(base: &Type, derived: &Type) -> bool {
    let mut current = derived.base_type();
    while let Some(ty) = current {
        if ty == *base {
            return true;
        }
        current = ty.base_type();
    }
    false
}

/// The number of implicit conversions needed to pass `from` as `to`:
/// zero for an exact match, one otherwise, `None` when not convertible.
pub fn conversion_cost(from: &Type, to: &Type) -> Option<u32> {
    if from == to {
        Some(0)
    } else if is_implicitly_convertible(from, to) {
        Some(1)
    } else {
        None
    }
}

/// Whether a conversion `T(x)` from `from` to `to` is legal.
pub fn is_explicitly_convertible(from: &Type, to: &Type) -> bool {
    if is_implicitly_convertible(from, to) {
        return true;
    }
    if from.is_void() || to.is_void() {
        return false;
    }
    let numeric_like = |p: PrimitiveType| p.is_numeric() || p == PrimitiveType::Char;
    match (from.primitive(), to.primitive()) {
        (Some(a), Some(b)) if numeric_like(a) && numeric_like(b) => return true,
        (Some(a), Some(b)) if a == b => return true,
        _ => {}
    }
    // Unboxing and downcasts.
    *from == Type::OBJECT || is_base_of(from, to)
}

/// The promoted operand type for a binary numeric operator.
///
/// Picks the first candidate in `Int32, UInt32, Int64, UInt64, Single, Double,
/// Decimal` that both operands widen to. Arithmetic never yields a type
/// narrower than `Int32`; comparisons of identical types need no promotion.
/// Integral operands never promote to a floating type. A nullable operand
/// lifts the result.
pub fn find_numeric_promotion(left: &Type, right: &Type, arithmetic: bool) -> Option<Type> {
    let a = left.primitive()?;
    let b = right.primitive()?;
    let numeric_like = |p: PrimitiveType| p.is_numeric() || p == PrimitiveType::Char;
    if !numeric_like(a) || !numeric_like(b) {
        return None;
    }
    let lifted = left.is_nullable() || right.is_nullable();
    let lift = |p: PrimitiveType| if lifted { Type::Nullable(p) } else { Type::Primitive(p) };

    if !arithmetic && a == b {
        return Some(lift(a));
    }
    let integral = |p: PrimitiveType| p.is_integral() || p == PrimitiveType::Char;
    let both_integral = integral(a) && integral(b);
    PROMOTION_CANDIDATES
        .iter()
        .copied()
        .filter(|c| !(both_integral && matches!(c, PrimitiveType::Single | PrimitiveType::Double)))
        .find(|c| primitive_widens(a, *c) && primitive_widens(b, *c))
        .map(lift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaClass;

    fn p(p: PrimitiveType) -> Type {
        Type::Primitive(p)
    }

    #[test]
    fn test_numeric_widening() {
        assert!(is_implicitly_convertible(&Type::INT32, &Type::INT64));
        assert!(is_implicitly_convertible(&Type::INT32, &Type::DOUBLE));
        assert!(!is_implicitly_convertible(&Type::INT64, &Type::INT32));
        assert!(!is_implicitly_convertible(&p(PrimitiveType::SByte), &p(PrimitiveType::UInt32)));
        assert!(is_implicitly_convertible(&Type::CHAR, &Type::INT32));
        assert!(!is_implicitly_convertible(&Type::INT32, &Type::CHAR));
    }

    #[test]
    fn test_null_and_nullable() {
        assert!(is_implicitly_convertible(&Type::Null, &Type::STRING));
        assert!(is_implicitly_convertible(&Type::Null, &Type::Nullable(PrimitiveType::Int32)));
        assert!(!is_implicitly_convertible(&Type::Null, &Type::INT32));
        assert!(is_implicitly_convertible(&Type::INT32, &Type::Nullable(PrimitiveType::Int64)));
        assert!(!is_implicitly_convertible(&Type::Nullable(PrimitiveType::Int32), &Type::INT32));
    }

    #[test]
    fn test_class_base_chain() {
        let stream = SchemaClass::new("Stream").build();
        let file = SchemaClass::new("FileStream").extends(stream.clone()).build();
        assert!(is_implicitly_convertible(&file, &stream));
        assert!(!is_implicitly_convertible(&stream, &file));
        assert!(is_explicitly_convertible(&stream, &file));
        assert!(is_implicitly_convertible(&file, &Type::OBJECT));
    }

    #[test]
    fn test_array_to_sequence() {
        assert!(is_implicitly_convertible(&Type::array(Type::INT32), &Type::sequence(Type::INT32)));
        assert!(!is_implicitly_convertible(&Type::array(Type::INT32), &Type::sequence(Type::INT64)));
    }

    #[test]
    fn test_promotion() {
        assert_eq!(find_numeric_promotion(&Type::INT32, &Type::INT32, true), Some(Type::INT32));
        assert_eq!(
            find_numeric_promotion(&p(PrimitiveType::Byte), &p(PrimitiveType::Byte), true),
            Some(Type::INT32)
        );
        assert_eq!(find_numeric_promotion(&Type::INT32, &Type::INT64, true), Some(Type::INT64));
        assert_eq!(find_numeric_promotion(&Type::INT32, &Type::DOUBLE, true), Some(Type::DOUBLE));
        assert_eq!(
            find_numeric_promotion(&p(PrimitiveType::UInt32), &Type::INT32, true),
            Some(Type::INT64)
        );
        assert_eq!(find_numeric_promotion(&Type::DOUBLE, &Type::DECIMAL, true), Some(Type::DECIMAL));
        assert_eq!(find_numeric_promotion(&Type::STRING, &Type::INT32, true), None);
    }

    #[test]
    fn test_promotion_comparison_keeps_identical_types() {
        assert_eq!(
            find_numeric_promotion(&p(PrimitiveType::Byte), &p(PrimitiveType::Byte), false),
            Some(p(PrimitiveType::Byte))
        );
    }

    #[test]
    fn test_promotion_lifts_nullable() {
        assert_eq!(
            find_numeric_promotion(&Type::Nullable(PrimitiveType::Int32), &Type::DOUBLE, true),
            Some(Type::Nullable(PrimitiveType::Double))
        );
    }

    #[test]
    fn test_conversion_cost() {
        assert_eq!(conversion_cost(&Type::INT32, &Type::INT32), Some(0));
        assert_eq!(conversion_cost(&Type::INT32, &Type::INT64), Some(1));
        assert_eq!(conversion_cost(&Type::STRING, &Type::INT32), None);
    }

    #[test]
    fn test_explicit_numeric() {
        assert!(is_explicitly_convertible(&Type::DOUBLE, &Type::INT32));
        assert!(is_explicitly_convertible(&Type::INT32, &Type::CHAR));
        assert!(is_explicitly_convertible(&Type::Nullable(PrimitiveType::Int32), &Type::INT32));
        assert!(!is_explicitly_convertible(&Type::STRING, &Type::INT32));
        assert!(is_explicitly_convertible(&Type::OBJECT, &Type::STRING));
    }
}

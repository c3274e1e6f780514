//! Signatures of the built-in methods, properties and static members.

use crate::typed::{ConstantValue, Intrinsic};
use dynex_types::{KnownType, PrimitiveType, Type};

/// One overload of a built-in method.
#[derive(Debug, Clone, PartialEq)]
pub struct IntrinsicMethod {
    pub intrinsic: Intrinsic,
    pub parameters: Vec<Type>,
    pub return_type: Type,
}

impl IntrinsicMethod {
    fn new(intrinsic: Intrinsic, parameters: Vec<Type>, return_type: Type) -> Self {
        Self { intrinsic, parameters, return_type }
    }
}

/// Built-in instance methods named `name` on a value of type `target`.
pub fn instance_methods(target: &Type, name: &str) -> Vec<IntrinsicMethod> {
    use Intrinsic::*;
    let mut methods = match name {
        "ToString" => vec![IntrinsicMethod::new(ToString, vec![], Type::STRING)],
        "Equals" => vec![IntrinsicMethod::new(Equals, vec![Type::OBJECT], Type::BOOLEAN)],
        "GetHashCode" => vec![IntrinsicMethod::new(GetHashCode, vec![], Type::INT32)],
        _ => Vec::new(),
    };
    if target.is_string() {
        let s = || Type::STRING;
        methods.extend(match name {
            "Contains" => vec![IntrinsicMethod::new(StringContains, vec![s()], Type::BOOLEAN)],
            "StartsWith" => vec![IntrinsicMethod::new(StringStartsWith, vec![s()], Type::BOOLEAN)],
            "EndsWith" => vec![IntrinsicMethod::new(StringEndsWith, vec![s()], Type::BOOLEAN)],
            "IndexOf" => vec![
                IntrinsicMethod::new(StringIndexOf, vec![s()], Type::INT32),
                IntrinsicMethod::new(StringIndexOf, vec![Type::CHAR], Type::INT32),
            ],
            "Substring" => vec![
                IntrinsicMethod::new(StringSubstring, vec![Type::INT32], s()),
                IntrinsicMethod::new(StringSubstring, vec![Type::INT32, Type::INT32], s()),
            ],
            "ToUpper" => vec![IntrinsicMethod::new(StringToUpper, vec![], s())],
            "ToLower" => vec![IntrinsicMethod::new(StringToLower, vec![], s())],
            "Trim" => vec![IntrinsicMethod::new(StringTrim, vec![], s())],
            _ => Vec::new(),
        });
    }
    methods
}

/// A built-in instance property: `String.Length`, array `Length`, and the
/// `HasValue`/`Value` pair of nullable values.
pub fn instance_property(target: &Type, name: &str) -> Option<(Intrinsic, Type)> {
    match (target, name) {
        (t, "Length") if t.is_string() => Some((Intrinsic::StringLength, Type::INT32)),
        (Type::Array(_), "Length") => Some((Intrinsic::ArrayLength, Type::INT32)),
        (Type::Nullable(_), "HasValue") => Some((Intrinsic::NullableHasValue, Type::BOOLEAN)),
        (Type::Nullable(p), "Value") => Some((Intrinsic::NullableValue, Type::Primitive(*p))),
        _ => None,
    }
}

/// Static methods of a predefined type: the `Math` functions and
/// `String.IsNullOrEmpty`.
pub fn static_methods(owner: KnownType, name: &str) -> Vec<IntrinsicMethod> {
    use PrimitiveType::*;
    const SIGNED: [PrimitiveType; 7] = [SByte, Int16, Int32, Int64, Single, Double, Decimal];
    const NUMERIC: [PrimitiveType; 11] =
        [SByte, Byte, Int16, UInt16, Int32, UInt32, Int64, UInt64, Single, Double, Decimal];

    let unary = |intrinsic: Intrinsic, types: &[PrimitiveType]| -> Vec<IntrinsicMethod> {
        types
            .iter()
            .map(|&p| IntrinsicMethod::new(intrinsic, vec![p.into()], p.into()))
            .collect()
    };
    let binary = |intrinsic: Intrinsic| -> Vec<IntrinsicMethod> {
        NUMERIC
            .iter()
            .map(|&p| IntrinsicMethod::new(intrinsic, vec![p.into(), p.into()], p.into()))
            .collect()
    };

    match (owner, name) {
        (KnownType::Math, "Abs") => unary(Intrinsic::MathAbs, &SIGNED[..]),
        (KnownType::Math, "Min") => binary(Intrinsic::MathMin),
        (KnownType::Math, "Max") => binary(Intrinsic::MathMax),
        (KnownType::Math, "Floor") => unary(Intrinsic::MathFloor, &[Double, Decimal][..]),
        (KnownType::Math, "Ceiling") => unary(Intrinsic::MathCeiling, &[Double, Decimal][..]),
        (KnownType::Math, "Round") => unary(Intrinsic::MathRound, &[Double, Decimal][..]),
        (KnownType::Primitive(String), "IsNullOrEmpty") => vec![IntrinsicMethod::new(
            Intrinsic::StringIsNullOrEmpty,
            vec![Type::STRING],
            Type::BOOLEAN,
        )],
        _ => Vec::new(),
    }
}

/// A static constant such as `Int32.MaxValue` or `String.Empty`.
pub fn static_constant(owner: KnownType, name: &str) -> Option<ConstantValue> {
    let KnownType::Primitive(p) = owner else {
        return None;
    };
    use ConstantValue as C;
    use PrimitiveType::*;
    let value = match (p, name) {
        (String, "Empty") => C::String(std::string::String::new()),
        (Char, "MaxValue") => C::Char('\u{FFFF}'),
        (Char, "MinValue") => C::Char('\0'),
        (SByte, "MaxValue") => C::SByte(i8::MAX),
        (SByte, "MinValue") => C::SByte(i8::MIN),
        (Byte, "MaxValue") => C::Byte(u8::MAX),
        (Byte, "MinValue") => C::Byte(u8::MIN),
        (Int16, "MaxValue") => C::Int16(i16::MAX),
        (Int16, "MinValue") => C::Int16(i16::MIN),
        (UInt16, "MaxValue") => C::UInt16(u16::MAX),
        (UInt16, "MinValue") => C::UInt16(u16::MIN),
        (Int32, "MaxValue") => C::Int32(i32::MAX),
        (Int32, "MinValue") => C::Int32(i32::MIN),
        (UInt32, "MaxValue") => C::UInt32(u32::MAX),
        (UInt32, "MinValue") => C::UInt32(u32::MIN),
        (Int64, "MaxValue") => C::Int64(i64::MAX),
        (Int64, "MinValue") => C::Int64(i64::MIN),
        (UInt64, "MaxValue") => C::UInt64(u64::MAX),
        (UInt64, "MinValue") => C::UInt64(u64::MIN),
        (Single, "MaxValue") => C::Single(f32::MAX),
        (Single, "MinValue") => C::Single(f32::MIN),
        (Double, "MaxValue") => C::Double(f64::MAX),
        (Double, "MinValue") => C::Double(f64::MIN),
        (Decimal, "MaxValue") => C::Decimal(79_228_162_514_264_337_593_543_950_335.0),
        (Decimal, "MinValue") => C::Decimal(-79_228_162_514_264_337_593_543_950_335.0),
        _ => return None,
    };
    Some(value)
}

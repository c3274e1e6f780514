//! Type names the parser recognizes without any declaration.

use crate::types::{PrimitiveType, Type};

/// A type name usable in conversions (`Int32(x)`), typed array initializers
/// and static member access (`String.Empty`, `Math.Abs(x)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownType {
    Primitive(PrimitiveType),
    /// The static `Math` helper class.
    Math,
}

impl KnownType {
    pub fn name(self) -> &'static str {
        match self {
            KnownType::Primitive(p) => p.name(),
            KnownType::Math => "Math",
        }
    }

    /// The value type this name denotes; `Math` has none.
    pub fn as_type(self) -> Option<Type> {
        match self {
            KnownType::Primitive(p) => Some(Type::Primitive(p)),
            KnownType::Math => None,
        }
    }
}

/// Resolve a predefined type name. Both runtime names (`Int32`) and the
/// familiar aliases (`int`) are accepted; matching is case-sensitive.
pub fn lookup_type_name(name: &str) -> Option<KnownType> {
    let primitive = match name {
        "Object" | "object" => PrimitiveType::Object,
        "Boolean" | "bool" => PrimitiveType::Boolean,
        "Char" | "char" => PrimitiveType::Char,
        "String" | "string" => PrimitiveType::String,
        "SByte" | "sbyte" => PrimitiveType::SByte,
        "Byte" | "byte" => PrimitiveType::Byte,
        "Int16" | "short" => PrimitiveType::Int16,
        "UInt16" | "ushort" => PrimitiveType::UInt16,
        "Int32" | "int" => PrimitiveType::Int32,
        "UInt32" | "uint" => PrimitiveType::UInt32,
        "Int64" | "long" => PrimitiveType::Int64,
        "UInt64" | "ulong" => PrimitiveType::UInt64,
        "Single" | "float" => PrimitiveType::Single,
        "Double" | "double" => PrimitiveType::Double,
        "Decimal" | "decimal" => PrimitiveType::Decimal,
        "Math" => return Some(KnownType::Math),
        _ => return None,
    };
    Some(KnownType::Primitive(primitive))
}

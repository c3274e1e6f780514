//! Type representation.
//!
//! Types are small values: primitives are plain enum tags, composite types
//! share their payload through `Arc`. Host class types compare by descriptor
//! name; synthesized record types compare by identity.

use crate::descriptor::{Member, MethodSignature, TypeDescriptor};
use crate::record::RecordType;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

bitflags::bitflags! {
    /// Classification flags for primitive types.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        const NONE              = 0;
        const BOOLEAN           = 1 << 0;
        const CHAR              = 1 << 1;
        const SIGNED_INTEGRAL   = 1 << 2;
        const UNSIGNED_INTEGRAL = 1 << 3;
        const FLOATING          = 1 << 4;
        const DECIMAL           = 1 << 5;
        const STRING            = 1 << 6;
        const OBJECT            = 1 << 7;
        const VALUE_TYPE        = 1 << 8;

        const INTEGRAL = Self::SIGNED_INTEGRAL.bits() | Self::UNSIGNED_INTEGRAL.bits();
        const NUMERIC = Self::INTEGRAL.bits() | Self::FLOATING.bits() | Self::DECIMAL.bits();
        const REFERENCE = Self::STRING.bits() | Self::OBJECT.bits();
    }
}

/// The built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    String,
    Object,
}

impl PrimitiveType {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::Char => "Char",
            PrimitiveType::SByte => "SByte",
            PrimitiveType::Byte => "Byte",
            PrimitiveType::Int16 => "Int16",
            PrimitiveType::UInt16 => "UInt16",
            PrimitiveType::Int32 => "Int32",
            PrimitiveType::UInt32 => "UInt32",
            PrimitiveType::Int64 => "Int64",
            PrimitiveType::UInt64 => "UInt64",
            PrimitiveType::Single => "Single",
            PrimitiveType::Double => "Double",
            PrimitiveType::Decimal => "Decimal",
            PrimitiveType::String => "String",
            PrimitiveType::Object => "Object",
        }
    }

    pub fn flags(self) -> TypeFlags {
        match self {
            PrimitiveType::Boolean => TypeFlags::BOOLEAN | TypeFlags::VALUE_TYPE,
            PrimitiveType::Char => TypeFlags::CHAR | TypeFlags::VALUE_TYPE,
            PrimitiveType::SByte
            | PrimitiveType::Int16
            | PrimitiveType::Int32
            | PrimitiveType::Int64 => TypeFlags::SIGNED_INTEGRAL | TypeFlags::VALUE_TYPE,
            PrimitiveType::Byte
            | PrimitiveType::UInt16
            | PrimitiveType::UInt32
            | PrimitiveType::UInt64 => TypeFlags::UNSIGNED_INTEGRAL | TypeFlags::VALUE_TYPE,
            PrimitiveType::Single | PrimitiveType::Double => {
                TypeFlags::FLOATING | TypeFlags::VALUE_TYPE
            }
            PrimitiveType::Decimal => TypeFlags::DECIMAL | TypeFlags::VALUE_TYPE,
            PrimitiveType::String => TypeFlags::STRING,
            PrimitiveType::Object => TypeFlags::OBJECT,
        }
    }

    #[inline]
    pub fn is_numeric(self) -> bool {
        self.flags().intersects(TypeFlags::NUMERIC)
    }

    #[inline]
    pub fn is_integral(self) -> bool {
        self.flags().intersects(TypeFlags::INTEGRAL)
    }

    #[inline]
    pub fn is_value_type(self) -> bool {
        self.flags().contains(TypeFlags::VALUE_TYPE)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named, typed input of a compiled expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterDeclaration {
    /// Parameter name. Empty marks an unnamed parameter reachable only as `it`.
    pub name: String,
    pub ty: Type,
}

impl ParameterDeclaration {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }

    pub fn unnamed(ty: Type) -> Self {
        Self { name: String::new(), ty }
    }

    pub fn is_unnamed(&self) -> bool {
        self.name.is_empty()
    }
}

/// A delegate shape: parameter list plus return type, optionally named.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DelegateSignature {
    /// Declared name (`EventHandler`). Anonymous signatures display as `Func`/`Action`.
    pub name: Option<String>,
    pub parameters: Vec<ParameterDeclaration>,
    pub return_type: Type,
}

impl DelegateSignature {
    /// An anonymous `Func<..>`/`Action<..>` signature.
    pub fn anonymous(parameters: Vec<ParameterDeclaration>, return_type: Type) -> Self {
        Self { name: None, parameters, return_type }
    }

    pub fn named(
        name: impl Into<String>,
        parameters: Vec<ParameterDeclaration>,
        return_type: Type,
    ) -> Self {
        Self { name: Some(name.into()), parameters, return_type }
    }

    pub fn is_action(&self) -> bool {
        self.return_type == Type::Void
    }
}

impl fmt::Display for DelegateSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            return f.write_str(name);
        }
        let mut args: Vec<String> = self.parameters.iter().map(|p| p.ty.to_string()).collect();
        if self.is_action() {
            if args.is_empty() {
                return f.write_str("Action");
            }
            write!(f, "Action<{}>", args.join(", "))
        } else {
            args.push(self.return_type.to_string());
            write!(f, "Func<{}>", args.join(", "))
        }
    }
}

/// A host class type, described by a [`TypeDescriptor`].
#[derive(Clone)]
pub struct ClassType(Arc<dyn TypeDescriptor>);

impl ClassType {
    pub fn new(descriptor: Arc<dyn TypeDescriptor>) -> Self {
        Self(descriptor)
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn descriptor(&self) -> &dyn TypeDescriptor {
        self.0.as_ref()
    }
}

impl PartialEq for ClassType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.name() == other.name()
    }
}

impl Eq for ClassType {}

impl Hash for ClassType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Debug for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class({})", self.name())
    }
}

/// A shared handle to a synthesized record type. Equality is identity.
#[derive(Clone)]
pub struct RecordRef(Arc<RecordType>);

impl RecordRef {
    pub fn new(record: Arc<RecordType>) -> Self {
        Self(record)
    }

    pub fn record(&self) -> &Arc<RecordType> {
        &self.0
    }
}

impl std::ops::Deref for RecordRef {
    type Target = RecordType;

    fn deref(&self) -> &RecordType {
        &self.0
    }
}

impl PartialEq for RecordRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for RecordRef {}

impl Hash for RecordRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record({})", self.0.name())
    }
}

/// A type in the expression language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveType),
    /// A nullable value primitive (`Int32?`).
    Nullable(PrimitiveType),
    /// The type of the `null` literal.
    Null,
    Void,
    /// An enumerable sequence of elements.
    Sequence(Arc<Type>),
    Array(Arc<Type>),
    Class(ClassType),
    Record(RecordRef),
    Delegate(Arc<DelegateSignature>),
}

impl Type {
    pub const BOOLEAN: Type = Type::Primitive(PrimitiveType::Boolean);
    pub const CHAR: Type = Type::Primitive(PrimitiveType::Char);
    pub const INT32: Type = Type::Primitive(PrimitiveType::Int32);
    pub const INT64: Type = Type::Primitive(PrimitiveType::Int64);
    pub const DOUBLE: Type = Type::Primitive(PrimitiveType::Double);
    pub const DECIMAL: Type = Type::Primitive(PrimitiveType::Decimal);
    pub const STRING: Type = Type::Primitive(PrimitiveType::String);
    pub const OBJECT: Type = Type::Primitive(PrimitiveType::Object);

    pub fn sequence(element: Type) -> Type {
        Type::Sequence(Arc::new(element))
    }

    pub fn array(element: Type) -> Type {
        Type::Array(Arc::new(element))
    }

    pub fn class(descriptor: Arc<dyn TypeDescriptor>) -> Type {
        Type::Class(ClassType::new(descriptor))
    }

    pub fn record(record: Arc<RecordType>) -> Type {
        Type::Record(RecordRef::new(record))
    }

    pub fn delegate(signature: DelegateSignature) -> Type {
        Type::Delegate(Arc::new(signature))
    }

    /// The nullable form of a value primitive; other types are returned unchanged
    /// when they already accept null.
    pub fn to_nullable(&self) -> Option<Type> {
        match self {
            Type::Primitive(p) if p.is_value_type() => Some(Type::Nullable(*p)),
            t if t.accepts_null() => Some(t.clone()),
            _ => None,
        }
    }

    /// Strip one level of nullability.
    pub fn non_nullable(&self) -> Type {
        match self {
            Type::Nullable(p) => Type::Primitive(*p),
            t => t.clone(),
        }
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Nullable(_))
    }

    /// The primitive behind this type, looking through nullability.
    pub fn primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) | Type::Nullable(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.primitive().is_some_and(PrimitiveType::is_numeric)
    }

    pub fn is_integral(&self) -> bool {
        self.primitive().is_some_and(PrimitiveType::is_integral)
    }

    pub fn is_boolean(&self) -> bool {
        self.primitive() == Some(PrimitiveType::Boolean)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveType::String))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Whether `null` is a legal value of this type.
    pub fn accepts_null(&self) -> bool {
        match self {
            Type::Primitive(p) => !p.is_value_type(),
            Type::Nullable(_)
            | Type::Null
            | Type::Sequence(_)
            | Type::Array(_)
            | Type::Record(_)
            | Type::Delegate(_) => true,
            Type::Class(c) => !c.descriptor().is_value_type(),
            Type::Void => false,
        }
    }

    /// Element type of a sequence, array or enumerable host class.
    pub fn element_type(&self) -> Option<Type> {
        match self {
            Type::Sequence(e) | Type::Array(e) => Some(e.as_ref().clone()),
            Type::Class(c) => c.descriptor().element_type(),
            _ => None,
        }
    }

    /// Look up a property or field by exact name, walking the base chain of host classes.
    pub fn member(&self, name: &str) -> Option<Member> {
        match self {
            Type::Class(c) => {
                let descriptor = c.descriptor();
                descriptor
                    .member(name)
                    .or_else(|| descriptor.base_type().and_then(|base| base.member(name)))
            }
            Type::Record(r) => r.member(name),
            _ => None,
        }
    }

    /// Method candidates by exact name. Derived-class candidates come first.
    pub fn methods(&self, name: &str) -> Vec<MethodSignature> {
        match self {
            Type::Class(c) => {
                let descriptor = c.descriptor();
                let mut methods = descriptor.methods(name);
                if let Some(base) = descriptor.base_type() {
                    methods.extend(base.methods(name));
                }
                methods
            }
            _ => Vec::new(),
        }
    }

    pub fn base_type(&self) -> Option<Type> {
        match self {
            Type::Class(c) => c.descriptor().base_type(),
            _ => None,
        }
    }
}

impl From<PrimitiveType> for Type {
    fn from(p: PrimitiveType) -> Self {
        Type::Primitive(p)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => f.write_str(p.name()),
            Type::Nullable(p) => write!(f, "{}?", p.name()),
            Type::Null => f.write_str("null"),
            Type::Void => f.write_str("Void"),
            Type::Sequence(e) => write!(f, "Sequence<{}>", e),
            Type::Array(e) => write!(f, "{}[]", e),
            Type::Class(c) => f.write_str(c.name()),
            Type::Record(r) => f.write_str(r.name()),
            Type::Delegate(d) => write!(f, "{}", d),
        }
    }
}

//! Runtime values and the host-object capability.

use crate::EvalError;
use dynex_checker::ConstantValue;
use dynex_types::RecordType;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A value produced or consumed by an evaluated tree.
///
/// Nullable values share the representation of their underlying type; a
/// missing value is [`Value::Null`].
#[derive(Debug, Clone)]
pub enum Value {
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
    Decimal(f64),
    String(Arc<str>),
    /// Arrays and sequences.
    List(Arc<[Value]>),
    Record(RecordValue),
    Object(Arc<dyn HostObject>),
    Function(FunctionValue),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Value {
        Value::String(Arc::from(s.as_ref()))
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
        Value::List(items.into_iter().collect())
    }

    pub fn object(object: impl HostObject + 'static) -> Value {
        Value::Object(Arc::new(object))
    }

    pub fn function<F>(f: F) -> Value
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Value::Function(FunctionValue(Arc::new(f)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integral and character values widened to `i128`.
    pub fn as_integer(&self) -> Option<i128> {
        Some(match *self {
            Value::Char(c) => u32::from(c).into(),
            Value::SByte(v) => v.into(),
            Value::Byte(v) => v.into(),
            Value::Int16(v) => v.into(),
            Value::UInt16(v) => v.into(),
            Value::Int32(v) => v.into(),
            Value::UInt32(v) => v.into(),
            Value::Int64(v) => v.into(),
            Value::UInt64(v) => v.into(),
            _ => return None,
        })
    }

    /// Any numeric value as a double.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Single(v) => Some(v.into()),
            Value::Double(v) | Value::Decimal(v) => Some(v),
            _ => self.as_integer().map(|i| i as f64),
        }
    }

    /// Short description of the value's runtime shape, for error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(_) => "Boolean".to_string(),
            Value::Char(_) => "Char".to_string(),
            Value::SByte(_) => "SByte".to_string(),
            Value::Byte(_) => "Byte".to_string(),
            Value::Int16(_) => "Int16".to_string(),
            Value::UInt16(_) => "UInt16".to_string(),
            Value::Int32(_) => "Int32".to_string(),
            Value::UInt32(_) => "UInt32".to_string(),
            Value::Int64(_) => "Int64".to_string(),
            Value::UInt64(_) => "UInt64".to_string(),
            Value::Single(_) => "Single".to_string(),
            Value::Double(_) => "Double".to_string(),
            Value::Decimal(_) => "Decimal".to_string(),
            Value::String(_) => "String".to_string(),
            Value::List(_) => "List".to_string(),
            Value::Record(r) => r.record.name().to_string(),
            Value::Object(o) => o.type_name().to_string(),
            Value::Function(_) => "Function".to_string(),
        }
    }

    /// Equality as the `==` operator sees it. Numbers compare by value across
    /// representations, strings ordinally, records by their property values,
    /// and host objects, lists and functions by identity.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => {
                Arc::ptr_eq(&a.record, &b.record)
                    && a.values.iter().zip(b.values.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (Value::Function(a), Value::Function(b)) => {
                Arc::as_ptr(&a.0) as *const () == Arc::as_ptr(&b.0) as *const ()
            }
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }

    /// Ordering of two non-null values of compatible kinds.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.as_ref().cmp(b.as_ref())),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
            (Value::Single(_) | Value::Double(_) | Value::Decimal(_), _)
            | (_, Value::Single(_) | Value::Double(_) | Value::Decimal(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            _ => Some(self.as_integer()?.cmp(&other.as_integer()?)),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<&ConstantValue> for Value {
    fn from(constant: &ConstantValue) -> Self {
        match constant {
            ConstantValue::Null => Value::Null,
            ConstantValue::Boolean(v) => Value::Boolean(*v),
            ConstantValue::Char(v) => Value::Char(*v),
            ConstantValue::SByte(v) => Value::SByte(*v),
            ConstantValue::Byte(v) => Value::Byte(*v),
            ConstantValue::Int16(v) => Value::Int16(*v),
            ConstantValue::UInt16(v) => Value::UInt16(*v),
            ConstantValue::Int32(v) => Value::Int32(*v),
            ConstantValue::UInt32(v) => Value::UInt32(*v),
            ConstantValue::Int64(v) => Value::Int64(*v),
            ConstantValue::UInt64(v) => Value::UInt64(*v),
            ConstantValue::Single(v) => Value::Single(*v),
            ConstantValue::Double(v) => Value::Double(*v),
            ConstantValue::Decimal(v) => Value::Decimal(*v),
            ConstantValue::String(v) => Value::string(v),
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        })*
    };
}

impl_from_value! {
    bool => Boolean,
    char => Char,
    i8 => SByte,
    u8 => Byte,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Single,
    f64 => Double,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// The text `ToString()` produces.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::Char(v) => write!(f, "{}", v),
            Value::SByte(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Single(v) => write!(f, "{}", v),
            Value::Double(v) | Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Record(record) => write!(f, "{}", record),
            Value::Object(object) => f.write_str(object.type_name()),
            Value::Function(_) => f.write_str("Function"),
        }
    }
}

/// An instance of a synthesized record type.
#[derive(Debug, Clone)]
pub struct RecordValue {
    pub record: Arc<RecordType>,
    /// Property values in the record's declaration order.
    pub values: Arc<[Value]>,
}

impl RecordValue {
    /// Build an instance, checking the value count against the record layout.
    pub fn new(record: Arc<RecordType>, values: Vec<Value>) -> Result<Self, EvalError> {
        if values.len() != record.properties().len() {
            return Err(EvalError::ArgumentCount {
                expected: record.properties().len(),
                found: values.len(),
            });
        }
        Ok(Self { record, values: values.into() })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.record.property_index(name).map(|index| &self.values[index])
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (property, value)) in self.record.properties().iter().zip(self.values.iter()).enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, " {} = {}", property.name, value)?;
        }
        f.write_str(" }")
    }
}

/// A callable value bound to a delegate-typed parameter.
#[derive(Clone)]
#[allow(clippy::type_complexity)]
pub struct FunctionValue(pub Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>);

impl FunctionValue {
    pub fn call(&self, arguments: &[Value]) -> Result<Value, EvalError> {
        (self.0)(arguments)
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FunctionValue")
    }
}

/// Runtime access to a host object, the counterpart of a `TypeDescriptor`.
///
/// Only `type_name` and `get` are required; the defaults report the
/// operation as unsupported.
pub trait HostObject: Send + Sync + fmt::Debug {
    fn type_name(&self) -> &str;

    /// Read a property or field.
    fn get(&self, name: &str) -> Option<Value>;

    fn call(&self, method: &str, _arguments: &[Value]) -> Result<Value, EvalError> {
        Err(EvalError::MissingMethod {
            type_name: self.type_name().to_string(),
            method: method.to_string(),
        })
    }

    fn index(&self, _arguments: &[Value]) -> Result<Value, EvalError> {
        Err(EvalError::NotIndexable(self.type_name().to_string()))
    }

    /// The elements, when the object is enumerable.
    fn elements(&self) -> Option<Vec<Value>> {
        None
    }
}

/// A host object backed by an ordered field map.
#[derive(Debug, Clone)]
pub struct DynamicObject {
    type_name: String,
    fields: IndexMap<String, Value>,
}

impl DynamicObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self { type_name: type_name.into(), fields: IndexMap::new() }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }
}

impl HostObject for DynamicObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
}

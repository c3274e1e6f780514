//! The reflective capability through which host types are consumed.

use crate::types::Type;
use std::fmt;

/// A readable property or field of a host type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    pub name: String,
    pub ty: Type,
}

impl Member {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}

/// An instance method overload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub name: String,
    pub parameters: Vec<Type>,
    pub return_type: Type,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, parameters: Vec<Type>, return_type: Type) -> Self {
        Self { name: name.into(), parameters, return_type }
    }
}

/// An indexer overload (`target[i]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexerSignature {
    pub parameters: Vec<Type>,
    pub return_type: Type,
}

/// Describes the shape of a host type: its members, methods and indexers.
///
/// Lookups are case-sensitive. Implementations must be thread-safe because
/// resolved trees may be shared and executed on any thread.
pub trait TypeDescriptor: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// All properties and fields declared on this type (not its base).
    fn members(&self) -> Vec<Member>;

    fn member(&self, name: &str) -> Option<Member> {
        self.members().into_iter().find(|m| m.name == name)
    }

    /// Method overloads declared on this type with the given name.
    fn methods(&self, name: &str) -> Vec<MethodSignature>;

    fn indexers(&self) -> Vec<IndexerSignature> {
        Vec::new()
    }

    /// Element type when this type is enumerable.
    fn element_type(&self) -> Option<Type> {
        None
    }

    fn base_type(&self) -> Option<Type> {
        None
    }

    fn is_value_type(&self) -> bool {
        false
    }
}

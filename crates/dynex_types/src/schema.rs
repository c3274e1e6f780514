//! A static, builder-based [`TypeDescriptor`].
//!
//! ```
//! use dynex_types::{SchemaClass, Type};
//!
//! let inner = SchemaClass::new("Inner").property("Name", Type::STRING).build();
//! let outer = SchemaClass::new("Outer")
//!     .property("Value", Type::STRING)
//!     .property("Inner", inner)
//!     .build();
//! assert!(outer.member("Inner").is_some());
//! ```

use crate::descriptor::{IndexerSignature, Member, MethodSignature, TypeDescriptor};
use crate::types::Type;
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct SchemaClass {
    name: String,
    members: IndexMap<String, Type>,
    methods: Vec<MethodSignature>,
    indexers: Vec<IndexerSignature>,
    element_type: Option<Type>,
    base_type: Option<Type>,
    value_type: bool,
}

impl SchemaClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn property(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.members.insert(name.into(), ty);
        self
    }

    pub fn method(
        mut self,
        name: impl Into<String>,
        parameters: impl IntoIterator<Item = Type>,
        return_type: Type,
    ) -> Self {
        self.methods.push(MethodSignature::new(
            name,
            parameters.into_iter().collect(),
            return_type,
        ));
        self
    }

    pub fn indexer(mut self, parameters: impl IntoIterator<Item = Type>, return_type: Type) -> Self {
        self.indexers.push(IndexerSignature {
            parameters: parameters.into_iter().collect(),
            return_type,
        });
        self
    }

    pub fn enumerable_of(mut self, element_type: Type) -> Self {
        self.element_type = Some(element_type);
        self
    }

    pub fn extends(mut self, base_type: Type) -> Self {
        self.base_type = Some(base_type);
        self
    }

    pub fn value_type(mut self) -> Self {
        self.value_type = true;
        self
    }

    /// Finish the schema and wrap it as a class type.
    pub fn build(self) -> Type {
        Type::class(Arc::new(self))
    }
}

impl TypeDescriptor for SchemaClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> Vec<Member> {
        self.members
            .iter()
            .map(|(name, ty)| Member::new(name.clone(), ty.clone()))
            .collect()
    }

    fn member(&self, name: &str) -> Option<Member> {
        self.members.get(name).map(|ty| Member::new(name, ty.clone()))
    }

    fn methods(&self, name: &str) -> Vec<MethodSignature> {
        self.methods.iter().filter(|m| m.name == name).cloned().collect()
    }

    fn indexers(&self) -> Vec<IndexerSignature> {
        self.indexers.clone()
    }

    fn element_type(&self) -> Option<Type> {
        self.element_type.clone()
    }

    fn base_type(&self) -> Option<Type> {
        self.base_type.clone()
    }

    fn is_value_type(&self) -> bool {
        self.value_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_lookup_is_case_sensitive() {
        let ty = SchemaClass::new("Person").property("Name", Type::STRING).build();
        assert_eq!(ty.member("Name").map(|m| m.ty), Some(Type::STRING));
        assert!(ty.member("name").is_none());
    }

    #[test]
    fn test_base_chain() {
        let base = SchemaClass::new("Stream").method("Close", [], Type::Void).build();
        let derived = SchemaClass::new("FileStream")
            .property("Name", Type::STRING)
            .extends(base.clone())
            .build();
        assert_eq!(derived.methods("Close").len(), 1);
        assert_eq!(derived.base_type(), Some(base));
    }

    #[test]
    fn test_overloads_preserved_in_order() {
        let ty = SchemaClass::new("Calc")
            .method("Add", [Type::INT32], Type::INT32)
            .method("Add", [Type::DOUBLE], Type::DOUBLE)
            .build();
        let methods = ty.methods("Add");
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[1].return_type, Type::DOUBLE);
    }
}

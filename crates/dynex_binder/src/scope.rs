//! Scope management for nested lambdas.

use crate::symbol::{Symbol, SymbolTable};
use dynex_core::text::TextSpan;
use dynex_diagnostics::BindError;
use dynex_types::Type;

/// A chain of symbol tables from the outermost lambda inwards.
///
/// Predicate and selector arguments of aggregates are bound in a pushed
/// child scope whose `it` is the element type. Named parameters of outer
/// scopes stay visible; the innermost `it` shadows any outer one.
#[derive(Debug)]
pub struct ScopeChain<'t> {
    root: &'t SymbolTable,
    children: Vec<SymbolTable>,
}

impl<'t> ScopeChain<'t> {
    pub fn new(root: &'t SymbolTable) -> Self {
        Self {
            root,
            children: Vec::new(),
        }
    }

    /// Enter a nested lambda over `element_type`.
    pub fn push_element_scope(&mut self, element_type: Type) {
        self.children.push(SymbolTable::for_element(element_type));
    }

    pub fn pop(&mut self) {
        self.children.pop();
    }

    /// Number of nested scopes above the root.
    pub fn depth(&self) -> usize {
        self.children.len()
    }

    /// The innermost table.
    pub fn current(&self) -> &SymbolTable {
        self.children.last().unwrap_or(self.root)
    }

    /// Resolve a name, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.children
            .iter()
            .rev()
            .chain(std::iter::once(self.root))
            .find_map(|table| table.lookup(name))
    }

    /// The innermost scope's implicit parameter.
    pub fn implicit_parameter(&self) -> Option<&Symbol> {
        self.current().implicit_parameter()
    }

    pub fn resolve_implicit(&self, span: TextSpan) -> Result<&Symbol, BindError> {
        self.current().resolve_implicit(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynex_types::ParameterDeclaration;

    #[test]
    fn test_child_scope_shadows_it() {
        let root = SymbolTable::new(&[ParameterDeclaration::new("items", Type::sequence(Type::INT32))]).unwrap();
        let mut chain = ScopeChain::new(&root);
        assert_eq!(chain.implicit_parameter().map(|s| s.env_name()), Some("items"));

        chain.push_element_scope(Type::INT32);
        assert_eq!(chain.depth(), 1);
        let it = chain.implicit_parameter().unwrap();
        assert_eq!(it.env_name(), "it");
        assert_eq!(it.ty, Type::INT32);
        // Outer named parameters stay visible.
        assert!(chain.lookup("items").is_some());

        chain.pop();
        assert_eq!(chain.implicit_parameter().map(|s| s.env_name()), Some("items"));
    }
}

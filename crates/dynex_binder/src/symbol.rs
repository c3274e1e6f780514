//! Symbol and symbol table definitions.

use dynex_core::text::TextSpan;
use dynex_diagnostics::{messages, BindError};
use dynex_types::{ParameterDeclaration, Type};
use rustc_hash::FxHashMap;

/// The environment name of the implicit parameter.
pub const IMPLICIT_PARAMETER_NAME: &str = "it";

/// The value a keyword binding denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordLiteral {
    True,
    False,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Keyword(KeywordLiteral),
    /// A declared parameter, by position in the declaring table.
    Parameter { index: usize },
}

/// A name bound in a symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// The name as declared. Empty for an unnamed parameter.
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Type,
}

impl Symbol {
    /// The name under which an executor binds this parameter's value.
    pub fn env_name(&self) -> &str {
        if self.name.is_empty() {
            IMPLICIT_PARAMETER_NAME
        } else {
            &self.name
        }
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self.kind, SymbolKind::Parameter { .. })
    }
}

const KEYWORDS: [(&str, KeywordLiteral); 3] = [
    ("true", KeywordLiteral::True),
    ("false", KeywordLiteral::False),
    ("null", KeywordLiteral::Null),
];

fn keyword_symbols() -> Vec<Symbol> {
    KEYWORDS
        .iter()
        .map(|(name, literal)| Symbol {
            name: name.to_string(),
            kind: SymbolKind::Keyword(*literal),
            ty: match literal {
                KeywordLiteral::Null => Type::Null,
                _ => Type::BOOLEAN,
            },
        })
        .collect()
}

/// Maps names to the parameters and keyword literals of one lambda.
///
/// Parameter names are case-sensitive; keywords match in any case.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    keywords: Vec<Symbol>,
    parameters: Vec<Symbol>,
    table: FxHashMap<String, usize>,
    implicit: Option<usize>,
}

impl SymbolTable {
    /// Build a table from a parameter list. A single parameter becomes the
    /// implicit `it`.
    pub fn new(parameters: &[ParameterDeclaration]) -> Result<Self, BindError> {
        let implicit = if parameters.len() == 1 { Some(0) } else { None };
        Self::with_implicit(parameters, implicit)
    }

    /// Build a table designating `implicit` (an index into `parameters`) as `it`.
    pub fn with_implicit(
        parameters: &[ParameterDeclaration],
        implicit: Option<usize>,
    ) -> Result<Self, BindError> {
        let mut table = SymbolTable {
            keywords: keyword_symbols(),
            parameters: Vec::with_capacity(parameters.len()),
            table: FxHashMap::default(),
            implicit: implicit.filter(|i| *i < parameters.len()),
        };

        for (index, parameter) in parameters.iter().enumerate() {
            if !parameter.is_unnamed() {
                if table.table.contains_key(&parameter.name) {
                    return Err(BindError::new(
                        &messages::DUPLICATE_IDENTIFIER,
                        &[&parameter.name],
                        TextSpan::empty(0),
                    ));
                }
                table.table.insert(parameter.name.clone(), index);
            }
            table.parameters.push(Symbol {
                name: parameter.name.clone(),
                kind: SymbolKind::Parameter { index },
                ty: parameter.ty.clone(),
            });
        }
        Ok(table)
    }

    /// A child table for a nested lambda whose single unnamed parameter is `it`.
    pub fn for_element(element_type: Type) -> Self {
        SymbolTable {
            keywords: keyword_symbols(),
            parameters: vec![Symbol {
                name: String::new(),
                kind: SymbolKind::Parameter { index: 0 },
                ty: element_type,
            }],
            table: FxHashMap::default(),
            implicit: Some(0),
        }
    }

    /// Resolve a keyword (any case) or a named parameter (exact case).
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        if let Some(keyword) = self.keywords.iter().find(|k| k.name.eq_ignore_ascii_case(name)) {
            return Some(keyword);
        }
        self.table.get(name).map(|&index| &self.parameters[index])
    }

    /// The parameter reachable as `it`, if any.
    pub fn implicit_parameter(&self) -> Option<&Symbol> {
        self.implicit.map(|index| &self.parameters[index])
    }

    /// Resolve `it`, failing when no parameter is designated implicit.
    pub fn resolve_implicit(&self, span: TextSpan) -> Result<&Symbol, BindError> {
        self.implicit_parameter().ok_or_else(|| {
            BindError::new(
                &messages::NO_IMPLICIT_PARAMETER,
                &[&self.parameters.len().to_string()],
                span,
            )
        })
    }

    pub fn parameters(&self) -> &[Symbol] {
        &self.parameters
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynex_types::SchemaClass;

    #[test]
    fn test_keywords_any_case() {
        let table = SymbolTable::new(&[]).unwrap();
        assert_eq!(table.lookup("TRUE").map(|s| s.kind), Some(SymbolKind::Keyword(KeywordLiteral::True)));
        assert_eq!(table.lookup("null").map(|s| s.ty.clone()), Some(Type::Null));
        assert!(table.lookup("x").is_none());
    }

    #[test]
    fn test_parameters_case_sensitive() {
        let table = SymbolTable::new(&[
            ParameterDeclaration::new("x", Type::INT32),
            ParameterDeclaration::new("y", Type::STRING),
        ])
        .unwrap();
        assert_eq!(table.lookup("y").map(|s| s.ty.clone()), Some(Type::STRING));
        assert!(table.lookup("X").is_none());
        assert!(table.implicit_parameter().is_none());
    }

    #[test]
    fn test_single_parameter_is_implicit() {
        let table = SymbolTable::new(&[ParameterDeclaration::new("x", Type::INT32)]).unwrap();
        assert_eq!(table.implicit_parameter().map(|s| s.env_name()), Some("x"));
    }

    #[test]
    fn test_unnamed_parameter_only_reachable_as_it() {
        let table = SymbolTable::new(&[ParameterDeclaration::unnamed(Type::INT32)]).unwrap();
        assert!(table.lookup("").is_none());
        assert_eq!(table.implicit_parameter().map(|s| s.env_name()), Some("it"));
    }

    #[test]
    fn test_duplicate_parameter() {
        let err = SymbolTable::new(&[
            ParameterDeclaration::new("a", Type::INT32),
            ParameterDeclaration::new("a", Type::STRING),
        ])
        .unwrap_err();
        assert_eq!(err.code, 3003);
    }

    #[test]
    fn test_no_implicit_with_two_parameters() {
        let table = SymbolTable::new(&[
            ParameterDeclaration::new("a", Type::INT32),
            ParameterDeclaration::new("b", Type::INT32),
        ])
        .unwrap();
        assert!(table.resolve_implicit(TextSpan::new(0, 2)).is_err());
    }
}

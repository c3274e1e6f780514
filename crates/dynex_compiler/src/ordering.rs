//! Ordering specifications: `"Name, Age desc"` becomes one key selector per clause.

use crate::lambda::{assemble, ReturnTarget};
use bumpalo::Bump;
use dynex_binder::SymbolTable;
use dynex_checker::{Checker, LambdaExpression};
use dynex_diagnostics::{messages, BindError, ParseFailure};
use dynex_options::ParserOptions;
use dynex_parser::{split_ordering_clauses, Parser, SortDirection};
use dynex_types::{ParameterDeclaration, RecordCache, Type};

/// One sort key: a selector over the element type and its direction.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderingClause {
    pub expression: LambdaExpression,
    pub direction: SortDirection,
}

/// Parse `text` into ordering clauses over elements of `element_type`.
///
/// Every clause is bound against the same table, whose single unnamed
/// parameter is the element. Spans in errors are offsets into `text`.
pub(crate) fn parse_ordering(
    records: &RecordCache,
    options: &ParserOptions,
    element_type: &Type,
    text: &str,
) -> Result<Vec<OrderingClause>, ParseFailure> {
    let parameters = vec![ParameterDeclaration::unnamed(element_type.clone())];
    let symbols = SymbolTable::new(&parameters)?;
    let segments = split_ordering_clauses(text)?;
    let arena = Bump::new();

    let mut clauses = Vec::with_capacity(segments.len());
    for segment in segments {
        let expression =
            Parser::with_range(&arena, text, segment.start, segment.end, &symbols, options).parse_expression()?;
        let body = Checker::new(&symbols, records, options).check(expression)?;
        // A sort key must produce a value.
        if body.ty.is_void() {
            return Err(BindError::new(&messages::VOID_VALUE_NOT_ALLOWED, &[], body.span).into());
        }
        tracing::trace!(
            start = segment.start,
            end = segment.end,
            direction = ?segment.direction,
            key = %body.ty,
            "bound ordering clause"
        );
        let expression = assemble(parameters.clone(), body, ReturnTarget::Inferred)?;
        clauses.push(OrderingClause { expression, direction: segment.direction });
    }
    Ok(clauses)
}

//! dynex_compiler: Compiles expression text into typed lambda trees.
//!
//! [`DynamicExpression`] drives the pipeline for one call: symbol table,
//! parse, check, then lambda assembly. The only state shared between calls
//! is the [`RecordCache`] the compiler borrows.

mod lambda;
mod ordering;

pub use lambda::{assemble, ReturnTarget};
pub use ordering::OrderingClause;
pub use dynex_parser::SortDirection;

use bumpalo::Bump;
use dynex_binder::SymbolTable;
use dynex_checker::{Checker, LambdaExpression};
use dynex_diagnostics::{ParseFailure, RecordSynthesisError};
use dynex_options::ParserOptions;
use dynex_parser::Parser;
use dynex_types::{
    DelegateSignature, DynamicProperty, ParameterDeclaration, PropertySignature, RecordCache, RecordType, Type,
};
use std::sync::Arc;

/// Entry points for compiling expression text.
///
/// Cheap to construct; every method is independent and may be called from
/// any number of threads as long as they share the same cache.
#[derive(Debug, Clone)]
pub struct DynamicExpression<'c> {
    records: &'c RecordCache,
    options: ParserOptions,
}

impl<'c> DynamicExpression<'c> {
    pub fn new(records: &'c RecordCache) -> Self {
        Self { records, options: ParserOptions::default() }
    }

    pub fn with_options(records: &'c RecordCache, options: ParserOptions) -> Self {
        Self { records, options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn records(&self) -> &'c RecordCache {
        self.records
    }

    /// Compile `text` as a function of `parameters`. With a single parameter,
    /// that parameter is also reachable as `it`.
    ///
    /// When `result_type` is given the body must be assignable to it.
    pub fn parse_expression(
        &self,
        parameters: &[ParameterDeclaration],
        result_type: Option<&Type>,
        text: &str,
    ) -> Result<LambdaExpression, ParseFailure> {
        tracing::debug!(text, parameters = parameters.len(), result = ?result_type, "parse_expression");
        let implicit = (parameters.len() == 1).then_some(0);
        self.compile(parameters.to_vec(), implicit, return_target(result_type), text)
    }

    /// Compile `text` with `it` bound to a value of `context_type`.
    ///
    /// Without `parameters` the lambda takes one unnamed parameter of
    /// `context_type`. With `parameters`, those are the lambda's parameters
    /// and `it` is the first of them whose type is `context_type` (or the
    /// only parameter, when there is just one).
    pub fn parse_lambda(
        &self,
        context_type: &Type,
        parameters: Option<&[ParameterDeclaration]>,
        result_type: Option<&Type>,
        text: &str,
    ) -> Result<LambdaExpression, ParseFailure> {
        tracing::debug!(text, context = %context_type, result = ?result_type, "parse_lambda");
        let (parameters, implicit) = match parameters {
            None => (vec![ParameterDeclaration::unnamed(context_type.clone())], Some(0)),
            Some(parameters) => {
                let implicit = parameters
                    .iter()
                    .position(|p| p.ty == *context_type)
                    .or_else(|| (parameters.len() == 1).then_some(0));
                (parameters.to_vec(), implicit)
            }
        };
        self.compile(parameters, implicit, return_target(result_type), text)
    }

    /// Compile `text` as an implementation of `signature`. The signature's
    /// parameters are the lambda's parameters and its return type is required.
    pub fn parse_lambda_for_delegate(
        &self,
        signature: &DelegateSignature,
        text: &str,
    ) -> Result<LambdaExpression, ParseFailure> {
        tracing::debug!(text, delegate = %signature, "parse_lambda_for_delegate");
        let parameters = signature.parameters.clone();
        let implicit = (parameters.len() == 1).then_some(0);
        self.compile(parameters, implicit, ReturnTarget::Delegate(signature), text)
    }

    /// Like [`Self::parse_lambda_for_delegate`], but with caller-supplied
    /// parameter names. Their count and types must match the signature.
    pub fn parse_lambda_for_delegate_with(
        &self,
        signature: &DelegateSignature,
        parameters: &[ParameterDeclaration],
        text: &str,
    ) -> Result<LambdaExpression, ParseFailure> {
        tracing::debug!(text, delegate = %signature, parameters = parameters.len(), "parse_lambda_for_delegate");
        let implicit = (parameters.len() == 1).then_some(0);
        self.compile(parameters.to_vec(), implicit, ReturnTarget::Delegate(signature), text)
    }

    /// The record type with exactly `properties`, in order.
    pub fn create_record_type<I>(&self, properties: I) -> Result<Arc<RecordType>, RecordSynthesisError>
    where
        I: IntoIterator<Item = DynamicProperty>,
    {
        self.records.get_or_create(properties.into_iter().collect::<PropertySignature>())
    }

    /// Parse an ordering specification over elements of `element_type`.
    pub fn parse_ordering(&self, element_type: &Type, text: &str) -> Result<Vec<OrderingClause>, ParseFailure> {
        tracing::debug!(text, element = %element_type, "parse_ordering");
        ordering::parse_ordering(self.records, &self.options, element_type, text)
    }

    fn compile(
        &self,
        parameters: Vec<ParameterDeclaration>,
        implicit: Option<usize>,
        target: ReturnTarget<'_>,
        text: &str,
    ) -> Result<LambdaExpression, ParseFailure> {
        let symbols = SymbolTable::with_implicit(&parameters, implicit)?;
        let arena = Bump::new();
        let expression = Parser::new(&arena, text, &symbols, &self.options).parse_expression()?;
        let body = Checker::new(&symbols, self.records, &self.options).check(expression)?;
        Ok(assemble(parameters, body, target)?)
    }
}

fn return_target(result_type: Option<&Type>) -> ReturnTarget<'_> {
    result_type.map_or(ReturnTarget::Inferred, ReturnTarget::Type)
}

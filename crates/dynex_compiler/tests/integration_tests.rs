//! Compiler integration tests.
//!
//! End-to-end tests for the compile entry points: text in, typed lambda out.

use dynex_checker::ExprKind;
use dynex_compiler::{DynamicExpression, SortDirection};
use dynex_diagnostics::DiagnosticCategory;
use dynex_options::ParserOptions;
use dynex_types::{
    DelegateSignature, DynamicProperty, ParameterDeclaration, RecordCache, SchemaClass, Type,
};
use rayon::prelude::*;
use std::sync::Arc;

fn tuple_type() -> Type {
    SchemaClass::new("Tuple<Int32>").property("Item1", Type::INT32).build()
}

fn file_stream_type() -> Type {
    SchemaClass::new("FileStream")
        .property("Length", Type::INT64)
        .property("Name", Type::STRING)
        .method("Close", [], Type::Void)
        .method("ReadByte", [], Type::INT32)
        .build()
}

fn outer_type() -> Type {
    let inner = SchemaClass::new("Inner").property("Name", Type::STRING).build();
    SchemaClass::new("Outer")
        .property("Value", Type::STRING)
        .property("Inner", inner)
        .build()
}

// ============================================================================
// parse_expression
// ============================================================================

#[test]
fn test_parse_expression_with_result_type() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);
    let parameters = [ParameterDeclaration::new("x", Type::INT32)];

    let lambda = compiler.parse_expression(&parameters, Some(&Type::INT32), "x + 1").unwrap();
    assert_eq!(lambda.body.ty, Type::INT32);
    assert_eq!(lambda.return_type, Type::INT32);
    assert_eq!(lambda.delegate_type.to_string(), "Func<Int32, Int32>");
}

#[test]
fn test_parse_expression_widens_to_result_type() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);
    let parameters = [ParameterDeclaration::new("x", Type::INT32)];

    let lambda = compiler.parse_expression(&parameters, Some(&Type::DOUBLE), "x * 2").unwrap();
    assert_eq!(lambda.return_type, Type::DOUBLE);
    assert!(matches!(lambda.body.kind, ExprKind::Convert { .. }));
}

#[test]
fn test_parse_expression_result_type_mismatch() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);
    let parameters = [ParameterDeclaration::new("x", Type::INT32)];

    let err = compiler.parse_expression(&parameters, Some(&Type::STRING), "x + 1").unwrap_err();
    assert_eq!(err.category(), DiagnosticCategory::Bind);
    assert_eq!(err.code(), 3014);
    assert_eq!(err.message(), "Expression of type 'String' expected, found 'Int32'.");
}

#[test]
fn test_parse_expression_without_result_type() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);
    let parameters = [
        ParameterDeclaration::new("a", Type::STRING),
        ParameterDeclaration::new("b", Type::INT32),
    ];

    let lambda = compiler.parse_expression(&parameters, None, "a.Length > b").unwrap();
    assert_eq!(lambda.return_type, Type::BOOLEAN);
    assert_eq!(lambda.delegate_type.to_string(), "Func<String, Int32, Boolean>");
    assert_eq!(compiler.parse_expression(&parameters, None, "it").unwrap_err().code(), 3002);
}

#[test]
fn test_parse_expression_reports_every_error_kind() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);
    let parameters = [ParameterDeclaration::new("x", Type::INT32)];

    let lex = compiler.parse_expression(&parameters, None, "\"open").unwrap_err();
    assert_eq!(lex.category(), DiagnosticCategory::Lex);
    let syntax = compiler.parse_expression(&parameters, None, "x +").unwrap_err();
    assert_eq!(syntax.category(), DiagnosticCategory::Syntax);
    let bind = compiler.parse_expression(&parameters, None, "y").unwrap_err();
    assert_eq!(bind.category(), DiagnosticCategory::Bind);
}

#[test]
fn test_options_are_honored() {
    let records = RecordCache::new();
    let options = ParserOptions::default().with_max_recursion_depth(4);
    let compiler = DynamicExpression::with_options(&records, options);
    let parameters = [ParameterDeclaration::new("x", Type::INT32)];

    assert!(compiler.parse_expression(&parameters, None, "(x)").is_ok());
    let err = compiler.parse_expression(&parameters, None, "((((((((x))))))))").unwrap_err();
    assert_eq!(err.code(), 2009);
}

#[test]
fn test_long_addition_chain_is_rejected() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);
    let parameters = [ParameterDeclaration::new("x", Type::INT32)];

    let err = compiler.parse_expression(&parameters, None, &vec!["x"; 5_000].join(" + ")).unwrap_err();
    assert_eq!(err.category(), DiagnosticCategory::Syntax);
    assert_eq!(err.code(), 2009);

    let lambda = compiler.parse_expression(&parameters, None, &vec!["x"; 100].join(" + ")).unwrap();
    assert_eq!(lambda.return_type, Type::INT32);
}

// ============================================================================
// parse_lambda
// ============================================================================

#[test]
fn test_parse_lambda_tuple_to_string() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);

    let lambda = compiler
        .parse_lambda(&tuple_type(), None, Some(&Type::STRING), "it.ToString()")
        .unwrap();
    assert_eq!(lambda.return_type, Type::STRING);
    assert_eq!(lambda.parameters, vec![ParameterDeclaration::unnamed(tuple_type())]);
}

#[test]
fn test_parse_lambda_void_method_is_action() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);

    let lambda = compiler.parse_lambda(&file_stream_type(), None, None, "it.Close()").unwrap();
    assert_eq!(lambda.return_type, Type::Void);
    assert_eq!(lambda.delegate_type.to_string(), "Action<FileStream>");
}

#[test]
fn test_parse_lambda_void_result_discards_call_value() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);

    let lambda = compiler
        .parse_lambda(&file_stream_type(), None, Some(&Type::Void), "ReadByte()")
        .unwrap();
    assert_eq!(lambda.return_type, Type::Void);
    assert_eq!(lambda.body.ty, Type::INT32);

    let err = compiler
        .parse_lambda(&file_stream_type(), None, Some(&Type::Void), "Length + 1")
        .unwrap_err();
    assert_eq!(err.code(), 3015);
}

#[test]
fn test_parse_lambda_with_explicit_parameters() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);
    let parameters = [
        ParameterDeclaration::new("limit", Type::INT64),
        ParameterDeclaration::new("file", file_stream_type()),
    ];

    let lambda = compiler
        .parse_lambda(&file_stream_type(), Some(&parameters), None, "Length > limit && file.Name != null")
        .unwrap();
    assert_eq!(lambda.return_type, Type::BOOLEAN);
    assert_eq!(lambda.parameters.len(), 2);
}

#[test]
fn test_value_result_of_void_method_is_rejected() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);

    let err = compiler
        .parse_lambda(&file_stream_type(), None, Some(&Type::BOOLEAN), "Close()")
        .unwrap_err();
    assert_eq!(err.code(), 3014);
}

// ============================================================================
// Delegates
// ============================================================================

#[test]
fn test_parse_lambda_event_handler_delegate() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);
    let event_args = SchemaClass::new("EventArgs").build();
    let parameters = vec![
        ParameterDeclaration::new("sender", Type::OBJECT),
        ParameterDeclaration::new("e", event_args),
    ];
    let signature = DelegateSignature::named("EventHandler", parameters.clone(), Type::Void);

    let lambda = compiler
        .parse_lambda_for_delegate_with(&signature, &parameters, "sender.ToString()")
        .unwrap();
    assert_eq!(lambda.return_type, Type::Void);
    assert_eq!(lambda.delegate_type, Type::delegate(signature.clone()));
    assert_eq!(lambda.delegate_type.to_string(), "EventHandler");

    let lambda = compiler.parse_lambda_for_delegate(&signature, "e.GetHashCode()").unwrap();
    assert_eq!(lambda.return_type, Type::Void);
}

#[test]
fn test_delegate_parameter_mismatch() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);
    let signature = DelegateSignature::anonymous(vec![ParameterDeclaration::new("x", Type::INT32)], Type::INT32);

    let err = compiler.parse_lambda_for_delegate_with(&signature, &[], "1").unwrap_err();
    assert_eq!(err.code(), 3021);

    let wrong = [ParameterDeclaration::new("x", Type::STRING)];
    let err = compiler.parse_lambda_for_delegate_with(&signature, &wrong, "1").unwrap_err();
    assert_eq!(err.code(), 3013);
}

#[test]
fn test_delegate_return_type_conversion() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);
    let signature = DelegateSignature::anonymous(vec![ParameterDeclaration::new("x", Type::INT32)], Type::INT64);

    let lambda = compiler.parse_lambda_for_delegate(&signature, "x * 2").unwrap();
    assert_eq!(lambda.return_type, Type::INT64);
    assert_eq!(lambda.delegate_type.to_string(), "Func<Int32, Int64>");
    assert!(matches!(lambda.body.kind, ExprKind::Convert { .. }));
    // The single signature parameter is also `it`.
    assert!(compiler.parse_lambda_for_delegate(&signature, "it + x").is_ok());
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_create_record_type_is_shared() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);

    let first = compiler.create_record_type([DynamicProperty::new("prop1", Type::STRING)]).unwrap();
    let second = compiler.create_record_type([DynamicProperty::new("prop1", Type::STRING)]).unwrap();
    let other = compiler.create_record_type([DynamicProperty::new("prop1", Type::INT32)]).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(records.len(), 2);
}

#[test]
fn test_create_record_type_concurrently() {
    const CALLERS: usize = 15;
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);

    let created: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                scope.spawn(|| compiler.create_record_type([DynamicProperty::new("prop1", Type::STRING)]))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
    });

    assert_eq!(created.len(), CALLERS);
    assert!(created.iter().all(|record| Arc::ptr_eq(record, &created[0])));
    assert_eq!(records.synthesized_count(), 1);
}

#[test]
fn test_projection_and_create_share_records() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);

    let lambda = compiler.parse_lambda(&file_stream_type(), None, None, "new (Name as prop1)").unwrap();
    let created = compiler.create_record_type([DynamicProperty::new("prop1", Type::STRING)]).unwrap();
    assert_eq!(lambda.return_type, Type::record(created));
    assert_eq!(records.synthesized_count(), 1);
}

#[test]
fn test_invalid_record_signature() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);

    let err = compiler.create_record_type([DynamicProperty::new("1st", Type::STRING)]).unwrap_err();
    assert_eq!(err.code, 4001);
    assert!(records.is_empty());
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_parse_ordering_directions() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);

    let clauses = compiler.parse_ordering(&outer_type(), "Value desc, Inner.Name, Value ASCENDING").unwrap();
    let directions: Vec<SortDirection> = clauses.iter().map(|c| c.direction).collect();
    assert_eq!(
        directions,
        [SortDirection::Descending, SortDirection::Ascending, SortDirection::Ascending]
    );
    assert!(clauses.iter().all(|c| c.expression.return_type == Type::STRING));
    assert_eq!(clauses[0].expression.delegate_type.to_string(), "Func<Outer, String>");
}

#[test]
fn test_parse_ordering_nested_conditional() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);

    let clauses = compiler
        .parse_ordering(
            &outer_type(),
            "(Inner==null||Inner.Name==null?String(null):String(Inner.Name)) Asc,Value desc",
        )
        .unwrap();
    assert_eq!(clauses.len(), 2);
    assert_eq!(clauses[0].direction, SortDirection::Ascending);
    assert!(matches!(clauses[0].expression.body.kind, ExprKind::Conditional { .. }));
    assert_eq!(clauses[1].direction, SortDirection::Descending);
}

#[test]
fn test_direction_keyword_alone_is_a_member() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);
    let element = SchemaClass::new("Flags").property("desc", Type::BOOLEAN).build();

    let clauses = compiler.parse_ordering(&element, "desc").unwrap();
    assert_eq!(clauses[0].direction, SortDirection::Ascending);
    assert_eq!(clauses[0].expression.return_type, Type::BOOLEAN);

    let clauses = compiler.parse_ordering(&element, "desc desc").unwrap();
    assert_eq!(clauses[0].direction, SortDirection::Descending);
}

#[test]
fn test_parse_ordering_errors() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);

    let err = compiler.parse_ordering(&outer_type(), "Value,,Inner").unwrap_err();
    assert_eq!(err.category(), DiagnosticCategory::Syntax);
    assert_eq!(err.code(), 2010);
    assert_eq!(compiler.parse_ordering(&outer_type(), "Value,").unwrap_err().code(), 2010);

    // Spans point into the whole specification.
    let err = compiler.parse_ordering(&outer_type(), "Value, Missing desc").unwrap_err();
    assert_eq!(err.code(), 3004);
    assert_eq!(err.span().start, 7);
    assert_eq!(err.span().length, 7);
}

#[test]
fn test_parse_ordering_rejects_void_keys() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);

    let err = compiler.parse_ordering(&file_stream_type(), "it.Close() desc").unwrap_err();
    assert_eq!(err.category(), DiagnosticCategory::Bind);
    assert_eq!(err.code(), 3019);

    let err = compiler.parse_ordering(&file_stream_type(), "Length, it.Close()").unwrap_err();
    assert_eq!(err.code(), 3019);
    assert_eq!(err.span().start, 8);
    assert_eq!(err.span().length, 10);

    let clauses = compiler.parse_ordering(&file_stream_type(), "it.ReadByte() desc").unwrap();
    assert_eq!(clauses[0].expression.return_type, Type::INT32);
    assert_eq!(clauses[0].direction, SortDirection::Descending);
}

// ============================================================================
// Purity
// ============================================================================

#[test]
fn test_same_input_gives_equal_trees() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);
    let text = "new (Name, Length * 2 as Doubled, iif(Length > 10, \"big\", \"small\") as Size)";

    let first = compiler.parse_lambda(&file_stream_type(), None, None, text).unwrap();
    let second = compiler.parse_lambda(&file_stream_type(), None, None, text).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.body.node_count(), second.body.node_count());
}

#[test]
fn test_parallel_compiles_agree() {
    let records = RecordCache::new();
    let compiler = DynamicExpression::new(&records);
    let texts: Vec<String> = (0..64).map(|i| format!("new (Name, Length + {} as Size)", i % 4)).collect();

    let lambdas: Vec<_> = texts
        .par_iter()
        .map(|text| compiler.parse_lambda(&file_stream_type(), None, None, text).unwrap())
        .collect();

    assert!(lambdas.iter().all(|l| l.return_type == lambdas[0].return_type));
    assert_eq!(records.synthesized_count(), 1);
}

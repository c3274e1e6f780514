//! Checker integration tests.
//!
//! Runs the parse -> check pipeline against a small host model and verifies
//! result types, tree shapes and diagnostics.

use bumpalo::Bump;
use dynex_binder::SymbolTable;
use dynex_checker::{Aggregate, BinaryOperator, Checker, ConstantValue, ExprKind, Intrinsic, TypedExpr};
use dynex_diagnostics::{DiagnosticCategory, ParseFailure};
use dynex_options::ParserOptions;
use dynex_parser::Parser;
use dynex_types::{
    DelegateSignature, ParameterDeclaration, PrimitiveType, RecordCache, SchemaClass, Type,
};

/// Helper: the `Order` host type.
fn order_type() -> Type {
    SchemaClass::new("Order")
        .property("Total", Type::DECIMAL)
        .property("Quantity", Type::INT32)
        .build()
}

/// Helper: the `Person` host type.
fn person_type() -> Type {
    SchemaClass::new("Person")
        .property("Name", Type::STRING)
        .property("Nickname", Type::STRING)
        .property("Age", Type::INT32)
        .property("Score", Type::Nullable(PrimitiveType::Double))
        .property("Orders", Type::sequence(order_type()))
        .property("Tags", Type::array(Type::STRING))
        .method("Greet", [], Type::STRING)
        .method("Greet", [Type::STRING], Type::STRING)
        .method("Close", [], Type::Void)
        .indexer([Type::STRING], Type::INT32)
        .build()
}

/// Helper: check `text` with the given parameters, options and record cache.
fn check_full(
    parameters: &[ParameterDeclaration],
    text: &str,
    options: &ParserOptions,
    records: &RecordCache,
) -> Result<TypedExpr, ParseFailure> {
    let arena = Bump::new();
    let symbols = SymbolTable::new(parameters)?;
    let expression = Parser::new(&arena, text, &symbols, options).parse_expression()?;
    Checker::new(&symbols, records, options).check(expression)
}

/// Helper: check `text` against the given parameters.
fn check_with(parameters: &[ParameterDeclaration], text: &str) -> Result<TypedExpr, ParseFailure> {
    check_full(parameters, text, &ParserOptions::default(), &RecordCache::new())
}

/// Helper: check `text` with a single unnamed `Person` parameter.
fn check(text: &str) -> TypedExpr {
    check_with(&[ParameterDeclaration::unnamed(person_type())], text)
        .unwrap_or_else(|e| panic!("failed to check {:?}: {}", text, e))
}

/// Helper: the result type of `text`, as displayed.
fn type_of(text: &str) -> String {
    check(text).ty.to_string()
}

/// Helper: the error code for `text` with a single unnamed `Person` parameter.
fn error_code(text: &str) -> u32 {
    check_error(text).code()
}

fn check_error(text: &str) -> ParseFailure {
    match check_with(&[ParameterDeclaration::unnamed(person_type())], text) {
        Ok(typed) => panic!("expected {:?} to fail, got type {}", text, typed.ty),
        Err(e) => e,
    }
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_literal_types() {
    assert_eq!(type_of("1"), "Int32");
    assert_eq!(type_of("1L"), "Int64");
    assert_eq!(type_of("3000000000"), "UInt32");
    assert_eq!(type_of("1u"), "UInt32");
    assert_eq!(type_of("1.5"), "Double");
    assert_eq!(type_of("1.5f"), "Single");
    assert_eq!(type_of("1.5m"), "Decimal");
    assert_eq!(type_of("'a'"), "Char");
    assert_eq!(type_of("\"s\""), "String");
    assert_eq!(type_of("null"), "null");
    assert_eq!(type_of("true"), "Boolean");
}

#[test]
fn test_negative_literal_value() {
    let typed = check("-2147483648");
    assert_eq!(typed.kind, ExprKind::Constant(ConstantValue::Int32(i32::MIN)));
}

#[test]
fn test_negative_unsigned_literal_is_rejected() {
    let err = check_error("-1U");
    assert_eq!(err.category(), DiagnosticCategory::Syntax);
    assert_eq!(err.code(), 2006);
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn test_implicit_member_access() {
    let typed = check("Name");
    assert_eq!(typed.ty, Type::STRING);
    match typed.kind {
        ExprKind::Member { target, name } => {
            assert_eq!(name, "Name");
            assert_eq!(target.kind, ExprKind::Parameter { name: "it".to_string() });
        }
        other => panic!("expected a member, got {:?}", other),
    }
    assert_eq!(type_of("it.Age"), "Int32");
}

#[test]
fn test_unknown_member() {
    let err = check_error("Foo");
    assert_eq!(err.code(), 3004);
    assert_eq!(err.message(), "No property or field 'Foo' exists in type 'Person'.");
    assert_eq!(err.span().start, 0);
    assert_eq!(err.span().length, 3);
}

#[test]
fn test_no_implicit_parameter() {
    let parameters = [
        ParameterDeclaration::new("a", Type::INT32),
        ParameterDeclaration::new("b", Type::INT32),
    ];
    assert_eq!(check_with(&parameters, "Foo").unwrap_err().code(), 3001);
    assert_eq!(check_with(&parameters, "it").unwrap_err().code(), 3002);
    assert_eq!(check_with(&parameters, "a + b").unwrap().ty, Type::INT32);
}

#[test]
fn test_implicit_member_access_can_be_disabled() {
    let options = ParserOptions::default().with_implicit_member_access(false);
    let err = check_full(
        &[ParameterDeclaration::unnamed(person_type())],
        "Name",
        &options,
        &RecordCache::new(),
    )
    .unwrap_err();
    assert_eq!(err.code(), 3001);
}

#[test]
fn test_member_named_like_a_type_follows_the_lambda_scope() {
    let item = SchemaClass::new("Item")
        .property("String", Type::STRING)
        .property("Count", Type::INT32)
        .build();
    let bag = SchemaClass::new("Bag")
        .property("Items", Type::sequence(item))
        .property("Int32", Type::INT64)
        .build();
    let parameters = [ParameterDeclaration::unnamed(bag)];
    let type_of = |text: &str| check_with(&parameters, text).map(|typed| typed.ty);

    // Inside the lambda, the element's member shadows the type.
    assert_eq!(type_of("Items.Select(String)"), Ok(Type::sequence(Type::STRING)));
    assert_eq!(type_of("Items.Select(String.Length)"), Ok(Type::sequence(Type::INT32)));
    assert_eq!(type_of("Items.Any(String.StartsWith(\"a\"))"), Ok(Type::BOOLEAN));

    // The element has no `Int32`, so the outer member does not leak in.
    assert_eq!(type_of("Items.Select(Int32(Count))"), Ok(Type::sequence(Type::INT32)));
    assert_eq!(check_with(&parameters, "Items.Select(Int32)").unwrap_err().code(), 2001);

    // At the top level the bag's own member wins.
    assert_eq!(type_of("Int32 + 1"), Ok(Type::INT64));
    assert_eq!(type_of("Int64(Int32)"), Ok(Type::INT64));
}

#[test]
fn test_single_named_parameter_is_also_it() {
    let typed = check_with(&[ParameterDeclaration::new("x", Type::INT32)], "it + x").unwrap();
    assert_eq!(typed.ty, Type::INT32);
    match typed.kind {
        ExprKind::Binary { left, right, .. } => {
            assert_eq!(left.kind, ExprKind::Parameter { name: "x".to_string() });
            assert_eq!(right.kind, ExprKind::Parameter { name: "x".to_string() });
        }
        other => panic!("expected a binary node, got {:?}", other),
    }
}

#[test]
fn test_bare_type_name_is_incomplete() {
    let err = check_error("Int32");
    assert_eq!(err.category(), DiagnosticCategory::Syntax);
    assert_eq!(err.code(), 2001);
}

// ============================================================================
// Members, methods and indexers
// ============================================================================

#[test]
fn test_builtin_properties() {
    assert_eq!(type_of("Name.Length"), "Int32");
    assert_eq!(type_of("Tags.Length"), "Int32");
    assert_eq!(type_of("Score.HasValue"), "Boolean");
    assert_eq!(type_of("Score.Value"), "Double");
    assert!(matches!(
        check("Name.Length").kind,
        ExprKind::Intrinsic { intrinsic: Intrinsic::StringLength, .. }
    ));
}

#[test]
fn test_static_members() {
    assert_eq!(check("Int32.MaxValue").kind, ExprKind::Constant(ConstantValue::Int32(i32::MAX)));
    assert_eq!(type_of("String.Empty"), "String");
    assert_eq!(error_code("Int32.Foo"), 3016);
}

#[test]
fn test_math_functions() {
    assert_eq!(type_of("Math.Max(Age, 2.5)"), "Double");
    assert_eq!(type_of("Math.Abs(-Age)"), "Int32");
    assert_eq!(type_of("Math.Floor(1.5)"), "Double");
    assert_eq!(type_of("String.IsNullOrEmpty(Name)"), "Boolean");
    assert_eq!(error_code("Math.Max(Name, 1)"), 3005);
    assert_eq!(error_code("Math.Sqrt(2.0)"), 3016);
}

#[test]
fn test_host_method_overloads() {
    assert_eq!(type_of("Greet()"), "String");
    assert_eq!(type_of("Greet(\"hi\")"), "String");
    assert_eq!(type_of("it.Greet(Name)"), "String");
    assert_eq!(error_code("Greet(1)"), 3005);
    assert!(matches!(check("Greet()").kind, ExprKind::Call { .. }));
}

#[test]
fn test_equal_cost_overloads_are_ambiguous() {
    let host = SchemaClass::new("Host")
        .method("F", [Type::INT64], Type::STRING)
        .method("F", [Type::DOUBLE], Type::BOOLEAN)
        .method("F", [Type::INT32, Type::INT64], Type::INT32)
        .method("F", [Type::INT64, Type::INT32], Type::INT32)
        .build();
    let parameters = [
        ParameterDeclaration::new("h", host),
        ParameterDeclaration::new("x", Type::INT32),
        ParameterDeclaration::new("l", Type::INT64),
    ];

    let err = check_with(&parameters, "h.F(x)").unwrap_err();
    assert_eq!(err.category(), DiagnosticCategory::Bind);
    assert_eq!(err.code(), 3006);
    assert_eq!(check_with(&parameters, "h.F(x, x)").unwrap_err().code(), 3006);

    // An exact match is cheaper than either widening.
    assert_eq!(check_with(&parameters, "h.F(l)").unwrap().ty, Type::STRING);
    assert_eq!(check_with(&parameters, "h.F(x, l)").unwrap().ty, Type::INT32);
}

#[test]
fn test_builtin_methods() {
    assert_eq!(type_of("Name.ToUpper()"), "String");
    assert_eq!(type_of("Name.IndexOf('a')"), "Int32");
    assert_eq!(type_of("Name.Substring(1, 2)"), "String");
    assert_eq!(type_of("Age.ToString()"), "String");
    assert_eq!(type_of("Name.Contains(\"x\")"), "Boolean");
    assert_eq!(error_code("Name.Foo()"), 3005);
}

#[test]
fn test_indexers() {
    assert_eq!(type_of("it[\"a\"]"), "Int32");
    assert_eq!(type_of("Tags[0]"), "String");
    assert_eq!(type_of("Name[0]"), "Char");
    assert_eq!(error_code("Tags[\"x\"]"), 3012);
    assert_eq!(error_code("Age[0]"), 3012);
}

#[test]
fn test_void_method_only_at_top_level() {
    assert_eq!(check("Close()").ty, Type::Void);
    assert_eq!(error_code("Close() == null"), 3019);
}

// ============================================================================
// Conversions
// ============================================================================

#[test]
fn test_explicit_conversions() {
    let typed = check("Int64(Age)");
    assert_eq!(typed.ty, Type::INT64);
    assert!(matches!(typed.kind, ExprKind::Convert { .. }));

    assert_eq!(type_of("Int32(Score.Value)"), "Int32");
    assert_eq!(type_of("String(null)"), "String");
    assert_eq!(error_code("Int32(Name)"), 3013);
    assert_eq!(error_code("Int32()"), 3023);
    assert_eq!(error_code("Int32(1, 2)"), 3023);
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_arithmetic_promotion() {
    let parameters = [
        ParameterDeclaration::new("x", Type::INT32),
        ParameterDeclaration::new("y", Type::DOUBLE),
    ];
    let typed = check_with(&parameters, "x + y").unwrap();
    assert_eq!(typed.ty, Type::DOUBLE);
    match typed.kind {
        ExprKind::Binary { operator, left, .. } => {
            assert_eq!(operator, BinaryOperator::Add);
            assert!(matches!(left.kind, ExprKind::Convert { .. }));
        }
        other => panic!("expected a binary node, got {:?}", other),
    }
    assert_eq!(check_with(&parameters, "x + 1").unwrap().ty, Type::INT32);
    assert_eq!(check_with(&parameters, "x % 2 * y").unwrap().ty, Type::DOUBLE);
}

#[test]
fn test_small_integral_arithmetic_promotes_to_int32() {
    let parameters = [ParameterDeclaration::new("b", Type::Primitive(PrimitiveType::Byte))];
    assert_eq!(check_with(&parameters, "b + b").unwrap().ty, Type::INT32);
    assert_eq!(check_with(&parameters, "-b").unwrap().ty, Type::INT32);
}

#[test]
fn test_string_concatenation() {
    let typed = check("Name + 1");
    assert_eq!(typed.ty, Type::STRING);
    assert!(matches!(typed.kind, ExprKind::Binary { operator: BinaryOperator::Concat, .. }));

    let options = ParserOptions::default().with_string_concatenation(false);
    let err = check_full(
        &[ParameterDeclaration::unnamed(person_type())],
        "Name + 1",
        &options,
        &RecordCache::new(),
    )
    .unwrap_err();
    assert_eq!(err.code(), 3008);
}

#[test]
fn test_comparisons() {
    assert_eq!(type_of("Age > 18"), "Boolean");
    assert_eq!(type_of("Name < \"m\""), "Boolean");
    assert_eq!(type_of("Score >= 1"), "Boolean");
    assert_eq!(error_code("Name > 1"), 3008);
}

#[test]
fn test_equality_with_null() {
    assert_eq!(type_of("Score == null"), "Boolean");
    assert_eq!(type_of("Name != null"), "Boolean");
    assert_eq!(type_of("Age == null"), "Boolean");
    assert_eq!(error_code("Name == 1"), 3008);
}

#[test]
fn test_logical_operators() {
    assert_eq!(type_of("Age > 1 && Name == null"), "Boolean");
    assert_eq!(type_of("Age > 1 or not (Age < 5)"), "Boolean");
    let err = check_error("Age && true");
    assert_eq!(err.code(), 3008);
    assert_eq!(err.message(), "Operator '&&' incompatible with operand types 'Int32' and 'Boolean'.");
}

#[test]
fn test_unary_operators() {
    assert_eq!(type_of("-Age"), "Int32");
    assert_eq!(type_of("!(Age > 1)"), "Boolean");
    assert_eq!(error_code("!Age"), 3009);
    assert_eq!(error_code("-Name"), 3009);
}

#[test]
fn test_conditional() {
    assert_eq!(type_of("Age > 1 ? 1 : 2.5"), "Double");
    assert_eq!(type_of("Age > 1 ? Name : null"), "String");
    assert_eq!(type_of("Age > 1 ? 1 : null"), "Int32?");
    assert_eq!(error_code("Age ? 1 : 2"), 3010);
    assert_eq!(error_code("Age > 1 ? 1 : \"x\""), 3011);
}

#[test]
fn test_iif() {
    let typed = check("iif(Age > 1, \"a\", \"b\")");
    assert_eq!(typed.ty, Type::STRING);
    assert!(matches!(typed.kind, ExprKind::Conditional { .. }));
    assert_eq!(error_code("iif(true, 1)"), 3022);
}

#[test]
fn test_coalesce() {
    assert_eq!(type_of("Nickname ?? \"none\""), "String");
    assert_eq!(type_of("Score ?? 0"), "Double");
    assert_eq!(type_of("Score ?? null"), "Double?");
    assert_eq!(type_of("null ?? 1"), "Int32");
    assert_eq!(error_code("Age ?? 1"), 3017);
    assert_eq!(error_code("Nickname ?? 1"), 3008);
}

#[test]
fn test_membership() {
    assert_eq!(type_of("Age in (1, 2, 3)"), "Boolean");
    assert_eq!(type_of("Name in (\"a\", \"b\")"), "Boolean");
    assert_eq!(type_of("\"x\" in Tags"), "Boolean");
    assert_eq!(error_code("Age in (\"a\")"), 3008);
    assert_eq!(error_code("1 in Tags"), 3008);
    assert_eq!(error_code("1 in Age"), 3008);
}

// ============================================================================
// Aggregates
// ============================================================================

#[test]
fn test_aggregate_result_types() {
    assert_eq!(type_of("Orders.Any()"), "Boolean");
    assert_eq!(type_of("Orders.Any(Total > 100)"), "Boolean");
    assert_eq!(type_of("Orders.All(it.Quantity > 1)"), "Boolean");
    assert_eq!(type_of("Orders.Count(Quantity > 1)"), "Int32");
    assert_eq!(type_of("Orders.Sum(Quantity)"), "Int32");
    assert_eq!(type_of("Orders.Sum(Total)"), "Decimal");
    assert_eq!(type_of("Orders.Average(Quantity)"), "Double");
    assert_eq!(type_of("Orders.Max(Total)"), "Decimal");
    assert_eq!(type_of("Orders.First()"), "Order");
    assert_eq!(type_of("Orders.Take(2)"), "Sequence<Order>");
    assert_eq!(type_of("Tags.Contains(\"x\")"), "Boolean");
    assert_eq!(type_of("Orders.Where(Total > 1).Select(Quantity)"), "Sequence<Int32>");
}

#[test]
fn test_aggregate_node_shape() {
    match check("Orders.Any(Total > 100)").kind {
        ExprKind::Aggregate { aggregate, argument, .. } => {
            assert_eq!(aggregate, Aggregate::Any);
            assert!(argument.is_some());
        }
        other => panic!("expected an aggregate, got {:?}", other),
    }
}

#[test]
fn test_aggregate_errors() {
    assert_eq!(error_code("Orders.Any(Quantity)"), 3010);
    assert_eq!(error_code("Orders.Take()"), 3007);
    assert_eq!(error_code("Orders.Sum(it)"), 3007);
    assert_eq!(error_code("Orders.Foo()"), 3005);
}

#[test]
fn test_inner_it_shadows_outer() {
    // `Age` is looked up on the order, not the person.
    assert_eq!(error_code("Orders.Any(Quantity > Age)"), 3004);

    let parameters = [ParameterDeclaration::new("p", person_type())];
    let typed = check_with(&parameters, "p.Orders.Any(Quantity > p.Age)").unwrap();
    assert_eq!(typed.ty, Type::BOOLEAN);
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_object_synthesizes_record() {
    let records = RecordCache::new();
    let parameters = [ParameterDeclaration::unnamed(person_type())];
    let options = ParserOptions::default();
    let first = check_full(&parameters, "new (Name, Age as Years)", &options, &records).unwrap();
    let Type::Record(record) = &first.ty else {
        panic!("expected a record, got {}", first.ty);
    };
    let names: Vec<&str> = record.properties().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Name", "Years"]);
    assert_eq!(record.properties()[1].ty, Type::INT32);

    let second = check_full(&parameters, "new {Name: Nickname, Years: Age + 1}", &options, &records).unwrap();
    assert_eq!(first.ty, second.ty);
    assert_eq!(records.len(), 1);
}

#[test]
fn test_new_object_null_property_is_object() {
    let typed = check("new (null as X)");
    let Type::Record(record) = &typed.ty else {
        panic!("expected a record, got {}", typed.ty);
    };
    assert_eq!(record.properties()[0].ty, Type::OBJECT);
}

#[test]
fn test_new_object_duplicate_property() {
    let err = check_error("new (Name, Name)");
    assert_eq!(err.category(), DiagnosticCategory::RecordSynthesis);
    assert_eq!(err.code(), 4002);
    assert_eq!(err.span().start, 0);
}

#[test]
fn test_new_array_element_types() {
    assert_eq!(type_of("new[] {1, 2.5}"), "Double[]");
    assert_eq!(type_of("new[] {}"), "Object[]");
    assert_eq!(type_of("new[] {\"a\", null}"), "String[]");
    assert_eq!(type_of("new Int64[] {1, 2}"), "Int64[]");
    assert_eq!(type_of("new Byte[] {1, 2}"), "Byte[]");
    assert_eq!(error_code("new[] {1, \"a\"}"), 3020);
    assert_eq!(error_code("new Int32[] {\"a\"}"), 3013);
    assert_eq!(error_code("new Byte[] {300}"), 3013);
}

// ============================================================================
// Delegates
// ============================================================================

#[test]
fn test_delegate_parameter_invocation() {
    let square = Type::delegate(DelegateSignature::anonymous(
        vec![ParameterDeclaration::unnamed(Type::INT32)],
        Type::INT32,
    ));
    let parameters = [
        ParameterDeclaration::new("f", square),
        ParameterDeclaration::new("x", Type::INT32),
    ];
    let typed = check_with(&parameters, "f(x) + 1").unwrap();
    assert_eq!(typed.ty, Type::INT32);

    let err = check_with(&parameters, "f()").unwrap_err();
    assert_eq!(err.code(), 3018);
    assert_eq!(err.message(), "Delegate 'Func<Int32, Int32>' expects 1 arguments but 0 were supplied.");
    assert_eq!(check_with(&parameters, "f(\"a\")").unwrap_err().code(), 3013);
}

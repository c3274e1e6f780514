use bumpalo::Bump;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dynex_binder::SymbolTable;
use dynex_options::ParserOptions;
use dynex_parser::{split_ordering_clauses, Parser};

// A filter of the size typically typed into a query box.
const FILTER_EXPRESSION: &str = r#"(Customer.Country == "Norway" || Customer.Country = "Sweden")
    && Orders.Any(Total > 1000.50m and Lines.Count() >= 3)
    && !(Status in ("Cancelled", "Returned", "Lost"))
    && iif((Discount ?? 0) > 0, Price * (1 - Discount), Price) < 250
    && Name.StartsWith('A'.ToString())"#;

const PROJECTION_EXPRESSION: &str =
    "new {it.Id, Customer.Name as CustomerName, Total: Lines.Sum(Quantity * Price), Tags: new[] {\"a\", \"b\"}}";

const ORDERING: &str = "(Inner == null || Inner.Name == null ? String(null) : String(Inner.Name)) asc, Value desc, Id";

fn bench_parse_expressions(c: &mut Criterion) {
    let symbols = SymbolTable::new(&[]).unwrap();
    let options = ParserOptions::default();

    c.bench_function("parse_filter", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let parser = Parser::new(&arena, black_box(FILTER_EXPRESSION), &symbols, &options);
            black_box(parser.parse_expression().unwrap().node_count());
        });
    });

    c.bench_function("parse_projection", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let parser = Parser::new(&arena, black_box(PROJECTION_EXPRESSION), &symbols, &options);
            black_box(parser.parse_expression().unwrap().node_count());
        });
    });

    c.bench_function("split_ordering", |b| {
        b.iter(|| black_box(split_ordering_clauses(black_box(ORDERING)).unwrap()));
    });
}

criterion_group!(benches, bench_parse_expressions);
criterion_main!(benches);

//! Placeholder numbering, argument order and render-level edge cases.

mod common;
use common::*;

use std::collections::HashMap;

use sqlforge_core::psql::{self, arg, args, named, placeholder, quote, raw_args, sm, vm};
use sqlforge_core::value::bind;
use sqlforge_core::{Context, GenericDialect, Mod, RenderError, Statement, Value, ValuesQuery};

fn filtered(table: &str, column: &str, value: i64) -> sqlforge_core::SelectQuery {
    psql::select([
        sm::columns([quote([column])]),
        sm::from(quote([table])).into(),
        sm::where_(quote([column]).eq(arg(value))),
    ])
}

#[test]
fn start_offsets_every_placeholder() {
    let q = filtered("t", "a", 1);
    let (sql, args) = q.build_with(&Context::new(), &sqlforge_core::Postgres, 7).unwrap();
    assert!(sql.ends_with("(\"a\" = $8)"), "{sql}");
    assert_eq!(args, vec![Value::Int(1)]);
}

#[test]
fn nested_subqueries_continue_numbering() {
    let q = psql::select([
        sm::from(quote(["outer"])).into(),
        sm::where_(quote(["x"]).eq(arg(1))),
        sm::where_(quote(["a"]).in_list([filtered("t1", "a", 2)])),
        sm::where_(quote(["b"]).not_in_list([filtered("t2", "b", 3)])),
        sm::limit(arg(4)),
    ]);
    let (sql, args) = build(&q);
    for n in 1..=4 {
        assert_eq!(sql.matches(&format!("${n}")).count(), 1, "${n} in {sql}");
    }
    assert_eq!(
        args,
        vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
    );
}

#[test]
fn raw_fragments_share_the_stream() {
    let q = psql::select([
        sm::columns([raw_args("coalesce(?, ?)", [Value::Int(1), Value::Int(2)])]),
        sm::where_(quote(["id"]).in_list([args([3, 4])])),
    ]);
    let args = assert_sql(&q, r#"SELECT coalesce($1, $2) WHERE ("id" IN ($3, $4))"#);
    assert_eq!(args.len(), 4);
}

#[test]
fn raw_placeholder_count_must_match() {
    let q = psql::select([sm::columns([raw_args("f(?, ?)", [Value::Int(1)])])]);
    let err = build_err(&q);
    assert!(matches!(
        err.root(),
        RenderError::RawPlaceholderMismatch { placeholders: 2, args: 1 }
    ));
}

#[test]
fn empty_in_list_is_constant() {
    let none: [i64; 0] = [];
    let q = psql::select([
        sm::where_(quote(["a"]).in_list(none.map(arg))),
        sm::where_(quote(["b"]).not_in_list(none.map(arg))),
    ]);
    let args = assert_sql(&q, "SELECT * WHERE FALSE AND TRUE");
    assert!(args.is_empty());
}

#[test]
fn values_query_requires_rows() {
    let err = build_err(&psql::values(Vec::<Mod<ValuesQuery>>::new()));
    assert!(matches!(err, RenderError::EmptyValues));

    let q = psql::values([
        vm::value_row([arg(1), arg("one")]),
        vm::value_row([arg(2), arg("two")]),
        vm::limit(arg(1)),
    ]);
    let args = assert_sql(&q, "VALUES ($1, $2), ($3, $4) LIMIT $5");
    assert_eq!(args.len(), 5);
}

#[test]
fn named_args_resolve_per_occurrence() {
    let q = psql::select([
        sm::where_(quote(["a"]).eq(named("v"))),
        sm::where_(quote(["b"]).eq(named("v"))),
    ]);
    let ctx = Context::new().with_named_args(HashMap::from([(String::from("v"), Value::Int(9))]));
    let (sql, args) = build_in(&ctx, &q);
    assert_eq!(clean(&sql), r#"SELECT * WHERE ("a" = $1) AND ("b" = $2)"#);
    assert_eq!(args, vec![Value::Int(9), Value::Int(9)]);

    assert!(matches!(build_err(&q), RenderError::MissingNamedArg(n) if n == "v"));
}

#[test]
fn placeholders_bind_after_render() {
    let q = psql::select([sm::limit(placeholder("limit")), sm::offset(arg(10))]);
    let (_, args) = build(&q);
    assert_eq!(args[0], Value::Unbound("limit".into()));

    let bound = bind(args, &HashMap::from([(String::from("limit"), Value::Int(5))])).unwrap();
    assert_eq!(bound, vec![Value::Int(5), Value::Int(10)]);
}

#[test]
fn generic_dialect_uses_question_marks_and_rejects_returning() {
    let q = filtered("t", "a", 1);
    let (sql, _) = q.build_with(&Context::new(), &GenericDialect, 0).unwrap();
    assert!(sql.ends_with("(\"a\" = ?)"), "{sql}");

    let del = psql::delete([
        psql::dm::from(quote(["t"])),
        psql::dm::returning([quote(["id"])]),
    ]);
    let err = del.build_with(&Context::new(), &GenericDialect, 0).unwrap_err();
    assert!(matches!(err.root(), RenderError::DialectMismatch { .. }), "{err}");
}

#[test]
fn fetch_with_ties_after_offset() {
    let q = psql::select([
        sm::from(quote(["scores"])).into(),
        sm::order_by(quote(["points"])).desc().into(),
        sm::offset(arg(10)),
        sm::fetch(3, true),
    ]);
    assert_sql(
        &q,
        r#"SELECT * FROM "scores" ORDER BY "points" DESC OFFSET $1 FETCH NEXT 3 ROWS WITH TIES"#,
    );
}

#[test]
fn renders_are_byte_stable() {
    let q = filtered("t", "a", 1);
    assert_eq!(build(&q), build(&q));
}

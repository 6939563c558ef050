//! End-to-end rendering of complete statements.

mod common;
use common::*;

use sqlforge_core::expr::OrderDef;
use sqlforge_core::psql::{
    self, arg, binary, concat, dm, f, group, im, mm, quote, raw, s, sm, um, WindowDef,
};
use sqlforge_core::{Context, Expr, Statement, Value};

// ===================================================================
// DELETE
// ===================================================================

#[test]
fn delete_with_filter() {
    let q = psql::delete([
        dm::from(quote(["films"])),
        dm::where_(quote(["kind"]).ne(arg("Musical"))),
    ]);
    let args = assert_sql(&q, r#"DELETE FROM "films" WHERE ("kind" <> $1)"#);
    assert_eq!(args, vec![Value::Text("Musical".into())]);
}

#[test]
fn delete_using_and_returning() {
    let q = psql::delete([
        dm::from(quote(["films"])),
        dm::using(quote(["producers"])).into(),
        dm::where_(quote(["producer_id"]).eq(quote(["producers", "id"]))),
        dm::where_(quote(["producers", "name"]).eq(arg("foo"))),
        dm::returning([raw("*")]),
    ]);
    assert_sql(
        &q,
        r#"DELETE FROM "films"
           USING "producers"
           WHERE ("producer_id" = "producers"."id") AND ("producers"."name" = $1)
           RETURNING *"#,
    );
}

// ===================================================================
// INSERT
// ===================================================================

#[test]
fn upsert_with_returning() {
    let q = psql::insert([
        im::into(quote(["distributors"]), ["did", "dname"]),
        im::values([arg(5), arg("Gizmo Transglobal")]),
        im::values([arg(6), arg("Associated Computing, Inc")]),
        im::on_conflict([quote(["did"])])
            .do_update()
            .set_excluded(["dname"])
            .into(),
        im::returning([quote(["did"])]),
    ]);
    let args = assert_sql(
        &q,
        r#"INSERT INTO "distributors" ("did", "dname")
           VALUES ($1, $2), ($3, $4)
           ON CONFLICT ("did") DO UPDATE SET
           "dname" = EXCLUDED."dname"
           RETURNING "did""#,
    );
    assert_eq!(args.len(), 4);
    assert_eq!(args[2], Value::Int(6));
}

#[test]
fn upsert_with_aliased_target_and_filtered_update() {
    let q = psql::insert([
        im::into_as(raw("distributors"), "d", ["did", "dname"]),
        im::values([arg(8), arg("Anvil Distribution")]),
        im::values([arg(9), arg("Sentry Distribution")]),
        im::on_conflict([raw("did")])
            .do_update()
            .set([binary(
                raw("dname"),
                "=",
                concat([raw("EXCLUDED.dname"), s(" (formerly "), raw("d.dname"), s(")")]),
            )])
            .where_(binary(raw("d.zipcode"), "<>", s("21201")))
            .into(),
    ]);
    let args = assert_sql(
        &q,
        r#"INSERT INTO distributors AS "d" ("did", "dname")
           VALUES ($1, $2), ($3, $4)
           ON CONFLICT (did) DO UPDATE
           SET dname = EXCLUDED.dname || ' (formerly ' || d.dname || ')'
           WHERE d.zipcode <> '21201'"#,
    );
    assert_eq!(
        args,
        vec![
            Value::Int(8),
            Value::Text("Anvil Distribution".into()),
            Value::Int(9),
            Value::Text("Sentry Distribution".into()),
        ]
    );
}

#[test]
fn chained_arithmetic_keeps_its_grouping() {
    let q = psql::select([
        sm::columns([quote(["a"]).minus(quote(["b"]).minus(quote(["c"])))]),
        sm::from(quote(["t"])).into(),
        sm::where_(quote(["a"]).plus(quote(["b"])).times(arg(2)).gt(arg(10))),
    ]);
    let args = assert_sql(
        &q,
        r#"SELECT ("a" - ("b" - "c")) FROM "t" WHERE ((("a" + "b") * $1) > $2)"#,
    );
    assert_eq!(args, vec![Value::Int(2), Value::Int(10)]);
}

#[test]
fn insert_on_constraint_do_nothing() {
    let q = psql::insert([
        im::into(quote(["distributors"]), ["did", "dname"]),
        im::values([arg(9), arg("Antwerp Design")]),
        im::on_conflict_on_constraint("distributors_pkey").do_nothing(),
    ]);
    assert_sql(
        &q,
        r#"INSERT INTO "distributors" ("did", "dname")
           VALUES ($1, $2)
           ON CONFLICT ON CONSTRAINT distributors_pkey DO NOTHING"#,
    );
}

#[test]
fn insert_from_select_with_default_values_fallback() {
    let select = psql::select([
        sm::columns([quote(["id"]), quote(["name"])]),
        sm::from(quote(["staging"])).into(),
    ]);
    let q = psql::insert([im::into(quote(["users"]), ["id", "name"]), im::query(select)]);
    assert_sql(
        &q,
        r#"INSERT INTO "users" ("id", "name")
           SELECT "id", "name" FROM "staging""#,
    );

    let q = psql::insert([im::into(quote(["counters"]), Vec::<String>::new())]);
    assert_sql(&q, r#"INSERT INTO "counters" DEFAULT VALUES"#);
}

// ===================================================================
// UPDATE
// ===================================================================

#[test]
fn update_with_from_and_row_assignment() {
    let q = psql::update([
        um::table_as(quote(["employees"]), "e"),
        um::set([
            um::set_col("sales_count").to(quote(["sales_count"]).plus(raw("1"))),
            um::set_cols(["a", "b"]).to_row([arg(1), raw("DEFAULT")]),
        ]),
        um::from(quote(["accounts"])).into(),
        um::where_(quote(["accounts", "name"]).eq(arg("Acme"))),
        um::returning([quote(["e", "id"])]),
    ]);
    let args = assert_sql(
        &q,
        r#"UPDATE "employees" AS "e" SET
           "sales_count" = ("sales_count" + 1),
           ("a", "b") = ROW ($1, DEFAULT)
           FROM "accounts"
           WHERE ("accounts"."name" = $2)
           RETURNING "e"."id""#,
    );
    assert_eq!(args, vec![Value::Int(1), Value::Text("Acme".into())]);
}

#[test]
fn update_without_assignments_fails_with_path() {
    let q = psql::update([um::table(quote(["t"]))]);
    let err = build_err(&q);
    assert_eq!(err.to_string(), "set: SET requires at least one assignment");
}

// ===================================================================
// WITH + MERGE
// ===================================================================

#[test]
fn recursive_cte_feeding_merge() {
    let recent = psql::select([
        sm::columns([quote(["id"]), quote(["qty"])]),
        sm::from(quote(["deliveries"])).into(),
        sm::where_(quote(["day"]).gt(arg("2024-01-01"))),
    ]);
    let q = psql::merge([
        mm::recursive(true),
        mm::with("recent").as_(recent).into(),
        mm::into_as(quote(["inventory"]), "t"),
        mm::using(quote(["recent"]))
            .as_("s")
            .on_eq(quote(["t", "id"]), quote(["s", "id"])),
        mm::when_matched([
            mm::and(quote(["s", "qty"]).gt(arg(0))),
            mm::then_update([
                mm::set_col("qty").to(quote(["t", "qty"]).plus(quote(["s", "qty"])))
            ]),
        ]),
        mm::when_not_matched([mm::then_insert([
            mm::columns(["id", "qty"]),
            mm::values([quote(["s", "id"]), quote(["s", "qty"])]),
        ])]),
    ]);
    let args = assert_sql(
        &q,
        r#"WITH RECURSIVE
           recent AS (SELECT "id", "qty" FROM "deliveries" WHERE ("day" > $1))
           MERGE INTO "inventory" AS "t"
           USING "recent" AS "s" ON ("t"."id" = "s"."id")
           WHEN MATCHED AND ("s"."qty" > $2) THEN UPDATE SET "qty" = ("t"."qty" + "s"."qty")
           WHEN NOT MATCHED THEN INSERT ("id", "qty") VALUES ("s"."id", "s"."qty")"#,
    );
    assert_eq!(args.len(), 2);
}

#[test]
fn merge_returning_follows_server_version() {
    let base = || {
        psql::merge([
            mm::into(quote(["t"])),
            mm::using(quote(["s"])).on_eq(quote(["t", "id"]), quote(["s", "id"])),
            mm::when_matched([mm::then_delete()]),
        ])
    };

    let gated = base().apply([mm::returning_if_supported([raw("*")])]);
    let (v17, _) = build_in(&Context::new().with_server_version(17), &gated);
    assert!(clean(&v17).ends_with("THEN DELETE RETURNING *"), "{v17}");

    let (v16, _) = build_in(&Context::new().with_server_version(16), &gated);
    assert!(!v16.contains("RETURNING"), "{v16}");

    let (unknown, _) = build(&gated);
    assert!(!unknown.contains("RETURNING"), "{unknown}");

    let explicit = base().apply([mm::returning([raw("*")])]);
    let (v16, _) = build_in(&Context::new().with_server_version(16), &explicit);
    assert!(v16.ends_with("\nRETURNING *"), "{v16}");
}

#[test]
fn merge_render_is_stable_across_contexts() {
    let q = psql::merge([
        mm::into(quote(["t"])),
        mm::using(quote(["s"])).on(raw("TRUE")),
        mm::when_not_matched_by_source([mm::then_do_nothing()]),
        mm::returning_if_supported([raw("*")]),
    ]);
    let ctx = Context::new().with_server_version(170_004);
    let first = build_in(&ctx, &q);
    let second = build_in(&ctx, &q);
    assert_eq!(first, second);
    assert_eq!(clean(&first.0).matches("RETURNING").count(), 1);
}

// ===================================================================
// SELECT
// ===================================================================

#[test]
fn window_function_in_subquery() {
    let row_number = Expr::from(
        f("row_number", std::iter::empty::<Expr>()).over(
            WindowDef::new()
                .partition_by([quote(["dept"])])
                .order_by(OrderDef::new(quote(["salary"])).desc()),
        ),
    )
    .as_("rn");

    let inner = psql::select([
        sm::columns([quote(["id"]), row_number]),
        sm::from(quote(["employees"])).into(),
        sm::where_(quote(["active"]).eq(arg(true))),
    ]);
    let q = psql::select([
        sm::from(group([inner])).as_("ranked").into(),
        sm::where_(quote(["rn"]).lte(arg(3))),
    ]);
    let args = assert_sql(
        &q,
        r#"SELECT * FROM (SELECT "id", row_number() OVER (PARTITION BY "dept" ORDER BY "salary" DESC) AS "rn"
           FROM "employees" WHERE ("active" = $1)) AS "ranked"
           WHERE ("rn" <= $2)"#,
    );
    assert_eq!(args, vec![Value::Bool(true), Value::Int(3)]);
}

#[test]
fn select_with_joins_grouping_and_paging() {
    let q = psql::select([
        sm::columns([quote(["u", "name"]), raw("count(*)")]),
        sm::from(quote(["users"])).as_("u").into(),
        sm::left_join(quote(["orders"]))
            .as_("o")
            .on_eq(quote(["o", "user_id"]), quote(["u", "id"]))
            .into(),
        sm::group_by(quote(["u", "name"])),
        sm::having(raw("count(*)").gt(arg(10))),
        sm::order_by(raw("2")).desc().nulls_last().into(),
        sm::limit(arg(20)),
        sm::offset(arg(40)),
    ]);
    let args = assert_sql(
        &q,
        r#"SELECT "u"."name", count(*)
           FROM "users" AS "u"
           LEFT JOIN "orders" AS "o" ON ("o"."user_id" = "u"."id")
           GROUP BY "u"."name"
           HAVING (count(*) > $1)
           ORDER BY 2 DESC NULLS LAST
           LIMIT $2
           OFFSET $3"#,
    );
    assert_eq!(args.len(), 3);
}

#[test]
fn locking_select() {
    let q = psql::select([
        sm::from(quote(["jobs"])).into(),
        sm::where_(quote(["state"]).eq(arg("queued"))),
        sm::limit(raw("1")),
        sm::for_update(Vec::<String>::new()).skip_locked().into(),
    ]);
    assert_sql(
        &q,
        r#"SELECT * FROM "jobs" WHERE ("state" = $1) LIMIT 1 FOR UPDATE SKIP LOCKED"#,
    );
}

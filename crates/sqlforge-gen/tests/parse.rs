//! Parsing annotated statements without a database.

mod common;
use common::*;

use sqlforge_core::QueryType;
use sqlforge_gen::GenError;

#[tokio::test]
async fn left_join_makes_right_side_nullable() {
    let q = parse(
        "-- GetPostAuthors\nSELECT p.id, u.name FROM posts p LEFT JOIN users u ON u.id = p.author_id WHERE p.id = $1",
        &["int4"],
        &["int4", "text"],
    )
    .await;

    assert_eq!(q.name, "GetPostAuthors");
    assert_eq!(q.kind, QueryType::Select);
    assert_eq!(
        q.sql,
        "SELECT p.id, u.name FROM posts p LEFT JOIN users u ON u.id = p.author_id WHERE p.id = $1"
    );
    assert_eq!(column_names(&q), ["id", "name"]);
    assert_eq!(q.columns[0].nullable, Some(false));
    assert_eq!(q.columns[1].nullable, Some(true));
    assert_eq!(q.columns[0].type_name, "i32");
    assert_eq!(q.columns[1].type_name, "String");

    assert_eq!(arg_names(&q), ["id"]);
    assert_eq!(q.args[0].col.type_name, "i32");
    assert_eq!(q.args[0].col.nullable, Some(false));
}

#[tokio::test]
async fn star_expands_with_prefix() {
    let q = parse(
        "-- ListAuthors\nSELECT\n  -- prefix:author_\n  *\nFROM users",
        &[],
        &["int4", "text", "text"],
    )
    .await;

    assert_eq!(column_names(&q), ["author_id", "author_name", "author_email"]);
    let nullable: Vec<_> = q.columns.iter().map(|c| c.nullable).collect();
    assert_eq!(nullable, [Some(false), Some(false), Some(true)]);
    assert!(q.sql.contains(
        r#""users"."id" AS "author_id", "users"."name" AS "author_name", "users"."email" AS "author_email""#
    ));
    assert!(!q.sql.contains("prefix"));
    assert!(!q.sql.contains('*'));
    assert!(q.sql.ends_with("\nFROM users"));
}

#[tokio::test]
async fn configured_star_is_rejected() {
    let err = parse_err("-- Q\nSELECT * /* row:Row */ FROM users", &[], &["int4", "text", "text"]).await;
    assert!(matches!(err, GenError::StarAfterPrefixed), "got {err}");
}

#[tokio::test]
async fn column_annotations_override_inferred_values() {
    let q = parse(
        "-- GetUser\nSELECT id /* user_id:i64 */, email /* ::notnull */ FROM users",
        &[],
        &["int4", "text"],
    )
    .await;

    assert_eq!(column_names(&q), ["user_id", "email"]);
    assert_eq!(q.columns[0].db_name, "id");
    assert_eq!(q.columns[0].type_name, "i64");
    assert_eq!(q.columns[1].nullable, Some(false));
    assert_eq!(q.sql, "SELECT id , email  FROM users");
}

#[tokio::test]
async fn placeholders_are_renumbered_in_text_order() {
    let q = parse(
        "-- FindUser\nSELECT id FROM users WHERE id = $2 OR name = $1",
        &["text", "int4"],
        &["int4"],
    )
    .await;

    assert_eq!(q.sql, "SELECT id FROM users WHERE id = $1 OR name = $2");
    assert_eq!(arg_names(&q), ["id", "name"]);
    assert_eq!(q.args[0].col.type_name, "i32");
    assert_eq!(q.args[1].col.type_name, "String");
}

#[tokio::test]
async fn repeated_placeholder_keeps_every_position() {
    let q = parse(
        "-- Search\nSELECT id FROM users WHERE ($1 IS NULL OR name = $1)",
        &["text"],
        &["int4"],
    )
    .await;

    assert_eq!(q.args.len(), 1);
    let arg = &q.args[0];
    assert_eq!(arg.col.name, "name");
    assert_eq!(arg.col.nullable, Some(true));
    assert_eq!(arg.positions.len(), 2);
    assert_eq!(q.sql, "SELECT id FROM users WHERE ($1 IS NULL OR name = $2)");
}

#[tokio::test]
async fn in_list_becomes_a_group() {
    let q = parse(
        "-- UsersByIds\nSELECT name FROM users WHERE id IN ($1, $2)",
        &["int4", "int4"],
        &["text"],
    )
    .await;

    assert_eq!(q.args.len(), 1);
    let group = &q.args[0];
    assert!(group.col.name.starts_with("group"), "got {}", group.col.name);
    assert!(!group.can_be_multiple);
    let (start, end) = group.positions[0];
    assert_eq!(&q.sql[start..end], "($1, $2)");

    let children: Vec<_> = group.children.iter().map(|c| c.col.name.as_str()).collect();
    assert_eq!(children, ["id", "id_2"]);
}

#[tokio::test]
async fn single_item_in_list_can_be_multiple() {
    let q = parse(
        "-- UsersByIds\nSELECT name FROM users WHERE id IN ($1)",
        &["int4"],
        &["text"],
    )
    .await;

    assert_eq!(arg_names(&q), ["id"]);
    assert!(q.args[0].can_be_multiple);
    assert!(q.args[0].children.is_empty());
}

#[tokio::test]
async fn insert_values_are_named_after_columns() {
    let q = parse(
        "-- CreateUser\nINSERT INTO users (id, email) VALUES ($1, $2)",
        &["int4", "text"],
        &[],
    )
    .await;

    assert_eq!(q.kind, QueryType::Insert);
    assert!(q.columns.is_empty());
    assert_eq!(q.args.len(), 1);

    let row = &q.args[0];
    assert!(row.can_be_multiple);
    let children: Vec<_> = row.children.iter().map(|c| c.col.name.as_str()).collect();
    assert_eq!(children, ["id", "email"]);
    assert_eq!(row.children[0].col.nullable, Some(false));
    assert_eq!(row.children[1].col.nullable, Some(true));

    assert!(q.mods.contains("q.SetTable(EXPR.subExpr("));
    assert!(q.mods.contains("q.AppendColumns(EXPR.subExpr("));
    assert!(q.mods.contains("q.AppendValues(EXPR.subExpr("));
}

#[tokio::test]
async fn cte_columns_keep_their_nullability() {
    let q = parse(
        "-- RecentTitles\nWITH recent AS (SELECT id, title FROM posts) SELECT r.title FROM recent r",
        &[],
        &["text"],
    )
    .await;

    assert_eq!(column_names(&q), ["title"]);
    assert_eq!(q.columns[0].nullable, Some(true));
    assert!(q.mods.starts_with("q.AppendCTE(EXPR.subExpr("));
    assert!(q.mods.contains("q.AppendSelect(EXPR.subExpr("));
}

#[tokio::test]
async fn select_mods_slice_the_rewritten_sql() {
    let q = parse(
        "-- GetPostAuthors\nSELECT p.id, u.name FROM posts p LEFT JOIN users u ON u.id = p.author_id WHERE p.id = $1",
        &["int4"],
        &["int4", "text"],
    )
    .await;

    let select = "q.AppendSelect(EXPR.subExpr(7, 19))\n";
    assert!(q.mods.starts_with(select), "got {}", q.mods);
    assert_eq!(&q.sql[7..19], "p.id, u.name");

    let table = q.mods.find("q.SetTable(").unwrap();
    let filter = q.mods.find("q.AppendWhere(").unwrap();
    assert!(table < filter);
}

#[tokio::test]
async fn limits_and_locks_are_copied_verbatim() {
    let q = parse(
        "-- Page\nSELECT id FROM users ORDER BY id LIMIT 10 OFFSET 5 FOR UPDATE SKIP LOCKED",
        &[],
        &["int4"],
    )
    .await;

    assert!(q.mods.contains("q.SetLimit(psql::raw(\"10\"))\n"));
    assert!(q.mods.contains("q.SetOffset(psql::raw(\"5\"))\n"));
    assert!(q.mods.contains("q.AppendOrder(EXPR.subExpr("));
    assert!(q
        .mods
        .contains("q.AppendLock(Lock::new(LockStrength::Update).skip_locked())\n"));
    assert!(q.imports.contains(&"sqlforge_core::psql".to_string()));
    assert!(q.imports.contains(&"sqlforge_core::clause".to_string()));
}

#[tokio::test]
async fn with_ties_after_offset_is_unsupported() {
    let err = parse_err(
        "-- Top\nSELECT id FROM users ORDER BY id FETCH FIRST 3 ROWS WITH TIES OFFSET 5",
        &[],
        &["int4"],
    )
    .await;
    assert!(err.to_string().contains("WITH TIES"), "got {err}");

    let q = parse(
        "-- Top\nSELECT id FROM users ORDER BY id OFFSET 5 FETCH FIRST 3 ROWS WITH TIES",
        &[],
        &["int4"],
    )
    .await;
    assert!(q.mods.contains("q.SetFetch(psql::raw(\"3\"), true)\n"));
}

#[tokio::test]
async fn missing_name_comment_is_an_error() {
    let err = parse_err("SELECT id FROM users", &[], &["int4"]).await;
    assert!(matches!(err, GenError::MissingQueryComment(0)), "got {err}");
}

#[tokio::test]
async fn bare_values_is_unsupported() {
    let err = parse_err("-- Numbers\nVALUES (1), (2)", &[], &["int4"]).await;
    assert_eq!(err.to_string(), "VALUES statement is not supported");
}

#[tokio::test]
async fn multiple_from_tables_are_unsupported() {
    let err = parse_err("-- Q\nSELECT users.id FROM users, posts", &[], &["int4"]).await;
    assert!(err.to_string().contains("convert to a CROSS JOIN"), "got {err}");
}

#[tokio::test]
async fn update_with_multiple_from_tables_is_unsupported() {
    let err = parse_err(
        "-- Q\nUPDATE posts SET title = $1 FROM users, posts p2 WHERE posts.author_id = users.id",
        &["text"],
        &[],
    )
    .await;
    assert!(err.to_string().contains("multiple FROM tables"), "got {err}");
    assert!(err.to_string().contains("convert to a CROSS JOIN"), "got {err}");
}

#[tokio::test]
async fn delete_with_multiple_using_tables_is_unsupported() {
    let err = parse_err(
        "-- Q\nDELETE FROM posts USING users, posts p2 WHERE posts.author_id = users.id",
        &[],
        &[],
    )
    .await;
    assert!(err.to_string().contains("multiple USING tables"), "got {err}");
    assert!(err.to_string().contains("convert to a CROSS JOIN"), "got {err}");
}

#[tokio::test]
async fn update_with_one_from_table_is_accepted() {
    let q = parse(
        "-- Rename\nUPDATE posts SET title = $1 FROM users WHERE posts.author_id = users.id",
        &["text"],
        &[],
    )
    .await;
    assert_eq!(q.kind, QueryType::Update);
    assert!(q.mods.contains("q.SetFrom(EXPR.subExpr("), "got {}", q.mods);
}

#[tokio::test]
async fn coalesce_hides_a_nullable_column() {
    let q = parse(
        "-- Titles\nSELECT title, coalesce(title, 'untitled') AS shown FROM posts",
        &[],
        &["text", "text"],
    )
    .await;

    assert_eq!(column_names(&q), ["title", "shown"]);
    assert_eq!(q.columns[0].nullable, Some(true));
    assert_eq!(q.columns[1].nullable, Some(false));
}

#[tokio::test]
async fn coalesce_arguments_are_nullable() {
    let q = parse(
        "-- Filter\nSELECT id FROM users WHERE name = coalesce($1, name)",
        &["text"],
        &["int4"],
    )
    .await;

    assert_eq!(q.args.len(), 1);
    assert_eq!(q.args[0].col.nullable, Some(true));
}

#[tokio::test]
async fn null_tests_make_their_operand_nullable() {
    let q = parse(
        "-- Search\nSELECT id, email IS NULL AS missing FROM users WHERE $1 IS NULL OR id = $2",
        &["int4", "int4"],
        &["int4", "bool"],
    )
    .await;

    assert_eq!(column_names(&q), ["id", "missing"]);
    assert_eq!(q.columns[1].nullable, Some(false));

    assert_eq!(q.args.len(), 2);
    assert_eq!(q.args[0].col.nullable, Some(true));
    assert_eq!(q.args[1].col.name, "id");
    assert_eq!(q.args[1].col.nullable, Some(false));
}

#[tokio::test]
async fn upsert_keeps_the_conflict_clause_and_literals() {
    let q = parse(
        "-- UpsertDistributors\nINSERT INTO distributors AS d (did, dname) VALUES ($1, $2), ($3, $4)\n\
         ON CONFLICT (did) DO UPDATE SET dname = EXCLUDED.dname || ' (formerly ' || d.dname || ')'\n\
         WHERE d.zipcode <> '21201'",
        &["int4", "text", "int4", "text"],
        &[],
    )
    .await;

    assert_eq!(q.kind, QueryType::Insert);
    assert!(q
        .sql
        .starts_with("INSERT INTO distributors AS d (did, dname) VALUES ($1, $2), ($3, $4)"));
    assert!(q.sql.contains("' (formerly '"), "got {}", q.sql);
    assert!(q.sql.ends_with("WHERE d.zipcode <> '21201'"), "got {}", q.sql);

    assert_eq!(q.args.len(), 2);
    for row in &q.args {
        assert!(!row.can_be_multiple);
        let children: Vec<_> = row.children.iter().map(|c| c.col.name.as_str()).collect();
        assert_eq!(children, ["did", "dname"]);
        assert_eq!(row.children[0].col.nullable, Some(false));
    }

    assert!(q.mods.contains("q.SetTable(EXPR.subExpr("));
    assert!(q.mods.contains("q.SetConflict(EXPR.subExpr("));
    assert_eq!(q.mods.matches("q.AppendValues(").count(), 2);
}

#[tokio::test]
async fn set_operations_append_combines() {
    let q = parse(
        "-- Everyone\nSELECT id FROM users UNION ALL SELECT author_id FROM posts",
        &[],
        &["int4"],
    )
    .await;

    assert!(
        q.mods.contains("q.AppendCombine(\"UNION\", true, EXPR.subExpr("),
        "got {}",
        q.mods
    );
}

#[tokio::test]
async fn column_count_must_match_the_server() {
    let err = parse_err("-- Q\nSELECT id FROM users", &[], &["int4", "text"]).await;
    assert!(
        matches!(
            err,
            GenError::TypeCountMismatch {
                what: "columns",
                expected: 2,
                got: 1
            }
        ),
        "got {err}"
    );
}

#[tokio::test]
async fn query_config_comes_from_the_name_comment() {
    let q = parse(
        "-- GetUser User:Users:false\nSELECT id FROM users",
        &[],
        &["int4"],
    )
    .await;
    assert_eq!(q.name, "GetUser");
    assert_eq!(q.config.row_name, "User");
    assert_eq!(q.config.row_slice_name, "Users");
    assert!(!q.config.generate_row);
}

#[tokio::test]
async fn file_statements_keep_their_comments() {
    let p = parser();
    p.resolver().push(&["int4"], &["int4", "text"]);
    p.resolver().push(&["int4"], &[]);

    let queries = p
        .parse_queries(
            "-- GetUser\nSELECT id, name FROM users WHERE id = $1;\n\n-- DeleteUser\nDELETE FROM users WHERE id = $1;\n",
        )
        .await
        .unwrap();

    let names: Vec<_> = queries.iter().map(|q| q.name.as_str()).collect();
    assert_eq!(names, ["GetUser", "DeleteUser"]);
    assert_eq!(queries[1].kind, QueryType::Delete);
    assert_eq!(queries[1].sql, "DELETE FROM users WHERE id = $1");
    assert!(queries[1].mods.contains("q.AppendWhere(EXPR.subExpr("));
}

#[tokio::test]
async fn empty_file_has_no_statements() {
    let err = parser().parse_queries("-- nothing here\n").await.unwrap_err();
    assert!(matches!(err, GenError::NoStatements), "got {err}");
}

#[tokio::test]
async fn every_failed_statement_is_reported() {
    let p = parser();
    p.resolver().push(&[], &["int4"]);
    p.resolver().push(&[], &["int4"]);

    let err = p
        .parse_queries("SELECT id FROM users;\nSELECT name FROM users;")
        .await
        .unwrap_err();
    match err {
        GenError::Multiple(errors) => assert_eq!(errors.len(), 2),
        other => panic!("Expected multiple errors, got {other}"),
    }
}

#[tokio::test]
async fn folders_are_parsed_in_file_order() {
    let dir = std::env::temp_dir().join(format!("sqlforge-folder-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("b_posts.sql"), "-- CountPosts\nSELECT count(*) FROM posts;").unwrap();
    std::fs::write(dir.join("a_users.sql"), "-- ListUsers\nSELECT id FROM users;").unwrap();

    let p = parser().with_concurrency(1);
    p.resolver().push(&[], &["int4"]);
    p.resolver().push(&[], &["int8"]);

    let folders = p.parse_folders(&[dir.clone()]).await.unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    assert_eq!(folders.len(), 1);
    let files = &folders[0].files;
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].queries[0].name, "ListUsers");
    assert_eq!(files[1].queries[0].name, "CountPosts");
    assert_eq!(files[1].queries[0].columns[0].name, "count");
    assert_eq!(files[1].queries[0].columns[0].type_name, "i64");
}

#[tokio::test]
async fn queries_serialize_to_json() {
    let q = parse("-- GetUser\nSELECT id FROM users WHERE id = $1", &["int4"], &["int4"]).await;
    let json = serde_json::to_value(&q).unwrap();
    assert_eq!(json["kind"], "SELECT");
    assert_eq!(json["name"], "GetUser");
    assert_eq!(json["args"][0]["name"], "id");
    assert_eq!(json["args"][0]["type_name"], "i32");
    assert_eq!(json["config"]["generate_row"], true);
}

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use futures::future::BoxFuture;
use futures::FutureExt;

use sqlforge_gen::catalog::{EnumType, Table};
use sqlforge_gen::{Catalog, Described, GenError, Parser, Query, Result, Translator, TypeInfo, TypeResolver};

/// Answers `describe` calls from a queue of canned responses.
#[derive(Default)]
pub struct FakeResolver {
    responses: Mutex<VecDeque<Described>>,
}

impl FakeResolver {
    pub fn push(&self, params: &[&str], results: &[&str]) {
        self.responses.lock().unwrap().push_back(Described {
            params: params.iter().map(|t| TypeInfo::named(t)).collect(),
            results: results.iter().map(|t| TypeInfo::named(t)).collect(),
        });
    }
}

impl TypeResolver for FakeResolver {
    fn describe<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, Result<Described>> {
        let next = self.responses.lock().unwrap().pop_front();
        async move {
            next.ok_or_else(|| GenError::Prepare(format!("no canned response for {sql:?}")))
        }
        .boxed()
    }
}

pub fn catalog() -> Catalog {
    Catalog {
        tables: vec![
            Table::new("users")
                .column("id", false)
                .column("name", false)
                .column("email", true),
            Table::new("posts")
                .column("id", false)
                .column("author_id", false)
                .column("title", true),
            Table::new("distributors")
                .column("did", false)
                .column("dname", false)
                .column("zipcode", true),
        ],
        enums: vec![EnumType {
            schema: "public".into(),
            name: "post_state".into(),
            labels: vec!["draft".into(), "published".into()],
        }],
        domains: Vec::new(),
    }
}

pub fn parser() -> Parser<FakeResolver> {
    let catalog = catalog();
    let translator = Translator::new(&catalog, "public");
    Parser::new(catalog, "public", translator, FakeResolver::default())
}

/// Parses one statement, answering the type lookup with `params` and
/// `results`.
pub async fn parse(sql: &str, params: &[&str], results: &[&str]) -> Query {
    let p = parser();
    p.resolver().push(params, results);
    p.parse_query(sql)
        .await
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e}"))
}

pub async fn parse_err(sql: &str, params: &[&str], results: &[&str]) -> GenError {
    let p = parser();
    p.resolver().push(params, results);
    match p.parse_query(sql).await {
        Ok(q) => panic!("Expected an error for: {sql}\nGot: {q:?}"),
        Err(e) => e,
    }
}

pub fn column_names(q: &Query) -> Vec<&str> {
    q.columns.iter().map(|c| c.name.as_str()).collect()
}

pub fn arg_names(q: &Query) -> Vec<&str> {
    q.args.iter().map(|a| a.col.name.as_str()).collect()
}

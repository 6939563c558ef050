#![allow(dead_code)]

use std::sync::OnceLock;

use regex::Regex;
use sqlforge_core::{Context, RenderError, Statement, Value};

/// Collapses whitespace runs so expectations can be written on one line.
pub fn clean(sql: &str) -> String {
    static WS: OnceLock<Regex> = OnceLock::new();
    let ws = WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    ws.replace_all(sql.trim(), " ").into_owned()
}

pub fn build<Q: Statement>(q: &Q) -> (String, Vec<Value>) {
    build_in(&Context::new(), q)
}

pub fn build_in<Q: Statement>(ctx: &Context, q: &Q) -> (String, Vec<Value>) {
    q.build(ctx)
        .unwrap_or_else(|e| panic!("Failed to render {:?}\nError: {e}", q.kind()))
}

pub fn build_err<Q: Statement>(q: &Q) -> RenderError {
    q.build(&Context::new())
        .expect_err(&format!("Expected render error for {:?}", q.kind()))
}

/// Asserts the rendered SQL matches `expected` up to whitespace.
pub fn assert_sql<Q: Statement>(q: &Q, expected: &str) -> Vec<Value> {
    let (sql, args) = build(q);
    assert_eq!(
        clean(&sql),
        clean(expected),
        "Rendered SQL differs.\n  Got:      {sql}\n  Expected: {expected}"
    );
    args
}

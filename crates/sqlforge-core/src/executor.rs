//! The executor contract.
//!
//! Drivers implement [`Executor`] (and optionally [`Transactor`] and
//! [`Batcher`]); the helpers here build a query against a [`Context`] and hand
//! the text and arguments to the driver.

use futures::future::BoxFuture;
use tracing::debug;

use crate::error::{RenderError, Result};
use crate::query::Statement;
use crate::render::Context;
use crate::value::Value;

/// Rows returned by a query, with their column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    /// Column names in select-list order.
    pub columns: Vec<String>,
    /// One value per column, per row.
    pub rows: Vec<Vec<Value>>,
}

/// Turns one row into a value of type `T`.
pub trait Mapper<T>: Send + Sync {
    /// Maps a single row.
    ///
    /// # Errors
    ///
    /// Returns an error when the row does not fit `T`.
    fn map(&self, columns: &[String], row: Vec<Value>) -> Result<T>;
}

impl<T, F> Mapper<T> for F
where
    F: Fn(&[String], Vec<Value>) -> Result<T> + Send + Sync,
{
    fn map(&self, columns: &[String], row: Vec<Value>) -> Result<T> {
        self(columns, row)
    }
}

/// Runs SQL text with positional arguments.
pub trait Executor: Send + Sync {
    /// Executes a statement, returning the number of affected rows.
    fn exec<'a>(&'a self, sql: &'a str, args: &'a [Value]) -> BoxFuture<'a, Result<u64>>;

    /// Runs a query and returns all rows.
    fn query<'a>(&'a self, sql: &'a str, args: &'a [Value]) -> BoxFuture<'a, Result<Rows>>;
}

/// An open transaction.
pub trait Transaction: Executor {
    /// Commits the transaction.
    fn commit(&mut self) -> BoxFuture<'_, Result<()>>;

    /// Rolls the transaction back.
    fn rollback(&mut self) -> BoxFuture<'_, Result<()>>;
}

/// An executor that can start transactions.
pub trait Transactor: Executor {
    /// The transaction type.
    type Tx: Transaction;

    /// Starts a transaction.
    fn begin(&self) -> BoxFuture<'_, Result<Self::Tx>>;
}

/// Statements queued for a single round trip.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    items: Vec<(String, Vec<Value>)>,
}

impl Batch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `q` and queues it.
    ///
    /// # Errors
    ///
    /// Returns the render error of `q`.
    pub fn queue<Q: Statement>(&mut self, ctx: &Context, q: &Q) -> Result<()> {
        let item = q.build(ctx)?;
        self.items.push(item);
        Ok(())
    }

    /// Queues raw SQL.
    pub fn queue_raw(&mut self, sql: impl Into<String>, args: Vec<Value>) {
        self.items.push((sql.into(), args));
    }

    /// Returns the number of queued statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the queued statements in order.
    #[must_use]
    pub fn items(&self) -> &[(String, Vec<Value>)] {
        &self.items
    }
}

/// Results of a sent batch, read in queue order.
pub trait BatchResults: Send {
    /// Reads the next result as an affected-row count.
    fn exec_next(&mut self) -> BoxFuture<'_, Result<u64>>;

    /// Reads the next result as rows.
    fn query_next(&mut self) -> BoxFuture<'_, Result<Rows>>;
}

/// An executor that can pipeline a [`Batch`].
pub trait Batcher: Executor {
    /// The batch results type.
    type Results: BatchResults;

    /// Sends every queued statement.
    fn send_batch(&self, batch: Batch) -> BoxFuture<'_, Result<Self::Results>>;
}

/// Logs every statement and its arguments before handing it to `inner`.
#[derive(Debug, Clone, Default)]
pub struct DebugExecutor<E> {
    inner: E,
}

impl<E: Executor> DebugExecutor<E> {
    /// Wraps `inner`.
    #[must_use]
    pub const fn new(inner: E) -> Self {
        Self { inner }
    }

    /// Returns the wrapped executor.
    #[must_use]
    pub const fn get_ref(&self) -> &E {
        &self.inner
    }

    /// Unwraps the executor.
    #[must_use]
    pub fn into_inner(self) -> E {
        self.inner
    }
}

fn log_statement(sql: &str, args: &[Value]) {
    debug!(sql, args = args.len(), "statement");
    for (i, arg) in args.iter().enumerate() {
        debug!(position = i + 1, kind = arg.type_name(), value = ?arg, "argument");
    }
}

impl<E: Executor> Executor for DebugExecutor<E> {
    fn exec<'a>(&'a self, sql: &'a str, args: &'a [Value]) -> BoxFuture<'a, Result<u64>> {
        log_statement(sql, args);
        self.inner.exec(sql, args)
    }

    fn query<'a>(&'a self, sql: &'a str, args: &'a [Value]) -> BoxFuture<'a, Result<Rows>> {
        log_statement(sql, args);
        self.inner.query(sql, args)
    }
}

fn ensure_bound(args: &[Value]) -> Result<()> {
    match args.iter().find_map(|a| match a {
        Value::Unbound(name) => Some(name),
        _ => None,
    }) {
        Some(name) => Err(RenderError::MissingNamedArg(name.clone())),
        None => Ok(()),
    }
}

/// Builds `q` and executes it.
///
/// # Errors
///
/// Returns a render error, an unbound placeholder, or the driver error.
pub async fn exec<Q, E>(ctx: &Context, executor: &E, q: &Q) -> Result<u64>
where
    Q: Statement,
    E: Executor + ?Sized,
{
    let (sql, args) = q.build(ctx)?;
    ensure_bound(&args)?;
    debug!(kind = %q.kind(), "executing statement");
    executor.exec(&sql, &args).await
}

/// Builds `q`, runs it and maps every row.
///
/// # Errors
///
/// Returns a render error, an unbound placeholder, the driver error, or the
/// first mapping error.
pub async fn all<Q, E, T, M>(ctx: &Context, executor: &E, q: &Q, mapper: &M) -> Result<Vec<T>>
where
    Q: Statement,
    E: Executor + ?Sized,
    M: Mapper<T> + ?Sized,
{
    let (sql, args) = q.build(ctx)?;
    ensure_bound(&args)?;
    let rows = executor.query(&sql, &args).await?;
    debug!(kind = %q.kind(), rows = rows.rows.len(), "query returned");
    rows.rows
        .into_iter()
        .map(|row| mapper.map(&rows.columns, row))
        .collect()
}

/// Builds `q`, runs it and maps the first row.
///
/// # Errors
///
/// Returns [`RenderError::Executor`] when no row comes back, otherwise the
/// same errors as [`all`].
pub async fn one<Q, E, T, M>(ctx: &Context, executor: &E, q: &Q, mapper: &M) -> Result<T>
where
    Q: Statement,
    E: Executor + ?Sized,
    M: Mapper<T> + ?Sized,
{
    let (sql, args) = q.build(ctx)?;
    ensure_bound(&args)?;
    let rows = executor.query(&sql, &args).await?;
    let Some(row) = rows.rows.into_iter().next() else {
        return Err(RenderError::Executor(String::from("no rows in result set")));
    };
    mapper.map(&rows.columns, row)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures::FutureExt;

    use super::*;
    use crate::expr::{arg, placeholder, quote};
    use crate::psql::{self, dm, sm};
    use crate::query::Cached;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl Executor for Recorder {
        fn exec<'a>(&'a self, sql: &'a str, args: &'a [Value]) -> BoxFuture<'a, Result<u64>> {
            self.calls
                .lock()
                .unwrap()
                .push((sql.to_string(), args.to_vec()));
            async { Ok(1) }.boxed()
        }

        fn query<'a>(&'a self, sql: &'a str, args: &'a [Value]) -> BoxFuture<'a, Result<Rows>> {
            self.calls
                .lock()
                .unwrap()
                .push((sql.to_string(), args.to_vec()));
            async {
                Ok(Rows {
                    columns: vec!["id".into()],
                    rows: vec![vec![Value::Int(1)], vec![Value::Int(2)]],
                })
            }
            .boxed()
        }
    }

    fn id(_: &[String], row: Vec<Value>) -> Result<i64> {
        match row.first() {
            Some(Value::Int(i)) => Ok(*i),
            other => Err(RenderError::Executor(format!("unexpected {other:?}"))),
        }
    }

    #[tokio::test]
    async fn test_exec_passes_rendered_sql() {
        let rec = Recorder::default();
        let q = psql::delete([
            dm::from(quote(["films"])),
            dm::where_(quote(["id"]).eq(arg(3))),
        ]);
        let affected = exec(&Context::new(), &rec, &q).await.unwrap();
        assert_eq!(affected, 1);
        let calls = rec.calls.lock().unwrap();
        assert_eq!(calls[0].0, "DELETE FROM \"films\"\nWHERE (\"id\" = $1)");
        assert_eq!(calls[0].1, vec![Value::Int(3)]);
    }

    #[tokio::test]
    async fn test_all_and_one_map_rows() {
        let rec = Recorder::default();
        let q = psql::select([sm::from(quote(["films"])).into()]);
        let ids = all(&Context::new(), &rec, &q, &id).await.unwrap();
        assert_eq!(ids, vec![1, 2]);
        let first = one(&Context::new(), &rec, &q, &id).await.unwrap();
        assert_eq!(first, 1);
    }

    #[tokio::test]
    async fn test_unbound_placeholder_is_rejected() {
        let rec = Recorder::default();
        let q = psql::delete([
            dm::from(quote(["films"])),
            dm::where_(quote(["id"]).eq(placeholder("id"))),
        ]);
        let err = exec(&Context::new(), &rec, &q).await.unwrap_err();
        assert!(matches!(err, RenderError::MissingNamedArg(n) if n == "id"));
        assert!(rec.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_debug_executor_delegates() {
        let dbg = DebugExecutor::new(Recorder::default());
        let q = psql::delete([
            dm::from(quote(["films"])),
            dm::where_(quote(["kind"]).eq(arg("Musical"))),
        ]);
        assert_eq!(exec(&Context::new(), &dbg, &q).await.unwrap(), 1);
        let ids = all(&Context::new(), &dbg, &psql::select([sm::columns([arg(1)])]), &id)
            .await
            .unwrap();
        assert_eq!(ids, vec![1, 2]);

        let calls = dbg.get_ref().calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, vec![Value::Text("Musical".into())]);
        assert_eq!(calls[1].0, "SELECT $1");
    }

    #[tokio::test]
    async fn test_cached_statement_runs_through_executor() {
        let dbg = DebugExecutor::new(Recorder::default());
        let q = psql::select([
            sm::from(quote(["films"])).into(),
            sm::where_(quote(["id"]).eq(arg(9))),
        ]);
        let cached = Cached::new(&Context::new(), &q).unwrap();
        let (sql, args) = cached.build().unwrap();
        dbg.query(&sql, &args).await.unwrap();
        dbg.query(&sql, &args).await.unwrap();

        let rec = dbg.into_inner();
        let calls = rec.calls.into_inner().unwrap();
        assert_eq!(calls[0], calls[1]);
        assert_eq!(calls[0].0, "SELECT *\nFROM \"films\"\nWHERE (\"id\" = $1)");
    }

    #[test]
    fn test_batch_queue() {
        let mut batch = Batch::new();
        batch
            .queue(&Context::new(), &psql::select([sm::columns([arg(1)])]))
            .unwrap();
        batch.queue_raw("SELECT 2", Vec::new());
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.items()[0].0, "SELECT $1");
    }
}

//! Pre-rendered statements.

use tracing::debug;

use super::{QueryType, Statement};
use crate::dialect::{Dialect, Postgres};
use crate::error::Result;
use crate::expr::{node, Expr};
use crate::render::{render, Context, Expression, Writer};
use crate::value::Value;

/// Stands in for a placeholder while caching. PostgreSQL rejects NUL in
/// query text, so it never collides with rendered SQL.
const MARK: char = '\0';

/// Wraps a dialect, writing [`MARK`] instead of numbered placeholders.
struct Marking<'a>(&'a dyn Dialect);

impl Dialect for Marking<'_> {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn identifier_quote(&self) -> char {
        self.0.identifier_quote()
    }

    fn write_arg(&self, w: &mut String, _position: usize) {
        w.push(MARK);
    }

    fn write_quoted(&self, w: &mut String, segments: &[&str]) {
        self.0.write_quoted(w, segments);
    }

    fn supports_returning(&self) -> bool {
        self.0.supports_returning()
    }

    fn supports_upsert(&self) -> bool {
        self.0.supports_upsert()
    }

    fn supports_merge(&self) -> bool {
        self.0.supports_merge()
    }

    fn supports_distinct_on(&self) -> bool {
        self.0.supports_distinct_on()
    }

    fn supports_locking(&self) -> bool {
        self.0.supports_locking()
    }
}

/// A statement rendered once and replayed on every use.
///
/// The text between arguments is kept as-is; placeholders are numbered
/// again each time the statement is written, so a cached query can be
/// embedded anywhere in a larger one.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached {
    kind: QueryType,
    segments: Vec<String>,
    args: Vec<Value>,
}

impl Cached {
    /// Renders `q` for PostgreSQL.
    ///
    /// # Errors
    ///
    /// Returns the render error of `q`.
    pub fn new<Q: Statement>(ctx: &Context, q: &Q) -> Result<Self> {
        Self::with_dialect(ctx, q, &Postgres)
    }

    /// Renders `q` for `dialect`. Contextual mods run once, against `ctx`.
    ///
    /// # Errors
    ///
    /// Returns the render error of `q`.
    pub fn with_dialect<Q: Statement>(
        ctx: &Context,
        q: &Q,
        dialect: &dyn Dialect,
    ) -> Result<Self> {
        let (sql, args) = render(q, ctx, &Marking(dialect), 0)?;
        let segments: Vec<String> = sql.split(MARK).map(String::from).collect();
        debug!(kind = %Q::KIND, args = args.len(), "cached query");
        Ok(Self {
            kind: Q::KIND,
            segments,
            args,
        })
    }

    /// Returns the kind of the cached statement.
    #[must_use]
    pub const fn kind(&self) -> QueryType {
        self.kind
    }

    /// Returns the stored arguments in order.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Writes the cached text with placeholders from `start + 1`.
    ///
    /// # Errors
    ///
    /// Never fails for a well-formed cache; the signature matches
    /// [`Statement::build_with`].
    pub fn build_with(
        &self,
        dialect: &dyn Dialect,
        start: usize,
    ) -> Result<(String, Vec<Value>)> {
        render(self, &Context::new(), dialect, start)
    }

    /// Writes the cached text with PostgreSQL placeholders from `$1`.
    ///
    /// # Errors
    ///
    /// See [`Cached::build_with`].
    pub fn build(&self) -> Result<(String, Vec<Value>)> {
        self.build_with(&Postgres, 0)
    }
}

impl Expression for Cached {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        let mut args = self.args.iter();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                if let Some(arg) = args.next() {
                    w.write_arg(arg.clone());
                }
            }
            w.write_str(segment);
        }
        Ok(())
    }
}

impl From<Cached> for Expr {
    fn from(c: Cached) -> Self {
        node(c)
    }
}

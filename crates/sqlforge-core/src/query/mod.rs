//! Query kinds.
//!
//! A query is a plain struct of clauses built by applying [`Mod`]s in order.
//! Rendering clones the query, runs its contextual mods against the render
//! [`Context`], then writes the clauses in SQL order.

mod cached;
mod delete;
mod insert;
mod merge;
mod select;
mod update;
mod values;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

pub use cached::Cached;
pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use merge::MergeQuery;
pub use select::{Distinct, SelectQuery};
pub use update::UpdateQuery;
pub use values::ValuesQuery;

use crate::clause::{
    Cte, Fetch, Join, Limit, Offset, OrderBy, Returning, TableRef, Where, With,
};
use crate::dialect::{Dialect, Postgres};
use crate::error::Result;
use crate::render::{render, Context, Expression, Writer};
use crate::value::Value;

/// The kind of statement a query renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    /// `SELECT`.
    Select,
    /// `INSERT`.
    Insert,
    /// `UPDATE`.
    Update,
    /// `DELETE`.
    Delete,
    /// `MERGE`.
    Merge,
    /// A bare `VALUES` list.
    Values,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Merge => "MERGE",
            Self::Values => "VALUES",
        })
    }
}

/// A modification applied once while building a query.
pub struct Mod<Q>(Box<dyn FnOnce(&mut Q) + Send>);

impl<Q> Mod<Q> {
    /// Wraps a closure as a mod.
    #[must_use]
    pub fn new(f: impl FnOnce(&mut Q) + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    /// Applies the mod to `q`.
    pub fn apply(self, q: &mut Q) {
        (self.0)(q);
    }
}

impl<Q> fmt::Debug for Mod<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mod")
    }
}

type ContextualFn<Q> = dyn Fn(Context, &mut Q) -> Result<Context> + Send + Sync;

/// Mods that run on every render with access to the render context.
pub struct ContextualMods<Q> {
    mods: Vec<Arc<ContextualFn<Q>>>,
}

impl<Q> ContextualMods<Q> {
    /// Appends a contextual mod.
    pub fn push(&mut self, f: impl Fn(Context, &mut Q) -> Result<Context> + Send + Sync + 'static) {
        self.mods.push(Arc::new(f));
    }

    /// Returns the number of registered mods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mods.len()
    }

    /// Returns true when no mod is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    /// Runs every mod in insertion order, threading the context through.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a mod.
    pub fn run(&self, mut ctx: Context, q: &mut Q) -> Result<Context> {
        if self.mods.is_empty() || ctx.skip_contextual_mods() {
            return Ok(ctx);
        }
        for m in &self.mods {
            ctx = m(ctx, q)?;
        }
        Ok(ctx)
    }
}

impl<Q> Default for ContextualMods<Q> {
    fn default() -> Self {
        Self { mods: Vec::new() }
    }
}

impl<Q> Clone for ContextualMods<Q> {
    fn clone(&self) -> Self {
        Self {
            mods: self.mods.clone(),
        }
    }
}

impl<Q> fmt::Debug for ContextualMods<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextualMods")
            .field("len", &self.mods.len())
            .finish()
    }
}

/// Behaviour shared by every query kind.
pub trait Statement: Expression + Clone + Sized + 'static {
    /// The kind of statement.
    const KIND: QueryType;

    /// Returns the contextual mods of the query.
    fn contextual_mods_mut(&mut self) -> &mut ContextualMods<Self>;

    /// Writes the clauses in SQL order, after contextual mods have run.
    ///
    /// # Errors
    ///
    /// Returns the first clause error.
    fn write_clauses(&self, w: &mut Writer<'_>) -> Result<()>;

    /// Returns the kind of statement.
    #[must_use]
    fn kind(&self) -> QueryType {
        Self::KIND
    }

    /// Applies further mods in order.
    #[must_use]
    fn apply<I: IntoIterator<Item = Mod<Self>>>(mut self, mods: I) -> Self {
        for m in mods {
            m.apply(&mut self);
        }
        self
    }

    /// Registers a contextual mod.
    fn append_contextual_mod(
        &mut self,
        f: impl Fn(Context, &mut Self) -> Result<Context> + Send + Sync + 'static,
    ) {
        self.contextual_mods_mut().push(f);
    }

    /// Renders with PostgreSQL placeholders starting at `$1`.
    ///
    /// # Errors
    ///
    /// Returns the first render error.
    fn build(&self, ctx: &Context) -> Result<(String, Vec<Value>)> {
        self.build_with(ctx, &Postgres, 0)
    }

    /// Renders with `dialect`, numbering placeholders from `start + 1`.
    ///
    /// # Errors
    ///
    /// Returns the first render error.
    fn build_with(
        &self,
        ctx: &Context,
        dialect: &dyn Dialect,
        start: usize,
    ) -> Result<(String, Vec<Value>)> {
        let (sql, args) = render(self, ctx, dialect, start)?;
        debug!(kind = %Self::KIND, args = args.len(), "rendered query");
        Ok((sql, args))
    }
}

/// Runs the contextual mods of `q` on a copy, then writes its clauses.
pub(crate) fn write_statement<Q: Statement>(q: &Q, w: &mut Writer<'_>) -> Result<()> {
    let mut q = q.clone();
    let mods = std::mem::take(q.contextual_mods_mut());
    if mods.is_empty() {
        return q.write_clauses(w);
    }

    debug!(kind = %Q::KIND, mods = mods.len(), "applying contextual mods");
    let ctx = mods.run(w.ctx().clone(), &mut q)?;
    let outer = w.swap_ctx(ctx);
    let result = q.write_clauses(w);
    w.swap_ctx(outer);
    result
}

/// Queries with a WITH clause.
pub trait HasWith {
    /// Returns the WITH clause.
    fn with_mut(&mut self) -> &mut With;

    /// Appends a CTE.
    fn append_cte(&mut self, cte: Cte) {
        self.with_mut().ctes.push(cte);
    }

    /// Marks the WITH clause as recursive.
    fn set_recursive(&mut self, recursive: bool) {
        self.with_mut().recursive = recursive;
    }
}

/// Queries with a WHERE clause.
pub trait HasWhere {
    /// Returns the WHERE clause.
    fn where_mut(&mut self) -> &mut Where;

    /// Appends an AND-joined condition.
    fn append_where(&mut self, condition: crate::expr::Expr) {
        self.where_mut().conditions.push(condition);
    }
}

/// Queries with a RETURNING clause.
pub trait HasReturning {
    /// Returns the RETURNING clause.
    fn returning_mut(&mut self) -> &mut Returning;

    /// Appends RETURNING expressions.
    fn append_returning(&mut self, exprs: impl IntoIterator<Item = crate::expr::Expr>) {
        self.returning_mut().exprs.extend(exprs);
    }
}

/// Queries with a FROM-like table reference that accepts joins.
pub trait HasTableRef {
    /// Returns the table reference.
    fn table_ref_mut(&mut self) -> &mut TableRef;

    /// Sets the table reference.
    fn set_table_ref(&mut self, table: TableRef) {
        *self.table_ref_mut() = table;
    }

    /// Appends a join to the table reference.
    fn append_join(&mut self, join: Join) {
        self.table_ref_mut().joins.push(join);
    }
}

/// Queries with ORDER BY, LIMIT, OFFSET and FETCH.
pub trait HasPaging {
    /// Returns the ORDER BY clause.
    fn order_by_mut(&mut self) -> &mut OrderBy;
    /// Returns the LIMIT clause.
    fn limit_mut(&mut self) -> &mut Limit;
    /// Returns the OFFSET clause.
    fn offset_mut(&mut self) -> &mut Offset;
    /// Returns the FETCH clause.
    fn fetch_mut(&mut self) -> &mut Fetch;
}

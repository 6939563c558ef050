//! PostgreSQL query starters and mods.
//!
//! ```
//! use sqlforge_core::psql::{self, dm, quote, arg};
//! use sqlforge_core::{Context, Statement};
//!
//! let q = psql::delete([
//!     dm::from(quote(["films"])),
//!     dm::where_(quote(["kind"]).eq(arg("Musical"))),
//! ]);
//! let (sql, args) = q.build(&Context::new()).unwrap();
//! assert_eq!(sql, "DELETE FROM \"films\"\nWHERE (\"kind\" = $1)");
//! assert_eq!(args.len(), 1);
//! ```

pub mod dm;
pub mod im;
pub mod mm;
mod mods;
pub mod sm;
pub mod um;
pub mod vm;

pub use mods::{
    CteChain, FromChain, JoinChain, OrderChain, SetCol, SetCols,
};

pub use crate::expr::{
    and, arg, arg_group, args, binary, cast, concat, exists, group, join, named, not, or,
    placeholder, quote, raw, raw_args, s, Case, ColumnsExpr, Function, WindowDef,
};

use crate::query::{
    DeleteQuery, InsertQuery, MergeQuery, Mod, SelectQuery, Statement, UpdateQuery, ValuesQuery,
};

/// Builds a SELECT from mods applied in order.
#[must_use]
pub fn select<I: IntoIterator<Item = Mod<SelectQuery>>>(mods: I) -> SelectQuery {
    SelectQuery::default().apply(mods)
}

/// Builds an INSERT from mods applied in order.
#[must_use]
pub fn insert<I: IntoIterator<Item = Mod<InsertQuery>>>(mods: I) -> InsertQuery {
    InsertQuery::default().apply(mods)
}

/// Builds an UPDATE from mods applied in order.
#[must_use]
pub fn update<I: IntoIterator<Item = Mod<UpdateQuery>>>(mods: I) -> UpdateQuery {
    UpdateQuery::default().apply(mods)
}

/// Builds a DELETE from mods applied in order.
#[must_use]
pub fn delete<I: IntoIterator<Item = Mod<DeleteQuery>>>(mods: I) -> DeleteQuery {
    DeleteQuery::default().apply(mods)
}

/// Builds a MERGE from mods applied in order.
#[must_use]
pub fn merge<I: IntoIterator<Item = Mod<MergeQuery>>>(mods: I) -> MergeQuery {
    MergeQuery::default().apply(mods)
}

/// Builds a bare VALUES list from mods applied in order.
#[must_use]
pub fn values<I: IntoIterator<Item = Mod<ValuesQuery>>>(mods: I) -> ValuesQuery {
    ValuesQuery::default().apply(mods)
}

/// `"col1", "col2", ...` for a single table.
#[must_use]
pub fn columns<I, S>(names: I) -> ColumnsExpr
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ColumnsExpr::new(names)
}

/// A function call.
#[must_use]
pub fn f<I, E>(name: impl Into<String>, args: I) -> Function
where
    I: IntoIterator<Item = E>,
    E: Into<crate::expr::Expr>,
{
    Function::new(name, args)
}

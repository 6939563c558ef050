//! # sqlforge-core
//!
//! A composable PostgreSQL query AST with numbered-placeholder rendering.
//!
//! This crate provides:
//! - An expression tree and clause types that render themselves through a
//!   [`Writer`], numbering arguments as they go
//! - Query kinds (SELECT, INSERT, UPDATE, DELETE, MERGE, VALUES) built from
//!   ordered mods, plus contextual mods that see the render [`Context`]
//! - Dialect-aware rendering that rejects clauses a dialect cannot express
//!
//! ## Building a query
//!
//! ```rust
//! use sqlforge_core::psql::{self, arg, quote, sm};
//! use sqlforge_core::{Context, Statement};
//!
//! let q = psql::select([
//!     sm::columns([quote(["id"]), quote(["name"])]),
//!     sm::from(quote(["users"])).into(),
//!     sm::where_(quote(["active"]).eq(arg(true))),
//! ]);
//! let (sql, args) = q.build(&Context::new()).unwrap();
//!
//! assert_eq!(sql, "SELECT \"id\", \"name\"\nFROM \"users\"\nWHERE (\"active\" = $1)");
//! assert_eq!(args.len(), 1);
//! ```
//!
//! ## Embedding queries
//!
//! Queries are expressions, so a SELECT can sit inside another query. Argument
//! numbering continues across the boundary:
//!
//! ```rust
//! use sqlforge_core::psql::{self, arg, quote, sm};
//! use sqlforge_core::{Context, Statement};
//!
//! let inner = psql::select([
//!     sm::columns([quote(["id"])]),
//!     sm::from(quote(["banned"])).into(),
//!     sm::where_(quote(["reason"]).eq(arg("spam"))),
//! ]);
//! let q = psql::select([
//!     sm::from(quote(["users"])).into(),
//!     sm::where_(quote(["org"]).eq(arg(7))),
//!     sm::where_(quote(["id"]).in_list([inner])),
//! ]);
//! let (sql, _) = q.build(&Context::new()).unwrap();
//! assert!(sql.ends_with("(\"org\" = $1) AND (\"id\" IN (SELECT \"id\"\nFROM \"banned\"\nWHERE (\"reason\" = $2)))"));
//! ```

pub mod clause;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod expr;
pub mod psql;
pub mod query;
pub mod render;
pub mod value;

pub use dialect::{Dialect, GenericDialect, Postgres};
pub use error::{RenderError, Result};
pub use executor::{
    Batch, BatchResults, Batcher, DebugExecutor, Executor, Mapper, Rows, Transaction, Transactor,
};
pub use expr::Expr;
pub use query::{
    Cached, ContextualMods, DeleteQuery, InsertQuery, MergeQuery, Mod, QueryType, SelectQuery,
    Statement, UpdateQuery, ValuesQuery,
};
pub use render::{render, Context, Expression, Writer};
pub use value::{ToValue, Value};

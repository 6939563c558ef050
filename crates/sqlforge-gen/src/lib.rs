//! # sqlforge-gen
//!
//! Reads PostgreSQL query files annotated with comments and describes every
//! query: its rewritten SQL, typed arguments and result columns, and the
//! builder calls that rebuild it on top of `sqlforge-core`.
//!
//! A query file holds `;`-separated statements, each preceded by a
//! `-- Name row:rows:generate` comment. Result columns and arguments can be
//! configured with a `/* name:type:null */` comment right after them, and a
//! `-- prefix:foo_` comment before a `*` target prefixes the expanded column
//! names.
//!
//! Parsing a statement runs in three passes:
//! - the server prepares it, reporting parameter and result types
//! - the walker visits the syntax tree, naming expressions and deciding their
//!   nullability while it records edit rules
//! - the edit rules are applied to the text, stripping comments, expanding
//!   `*`, aliasing columns and renumbering placeholders
//!
//! ```rust
//! use sqlforge_gen::query::QueryCol;
//!
//! let col = QueryCol::parse_config("user_id:i64:notnull");
//! assert_eq!(col.name, "user_id");
//! assert_eq!(col.nullable, Some(false));
//! ```

pub mod args;
pub mod catalog;
pub mod config;
pub mod edit;
pub mod error;
pub mod mods;
pub mod nullable;
pub mod parser;
pub mod query;
pub mod source;
pub mod span;
pub mod tokens;
pub mod translate;
pub mod typing;
pub mod walker;

pub use catalog::{Catalog, Table};
pub use config::GenConfig;
pub use error::{GenError, Result};
pub use parser::Parser;
pub use query::{Query, QueryArg, QueryCol, QueryConfig};
pub use translate::{Translator, TypeDef, TypeInfo, TypeRegistry};
pub use typing::{Described, PgTypeResolver, TypeResolver};

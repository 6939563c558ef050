//! Parsed query descriptions and the annotation strings that configure them.

use serde::{Serialize, Serializer};
use sqlforge_core::QueryType;

/// A result column or an argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryCol {
    /// Name used in generated code.
    pub name: String,
    /// Name of the column in the database, for result columns.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub db_name: String,
    /// Whether the value can be NULL; `None` when unknown.
    pub nullable: Option<bool>,
    /// Target type name.
    pub type_name: String,
}

impl QueryCol {
    /// Parses a `/* name:type:null */` annotation. Every part is optional;
    /// the nullability part accepts `null`, `true`, `yes` and `notnull`,
    /// `nnull`, `false`, `no`.
    #[must_use]
    pub fn parse_config(s: &str) -> Self {
        let mut parts = s.splitn(3, ':').map(str::trim);
        let name = parts.next().unwrap_or_default().to_string();
        let type_name = parts.next().unwrap_or_default().to_string();
        let nullable = match parts.next().unwrap_or_default().to_ascii_lowercase().as_str() {
            "null" | "true" | "yes" => Some(true),
            "notnull" | "nnull" | "false" | "no" => Some(false),
            _ => None,
        };
        Self {
            name,
            db_name: String::new(),
            nullable,
            type_name,
        }
    }

    /// Overrides fields with the non-empty fields of `others`, in order.
    #[must_use]
    pub fn merge(mut self, others: impl IntoIterator<Item = Self>) -> Self {
        for other in others {
            if !other.name.is_empty() {
                self.name = other.name;
            }
            if !other.db_name.is_empty() {
                self.db_name = other.db_name;
            }
            if other.nullable.is_some() {
                self.nullable = other.nullable;
            }
            if !other.type_name.is_empty() {
                self.type_name = other.type_name;
            }
        }
        self
    }
}

/// An argument of a query. Groups carry their member arguments as children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryArg {
    /// Name, type and nullability.
    #[serde(flatten)]
    pub col: QueryCol,
    /// Member arguments of a group.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<QueryArg>,
    /// Byte ranges in the rewritten SQL.
    pub positions: Vec<(usize, usize)>,
    /// Whether the argument may be expanded to several values.
    pub can_be_multiple: bool,
}

impl QueryArg {
    pub(crate) fn first_position(&self) -> (usize, usize) {
        self.positions.first().copied().unwrap_or_default()
    }
}

/// Options from the `-- Name row:rows:generate` comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryConfig {
    /// Name of the generated row type.
    pub row_name: String,
    /// Name of the generated collection of rows.
    pub row_slice_name: String,
    /// Whether a row type is generated at all.
    pub generate_row: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            row_name: String::new(),
            row_slice_name: String::new(),
            generate_row: true,
        }
    }
}

impl QueryConfig {
    /// Parses `row_name:row_slice_name:generate_row`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let mut parts = s.splitn(3, ':').map(str::trim);
        let row_name = parts.next().unwrap_or_default().to_string();
        let row_slice_name = parts.next().unwrap_or_default().to_string();
        let generate_row = !matches!(
            parts.next().unwrap_or_default().to_ascii_lowercase().as_str(),
            "false" | "no" | "0" | "f"
        );
        Self {
            row_name,
            row_slice_name,
            generate_row,
        }
    }
}

/// A fully parsed and typed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    /// Name from the leading comment.
    pub name: String,
    /// Options from the leading comment.
    pub config: QueryConfig,
    /// Rewritten SQL.
    pub sql: String,
    /// Statement kind.
    #[serde(serialize_with = "serialize_kind")]
    pub kind: QueryType,
    /// Result columns.
    pub columns: Vec<QueryCol>,
    /// Arguments in order of first appearance.
    pub args: Vec<QueryArg>,
    /// Statements rebuilding the query on a builder `q`.
    pub mods: String,
    /// Modules the rebuild statements refer to.
    pub imports: Vec<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_kind<S: Serializer>(kind: &QueryType, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(kind)
}

/// The queries of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFile {
    /// Path of the file.
    pub path: std::path::PathBuf,
    /// Queries in source order.
    pub queries: Vec<Query>,
}

/// The query files of one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFolder {
    /// Path of the folder.
    pub path: std::path::PathBuf,
    /// Files in lexicographic order.
    pub files: Vec<QueryFile>,
}

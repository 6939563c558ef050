//! MERGE building blocks.

use super::from::write_quoted_list;
use super::Set;
use crate::error::Result;
use crate::expr::Expr;
use crate::render::{Expression, Writer};

/// `OVERRIDING {SYSTEM|USER} VALUE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overriding {
    /// `OVERRIDING SYSTEM VALUE`.
    System,
    /// `OVERRIDING USER VALUE`.
    User,
}

impl Overriding {
    /// Returns the full clause text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "OVERRIDING SYSTEM VALUE",
            Self::User => "OVERRIDING USER VALUE",
        }
    }
}

/// The data source of a MERGE.
#[derive(Debug, Clone)]
pub enum MergeSource {
    /// A table name.
    Table(Expr),
    /// A subquery, written in parentheses.
    Query(Expr),
}

/// `USING [ONLY] source [AS "alias"] ON condition`.
#[derive(Debug, Clone)]
pub struct MergeUsing {
    /// Renders `ONLY`.
    pub only: bool,
    /// The data source.
    pub source: MergeSource,
    /// Optional alias.
    pub alias: Option<String>,
    /// Join condition.
    pub condition: Option<Expr>,
}

impl Expression for MergeUsing {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_str("USING ");
        if self.only {
            w.write_str("ONLY ");
        }
        match &self.source {
            MergeSource::Table(table) => w.express(table)?,
            MergeSource::Query(query) => {
                w.write_char('(');
                w.express(query)?;
                w.write_char(')');
            }
        }
        if let Some(alias) = &self.alias {
            w.write_str(" AS ");
            w.write_quoted(&[alias]);
        }
        w.express_opt(self.condition.as_ref(), " ON ", "")
    }
}

/// Which rows a WHEN branch applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMatch {
    /// `MATCHED`.
    Matched,
    /// `NOT MATCHED`.
    NotMatched,
    /// `NOT MATCHED BY TARGET`.
    NotMatchedByTarget,
    /// `NOT MATCHED BY SOURCE`.
    NotMatchedBySource,
}

impl MergeMatch {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "MATCHED",
            Self::NotMatched => "NOT MATCHED",
            Self::NotMatchedByTarget => "NOT MATCHED BY TARGET",
            Self::NotMatchedBySource => "NOT MATCHED BY SOURCE",
        }
    }
}

/// The action of a WHEN branch.
#[derive(Debug, Clone)]
pub enum MergeAction {
    /// `DO NOTHING`.
    DoNothing,
    /// `DELETE`.
    Delete,
    /// `INSERT [(cols)] [OVERRIDING ...] VALUES (...) | DEFAULT VALUES`.
    Insert {
        /// Target columns.
        columns: Vec<String>,
        /// Identity override.
        overriding: Option<Overriding>,
        /// Inserted values; `DEFAULT VALUES` when empty.
        values: Vec<Expr>,
    },
    /// `UPDATE SET a, b`.
    Update {
        /// Assignments.
        set: Set,
    },
}

impl Expression for MergeAction {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        match self {
            Self::DoNothing => w.write_str("DO NOTHING"),
            Self::Delete => w.write_str("DELETE"),
            Self::Insert {
                columns,
                overriding,
                values,
            } => {
                w.write_str("INSERT");
                if !columns.is_empty() {
                    w.write_str(" (");
                    write_quoted_list(w, columns);
                    w.write_char(')');
                }
                if let Some(overriding) = overriding {
                    w.write_char(' ');
                    w.write_str(overriding.as_str());
                }
                if values.is_empty() {
                    w.write_str(" DEFAULT VALUES");
                } else {
                    w.express_slice(values, " VALUES (", ", ", ")")?;
                }
            }
            Self::Update { set } => {
                w.write_str("UPDATE SET ");
                w.express_slice(&set.assignments, "", ", ", "")?;
            }
        }
        Ok(())
    }
}

/// `WHEN kind [AND condition] THEN action`.
#[derive(Debug, Clone)]
pub struct MergeWhen {
    /// Which rows the branch applies to.
    pub kind: MergeMatch,
    /// Extra condition.
    pub condition: Option<Expr>,
    /// Action to run.
    pub action: MergeAction,
}

impl Expression for MergeWhen {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_str("WHEN ");
        w.write_str(self.kind.as_str());
        w.express_opt(self.condition.as_ref(), " AND ", "")?;
        w.write_str(" THEN ");
        w.express(&self.action)
    }
}

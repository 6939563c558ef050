//! WITH clauses and common table expressions.

use crate::error::Result;
use crate::expr::Expr;
use crate::render::{Expression, Writer};

/// Traversal order of a recursive CTE search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrder {
    /// `BREADTH FIRST`.
    Breadth,
    /// `DEPTH FIRST`.
    Depth,
}

/// `SEARCH {BREADTH|DEPTH} FIRST BY cols SET seq_col`.
#[derive(Debug, Clone)]
pub struct CteSearch {
    /// Traversal order.
    pub order: SearchOrder,
    /// Columns to order by.
    pub columns: Vec<String>,
    /// Sequence column name.
    pub set: String,
}

impl Expression for CteSearch {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_str(match self.order {
            SearchOrder::Breadth => "SEARCH BREADTH FIRST BY ",
            SearchOrder::Depth => "SEARCH DEPTH FIRST BY ",
        });
        w.write_str(&self.columns.join(", "));
        w.write_str(" SET ");
        w.write_str(&self.set);
        Ok(())
    }
}

/// `CYCLE cols SET mark [TO v DEFAULT d] USING path`.
#[derive(Debug, Clone)]
pub struct CteCycle {
    /// Columns checked for cycles.
    pub columns: Vec<String>,
    /// Cycle mark column.
    pub set: String,
    /// Path column.
    pub using: String,
    /// Value of the mark when a cycle is found.
    pub set_val: Option<Expr>,
    /// Value of the mark otherwise.
    pub default_val: Option<Expr>,
}

impl Expression for CteCycle {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_str("CYCLE ");
        w.write_str(&self.columns.join(", "));
        w.write_str(" SET ");
        w.write_str(&self.set);
        w.express_opt(self.set_val.as_ref(), " TO ", "")?;
        w.express_opt(self.default_val.as_ref(), " DEFAULT ", "")?;
        w.write_str(" USING ");
        w.write_str(&self.using);
        Ok(())
    }
}

/// `name[(cols)] AS [[NOT] MATERIALIZED] (query)`.
#[derive(Debug, Clone)]
pub struct Cte {
    /// CTE name.
    pub name: String,
    /// Optional column names.
    pub columns: Vec<String>,
    /// The query body.
    pub query: Expr,
    /// `None` leaves materialization to the planner.
    pub materialized: Option<bool>,
    /// Optional SEARCH clause.
    pub search: Option<CteSearch>,
    /// Optional CYCLE clause.
    pub cycle: Option<CteCycle>,
}

impl Cte {
    /// Creates a CTE with the given body.
    #[must_use]
    pub fn new(name: impl Into<String>, query: impl Into<Expr>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            query: query.into(),
            materialized: None,
            search: None,
            cycle: None,
        }
    }

    /// Names the CTE columns.
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Forces `MATERIALIZED` (`true`) or `NOT MATERIALIZED` (`false`).
    #[must_use]
    pub const fn materialized(mut self, materialized: bool) -> Self {
        self.materialized = Some(materialized);
        self
    }

    /// Adds a SEARCH clause.
    #[must_use]
    pub fn search<I, S>(mut self, order: SearchOrder, columns: I, set: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search = Some(CteSearch {
            order,
            columns: columns.into_iter().map(Into::into).collect(),
            set: set.into(),
        });
        self
    }

    /// Adds a CYCLE clause.
    #[must_use]
    pub fn cycle(mut self, cycle: CteCycle) -> Self {
        self.cycle = Some(cycle);
        self
    }
}

impl Expression for Cte {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_str(&self.name);
        if !self.columns.is_empty() {
            w.write_char('(');
            w.write_str(&self.columns.join(", "));
            w.write_char(')');
        }
        w.write_str(" AS ");
        match self.materialized {
            Some(true) => w.write_str("MATERIALIZED "),
            Some(false) => w.write_str("NOT MATERIALIZED "),
            None => {}
        }
        w.write_char('(');
        w.express(&self.query)?;
        w.write_char(')');
        w.express_opt(self.search.as_ref(), "\n", "")?;
        w.express_opt(self.cycle.as_ref(), "\n", "")
    }
}

/// `WITH [RECURSIVE]` followed by the CTEs.
#[derive(Debug, Clone, Default)]
pub struct With {
    /// Renders `WITH RECURSIVE`.
    pub recursive: bool,
    /// The CTEs, in order.
    pub ctes: Vec<Cte>,
}

impl With {
    /// Returns true when there is nothing to render.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ctes.is_empty()
    }
}

impl Expression for With {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        let prefix = if self.recursive {
            "WITH RECURSIVE\n"
        } else {
            "WITH\n"
        };
        w.express_slice(&self.ctes, prefix, ",\n", "")
    }
}

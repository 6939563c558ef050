//! SELECT.

use super::{
    write_statement, ContextualMods, HasPaging, HasTableRef, HasWhere, HasWith, QueryType,
    Statement,
};
use crate::clause::{
    Combine, Fetch, GroupBy, Having, Limit, Lock, Offset, OrderBy, TableRef, Where, Windows, With,
};
use crate::dialect::require;
use crate::error::Result;
use crate::expr::{node, Expr};
use crate::render::{Expression, Writer};

/// `DISTINCT [ON (exprs)]`.
#[derive(Debug, Clone, Default)]
pub struct Distinct {
    /// `ON` expressions; plain `DISTINCT` when empty.
    pub on: Vec<Expr>,
}

impl Expression for Distinct {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_str("DISTINCT");
        if self.on.is_empty() {
            return Ok(());
        }
        let d = w.dialect();
        require(d, d.supports_distinct_on(), "DISTINCT ON")?;
        w.express_slice(&self.on, " ON (", ", ", ")")
    }
}

/// A SELECT statement.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub with: With,
    pub distinct: Option<Distinct>,
    /// Select list; `*` when empty.
    pub columns: Vec<Expr>,
    pub table: TableRef,
    pub where_: Where,
    pub group_by: GroupBy,
    pub having: Having,
    pub windows: Windows,
    pub combines: Vec<Combine>,
    pub order_by: OrderBy,
    pub limit: Limit,
    pub offset: Offset,
    pub fetch: Fetch,
    pub locks: Vec<Lock>,
    /// ORDER BY applied to the combined result.
    pub combined_order_by: OrderBy,
    pub combined_limit: Limit,
    pub combined_offset: Offset,
    pub combined_fetch: Fetch,
    pub contextual_mods: ContextualMods<Self>,
}

impl SelectQuery {
    fn needs_parens(&self) -> bool {
        !self.combines.is_empty()
            && (!self.order_by.items.is_empty()
                || self.limit.count.is_some()
                || self.offset.count.is_some()
                || self.fetch.count.is_some()
                || !self.locks.is_empty())
    }
}

impl Statement for SelectQuery {
    const KIND: QueryType = QueryType::Select;

    fn contextual_mods_mut(&mut self) -> &mut ContextualMods<Self> {
        &mut self.contextual_mods
    }

    fn write_clauses(&self, w: &mut Writer<'_>) -> Result<()> {
        w.express_if(&self.with, !self.with.is_empty(), "", "\n")?;

        let parens = self.needs_parens();
        if parens {
            w.write_char('(');
        }

        w.write_str("SELECT ");
        w.express_opt(self.distinct.as_ref(), "", " ")?;
        if self.columns.is_empty() {
            w.write_char('*');
        } else {
            w.express_slice(&self.columns, "", ", ", "")?;
        }

        w.express_if(&self.table, !self.table.is_empty(), "\nFROM ", "")?;
        w.express_if(&self.where_, !self.where_.conditions.is_empty(), "\n", "")?;
        w.express_if(&self.group_by, !self.group_by.groups.is_empty(), "\n", "")?;
        w.express_if(&self.having, !self.having.conditions.is_empty(), "\n", "")?;
        w.express_if(&self.windows, !self.windows.windows.is_empty(), "\n", "")?;
        w.express_if(&self.order_by, !self.order_by.items.is_empty(), "\n", "")?;
        w.express_if(&self.limit, self.limit.count.is_some(), "\n", "")?;
        w.express_if(&self.offset, self.offset.count.is_some(), "\n", "")?;
        w.express_if(&self.fetch, self.fetch.count.is_some(), "\n", "")?;
        w.express_slice(&self.locks, "\n", "\n", "")?;

        if parens {
            w.write_char(')');
        }

        w.express_slice(&self.combines, "\n", "\n", "")?;
        w.express_if(
            &self.combined_order_by,
            !self.combined_order_by.items.is_empty(),
            "\n",
            "",
        )?;
        w.express_if(&self.combined_limit, self.combined_limit.count.is_some(), "\n", "")?;
        w.express_if(&self.combined_offset, self.combined_offset.count.is_some(), "\n", "")?;
        w.express_if(&self.combined_fetch, self.combined_fetch.count.is_some(), "\n", "")
    }
}

impl Expression for SelectQuery {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        write_statement(self, w)
    }
}

impl From<SelectQuery> for Expr {
    fn from(q: SelectQuery) -> Self {
        node(q)
    }
}

impl HasWith for SelectQuery {
    fn with_mut(&mut self) -> &mut With {
        &mut self.with
    }
}

impl HasWhere for SelectQuery {
    fn where_mut(&mut self) -> &mut Where {
        &mut self.where_
    }
}

impl HasTableRef for SelectQuery {
    fn table_ref_mut(&mut self) -> &mut TableRef {
        &mut self.table
    }
}

impl HasPaging for SelectQuery {
    fn order_by_mut(&mut self) -> &mut OrderBy {
        &mut self.order_by
    }

    fn limit_mut(&mut self) -> &mut Limit {
        &mut self.limit
    }

    fn offset_mut(&mut self) -> &mut Offset {
        &mut self.offset
    }

    fn fetch_mut(&mut self) -> &mut Fetch {
        &mut self.fetch
    }
}

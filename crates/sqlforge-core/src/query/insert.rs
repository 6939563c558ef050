//! INSERT.

use super::{write_statement, ContextualMods, HasReturning, HasWith, QueryType, Statement};
use crate::clause::{Conflict, Overriding, Returning, Table, Values, With};
use crate::error::Result;
use crate::expr::{node, Expr};
use crate::render::{Expression, Writer};

/// An INSERT statement.
#[derive(Debug, Clone, Default)]
pub struct InsertQuery {
    pub with: With,
    /// Target table with optional alias and column list.
    pub table: Table,
    pub overriding: Option<Overriding>,
    /// Rows, a query, or `DEFAULT VALUES` when both are empty.
    pub values: Values,
    pub conflict: Option<Conflict>,
    pub returning: Returning,
    pub contextual_mods: ContextualMods<Self>,
}

impl Statement for InsertQuery {
    const KIND: QueryType = QueryType::Insert;

    fn contextual_mods_mut(&mut self) -> &mut ContextualMods<Self> {
        &mut self.contextual_mods
    }

    fn write_clauses(&self, w: &mut Writer<'_>) -> Result<()> {
        w.express_if(&self.with, !self.with.is_empty(), "", "\n")?;
        w.write_str("INSERT INTO ");
        w.express_in("table", &self.table)?;
        if let Some(overriding) = self.overriding {
            w.write_char('\n');
            w.write_str(overriding.as_str());
        }
        w.write_char('\n');
        w.express_in("values", &self.values)?;
        w.express_opt(self.conflict.as_ref(), "\n", "")?;
        w.express_if(&self.returning, !self.returning.is_empty(), "\n", "")
    }
}

impl Expression for InsertQuery {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        write_statement(self, w)
    }
}

impl From<InsertQuery> for Expr {
    fn from(q: InsertQuery) -> Self {
        node(q)
    }
}

impl HasWith for InsertQuery {
    fn with_mut(&mut self) -> &mut With {
        &mut self.with
    }
}

impl HasReturning for InsertQuery {
    fn returning_mut(&mut self) -> &mut Returning {
        &mut self.returning
    }
}

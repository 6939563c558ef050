//! DELETE.

use super::{
    write_statement, ContextualMods, HasReturning, HasTableRef, HasWhere, HasWith, QueryType,
    Statement,
};
use crate::clause::{Returning, Table, TableRef, Where, With};
use crate::error::Result;
use crate::expr::{node, Expr};
use crate::render::{Expression, Writer};

/// A DELETE statement.
#[derive(Debug, Clone, Default)]
pub struct DeleteQuery {
    pub with: With,
    pub only: bool,
    pub table: Table,
    /// Extra tables joined through `USING`.
    pub using: TableRef,
    pub where_: Where,
    pub returning: Returning,
    pub contextual_mods: ContextualMods<Self>,
}

impl Statement for DeleteQuery {
    const KIND: QueryType = QueryType::Delete;

    fn contextual_mods_mut(&mut self) -> &mut ContextualMods<Self> {
        &mut self.contextual_mods
    }

    fn write_clauses(&self, w: &mut Writer<'_>) -> Result<()> {
        w.express_if(&self.with, !self.with.is_empty(), "", "\n")?;
        w.write_str("DELETE FROM ");
        if self.only {
            w.write_str("ONLY ");
        }
        w.express_in("table", &self.table)?;
        w.express_if(&self.using, !self.using.is_empty(), "\nUSING ", "")?;
        w.express_if(&self.where_, !self.where_.conditions.is_empty(), "\n", "")?;
        w.express_if(&self.returning, !self.returning.is_empty(), "\n", "")
    }
}

impl Expression for DeleteQuery {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        write_statement(self, w)
    }
}

impl From<DeleteQuery> for Expr {
    fn from(q: DeleteQuery) -> Self {
        node(q)
    }
}

impl HasWith for DeleteQuery {
    fn with_mut(&mut self) -> &mut With {
        &mut self.with
    }
}

impl HasWhere for DeleteQuery {
    fn where_mut(&mut self) -> &mut Where {
        &mut self.where_
    }
}

impl HasReturning for DeleteQuery {
    fn returning_mut(&mut self) -> &mut Returning {
        &mut self.returning
    }
}

impl HasTableRef for DeleteQuery {
    fn table_ref_mut(&mut self) -> &mut TableRef {
        &mut self.using
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{arg, quote};
    use crate::render::Context;

    #[test]
    fn test_delete_with_start_offset() {
        let mut q = DeleteQuery {
            table: Table {
                expr: Some(quote(["films"])),
                ..Table::default()
            },
            ..DeleteQuery::default()
        };
        q.append_where(quote(["kind"]).eq(arg("Musical")));
        q.append_where(quote(["id"]).in_list([arg(1), arg(2)]));
        let (sql, args) = q
            .build_with(&Context::new(), &crate::dialect::Postgres, 4)
            .unwrap();
        assert_eq!(
            sql,
            "DELETE FROM \"films\"\nWHERE (\"kind\" = $5) AND (\"id\" IN ($6, $7))"
        );
        assert_eq!(args.len(), 3);
    }
}

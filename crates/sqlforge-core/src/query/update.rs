//! UPDATE.

use super::{
    write_statement, ContextualMods, HasReturning, HasTableRef, HasWhere, HasWith, QueryType,
    Statement,
};
use crate::clause::{Returning, Set, Table, TableRef, Where, With};
use crate::error::Result;
use crate::expr::{node, Expr};
use crate::render::{Expression, Writer};

/// An UPDATE statement.
#[derive(Debug, Clone, Default)]
pub struct UpdateQuery {
    pub with: With,
    pub only: bool,
    pub table: Table,
    pub set: Set,
    /// Extra tables joined through `FROM`.
    pub from: TableRef,
    pub where_: Where,
    pub returning: Returning,
    pub contextual_mods: ContextualMods<Self>,
}

impl Statement for UpdateQuery {
    const KIND: QueryType = QueryType::Update;

    fn contextual_mods_mut(&mut self) -> &mut ContextualMods<Self> {
        &mut self.contextual_mods
    }

    fn write_clauses(&self, w: &mut Writer<'_>) -> Result<()> {
        w.express_if(&self.with, !self.with.is_empty(), "", "\n")?;
        w.write_str("UPDATE ");
        if self.only {
            w.write_str("ONLY ");
        }
        w.express_in("table", &self.table)?;
        w.write_str(" SET\n");
        w.express_in("set", &self.set)?;
        w.express_if(&self.from, !self.from.is_empty(), "\nFROM ", "")?;
        w.express_if(&self.where_, !self.where_.conditions.is_empty(), "\n", "")?;
        w.express_if(&self.returning, !self.returning.is_empty(), "\n", "")
    }
}

impl Expression for UpdateQuery {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        write_statement(self, w)
    }
}

impl From<UpdateQuery> for Expr {
    fn from(q: UpdateQuery) -> Self {
        node(q)
    }
}

impl HasWith for UpdateQuery {
    fn with_mut(&mut self) -> &mut With {
        &mut self.with
    }
}

impl HasWhere for UpdateQuery {
    fn where_mut(&mut self) -> &mut Where {
        &mut self.where_
    }
}

impl HasReturning for UpdateQuery {
    fn returning_mut(&mut self) -> &mut Returning {
        &mut self.returning
    }
}

impl HasTableRef for UpdateQuery {
    fn table_ref_mut(&mut self) -> &mut TableRef {
        &mut self.from
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::expr::{arg, binary, quote, raw};
    use crate::render::Context;

    fn films() -> UpdateQuery {
        UpdateQuery {
            table: Table {
                expr: Some(quote(["films"])),
                ..Table::default()
            },
            ..UpdateQuery::default()
        }
    }

    #[test]
    fn test_update_set_from_where() {
        let mut q = films();
        q.only = true;
        q.set.assignments = vec![
            binary(quote(["kind"]), "=", arg("Dramatic")),
            binary(quote(["len"]), "=", raw("DEFAULT")),
        ];
        q.from = TableRef::new(quote(["genres"]));
        q.append_where(raw("films.genre_id = genres.id"));
        let (sql, args) = q.build(&Context::new()).unwrap();
        assert_eq!(
            sql,
            "UPDATE ONLY \"films\" SET\n\"kind\" = $1,\n\"len\" = DEFAULT\n\
             FROM \"genres\"\nWHERE films.genre_id = genres.id"
        );
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_update_without_set_fails_with_path() {
        let err = films().build(&Context::new()).unwrap_err();
        assert_eq!(err.to_string(), "set: SET requires at least one assignment");
        assert!(matches!(err.root(), RenderError::EmptySet));
    }
}

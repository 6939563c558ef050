//! A bare VALUES list.

use super::{write_statement, ContextualMods, HasPaging, QueryType, Statement};
use crate::clause::{Fetch, Limit, Offset, OrderBy, Row};
use crate::error::{RenderError, Result};
use crate::expr::{node, Expr};
use crate::render::{Expression, Writer};

/// `VALUES (...), (...)` with optional ordering and paging.
#[derive(Debug, Clone, Default)]
pub struct ValuesQuery {
    pub rows: Vec<Row>,
    pub order_by: OrderBy,
    pub limit: Limit,
    pub offset: Offset,
    pub fetch: Fetch,
    pub contextual_mods: ContextualMods<Self>,
}

impl Statement for ValuesQuery {
    const KIND: QueryType = QueryType::Values;

    fn contextual_mods_mut(&mut self) -> &mut ContextualMods<Self> {
        &mut self.contextual_mods
    }

    fn write_clauses(&self, w: &mut Writer<'_>) -> Result<()> {
        if self.rows.is_empty() {
            return Err(RenderError::EmptyValues);
        }
        w.express_slice(&self.rows, "VALUES ", ", ", "")?;
        w.express_if(&self.order_by, !self.order_by.items.is_empty(), "\n", "")?;
        w.express_if(&self.limit, self.limit.count.is_some(), "\n", "")?;
        w.express_if(&self.offset, self.offset.count.is_some(), "\n", "")?;
        w.express_if(&self.fetch, self.fetch.count.is_some(), "\n", "")
    }
}

impl Expression for ValuesQuery {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        write_statement(self, w)
    }
}

impl From<ValuesQuery> for Expr {
    fn from(q: ValuesQuery) -> Self {
        node(q)
    }
}

impl HasPaging for ValuesQuery {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{arg, raw};
    use crate::render::Context;

    #[test]
    fn test_values_rows_and_paging() {
        let mut q = ValuesQuery {
            rows: vec![Row(vec![arg(1), arg("one")]), Row(vec![arg(2), arg("two")])],
            ..ValuesQuery::default()
        };
        q.order_by.items.push(raw("1").into());
        q.limit.count = Some(raw("1"));
        let (sql, args) = q.build(&Context::new()).unwrap();
        assert_eq!(sql, "VALUES ($1, $2), ($3, $4)\nORDER BY 1\nLIMIT 1");
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn test_empty_values_is_an_error() {
        let err = ValuesQuery::default().build(&Context::new()).unwrap_err();
        assert!(matches!(err, RenderError::EmptyValues));
    }
}

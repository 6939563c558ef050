//! VALUES rows and INSERT sources.

use crate::error::Result;
use crate::expr::Expr;
use crate::render::{Expression, Writer};

/// One parenthesised row of values.
#[derive(Debug, Clone, Default)]
pub struct Row(pub Vec<Expr>);

impl Expression for Row {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_char('(');
        w.express_slice(&self.0, "", ", ", "")?;
        w.write_char(')');
        Ok(())
    }
}

/// The source of an INSERT: a query, VALUES rows or `DEFAULT VALUES`.
#[derive(Debug, Clone, Default)]
pub struct Values {
    /// A query takes priority over rows.
    pub query: Option<Expr>,
    /// Rows for `VALUES (...), (...)`.
    pub rows: Vec<Row>,
}

impl Expression for Values {
    fn write_sql(&self, w: &mut Writer<'_>) -> Result<()> {
        if let Some(query) = &self.query {
            return w.express(query);
        }
        if self.rows.is_empty() {
            w.write_str("DEFAULT VALUES");
            return Ok(());
        }
        w.express_slice(&self.rows, "VALUES ", ", ", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Postgres;
    use crate::expr::{arg, raw};
    use crate::render::{render, Context};

    fn sql(v: &Values) -> String {
        render(v, &Context::new(), &Postgres, 0).unwrap().0
    }

    #[test]
    fn test_values_sources() {
        assert_eq!(sql(&Values::default()), "DEFAULT VALUES");
        let rows = Values {
            query: None,
            rows: vec![Row(vec![arg(1), arg(2)]), Row(vec![arg(3), raw("DEFAULT")])],
        };
        assert_eq!(sql(&rows), "VALUES ($1, $2), ($3, DEFAULT)");
        let query = Values {
            query: Some(raw("SELECT 1")),
            rows: vec![Row(vec![arg(1)])],
        };
        assert_eq!(sql(&query), "SELECT 1");
    }
}
